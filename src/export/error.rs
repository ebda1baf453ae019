//! Export pipeline error types
//!
//! Every fatal failure of a run is an `ExportError`. Failures inside a
//! pipeline step are wrapped with the step's name via
//! [`ExportError::during`], so the top-level message reads like
//! `exporting workouts: failed to write ...`.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::DecodeError;

/// Errors that abort an export run
#[derive(Error, Debug)]
pub enum ExportError {
    /// Source file does not exist
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// Source file exists but could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source is not a valid export document
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Directory creation or file write failed
    #[error("Failed to write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A value could not be serialized
    #[error("Failed to encode {}: {source}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Options rejected before any I/O
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Failure inside a named pipeline step
    #[error("{operation}: {source}")]
    Step {
        operation: String,
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Attach the name of the step that failed
    pub fn during(self, operation: impl Into<String>) -> Self {
        ExportError::Step {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ExportError::Io {
            path: path.into(),
            source,
        }
    }

    /// The innermost error, with step wrappers removed
    pub fn root(&self) -> &ExportError {
        match self {
            ExportError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Result type alias for export operations
pub type ExportResult<T> = Result<T, ExportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ExportError::InputNotFound(PathBuf::from("missing.json"));
        assert_eq!(err.to_string(), "Input file not found: missing.json");

        let err = ExportError::InvalidOptions("batch size must be at least 1".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid options: batch size must be at least 1"
        );
    }

    #[test]
    fn test_step_wrapping() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ExportError::io("out/workouts/a.json", io_err).during("exporting workouts");

        assert_eq!(
            err.to_string(),
            "exporting workouts: Failed to write out/workouts/a.json: denied"
        );
        assert!(matches!(err.root(), ExportError::Io { .. }));
    }

    #[test]
    fn test_decode_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ExportError = DecodeError::from(json_err).into();
        assert!(matches!(err, ExportError::Decode(DecodeError::Json(_))));
    }
}
