//! JSON file writer and filename rules

use chrono::{DateTime, TimeZone};
use serde::Serialize;
use std::fmt::Display;
use std::fs;
use std::path::Path;

use super::error::{ExportError, ExportResult};

/// Layout of the timestamp prefix on exported file names
pub const FILE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Serialize `value` as 2-space indented JSON into `path`, creating parent
/// directories first. Not retried on failure.
pub fn write_json<T: Serialize + ?Sized>(value: &T, path: &Path) -> ExportResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| ExportError::io(parent, e))?;
    }

    let bytes = serde_json::to_vec_pretty(value).map_err(|e| ExportError::Encode {
        path: path.to_path_buf(),
        source: e,
    })?;

    fs::write(path, &bytes).map_err(|e| ExportError::io(path, e))?;

    tracing::debug!(file = %path.display(), bytes = bytes.len(), "Wrote file");
    Ok(())
}

/// Spaces become underscores, then everything outside `[A-Za-z0-9_]` is
/// dropped
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// `2025-11-12_09-00-00`, in the timestamp's own offset
pub fn file_timestamp<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    at.format(FILE_TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::parse_timestamp;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Heart Rate"), "Heart_Rate");
        assert_eq!(
            sanitize_filename("Test/File:Name*With?Chars"),
            "TestFileNameWithChars"
        );
        assert_eq!(sanitize_filename(""), "");
        assert_eq!(sanitize_filename("/:*?"), "");
        assert_eq!(sanitize_filename("Café Run"), "Caf_Run");
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        for name in ["Heart Rate", "Outdoor Walk", "a/b c?d", "already_clean_42", "  "] {
            let once = sanitize_filename(name);
            assert_eq!(sanitize_filename(&once), once);
        }
    }

    #[test]
    fn test_file_timestamp_keeps_offset() {
        let dt = parse_timestamp("2025-11-12 17:05:04 -0500").unwrap();
        assert_eq!(file_timestamp(&dt), "2025-11-12_17-05-04");
    }

    #[test]
    fn test_write_json_creates_parents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("value.json");

        #[derive(Serialize)]
        struct Sample {
            name: &'static str,
            list: Vec<u32>,
        }

        let sample = Sample {
            name: "x",
            list: vec![1, 2],
        };
        write_json(&sample, &path).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("{\n  \"name\": \"x\",\n  \"list\": ["));
        let parsed: serde_json::Value = serde_json::from_str(&written).unwrap();
        assert_eq!(parsed["list"][1], 2);
    }

    #[test]
    fn test_write_json_reports_path_on_failure() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a directory").unwrap();

        let target = blocker.join("child.json");
        let err = write_json(&json!([]), &target).unwrap_err();

        assert!(matches!(err, ExportError::Io { .. }));
        assert!(err.to_string().contains("blocker"));
    }
}
