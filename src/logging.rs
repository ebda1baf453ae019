//! Tracing subscriber initialization.
//!
//! Events always go to stderr, as human-readable text or JSON lines. A log
//! file can be added on top: a path ending in `/` is a directory that gets
//! one `health-export-parser.log.<date>` file per day, any other path is
//! appended to as-is. Files never get ANSI colours.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::config::LoggingConfig;

/// Prefix of daily-rolled log files
pub const LOG_FILE_PREFIX: &str = "health-export-parser.log";

/// Error type for logging initialization failures.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log level {0:?} (expected trace, debug, info, warn or error)")]
    InvalidLevel(String),

    #[error("Invalid log format {0:?} (expected pretty or json)")]
    InvalidFormat(String),

    /// Failed to create log directory
    #[error("Failed to create log directory at {path:?}: {source}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid log file path (no filename component)
    #[error("Invalid log file path: {0:?}")]
    InvalidPath(PathBuf),

    /// Tracing subscriber already initialized
    #[error("Tracing subscriber already initialized")]
    SubscriberAlreadySet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(s.to_string())),
        }
    }
}

/// Where events are written besides stderr
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    /// Daily-rolled files inside this directory
    Daily(PathBuf),
    /// One file, appended to
    File(PathBuf),
}

impl LogOutput {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("stderr") {
            LogOutput::Stderr
        } else if raw.ends_with('/') || raw.ends_with(std::path::MAIN_SEPARATOR) {
            LogOutput::Daily(PathBuf::from(raw))
        } else {
            LogOutput::File(PathBuf::from(raw))
        }
    }

    /// File appender for this output, creating directories as needed
    fn appender(&self) -> Result<Option<RollingFileAppender>, LoggingError> {
        match self {
            LogOutput::Stderr => Ok(None),
            LogOutput::Daily(dir) => {
                create_dir(dir)?;
                Ok(Some(rolling::daily(dir, LOG_FILE_PREFIX)))
            }
            LogOutput::File(path) => {
                let file_name = path
                    .file_name()
                    .ok_or_else(|| LoggingError::InvalidPath(path.clone()))?;
                let directory = match path.parent() {
                    Some(parent) if !parent.as_os_str().is_empty() => parent,
                    _ => Path::new("."),
                };
                create_dir(directory)?;
                Ok(Some(rolling::never(directory, file_name)))
            }
        }
    }
}

fn create_dir(dir: &Path) -> Result<(), LoggingError> {
    std::fs::create_dir_all(dir).map_err(|source| LoggingError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })
}

/// Validated logging settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: tracing::Level,
    pub format: LogFormat,
    pub output: LogOutput,
}

impl LogSettings {
    pub fn from_config(config: &LoggingConfig) -> Result<Self, LoggingError> {
        Ok(Self {
            level: parse_level(&config.level)?,
            format: config.format.parse()?,
            output: LogOutput::parse(&config.output),
        })
    }
}

pub fn parse_level(raw: &str) -> Result<tracing::Level, LoggingError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" | "warning" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(LoggingError::InvalidLevel(raw.to_string())),
    }
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    match format {
        LogFormat::Pretty => fmt::layer()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_target(false)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_writer(writer)
            .boxed(),
    }
}

/// Install the global subscriber.
///
/// Respects RUST_LOG when set; otherwise filters at `settings.level`.
pub fn init(settings: &LogSettings) -> Result<(), LoggingError> {
    let mut layers: Vec<BoxedLayer> = vec![fmt_layer(settings.format, std::io::stderr, true)];

    if let Some(appender) = settings.output.appender()? {
        layers.push(fmt_layer(settings.format, appender, false));
    }

    let level = settings.level.to_string().to_ascii_lowercase();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|_| LoggingError::SubscriberAlreadySet)
}
