//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `AHEP_*` environment variable overrides.
//! Command-line flags are applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::export::ProcessOptions;
use crate::memory::BatchSizes;

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "AHEP_";

const APP_DIR: &str = "health-export-parser";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub export: ExportConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Output location
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportConfig {
    #[serde(default = "default_export_dir")]
    pub dir: String,
}

fn default_export_dir() -> String {
    "exports".to_string()
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            dir: default_export_dir(),
        }
    }
}

/// Import batch generation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImportConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default)]
    pub collections: Vec<String>,

    #[serde(default = "default_batch_size_workouts")]
    pub batch_size_workouts: usize,

    #[serde(default = "default_batch_size_som")]
    pub batch_size_state_of_mind: usize,

    #[serde(default = "default_batch_size_metrics")]
    pub batch_size_metrics: usize,

    #[serde(default)]
    pub generate_script: bool,

    #[serde(default = "default_memory_binary")]
    pub memory_binary: String,
}

fn default_true() -> bool {
    true
}

fn default_batch_size_workouts() -> usize {
    20
}

fn default_batch_size_som() -> usize {
    20
}

fn default_batch_size_metrics() -> usize {
    10
}

fn default_memory_binary() -> String {
    "memory".to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            collections: Vec::new(),
            batch_size_workouts: default_batch_size_workouts(),
            batch_size_state_of_mind: default_batch_size_som(),
            batch_size_metrics: default_batch_size_metrics(),
            generate_script: false,
            memory_binary: default_memory_binary(),
        }
    }
}

impl ImportConfig {
    pub fn batch_sizes(&self) -> BatchSizes {
        BatchSizes {
            workouts: self.batch_size_workouts,
            state_of_mind: self.batch_size_state_of_mind,
            metrics: self.batch_size_metrics,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    /// `stderr`, a directory ending in `/` for daily files, or a file path
    #[serde(default = "default_log_output")]
    pub output: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_output() -> String {
    "stderr".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            output: default_log_output(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Config file search order, first existing wins
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join(APP_DIR).join("config.toml")),
            Some(PathBuf::from(format!("./{}.toml", APP_DIR))),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Load from default locations or environment
    pub fn load_default() -> ResolvedConfig {
        Self::search(&Self::default_paths())
    }

    /// First file in `paths` that exists and parses wins. Files that exist
    /// but fail to load are kept in `rejected` and the search continues.
    pub fn search(paths: &[PathBuf]) -> ResolvedConfig {
        Self::search_with(paths, |key| std::env::var(key).ok())
    }

    fn search_with<F>(paths: &[PathBuf], lookup: F) -> ResolvedConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut rejected = Vec::new();

        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::load(path) {
                Ok(mut config) => {
                    config.apply_overrides(&lookup);
                    return ResolvedConfig {
                        config,
                        source: Some(path.clone()),
                        rejected,
                    };
                }
                Err(e) => rejected.push(e),
            }
        }

        let mut config = Config::default();
        config.apply_overrides(&lookup);
        ResolvedConfig {
            config,
            source: None,
            rejected,
        }
    }

    /// An explicit path must load; without one the default search applies
    pub fn resolve(explicit: Option<&Path>) -> Result<ResolvedConfig, ConfigError> {
        match explicit {
            Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Ok(ResolvedConfig {
                config: Self::load_with_env(path)?,
                source: Some(path.to_path_buf()),
                rejected: Vec::new(),
            }),
            None => Ok(Self::load_default()),
        }
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from `lookup`, keyed by full variable name.
    /// Values that fail to parse are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));

        if let Some(dir) = var("EXPORT_DIR") {
            self.export.dir = dir;
        }

        if let Some(collections) = var("COLLECTIONS") {
            self.import.collections = split_list(&collections);
        }
        if let Some(size) = var("BATCH_SIZE_WORKOUTS").and_then(|v| v.parse().ok()) {
            self.import.batch_size_workouts = size;
        }
        if let Some(size) = var("BATCH_SIZE_SOM").and_then(|v| v.parse().ok()) {
            self.import.batch_size_state_of_mind = size;
        }
        if let Some(size) = var("BATCH_SIZE_METRICS").and_then(|v| v.parse().ok()) {
            self.import.batch_size_metrics = size;
        }
        if let Some(flag) = var("GENERATE_IMPORT_SCRIPT").and_then(|v| parse_bool(&v)) {
            self.import.generate_script = flag;
        }
        if let Some(binary) = var("MEMORY_BINARY") {
            self.import.memory_binary = binary;
        }

        if let Some(level) = var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format;
        }
        if let Some(output) = var("LOG_OUTPUT") {
            self.logging.output = output;
        }
    }

    /// Pipeline options for `source`, before command-line overrides
    pub fn process_options(&self, source: impl Into<PathBuf>) -> ProcessOptions {
        ProcessOptions {
            source: source.into(),
            export_dir: PathBuf::from(&self.export.dir),
            collections: self.import.collections.clone(),
            batch_sizes: self.import.batch_sizes(),
            import_batches: self.import.enabled,
            generate_import_script: self.import.generate_script,
            memory_binary: self.import.memory_binary.clone(),
        }
    }
}

/// Outcome of a config search
///
/// Resolution happens before the subscriber exists, so the binary calls
/// [`ResolvedConfig::log`] once logging is up.
#[derive(Debug)]
pub struct ResolvedConfig {
    pub config: Config,
    /// File the config came from; `None` means defaults plus environment
    pub source: Option<PathBuf>,
    /// Files that exist but could not be read or parsed
    pub rejected: Vec<ConfigError>,
}

impl ResolvedConfig {
    pub fn log(&self) {
        for error in &self.rejected {
            tracing::warn!(error = %error, "Skipped config file");
        }

        match &self.source {
            Some(path) => tracing::info!("Loaded config from {:?}", path),
            None => tracing::info!("Using default config with environment overrides"),
        }
    }
}

/// `"a, b,,c"` -> `["a", "b", "c"]`
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0:?}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# health-export-parser configuration
#
# Search order: --config <path>, <config dir>/health-export-parser/config.toml,
# ./health-export-parser.toml
#
# Environment variables override these settings:
# - AHEP_EXPORT_DIR
# - AHEP_COLLECTIONS (comma separated)
# - AHEP_BATCH_SIZE_WORKOUTS
# - AHEP_BATCH_SIZE_SOM
# - AHEP_BATCH_SIZE_METRICS
# - AHEP_GENERATE_IMPORT_SCRIPT
# - AHEP_MEMORY_BINARY
# - AHEP_LOG_LEVEL
# - AHEP_LOG_FORMAT
# - AHEP_LOG_OUTPUT
#
# Command-line flags override both.

[export]
# Output directory for exported files
dir = "exports"

[import]
# Write import batches to <export dir>/import
enabled = true

# Collections attached to every memory
collections = []

# Memories per batch file
batch_size_workouts = 20
batch_size_state_of_mind = 20
batch_size_metrics = 10

# Also write import/import.sh
generate_script = false

# Importer binary called by import.sh
memory_binary = "memory"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# stderr, a directory ending in "/" for daily files, or a file path
output = "stderr"
"#
    .to_string()
}
