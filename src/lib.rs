//! # health-export-parser
//!
//! Splits a single Health Auto Export JSON document into a directory of small,
//! categorized JSON files that downstream tools can ingest piecemeal.
//!
//! ## Features
//!
//! - **Tolerant timestamps**: the export's `YYYY-MM-DD HH:MM:SS ±HHMM` layout and RFC 3339
//! - **Precomputed summaries**: per-series statistics plus Markdown for every workout,
//!   metric and mood entry
//! - **Manifest**: one index of every written file, with counts and import hints
//! - **Import batches**: fixed-size memory batches and an optional replay script
//!
//! ## Modules
//!
//! - [`model`]: record model and timestamp parsing
//! - [`summary`]: statistics and summary builders
//! - [`export`]: file exporter and run pipeline
//! - [`memory`]: import batcher and replay script
//! - [`config`]: TOML config with `AHEP_*` environment overrides
//! - [`logging`]: tracing subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use health_export_parser::{HealthExporter, ProcessOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = ProcessOptions::new("HealthAutoExport.json", "exports");
//!     let report = HealthExporter::new(options)?.run()?;
//!
//!     println!(
//!         "{} workouts written, manifest at {:?}",
//!         report.manifest.workouts.len(),
//!         report.manifest_path
//!     );
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod export;
pub mod logging;
pub mod memory;
pub mod model;
pub mod summary;
pub mod version;

// Re-export top-level types for convenience
pub use model::{
    format_rfc3339, parse_timestamp, Data, DateParseError, DecodeError, HealthExport,
    HeartRateSample, Metric, MetricRecord, Quantity, QuantitySample, StateOfMindEntry, Workout,
};

pub use summary::{
    ImportMetadata, MemoryContent, MetricSpan, MetricSummary, SeriesKind, StateOfMindSummary,
    Statistics, TimeOfDay, WorkoutSummary,
};

pub use export::{
    sanitize_filename, ExportError, ExportManifest, ExportResult, HealthExporter, ProcessOptions,
    RunReport,
};

pub use memory::{BatchSizes, BatchSummary, ImportBatcher, Memory};

pub use config::{Config, ConfigError, LoggingConfig, ResolvedConfig};

pub use logging::{LogFormat, LogOutput, LogSettings, LoggingError};

pub use version::VersionInfo;
