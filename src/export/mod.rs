//! File Exporter
//!
//! Writes a decoded export as a directory tree of JSON files:
//!
//! ```text
//! <export-dir>/
//!   manifest.json
//!   metrics/<ts>_<name>.json
//!   workouts/<ts>_<name>_summary.json
//!   workout_details/<ts>_<name>/{heart_rate,heart_rate_recovery,active_energy,step_count}.json
//!   state_of_mind/<ts>_<kind>.json
//!   ecg/ heart_rate_notifications/ symptoms/
//!   import/
//! ```
//!
//! - **writer**: indented JSON writes and filename rules
//! - **manifest**: index of every written file plus counts and hints
//! - **pipeline**: `HealthExporter`, the end-to-end run
//! - **error**: error types

pub mod error;
pub mod manifest;
pub mod pipeline;
pub mod writer;

pub use error::{ExportError, ExportResult};
pub use manifest::{DateRange, ExportManifest, MANIFEST_SCHEMA_VERSION};
pub use pipeline::{HealthExporter, ProcessOptions, RunReport, IMPORT_DIR, MANIFEST_FILE};
pub use writer::{file_timestamp, sanitize_filename, write_json};
