//! Memory Import Batches
//!
//! Packages summaries for a downstream memory-import tool.
//!
//! ## Architecture
//!
//! - **Memory**: one summary's Markdown plus a flat metadata map
//! - **ImportBatcher**: writes fixed-size `batch_<n>_<category>.json` files
//!   and `batch_summary.json`
//! - **script**: optional `import.sh` that replays every batch file
//!
//! ## Data Flow
//!
//! 1. The exporter hands over every workout, mood and metric summary
//! 2. Metrics without samples are dropped
//! 3. Each category is cut into consecutive windows of its batch size
//! 4. Batch files land in `<export-dir>/import/`, followed by the summary

mod batcher;
mod script;

pub use batcher::{
    partition, BatchCategory, BatchSizes, BatchSummary, ImportBatcher, Memory,
    BATCH_SUMMARY_FILE, METRIC_MEMORY_TYPE, STATE_OF_MIND_MEMORY_TYPE, WORKOUT_MEMORY_TYPE,
};
pub use script::{render_import_script, write_import_script, IMPORT_SCRIPT_FILE};
