//! Import batch generation
//!
//! Wraps each summary into a [`Memory`] and writes consecutive,
//! fixed-size windows of them as `batch_<n>_<category>.json` files.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::export::{write_json, ExportResult};
use crate::summary::{MetricSummary, StateOfMindSummary, WorkoutSummary};

pub const WORKOUT_MEMORY_TYPE: &str = "workout_log";
pub const STATE_OF_MIND_MEMORY_TYPE: &str = "mental_health_log";
pub const METRIC_MEMORY_TYPE: &str = "health_metric";

const DATA_SOURCE: &str = "apple_health";
const REVIEW_STATUS: &str = "unreviewed";
const PRIVACY_LEVEL: &str = "private";

/// Name of the batch statistics file inside the import directory
pub const BATCH_SUMMARY_FILE: &str = "batch_summary.json";

/// Target number of memories per batch file, per category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSizes {
    pub workouts: usize,
    pub state_of_mind: usize,
    pub metrics: usize,
}

impl Default for BatchSizes {
    fn default() -> Self {
        Self {
            workouts: 20,
            state_of_mind: 20,
            metrics: 10,
        }
    }
}

/// Category of a batch file, in replay order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchCategory {
    Workouts,
    StateOfMind,
    Metrics,
}

impl BatchCategory {
    pub const ALL: [BatchCategory; 3] = [
        BatchCategory::Workouts,
        BatchCategory::StateOfMind,
        BatchCategory::Metrics,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BatchCategory::Workouts => "workouts",
            BatchCategory::StateOfMind => "state_of_mind",
            BatchCategory::Metrics => "metrics",
        }
    }

    /// `batch_3_metrics.json`
    pub fn file_name(&self, batch: usize) -> String {
        format!("batch_{}_{}.json", batch, self.as_str())
    }
}

/// The atomic unit handed to the downstream import tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Memory {
    #[serde(rename = "type")]
    pub memory_type: String,
    pub content: String,
    pub metadata: BTreeMap<String, Value>,
    pub collections: Vec<String>,
}

impl Memory {
    pub fn from_workout(summary: &WorkoutSummary, collections: &[String]) -> Self {
        let meta = &summary.import_metadata;
        let mut metadata = common_metadata();
        metadata.insert("workout_type".into(), json!(summary.name));
        metadata.insert("date".into(), json!(meta.date));
        metadata.insert("time".into(), json!(meta.time));
        metadata.insert("day_of_week".into(), json!(meta.day_of_week));
        metadata.insert("time_of_day".into(), json!(meta.time_of_day));
        metadata.insert("duration_minutes".into(), json!(meta.duration_minutes));
        metadata.insert("apple_health_id".into(), json!(summary.id));

        if let Some(distance) = summary.total_distance.as_ref().filter(|d| d.qty > 0.0) {
            metadata.insert("distance".into(), json!(distance.qty));
            metadata.insert("distance_units".into(), json!(distance.units));
        }
        if let Some(elevation) = summary.elevation_up.as_ref().filter(|e| e.qty > 0.0) {
            metadata.insert("elevation_gain".into(), json!(elevation.qty));
            metadata.insert("elevation_units".into(), json!(elevation.units));
        }
        if summary.has_location {
            metadata.insert("has_location".into(), json!(true));
        }
        if summary.has_route {
            metadata.insert("has_route".into(), json!(true));
        }

        Self {
            memory_type: WORKOUT_MEMORY_TYPE.to_string(),
            content: summary.memory_content.markdown.clone(),
            metadata,
            collections: collections.to_vec(),
        }
    }

    pub fn from_state_of_mind(summary: &StateOfMindSummary, collections: &[String]) -> Self {
        let meta = &summary.import_metadata;
        let mut metadata = common_metadata();
        metadata.insert("kind".into(), json!(summary.kind));
        metadata.insert("valence".into(), json!(summary.valence));
        metadata.insert(
            "valence_classification".into(),
            json!(summary.valence_classification),
        );
        metadata.insert("date".into(), json!(meta.date));
        metadata.insert("time".into(), json!(meta.time));
        metadata.insert("day_of_week".into(), json!(meta.day_of_week));
        metadata.insert("time_of_day".into(), json!(meta.time_of_day));
        metadata.insert("apple_health_id".into(), json!(summary.id));

        Self {
            memory_type: STATE_OF_MIND_MEMORY_TYPE.to_string(),
            content: summary.memory_content.markdown.clone(),
            metadata,
            collections: collections.to_vec(),
        }
    }

    /// `None` for a metric without samples
    pub fn from_metric(summary: &MetricSummary, collections: &[String]) -> Option<Self> {
        let span = summary.span.as_ref()?;
        let meta = &span.import_metadata;

        let mut metadata = common_metadata();
        metadata.insert("metric_name".into(), json!(summary.name));
        metadata.insert("units".into(), json!(summary.units));
        metadata.insert("data_points".into(), json!(summary.data_points));
        metadata.insert("average".into(), json!(span.average));
        metadata.insert("minimum".into(), json!(span.min));
        metadata.insert("maximum".into(), json!(span.max));
        metadata.insert(
            "start_date".into(),
            json!(span.start_date.format("%Y-%m-%d").to_string()),
        );
        metadata.insert(
            "end_date".into(),
            json!(span.end_date.format("%Y-%m-%d").to_string()),
        );
        metadata.insert("date".into(), json!(meta.date));
        metadata.insert("time".into(), json!(meta.time));
        metadata.insert("day_of_week".into(), json!(meta.day_of_week));

        Some(Self {
            memory_type: METRIC_MEMORY_TYPE.to_string(),
            content: span.memory_content.markdown.clone(),
            metadata,
            collections: collections.to_vec(),
        })
    }
}

fn common_metadata() -> BTreeMap<String, Value> {
    let mut metadata = BTreeMap::new();
    metadata.insert("data_source".into(), json!(DATA_SOURCE));
    metadata.insert("review_status".into(), json!(REVIEW_STATUS));
    metadata.insert("privacy_level".into(), json!(PRIVACY_LEVEL));
    metadata
}

/// Statistics of one batch generation run, written as `batch_summary.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchSummary {
    pub total_records: usize,
    pub workout_records: usize,
    pub state_of_mind_records: usize,
    pub metric_records: usize,
    pub workout_batches: usize,
    pub state_of_mind_batches: usize,
    pub metric_batches: usize,
    pub target_collections: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl BatchSummary {
    pub fn total_batches(&self) -> usize {
        self.workout_batches + self.state_of_mind_batches + self.metric_batches
    }

    pub fn batches(&self, category: BatchCategory) -> usize {
        match category {
            BatchCategory::Workouts => self.workout_batches,
            BatchCategory::StateOfMind => self.state_of_mind_batches,
            BatchCategory::Metrics => self.metric_batches,
        }
    }

    pub fn records(&self, category: BatchCategory) -> usize {
        match category {
            BatchCategory::Workouts => self.workout_records,
            BatchCategory::StateOfMind => self.state_of_mind_records,
            BatchCategory::Metrics => self.metric_records,
        }
    }
}

/// Split `items` into consecutive windows of `size`; only the last may be
/// shorter. A zero size is treated as 1.
pub fn partition<T>(items: &[T], size: usize) -> std::slice::Chunks<'_, T> {
    items.chunks(size.max(1))
}

/// Writes batch files into one import directory
pub struct ImportBatcher {
    import_dir: PathBuf,
    sizes: BatchSizes,
    collections: Vec<String>,
}

impl ImportBatcher {
    pub fn new(import_dir: impl Into<PathBuf>, sizes: BatchSizes, collections: Vec<String>) -> Self {
        Self {
            import_dir: import_dir.into(),
            sizes,
            collections,
        }
    }

    pub fn import_dir(&self) -> &Path {
        &self.import_dir
    }

    /// Write every category's batches plus `batch_summary.json`.
    ///
    /// Metrics without samples are left out before batching.
    pub fn run(
        &self,
        workouts: &[WorkoutSummary],
        moods: &[StateOfMindSummary],
        metrics: &[MetricSummary],
    ) -> ExportResult<BatchSummary> {
        tracing::info!(
            workouts = workouts.len(),
            state_of_mind = moods.len(),
            metrics = metrics.len(),
            collections = ?self.collections,
            "Generating import batches"
        );

        if self.collections.is_empty() {
            tracing::warn!(
                "No target collections specified, memories need collections before import"
            );
        }

        let workout_memories: Vec<Memory> = workouts
            .iter()
            .map(|s| Memory::from_workout(s, &self.collections))
            .collect();
        let mood_memories: Vec<Memory> = moods
            .iter()
            .map(|s| Memory::from_state_of_mind(s, &self.collections))
            .collect();
        let metric_memories: Vec<Memory> = metrics
            .iter()
            .filter_map(|s| Memory::from_metric(s, &self.collections))
            .collect();

        let workout_batches = self
            .write_category(BatchCategory::Workouts, &workout_memories, self.sizes.workouts)
            .map_err(|e| e.during("generating workout batches"))?;
        let state_of_mind_batches = self
            .write_category(BatchCategory::StateOfMind, &mood_memories, self.sizes.state_of_mind)
            .map_err(|e| e.during("generating state of mind batches"))?;
        let metric_batches = self
            .write_category(BatchCategory::Metrics, &metric_memories, self.sizes.metrics)
            .map_err(|e| e.during("generating metric batches"))?;

        let summary = BatchSummary {
            total_records: workout_memories.len() + mood_memories.len() + metric_memories.len(),
            workout_records: workout_memories.len(),
            state_of_mind_records: mood_memories.len(),
            metric_records: metric_memories.len(),
            workout_batches,
            state_of_mind_batches,
            metric_batches,
            target_collections: self.collections.clone(),
            timestamp: Utc::now(),
        };

        write_json(&summary, &self.import_dir.join(BATCH_SUMMARY_FILE))?;

        tracing::info!(
            total_batches = summary.total_batches(),
            total_records = summary.total_records,
            "Import batch generation complete"
        );

        Ok(summary)
    }

    /// Returns the number of batch files written
    fn write_category(
        &self,
        category: BatchCategory,
        memories: &[Memory],
        size: usize,
    ) -> ExportResult<usize> {
        let mut written = 0;

        for (index, batch) in partition(memories, size).enumerate() {
            let number = index + 1;
            let path = self.import_dir.join(category.file_name(number));
            write_json(batch, &path).map_err(|e| e.during(format!("writing batch {}", number)))?;

            tracing::info!(
                category = category.as_str(),
                batch = number,
                file = %path.display(),
                count = batch.len(),
                "Generated batch"
            );
            written = number;
        }

        Ok(written)
    }
}
