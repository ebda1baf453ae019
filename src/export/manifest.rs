//! Export manifest
//!
//! The manifest indexes every file a run wrote, relative to the export
//! root, and is the last file written. Its absence means the run stopped
//! before finishing the category export.

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use crate::memory::BatchSizes;
use crate::model::dates::flexible;
use crate::model::Data;

/// Bumped whenever the manifest layout changes incompatibly
pub const MANIFEST_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub trace_id: String,
    pub source_file: String,
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
    pub summary: CategoryCounts,

    pub metrics: Vec<String>,
    pub workouts: Vec<String>,
    pub state_of_mind: Vec<String>,
    pub workout_details: WorkoutDetails,

    pub import_hints: ImportHints,
}

/// Span of every timestamp in the export
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(with = "flexible")]
    pub earliest: DateTime<FixedOffset>,
    #[serde(with = "flexible")]
    pub latest: DateTime<FixedOffset>,
    /// Calendar days touched, inclusive, counted in UTC
    pub total_days: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCounts {
    pub total_metrics: usize,
    pub total_workouts: usize,
    pub total_state_of_mind: usize,
    pub total_ecg: usize,
    pub total_heart_rate_notifications: usize,
    pub total_symptoms: usize,
}

/// Per-series detail files, one list per series kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutDetails {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heart_rate: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub heart_rate_recovery: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub energy: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportHints {
    pub recommended_memory_types: MemoryTypes,
    pub batch_recommendations: BatchRecommendations,
    pub data_quality: DataQuality,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryTypes {
    pub workouts: String,
    pub metrics: String,
    pub state_of_mind: String,
}

impl Default for MemoryTypes {
    fn default() -> Self {
        Self {
            workouts: crate::memory::WORKOUT_MEMORY_TYPE.to_string(),
            metrics: crate::memory::METRIC_MEMORY_TYPE.to_string(),
            state_of_mind: crate::memory::STATE_OF_MIND_MEMORY_TYPE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchRecommendations {
    pub workouts: BatchEstimate,
    pub state_of_mind: BatchEstimate,
    pub metrics: BatchEstimate,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BatchEstimate {
    pub total_items: usize,
    pub batch_size: usize,
    pub estimated_batches: usize,
}

impl BatchEstimate {
    pub fn new(total_items: usize, batch_size: usize) -> Self {
        Self {
            total_items,
            batch_size,
            estimated_batches: total_items.div_ceil(batch_size.max(1)),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub workouts_with_heart_rate: usize,
    pub workouts_with_steps: usize,
    pub workouts_with_recovery: usize,
}

impl ExportManifest {
    /// Start a manifest for `data`: counts, date range and import hints are
    /// filled in, the file lists start empty
    pub fn new(
        data: &Data,
        source_file: impl Into<String>,
        trace_id: impl Into<String>,
        version: impl Into<String>,
        batch_sizes: BatchSizes,
    ) -> Self {
        Self {
            schema_version: MANIFEST_SCHEMA_VERSION,
            generated_at: Utc::now(),
            trace_id: trace_id.into(),
            source_file: source_file.into(),
            version: version.into(),
            date_range: DateRange::of(data),
            summary: CategoryCounts::of(data),
            metrics: Vec::new(),
            workouts: Vec::new(),
            state_of_mind: Vec::new(),
            workout_details: WorkoutDetails::default(),
            import_hints: ImportHints::of(data, batch_sizes),
        }
    }

    /// Every relative path recorded in the manifest
    pub fn all_files(&self) -> impl Iterator<Item = &String> {
        self.metrics
            .iter()
            .chain(&self.workouts)
            .chain(&self.state_of_mind)
            .chain(&self.workout_details.heart_rate)
            .chain(&self.workout_details.heart_rate_recovery)
            .chain(&self.workout_details.energy)
            .chain(&self.workout_details.steps)
    }
}

impl DateRange {
    /// `None` when the export holds no timestamped record
    pub fn of(data: &Data) -> Option<Self> {
        let metric_dates = data.metrics.iter().flat_map(|m| m.data.iter().map(|r| r.date));
        let workout_dates = data.workouts.iter().flat_map(|w| [w.start, w.end]);
        let mood_dates = data.state_of_mind.iter().flat_map(|s| [s.start, s.end]);

        let mut all = metric_dates.chain(workout_dates).chain(mood_dates);
        let first = all.next()?;
        let (earliest, latest) = all.fold((first, first), |(lo, hi), dt| {
            (if dt < lo { dt } else { lo }, if dt > hi { dt } else { hi })
        });

        let total_days = (latest.with_timezone(&Utc).date_naive()
            - earliest.with_timezone(&Utc).date_naive())
        .num_days()
            + 1;

        Some(Self {
            earliest,
            latest,
            total_days,
        })
    }
}

impl CategoryCounts {
    pub fn of(data: &Data) -> Self {
        Self {
            total_metrics: data.metrics.len(),
            total_workouts: data.workouts.len(),
            total_state_of_mind: data.state_of_mind.len(),
            total_ecg: data.ecg.len(),
            total_heart_rate_notifications: data.heart_rate_notifications.len(),
            total_symptoms: data.symptoms.len(),
        }
    }
}

impl ImportHints {
    pub fn of(data: &Data, sizes: BatchSizes) -> Self {
        let metrics_with_data = data.metrics.iter().filter(|m| !m.data.is_empty()).count();

        Self {
            recommended_memory_types: MemoryTypes::default(),
            batch_recommendations: BatchRecommendations {
                workouts: BatchEstimate::new(data.workouts.len(), sizes.workouts),
                state_of_mind: BatchEstimate::new(data.state_of_mind.len(), sizes.state_of_mind),
                metrics: BatchEstimate::new(metrics_with_data, sizes.metrics),
            },
            data_quality: DataQuality {
                workouts_with_heart_rate: data
                    .workouts
                    .iter()
                    .filter(|w| !w.heart_rate_data.is_empty())
                    .count(),
                workouts_with_steps: data
                    .workouts
                    .iter()
                    .filter(|w| !w.step_count.is_empty())
                    .count(),
                workouts_with_recovery: data
                    .workouts
                    .iter()
                    .filter(|w| !w.heart_rate_recovery.is_empty())
                    .count(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::HealthExport;

    fn data(json: &str) -> Data {
        HealthExport::from_slice(json.as_bytes()).unwrap().data
    }

    #[test]
    fn test_date_range_spans_all_categories() {
        let data = data(
            r#"{"data": {
                "metrics": [{"name": "steps", "data": [{"date": "2025-11-10 23:30:00 -0500", "qty": 1}]}],
                "workouts": [{"name": "Run", "start": "2025-11-12T09:00:00Z", "end": "2025-11-12T09:30:00Z"}],
                "stateOfMind": [{"kind": "daily_mood", "start": "2025-11-14T20:00:00Z", "end": "2025-11-14T20:00:00Z"}]
            }}"#,
        );

        let range = DateRange::of(&data).unwrap();
        assert_eq!(range.earliest.to_rfc3339(), "2025-11-10T23:30:00-05:00");
        assert_eq!(range.latest.to_rfc3339(), "2025-11-14T20:00:00+00:00");
        // 2025-11-11 04:30 UTC through 2025-11-14
        assert_eq!(range.total_days, 4);
    }

    #[test]
    fn test_date_range_absent_without_timestamps() {
        let data = data(r#"{"data": {"ecg": [{}], "metrics": [{"name": "empty", "data": []}]}}"#);
        assert!(DateRange::of(&data).is_none());
    }

    #[test]
    fn test_counts_and_hints() {
        let data = data(
            r#"{"data": {
                "metrics": [
                    {"name": "a", "data": [{"date": "2025-11-10T00:00:00Z", "qty": 1}]},
                    {"name": "b", "data": []}
                ],
                "workouts": [
                    {"name": "Run", "start": "2025-11-12T09:00:00Z", "end": "2025-11-12T09:30:00Z",
                     "heartRateData": [{"Avg": 120, "date": "2025-11-12T09:01:00Z"}]},
                    {"name": "Yoga", "start": "2025-11-13T09:00:00Z", "end": "2025-11-13T09:30:00Z"}
                ],
                "symptoms": [{"name": "headache"}]
            }}"#,
        );

        let sizes = BatchSizes {
            workouts: 1,
            state_of_mind: 20,
            metrics: 10,
        };
        let manifest = ExportManifest::new(&data, "export.json", "trace", "v1", sizes);

        assert_eq!(manifest.schema_version, MANIFEST_SCHEMA_VERSION);
        assert_eq!(manifest.summary.total_metrics, 2);
        assert_eq!(manifest.summary.total_symptoms, 1);

        let hints = &manifest.import_hints;
        assert_eq!(hints.batch_recommendations.workouts, BatchEstimate::new(2, 1));
        assert_eq!(hints.batch_recommendations.workouts.estimated_batches, 2);
        assert_eq!(hints.batch_recommendations.metrics.total_items, 1);
        assert_eq!(hints.batch_recommendations.state_of_mind.estimated_batches, 0);
        assert_eq!(hints.data_quality.workouts_with_heart_rate, 1);
        assert_eq!(hints.data_quality.workouts_with_steps, 0);

        let json = serde_json::to_value(&manifest).unwrap();
        assert_eq!(json["schemaVersion"], 1);
        assert_eq!(json["importHints"]["recommendedMemoryTypes"]["stateOfMind"], "mental_health_log");
        assert!(json["workoutDetails"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_batch_estimate_rounds_up() {
        assert_eq!(BatchEstimate::new(21, 20).estimated_batches, 2);
        assert_eq!(BatchEstimate::new(20, 20).estimated_batches, 1);
        assert_eq!(BatchEstimate::new(0, 20).estimated_batches, 0);
    }
}
