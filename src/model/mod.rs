//! Health Export Record Model
//!
//! - **dates**: the lenient timestamp parser used by every timestamp field
//! - **types**: metrics, workouts, state-of-mind entries and the three
//!   passthrough categories
//!
//! Decoding is all-or-nothing: a malformed document or a single
//! unparseable timestamp rejects the whole export before any file is
//! written.

pub mod dates;
pub mod types;

pub use dates::{format_rfc3339, parse_timestamp, DateParseError};
pub use types::{
    Data, HealthExport, HeartRateSample, Metric, MetricRecord, Quantity, QuantitySample,
    StateOfMindEntry, Workout,
};

use thiserror::Error;

/// Failure to turn raw bytes into a [`HealthExport`]
#[derive(Error, Debug)]
pub enum DecodeError {
    /// A timestamp field matched none of the accepted layouts
    #[error("invalid timestamp: {0}")]
    DateParse(String),

    /// Not JSON, or JSON of the wrong shape
    #[error("malformed export: {0}")]
    Json(#[source] serde_json::Error),
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        let message = err.to_string();
        if err.is_data() && message.starts_with(DateParseError::PREFIX) {
            DecodeError::DateParse(message)
        } else {
            DecodeError::Json(err)
        }
    }
}

impl HealthExport {
    /// Decode a complete export document
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    const SAMPLE: &str = r#"{
        "data": {
            "metrics": [
                {
                    "name": "step_count",
                    "units": "count",
                    "data": [
                        {"date": "2025-11-12 08:00:00 -0500", "qty": 120, "source": "Watch"},
                        {"date": "2025-11-12T09:00:00-05:00", "qty": 340.5, "source": "Watch"}
                    ]
                }
            ],
            "workouts": [
                {
                    "id": "W-1",
                    "name": "Outdoor Walk",
                    "start": "2025-11-12 09:00:00 -0500",
                    "end": "2025-11-12 09:30:00 -0500",
                    "duration": 1800,
                    "temperature": {"qty": 12.5, "units": "degC"},
                    "heartRateData": [
                        {"Avg": 110, "Max": 120, "Min": 100, "date": "2025-11-12 09:01:00 -0500", "source": "Watch", "units": "bpm"}
                    ],
                    "unknownField": {"ignored": true}
                }
            ],
            "stateOfMind": [
                {
                    "id": "S-1",
                    "kind": "daily_mood",
                    "start": "2025-11-12T21:00:00Z",
                    "end": "2025-11-12T21:00:00Z",
                    "valence": 0.45,
                    "valenceClassification": "slightly pleasant",
                    "labels": ["calm"],
                    "associations": ["family"]
                }
            ],
            "ecg": [{"classification": "sinusRhythm", "voltage": [1, 2, 3]}],
            "heartRateNotifications": [],
            "symptoms": []
        }
    }"#;

    #[test]
    fn test_decode_full_document() {
        let export = HealthExport::from_slice(SAMPLE.as_bytes()).unwrap();
        let data = &export.data;

        assert_eq!(data.metrics.len(), 1);
        assert_eq!(data.metrics[0].data.len(), 2);
        assert_eq!(data.metrics[0].data[1].qty, 340.5);

        let workout = &data.workouts[0];
        assert_eq!(workout.name, "Outdoor Walk");
        assert_eq!(workout.start.hour(), 9);
        assert_eq!(workout.heart_rate_data[0].avg, 110.0);
        assert!(workout.step_count.is_empty());
        assert!(workout.distance.is_none());
        assert!(!workout.has_location());

        assert_eq!(data.state_of_mind[0].labels.len(), 1);
        assert_eq!(data.ecg[0]["voltage"][2], 3);
    }

    #[test]
    fn test_missing_categories_default_to_empty() {
        let export = HealthExport::from_slice(br#"{"data": {}}"#).unwrap();
        assert!(export.data.metrics.is_empty());
        assert!(export.data.symptoms.is_empty());
    }

    #[test]
    fn test_bad_timestamp_rejects_document() {
        let doc = SAMPLE.replace("2025-11-12T09:00:00-05:00", "last tuesday");
        let err = HealthExport::from_slice(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::DateParse(_)), "got {err:?}");
        assert!(err.to_string().contains("last tuesday"));
    }

    #[test]
    fn test_malformed_json() {
        let err = HealthExport::from_slice(b"{\"data\": [").unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }

    #[test]
    fn test_missing_required_timestamp() {
        let doc = r#"{"data": {"workouts": [{"name": "Yoga", "start": "2025-11-12T09:00:00Z"}]}}"#;
        let err = HealthExport::from_slice(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
        assert!(err.to_string().contains("end"));
    }

    #[test]
    fn test_metric_record_roundtrips_offset() {
        let record: MetricRecord =
            serde_json::from_str(r#"{"date": "2025-11-12 08:00:00 -0500", "qty": 1}"#).unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"], "2025-11-12T08:00:00-05:00");
        assert_eq!(json["source"], "");
    }

    #[test]
    fn test_null_optional_fields_read_as_defaults() {
        let doc = r#"{
            "data": {
                "metrics": [
                    {"name": "step_count", "units": null, "data": [
                        {"date": "2025-11-12T08:00:00Z", "qty": null, "source": null}
                    ]}
                ],
                "workouts": [
                    {"id": null, "name": "Yoga", "start": "2025-11-12T09:00:00Z",
                     "end": "2025-11-12T09:45:00Z", "temperature": null,
                     "heartRateData": [
                        {"Avg": null, "date": "2025-11-12T09:01:00Z", "units": null}
                     ],
                     "heartRateRecovery": null, "walkingAndRunningDistance": null,
                     "distance": null}
                ],
                "stateOfMind": [
                    {"kind": "daily_mood", "start": "2025-11-12T21:00:00Z",
                     "end": "2025-11-12T21:00:00Z", "valence": null,
                     "labels": null, "associations": null}
                ],
                "ecg": null,
                "heartRateNotifications": null,
                "symptoms": null
            }
        }"#;

        let export = HealthExport::from_slice(doc.as_bytes()).unwrap();
        let data = &export.data;

        let metric = &data.metrics[0];
        assert_eq!(metric.units, "");
        assert_eq!(metric.data[0].qty, 0.0);
        assert_eq!(metric.data[0].source, "");

        let workout = &data.workouts[0];
        assert_eq!(workout.id, "");
        assert_eq!(workout.temperature, Quantity::default());
        assert_eq!(workout.heart_rate_data[0].avg, 0.0);
        assert!(workout.heart_rate_recovery.is_empty());
        assert!(workout.walking_and_running_distance.is_empty());
        assert!(workout.distance.is_none());

        let mood = &data.state_of_mind[0];
        assert_eq!(mood.valence, 0.0);
        assert!(mood.labels.is_empty());
        assert!(mood.associations.is_empty());

        assert!(data.ecg.is_empty());
        assert!(data.heart_rate_notifications.is_empty());
        assert!(data.symptoms.is_empty());
    }

    #[test]
    fn test_null_required_field_still_rejected() {
        let doc = r#"{"data": {"workouts": [{"name": null, "start": "2025-11-12T09:00:00Z", "end": "2025-11-12T09:30:00Z"}]}}"#;
        let err = HealthExport::from_slice(doc.as_bytes()).unwrap_err();
        assert!(matches!(err, DecodeError::Json(_)));
    }
}
