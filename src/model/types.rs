//! Typed representation of a health export document
//!
//! Field names follow the export's JSON keys. Timestamps go through
//! [`dates::flexible`](super::dates::flexible), so a single malformed
//! timestamp anywhere rejects the whole document.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::dates::flexible;

/// Optional fields read an explicit `null` the same as a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Root of an export file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthExport {
    pub data: Data,
}

/// The six category collections of an export
///
/// `ecg`, `heart_rate_notifications` and `symptoms` are passed through
/// verbatim: their elements are never inspected.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Data {
    #[serde(default, deserialize_with = "null_as_default")]
    pub metrics: Vec<Metric>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub workouts: Vec<Workout>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state_of_mind: Vec<StateOfMindEntry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ecg: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub heart_rate_notifications: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symptoms: Vec<Value>,
}

/// A named, unit-labelled time series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metric {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub units: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<MetricRecord>,
}

impl Metric {
    /// Timestamp of the first sample, if any
    pub fn first_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        self.data.first().map(|r| r.date)
    }
}

/// One sample of a metric
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricRecord {
    #[serde(with = "flexible")]
    pub date: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qty: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
}

/// A value paired with its unit label (temperature, humidity, energy, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Quantity {
    #[serde(default, deserialize_with = "null_as_default")]
    pub qty: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub units: String,
}

impl Quantity {
    pub fn new(qty: f64, units: impl Into<String>) -> Self {
        Self {
            qty,
            units: units.into(),
        }
    }
}

/// A timestamped quantity inside a workout series (energy, steps, distance)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuantitySample {
    #[serde(with = "flexible")]
    pub date: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub qty: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub units: String,
}

/// Heart-rate reading for one interval of a workout
///
/// Statistics are computed over `avg`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HeartRateSample {
    #[serde(rename = "Avg", default, deserialize_with = "null_as_default")]
    pub avg: f64,
    #[serde(rename = "Max", default, deserialize_with = "null_as_default")]
    pub max: f64,
    #[serde(rename = "Min", default, deserialize_with = "null_as_default")]
    pub min: f64,
    #[serde(with = "flexible")]
    pub date: DateTime<FixedOffset>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub units: String,
}

/// One exercise session
///
/// `end >= start` is not checked; series keep their input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Workout {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    pub name: String,
    #[serde(with = "flexible")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "flexible")]
    pub end: DateTime<FixedOffset>,
    /// Duration in seconds
    #[serde(default, deserialize_with = "null_as_default")]
    pub duration: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub temperature: Quantity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub humidity: Quantity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub intensity: Quantity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_energy_burned: Quantity,
    #[serde(default, deserialize_with = "null_as_default")]
    pub active_energy: Vec<QuantitySample>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub heart_rate_data: Vec<HeartRateSample>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub heart_rate_recovery: Vec<HeartRateSample>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub step_count: Vec<QuantitySample>,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub walking_and_running_distance: Vec<QuantitySample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_up: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl Workout {
    /// Duration in minutes
    pub fn duration_minutes(&self) -> f64 {
        self.duration / 60.0
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }

    pub fn has_route(&self) -> bool {
        self.route.is_some()
    }
}

/// A mood or emotion recording
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StateOfMindEntry {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    /// Free-text category, e.g. `daily_mood` or `momentary_emotion`
    pub kind: String,
    #[serde(with = "flexible")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "flexible")]
    pub end: DateTime<FixedOffset>,
    /// Conventionally within -1..=1, not validated
    #[serde(default, deserialize_with = "null_as_default")]
    pub valence: f64,
    /// Label supplied by the source; never recomputed from `valence`
    #[serde(default, deserialize_with = "null_as_default")]
    pub valence_classification: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub associations: Vec<Value>,
}
