//! Import-ready metadata shared by every summary kind

use chrono::{DateTime, Datelike, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse period of the day, bucketed on the hour as carried by the
/// timestamp's own offset
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 04:59
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }

    pub fn of(dt: &DateTime<FixedOffset>) -> Self {
        Self::from_hour(dt.hour())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
            TimeOfDay::Night => "night",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calendar and presence facts a downstream importer can filter on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImportMetadata {
    /// `2025-11-12`
    pub date: String,
    /// `17:05:04`
    pub time: String,
    /// `Wednesday`
    pub day_of_week: String,
    pub time_of_day: TimeOfDay,
    /// Workouts: session length. Metrics: span between the first and last
    /// sample. State of mind: always 0.
    pub duration_minutes: f64,
    #[serde(rename = "hasHeartRateData")]
    pub has_heart_rate: bool,
    #[serde(rename = "hasStepData")]
    pub has_steps: bool,
    #[serde(rename = "hasRecoveryData")]
    pub has_recovery: bool,
}

impl ImportMetadata {
    /// Calendar fields for `at`, with no duration and no presence flags
    pub fn at(at: &DateTime<FixedOffset>) -> Self {
        Self {
            date: at.format("%Y-%m-%d").to_string(),
            time: at.format("%H:%M:%S").to_string(),
            day_of_week: at.format("%A").to_string(),
            time_of_day: TimeOfDay::of(at),
            duration_minutes: 0.0,
            has_heart_rate: false,
            has_steps: false,
            has_recovery: false,
        }
    }

    pub fn with_duration_minutes(mut self, minutes: f64) -> Self {
        self.duration_minutes = minutes;
        self
    }

    pub fn with_presence(mut self, heart_rate: bool, steps: bool, recovery: bool) -> Self {
        self.has_heart_rate = heart_rate;
        self.has_steps = steps;
        self.has_recovery = recovery;
        self
    }
}

/// Pre-rendered text for a memory system
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryContent {
    /// `Outdoor Walk - November 12, 2025`
    pub title: String,
    /// One-line summary
    pub summary: String,
    /// Full Markdown body
    pub markdown: String,
}

/// `November 12, 2025`
pub fn long_date(dt: &DateTime<FixedOffset>) -> String {
    format!("{} {}, {}", dt.format("%B"), dt.day(), dt.year())
}

/// `Nov 12`
pub fn short_date(dt: &DateTime<FixedOffset>) -> String {
    format!("{} {}", dt.format("%b"), dt.day())
}

/// `Nov 12, 2025`
pub fn short_date_with_year(dt: &DateTime<FixedOffset>) -> String {
    format!("{} {}, {}", dt.format("%b"), dt.day(), dt.year())
}

/// `daily_mood` -> `Daily Mood`
pub fn title_case(raw: &str) -> String {
    raw.replace('_', " ")
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
