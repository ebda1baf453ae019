//! Workout summaries

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::metadata::{long_date, ImportMetadata, MemoryContent};
use super::stats::{SeriesKind, Statistics};
use crate::model::dates::flexible;
use crate::model::{Quantity, Workout};

/// A workout with its time series condensed into statistics
///
/// Series statistics are absent (not zeroed) when the series is empty;
/// the `*Count` fields always say how many points the detail files hold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSummary {
    pub id: String,
    pub name: String,
    #[serde(with = "flexible")]
    pub start: DateTime<FixedOffset>,
    #[serde(with = "flexible")]
    pub end: DateTime<FixedOffset>,
    /// Seconds
    pub duration: f64,

    pub temperature: Quantity,
    pub humidity: Quantity,
    pub intensity: Quantity,

    pub total_energy_burned: Quantity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_distance: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elevation_up: Option<Quantity>,
    pub has_location: bool,
    pub has_route: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_energy_stats: Option<Statistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_stats: Option<Statistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_recovery_stats: Option<Statistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_count_stats: Option<Statistics>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_stats: Option<Statistics>,

    pub active_energy_count: usize,
    pub heart_rate_data_count: usize,
    pub heart_rate_recovery_count: usize,
    pub step_count_data_count: usize,
    pub distance_data_count: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    pub import_metadata: ImportMetadata,
    pub memory_content: MemoryContent,
}

impl WorkoutSummary {
    /// Summarize one workout
    pub fn build(workout: &Workout) -> Self {
        let mut summary = Self {
            id: workout.id.clone(),
            name: workout.name.clone(),
            start: workout.start,
            end: workout.end,
            duration: workout.duration,
            temperature: workout.temperature.clone(),
            humidity: workout.humidity.clone(),
            intensity: workout.intensity.clone(),
            total_energy_burned: workout.active_energy_burned.clone(),
            total_distance: workout.distance.clone(),
            elevation_up: workout.elevation_up.clone(),
            has_location: workout.has_location(),
            has_route: workout.has_route(),
            active_energy_stats: Statistics::aggregate(
                &workout.active_energy,
                SeriesKind::Cumulative,
                |s| s.qty,
            ),
            heart_rate_stats: Statistics::aggregate(
                &workout.heart_rate_data,
                SeriesKind::Instantaneous,
                |s| s.avg,
            ),
            heart_rate_recovery_stats: Statistics::aggregate(
                &workout.heart_rate_recovery,
                SeriesKind::Instantaneous,
                |s| s.avg,
            ),
            step_count_stats: Statistics::aggregate(
                &workout.step_count,
                SeriesKind::Cumulative,
                |s| s.qty,
            ),
            distance_stats: Statistics::aggregate(
                &workout.walking_and_running_distance,
                SeriesKind::Cumulative,
                |s| s.qty,
            ),
            active_energy_count: workout.active_energy.len(),
            heart_rate_data_count: workout.heart_rate_data.len(),
            heart_rate_recovery_count: workout.heart_rate_recovery.len(),
            step_count_data_count: workout.step_count.len(),
            distance_data_count: workout.walking_and_running_distance.len(),
            metadata: workout.metadata.clone(),
            import_metadata: ImportMetadata::at(&workout.start)
                .with_duration_minutes(workout.duration_minutes())
                .with_presence(
                    !workout.heart_rate_data.is_empty(),
                    !workout.step_count.is_empty(),
                    !workout.heart_rate_recovery.is_empty(),
                ),
            memory_content: MemoryContent::default(),
        };

        let series_units = workout
            .walking_and_running_distance
            .first()
            .map_or("", |s| s.units.as_str());
        let distance_units = summary.distance_units(series_units).to_string();

        summary.memory_content = MemoryContent {
            title: summary.title(),
            summary: summary.summary_line(&distance_units),
            markdown: summary.markdown(&distance_units),
        };

        summary
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration / 60.0
    }

    /// Distance covered, 0 when not recorded
    pub fn distance_qty(&self) -> f64 {
        self.total_distance.as_ref().map_or(0.0, |d| d.qty)
    }

    pub fn elevation_qty(&self) -> f64 {
        self.elevation_up.as_ref().map_or(0.0, |e| e.qty)
    }

    /// Session distance units, else the distance series' units
    fn distance_units<'a>(&'a self, series_units: &'a str) -> &'a str {
        match self.total_distance.as_ref().map(|d| d.units.as_str()) {
            Some(units) if !units.is_empty() => units,
            _ => series_units,
        }
    }

    /// Energy units, `kcal` when the export left them blank
    fn energy_units(&self) -> &str {
        match self.total_energy_burned.units.as_str() {
            "" => "kcal",
            units => units,
        }
    }

    fn title(&self) -> String {
        format!("{} - {}", self.name, long_date(&self.start))
    }

    fn summary_line(&self, distance_units: &str) -> String {
        let mut parts = vec![format!(
            "{:.1} minute {}",
            self.duration_minutes(),
            self.name.to_lowercase()
        )];

        if self.distance_qty() > 0.0 {
            parts.push(format!(
                "covering {}",
                with_units(format!("{:.2}", self.distance_qty()), distance_units)
            ));
        }

        if let Some(hr) = &self.heart_rate_stats {
            parts.push(format!("average heart rate of {:.0} bpm", hr.avg));
        }

        parts.push(format!(
            "burning {:.1} {}",
            self.total_energy_burned.qty,
            self.energy_units()
        ));

        parts.join(" with ")
    }

    fn markdown(&self, distance_units: &str) -> String {
        let mut md = String::new();

        md.push_str(&format!("# {}\n\n", self.title()));
        md.push_str(&format!(
            "**Duration:** {:.1} minutes\n",
            self.duration_minutes()
        ));
        md.push_str(&format!("**Start:** {}\n", self.start.format("%H:%M:%S")));
        md.push_str(&format!("**End:** {}\n\n", self.end.format("%H:%M:%S")));

        md.push_str("## Environmental Conditions\n");
        md.push_str(&format!(
            "- Temperature: {:.1}{}\n",
            self.temperature.qty, self.temperature.units
        ));
        md.push_str(&format!(
            "- Humidity: {:.0}{}\n\n",
            self.humidity.qty, self.humidity.units
        ));

        md.push_str("## Performance Summary\n");
        if self.distance_qty() > 0.0 {
            md.push_str(&format!(
                "- Distance: {}\n",
                with_units(format!("{:.2}", self.distance_qty()), distance_units)
            ));
        }
        if let Some(elevation) = self.elevation_up.as_ref().filter(|e| e.qty > 0.0) {
            md.push_str(&format!(
                "- Elevation Gain: {:.1} {}\n",
                elevation.qty, elevation.units
            ));
        }
        md.push_str(&format!(
            "- Total Energy: {:.1} {}\n",
            self.total_energy_burned.qty,
            self.energy_units()
        ));
        md.push_str(&format!(
            "- Intensity: {:.2} {}\n\n",
            self.intensity.qty, self.intensity.units
        ));

        if let Some(hr) = &self.heart_rate_stats {
            push_heart_rate_section(&mut md, "Heart Rate", hr);
        }

        if let Some(hrr) = self.heart_rate_recovery_stats.as_ref().filter(|s| s.count > 0) {
            push_heart_rate_section(&mut md, "Heart Rate Recovery", hrr);
        }

        if let Some(energy) = &self.active_energy_stats {
            md.push_str("## Active Energy\n");
            md.push_str(&format!(
                "- Total: {:.1} kcal\n",
                energy.total.unwrap_or_default()
            ));
            md.push_str(&format!("- Average: {:.3} kcal/point\n", energy.avg));
            md.push_str(&format!("- Data Points: {}\n\n", energy.count));
        }

        if let Some(steps) = self.step_count_stats.as_ref().filter(|s| s.count > 0) {
            md.push_str("## Steps\n");
            md.push_str(&format!(
                "- Total: {:.0} steps\n",
                steps.total.unwrap_or_default()
            ));
            md.push_str(&format!("- Average: {:.2} steps/point\n", steps.avg));
            md.push_str(&format!("- Data Points: {}\n\n", steps.count));
        }

        if let Some(distance) = self.distance_stats.as_ref().filter(|s| s.count > 0) {
            // The session total wins over the summed series when both exist
            let total = match &self.total_distance {
                Some(d) => d.qty,
                None => distance.total.unwrap_or_default(),
            };
            md.push_str("## Distance\n");
            md.push_str(&format!(
                "- Total: {}\n",
                with_units(format!("{:.2}", total), distance_units)
            ));
            let per_point = match distance_units {
                "" => "per point".to_string(),
                units => format!("{}/point", units),
            };
            md.push_str(&format!("- Average: {:.4} {}\n", distance.avg, per_point));
            md.push_str(&format!("- Data Points: {}\n\n", distance.count));
        }

        md.push_str("---\n");
        md.push_str(&format!("*Source: Apple Health (ID: {})*\n", self.id));

        md
    }
}

/// `1.25 km`, or just `1.25` without units
fn with_units(value: String, units: &str) -> String {
    if units.is_empty() {
        value
    } else {
        format!("{} {}", value, units)
    }
}

fn push_heart_rate_section(md: &mut String, heading: &str, stats: &Statistics) {
    md.push_str(&format!("## {}\n", heading));
    md.push_str(&format!("- Average: {:.0} bpm\n", stats.avg));
    md.push_str(&format!("- Range: {:.0}-{:.0} bpm\n", stats.min, stats.max));
    md.push_str(&format!("- Data Points: {}\n\n", stats.count));
}
