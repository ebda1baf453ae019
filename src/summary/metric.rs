//! Metric series summaries

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::metadata::{
    long_date, short_date, short_date_with_year, title_case, ImportMetadata, MemoryContent,
};
use super::stats::{SeriesKind, Statistics};
use crate::model::dates::flexible;
use crate::model::Metric;

/// A metric series condensed to its range and statistics
///
/// A metric without samples keeps only `name`, `units` and
/// `dataPoints == 0`; check [`MetricSummary::is_empty`] before reading
/// `span`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSummary {
    pub name: String,
    pub units: String,
    pub data_points: usize,
    #[serde(flatten)]
    pub span: Option<MetricSpan>,
}

/// Everything derived from a non-empty series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricSpan {
    #[serde(with = "flexible")]
    pub start_date: DateTime<FixedOffset>,
    #[serde(with = "flexible")]
    pub end_date: DateTime<FixedOffset>,
    pub min: f64,
    pub max: f64,
    pub average: f64,
    /// `durationMinutes` holds the span between first and last sample
    pub import_metadata: ImportMetadata,
    pub memory_content: MemoryContent,
}

impl MetricSummary {
    pub fn build(metric: &Metric) -> Self {
        let span = match (
            metric.data.first(),
            metric.data.last(),
            Statistics::aggregate(&metric.data, SeriesKind::Instantaneous, |r| r.qty),
        ) {
            (Some(first), Some(last), Some(stats)) => {
                Some(MetricSpan::new(metric, first.date, last.date, &stats))
            }
            _ => None,
        };

        Self {
            name: metric.name.clone(),
            units: metric.units.clone(),
            data_points: metric.data.len(),
            span,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data_points == 0
    }
}

impl MetricSpan {
    fn new(
        metric: &Metric,
        start_date: DateTime<FixedOffset>,
        end_date: DateTime<FixedOffset>,
        stats: &Statistics,
    ) -> Self {
        let span_minutes = (end_date - start_date).num_seconds() as f64 / 60.0;
        let readable_name = metric.name.replace('_', " ");

        let title = format!(
            "{} - {} to {}",
            title_case(&metric.name),
            short_date(&start_date),
            short_date_with_year(&end_date)
        );

        let summary = format!(
            "{}: {} data points, average {:.2} {} (range: {:.2}-{:.2})",
            readable_name, stats.count, stats.avg, metric.units, stats.min, stats.max
        );

        let mut md = String::new();
        md.push_str(&format!("# {}\n\n", title));
        md.push_str("## Time Range\n");
        md.push_str(&format!("- **Start:** {}\n", long_date(&start_date)));
        md.push_str(&format!("- **End:** {}\n", long_date(&end_date)));
        md.push_str(&format!(
            "- **Duration:** {:.0} days\n\n",
            span_minutes / (24.0 * 60.0)
        ));
        md.push_str("## Statistics\n");
        md.push_str(&format!("- **Data Points:** {}\n", stats.count));
        md.push_str(&format!("- **Average:** {:.2} {}\n", stats.avg, metric.units));
        md.push_str(&format!("- **Minimum:** {:.2} {}\n", stats.min, metric.units));
        md.push_str(&format!("- **Maximum:** {:.2} {}\n\n", stats.max, metric.units));
        md.push_str("---\n");
        md.push_str("*Source: Apple Health*\n");

        Self {
            start_date,
            end_date,
            min: stats.min,
            max: stats.max,
            average: stats.avg,
            import_metadata: ImportMetadata::at(&start_date).with_duration_minutes(span_minutes),
            memory_content: MemoryContent {
                title,
                summary,
                markdown: md,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn metric(points: Value) -> Metric {
        serde_json::from_value(json!({
            "name": "resting_heart_rate",
            "units": "bpm",
            "data": points
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_metric_has_no_span() {
        let summary = MetricSummary::build(&metric(json!([])));

        assert!(summary.is_empty());
        assert!(summary.span.is_none());

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            json!({"name": "resting_heart_rate", "units": "bpm", "dataPoints": 0})
        );
    }

    #[test]
    fn test_statistics_and_span() {
        let summary = MetricSummary::build(&metric(json!([
            {"date": "2025-11-10 07:00:00 +0000", "qty": 58},
            {"date": "2025-11-11 07:00:00 +0000", "qty": 62},
            {"date": "2025-11-13 07:00:00 +0000", "qty": 57}
        ])));

        assert_eq!(summary.data_points, 3);
        let span = summary.span.as_ref().unwrap();
        assert_eq!(span.min, 57.0);
        assert_eq!(span.max, 62.0);
        assert_eq!(span.average, 59.0);
        assert_eq!(span.import_metadata.duration_minutes, 3.0 * 24.0 * 60.0);
        assert_eq!(span.import_metadata.day_of_week, "Monday");

        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["average"], 59.0);
        assert_eq!(json["startDate"], "2025-11-10T07:00:00Z");
        assert!(json["importMetadata"].is_object());
    }

    #[test]
    fn test_memory_content() {
        let summary = MetricSummary::build(&metric(json!([
            {"date": "2025-11-10 07:00:00 +0000", "qty": 58},
            {"date": "2025-11-13 07:00:00 +0000", "qty": 61}
        ])));
        let content = &summary.span.as_ref().unwrap().memory_content;

        assert_eq!(content.title, "Resting Heart Rate - Nov 10 to Nov 13, 2025");
        assert_eq!(
            content.summary,
            "resting heart rate: 2 data points, average 59.50 bpm (range: 58.00-61.00)"
        );
        assert!(content.markdown.contains("- **Duration:** 3 days\n"));
        assert!(content.markdown.contains("- **Maximum:** 61.00 bpm\n"));
        assert!(content.markdown.ends_with("*Source: Apple Health*\n"));
    }

    #[test]
    fn test_single_point_spans_zero_minutes() {
        let summary = MetricSummary::build(&metric(json!([
            {"date": "2025-11-10T07:00:00Z", "qty": 58}
        ])));
        let span = summary.span.unwrap();
        assert_eq!(span.import_metadata.duration_minutes, 0.0);
        assert_eq!(span.start_date, span.end_date);
    }
}
