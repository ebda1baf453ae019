//! Series statistics
//!
//! `Statistics` condenses one numeric series into count/min/max/avg and,
//! for cumulative quantities, total/first/last. An empty series has no
//! statistics at all rather than a zeroed record.

use serde::{Deserialize, Serialize};

/// What a series measures, which decides the fields worth reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// Quantities that add up over time (energy, steps, distance):
    /// total, first and last are reported
    Cumulative,
    /// Point readings (heart rate, metric samples): only min/max/avg
    Instantaneous,
}

/// Aggregates over one series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<f64>,
}

impl Statistics {
    /// Aggregate `extract` applied to every element of `series`.
    ///
    /// Returns `None` for an empty series. Min and max start from the first
    /// element; NaN is not special-cased.
    pub fn aggregate<T, F>(series: &[T], kind: SeriesKind, extract: F) -> Option<Self>
    where
        F: Fn(&T) -> f64,
    {
        let (head, _) = series.split_first()?;
        let first = extract(head);

        let mut min = first;
        let mut max = first;
        let mut sum = 0.0;
        let mut last = first;

        for item in series {
            let value = extract(item);
            if value < min {
                min = value;
            }
            if value > max {
                max = value;
            }
            sum += value;
            last = value;
        }

        let count = series.len();
        let cumulative = kind == SeriesKind::Cumulative;

        Some(Self {
            count,
            min,
            max,
            avg: sum / count as f64,
            total: cumulative.then_some(sum),
            first: cumulative.then_some(first),
            last: cumulative.then_some(last),
        })
    }

    /// Aggregate a plain slice of values
    pub fn of_values(values: &[f64], kind: SeriesKind) -> Option<Self> {
        Self::aggregate(values, kind, |v| *v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_series_is_absent() {
        assert!(Statistics::of_values(&[], SeriesKind::Cumulative).is_none());
        assert!(Statistics::of_values(&[], SeriesKind::Instantaneous).is_none());
    }

    #[test]
    fn test_cumulative_series() {
        let stats = Statistics::of_values(&[100.0, 150.5, 200.0], SeriesKind::Cumulative).unwrap();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.min, 100.0);
        assert_eq!(stats.max, 200.0);
        assert!((stats.avg - 150.166_666).abs() < 1e-4);
        assert_eq!(stats.total, Some(450.5));
        assert_eq!(stats.first, Some(100.0));
        assert_eq!(stats.last, Some(200.0));
    }

    #[test]
    fn test_instantaneous_series_omits_totals() {
        let stats = Statistics::of_values(&[72.0, 140.0, 95.0], SeriesKind::Instantaneous).unwrap();
        assert_eq!(stats.min, 72.0);
        assert_eq!(stats.max, 140.0);
        assert!(stats.total.is_none());
        assert!(stats.first.is_none());
        assert!(stats.last.is_none());

        let json = serde_json::to_value(&stats).unwrap();
        assert!(json.get("total").is_none());
        assert!(json.get("first").is_none());
    }

    #[test]
    fn test_single_value() {
        let stats = Statistics::of_values(&[175.5], SeriesKind::Cumulative).unwrap();
        assert_eq!(stats.min, 175.5);
        assert_eq!(stats.max, 175.5);
        assert_eq!(stats.avg, 175.5);
        assert_eq!(stats.first, stats.last);
    }

    #[test]
    fn test_extractor_and_order() {
        let pairs = [("a", 3.0), ("b", -1.0), ("c", 7.0)];
        let stats = Statistics::aggregate(&pairs, SeriesKind::Cumulative, |p| p.1).unwrap();
        assert_eq!(stats.first, Some(3.0));
        assert_eq!(stats.last, Some(7.0));
        assert_eq!(stats.min, -1.0);
    }

    #[test]
    fn test_min_avg_max_ordering_holds() {
        let series: [&[f64]; 4] = [
            &[1.0],
            &[5.0, 5.0, 5.0],
            &[-3.5, 10.25, 0.0, 2.0],
            &[1e6, 1e-6, 42.0, 13.0, 99.9],
        ];

        for values in series {
            let stats = Statistics::of_values(values, SeriesKind::Instantaneous).unwrap();
            assert_eq!(stats.count, values.len());
            assert!(stats.min <= stats.avg && stats.avg <= stats.max, "{values:?}");
        }
    }
}
