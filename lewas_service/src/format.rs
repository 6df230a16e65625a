/// Series formatting and filtering for the chart.
///
/// `format_for_visualization` is the last pipeline stage: it parses each
/// reading's time string and emits `ProcessedPoint`s, dropping (and logging)
/// any reading whose time cannot be parsed. It is a best-effort
/// normalisation, not a validator; one bad row never fails the batch.

use chrono::{DateTime, NaiveDateTime, Utc};

use crate::logging::{self, Component};
use crate::model::{ProcessedPoint, RawReading};

/// Naive layouts accepted when the API omits an offset; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parses an API time string into a UTC instant.
///
/// RFC 3339 with any offset is preferred; a handful of offset-less layouts
/// are accepted and interpreted as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Maps processed readings onto chart points, in input order.
///
/// Readings with a missing or unparseable time are dropped with an error
/// diagnostic, so the output may be shorter than the input.
pub fn format_for_visualization(readings: &[RawReading]) -> Vec<ProcessedPoint> {
    readings
        .iter()
        .filter_map(|reading| {
            let Some(raw_time) = reading.time_field() else {
                logging::error(
                    Component::Formatter,
                    None,
                    &format!("No timestamp or datetime found in reading (value {})", reading.value),
                );
                return None;
            };

            let Some(time) = parse_timestamp(raw_time) else {
                logging::error(
                    Component::Formatter,
                    None,
                    &format!("Invalid date: {}", raw_time),
                );
                return None;
            };

            Some(ProcessedPoint {
                time,
                value: reading.value,
                timestamp: reading.timestamp.clone(),
                unit: reading.unit.clone(),
            })
        })
        .collect()
}

/// Keeps readings whose time falls within `[start, end]`, inclusive.
/// Readings with an unparseable time are excluded.
pub fn filter_by_time_range(
    readings: &[RawReading],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<RawReading> {
    readings
        .iter()
        .filter(|r| {
            r.time_field()
                .and_then(parse_timestamp)
                .is_some_and(|t| t >= start && t <= end)
        })
        .cloned()
        .collect()
}

/// Default z-score cut-off for `remove_outliers`.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Drops readings more than `threshold` population standard deviations
/// from the mean.
///
/// Mean and deviation are taken over finite values only. Non-finite readings
/// are dropouts, not outliers, and are always kept. With fewer than three
/// finite values the series is returned as is.
pub fn remove_outliers(readings: &[RawReading], threshold: f64) -> Vec<RawReading> {
    let finite: Vec<f64> = readings
        .iter()
        .map(|r| r.value)
        .filter(|v| v.is_finite())
        .collect();
    if finite.len() < 3 {
        return readings.to_vec();
    }

    let n = finite.len() as f64;
    let mean = finite.iter().sum::<f64>() / n;
    let std_dev = (finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    readings
        .iter()
        .filter(|r| !r.value.is_finite() || (r.value - mean).abs() <= threshold * std_dev)
        .cloned()
        .collect()
}
