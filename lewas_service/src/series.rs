//! Chart series loading.
//!
//! Glue between the observation source and the processing pipeline:
//! fetch raw readings for a parameter over a time window, correct and
//! convert them, and format them into chart points. This is the only place
//! where fetching and processing meet; the pipeline stages stay pure.
//!
//! # Clock injection
//! `TimeRange::window` takes `now` rather than calling `Utc::now()` so that
//! query windows are deterministic in tests.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ServiceConfig;
use crate::format;
use crate::ingest::ObservationSource;
use crate::logging::{self, Component};
use crate::model::{ApiError, MeasurementSystem, ObservationQuery, ProcessedPoint};
use crate::parameters::ParameterType;
use crate::processing::{self, Calibration};

// ---------------------------------------------------------------------------
// Time ranges
// ---------------------------------------------------------------------------

/// Preset look-back windows offered on the live-data page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "1day")]
    OneDay,
    #[serde(rename = "3days")]
    ThreeDays,
    #[serde(rename = "6days")]
    SixDays,
    #[serde(rename = "12days")]
    TwelveDays,
}

impl TimeRange {
    pub fn days(self) -> i64 {
        match self {
            TimeRange::OneDay => 1,
            TimeRange::ThreeDays => 3,
            TimeRange::SixDays => 6,
            TimeRange::TwelveDays => 12,
        }
    }

    /// The window ending at `now`.
    pub fn window(self, now: DateTime<Utc>) -> TimeWindow {
        TimeWindow {
            start: now - Duration::days(self.days()),
            end: now,
        }
    }
}

impl std::str::FromStr for TimeRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1day" => Ok(TimeRange::OneDay),
            "3days" => Ok(TimeRange::ThreeDays),
            "6days" => Ok(TimeRange::SixDays),
            "12days" => Ok(TimeRange::TwelveDays),
            other => Err(format!(
                "unknown time range '{}' (expected 1day, 3days, 6days or 12days)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Per-request pipeline settings.
#[derive(Debug, Clone)]
pub struct LoadOptions<'a> {
    pub system: MeasurementSystem,
    pub calibration: &'a Calibration,
    pub limit: Option<u32>,
    pub outlier_threshold: Option<f64>,
}

impl<'a> LoadOptions<'a> {
    pub fn from_config(config: &'a ServiceConfig) -> Self {
        Self {
            system: config.display.unit_system,
            calibration: &config.calibration,
            limit: config.api.limit,
            outlier_threshold: config.display.outlier_threshold,
        }
    }
}

/// One processed series ready for an axis.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub parameter: String,
    pub label: String,
    pub unit: String,
    pub points: Vec<ProcessedPoint>,
}

/// Observation query for a parameter. Derived parameters query the series
/// they are computed from.
pub fn build_query(parameter: ParameterType, window: TimeWindow, limit: Option<u32>) -> ObservationQuery {
    let info = parameter.info();
    ObservationQuery {
        instrument: info.instrument.to_string(),
        metric: info.metric.to_string(),
        medium: info.medium.to_string(),
        start: window.start,
        end: window.end,
        limit,
    }
}

/// Fetches, processes and formats one parameter.
///
/// An empty API result is not an error; it yields an empty series.
pub fn load_parameter_series(
    source: &dyn ObservationSource,
    parameter: ParameterType,
    window: TimeWindow,
    options: &LoadOptions<'_>,
) -> Result<Vec<ProcessedPoint>, ApiError> {
    let key = parameter.key();
    let query = build_query(parameter, window, options.limit);
    let raw = source.fetch_observations(&query)?;

    if raw.is_empty() {
        logging::warn(Component::Api, Some(key), "No data found for parameter");
        return Ok(Vec::new());
    }
    logging::debug(
        Component::Api,
        Some(key),
        &format!("Found {} raw observations", raw.len()),
    );

    let mut processed =
        processing::process_parameter_data(&raw, parameter, options.system, options.calibration);

    if let Some(threshold) = options.outlier_threshold {
        let before = processed.len();
        processed = format::remove_outliers(&processed, threshold);
        if processed.len() < before {
            logging::debug(
                Component::Processor,
                Some(key),
                &format!("Removed {} outliers (z > {})", before - processed.len(), threshold),
            );
        }
    }

    let points = format::format_for_visualization(&processed);
    if points.len() < processed.len() {
        logging::warn(
            Component::Formatter,
            Some(key),
            &format!(
                "Dropped {} of {} points with unusable timestamps",
                processed.len() - points.len(),
                processed.len()
            ),
        );
    }

    Ok(points)
}

/// Loads several parameters for a multi-axis chart.
///
/// A parameter that fails to load is logged and comes back with no points;
/// the remaining axes still load.
pub fn load_chart_series(
    source: &dyn ObservationSource,
    parameters: &[ParameterType],
    window: TimeWindow,
    options: &LoadOptions<'_>,
) -> Vec<ChartSeries> {
    let mut failed = 0;

    let series: Vec<ChartSeries> = parameters
        .iter()
        .map(|&parameter| {
            let points = match load_parameter_series(source, parameter, window, options) {
                Ok(points) => points,
                Err(e) => {
                    failed += 1;
                    logging::log_fetch_failure(parameter.key(), "Loading series", &e);
                    Vec::new()
                }
            };
            ChartSeries {
                parameter: parameter.key().to_string(),
                label: parameter.label(options.system),
                unit: parameter.unit_abbr(options.system).to_string(),
                points,
            }
        })
        .collect();

    logging::log_load_summary(parameters.len(), parameters.len() - failed, failed);
    series
}
