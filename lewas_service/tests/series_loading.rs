//! Series Loading Integration Tests
//!
//! Exercises fetch → process → format against an in-memory observation
//! source standing in for the LEWAS API.

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use lewas_service::ingest::ObservationSource;
use lewas_service::model::{ApiError, MeasurementSystem, ObservationQuery, RawReading};
use lewas_service::parameters::ParameterType;
use lewas_service::processing::Calibration;
use lewas_service::series::{self, LoadOptions, TimeRange, TimeWindow};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Serves canned readings keyed by (instrument, medium, metric) and records
/// every query it receives.
#[derive(Default)]
struct InMemorySource {
    series: HashMap<(String, String, String), Result<Vec<RawReading>, u16>>,
    queries: RefCell<Vec<ObservationQuery>>,
}

impl InMemorySource {
    fn with(mut self, parameter: ParameterType, readings: Vec<RawReading>) -> Self {
        self.series.insert(key_for(parameter), Ok(readings));
        self
    }

    fn failing(mut self, parameter: ParameterType, status: u16) -> Self {
        self.series.insert(key_for(parameter), Err(status));
        self
    }
}

fn key_for(parameter: ParameterType) -> (String, String, String) {
    let info = parameter.info();
    (
        info.instrument.to_string(),
        info.medium.to_string(),
        info.metric.to_string(),
    )
}

impl ObservationSource for InMemorySource {
    fn fetch_observations(&self, query: &ObservationQuery) -> Result<Vec<RawReading>, ApiError> {
        self.queries.borrow_mut().push(query.clone());
        let key = (
            query.instrument.clone(),
            query.medium.clone(),
            query.metric.clone(),
        );
        match self.series.get(&key) {
            Some(Ok(readings)) => Ok(readings.clone()),
            Some(Err(status)) => Err(ApiError::HttpError(*status)),
            None => Ok(Vec::new()),
        }
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 13, 0, 0).unwrap()
}

fn window() -> TimeWindow {
    TimeRange::OneDay.window(fixed_now())
}

fn options(system: MeasurementSystem, calibration: &Calibration) -> LoadOptions<'_> {
    LoadOptions {
        system,
        calibration,
        limit: Some(1000),
        outlier_threshold: None,
    }
}

fn stage_readings() -> Vec<RawReading> {
    vec![
        RawReading::new("2024-05-01T12:00:00Z", 0.500),
        RawReading::new("2024-05-01T12:01:00Z", 0.510),
        RawReading::new("garbled", 0.520),
    ]
}

// ---------------------------------------------------------------------------
// Single parameter
// ---------------------------------------------------------------------------

#[test]
fn stage_series_is_corrected_converted_and_formatted() {
    let cal = Calibration::default();
    let source = InMemorySource::default().with(ParameterType::Stage, stage_readings());

    let points = series::load_parameter_series(
        &source,
        ParameterType::Stage,
        window(),
        &options(MeasurementSystem::Us, &cal),
    )
    .expect("stage loads");

    // the garbled row is dropped at formatting
    assert_eq!(points.len(), 2);
    assert!((points[0].value - (0.500 + 0.128) * 3.28084).abs() < 1e-12);
    assert!(points[0].time < points[1].time);

    let queries = source.queries.borrow();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].start, window().start);
    assert_eq!(queries[0].end, window().end);
    assert_eq!(queries[0].limit, Some(1000));
}

#[test]
fn rating_curve_is_computed_from_stage_observations() {
    let cal = Calibration::default();
    let source = InMemorySource::default().with(ParameterType::Stage, stage_readings());

    let points = series::load_parameter_series(
        &source,
        ParameterType::FlowRateRatingCurve,
        window(),
        &options(MeasurementSystem::Si, &cal),
    )
    .expect("rating curve loads");

    assert_eq!(points.len(), 2);
    let expected = 1.27 * (0.510_f64 + 0.128).powf(4.19);
    assert!((points[1].value - expected).abs() < 1e-12);
    assert_eq!(source.queries.borrow()[0].metric, "stage");
}

#[test]
fn empty_result_is_an_empty_series() {
    let cal = Calibration::default();
    let source = InMemorySource::default();
    let points = series::load_parameter_series(
        &source,
        ParameterType::Turbidity,
        window(),
        &options(MeasurementSystem::Si, &cal),
    )
    .expect("empty is not an error");
    assert!(points.is_empty());
}

#[test]
fn http_failure_is_returned_for_single_parameter() {
    let cal = Calibration::default();
    let source = InMemorySource::default().failing(ParameterType::AirPressure, 503);
    let result = series::load_parameter_series(
        &source,
        ParameterType::AirPressure,
        window(),
        &options(MeasurementSystem::Us, &cal),
    );
    assert_eq!(result, Err(ApiError::HttpError(503)));
}

#[test]
fn outlier_threshold_removes_spikes_before_formatting() {
    let cal = Calibration::default();
    let mut readings: Vec<RawReading> = (0..30)
        .map(|i| RawReading::new(&format!("2024-05-01T12:{:02}:00Z", i), 7.0 + (i % 3) as f64 * 0.05))
        .collect();
    readings.push(RawReading::new("2024-05-01T12:45:00Z", 14.0));
    let source = InMemorySource::default().with(ParameterType::Ph, readings);

    let mut opts = options(MeasurementSystem::Si, &cal);
    opts.outlier_threshold = Some(3.0);
    let points = series::load_parameter_series(&source, ParameterType::Ph, window(), &opts)
        .expect("ph loads");
    assert_eq!(points.len(), 30);
    assert!(points.iter().all(|p| p.value < 8.0));
}

// ---------------------------------------------------------------------------
// Multi-axis chart
// ---------------------------------------------------------------------------

#[test]
fn chart_load_survives_a_failing_axis() {
    let cal = Calibration::default();
    let source = InMemorySource::default()
        .with(
            ParameterType::WaterTemperature,
            vec![RawReading::new("2024-05-01T12:00:00Z", 10.0)],
        )
        .failing(ParameterType::DissolvedOxygen, 500)
        .with(
            ParameterType::AirTemperature,
            vec![RawReading::new("2024-05-01T12:00:00Z", -5.0)],
        );

    let axes = [
        ParameterType::WaterTemperature,
        ParameterType::DissolvedOxygen,
        ParameterType::AirTemperature,
    ];
    let chart = series::load_chart_series(&source, &axes, window(), &options(MeasurementSystem::Us, &cal));

    assert_eq!(chart.len(), 3);
    assert_eq!(chart[0].label, "Water Temperature [°F]");
    assert_eq!(chart[0].points[0].value, 50.0);
    assert_eq!(chart[1].parameter, "dissolved_oxygen");
    assert!(chart[1].points.is_empty());
    assert_eq!(chart[2].unit, "°F");
    assert_eq!(chart[2].points[0].value, 23.0);
}
