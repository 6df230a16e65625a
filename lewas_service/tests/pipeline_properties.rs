//! Pipeline Property Tests
//!
//! End-to-end checks of the correction → conversion → formatting pipeline
//! through the public API only. No network access required.

use lewas_service::format::{format_for_visualization, remove_outliers};
use lewas_service::ingest::lewas::parse_observations;
use lewas_service::model::{MeasurementSystem, RawReading};
use lewas_service::parameters::ParameterType;
use lewas_service::processing::corrections::{downstream_velocity_value, smoothing_alpha};
use lewas_service::processing::{process_parameter_data, Calibration};
use lewas_service::units::{self, QuantityKind, Unit};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn series(values: &[f64]) -> Vec<RawReading> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| RawReading::new(&format!("2024-05-01T12:{:02}:00Z", i % 60), *v))
        .collect()
}

fn values(readings: &[RawReading]) -> Vec<f64> {
    readings.iter().map(|r| r.value).collect()
}

fn si(readings: &[RawReading], parameter: ParameterType) -> Vec<RawReading> {
    process_parameter_data(readings, parameter, MeasurementSystem::Si, &Calibration::default())
}

// ---------------------------------------------------------------------------
// Unit conversion
// ---------------------------------------------------------------------------

#[test]
fn identity_conversion_returns_series_unchanged() {
    let input = series(&[0.0, 1.5, -40.0, 1e9]);
    let pairs = [
        (QuantityKind::Temperature, Unit::Celsius),
        (QuantityKind::Distance, Unit::Foot),
        (QuantityKind::Velocity, Unit::CentimeterPerSecond),
        (QuantityKind::FlowRate, Unit::CubicMeterPerSecond),
        (QuantityKind::Pressure, Unit::Hectopascal),
        (QuantityKind::Precipitation, Unit::Inch),
        (QuantityKind::Conductivity, Unit::MicrosiemensPerCm),
    ];
    for (kind, unit) in pairs {
        assert_eq!(units::apply_unit_conversion(&input, unit, unit, kind), input);
    }
}

#[test]
fn distance_round_trip_within_tolerance() {
    for x in [0.0_f64, 1.0, 100.0, 626.0] {
        let back = units::ft_to_m(units::m_to_ft(x));
        let tolerance = 1e-6 * x.abs().max(f64::EPSILON);
        assert!((back - x).abs() <= tolerance, "{} round-tripped to {}", x, back);
    }
}

// ---------------------------------------------------------------------------
// Parameter processing
// ---------------------------------------------------------------------------

#[test]
fn stage_correction_is_a_pure_shift() {
    let raw = [0.0, 0.25, 0.5, 1.75, -0.1];
    let out = si(&series(&raw), ParameterType::Stage);
    for (i, v) in raw.iter().enumerate() {
        assert_eq!(out[i].value, v + 0.128);
    }
}

#[test]
fn smoothing_seed_is_the_corrected_first_sample() {
    let cal = Calibration::default();
    let out = si(&series(&[31.0, 45.0, 60.0]), ParameterType::SmoothedVelocity);
    assert_eq!(out[0].value, downstream_velocity_value(31.0, &cal));
}

#[test]
fn smoothing_recursion_for_two_samples() {
    let cal = Calibration::default();
    let (v0, v1) = (20.0, 48.0);
    let c0 = downstream_velocity_value(v0, &cal);
    let c1 = downstream_velocity_value(v1, &cal);
    let alpha = (c1.abs().max(24.5) - 23.0).min(30.0) / 30.0;
    assert_eq!(alpha, smoothing_alpha(c1));

    let out = si(&series(&[v0, v1]), ParameterType::SmoothedVelocity);
    assert_eq!(out[1].value, (1.0 - alpha) * c0 + alpha * c1);
}

#[test]
fn dropout_holds_previous_smoothed_value() {
    let out = si(&series(&[25.0, 30.0, f64::NAN, 35.0]), ParameterType::SmoothedVelocity);
    assert_eq!(out[2].value, out[1].value);
    assert!(out[3].value.is_finite());

    let out = si(&series(&[25.0, f64::NEG_INFINITY]), ParameterType::FlowRate);
    assert_eq!(out[1].value, out[0].value, "flow rate inherits the hold");
}

#[test]
fn null_first_sample_does_not_poison_smoothing() {
    let body = r#"{"observations": [
        {"timestamp": "2024-05-01T12:00:00Z", "value": null},
        {"timestamp": "2024-05-01T12:01:00Z", "value": 30},
        {"timestamp": "2024-05-01T12:02:00Z", "value": 31},
        {"timestamp": "2024-05-01T12:03:00Z", "value": 32}
    ]}"#;
    let raw = parse_observations(body).expect("valid body");

    let smoothed = si(&raw, ParameterType::SmoothedVelocity);
    assert!(smoothed[0].value.is_nan());
    assert_eq!(smoothed[1].value, downstream_velocity_value(30.0, &Calibration::default()));
    assert!(smoothed[1..].iter().all(|r| r.value.is_finite()));

    let flow = si(&raw, ParameterType::FlowRate);
    assert!(flow[1..].iter().all(|r| r.value.is_finite()));
}

#[test]
fn null_sample_survives_outlier_removal() {
    let body = r#"{"observations": [
        {"timestamp": "2024-05-01T12:00:00Z", "value": 0.40},
        {"timestamp": "2024-05-01T12:01:00Z", "value": null},
        {"timestamp": "2024-05-01T12:02:00Z", "value": 0.41},
        {"timestamp": "2024-05-01T12:03:00Z", "value": 0.42}
    ]}"#;
    let stage = si(&parse_observations(body).expect("valid body"), ParameterType::Stage);
    let kept = remove_outliers(&stage, 3.0);
    assert_eq!(kept.len(), 4);
}

#[test]
fn correction_keeps_rows_with_bad_timestamps() {
    let mut input = series(&[0.1, 0.2, 0.3]);
    input[1].timestamp = Some("not a time".to_string());
    let out = si(&input, ParameterType::Stage);
    assert_eq!(out.len(), 3);
    assert_eq!(out[1].timestamp.as_deref(), Some("not a time"));
}

// ---------------------------------------------------------------------------
// Formatting
// ---------------------------------------------------------------------------

#[test]
fn formatter_drops_malformed_points() {
    let input = vec![
        RawReading::new("bad", 1.0),
        RawReading::new("2024-01-01T00:00:00Z", 2.0),
    ];
    let out = format_for_visualization(&input);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].value, 2.0);
}

// ---------------------------------------------------------------------------
// End to end
// ---------------------------------------------------------------------------

#[test]
fn stage_and_rating_curve_end_to_end() {
    let raw = vec![RawReading::new("2024-05-01T12:00:00Z", 0.500)];

    let stage = format_for_visualization(&si(&raw, ParameterType::Stage));
    assert_eq!(stage.len(), 1);
    assert!((stage[0].value - 0.628).abs() < 1e-12);

    let expected_si = 1.27 * 0.628_f64.powf(4.19);
    let rating_si = format_for_visualization(&si(&raw, ParameterType::FlowRateRatingCurve));
    assert!((rating_si[0].value - expected_si).abs() < 1e-12);

    let rating_us = format_for_visualization(&process_parameter_data(
        &raw,
        ParameterType::FlowRateRatingCurve,
        MeasurementSystem::Us,
        &Calibration::default(),
    ));
    assert!((rating_us[0].value - expected_si * 35.3147).abs() < 1e-9);
}

#[test]
fn every_stage_handles_empty_input() {
    for parameter in ParameterType::ALL {
        for system in [MeasurementSystem::Si, MeasurementSystem::Us] {
            let processed =
                process_parameter_data(&[], parameter, system, &Calibration::default());
            assert!(processed.is_empty());
            assert!(format_for_visualization(&processed).is_empty());
        }
    }
    assert!(units::convert_to_us_units(&[], ParameterType::AirPressure).is_empty());
}

#[test]
fn custom_calibration_is_honoured() {
    let cal = Calibration {
        datum_offset: 1.0,
        ..Calibration::default()
    };
    let out = process_parameter_data(
        &series(&[0.5]),
        ParameterType::Stage,
        MeasurementSystem::Si,
        &cal,
    );
    assert_eq!(values(&out), vec![1.5]);
}
