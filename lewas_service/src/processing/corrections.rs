//! Per-instrument correction strategies.
//!
//! Every function takes the readings in time order and returns a new vector
//! of the same length and order. Timestamps are never inspected here; a
//! reading with a bad timestamp is still corrected and only dropped later by
//! the formatter.

use crate::model::RawReading;
use crate::processing::calibration::Calibration;

/// Adds the datum offset to raw stage.
pub fn correct_stage(readings: &[RawReading], cal: &Calibration) -> Vec<RawReading> {
    readings
        .iter()
        .map(|r| r.with_value(r.value + cal.datum_offset))
        .collect()
}

/// Affine calibration of a single downstream velocity sample.
pub fn downstream_velocity_value(value: f64, cal: &Calibration) -> f64 {
    value * cal.velocity_slope + cal.velocity_offset
}

/// Applies the downstream velocity calibration to every reading.
pub fn correct_downstream_velocity(readings: &[RawReading], cal: &Calibration) -> Vec<RawReading> {
    readings
        .iter()
        .map(|r| r.with_value(downstream_velocity_value(r.value, cal)))
        .collect()
}

/// Smoothing weight for a corrected velocity sample.
///
/// Small velocities get a fixed weight of 0.05; the weight ramps up
/// linearly above 24.5 and saturates at 1.0 from 53 upward.
pub fn smoothing_alpha(corrected: f64) -> f64 {
    (corrected.abs().max(24.5) - 23.0).min(30.0) / 30.0
}

/// One step of the smoothing recursion. A non-finite sample holds the
/// previous smoothed value.
pub fn smoothing_step(previous: f64, corrected: f64) -> f64 {
    if corrected.abs().is_finite() {
        let alpha = smoothing_alpha(corrected);
        (1.0 - alpha) * previous + alpha * corrected
    } else {
        previous
    }
}

/// Velocity calibration followed by the adaptive exponential smoothing filter.
///
/// The first finite corrected sample seeds the filter unchanged; every later
/// sample is blended with the previous *smoothed* value, so this is a single
/// left-to-right fold and depends on input order. Non-finite samples before
/// the seed are passed through as they are; after it they hold.
pub fn smooth_velocity(readings: &[RawReading], cal: &Calibration) -> Vec<RawReading> {
    correct_downstream_velocity(readings, cal)
        .into_iter()
        .scan(None::<f64>, |previous, mut reading| {
            match *previous {
                Some(prev) => reading.value = smoothing_step(prev, reading.value),
                None if !reading.value.is_finite() => return Some(reading),
                None => {}
            }
            *previous = Some(reading.value);
            Some(reading)
        })
        .collect()
}

/// Cubic flow polynomial for a mean channel velocity in m/s. Returns m³/s.
pub fn flow_from_velocity(velocity_ms: f64) -> f64 {
    2.5715 * velocity_ms.powf(3.0) - 1.7058 * velocity_ms.powf(2.0) + 1.4465 * velocity_ms - 0.0324
        + 0.015
}

/// Smoothed velocity (cm/s) converted to m/s and run through the flow polynomial.
pub fn flow_rate(readings: &[RawReading], cal: &Calibration) -> Vec<RawReading> {
    smooth_velocity(readings, cal)
        .into_iter()
        .map(|mut r| {
            r.value = flow_from_velocity(r.value * 0.01);
            r
        })
        .collect()
}

/// Numerator and denominator of the elevation correction ratio.
pub fn pressure_correction_factor(cal: &Calibration) -> (f64, f64) {
    let base = 16000.0 + 64.0 * cal.air_temperature_c;
    (base + cal.elevation_m, base - cal.elevation_m)
}

/// Altitude correction of barometric pressure.
pub fn correct_air_pressure(readings: &[RawReading], cal: &Calibration) -> Vec<RawReading> {
    let (numerator, denominator) = pressure_correction_factor(cal);
    readings
        .iter()
        .map(|r| r.with_value(r.value * numerator / denominator))
        .collect()
}

/// Rating curve `Q (m³/s) = a * stage_m ^ b`.
pub fn rating_curve_value(stage_m: f64, cal: &Calibration) -> f64 {
    cal.rating_coefficient * stage_m.powf(cal.rating_exponent)
}

/// Flow rate derived from raw stage: datum correction, then the rating curve.
/// Output is in m³/s.
pub fn rating_curve_flow(readings: &[RawReading], cal: &Calibration) -> Vec<RawReading> {
    correct_stage(readings, cal)
        .into_iter()
        .map(|mut r| {
            r.value = rating_curve_value(r.value, cal);
            r
        })
        .collect()
}
