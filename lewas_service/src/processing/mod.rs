/// Sensor data processing pipeline.
///
/// Turns raw instrument readings into unit-correct series ready for the
/// chart: instrument-specific correction first (always in SI), then a single
/// conversion to US units when requested. All functions here are pure; the
/// only side effect anywhere in the pipeline is diagnostic logging.
///
/// Submodules:
/// - `calibration` — site and instrument constants.
/// - `corrections` — the per-strategy correction functions.

pub mod calibration;
pub mod corrections;

pub use calibration::Calibration;

use crate::model::{MeasurementSystem, RawReading};
use crate::parameters::{ParameterType, ProcessingKind};
use crate::units;

/// Applies the parameter's correction strategy. Output is in SI units and
/// has the same length and order as the input.
pub fn correct(readings: &[RawReading], parameter: ParameterType, cal: &Calibration) -> Vec<RawReading> {
    match parameter.processing() {
        ProcessingKind::None => readings.to_vec(),
        ProcessingKind::StageDatum => corrections::correct_stage(readings, cal),
        ProcessingKind::DownstreamVelocity => corrections::correct_downstream_velocity(readings, cal),
        ProcessingKind::SmoothedVelocity => corrections::smooth_velocity(readings, cal),
        ProcessingKind::FlowRate => corrections::flow_rate(readings, cal),
        ProcessingKind::AirPressure => corrections::correct_air_pressure(readings, cal),
        ProcessingKind::RatingCurve => corrections::rating_curve_flow(readings, cal),
    }
}

/// Corrects a raw series and converts it to the requested measurement system.
///
/// For `FlowRateRatingCurve` the input is the raw *stage* series; it is
/// datum-corrected, run through the rating curve and then converted like any
/// other flow rate.
pub fn process_parameter_data(
    readings: &[RawReading],
    parameter: ParameterType,
    system: MeasurementSystem,
    cal: &Calibration,
) -> Vec<RawReading> {
    let corrected = correct(readings, parameter, cal);

    match system {
        MeasurementSystem::Si => corrected,
        MeasurementSystem::Us => units::convert_to_us_units(&corrected, parameter),
    }
}
