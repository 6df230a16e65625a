/// Unit conversion between SI and US customary units.
///
/// SI is the canonical internal representation. Conversion happens once, at
/// the display boundary, and is driven by a static table from parameter to
/// `{quantity, from, to}`. Nothing in here ever fails: a missing mapping or
/// an unregistered unit pair leaves the values untouched.

use std::fmt;

use crate::logging::{self, Component};
use crate::model::RawReading;
use crate::parameters::ParameterType;

// ---------------------------------------------------------------------------
// Units and quantities
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuantityKind {
    Temperature,
    Distance,
    Velocity,
    FlowRate,
    Pressure,
    Precipitation,
    Conductivity,
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuantityKind::Temperature => write!(f, "temperature"),
            QuantityKind::Distance => write!(f, "distance"),
            QuantityKind::Velocity => write!(f, "velocity"),
            QuantityKind::FlowRate => write!(f, "flowRate"),
            QuantityKind::Pressure => write!(f, "pressure"),
            QuantityKind::Precipitation => write!(f, "precipitation"),
            QuantityKind::Conductivity => write!(f, "conductivity"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Celsius,
    Fahrenheit,
    Meter,
    Foot,
    MeterPerSecond,
    FootPerSecond,
    CentimeterPerSecond,
    CubicMeterPerSecond,
    CubicFootPerSecond,
    Hectopascal,
    InchOfMercury,
    Millimeter,
    Inch,
    MillisiemensPerCm,
    MicrosiemensPerCm,
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Unit::Celsius => "C",
            Unit::Fahrenheit => "F",
            Unit::Meter => "m",
            Unit::Foot => "ft",
            Unit::MeterPerSecond => "ms",
            Unit::FootPerSecond => "fts",
            Unit::CentimeterPerSecond => "cms",
            Unit::CubicMeterPerSecond => "m3s",
            Unit::CubicFootPerSecond => "ft3s",
            Unit::Hectopascal => "hPa",
            Unit::InchOfMercury => "inHg",
            Unit::Millimeter => "mm",
            Unit::Inch => "in",
            Unit::MillisiemensPerCm => "mScm",
            Unit::MicrosiemensPerCm => "uScm",
        };
        write!(f, "{}", s)
    }
}

/// How one parameter converts from its SI unit to its US unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitMapping {
    pub kind: QuantityKind,
    pub from: Unit,
    pub to: Unit,
}

const fn mapping(kind: QuantityKind, from: Unit, to: Unit) -> Option<UnitMapping> {
    Some(UnitMapping { kind, from, to })
}

/// SI → US mapping for a parameter. `None` means the value reads the same
/// in both systems (pH, turbidity, ...).
pub fn us_unit_mapping(parameter: ParameterType) -> Option<UnitMapping> {
    use QuantityKind::*;
    use Unit::*;

    match parameter {
        ParameterType::Stage => mapping(Distance, Meter, Foot),
        // The velocity corrections yield cm/s
        ParameterType::SmoothedVelocity | ParameterType::DownstreamVelocity => {
            mapping(Velocity, CentimeterPerSecond, FootPerSecond)
        }
        ParameterType::FlowRate | ParameterType::FlowRateRatingCurve => {
            mapping(FlowRate, CubicMeterPerSecond, CubicFootPerSecond)
        }
        ParameterType::WaterTemperature | ParameterType::AirTemperature => {
            mapping(Temperature, Celsius, Fahrenheit)
        }
        ParameterType::AirPressure => mapping(Pressure, Hectopascal, InchOfMercury),
        ParameterType::RainIntensity | ParameterType::RainAccumulation => {
            mapping(Precipitation, Millimeter, Inch)
        }
        ParameterType::SpecificConductance => {
            mapping(Conductivity, MillisiemensPerCm, MicrosiemensPerCm)
        }
        ParameterType::Ph
        | ParameterType::Salinity
        | ParameterType::Turbidity
        | ParameterType::DissolvedOxygen
        | ParameterType::Orp
        | ParameterType::Humidity
        | ParameterType::RainDuration => None,
    }
}

// ---------------------------------------------------------------------------
// Scalar conversions
// ---------------------------------------------------------------------------

pub fn c_to_f(c: f64) -> f64 {
    c * 1.8 + 32.0
}

pub fn f_to_c(f: f64) -> f64 {
    (f - 32.0) * 0.5556
}

pub fn m_to_ft(m: f64) -> f64 {
    m * 3.28084
}

pub fn ft_to_m(ft: f64) -> f64 {
    ft / 3.28084
}

pub fn ms_to_fts(ms: f64) -> f64 {
    ms * 3.28084
}

pub fn fts_to_ms(fts: f64) -> f64 {
    fts / 3.28084
}

pub fn cms_to_fts(cms: f64) -> f64 {
    cms * 0.0328084
}

pub fn m3s_to_ft3s(m3s: f64) -> f64 {
    m3s * 35.3147
}

pub fn ft3s_to_m3s(ft3s: f64) -> f64 {
    ft3s / 35.3147
}

pub fn hpa_to_inhg(hpa: f64) -> f64 {
    hpa / 33.86
}

pub fn inhg_to_hpa(inhg: f64) -> f64 {
    inhg * 33.86
}

pub fn mm_to_in(mm: f64) -> f64 {
    mm * 0.0393
}

pub fn in_to_mm(inches: f64) -> f64 {
    inches / 0.0393
}

pub fn mscm_to_uscm(mscm: f64) -> f64 {
    mscm * 1000.0
}

pub fn uscm_to_mscm(uscm: f64) -> f64 {
    uscm / 1000.0
}

/// Registered conversions. Anything not listed here is unsupported.
pub fn conversion_fn(kind: QuantityKind, from: Unit, to: Unit) -> Option<fn(f64) -> f64> {
    use QuantityKind::*;
    use Unit::*;

    let f: fn(f64) -> f64 = match (kind, from, to) {
        (Temperature, Celsius, Fahrenheit) => c_to_f,
        (Temperature, Fahrenheit, Celsius) => f_to_c,
        (Distance, Meter, Foot) => m_to_ft,
        (Distance, Foot, Meter) => ft_to_m,
        (Velocity, MeterPerSecond, FootPerSecond) => ms_to_fts,
        (Velocity, FootPerSecond, MeterPerSecond) => fts_to_ms,
        (Velocity, CentimeterPerSecond, FootPerSecond) => cms_to_fts,
        (FlowRate, CubicMeterPerSecond, CubicFootPerSecond) => m3s_to_ft3s,
        (FlowRate, CubicFootPerSecond, CubicMeterPerSecond) => ft3s_to_m3s,
        (Pressure, Hectopascal, InchOfMercury) => hpa_to_inhg,
        (Pressure, InchOfMercury, Hectopascal) => inhg_to_hpa,
        (Precipitation, Millimeter, Inch) => mm_to_in,
        (Precipitation, Inch, Millimeter) => in_to_mm,
        (Conductivity, MillisiemensPerCm, MicrosiemensPerCm) => mscm_to_uscm,
        (Conductivity, MicrosiemensPerCm, MillisiemensPerCm) => uscm_to_mscm,
        _ => return None,
    };
    Some(f)
}

// ---------------------------------------------------------------------------
// Series conversions
// ---------------------------------------------------------------------------

/// Converts every reading from `from` to `to`.
///
/// Same-unit requests return the input unchanged. An unregistered pair logs
/// a warning and also returns the input unchanged.
pub fn apply_unit_conversion(
    readings: &[RawReading],
    from: Unit,
    to: Unit,
    kind: QuantityKind,
) -> Vec<RawReading> {
    if from == to {
        return readings.to_vec();
    }

    let Some(convert) = conversion_fn(kind, from, to) else {
        logging::warn(
            Component::Units,
            None,
            &format!("No conversion available for {} to {} in {}", from, to, kind),
        );
        return readings.to_vec();
    };

    readings.iter().map(|r| r.with_value(convert(r.value))).collect()
}

/// Converts an SI series for `parameter` to US customary units.
pub fn convert_to_us_units(readings: &[RawReading], parameter: ParameterType) -> Vec<RawReading> {
    match us_unit_mapping(parameter) {
        Some(m) => apply_unit_conversion(readings, m.from, m.to, m.kind),
        None => readings.to_vec(),
    }
}
