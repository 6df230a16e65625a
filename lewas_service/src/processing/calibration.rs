//! Instrument calibration constants.
//!
//! These are fixed per site and per instrument. They are loaded once from the
//! `[calibration]` table of the service config (falling back to the values
//! below) and passed by reference into every correction.

use serde::Deserialize;

/// Datum offset aligning raw stage to the reference elevation, meters.
pub const DATUM_OFFSET_M: f64 = 0.128;
/// Downstream velocity calibration slope.
pub const VELOCITY_SLOPE: f64 = 0.7896014;
/// Downstream velocity calibration offset.
pub const VELOCITY_OFFSET: f64 = -0.016046;
/// Site elevation above sea level, meters.
pub const SITE_ELEVATION_M: f64 = 626.0;
/// Reference air temperature for the pressure correction, °C.
pub const REFERENCE_AIR_TEMP_C: f64 = 10.0;
/// Rating curve `Q = a * stage^b`.
pub const RATING_COEFFICIENT: f64 = 1.27;
pub const RATING_EXPONENT: f64 = 4.19;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub datum_offset: f64,
    pub velocity_slope: f64,
    pub velocity_offset: f64,
    pub elevation_m: f64,
    pub air_temperature_c: f64,
    pub rating_coefficient: f64,
    pub rating_exponent: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            datum_offset: DATUM_OFFSET_M,
            velocity_slope: VELOCITY_SLOPE,
            velocity_offset: VELOCITY_OFFSET,
            elevation_m: SITE_ELEVATION_M,
            air_temperature_c: REFERENCE_AIR_TEMP_C,
            rating_coefficient: RATING_COEFFICIENT,
            rating_exponent: RATING_EXPONENT,
        }
    }
}

impl Calibration {
    /// Checks the constants are usable. The pressure correction divides by
    /// `16000 + 64*T - E`, so that term must stay positive.
    pub fn validate(&self) -> Result<(), String> {
        let values = [
            ("datum_offset", self.datum_offset),
            ("velocity_slope", self.velocity_slope),
            ("velocity_offset", self.velocity_offset),
            ("elevation_m", self.elevation_m),
            ("air_temperature_c", self.air_temperature_c),
            ("rating_coefficient", self.rating_coefficient),
            ("rating_exponent", self.rating_exponent),
        ];
        if let Some((name, _)) = values.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("calibration.{} must be a finite number", name));
        }
        if 16000.0 + 64.0 * self.air_temperature_c - self.elevation_m <= 0.0 {
            return Err("calibration.elevation_m is too high for the pressure correction".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_site_constants() {
        let cal = Calibration::default();
        assert_eq!(cal.datum_offset, 0.128);
        assert_eq!(cal.velocity_slope, 0.7896014);
        assert_eq!(cal.velocity_offset, -0.016046);
        assert_eq!(cal.elevation_m, 626.0);
        assert_eq!(cal.air_temperature_c, 10.0);
        assert!(cal.validate().is_ok());
    }

    #[test]
    fn test_partial_table_keeps_remaining_defaults() {
        let cal: Calibration = toml::from_str("datum_offset = 0.2").expect("valid toml");
        assert_eq!(cal.datum_offset, 0.2);
        assert_eq!(cal.velocity_slope, VELOCITY_SLOPE);
    }

    #[test]
    fn test_impossible_elevation_is_rejected() {
        let cal = Calibration {
            elevation_m: 20_000.0,
            ..Calibration::default()
        };
        assert!(cal.validate().is_err());
    }
}
