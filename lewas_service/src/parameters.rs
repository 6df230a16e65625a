/// Parameter registry for the LEWAS creek monitoring dashboard.
///
/// Defines the canonical list of parameters the dashboard can chart, along
/// with where each one comes from on the observation API (instrument,
/// medium, metric) and how it is labelled on an axis. This is the single
/// source of truth for parameter keys; all other modules should go through
/// `ParameterType` rather than hardcoding key strings.

use crate::model::{ApiError, MeasurementSystem};

// ---------------------------------------------------------------------------
// Parameter types
// ---------------------------------------------------------------------------

/// Every quantity the dashboard knows how to fetch, process and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterType {
    Stage,
    SmoothedVelocity,
    FlowRate,
    FlowRateRatingCurve,
    DownstreamVelocity,
    Ph,
    SpecificConductance,
    Salinity,
    Turbidity,
    DissolvedOxygen,
    WaterTemperature,
    Orp,
    AirTemperature,
    Humidity,
    AirPressure,
    RainIntensity,
    RainAccumulation,
    RainDuration,
}

/// Correction strategy applied by the Parameter Processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingKind {
    /// Value is already physically meaningful.
    None,
    /// Datum offset added to raw stage.
    StageDatum,
    /// Affine calibration of the downstream velocity sensor.
    DownstreamVelocity,
    /// Velocity calibration followed by adaptive exponential smoothing.
    SmoothedVelocity,
    /// Smoothed velocity pushed through the cubic flow polynomial.
    FlowRate,
    /// Station pressure corrected for site elevation.
    AirPressure,
    /// Flow rate derived from corrected stage via the rating curve.
    RatingCurve,
}

impl ParameterType {
    /// All parameters, in dropdown order.
    pub const ALL: [ParameterType; 18] = [
        ParameterType::Stage,
        ParameterType::SmoothedVelocity,
        ParameterType::FlowRate,
        ParameterType::FlowRateRatingCurve,
        ParameterType::DownstreamVelocity,
        ParameterType::Ph,
        ParameterType::SpecificConductance,
        ParameterType::Salinity,
        ParameterType::Turbidity,
        ParameterType::DissolvedOxygen,
        ParameterType::WaterTemperature,
        ParameterType::Orp,
        ParameterType::AirTemperature,
        ParameterType::Humidity,
        ParameterType::AirPressure,
        ParameterType::RainIntensity,
        ParameterType::RainAccumulation,
        ParameterType::RainDuration,
    ];

    /// The correction strategy for this parameter.
    pub fn processing(self) -> ProcessingKind {
        match self {
            ParameterType::Stage => ProcessingKind::StageDatum,
            ParameterType::SmoothedVelocity => ProcessingKind::SmoothedVelocity,
            ParameterType::FlowRate => ProcessingKind::FlowRate,
            ParameterType::FlowRateRatingCurve => ProcessingKind::RatingCurve,
            ParameterType::DownstreamVelocity => ProcessingKind::DownstreamVelocity,
            ParameterType::AirPressure => ProcessingKind::AirPressure,
            ParameterType::Ph
            | ParameterType::SpecificConductance
            | ParameterType::Salinity
            | ParameterType::Turbidity
            | ParameterType::DissolvedOxygen
            | ParameterType::WaterTemperature
            | ParameterType::Orp
            | ParameterType::AirTemperature
            | ParameterType::Humidity
            | ParameterType::RainIntensity
            | ParameterType::RainAccumulation
            | ParameterType::RainDuration => ProcessingKind::None,
        }
    }

    /// Registry metadata for this parameter.
    pub fn info(self) -> &'static ParameterInfo {
        // The registry is laid out in declaration order; the registry test
        // below guards that.
        &PARAMETER_REGISTRY[self as usize]
    }

    /// Snake-case key used by the dashboard and the CLI, e.g. "smoothed_velocity".
    pub fn key(self) -> &'static str {
        self.info().key
    }

    /// Axis label including the unit for the given system, e.g. "Stage [ft]".
    pub fn label(self, system: MeasurementSystem) -> String {
        let info = self.info();
        match info.unit_abbr(system) {
            "" => info.axis_title.to_string(),
            unit => format!("{} [{}]", info.axis_title, unit),
        }
    }

    /// Unit abbreviation for the given system; empty for dimensionless values.
    pub fn unit_abbr(self, system: MeasurementSystem) -> &'static str {
        self.info().unit_abbr(system)
    }
}

impl std::str::FromStr for ParameterType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        find_parameter(s.trim())
            .map(|info| info.parameter)
            .ok_or_else(|| ApiError::UnknownParameter(s.to_string()))
    }
}

impl std::fmt::Display for ParameterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ---------------------------------------------------------------------------
// Parameter metadata
// ---------------------------------------------------------------------------

/// Dropdown group a parameter is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    WaterQuantity,
    WaterQuality,
    Weather,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::WaterQuantity => write!(f, "Water Quantity"),
            Category::WaterQuality => write!(f, "Water Quality"),
            Category::Weather => write!(f, "Weather"),
        }
    }
}

/// Metadata for a single chartable parameter.
pub struct ParameterInfo {
    pub parameter: ParameterType,
    pub key: &'static str,
    /// Short name shown in the parameter dropdown.
    pub option_label: &'static str,
    /// Longer name shown on the chart axis.
    pub axis_title: &'static str,
    pub category: Category,
    /// Observation API filter triple. Derived parameters point at the
    /// series they are computed from.
    pub instrument: &'static str,
    pub medium: &'static str,
    pub metric: &'static str,
    pub si_unit: &'static str,
    pub us_unit: &'static str,
}

impl ParameterInfo {
    pub fn unit_abbr(&self, system: MeasurementSystem) -> &'static str {
        match system {
            MeasurementSystem::Si => self.si_unit,
            MeasurementSystem::Us => self.us_unit,
        }
    }
}

const ARGONAUT: &str = "argonaut";
const SONDE: &str = "sonde";
const WEATHER_STATION: &str = "weather_station";

/// All parameters shown on the live-data page, in the same order as
/// `ParameterType::ALL`.
///
/// Velocity and stage come from the Argonaut-SW acoustic Doppler meter, water
/// quality from the multiparameter sonde and weather from the rooftop
/// weather station.
pub static PARAMETER_REGISTRY: &[ParameterInfo] = &[
    ParameterInfo {
        parameter: ParameterType::Stage,
        key: "stage",
        option_label: "Stage",
        axis_title: "Stage",
        category: Category::WaterQuantity,
        instrument: ARGONAUT,
        medium: "water",
        metric: "stage",
        si_unit: "m",
        us_unit: "ft",
    },
    ParameterInfo {
        parameter: ParameterType::SmoothedVelocity,
        key: "smoothed_velocity",
        option_label: "Smoothed Velocity",
        axis_title: "Smoothed Velocity",
        category: Category::WaterQuantity,
        instrument: ARGONAUT,
        medium: "water",
        metric: "velocity-x",
        si_unit: "m/s",
        us_unit: "ft/s",
    },
    ParameterInfo {
        parameter: ParameterType::FlowRate,
        key: "flow_rate",
        option_label: "Est. Flow Rate",
        axis_title: "Est. Flow Rate",
        category: Category::WaterQuantity,
        instrument: ARGONAUT,
        medium: "water",
        metric: "velocity-x",
        si_unit: "m³/s",
        us_unit: "ft³/s",
    },
    ParameterInfo {
        parameter: ParameterType::FlowRateRatingCurve,
        key: "flow_rate_rating_curve",
        option_label: "Est. Flowrate - Rating Curve",
        axis_title: "Est. Flowrate - Rating Curve",
        category: Category::WaterQuantity,
        // computed from stage
        instrument: ARGONAUT,
        medium: "water",
        metric: "stage",
        si_unit: "m³/s",
        us_unit: "ft³/s",
    },
    ParameterInfo {
        parameter: ParameterType::DownstreamVelocity,
        key: "downstream_velocity",
        option_label: "Downstream Velocity",
        axis_title: "Downstream Velocity",
        category: Category::WaterQuantity,
        instrument: ARGONAUT,
        medium: "water",
        metric: "velocity-x",
        si_unit: "m/s",
        us_unit: "ft/s",
    },
    ParameterInfo {
        parameter: ParameterType::Ph,
        key: "ph",
        option_label: "pH",
        axis_title: "pH",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "ph",
        si_unit: "",
        us_unit: "",
    },
    ParameterInfo {
        parameter: ParameterType::SpecificConductance,
        key: "specific_conductance",
        option_label: "Specific conductance",
        axis_title: "Specific Conductance",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "specific_conductance",
        si_unit: "μS/cm",
        us_unit: "μS/cm",
    },
    ParameterInfo {
        parameter: ParameterType::Salinity,
        key: "salinity",
        option_label: "Salinity",
        axis_title: "Salinity",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "salinity",
        si_unit: "ppt",
        us_unit: "ppt",
    },
    ParameterInfo {
        parameter: ParameterType::Turbidity,
        key: "turbidity",
        option_label: "Turbidity",
        axis_title: "Turbidity",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "turbidity",
        si_unit: "NTU",
        us_unit: "NTU",
    },
    ParameterInfo {
        parameter: ParameterType::DissolvedOxygen,
        key: "dissolved_oxygen",
        option_label: "DO",
        axis_title: "Dissolved Oxygen",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "dissolved_oxygen",
        si_unit: "mg/l",
        us_unit: "mg/l",
    },
    ParameterInfo {
        parameter: ParameterType::WaterTemperature,
        key: "water_temperature",
        option_label: "Water temp.",
        axis_title: "Water Temperature",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "temperature",
        si_unit: "°C",
        us_unit: "°F",
    },
    ParameterInfo {
        parameter: ParameterType::Orp,
        key: "orp",
        option_label: "ORP",
        axis_title: "Oxidation Reduct. Potent.",
        category: Category::WaterQuality,
        instrument: SONDE,
        medium: "water",
        metric: "orp",
        si_unit: "mV",
        us_unit: "mV",
    },
    ParameterInfo {
        parameter: ParameterType::AirTemperature,
        key: "air_temperature",
        option_label: "Air temp.",
        axis_title: "Air Temperature",
        category: Category::Weather,
        instrument: WEATHER_STATION,
        medium: "air",
        metric: "temperature",
        si_unit: "°C",
        us_unit: "°F",
    },
    ParameterInfo {
        parameter: ParameterType::Humidity,
        key: "humidity",
        option_label: "Humidity",
        axis_title: "Humidity",
        category: Category::Weather,
        instrument: WEATHER_STATION,
        medium: "air",
        metric: "humidity",
        si_unit: "%RH",
        us_unit: "%RH",
    },
    ParameterInfo {
        parameter: ParameterType::AirPressure,
        key: "air_pressure",
        option_label: "Air pressure",
        axis_title: "Air Pressure",
        category: Category::Weather,
        instrument: WEATHER_STATION,
        medium: "air",
        metric: "pressure",
        si_unit: "hPa",
        us_unit: "inHg",
    },
    ParameterInfo {
        parameter: ParameterType::RainIntensity,
        key: "rain_intensity",
        option_label: "Rain Intensity",
        axis_title: "Rain Intensity",
        category: Category::Weather,
        instrument: WEATHER_STATION,
        medium: "rain",
        metric: "intensity",
        si_unit: "mm/h",
        us_unit: "in/h",
    },
    ParameterInfo {
        parameter: ParameterType::RainAccumulation,
        key: "rain_accumulation",
        option_label: "Rain Accumulation",
        axis_title: "Rain Accumulation",
        category: Category::Weather,
        instrument: WEATHER_STATION,
        medium: "rain",
        metric: "accumulation",
        si_unit: "mm",
        us_unit: "in",
    },
    ParameterInfo {
        parameter: ParameterType::RainDuration,
        key: "rain_duration",
        option_label: "Rain Duration",
        axis_title: "Rain Duration",
        category: Category::Weather,
        instrument: WEATHER_STATION,
        medium: "rain",
        metric: "duration",
        si_unit: "s",
        us_unit: "s",
    },
];

/// Looks up a parameter by its snake_case key. Returns `None` if not found.
pub fn find_parameter(key: &str) -> Option<&'static ParameterInfo> {
    PARAMETER_REGISTRY.iter().find(|p| p.key == key)
}

/// Returns the parameters listed under a dropdown category, in order.
pub fn parameters_in_category(category: Category) -> Vec<ParameterType> {
    PARAMETER_REGISTRY
        .iter()
        .filter(|p| p.category == category)
        .map(|p| p.parameter)
        .collect()
}

/// Parameters that map one-to-one onto an observation API series.
/// Derived parameters (the rating curve) are excluded.
pub fn fetchable_parameters() -> Vec<ParameterType> {
    ParameterType::ALL
        .into_iter()
        .filter(|p| p.processing() != ProcessingKind::RatingCurve)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_order_matches_all() {
        // info() indexes the registry by discriminant.
        assert_eq!(PARAMETER_REGISTRY.len(), ParameterType::ALL.len());
        for (i, (info, parameter)) in PARAMETER_REGISTRY.iter().zip(ParameterType::ALL).enumerate() {
            assert_eq!(parameter as usize, i, "{} out of declaration order", parameter);
            assert_eq!(info.parameter, parameter, "registry out of order at {}", info.key);
        }
    }

    #[test]
    fn test_info_returns_own_entry() {
        for parameter in ParameterType::ALL {
            assert_eq!(parameter.info().parameter, parameter);
        }
    }

    #[test]
    fn test_keys_are_unique_snake_case() {
        for (i, a) in PARAMETER_REGISTRY.iter().enumerate() {
            assert!(
                a.key.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "key {} is not snake_case",
                a.key
            );
            for b in &PARAMETER_REGISTRY[i + 1..] {
                assert_ne!(a.key, b.key, "duplicate key");
            }
        }
    }

    #[test]
    fn test_key_round_trips_through_from_str() {
        for parameter in ParameterType::ALL {
            assert_eq!(parameter.key().parse::<ParameterType>(), Ok(parameter));
        }
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        assert_eq!(
            "chlorophyll".parse::<ParameterType>(),
            Err(ApiError::UnknownParameter("chlorophyll".to_string()))
        );
    }

    #[test]
    fn test_rating_curve_is_fetched_from_stage() {
        let stage = ParameterType::Stage.info();
        let rating = ParameterType::FlowRateRatingCurve.info();
        assert_eq!(
            (rating.instrument, rating.medium, rating.metric),
            (stage.instrument, stage.medium, stage.metric)
        );
        assert!(!fetchable_parameters().contains(&ParameterType::FlowRateRatingCurve));
    }

    #[test]
    fn test_labels_follow_measurement_system() {
        assert_eq!(ParameterType::Stage.label(MeasurementSystem::Us), "Stage [ft]");
        assert_eq!(ParameterType::Stage.label(MeasurementSystem::Si), "Stage [m]");
        assert_eq!(ParameterType::Ph.label(MeasurementSystem::Us), "pH");
        assert_eq!(
            ParameterType::Orp.label(MeasurementSystem::Si),
            "Oxidation Reduct. Potent. [mV]"
        );
        assert_eq!(ParameterType::AirPressure.unit_abbr(MeasurementSystem::Us), "inHg");
    }

    #[test]
    fn test_categories_partition_registry() {
        let total: usize = [Category::WaterQuantity, Category::WaterQuality, Category::Weather]
            .into_iter()
            .map(|c| parameters_in_category(c).len())
            .sum();
        assert_eq!(total, PARAMETER_REGISTRY.len());
        assert_eq!(parameters_in_category(Category::WaterQuantity).len(), 5);
    }

    #[test]
    fn test_only_water_quantity_and_pressure_are_corrected() {
        for parameter in ParameterType::ALL {
            let corrected = parameter.processing() != ProcessingKind::None;
            let expected = parameter.info().category == Category::WaterQuantity
                || parameter == ParameterType::AirPressure;
            assert_eq!(corrected, expected, "{}", parameter);
        }
    }
}
