/// RawReading, ProcessedPoint, MeasurementSystem, ObservationQuery, ApiError
/// core data structures and error handling
///
/// Core data types for the LEWAS creek monitoring dashboard.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no processing logic and no I/O, only types and the small
/// amount of serde plumbing needed to read them off the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single instrument sample as delivered by the observation API.
///
/// The value carries no unit of its own; the unit is implied by the
/// parameter it was fetched for and by the measurement system. `unit` is
/// passed through untouched when the API supplies it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// ISO 8601 instant, e.g. "2024-05-01T12:00:00Z".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Older API responses named the time field `datetime`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    /// JSON `null` arrives as NaN and is treated as a sensor dropout.
    #[serde(deserialize_with = "null_as_nan")]
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl RawReading {
    /// Convenience constructor for a reading with a `timestamp` field.
    pub fn new(timestamp: &str, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp.to_string()),
            datetime: None,
            value,
            unit: None,
        }
    }

    /// The reading's time string: `timestamp` when present and non-empty,
    /// otherwise the legacy `datetime` field.
    pub fn time_field(&self) -> Option<&str> {
        self.timestamp
            .as_deref()
            .filter(|t| !t.is_empty())
            .or_else(|| self.datetime.as_deref().filter(|t| !t.is_empty()))
    }

    /// Returns a copy of this reading carrying a new value.
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

fn null_as_nan<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// A processed reading in the canonical shape consumed by the chart.
///
/// Produced by `format::format_for_visualization`; `time` is always a valid
/// instant and the original time string is kept for tooltips.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedPoint {
    pub time: DateTime<Utc>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

// ---------------------------------------------------------------------------
// Measurement system
// ---------------------------------------------------------------------------

/// Unit system requested for display. SI is the canonical internal
/// representation; US conversion is applied once, just before formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeasurementSystem {
    #[serde(rename = "SI")]
    Si,
    #[default]
    #[serde(rename = "US")]
    Us,
}

impl std::str::FromStr for MeasurementSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SI" | "METRIC" => Ok(MeasurementSystem::Si),
            "US" | "IMPERIAL" => Ok(MeasurementSystem::Us),
            other => Err(format!("unknown unit system '{}' (expected SI or US)", other)),
        }
    }
}

impl std::fmt::Display for MeasurementSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasurementSystem::Si => write!(f, "SI"),
            MeasurementSystem::Us => write!(f, "US"),
        }
    }
}

// ---------------------------------------------------------------------------
// Observation query
// ---------------------------------------------------------------------------

/// Filter sent to the observation source. The result is assumed to be
/// ordered by time ascending.
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationQuery {
    pub instrument: String,
    pub metric: String,
    pub medium: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub limit: Option<u32>,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can arise when fetching observations or resolving
/// parameters at the dashboard boundary. The processing core never raises.
#[derive(Debug, PartialEq)]
pub enum ApiError {
    /// Non-2xx HTTP response from the observation API.
    HttpError(u16),
    /// The request could not be sent (connection, timeout, TLS).
    RequestError(String),
    /// The response body could not be deserialized.
    ParseError(String),
    /// A parameter key that is not in the registry.
    UnknownParameter(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::HttpError(code) => write!(f, "HTTP error: {}", code),
            ApiError::RequestError(msg) => write!(f, "Request failed: {}", msg),
            ApiError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            ApiError::UnknownParameter(key) => write!(f, "Unknown parameter: {}", key),
        }
    }
}

impl std::error::Error for ApiError {}
