//! Observation Source Verification Module
//!
//! Probes every parameter in the registry against the observation source to
//! find out which instrument series are actually reporting, and whether the
//! timestamps they return are usable by the formatter.
//!
//! Use this after changing the registry or pointing at a new API deployment.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::format;
use crate::ingest::ObservationSource;
use crate::parameters::{self, ParameterType};
use crate::series::{self, TimeWindow};

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub window_start: String,
    pub window_end: String,
    pub results: Vec<ParameterVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub partial: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterVerification {
    pub parameter: String,
    pub instrument: String,
    pub medium: String,
    pub metric: String,
    pub status: VerificationStatus,
    pub sample_data_count: usize,
    /// Readings whose time string the formatter would drop.
    pub unusable_timestamps: usize,
    /// Readings with a null / non-finite value.
    pub missing_values: usize,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

// ============================================================================
// Verification
// ============================================================================

/// Checks a single parameter's series over `window`.
///
/// - Success: data returned and every timestamp parses.
/// - PartialSuccess: data returned but some rows are unusable.
/// - Failed: request error or no data.
pub fn verify_parameter(
    source: &dyn ObservationSource,
    parameter: ParameterType,
    window: TimeWindow,
) -> ParameterVerification {
    let info = parameter.info();
    let mut result = ParameterVerification {
        parameter: info.key.to_string(),
        instrument: info.instrument.to_string(),
        medium: info.medium.to_string(),
        metric: info.metric.to_string(),
        status: VerificationStatus::Failed,
        sample_data_count: 0,
        unusable_timestamps: 0,
        missing_values: 0,
        error_message: None,
    };

    match source.fetch_observations(&series::build_query(parameter, window, None)) {
        Ok(readings) => {
            result.sample_data_count = readings.len();
            result.unusable_timestamps = readings
                .iter()
                .filter(|r| r.time_field().and_then(format::parse_timestamp).is_none())
                .count();
            result.missing_values = readings.iter().filter(|r| !r.value.is_finite()).count();

            if readings.is_empty() {
                result.error_message = Some("No observations in window".to_string());
            } else if result.unusable_timestamps == 0 && result.missing_values == 0 {
                result.status = VerificationStatus::Success;
            } else {
                result.status = VerificationStatus::PartialSuccess;
            }
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

/// Verifies every fetchable parameter in the registry.
pub fn verify_parameters(
    source: &dyn ObservationSource,
    window: TimeWindow,
    now: DateTime<Utc>,
) -> VerificationReport {
    let results: Vec<ParameterVerification> = parameters::fetchable_parameters()
        .into_iter()
        .map(|p| verify_parameter(source, p, window))
        .collect();

    let count = |status: VerificationStatus| results.iter().filter(|r| r.status == status).count();
    let summary = VerificationSummary {
        total: results.len(),
        working: count(VerificationStatus::Success),
        partial: count(VerificationStatus::PartialSuccess),
        failed: count(VerificationStatus::Failed),
    };

    VerificationReport {
        timestamp: now.to_rfc3339(),
        window_start: window.start.to_rfc3339(),
        window_end: window.end.to_rfc3339(),
        results,
        summary,
    }
}
