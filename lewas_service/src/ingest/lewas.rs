/// LEWAS Observation API Client
///
/// Retrieves raw instrument observations (Argonaut velocity/stage, sonde
/// water quality, weather station) from the LEWAS lab observation API.
///
/// Endpoint: `GET {base_url}/observations`
///   ?instrument=<name>&metric=<name>&medium=<name>&start=<iso>&end=<iso>[&limit=<n>]
/// Authentication: `X-API-Key` header.
/// Response: `{ "observations": [ { "timestamp", "value", "unit" }, ... ] }`

use std::time::Duration;

use chrono::SecondsFormat;
use serde::Deserialize;

use crate::config::ApiConfig;
use crate::ingest::ObservationSource;
use crate::logging::{self, Component};
use crate::model::{ApiError, ObservationQuery, RawReading};

const OBSERVATIONS_PATH: &str = "observations";
const API_KEY_HEADER: &str = "X-API-Key";

// ============================================================================
// API Response Structures
// ============================================================================

/// Observation list response. A missing `observations` array is treated as
/// an empty result rather than a parse failure.
#[derive(Debug, Deserialize)]
pub struct ObservationsResponse {
    #[serde(default)]
    pub observations: Vec<RawReading>,
}

// ============================================================================
// API Client
// ============================================================================

pub struct LewasApiClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LewasApiClient {
    /// Builds a client from the `[api]` section of the service config.
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::RequestError(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    pub fn observations_url(&self) -> String {
        format!("{}/{}", self.base_url, OBSERVATIONS_PATH)
    }
}

impl ObservationSource for LewasApiClient {
    fn fetch_observations(&self, query: &ObservationQuery) -> Result<Vec<RawReading>, ApiError> {
        let url = self.observations_url();
        logging::debug(
            Component::Api,
            Some(&query.metric),
            &format!("GET {} {:?}", url, query_params(query)),
        );

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .query(&query_params(query));

        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request
            .send()
            .map_err(|e| ApiError::RequestError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::HttpError(response.status().as_u16()));
        }

        let body = response
            .text()
            .map_err(|e| ApiError::RequestError(e.to_string()))?;

        parse_observations(&body)
    }
}

// ============================================================================
// Request / Response Helpers
// ============================================================================

/// Query string pairs for an observation request. Times are sent as
/// millisecond-precision UTC ISO 8601, e.g. `2024-05-01T12:00:00.000Z`.
pub fn query_params(query: &ObservationQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("instrument", query.instrument.clone()),
        ("metric", query.metric.clone()),
        ("medium", query.medium.clone()),
        ("start", query.start.to_rfc3339_opts(SecondsFormat::Millis, true)),
        ("end", query.end.to_rfc3339_opts(SecondsFormat::Millis, true)),
    ];
    if let Some(limit) = query.limit {
        params.push(("limit", limit.to_string()));
    }
    params
}

/// Parses an observation response body.
pub fn parse_observations(body: &str) -> Result<Vec<RawReading>, ApiError> {
    let response: ObservationsResponse =
        serde_json::from_str(body).map_err(|e| ApiError::ParseError(e.to_string()))?;
    Ok(response.observations)
}

// ============================================================================
// Tests
// ============================================================================
