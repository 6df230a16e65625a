/// Observation data ingestion.
///
/// The processing pipeline never performs I/O itself; it is handed readings
/// that were fetched through an `ObservationSource`. The production source
/// is the LEWAS observation API (`lewas`); tests use in-memory sources.
///
/// Submodules:
/// - `lewas` — blocking HTTP client for the LEWAS observation API.

pub mod lewas;

use crate::model::{ApiError, ObservationQuery, RawReading};

/// Anything that can answer an observation query with raw readings,
/// ordered by time ascending.
pub trait ObservationSource {
    fn fetch_observations(&self, query: &ObservationQuery) -> Result<Vec<RawReading>, ApiError>;
}
