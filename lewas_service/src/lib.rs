//! LEWAS creek monitoring dashboard service.
//!
//! Fetches environmental sensor readings (water quantity, water quality,
//! weather) from the LEWAS observation API and turns them into unit-correct
//! time series for charting.
//!
//! Pipeline: raw readings → `processing` (instrument correction, SI) →
//! `units` (optional US conversion) → `format` (chart points).

pub mod config;
pub mod format;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod parameters;
pub mod processing;
pub mod series;
pub mod units;
pub mod verify;
