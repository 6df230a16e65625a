//! Service configuration.
//!
//! Settings are read from a TOML file (`lewas.toml` by default) and then
//! overridden from the environment, so API credentials can live in `.env`
//! rather than in the checked-in file:
//!
//! - `LEWAS_CONFIG`  — path to the TOML file
//! - `LEWAS_API_URL` — observation API base URL
//! - `LEWAS_API_KEY` — value sent in the `X-API-Key` header
//!
//! Every table and field is optional; anything missing takes the default.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::model::MeasurementSystem;
use crate::processing::Calibration;
use crate::series::TimeRange;

pub const DEFAULT_CONFIG_PATH: &str = "lewas.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api: ApiConfig,
    pub calibration: Calibration,
    pub display: DisplayConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Row cap passed to the API with every request.
    pub limit: Option<u32>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            api_key: None,
            timeout_secs: 30,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub unit_system: MeasurementSystem,
    pub time_range: TimeRange,
    /// z-score cut-off; outlier removal is off unless set.
    pub outlier_threshold: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            timestamps: false,
        }
    }
}

impl LoggingConfig {
    pub fn min_level(&self) -> Result<LogLevel, ConfigError> {
        self.level.parse().map_err(ConfigError::Invalid)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    Io(String),
    /// The config file is not valid TOML for `ServiceConfig`.
    Parse(String),
    /// The config parsed but a value is out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "Config read error: {}", msg),
            ConfigError::Parse(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl ServiceConfig {
    /// Parses a config from TOML text. Values are not validated until the
    /// environment overrides have been applied; see `resolve`.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Parses `text`, applies environment overrides, then validates.
    pub fn resolve<F>(text: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::from_toml_str(text)?;
        config.apply_env_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides. `lookup` is `std::env::var` in
    /// production and a map in tests.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("LEWAS_API_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        if let Some(key) = lookup("LEWAS_API_KEY").filter(|v| !v.trim().is_empty()) {
            self.api.api_key = Some(key.trim().to_string());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.api.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid("api.base_url must not be empty".to_string()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be positive".to_string()));
        }
        if let Some(threshold) = self.display.outlier_threshold {
            if !(threshold.is_finite() && threshold > 0.0) {
                return Err(ConfigError::Invalid(
                    "display.outlier_threshold must be a positive number".to_string(),
                ));
            }
        }
        self.calibration.validate().map_err(ConfigError::Invalid)?;
        self.logging.min_level()?;
        Ok(())
    }
}

/// Loads the service config.
///
/// Resolution order for the file: explicit `path`, then `LEWAS_CONFIG`, then
/// `lewas.toml` in the working directory. A missing default file is not an
/// error (all defaults apply); a missing explicit file is.
pub fn load_config(path: Option<&Path>) -> Result<ServiceConfig, ConfigError> {
    let env_path = std::env::var("LEWAS_CONFIG").ok();
    let explicit = path.map(Path::to_path_buf).or_else(|| env_path.map(Into::into));

    let text = match explicit {
        Some(p) => fs::read_to_string(&p)
            .map_err(|e| ConfigError::Io(format!("{}: {}", p.display(), e)))?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => fs::read_to_string(DEFAULT_CONFIG_PATH)
            .map_err(|e| ConfigError::Io(format!("{}: {}", DEFAULT_CONFIG_PATH, e)))?,
        None => String::new(),
    };

    ServiceConfig::resolve(&text, |key| std::env::var(key).ok())
}
