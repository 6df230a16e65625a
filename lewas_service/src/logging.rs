/// Structured logging for the creek monitoring dashboard
///
/// Provides context-rich logging with component and parameter identifiers,
/// timestamps, and severity levels. Supports both console output
/// and file-based logging for unattended runs.
///
/// Nothing is emitted until `init_logger` has been called, so the
/// processing functions can be used as a plain library without a logger.

use chrono::Utc;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::sync::Mutex;

use crate::model::ApiError;

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warning => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warning),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    /// Observation API client
    Api,
    /// Parameter Processor
    Processor,
    /// Unit Converter
    Units,
    /// Series Formatter
    Formatter,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Api => write!(f, "API"),
            Component::Processor => write!(f, "PROC"),
            Component::Units => write!(f, "UNITS"),
            Component::Formatter => write!(f, "FMT"),
            Component::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - caller asked for something the registry does not know
    Expected,
    /// Unexpected failure - indicates API degradation or configuration issue
    Unexpected,
    /// Unknown - instrument may simply be offline or not reporting
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Configuration
// ---------------------------------------------------------------------------

/// Global logger instance
static LOGGER: Mutex<Option<Logger>> = Mutex::new(None);

pub struct Logger {
    /// Minimum log level to display
    min_level: LogLevel,
    /// Optional file path for logging
    log_file: Option<String>,
    /// Whether to include timestamps in console output
    console_timestamps: bool,
}

impl Logger {
    /// Initialize the global logger
    pub fn init(min_level: LogLevel, log_file: Option<String>, console_timestamps: bool) {
        let logger = Logger {
            min_level,
            log_file,
            console_timestamps,
        };

        if let Ok(mut global) = LOGGER.lock() {
            *global = Some(logger);
        }
    }

    fn log(&self, level: LogLevel, component: &Component, parameter: Option<&str>, message: &str) {
        if level < self.min_level {
            return;
        }

        let log_entry = format_entry(level, component, parameter, message);
        let parameter_part = parameter.map(|p| format!(" [{}]", p)).unwrap_or_default();

        // Console output. Diagnostics go to stderr so stdout stays clean
        // for JSON output from the CLI.
        if self.console_timestamps {
            eprintln!("{}", log_entry);
        } else {
            match level {
                LogLevel::Error => eprintln!("   ✗ {}{}: {}", component, parameter_part, message),
                LogLevel::Warning => eprintln!("   ⚠ {}{}: {}", component, parameter_part, message),
                LogLevel::Info => eprintln!("   {}", message),
                LogLevel::Debug => eprintln!("   [DEBUG] {}", message),
            }
        }

        // File output
        if let Some(ref path) = self.log_file {
            if let Err(e) = Self::append_to_file(path, &log_entry) {
                eprintln!("Failed to write to log file {}: {}", path, e);
            }
        }
    }

    fn append_to_file(path: &str, entry: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", entry)?;
        Ok(())
    }
}

/// Formats a single log line: `<utc timestamp> <LEVEL> <COMPONENT>[ [param]]: <message>`
fn format_entry(level: LogLevel, component: &Component, parameter: Option<&str>, message: &str) -> String {
    let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
    let parameter_part = parameter.map(|p| format!(" [{}]", p)).unwrap_or_default();
    format!("{} {} {}{}: {}", timestamp, level, component, parameter_part, message)
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Initialize the global logger
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, console_timestamps: bool) {
    Logger::init(min_level, log_file.map(String::from), console_timestamps);
}

#[cfg(test)]
thread_local! {
    static CAPTURED: std::cell::RefCell<Option<Vec<String>>> = const { std::cell::RefCell::new(None) };
}

/// Runs `f` and returns every entry logged on this thread meanwhile, whether
/// or not a logger has been initialised.
#[cfg(test)]
pub(crate) fn capture<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
    CAPTURED.with(|c| *c.borrow_mut() = Some(Vec::new()));
    let result = f();
    let entries = CAPTURED.with(|c| c.borrow_mut().take()).unwrap_or_default();
    (result, entries)
}

fn dispatch(level: LogLevel, component: Component, parameter: Option<&str>, message: &str) {
    #[cfg(test)]
    CAPTURED.with(|c| {
        if let Some(entries) = c.borrow_mut().as_mut() {
            entries.push(format_entry(level, &component, parameter, message));
        }
    });

    if let Ok(guard) = LOGGER.lock() {
        if let Some(logger) = guard.as_ref() {
            logger.log(level, &component, parameter, message);
        }
    }
}

/// Log a general informational message
pub fn info(component: Component, parameter: Option<&str>, message: &str) {
    dispatch(LogLevel::Info, component, parameter, message);
}

/// Log a warning message
pub fn warn(component: Component, parameter: Option<&str>, message: &str) {
    dispatch(LogLevel::Warning, component, parameter, message);
}

/// Log an error message
pub fn error(component: Component, parameter: Option<&str>, message: &str) {
    dispatch(LogLevel::Error, component, parameter, message);
}

/// Log a debug message
pub fn debug(component: Component, parameter: Option<&str>, message: &str) {
    dispatch(LogLevel::Debug, component, parameter, message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify an observation API failure based on the error variant
pub fn classify_api_failure(err: &ApiError) -> FailureType {
    match err {
        ApiError::UnknownParameter(_) => FailureType::Expected,
        // 404 usually means the instrument/metric pair has no series yet
        ApiError::HttpError(404) => FailureType::Unknown,
        ApiError::HttpError(_) => FailureType::Unexpected,
        // Transport problems and schema changes both need attention
        ApiError::RequestError(_) | ApiError::ParseError(_) => FailureType::Unexpected,
    }
}

/// Log a fetch failure with automatic classification
pub fn log_fetch_failure(parameter: &str, operation: &str, err: &ApiError) {
    let failure_type = classify_api_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(Component::Api, Some(parameter), &message),
        FailureType::Unexpected => error(Component::Api, Some(parameter), &message),
        FailureType::Unknown => warn(Component::Api, Some(parameter), &message),
    }
}

// ---------------------------------------------------------------------------
// Load Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of a multi-parameter chart load
pub fn log_load_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Chart load complete: {}/{} series loaded, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(Component::System, None, &message);
    } else if successful == 0 {
        error(Component::System, None, &message);
    } else {
        warn(Component::System, None, &message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Debug < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Warning);
        assert!(LogLevel::Warning < LogLevel::Error);
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("warn".parse::<LogLevel>(), Ok(LogLevel::Warning));
        assert_eq!("ERROR".parse::<LogLevel>(), Ok(LogLevel::Error));
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_failure_classification() {
        assert_eq!(classify_api_failure(&ApiError::HttpError(500)), FailureType::Unexpected);
        assert_eq!(classify_api_failure(&ApiError::HttpError(404)), FailureType::Unknown);
        assert_eq!(
            classify_api_failure(&ApiError::ParseError("missing field".into())),
            FailureType::Unexpected
        );
        assert_eq!(
            classify_api_failure(&ApiError::UnknownParameter("foo".into())),
            FailureType::Expected
        );
    }

    #[test]
    fn test_entry_format_includes_parameter() {
        let entry = format_entry(LogLevel::Warning, &Component::Units, Some("stage"), "no conversion");
        assert!(entry.ends_with("WARN UNITS [stage]: no conversion"), "got {}", entry);
    }

    #[test]
    fn test_capture_collects_entries_on_this_thread() {
        let ((), entries) = capture(|| {
            warn(Component::Api, Some("ph"), "No data found for parameter");
            debug(Component::Api, None, "ignored level filter");
        });
        assert_eq!(entries.len(), 2);
        assert!(entries[0].ends_with("WARN API [ph]: No data found for parameter"));
        // Capturing stops once the closure returns.
        let ((), after) = capture(|| {});
        assert!(after.is_empty());
    }

    #[test]
    fn test_logging_without_init_is_a_no_op() {
        // Must not panic when no logger has been installed.
        warn(Component::Formatter, None, "dropped point");
    }
}
