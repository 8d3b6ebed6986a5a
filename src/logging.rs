/// Structured logging for the air quality engine
///
/// Provides context-rich logging with data source and city identifiers,
/// emitted through `tracing` so the binary decides the output format
/// (plain or JSON, console and optional log file).

use crate::model::FetchError;
use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

// ---------------------------------------------------------------------------
// Log Levels
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parse a config value; unknown strings fall back to `Info`.
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "debug" | "trace" => LogLevel::Debug,
            "warn" | "warning" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
        }
    }
}

// ---------------------------------------------------------------------------
// Data Source Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Waqi,
    Sensor,
    Database,
    System,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Waqi => write!(f, "WAQI"),
            DataSource::Sensor => write!(f, "SENSOR"),
            DataSource::Database => write!(f, "DB"),
            DataSource::System => write!(f, "SYS"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - station offline or between reports
    Expected,
    /// Unexpected failure - indicates service degradation or configuration issue
    Unexpected,
    /// Unknown - cannot determine if this is expected or not
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
// Subscriber Setup
// ---------------------------------------------------------------------------

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `min_level` when set. Calling this twice is
/// harmless; the second call leaves the first subscriber in place.
pub fn init_logger(min_level: LogLevel, log_file: Option<&str>, json: bool) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(min_level.as_filter()));

    let (plain, structured) = if json {
        (None, Some(tfmt::layer().json().with_writer(std::io::stderr)))
    } else {
        (Some(tfmt::layer().with_writer(std::io::stderr)), None)
    };

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(tfmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    if tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .with(file_layer)
        .try_init()
        .is_err()
    {
        debug(DataSource::System, None, "logger already initialized");
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public Logging Functions
// ---------------------------------------------------------------------------

/// Log a general informational message
pub fn info(source: DataSource, site: Option<&str>, message: &str) {
    tracing::info!(source = %source, site = site.unwrap_or("-"), "{}", message);
}

/// Log a warning message
pub fn warn(source: DataSource, site: Option<&str>, message: &str) {
    tracing::warn!(source = %source, site = site.unwrap_or("-"), "{}", message);
}

/// Log an error message
pub fn error(source: DataSource, site: Option<&str>, message: &str) {
    tracing::error!(source = %source, site = site.unwrap_or("-"), "{}", message);
}

/// Log a debug message
pub fn debug(source: DataSource, site: Option<&str>, message: &str) {
    tracing::debug!(source = %source, site = site.unwrap_or("-"), "{}", message);
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a city lookup failure by its error kind
pub fn classify_lookup_failure(err: &FetchError) -> FailureType {
    match err {
        // Offline stations report "-" instead of an index; WAQI does this
        // routinely for a few hours at a time.
        FetchError::NoData(_) => FailureType::Expected,
        // Unknown station or token problem. Could be either.
        FetchError::FeedStatus(_) => FailureType::Unknown,
        FetchError::Timeout
        | FetchError::Transport(_)
        | FetchError::HttpError(_)
        | FetchError::ParseError(_) => FailureType::Unexpected,
    }
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a city lookup failure with automatic classification
pub fn log_city_failure(city: &str, operation: &str, err: &FetchError) {
    let failure_type = classify_lookup_failure(err);

    let message = format!("{} failed [{}]: {}", operation, failure_type, err);

    match failure_type {
        FailureType::Expected => debug(DataSource::Waqi, Some(city), &message),
        FailureType::Unexpected => error(DataSource::Waqi, Some(city), &message),
        FailureType::Unknown => warn(DataSource::Waqi, Some(city), &message),
    }
}

// ---------------------------------------------------------------------------
// Refresh Summary Logging
// ---------------------------------------------------------------------------

/// Log a summary of one roster refresh
pub fn log_refresh_summary(total: usize, successful: usize, failed: usize) {
    let message = format!(
        "Refresh complete: {}/{} successful, {} failed",
        successful, total, failed
    );

    if failed == 0 {
        info(DataSource::Waqi, None, &message);
    } else if successful == 0 {
        error(DataSource::Waqi, None, &message);
    } else {
        warn(DataSource::Waqi, None, &message);
    }
}
