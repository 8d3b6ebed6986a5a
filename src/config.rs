//! Engine configuration.
//!
//! Tunables live in a TOML file (`airmon.toml` by default, overridable with
//! `AIRMON_CONFIG`); every key has a default so a missing file is not an
//! error. Secrets come from the environment, loaded through `dotenv`.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "./airmon.toml";

/// WAQI's public demo token. Works for a handful of feeds only.
pub const DEMO_TOKEN: &str = "demo";

// Accepted ranges for the numeric tunables. Values outside them are
// rejected by `parse_config`.
pub const FRESHNESS_MINUTES_RANGE: (i64, i64) = (1, 7 * 24 * 60);
pub const NOWCAST_WINDOW_HOURS_RANGE: (i64, i64) = (1, 7 * 24);
pub const REQUEST_TIMEOUT_SECS_RANGE: (u64, u64) = (1, 300);
pub const INTER_CALL_DELAY_MS_RANGE: (u64, u64) = (0, 60_000);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),
    #[error("invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Maximum age of a cached comparison row before a refresh is due.
    pub freshness_minutes: i64,
    /// Per-city lookup timeout.
    pub request_timeout_secs: u64,
    /// Pause between consecutive roster lookups.
    pub inter_call_delay_ms: u64,
    /// How far back the reading window for NowCast reaches.
    pub nowcast_window_hours: i64,
    /// Name used in the superlative narrative sentence.
    pub station_name: String,
    /// Country group listed first in the comparison section.
    pub home_country: String,
    /// Notable international cities appended after the home group.
    pub international: Vec<String>,
    pub log_level: String,
    pub log_file: Option<String>,
    pub log_json: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            freshness_minutes: 60,
            request_timeout_secs: 10,
            inter_call_delay_ms: 100,
            nowcast_window_hours: 12,
            station_name: "Cascina Leone".to_string(),
            home_country: "Italy".to_string(),
            international: vec![
                "Paris".to_string(),
                "Los Angeles".to_string(),
                "Shanghai".to_string(),
            ],
            log_level: "info".to_string(),
            log_file: None,
            log_json: false,
        }
    }
}

impl EngineConfig {
    // Accessors clamp into the accepted ranges.

    pub fn freshness(&self) -> chrono::Duration {
        let (lo, hi) = FRESHNESS_MINUTES_RANGE;
        chrono::TimeDelta::try_minutes(self.freshness_minutes.clamp(lo, hi))
            .unwrap_or(chrono::TimeDelta::MAX)
    }

    pub fn request_timeout(&self) -> Duration {
        let (lo, hi) = REQUEST_TIMEOUT_SECS_RANGE;
        Duration::from_secs(self.request_timeout_secs.clamp(lo, hi))
    }

    pub fn inter_call_delay(&self) -> Duration {
        let (lo, hi) = INTER_CALL_DELAY_MS_RANGE;
        Duration::from_millis(self.inter_call_delay_ms.clamp(lo, hi))
    }

    pub fn nowcast_window(&self) -> chrono::Duration {
        let (lo, hi) = NOWCAST_WINDOW_HOURS_RANGE;
        chrono::TimeDelta::try_hours(self.nowcast_window_hours.clamp(lo, hi))
            .unwrap_or(chrono::TimeDelta::MAX)
    }

    /// Reject tunables outside their accepted ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("freshness_minutes", self.freshness_minutes, FRESHNESS_MINUTES_RANGE)?;
        check_range("nowcast_window_hours", self.nowcast_window_hours, NOWCAST_WINDOW_HOURS_RANGE)?;
        check_range("request_timeout_secs", self.request_timeout_secs, REQUEST_TIMEOUT_SECS_RANGE)?;
        check_range("inter_call_delay_ms", self.inter_call_delay_ms, INTER_CALL_DELAY_MS_RANGE)?;
        Ok(())
    }
}

fn check_range<T>(key: &'static str, value: T, (lo, hi): (T, T)) -> Result<(), ConfigError>
where
    T: PartialOrd + std::fmt::Display,
{
    if value < lo || value > hi {
        return Err(ConfigError::Invalid(
            key,
            format!("{} is outside {}..={}", value, lo, hi),
        ));
    }
    Ok(())
}

/// Parse configuration from TOML text and check its ranges.
pub fn parse_config(text: &str) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from `path`, falling back to defaults if the file
/// does not exist.
pub fn load_config(path: &str) -> Result<EngineConfig, ConfigError> {
    if !Path::new(path).exists() {
        return Ok(EngineConfig::default());
    }
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_string(),
        source,
    })?;
    parse_config(&text)
}

/// Resolve the config path from `AIRMON_CONFIG` and load it.
pub fn load_from_env() -> Result<EngineConfig, ConfigError> {
    dotenv::dotenv().ok();
    let path = std::env::var("AIRMON_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(&path)
}

/// WAQI token from `WAQI_API_TOKEN`, or the public demo token.
pub fn waqi_token() -> String {
    dotenv::dotenv().ok();
    std::env::var("WAQI_API_TOKEN").unwrap_or_else(|_| DEMO_TOKEN.to_string())
}

/// Postgres connection string from `DATABASE_URL`.
pub fn database_url() -> Result<String, ConfigError> {
    dotenv::dotenv().ok();
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingEnv("DATABASE_URL"))
}
