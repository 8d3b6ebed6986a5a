/// Core data types for the air quality engine.
///
/// This module defines the shared domain model imported by all other modules.
/// It contains no logic and no I/O, only types and the error enums that
/// cross module boundaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// A single instantaneous reading from the local air quality sensor.
///
/// Written by the external ingestion job, never mutated. `value` is the
/// index the sensor reports; it may be absent when the AirLink sensor was
/// offline at capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub captured_at: DateTime<Utc>,
    pub value: Option<f64>,
    pub pm25_ugm3: Option<f64>,
    pub pm10_ugm3: Option<f64>,
}

/// What one lookup against the city index service yields.
#[derive(Debug, Clone, PartialEq)]
pub struct CityReading {
    pub aqi: f64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
}

/// One cached comparison row. Append-only; the newest row per
/// (city, country) within the freshness window is the one that counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityComparison {
    pub city: String,
    pub country: String,
    pub aqi: f64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl CityComparison {
    /// Dedup key used when collapsing cache rows to one per city.
    pub fn key(&self) -> (&str, &str) {
        (&self.city, &self.country)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Per-city lookup failure. Always recovered by leaving the city out.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum FetchError {
    /// The request exceeded its timeout.
    #[error("Request timeout")]
    Timeout,
    /// Connection-level failure (DNS, TLS, reset).
    #[error("Transport error: {0}")]
    Transport(String),
    /// Non-2xx HTTP response.
    #[error("HTTP error: {0}")]
    HttpError(u16),
    /// The body was not the JSON shape we expect.
    #[error("Parse error: {0}")]
    ParseError(String),
    /// The feed answered with `status != "ok"` (unknown station, bad token).
    #[error("Feed status: {0}")]
    FeedStatus(String),
    /// The feed answered but carried no usable index (offline station).
    #[error("No data available for city: {0}")]
    NoData(String),
}

/// Failure of the shared store. Always propagated to the caller.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] postgres::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store configuration: {0}")]
    Config(String),
}
