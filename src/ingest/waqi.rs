/// WAQI (World Air Quality Index) Feed API Client
///
/// Retrieves the current overall index and particulate sub-indices for a
/// single city or station from the aqicn.org feed API. One request per
/// roster city; the cache decides when to call it.
///
/// API Documentation: https://aqicn.org/json-api/doc/
/// City feed: https://api.waqi.info/feed/<city-or-@station>/?token=<token>

use crate::model::{CityReading, FetchError};
use crate::roster::RosterCity;
use serde::Deserialize;
use std::time::Duration;

const WAQI_BASE_URL: &str = "https://api.waqi.info";

// ============================================================================
// WAQI API Response Structures
// ============================================================================

/// Envelope of every feed response. On failure `data` is a message string
/// such as "Unknown station", so it is kept untyped until `status` is known.
#[derive(Debug, Deserialize)]
pub struct WaqiFeedResponse {
    pub status: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct WaqiFeedData {
    /// Number normally, `"-"` while the station is offline.
    pub aqi: serde_json::Value,
    #[serde(default)]
    pub iaqi: WaqiIaqi,
}

/// Individual pollutant sub-indices. Every field is optional; many
/// stations report only a subset.
#[derive(Debug, Default, Deserialize)]
pub struct WaqiIaqi {
    pub pm25: Option<WaqiValue>,
    pub pm10: Option<WaqiValue>,
}

/// `v` is usually numeric but stations sometimes send `"-"`; anything
/// non-numeric reads as a missing sub-index.
#[derive(Debug, Deserialize)]
pub struct WaqiValue {
    pub v: serde_json::Value,
}

impl WaqiValue {
    pub fn as_f64(&self) -> Option<f64> {
        self.v.as_f64()
    }
}

// ============================================================================
// Lookup seam
// ============================================================================

/// One outbound lookup for one roster city.
///
/// Implementations must bound every call with a timeout; the refresh
/// latency guarantee depends on it.
pub trait CityLookup {
    fn lookup(&self, city: &RosterCity) -> Result<CityReading, FetchError>;
}

impl<L: CityLookup + ?Sized> CityLookup for &L {
    fn lookup(&self, city: &RosterCity) -> Result<CityReading, FetchError> {
        (**self).lookup(city)
    }
}

// ============================================================================
// API Client
// ============================================================================

pub struct WaqiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    token: String,
    timeout: Duration,
}

impl WaqiClient {
    pub fn new(token: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_base_url(WAQI_BASE_URL, token, timeout)
    }

    /// Client against another host serving the same feed API.
    pub fn with_base_url(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            token: token.into(),
            timeout,
        })
    }
}

impl CityLookup for WaqiClient {
    fn lookup(&self, city: &RosterCity) -> Result<CityReading, FetchError> {
        let url = feed_url(&self.base_url, city.query, &self.token);

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .send()
            .map_err(map_transport_error)?;

        if !response.status().is_success() {
            return Err(FetchError::HttpError(response.status().as_u16()));
        }

        let body = response.text().map_err(map_transport_error)?;
        parse_feed_response(city.city, &body)
    }
}

/// Build the feed URL for a city slug or `@station` id.
pub fn build_feed_url(query: &str, token: &str) -> String {
    feed_url(WAQI_BASE_URL, query, token)
}

fn feed_url(base_url: &str, query: &str, token: &str) -> String {
    format!("{}/feed/{}/?token={}", base_url.trim_end_matches('/'), query, token)
}

/// Map a reqwest failure onto the per-city error kinds. The URL is
/// stripped because it carries the API token.
fn map_transport_error(err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout
    } else if let Some(status) = err.status() {
        FetchError::HttpError(status.as_u16())
    } else if err.is_decode() {
        FetchError::ParseError(err.without_url().to_string())
    } else {
        FetchError::Transport(err.without_url().to_string())
    }
}

/// Parse a feed body into a `CityReading`.
pub fn parse_feed_response(city: &str, body: &str) -> Result<CityReading, FetchError> {
    let envelope: WaqiFeedResponse =
        serde_json::from_str(body).map_err(|e| FetchError::ParseError(e.to_string()))?;

    if envelope.status != "ok" {
        let message = envelope
            .data
            .as_str()
            .map(str::to_string)
            .unwrap_or_else(|| envelope.status.clone());
        return Err(FetchError::FeedStatus(message));
    }

    let data: WaqiFeedData = serde_json::from_value(envelope.data)
        .map_err(|e| FetchError::ParseError(e.to_string()))?;

    let aqi = match &data.aqi {
        serde_json::Value::Number(n) => n.as_f64(),
        _ => None,
    }
    .ok_or_else(|| FetchError::NoData(city.to_string()))?;

    Ok(CityReading {
        aqi,
        pm25: data.iaqi.pm25.and_then(|p| p.as_f64()),
        pm10: data.iaqi.pm10.and_then(|p| p.as_f64()),
    })
}

// ============================================================================
// Tests
// ============================================================================
