//! Request pipeline: reading window → NowCast → tier → narrative.
//!
//! [`build_report`] is the pure part; [`AirQualityEngine`] wires it to the
//! reading source and the comparison cache. Both the dashboard and the
//! email composer consume [`AirQualityReport`].

use crate::alert::freshness::{Clock, SystemClock};
use crate::alert::guidance::health_guidance;
use crate::alert::severity::classify;
use crate::analysis::daily::{DailyAqiSummary, summarize_day};
use crate::analysis::narrative::{NarrativeSettings, generate_story_with, rank_ascending};
use crate::analysis::nowcast::{compute_nowcast, display_index};
use crate::cache::ReferenceCache;
use crate::config::EngineConfig;
use crate::db::{ComparisonStore, ReadingSource};
use crate::ingest::sweep::{Pacer, ThreadPacer};
use crate::ingest::waqi::CityLookup;
use crate::logging::{self, DataSource};
use crate::model::{CityComparison, Reading, StoreError};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Everything the presentation layer renders for air quality.
///
/// `nowcastAQI` is absent when there was too little history; `displayAQI`
/// already applies the fallback to `aqi`, and the tier, story and
/// guidance are all computed from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AirQualityReport {
    pub aqi: f64,
    #[serde(rename = "nowcastAQI")]
    pub nowcast_aqi: Option<f64>,
    #[serde(rename = "displayAQI")]
    pub display_aqi: f64,
    pub pm25: Option<f64>,
    pub pm10: Option<f64>,
    pub level: &'static str,
    pub color: &'static str,
    pub description: &'static str,
    pub story: String,
    pub health_guidance: &'static str,
    pub comparisons: Vec<CityComparison>,
    pub timestamp: DateTime<Utc>,
}

/// Assemble a report from a most-recent-first reading window and the
/// current comparisons. `None` when no reading in the window has a value.
pub fn build_report(
    settings: &NarrativeSettings,
    readings: &[Reading],
    comparisons: &[CityComparison],
) -> Option<AirQualityReport> {
    let latest = readings.iter().find(|r| r.value.is_some())?;
    let raw = latest.value?;

    let values: Vec<f64> = readings.iter().filter_map(|r| r.value).collect();
    let nowcast = compute_nowcast(&values);
    let index = display_index(raw, nowcast);
    let tier = classify(index);

    Some(AirQualityReport {
        aqi: raw,
        nowcast_aqi: nowcast,
        display_aqi: index,
        pm25: latest.pm25_ugm3,
        pm10: latest.pm10_ugm3,
        level: tier.level,
        color: tier.color,
        description: tier.description,
        story: generate_story_with(settings, index, comparisons),
        health_guidance: health_guidance(index),
        comparisons: rank_ascending(comparisons),
        timestamp: latest.captured_at,
    })
}

pub struct AirQualityEngine<S, L, C = SystemClock, P = ThreadPacer> {
    cache: ReferenceCache<S, L, C, P>,
    narrative: NarrativeSettings,
    window: chrono::Duration,
}

impl<S, L, C, P> AirQualityEngine<S, L, C, P>
where
    S: ComparisonStore + ReadingSource,
    L: CityLookup,
    C: Clock,
    P: Pacer,
{
    pub fn new(cache: ReferenceCache<S, L, C, P>, config: &EngineConfig) -> Self {
        Self {
            cache,
            narrative: config.into(),
            window: config.nowcast_window(),
        }
    }

    pub fn cache(&self) -> &ReferenceCache<S, L, C, P> {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ReferenceCache<S, L, C, P> {
        &mut self.cache
    }

    /// Current report, or `None` when the sensor has nothing in the window.
    /// Only store failures are errors.
    pub fn report(&mut self) -> Result<Option<AirQualityReport>, EngineError> {
        let since = self.cache.clock().now() - self.window;
        let readings = self.cache.store_mut().readings_since(since)?;

        if !readings.iter().any(|r| r.value.is_some()) {
            logging::warn(DataSource::Sensor, None, "no air quality reading in window");
            return Ok(None);
        }

        let comparisons = self.cache.get_comparisons()?;
        Ok(build_report(&self.narrative, &readings, &comparisons))
    }

    /// Force a roster refresh regardless of cache freshness.
    pub fn refresh(&mut self) -> Result<Vec<CityComparison>, EngineError> {
        Ok(self.cache.refresh()?)
    }

    /// AQI roll-up for one UTC day.
    pub fn daily_summary(&mut self, date: NaiveDate) -> Result<Option<DailyAqiSummary>, EngineError> {
        let since = date.and_time(NaiveTime::MIN).and_utc();
        let readings = self.cache.store_mut().readings_since(since)?;
        Ok(summarize_day(date, &readings))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
