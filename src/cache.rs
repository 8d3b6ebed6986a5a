//! Reference index cache.
//!
//! Serves comparison values for the roster out of the store when a fetch
//! cycle landed inside the freshness window, and refetches the whole
//! roster otherwise. Results may be up to one window old; in exchange the
//! rate-limited feed sees at most one sweep per window.
//!
//! Store failures propagate. Lookup failures drop the city.

use crate::alert::freshness::{Clock, SystemClock, is_stale_at, window_start};
use crate::config::EngineConfig;
use crate::db::ComparisonStore;
use crate::ingest::sweep::{Pacer, RosterSweep, ThreadPacer, latency_bound};
use crate::ingest::waqi::CityLookup;
use crate::logging::{self, DataSource};
use crate::model::{CityComparison, StoreError};
use crate::roster::{ROSTER, RosterCity};
use chrono::Duration;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct CacheSettings {
    pub freshness: Duration,
    pub request_timeout: std::time::Duration,
    pub inter_call_delay: std::time::Duration,
}

impl From<&EngineConfig> for CacheSettings {
    fn from(config: &EngineConfig) -> Self {
        Self {
            freshness: config.freshness(),
            request_timeout: config.request_timeout(),
            inter_call_delay: config.inter_call_delay(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        (&EngineConfig::default()).into()
    }
}

pub struct ReferenceCache<S, L, C = SystemClock, P = ThreadPacer> {
    store: S,
    lookup: L,
    clock: C,
    pacer: P,
    roster: Vec<RosterCity>,
    settings: CacheSettings,
}

impl<S, L> ReferenceCache<S, L>
where
    S: ComparisonStore,
    L: CityLookup,
{
    /// Cache over the static roster with wall-clock time and real sleeps.
    pub fn new(store: S, lookup: L, settings: CacheSettings) -> Self {
        Self::with_parts(store, lookup, SystemClock, ThreadPacer, ROSTER.to_vec(), settings)
    }
}

impl<S, L, C, P> ReferenceCache<S, L, C, P>
where
    S: ComparisonStore,
    L: CityLookup,
    C: Clock,
    P: Pacer,
{
    pub fn with_parts(
        store: S,
        lookup: L,
        clock: C,
        pacer: P,
        roster: Vec<RosterCity>,
        settings: CacheSettings,
    ) -> Self {
        Self { store, lookup, clock, pacer, roster, settings }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn pacer(&self) -> &P {
        &self.pacer
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Upper bound on how long `refresh` can block.
    pub fn refresh_latency_bound(&self) -> std::time::Duration {
        latency_bound(
            self.roster.len(),
            self.settings.request_timeout,
            self.settings.inter_call_delay,
        )
    }

    /// Newest row per city from the freshness window, or a full refresh
    /// when the window holds nothing.
    pub fn get_comparisons(&mut self) -> Result<Vec<CityComparison>, StoreError> {
        let now = self.clock.now();
        let rows = self
            .store
            .comparisons_since(window_start(self.settings.freshness, now))?;

        let fresh: Vec<_> = rows
            .into_iter()
            .filter(|row| !is_stale_at(row.fetched_at, self.settings.freshness, now))
            .collect();

        if fresh.is_empty() {
            logging::info(DataSource::Database, None, "comparison cache cold or stale, refreshing");
            return self.refresh();
        }

        let latest = latest_per_city(fresh);
        logging::debug(
            DataSource::Database,
            None,
            &format!("serving {} cached comparisons", latest.len()),
        );
        Ok(latest)
    }

    /// Fetch every roster city in order, append the successes to the
    /// store and return them. Failed cities are logged and omitted; an
    /// all-failed sweep returns an empty list without writing.
    pub fn refresh(&mut self) -> Result<Vec<CityComparison>, StoreError> {
        let mut fetched = Vec::with_capacity(self.roster.len());
        let mut failed = 0;

        let sweep = RosterSweep::new(
            &self.roster,
            &self.lookup,
            &mut self.pacer,
            self.settings.inter_call_delay,
        );
        for outcome in sweep {
            match outcome.result {
                Ok(reading) => fetched.push(CityComparison {
                    city: outcome.city.city.to_string(),
                    country: outcome.city.country.to_string(),
                    aqi: reading.aqi,
                    pm25: reading.pm25,
                    pm10: reading.pm10,
                    fetched_at: self.clock.now(),
                }),
                Err(err) => {
                    failed += 1;
                    logging::log_city_failure(outcome.city.city, "lookup", &err);
                }
            }
        }

        logging::log_refresh_summary(self.roster.len(), fetched.len(), failed);

        if !fetched.is_empty() {
            self.store.insert_comparisons(&fetched)?;
        }
        Ok(fetched)
    }
}

/// Collapse rows to the newest one per (city, country), keeping the order
/// in which each city's newest row appears when sorted newest-first.
pub fn latest_per_city(mut rows: Vec<CityComparison>) -> Vec<CityComparison> {
    rows.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
    let mut seen = HashSet::new();
    let keep: Vec<bool> = rows.iter().map(|row| seen.insert(row.key())).collect();
    rows.into_iter()
        .zip(keep)
        .filter_map(|(row, first)| first.then_some(row))
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::freshness::FixedClock;
    use crate::db::MemoryStore;
    use crate::ingest::sweep::RecordingPacer;
    use crate::model::{CityReading, FetchError};
    use chrono::{DateTime, TimeZone, Utc};
    use std::cell::Cell;

    static ROSTER3: &[RosterCity] = &[
        RosterCity { city: "Milan", country: "Italy", query: "milan" },
        RosterCity { city: "Turin", country: "Italy", query: "torino" },
        RosterCity { city: "Paris", country: "France", query: "paris" },
    ];

    /// Returns a fixed AQI per city; `None` means that city fails.
    struct Scripted {
        aqi: fn(&str) -> Option<f64>,
        calls: Cell<usize>,
    }

    impl Scripted {
        fn new(aqi: fn(&str) -> Option<f64>) -> Self {
            Self { aqi, calls: Cell::new(0) }
        }
    }

    impl CityLookup for Scripted {
        fn lookup(&self, city: &RosterCity) -> Result<CityReading, FetchError> {
            self.calls.set(self.calls.get() + 1);
            (self.aqi)(city.city)
                .map(|aqi| CityReading { aqi, pm25: Some(aqi), pm10: None })
                .ok_or(FetchError::HttpError(502))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 13, 0, 0).unwrap()
    }

    fn row(city: &str, country: &str, aqi: f64, minutes_ago: i64) -> CityComparison {
        CityComparison {
            city: city.to_string(),
            country: country.to_string(),
            aqi,
            pm25: None,
            pm10: None,
            fetched_at: now() - Duration::minutes(minutes_ago),
        }
    }

    fn cache(
        store: MemoryStore,
        lookup: Scripted,
    ) -> ReferenceCache<MemoryStore, Scripted, FixedClock, RecordingPacer> {
        ReferenceCache::with_parts(
            store,
            lookup,
            FixedClock::new(now()),
            RecordingPacer::default(),
            ROSTER3.to_vec(),
            CacheSettings::default(),
        )
    }

    // --- Fast path ----------------------------------------------------------

    #[test]
    fn test_row_30_minutes_old_is_served_without_refresh() {
        let store = MemoryStore::new().with_comparisons(vec![row("Milan", "Italy", 45.0, 30)]);
        let mut cache = cache(store, Scripted::new(|_| Some(1.0)));

        let result = cache.get_comparisons().expect("store online");

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].aqi, 45.0);
        assert_eq!(cache.lookup.calls.get(), 0, "fresh cache must not call out");
        assert_eq!(cache.store().insert_calls, 0);
    }

    #[test]
    fn test_duplicates_collapse_to_newest_row() {
        let store = MemoryStore::new().with_comparisons(vec![
            row("Milan", "Italy", 40.0, 50),
            row("Milan", "Italy", 45.0, 5),
            row("Turin", "Italy", 38.0, 20),
        ]);
        let mut cache = cache(store, Scripted::new(|_| Some(1.0)));

        let result = cache.get_comparisons().unwrap();
        assert_eq!(result.len(), 2);
        let milan = result.iter().find(|c| c.city == "Milan").unwrap();
        assert_eq!(milan.aqi, 45.0);
    }

    // --- Refresh path -------------------------------------------------------

    #[test]
    fn test_row_90_minutes_old_triggers_refresh() {
        let store = MemoryStore::new().with_comparisons(vec![row("Milan", "Italy", 45.0, 90)]);
        let mut cache = cache(store, Scripted::new(|_| Some(22.0)));

        let result = cache.get_comparisons().unwrap();

        assert_eq!(cache.lookup.calls.get(), 3);
        assert_eq!(result.len(), 3);
        assert!(result.iter().all(|c| c.aqi == 22.0 && c.fetched_at == now()));
        // Old row kept for audit, new rows appended.
        assert_eq!(cache.store().comparisons.len(), 4);
    }

    #[test]
    fn test_partial_failure_omits_only_failed_city() {
        let lookup = Scripted::new(|city| if city == "Milan" { None } else { Some(30.0) });
        let mut cache = cache(MemoryStore::new(), lookup);

        let result = cache.refresh().unwrap();
        let cities: Vec<_> = result.iter().map(|c| c.city.as_str()).collect();
        assert_eq!(cities, vec!["Turin", "Paris"]);
        assert_eq!(cache.store().comparisons.len(), 2);
    }

    #[test]
    fn test_all_cities_failing_returns_empty_without_writing() {
        let mut cache = cache(MemoryStore::new(), Scripted::new(|_| None));
        let result = cache.get_comparisons().expect("lookup failures are not errors");
        assert!(result.is_empty());
        assert_eq!(cache.store().insert_calls, 0);
    }

    #[test]
    fn test_refresh_paces_between_lookups() {
        let mut cache = cache(MemoryStore::new(), Scripted::new(|_| Some(10.0)));
        cache.refresh().unwrap();
        assert_eq!(cache.pacer().pauses.len(), 2);
        assert!(cache.pacer().total() <= cache.refresh_latency_bound());
    }

    #[test]
    fn test_refreshed_rows_are_served_until_they_go_stale() {
        let mut cache = cache(MemoryStore::new(), Scripted::new(|_| Some(10.0)));
        cache.get_comparisons().unwrap();
        assert_eq!(cache.lookup.calls.get(), 3);

        cache.clock().advance(Duration::minutes(45));
        cache.get_comparisons().unwrap();
        assert_eq!(cache.lookup.calls.get(), 3, "45 minutes later the cache is still fresh");

        cache.clock().advance(Duration::minutes(30));
        cache.get_comparisons().unwrap();
        assert_eq!(cache.lookup.calls.get(), 6, "75 minutes later a refresh is due");
    }

    // --- Store failures -----------------------------------------------------

    #[test]
    fn test_store_read_failure_propagates() {
        let store = MemoryStore { offline: true, ..MemoryStore::default() };
        let mut cache = cache(store, Scripted::new(|_| Some(10.0)));
        assert!(matches!(cache.get_comparisons(), Err(StoreError::Unavailable(_))));
        assert_eq!(cache.lookup.calls.get(), 0);
    }

    #[test]
    fn test_store_write_failure_propagates() {
        let store = MemoryStore { offline: true, ..MemoryStore::default() };
        let mut cache = cache(store, Scripted::new(|_| Some(10.0)));
        assert!(cache.refresh().is_err());
    }

    // --- Helpers ------------------------------------------------------------

    #[test]
    fn test_latest_per_city_keys_on_city_and_country() {
        let rows = vec![
            row("Paris", "France", 12.0, 10),
            row("Paris", "USA", 8.0, 5),
            row("Paris", "France", 20.0, 40),
        ];
        let latest = latest_per_city(rows);
        assert_eq!(latest.len(), 2);
        let france = latest.iter().find(|c| c.country == "France").unwrap();
        assert_eq!(france.aqi, 12.0);
    }
}
