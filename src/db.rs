/// Persistence for readings and comparison rows.
///
/// Two seams: `ReadingSource` (the sensor table, read-only here) and
/// `ComparisonStore` (the append-only comparison cache). `PgStore`
/// implements both over one Postgres connection; `MemoryStore` backs
/// tests and dry runs.
///
/// Schema: sql/001_air_quality.sql

use crate::config;
use crate::model::{CityComparison, Reading, StoreError};
use chrono::{DateTime, Utc};
use postgres::{Client, NoTls};

// ---------------------------------------------------------------------------
// Store seams
// ---------------------------------------------------------------------------

pub trait ComparisonStore {
    /// Rows with `fetched_at >= since`, newest first.
    fn comparisons_since(&mut self, since: DateTime<Utc>) -> Result<Vec<CityComparison>, StoreError>;

    /// Append rows. Never updates existing ones.
    fn insert_comparisons(&mut self, rows: &[CityComparison]) -> Result<(), StoreError>;
}

pub trait ReadingSource {
    /// Sensor readings with `captured_at >= since`, newest first.
    fn readings_since(&mut self, since: DateTime<Utc>) -> Result<Vec<Reading>, StoreError>;
}

// ---------------------------------------------------------------------------
// Postgres
// ---------------------------------------------------------------------------

pub const TABLE_READINGS: &str = "readings";
pub const TABLE_COMPARISONS: &str = "aqi_comparisons";

pub struct PgStore {
    client: Client,
}

impl PgStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

/// Connect using `DATABASE_URL`.
pub fn connect() -> Result<Client, StoreError> {
    let url = config::database_url().map_err(|e| StoreError::Config(e.to_string()))?;
    Ok(Client::connect(&url, NoTls)?)
}

/// Connect and check that the given tables exist in the public schema.
pub fn connect_and_verify(tables: &[&str]) -> Result<Client, StoreError> {
    let mut client = connect()?;

    let mut missing = Vec::new();
    for table in tables {
        let row = client.query_one(
            "SELECT EXISTS (
                 SELECT 1 FROM information_schema.tables
                 WHERE table_schema = 'public' AND table_name = $1
             )",
            &[table],
        )?;
        let exists: bool = row.get(0);
        if !exists {
            missing.push(*table);
        }
    }

    if !missing.is_empty() {
        return Err(StoreError::Config(format!(
            "missing tables: {} (apply sql/001_air_quality.sql)",
            missing.join(", ")
        )));
    }
    Ok(client)
}

impl ComparisonStore for PgStore {
    fn comparisons_since(&mut self, since: DateTime<Utc>) -> Result<Vec<CityComparison>, StoreError> {
        let rows = self.client.query(
            "SELECT city, country, aqi, pm25, pm10, fetched_at
             FROM aqi_comparisons
             WHERE fetched_at >= $1
             ORDER BY fetched_at DESC",
            &[&since],
        )?;

        Ok(rows
            .iter()
            .map(|row| CityComparison {
                city: row.get(0),
                country: row.get(1),
                aqi: row.get(2),
                pm25: row.get(3),
                pm10: row.get(4),
                fetched_at: row.get(5),
            })
            .collect())
    }

    fn insert_comparisons(&mut self, rows: &[CityComparison]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        let statement = self.client.prepare(
            "INSERT INTO aqi_comparisons (city, country, aqi, pm25, pm10, fetched_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )?;
        for row in rows {
            self.client.execute(
                &statement,
                &[&row.city, &row.country, &row.aqi, &row.pm25, &row.pm10, &row.fetched_at],
            )?;
        }
        Ok(())
    }
}

impl ReadingSource for PgStore {
    fn readings_since(&mut self, since: DateTime<Utc>) -> Result<Vec<Reading>, StoreError> {
        let rows = self.client.query(
            "SELECT timestamp, aqi, pm25_ugm3, pm10_ugm3
             FROM readings
             WHERE timestamp >= $1
             ORDER BY timestamp DESC",
            &[&since],
        )?;

        Ok(rows
            .iter()
            .map(|row| Reading {
                captured_at: row.get(0),
                value: row.get(1),
                pm25_ugm3: row.get(2),
                pm10_ugm3: row.get(3),
            })
            .collect())
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

/// Vec-backed store with switchable outages.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub comparisons: Vec<CityComparison>,
    pub readings: Vec<Reading>,
    /// When set, every call fails with `StoreError::Unavailable`.
    pub offline: bool,
    pub insert_calls: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readings(mut self, readings: Vec<Reading>) -> Self {
        self.readings = readings;
        self
    }

    pub fn with_comparisons(mut self, comparisons: Vec<CityComparison>) -> Self {
        self.comparisons = comparisons;
        self
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.offline {
            Err(StoreError::Unavailable("memory store offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ComparisonStore for MemoryStore {
    fn comparisons_since(&mut self, since: DateTime<Utc>) -> Result<Vec<CityComparison>, StoreError> {
        self.check_online()?;
        let mut rows: Vec<_> = self
            .comparisons
            .iter()
            .filter(|row| row.fetched_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.fetched_at.cmp(&a.fetched_at));
        Ok(rows)
    }

    fn insert_comparisons(&mut self, rows: &[CityComparison]) -> Result<(), StoreError> {
        self.check_online()?;
        self.insert_calls += 1;
        self.comparisons.extend_from_slice(rows);
        Ok(())
    }
}

impl ReadingSource for MemoryStore {
    fn readings_since(&mut self, since: DateTime<Utc>) -> Result<Vec<Reading>, StoreError> {
        self.check_online()?;
        let mut rows: Vec<_> = self
            .readings
            .iter()
            .filter(|r| r.captured_at >= since)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.captured_at.cmp(&a.captured_at));
        Ok(rows)
    }
}
