//! Daily AQI roll-up for the summary row and the morning email.

use crate::model::Reading;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAqiSummary {
    pub date: NaiveDate,
    pub average: f64,
    pub high: f64,
    pub high_at: DateTime<Utc>,
    pub samples: usize,
}

/// Summarize the readings captured on `date` (UTC). Readings from other
/// days and readings without a value are ignored. Ties for the high go
/// to the earliest reading.
pub fn summarize_day(date: NaiveDate, readings: &[Reading]) -> Option<DailyAqiSummary> {
    let mut values: Vec<(DateTime<Utc>, f64)> = readings
        .iter()
        .filter(|r| r.captured_at.date_naive() == date)
        .filter_map(|r| r.value.map(|v| (r.captured_at, v)))
        .collect();

    if values.is_empty() {
        return None;
    }
    values.sort_by_key(|(at, _)| *at);

    let sum: f64 = values.iter().map(|(_, v)| v).sum();
    let (high_at, high) = values
        .iter()
        .copied()
        .fold(values[0], |best, candidate| if candidate.1 > best.1 { candidate } else { best });

    Some(DailyAqiSummary {
        date,
        average: sum / values.len() as f64,
        high,
        high_at,
        samples: values.len(),
    })
}
