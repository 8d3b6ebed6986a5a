//! Roster Verification Module
//!
//! Checks every roster city against the live feed to see which queries
//! still resolve and return an index. Run before editing the roster, or
//! when a city keeps disappearing from the comparison section.

use crate::ingest::sweep::{CityFetch, Pacer, RosterSweep};
use crate::ingest::waqi::CityLookup;
use crate::roster::RosterCity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub results: Vec<CityVerification>,
    pub summary: VerificationSummary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerificationSummary {
    pub total: usize,
    pub working: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityVerification {
    pub city: String,
    pub country: String,
    pub query: String,
    pub status: VerificationStatus,
    pub aqi: Option<f64>,
    pub has_pm25: bool,
    pub has_pm10: bool,
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum VerificationStatus {
    Success,
    /// Index present but no PM2.5 sub-reading.
    PartialSuccess,
    Failed,
}

// ============================================================================
// Per-city check
// ============================================================================

fn verification_from(fetch: CityFetch<'_>) -> CityVerification {
    let mut result = CityVerification {
        city: fetch.city.city.to_string(),
        country: fetch.city.country.to_string(),
        query: fetch.city.query.to_string(),
        status: VerificationStatus::Failed,
        aqi: None,
        has_pm25: false,
        has_pm10: false,
        error_message: None,
    };

    match fetch.result {
        Ok(reading) => {
            result.aqi = Some(reading.aqi);
            result.has_pm25 = reading.pm25.is_some();
            result.has_pm10 = reading.pm10.is_some();
            result.status = if result.has_pm25 {
                VerificationStatus::Success
            } else {
                VerificationStatus::PartialSuccess
            };
        }
        Err(e) => {
            result.error_message = Some(e.to_string());
        }
    }

    result
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn verify_roster<L: CityLookup, P: Pacer>(
    lookup: &L,
    roster: &[RosterCity],
    pacer: &mut P,
    delay: Duration,
    now: DateTime<Utc>,
) -> VerificationReport {
    let mut report = VerificationReport {
        timestamp: now.to_rfc3339(),
        results: Vec::with_capacity(roster.len()),
        summary: VerificationSummary {
            total: roster.len(),
            working: 0,
            failed: 0,
        },
    };

    for fetch in RosterSweep::new(roster, lookup, pacer, delay) {
        let result = verification_from(fetch);
        match result.status {
            VerificationStatus::Success | VerificationStatus::PartialSuccess => {
                report.summary.working += 1
            }
            VerificationStatus::Failed => report.summary.failed += 1,
        }
        report.results.push(result);
    }

    report
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 ROSTER VERIFICATION");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    for result in &report.results {
        match result.status {
            VerificationStatus::Success => {
                println!("  ✓ {} ({}): AQI {}", result.city, result.query, result.aqi.unwrap_or_default())
            }
            VerificationStatus::PartialSuccess => {
                println!("  ⚠ {} ({}): AQI {} without PM2.5", result.city, result.query, result.aqi.unwrap_or_default())
            }
            VerificationStatus::Failed => println!(
                "  ✗ {} ({}): {}",
                result.city,
                result.query,
                result.error_message.as_deref().unwrap_or("Unknown")
            ),
        }
    }
    println!();

    let success_rate = if report.summary.total > 0 {
        (report.summary.working as f64 / report.summary.total as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Overall Success Rate: {:.1}% ({}/{}, {} failed)",
        success_rate, report.summary.working, report.summary.total, report.summary.failed
    );
    println!("═══════════════════════════════════════════════════════════");
}
