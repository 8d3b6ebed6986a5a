//! `airmon_service` -- air quality report runner.
//!
//! Invoked by the dashboard's scheduled handlers.
//!
//! | Command   | Effect                                                      |
//! |-----------|-------------------------------------------------------------|
//! | `report`  | Print the current air quality report as JSON (default).    |
//! | `refresh` | Refetch the whole roster and append it to the cache table. |
//! | `summary` | Print yesterday's AQI roll-up as JSON.                      |
//! | `verify`  | Check every roster city against the live feed.              |
//!
//! # Environment variables
//!
//! | Variable         | Required | Default          |
//! |------------------|----------|------------------|
//! | `DATABASE_URL`   | yes*     | --               |
//! | `WAQI_API_TOKEN` | no       | `demo`           |
//! | `AIRMON_CONFIG`  | no       | `./airmon.toml`  |
//!
//! *not needed for `verify`.

use airmon_service::alert::freshness::{Clock, SystemClock};
use airmon_service::cache::{CacheSettings, ReferenceCache};
use airmon_service::config::{self, EngineConfig};
use airmon_service::db::{self, PgStore};
use airmon_service::engine::AirQualityEngine;
use airmon_service::ingest::sweep::ThreadPacer;
use airmon_service::ingest::waqi::WaqiClient;
use airmon_service::logging::{self, DataSource, LogLevel};
use airmon_service::roster::ROSTER;
use airmon_service::verify;
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logger(
        LogLevel::parse(&config.log_level),
        config.log_file.as_deref(),
        config.log_json,
    ) {
        eprintln!("failed to open log file: {}", e);
        return ExitCode::FAILURE;
    }

    let command = std::env::args().nth(1).unwrap_or_else(|| "report".to_string());

    match run(&command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            logging::error(DataSource::System, None, &format!("{} failed: {}", command, e));
            ExitCode::FAILURE
        }
    }
}

fn run(command: &str, config: &EngineConfig) -> Result<(), Box<dyn Error>> {
    let lookup = WaqiClient::new(config::waqi_token(), config.request_timeout())?;

    if command == "verify" {
        let report = verify::verify_roster(
            &lookup,
            ROSTER,
            &mut ThreadPacer,
            config.inter_call_delay(),
            SystemClock.now(),
        );
        verify::print_summary(&report);
        return Ok(());
    }

    let client = db::connect_and_verify(&[db::TABLE_READINGS, db::TABLE_COMPARISONS])?;
    let cache = ReferenceCache::new(PgStore::new(client), lookup, CacheSettings::from(config));
    let mut engine = AirQualityEngine::new(cache, config);

    match command {
        "report" => match engine.report()? {
            Some(report) => println!("{}", serde_json::to_string_pretty(&report)?),
            None => {
                println!("{}", serde_json::json!({ "error": "No air quality data available" }));
            }
        },
        "refresh" => {
            let fetched = engine.refresh()?;
            logging::info(
                DataSource::System,
                None,
                &format!("refreshed {}/{} roster cities", fetched.len(), ROSTER.len()),
            );
        }
        "summary" => {
            let yesterday = SystemClock.now().date_naive() - chrono::Duration::days(1);
            match engine.daily_summary(yesterday)? {
                Some(summary) => println!("{}", serde_json::to_string_pretty(&summary)?),
                None => println!(
                    "{}",
                    serde_json::json!({ "success": false, "message": "No data available for yesterday" })
                ),
            }
        }
        other => return Err(format!("unknown command '{}'", other).into()),
    }

    Ok(())
}
