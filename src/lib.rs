//! Air quality engine for the home weather dashboard.
//!
//! Turns the local sensor's instantaneous index into a NowCast-smoothed
//! value, classifies it, and narrates it against a cached roster of
//! reference cities fetched from the WAQI feed.
//!
//! Data flows one way:
//! readings → `analysis::nowcast` → `alert::severity` → `analysis::narrative`,
//! with `cache` supplying the comparisons. `engine` ties the steps together.

pub mod alert;
pub mod analysis;
pub mod cache;
pub mod config;
pub mod db;
pub mod engine;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod roster;
pub mod verify;
