//! Outbound data sources.
//!
//! - `waqi` : city feed client and payload parsing.
//! - `sweep`: paced, sequential iteration over the roster.

pub mod sweep;
pub mod waqi;
