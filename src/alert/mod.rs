//! Classification and guidance for the current index, plus the freshness
//! rules the comparison cache applies to its rows.
//!
//! Submodules:
//! - `severity` : six-tier index classifier.
//! - `guidance` : four-band health guidance.
//! - `freshness`: injected clocks and the staleness predicate.

pub mod freshness;
pub mod guidance;
pub mod severity;
