//! Pure computations over readings and cached comparisons.
//!
//! Nothing in here touches the store or the network; the engine feeds
//! these functions and assembles the result.
//!
//! Submodules:
//! - `nowcast`    : smoothed index and the display-index selector.
//! - `narrative`  : ranked comparative story.
//! - `daily`      : per-day AQI average and high.
//! - `ventilation`: window-opening advice.

pub mod daily;
pub mod narrative;
pub mod nowcast;
pub mod ventilation;
