//! Air quality severity tiers.
//!
//! One fixed, ordered table of six half-open bands `[min, next_min)` that
//! partitions `[0, ∞)`. The values are an illustrative scale shaped after
//! the EEA European index, not a regulatory implementation.

use serde::Serialize;

/// One band of the index scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tier {
    pub level: &'static str,
    /// Inclusive lower bound.
    pub min_index: f64,
    /// Exclusive upper bound; `None` for the last tier.
    pub max_index: Option<f64>,
    pub color: &'static str,
    pub description: &'static str,
}

impl Tier {
    pub fn contains(&self, index: f64) -> bool {
        index >= self.min_index && self.max_index.is_none_or(|max| index < max)
    }
}

/// What callers render: the tier's label, color and description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub level: &'static str,
    pub color: &'static str,
    pub description: &'static str,
}

impl From<&Tier> for Classification {
    fn from(tier: &Tier) -> Self {
        Self {
            level: tier.level,
            color: tier.color,
            description: tier.description,
        }
    }
}

pub static TIERS: &[Tier] = &[
    Tier {
        level: "Good",
        min_index: 0.0,
        max_index: Some(10.0),
        color: "#10b981",
        description: "Excellent air quality—like a mountain forest. Among the best air in Europe.",
    },
    Tier {
        level: "Fair",
        min_index: 10.0,
        max_index: Some(20.0),
        color: "#84cc16",
        description: "Fair air quality. Similar to a clear day in the Alps.",
    },
    Tier {
        level: "Moderate",
        min_index: 20.0,
        max_index: Some(25.0),
        color: "#eab308",
        description: "Moderate air quality. Acceptable for most people.",
    },
    Tier {
        level: "Poor",
        min_index: 25.0,
        max_index: Some(50.0),
        color: "#f97316",
        description: "Poor air quality, comparable to standing by a busy road. Sensitive individuals may experience respiratory symptoms.",
    },
    Tier {
        level: "Very Poor",
        min_index: 50.0,
        max_index: Some(75.0),
        color: "#ef4444",
        description: "Very poor air quality. Everyone may begin to experience health effects.",
    },
    Tier {
        level: "Extremely Poor",
        min_index: 75.0,
        max_index: None,
        color: "#991b1b",
        description: "Extremely poor air quality. Health alert—everyone may experience serious effects.",
    },
];

/// Returns the tier for `index`.
///
/// Ordered scan for the first tier whose upper bound exceeds `index`.
/// Negative values are not validated and land in the lowest tier; NaN
/// compares false against every bound and lands in the last one.
pub fn tier_for(index: f64) -> &'static Tier {
    TIERS
        .iter()
        .find(|tier| tier.max_index.is_some_and(|max| index < max))
        .unwrap_or(&TIERS[TIERS.len() - 1])
}

/// Maps a numeric index to its level, color and description.
pub fn classify(index: f64) -> Classification {
    tier_for(index).into()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
