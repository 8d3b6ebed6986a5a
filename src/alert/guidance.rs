//! Health guidance text.
//!
//! Four coarse bands, wider than the severity tiers so the sentence does
//! not flip between near-identical readings.

pub const GUIDANCE_SAFE: &str = "Safe for all activities. Great day for outdoor exercise.";
pub const GUIDANCE_MOSTLY_UNAFFECTED: &str = "Most people won't notice anything. Those with asthma or respiratory conditions might want to limit prolonged outdoor exertion.";
pub const GUIDANCE_LIMIT_EXERTION: &str =
    "Consider keeping windows closed. Not ideal for outdoor exercise.";
pub const GUIDANCE_AVOID_OUTDOORS: &str =
    "Limit time outdoors. Keep windows closed. Sensitive groups should avoid outdoor activities.";

/// One fixed sentence per band: `<= 50`, `<= 100`, `<= 150`, above.
pub fn health_guidance(index: f64) -> &'static str {
    if index <= 50.0 {
        GUIDANCE_SAFE
    } else if index <= 100.0 {
        GUIDANCE_MOSTLY_UNAFFECTED
    } else if index <= 150.0 {
        GUIDANCE_LIMIT_EXERTION
    } else {
        GUIDANCE_AVOID_OUTDOORS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_edges_are_inclusive() {
        assert_eq!(health_guidance(0.0), GUIDANCE_SAFE);
        assert_eq!(health_guidance(50.0), GUIDANCE_SAFE);
        assert_eq!(health_guidance(50.5), GUIDANCE_MOSTLY_UNAFFECTED);
        assert_eq!(health_guidance(100.0), GUIDANCE_MOSTLY_UNAFFECTED);
        assert_eq!(health_guidance(101.0), GUIDANCE_LIMIT_EXERTION);
        assert_eq!(health_guidance(150.0), GUIDANCE_LIMIT_EXERTION);
        assert_eq!(health_guidance(151.0), GUIDANCE_AVOID_OUTDOORS);
    }

    #[test]
    fn test_guidance_is_coarser_than_tiers() {
        // Good through Poor all read as "safe".
        for index in [5.0, 15.0, 22.0, 40.0] {
            assert_eq!(health_guidance(index), GUIDANCE_SAFE);
        }
    }
}
