//! NowCast smoothing of the local index.
//!
//! A weighted average over the most recent readings, weight `w^i` for the
//! i-th most recent. `w` shrinks as the window gets more volatile, which
//! leans the average toward the newest reading, but is floored at 0.5 so
//! older samples never drop out entirely.

/// At most this many readings take part in the average.
pub const MAX_READINGS: usize = 12;

/// Smallest decay weight.
pub const MIN_WEIGHT: f64 = 0.5;

/// Smoothed index over `readings`, ordered most-recent-first.
///
/// Returns `None` for fewer than two readings; callers fall back to the
/// latest raw value (see [`display_index`]). Only the first
/// [`MAX_READINGS`] entries are used. Cadence is not checked. Negative
/// values are accepted and not clamped.
pub fn compute_nowcast(readings: &[f64]) -> Option<f64> {
    if readings.len() < 2 {
        return None;
    }

    let window = &readings[..readings.len().min(MAX_READINGS)];
    let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = window.iter().copied().fold(f64::INFINITY, f64::min);

    let w = decay_weight(min, max);

    let mut weighted_sum = 0.0;
    let mut weight_sum = 0.0;
    let mut weight = 1.0;
    for value in window {
        weighted_sum += value * weight;
        weight_sum += weight;
        weight *= w;
    }

    if weight_sum > 0.0 {
        Some(weighted_sum / weight_sum)
    } else {
        None
    }
}

/// `max(0.5, 1 - range/max)` for a positive max, else 0.5.
pub fn decay_weight(min: f64, max: f64) -> f64 {
    if max > 0.0 {
        (1.0 - (max - min) / max).max(MIN_WEIGHT)
    } else {
        MIN_WEIGHT
    }
}

/// The one index every consumer should show and classify: the NowCast
/// value when there was enough history, otherwise the raw reading.
pub fn display_index(raw: f64, nowcast: Option<f64>) -> f64 {
    nowcast.unwrap_or(raw)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn assert_within_range(readings: &[f64]) {
        let value = compute_nowcast(readings).expect("two or more readings");
        let window = &readings[..readings.len().min(MAX_READINGS)];
        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        assert!(
            value >= min - 1e-9 && value <= max + 1e-9,
            "nowcast {} escaped [{}, {}] for {:?}",
            value,
            min,
            max,
            readings
        );
    }

    // --- Insufficient data --------------------------------------------------

    #[test]
    fn test_empty_input_is_none() {
        assert_eq!(compute_nowcast(&[]), None);
    }

    #[test]
    fn test_single_reading_is_none() {
        assert_eq!(compute_nowcast(&[42.0]), None);
    }

    // --- Weighting ----------------------------------------------------------

    #[test]
    fn test_constant_series_returns_the_constant() {
        assert_close(compute_nowcast(&[17.0; 8]).unwrap(), 17.0);
    }

    #[test]
    fn test_two_readings_hand_computed() {
        // max 20, min 10 → w = max(0.5, 1 - 10/20) = 0.5
        // (20*1 + 10*0.5) / 1.5 = 16.666...
        assert_close(compute_nowcast(&[20.0, 10.0]).unwrap(), 25.0 / 1.5);
    }

    #[test]
    fn test_stable_series_uses_weight_above_floor() {
        // max 10, min 8 → w = 0.8
        let w: f64 = 0.8;
        let expected = (10.0 + 9.0 * w + 8.0 * w * w) / (1.0 + w + w * w);
        assert_close(compute_nowcast(&[10.0, 9.0, 8.0]).unwrap(), expected);
    }

    #[test]
    fn test_decay_weight_is_floored() {
        assert_eq!(decay_weight(1.0, 100.0), MIN_WEIGHT);
        assert_eq!(decay_weight(0.0, 0.0), MIN_WEIGHT);
        assert_eq!(decay_weight(-5.0, -1.0), MIN_WEIGHT);
        assert_close(decay_weight(9.0, 10.0), 0.9);
    }

    #[test]
    fn test_recent_reading_dominates_after_spike() {
        let value = compute_nowcast(&[80.0, 10.0, 10.0, 10.0]).unwrap();
        assert!(value > 40.0, "spike should pull the average up, got {}", value);
    }

    // --- Range property -----------------------------------------------------

    #[test]
    fn test_output_stays_within_input_range() {
        let series: [&[f64]; 6] = [
            &[5.0, 100.0],
            &[100.0, 5.0, 60.0, 2.0],
            &[0.0, 0.0, 0.0],
            &[3.5, 3.4, 3.6, 3.5, 3.7, 3.3, 3.2, 3.9, 4.0, 3.1, 2.9, 3.0],
            &[-4.0, 6.0, -1.0],
            &[-3.0, -8.0],
        ];
        for readings in series {
            assert_within_range(readings);
        }
    }

    #[test]
    fn test_elements_beyond_twelfth_are_ignored() {
        let head = [12.0, 14.0, 18.0, 11.0, 9.0, 10.0, 16.0, 20.0, 22.0, 13.0, 15.0, 17.0];
        let mut long = head.to_vec();
        long.extend_from_slice(&[500.0, 0.0, 250.0, 1.0, 999.0, 3.0, 7.0, 80.0]);
        assert_eq!(long.len(), 20);
        assert_eq!(compute_nowcast(&long), compute_nowcast(&head));
    }

    #[test]
    fn test_negative_values_are_not_clamped() {
        let value = compute_nowcast(&[-2.0, -2.0]).unwrap();
        assert_close(value, -2.0);
    }

    // --- Display selector ---------------------------------------------------

    #[test]
    fn test_display_index_prefers_nowcast() {
        assert_eq!(display_index(30.0, Some(18.0)), 18.0);
        assert_eq!(display_index(30.0, None), 30.0);
    }
}
