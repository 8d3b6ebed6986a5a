//! Comparative narrative for the dashboard and the daily email.
//!
//! Opens with the severity description for the current index, adds a
//! ranking sentence when the station beats most of the roster, and closes
//! with a short "Compared to right now" list: every home-country city in
//! ascending AQI order, then a few fixed international references.

use crate::alert::severity::classify;
use crate::config::EngineConfig;
use crate::model::CityComparison;

/// Above this percentile the superlative sentence is used.
pub const SUPERLATIVE_PERCENTILE: u32 = 80;
/// Above this percentile the milder comparative sentence is used.
pub const COMPARATIVE_PERCENTILE: u32 = 50;

#[derive(Debug, Clone, PartialEq)]
pub struct NarrativeSettings {
    pub station_name: String,
    pub home_country: String,
    pub international: Vec<String>,
}

impl Default for NarrativeSettings {
    fn default() -> Self {
        EngineConfig::default().into()
    }
}

impl From<EngineConfig> for NarrativeSettings {
    fn from(config: EngineConfig) -> Self {
        Self {
            station_name: config.station_name,
            home_country: config.home_country,
            international: config.international,
        }
    }
}

impl From<&EngineConfig> for NarrativeSettings {
    fn from(config: &EngineConfig) -> Self {
        config.clone().into()
    }
}

/// Share of compared cities with strictly dirtier air than `current`,
/// rounded to a whole percent. Ties count as not better. `None` when
/// there is nothing to compare against.
pub fn percentile_cleaner_than(current: f64, comparisons: &[CityComparison]) -> Option<u32> {
    if comparisons.is_empty() {
        return None;
    }
    let better_than = comparisons.iter().filter(|c| c.aqi > current).count();
    Some((100.0 * better_than as f64 / comparisons.len() as f64).round() as u32)
}

/// Comparisons sorted ascending by AQI. Stable, so equal values keep
/// their input order.
pub fn rank_ascending(comparisons: &[CityComparison]) -> Vec<CityComparison> {
    let mut sorted = comparisons.to_vec();
    sorted.sort_by(|a, b| a.aqi.total_cmp(&b.aqi));
    sorted
}

/// The cities listed in the comparison section, in display order.
/// Cities missing from `sorted` are skipped.
pub fn key_comparisons<'a>(
    settings: &NarrativeSettings,
    sorted: &'a [CityComparison],
) -> Vec<&'a CityComparison> {
    let home = sorted.iter().filter(|c| c.country == settings.home_country);
    let international = settings
        .international
        .iter()
        .filter_map(|name| sorted.iter().find(|c| &c.city == name))
        .filter(|c| c.country != settings.home_country);
    home.chain(international).collect()
}

/// Narrative with the default station settings.
pub fn generate_story(current: f64, comparisons: &[CityComparison]) -> String {
    generate_story_with(&NarrativeSettings::default(), current, comparisons)
}

pub fn generate_story_with(
    settings: &NarrativeSettings,
    current: f64,
    comparisons: &[CityComparison],
) -> String {
    let sorted = rank_ascending(comparisons);

    let mut story = format!("{}\n\n", classify(current).description);

    // Below the median we say nothing about ranking.
    match percentile_cleaner_than(current, &sorted) {
        Some(p) if p > SUPERLATIVE_PERCENTILE => {
            story.push_str(&format!(
                "The air at {} right now is cleaner than {}% of major cities worldwide. \
                 You're breathing mountain-quality air.\n\n",
                settings.station_name, p
            ));
        }
        Some(p) if p > COMPARATIVE_PERCENTILE => {
            story.push_str(&format!(
                "Your air quality is better than {}% of major cities worldwide.\n\n",
                p
            ));
        }
        _ => {}
    }

    let listed = key_comparisons(settings, &sorted);
    if !listed.is_empty() {
        story.push_str("Compared to right now:\n");
        for city in listed {
            story.push_str(&format!(
                "• {}: AQI {} ({})\n",
                city.city,
                city.aqi,
                classify(city.aqi).level
            ));
        }
    }

    story
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn city(name: &str, country: &str, aqi: f64) -> CityComparison {
        CityComparison {
            city: name.to_string(),
            country: country.to_string(),
            aqi,
            pm25: None,
            pm10: None,
            fetched_at: Utc.with_ymd_and_hms(2025, 3, 10, 12, 30, 0).unwrap(),
        }
    }

    // --- Percentile ---------------------------------------------------------

    #[test]
    fn test_percentile_counts_strictly_greater_only() {
        let comparisons = vec![
            city("A", "X", 10.0),
            city("B", "X", 15.0),
            city("C", "X", 30.0),
            city("D", "X", 50.0),
        ];
        assert_eq!(percentile_cleaner_than(20.0, &comparisons), Some(50));
        // 30 ties with C and is not counted.
        assert_eq!(percentile_cleaner_than(30.0, &comparisons), Some(25));
    }

    #[test]
    fn test_percentile_rounds_to_nearest() {
        let comparisons = vec![city("A", "X", 5.0), city("B", "X", 50.0), city("C", "X", 60.0)];
        // 2/3 = 66.67 → 67
        assert_eq!(percentile_cleaner_than(10.0, &comparisons), Some(67));
    }

    #[test]
    fn test_percentile_is_none_without_comparisons() {
        assert_eq!(percentile_cleaner_than(10.0, &[]), None);
    }

    // --- Sentence branches --------------------------------------------------

    #[test]
    fn test_exactly_fifty_percent_adds_no_sentence() {
        let comparisons = vec![
            city("A", "X", 10.0),
            city("B", "X", 15.0),
            city("C", "X", 30.0),
            city("D", "X", 50.0),
        ];
        let story = generate_story(20.0, &comparisons);
        assert!(!story.contains("better than"), "50% is not above the median: {}", story);
        assert!(!story.contains("cleaner than"));
    }

    #[test]
    fn test_above_eighty_percent_uses_superlative() {
        let comparisons: Vec<_> = (0..10).map(|i| city(&format!("C{}", i), "X", 40.0 + i as f64)).collect();
        let story = generate_story(5.0, &comparisons);
        assert!(story.contains("The air at Cascina Leone right now is cleaner than 100%"));
        assert!(story.contains("mountain-quality air"));
    }

    #[test]
    fn test_between_fifty_and_eighty_uses_comparative() {
        let comparisons = vec![
            city("A", "X", 10.0),
            city("B", "X", 30.0),
            city("C", "X", 40.0),
            city("D", "X", 50.0),
        ];
        let story = generate_story(20.0, &comparisons);
        assert!(story.contains("Your air quality is better than 75% of major cities worldwide."));
        assert!(!story.contains("mountain-quality"));
    }

    // --- Comparison section -------------------------------------------------

    #[test]
    fn test_empty_comparisons_still_describe_current_air() {
        let story = generate_story(18.0, &[]);
        assert!(!story.is_empty());
        assert!(story.starts_with(classify(18.0).description));
        assert!(!story.contains("Compared to right now"));
    }

    #[test]
    fn test_home_group_sorted_then_international_in_fixed_order() {
        let comparisons = vec![
            city("Shanghai", "China", 90.0),
            city("Milan", "Italy", 45.0),
            city("Los Angeles", "USA", 60.0),
            city("Turin", "Italy", 38.0),
            city("Paris", "France", 12.0),
            city("Berlin", "Germany", 20.0),
        ];
        let sorted = rank_ascending(&comparisons);
        let names: Vec<_> = key_comparisons(&NarrativeSettings::default(), &sorted)
            .iter()
            .map(|c| c.city.as_str())
            .collect();
        assert_eq!(names, vec!["Turin", "Milan", "Paris", "Los Angeles", "Shanghai"]);
    }

    #[test]
    fn test_missing_cities_are_silently_skipped() {
        let comparisons = vec![city("Rome", "Italy", 30.0), city("Shanghai", "China", 110.0)];
        let story = generate_story(12.0, &comparisons);
        assert!(story.contains("• Rome: AQI 30 (Poor)\n"));
        assert!(story.contains("• Shanghai: AQI 110 (Extremely Poor)\n"));
        assert!(!story.contains("Paris"));
        assert!(!story.contains("Los Angeles"));
    }

    #[test]
    fn test_non_listed_cities_count_toward_percentile_only() {
        let comparisons = vec![city("Berlin", "Germany", 80.0), city("London", "UK", 70.0)];
        let story = generate_story(5.0, &comparisons);
        assert!(story.contains("cleaner than 100%"));
        assert!(!story.contains("Compared to right now"));
    }

    #[test]
    fn test_custom_settings_change_station_and_home_group() {
        let settings = NarrativeSettings {
            station_name: "Rooftop".to_string(),
            home_country: "France".to_string(),
            international: vec!["Milan".to_string()],
        };
        let comparisons = vec![
            city("Paris", "France", 40.0),
            city("Milan", "Italy", 45.0),
            city("Turin", "Italy", 38.0),
            city("Berlin", "Germany", 50.0),
            city("London", "UK", 60.0),
            city("Rome", "Italy", 70.0),
        ];
        let story = generate_story_with(&settings, 3.0, &comparisons);
        assert!(story.contains("The air at Rooftop"));
        let paris = story.find("• Paris").expect("home group listed");
        let milan = story.find("• Milan").expect("international listed");
        assert!(paris < milan);
        assert!(!story.contains("• Turin"));
    }
}
