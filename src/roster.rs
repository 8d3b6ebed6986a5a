/// Roster registry for the comparison cache.
///
/// Defines the canonical list of reference cities the local station is
/// compared against, along with the WAQI feed query for each one.
/// This is the single source of truth for the roster; other modules
/// should iterate `ROSTER` rather than hardcoding city names.

// ---------------------------------------------------------------------------
// City metadata
// ---------------------------------------------------------------------------

/// A single reference city.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterCity {
    /// Display name, also the `city` column of cached rows.
    pub city: &'static str,
    /// Country group. Cities sharing the engine's home country are listed
    /// first in the narrative.
    pub country: &'static str,
    /// WAQI feed path segment: a city slug or an `@<station-id>`.
    pub query: &'static str,
}

/// All reference cities, fetched in this order on every refresh.
///
/// Sources:
///   - Query keys: aqicn.org city pages (api.waqi.info/feed/<query>/)
pub static ROSTER: &[RosterCity] = &[
    RosterCity { city: "Milan", country: "Italy", query: "milan" },
    RosterCity { city: "Turin", country: "Italy", query: "torino" },
    // Mignanego station; the Genoa city feed is frequently offline.
    RosterCity { city: "Genoa", country: "Italy", query: "@10883" },
    RosterCity { city: "Rome", country: "Italy", query: "rome" },
    RosterCity { city: "Paris", country: "France", query: "paris" },
    RosterCity { city: "Los Angeles", country: "USA", query: "los-angeles" },
    RosterCity { city: "New York", country: "USA", query: "new-york" },
    RosterCity { city: "Shanghai", country: "China", query: "shanghai" },
    RosterCity { city: "London", country: "UK", query: "london" },
    RosterCity { city: "Barcelona", country: "Spain", query: "barcelona" },
    RosterCity { city: "Berlin", country: "Germany", query: "berlin" },
];

/// Looks up a roster entry by display name. Returns `None` if not found.
pub fn find_city(city: &str) -> Option<&'static RosterCity> {
    ROSTER.iter().find(|c| c.city == city)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_duplicate_city_country_pairs() {
        let mut seen = std::collections::HashSet::new();
        for entry in ROSTER {
            assert!(
                seen.insert((entry.city, entry.country)),
                "duplicate roster entry '{} ({})'",
                entry.city,
                entry.country
            );
        }
    }

    #[test]
    fn test_queries_are_url_safe() {
        // The query is spliced into a URL path; spaces or slashes would
        // silently address a different feed.
        for entry in ROSTER {
            assert!(!entry.query.is_empty(), "empty query for '{}'", entry.city);
            assert!(
                entry
                    .query
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '@'),
                "query for '{}' is not URL safe: '{}'",
                entry.city,
                entry.query
            );
        }
    }

    #[test]
    fn test_roster_contains_narrative_reference_cities() {
        for expected in ["Milan", "Turin", "Paris", "Los Angeles", "Shanghai"] {
            assert!(find_city(expected).is_some(), "ROSTER missing '{}'", expected);
        }
    }

    #[test]
    fn test_find_city_returns_none_for_unknown_name() {
        assert!(find_city("Atlantis").is_none());
    }
}
