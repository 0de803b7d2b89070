use serde::Deserialize;

use crate::geo::GeoPoint;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    pub lng: f64,
    pub lat: f64,
}

impl RosterEntry {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.lng, self.lat)
    }
}

/// Headquarters roster backing `companies` and `hq`.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    /// First entry whose name contains `query`, ignoring case. No nearest-match fallback.
    pub fn find(&self, query: &str) -> Option<&RosterEntry> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return None;
        }
        self.entries
            .iter()
            .find(|entry| entry.name.to_lowercase().contains(&needle))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            RosterEntry {
                name: "Orbital Dynamics".to_string(),
                lng: -118.2,
                lat: 34.0,
            },
            RosterEntry {
                name: "Northwind Robotics".to_string(),
                lng: 10.7,
                lat: 59.9,
            },
        ])
    }

    #[test]
    fn find_matches_first_substring_ignoring_case() {
        let roster = roster();
        assert_eq!(
            roster.find("ROBO").map(|e| e.name.as_str()),
            Some("Northwind Robotics")
        );
        assert_eq!(
            roster.find("o").map(|e| e.name.as_str()),
            Some("Orbital Dynamics")
        );
    }

    #[test]
    fn find_has_no_fallback() {
        let roster = roster();
        assert!(roster.find("acme").is_none());
        assert!(roster.find("   ").is_none());
    }
}
