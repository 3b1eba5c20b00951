#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Core event record type shared across the event map engine.
//!
//! An [`Event`] is an immutable point-in-time geographic incident record:
//! a fixed core of identifier, year, and WGS84 coordinates, plus an open
//! string-keyed attribute map for the descriptive fields (country, summary
//! text, counts, categorical fields). The clustering and fan-out engines
//! never read beyond the core four fields; descriptive attributes are
//! carried opaquely for the renderer and tooltip layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single geographic incident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier (the source table's `eventid`, carried as a
    /// string key).
    pub id: String,
    /// Year the event occurred (the source table's `iyear`).
    pub year: i32,
    /// Latitude in WGS84 degrees.
    pub latitude: f64,
    /// Longitude in WGS84 degrees.
    pub longitude: f64,
    /// Open descriptive attributes (`country_txt`, `summary`, ...).
    /// Never interpreted by the clustering or fan-out logic.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
}

impl Event {
    /// Creates an event with an empty attribute map.
    #[must_use]
    pub const fn new(id: String, year: i32, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            year,
            latitude,
            longitude,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds a descriptive attribute, consuming and returning `self` for
    /// chaining.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Looks up a descriptive attribute by column name.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// Whether the coordinates fall within the valid WGS84 ranges
    /// (latitude [-90, 90], longitude [-180, 180]).
    #[must_use]
    pub fn has_valid_coordinates(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_lookup() {
        let event = Event::new("197001020001".to_string(), 1970, 51.5, -0.1)
            .with_attribute("country_txt", "United Kingdom")
            .with_attribute("summary", "Test incident");

        assert_eq!(event.attribute("country_txt"), Some("United Kingdom"));
        assert_eq!(event.attribute("nkill"), None);
    }

    #[test]
    fn coordinate_validity() {
        let valid = Event::new("1".to_string(), 2001, 51.5, -0.1);
        assert!(valid.has_valid_coordinates());

        let bad_lat = Event::new("2".to_string(), 2001, 91.0, 0.0);
        assert!(!bad_lat.has_valid_coordinates());

        let bad_lon = Event::new("3".to_string(), 2001, 0.0, -181.0);
        assert!(!bad_lon.has_valid_coordinates());
    }
}
