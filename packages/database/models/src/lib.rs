#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Query parameter types for the event map store.
//!
//! These types describe what a single map query asks for: the visible
//! [`Viewport`], the user's [`Filter`], and which [`Projection`] of each
//! row to materialize. They are created by the caller (UI orchestration)
//! and consumed read-only by the store adapter and query engine.

use serde::{Deserialize, Serialize};

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Latitude of the vertical center of the box. Used to pick a single
    /// global cluster cell size for a whole query.
    #[must_use]
    pub fn center_latitude(&self) -> f64 {
        f64::midpoint(self.south, self.north)
    }

    /// Whether the box is well-formed: south not above north, west not
    /// east of east, and latitudes bounded away from the poles' invalid
    /// range. A zero-area box (south == north, west == east) is valid.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.south <= self.north
            && self.west <= self.east
            && (-90.0..=90.0).contains(&self.south)
            && (-90.0..=90.0).contains(&self.north)
            && (-180.0..=180.0).contains(&self.west)
            && (-180.0..=180.0).contains(&self.east)
    }
}

/// The visible map area driving a query: bounding box plus zoom level.
///
/// Recomputed by the caller on every pan, zoom, or programmatic re-center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Visible bounding box.
    pub bbox: BoundingBox,
    /// Map zoom level (non-negative).
    pub zoom: f64,
}

impl Viewport {
    /// Creates a viewport from a bounding box and zoom level.
    #[must_use]
    pub const fn new(bbox: BoundingBox, zoom: f64) -> Self {
        Self { bbox, zoom }
    }

    /// Whether the viewport is well-formed (see [`BoundingBox::is_valid`];
    /// zoom must also be non-negative and finite).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.bbox.is_valid() && self.zoom.is_finite() && self.zoom >= 0.0
    }
}

/// An inclusive year range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearRange {
    /// First year included.
    pub start: i32,
    /// Last year included.
    pub end: i32,
}

impl YearRange {
    /// Creates an inclusive year range.
    #[must_use]
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Whether the given year falls inside this range.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.start && year <= self.end
    }
}

/// User-controlled filter state: year range plus free-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    /// Inclusive year range. `None` means the full dataset range.
    pub years: Option<YearRange>,
    /// Free-text substring filter against the summary text. Trimmed,
    /// matched case-insensitively; empty means no text filter.
    pub text: String,
}

impl Filter {
    /// A filter that matches everything.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            years: None,
            text: String::new(),
        }
    }

    /// Restricts the filter to an inclusive year range.
    #[must_use]
    pub const fn with_years(mut self, start: i32, end: i32) -> Self {
        self.years = Some(YearRange::new(start, end));
        self
    }

    /// Sets the free-text filter, trimming surrounding whitespace.
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.trim().to_string();
        self
    }

    /// The trimmed search text, or `None` when no text filter is active.
    #[must_use]
    pub fn search_text(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::all()
    }
}

/// Which subset of record fields a fetch should materialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Projection {
    /// Core fields only (id, year, latitude, longitude) for bulk
    /// rendering queries.
    Minimal,
    /// Core fields plus all descriptive attribute columns, for detail
    /// and tooltip lookups.
    Full,
}
