#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Pure map geometry math for the event map engine.
//!
//! Converts between zoom levels, on-screen pixel sizes, and geodetic
//! degrees so that cluster cells and fan-out rings keep a roughly constant
//! visual size across zoom levels and latitudes. All functions are pure
//! and total; the only degenerate case is the mathematically undefined
//! pole latitude (|lat| = 90), which callers avoid by construction since
//! Web-Mercator viewports are always bounded away from the poles.

use serde::{Deserialize, Serialize};

/// Web-Mercator ground resolution at the equator for zoom 0, in meters
/// per pixel (256px tiles).
const WEB_MERCATOR_METERS_PER_PIXEL: f64 = 156_543.033_92;

/// Approximate meters per degree of latitude.
const METERS_PER_DEGREE_LATITUDE: f64 = 111_320.0;

/// Reference pixel sizing configuration.
///
/// Pixel radius is linear in zoom, anchored at the reference pair and
/// clamped so extreme zooms stay renderable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelScale {
    /// Zoom level the reference radius is anchored at.
    pub reference_zoom: f64,
    /// Pixel radius at the reference zoom.
    pub reference_px: f64,
    /// Minimum pixel radius after clamping.
    pub min_px: f64,
    /// Maximum pixel radius after clamping.
    pub max_px: f64,
}

impl Default for PixelScale {
    fn default() -> Self {
        Self {
            reference_zoom: 6.0,
            reference_px: 20.0,
            min_px: 4.0,
            max_px: 40.0,
        }
    }
}

/// Target on-screen radius in pixels for a given zoom level.
///
/// Linear in zoom anchored at the scale's reference pair, clamped to
/// `[min_px, max_px]`. Monotonically non-decreasing in zoom.
#[must_use]
pub fn pixel_radius(zoom: f64, scale: &PixelScale) -> f64 {
    (scale.reference_px * zoom / scale.reference_zoom).clamp(scale.min_px, scale.max_px)
}

/// On-screen point diameter in pixels for a given zoom level.
///
/// Scales the configured base diameter linearly with zoom, clamped to
/// `[base / 4, base]` so points shrink at low zoom without vanishing.
#[must_use]
pub fn point_diameter(zoom: f64, scale: &PixelScale, base_diameter_px: f64) -> f64 {
    (base_diameter_px * zoom / scale.reference_zoom)
        .clamp(base_diameter_px / 4.0, base_diameter_px)
}

/// Web-Mercator ground resolution in meters per pixel at a zoom level and
/// latitude.
///
/// Standard scale factor `156543.03392 * cos(lat) / 2^zoom`. Degenerates
/// to zero at the poles; callers must not query at |latitude| = 90.
#[must_use]
pub fn meters_per_pixel(zoom: f64, latitude: f64) -> f64 {
    WEB_MERCATOR_METERS_PER_PIXEL * latitude.to_radians().cos() / 2_f64.powf(zoom)
}

/// Converts a pixel radius into a degree-sized cluster cell at the given
/// latitude.
///
/// Returns `(lat_degrees, lon_degrees)`. Longitude degrees are widened by
/// `1 / cos(lat)` to correct for latitude compression, so cells cover a
/// visually consistent area as the viewport approaches the poles. Cell
/// size increases as zoom decreases.
#[must_use]
pub fn cell_size_degrees(pixel_radius_px: f64, zoom: f64, latitude: f64) -> (f64, f64) {
    let meters = pixel_radius_px * meters_per_pixel(zoom, latitude);
    let lat_degrees = meters / METERS_PER_DEGREE_LATITUDE;
    let lon_degrees = lat_degrees / latitude.to_radians().cos();
    (lat_degrees, lon_degrees)
}

/// Places a point on a ring around a center coordinate.
///
/// `radius_deg` is the ring radius in latitude degrees; the longitude
/// component is widened by `1 / cos(lat)` so the ring renders circular
/// on screen rather than elliptical.
#[must_use]
pub fn ring_position(latitude: f64, longitude: f64, radius_deg: f64, angle_rad: f64) -> (f64, f64) {
    let lat = latitude + radius_deg * angle_rad.sin();
    let lon = longitude + radius_deg * angle_rad.cos() / latitude.to_radians().cos();
    (lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_radius_reference_and_clamps() {
        let scale = PixelScale::default();
        assert!((pixel_radius(6.0, &scale) - 20.0).abs() < 1e-9);
        // Low zoom clamps to the minimum, high zoom to the maximum.
        assert!((pixel_radius(0.0, &scale) - 4.0).abs() < 1e-9);
        assert!((pixel_radius(20.0, &scale) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn pixel_radius_monotone() {
        let scale = PixelScale::default();
        let mut prev = 0.0;
        for step in 0..40 {
            let zoom = f64::from(step) * 0.5;
            let radius = pixel_radius(zoom, &scale);
            assert!(radius >= prev, "radius decreased at zoom {zoom}");
            prev = radius;
        }
    }

    #[test]
    fn point_diameter_clamps() {
        let scale = PixelScale::default();
        assert!((point_diameter(6.0, &scale, 12.0) - 12.0).abs() < 1e-9);
        assert!((point_diameter(0.0, &scale, 12.0) - 3.0).abs() < 1e-9);
        assert!((point_diameter(12.0, &scale, 12.0) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn meters_per_pixel_reference_values() {
        // Equator, zoom 0: the canonical Web-Mercator constant.
        assert!((meters_per_pixel(0.0, 0.0) - 156_543.033_92).abs() < 1e-6);
        // Each zoom level halves the resolution.
        assert!((meters_per_pixel(1.0, 0.0) - 78_271.516_96).abs() < 1e-6);
        // cos(60 degrees) = 0.5.
        assert!((meters_per_pixel(0.0, 60.0) - 78_271.516_96).abs() < 1e-6);
    }

    #[test]
    fn cell_size_grows_as_zoom_decreases() {
        let (lat_hi, lon_hi) = cell_size_degrees(20.0, 8.0, 45.0);
        let (lat_lo, lon_lo) = cell_size_degrees(20.0, 3.0, 45.0);
        assert!(lat_lo > lat_hi);
        assert!(lon_lo > lon_hi);
    }

    #[test]
    fn cell_size_widens_longitude_toward_poles() {
        let (lat_eq, lon_eq) = cell_size_degrees(20.0, 5.0, 0.0);
        // At the equator there is no compression to correct.
        assert!((lat_eq - lon_eq).abs() < 1e-12);

        let (lat_60, lon_60) = cell_size_degrees(20.0, 5.0, 60.0);
        // Longitude degrees shrink on the ground, so the cell widens.
        assert!((lon_60 - lat_60 / 60_f64.to_radians().cos()).abs() < 1e-12);
    }

    #[test]
    fn ring_position_equator_circle() {
        let (lat, lon) = ring_position(0.0, 10.0, 0.002, 0.0);
        assert!((lat - 0.0).abs() < 1e-12);
        assert!((lon - 10.002).abs() < 1e-12);

        let (lat, lon) = ring_position(0.0, 10.0, 0.002, std::f64::consts::FRAC_PI_2);
        assert!((lat - 0.002).abs() < 1e-12);
        assert!((lon - 10.0).abs() < 1e-12);
    }

    #[test]
    fn ring_position_latitude_correction() {
        // At 60N the longitude displacement doubles to stay circular on
        // screen (cos(60 degrees) = 0.5).
        let (_, lon) = ring_position(60.0, 0.0, 0.002, 0.0);
        assert!((lon - 0.004).abs() < 1e-9);
    }
}
