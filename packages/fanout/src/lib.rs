#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Coincident point fan-out for the event map engine.
//!
//! Many real incidents share exactly the same recorded coordinate
//! (administrative centroid reporting). Rendered as-is they collapse into
//! a single overlapping point, hiding count information and breaking
//! hover/click hit-testing. This engine redistributes each coincident
//! group onto concentric rings around the shared coordinate: ring `r`
//! holds `ceil(3 * 1.25^r)` points at radius `base + r * step`, with one
//! random starting angle per group so repeated groups across the map
//! don't align into a grid pattern.
//!
//! The engine itself is deterministic for a given seed; callers that pass
//! `None` get OS randomness at the orchestration boundary.

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use event_map_event_models::Event;
use event_map_geometry::ring_position;
use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use serde::{Deserialize, Serialize};

/// Ring layout configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanConfig {
    /// Radius of the innermost ring, in latitude degrees.
    pub base_radius_deg: f64,
    /// Radius increase per ring, in latitude degrees.
    pub ring_step_deg: f64,
    /// Zoom level at or above which coincident groups fan out. Below it
    /// groups pass through unmodified, since clustering mode already
    /// covers low zoom.
    pub zoom_threshold: f64,
}

impl Default for FanConfig {
    fn default() -> Self {
        Self {
            base_radius_deg: 0.002,
            ring_step_deg: 0.001,
            zoom_threshold: 6.0,
        }
    }
}

/// A copy of an [`Event`] with its render coordinate displaced onto a
/// ring position. The original record rides along unchanged, so the
/// renderer can hit-test by displaced coordinate and look up the source
/// record by id. Created fresh per query, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FannedPoint {
    /// Displaced render latitude.
    pub latitude: f64,
    /// Displaced render longitude.
    pub longitude: f64,
    /// The original record, untouched.
    pub event: Event,
}

impl FannedPoint {
    /// Wraps an event without displacement.
    #[must_use]
    pub fn passthrough(event: Event) -> Self {
        Self {
            latitude: event.latitude,
            longitude: event.longitude,
            event,
        }
    }
}

/// Number of points ring `ring` can hold: `ceil(3 * 1.25^ring)`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn ring_capacity(ring: u32) -> usize {
    (3.0 * 1.25_f64.powi(i32::try_from(ring).unwrap_or(i32::MAX))).ceil() as usize
}

/// Redistributes exactly-coincident events onto concentric rings.
///
/// Events are grouped by exact coordinate. Groups of size 1, and all
/// groups when `zoom` is below the fan activation threshold, pass through
/// unmodified. Larger groups fill rings outward from the shared
/// coordinate, points equally spaced within each ring starting from a
/// per-group random angular offset. Longitude displacement is corrected
/// for latitude compression so rings appear circular on screen.
///
/// Guarantees: output length equals input length; within a group no two
/// points share a (ring, slot) position; all displaced points lie within
/// the outermost ring radius of the shared coordinate. With a fixed
/// `seed` the layout is reproducible for identical input.
#[must_use]
pub fn fan_out(
    events: Vec<Event>,
    zoom: f64,
    config: &FanConfig,
    seed: Option<u64>,
) -> Vec<FannedPoint> {
    let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);

    // Group by exact coordinate bits; BTreeMap keeps group order (and
    // therefore RNG consumption order) deterministic.
    let mut groups: BTreeMap<(u64, u64), Vec<Event>> = BTreeMap::new();
    let total = events.len();
    for event in events {
        groups
            .entry((event.latitude.to_bits(), event.longitude.to_bits()))
            .or_default()
            .push(event);
    }

    let mut points = Vec::with_capacity(total);

    for group in groups.into_values() {
        if group.len() == 1 || zoom < config.zoom_threshold {
            points.extend(group.into_iter().map(FannedPoint::passthrough));
            continue;
        }

        let offset = rng.random_range(0.0..TAU);
        fan_group(group, offset, config, &mut points);
    }

    points
}

/// Places one coincident group onto rings, appending to `out`.
fn fan_group(group: Vec<Event>, offset: f64, config: &FanConfig, out: &mut Vec<FannedPoint>) {
    let center_lat = group[0].latitude;
    let center_lon = group[0].longitude;
    let total = group.len();

    let mut events = group.into_iter();
    let mut placed = 0;
    let mut ring = 0u32;

    while placed < total {
        let on_ring = ring_capacity(ring).min(total - placed);
        let radius = config.base_radius_deg + f64::from(ring) * config.ring_step_deg;

        for (slot, event) in events.by_ref().take(on_ring).enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let angle = offset + TAU * slot as f64 / on_ring as f64;
            let (latitude, longitude) = ring_position(center_lat, center_lon, radius, angle);

            out.push(FannedPoint {
                latitude,
                longitude,
                event,
            });
        }

        placed += on_ring;
        ring += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, lat: f64, lon: f64) -> Event {
        Event::new(id.to_string(), 2001, lat, lon)
    }

    fn coincident(n: usize, lat: f64, lon: f64) -> Vec<Event> {
        (0..n).map(|i| event(&i.to_string(), lat, lon)).collect()
    }

    #[test]
    fn ring_capacities_grow() {
        assert_eq!(ring_capacity(0), 3);
        assert_eq!(ring_capacity(1), 4);
        assert_eq!(ring_capacity(2), 5);
        assert_eq!(ring_capacity(3), 6);
        assert_eq!(ring_capacity(4), 8);
    }

    #[test]
    fn singleton_groups_pass_through_unchanged() {
        let events = vec![event("a", 51.5, -0.1), event("b", 40.7, -74.0)];

        let points = fan_out(events.clone(), 8.0, &FanConfig::default(), Some(1));

        assert_eq!(points.len(), 2);
        for point in &points {
            assert!((point.latitude - point.event.latitude).abs() < f64::EPSILON);
            assert!((point.longitude - point.event.longitude).abs() < f64::EPSILON);
        }
        let ids: Vec<&str> = points.iter().map(|p| p.event.id.as_str()).collect();
        assert!(ids.contains(&"a") && ids.contains(&"b"));
    }

    #[test]
    fn below_threshold_groups_pass_through() {
        let events = coincident(5, 51.5, -0.1);

        let points = fan_out(events, 3.0, &FanConfig::default(), Some(1));

        assert_eq!(points.len(), 5);
        for point in &points {
            assert!((point.latitude - 51.5).abs() < f64::EPSILON);
            assert!((point.longitude - -0.1).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn coincident_group_fans_onto_rings() {
        let config = FanConfig::default();
        let points = fan_out(coincident(5, 51.5, -0.1), 8.0, &config, Some(42));

        assert_eq!(points.len(), 5);

        // No two points share a position.
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                let distinct = (a.latitude - b.latitude).abs() > 1e-12
                    || (a.longitude - b.longitude).abs() > 1e-12;
                assert!(distinct, "points {} and {} overlap", a.event.id, b.event.id);
            }
        }

        // 5 points fill ring 0 (3) and part of ring 1, so every point
        // lies within the ring-1 radius of the origin.
        let max_radius = config.base_radius_deg + config.ring_step_deg;
        let cos_lat = 51.5_f64.to_radians().cos();
        for point in &points {
            let dlat = point.latitude - 51.5;
            let dlon = (point.longitude + 0.1) * cos_lat;
            let distance = dlat.hypot(dlon);
            assert!(
                distance <= max_radius + 1e-9,
                "point {} at distance {distance}",
                point.event.id
            );
        }
    }

    #[test]
    fn output_length_matches_input_length() {
        let config = FanConfig::default();
        let mut events = coincident(17, 10.0, 20.0);
        events.extend(coincident(4, -33.8, 151.2));
        events.push(event("solo", 48.8, 2.3));

        let points = fan_out(events, 9.0, &config, Some(7));

        assert_eq!(points.len(), 22);

        // 17 points fill rings 0..=3 (capacities 3, 4, 5, 6), so the
        // whole group stays within the ring-3 radius of its origin.
        let max_radius = config.base_radius_deg + 3.0 * config.ring_step_deg;
        let cos_lat = 10.0_f64.to_radians().cos();
        for point in points
            .iter()
            .filter(|p| (p.event.latitude - 10.0).abs() < f64::EPSILON)
        {
            let dlat = point.latitude - 10.0;
            let dlon = (point.longitude - 20.0) * cos_lat;
            let distance = dlat.hypot(dlon);
            assert!(
                distance <= max_radius + 1e-9,
                "point {} at distance {distance}",
                point.event.id
            );
        }
    }

    #[test]
    fn ids_and_attributes_survive_displacement() {
        let events = vec![
            event("a", 51.5, -0.1).with_attribute("summary", "first"),
            event("b", 51.5, -0.1).with_attribute("summary", "second"),
        ];

        let points = fan_out(events, 8.0, &FanConfig::default(), Some(3));

        let a = points.iter().find(|p| p.event.id == "a").unwrap();
        assert_eq!(a.event.attribute("summary"), Some("first"));
        // The original record keeps its recorded coordinate.
        assert!((a.event.latitude - 51.5).abs() < f64::EPSILON);
        assert!((a.latitude - 51.5).abs() > 0.0);
    }

    #[test]
    fn seeded_layout_is_reproducible() {
        let events = coincident(9, 51.5, -0.1);

        let first = fan_out(events.clone(), 8.0, &FanConfig::default(), Some(99));
        let second = fan_out(events, 8.0, &FanConfig::default(), Some(99));

        assert_eq!(first, second);
    }

    #[test]
    fn different_groups_draw_different_offsets() {
        let mut events = coincident(3, 10.0, 10.0);
        events.extend(coincident(3, 20.0, 20.0));

        let points = fan_out(events, 8.0, &FanConfig::default(), Some(5));

        let angle_of = |p: &FannedPoint, lat: f64, lon: f64| {
            let cos_lat = lat.to_radians().cos();
            ((p.latitude - lat).atan2((p.longitude - lon) * cos_lat)).rem_euclid(TAU)
        };

        let first: Vec<f64> = points
            .iter()
            .filter(|p| (p.event.latitude - 10.0).abs() < f64::EPSILON)
            .map(|p| angle_of(p, 10.0, 10.0))
            .collect();
        let second: Vec<f64> = points
            .iter()
            .filter(|p| (p.event.latitude - 20.0).abs() < f64::EPSILON)
            .map(|p| angle_of(p, 20.0, 20.0))
            .collect();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 3);
        // Independent draws: the two rings should not start at the same
        // angle for any sane seed.
        assert!((first[0] - second[0]).abs() > 1e-6);
    }
}
