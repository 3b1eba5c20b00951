#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Density cell clustering for the event map engine.
//!
//! At low zoom a viewport covers far too much area to usefully render
//! tens of thousands of individual points, so matching events are
//! aggregated into fixed-size geographic cells instead. The cell size is
//! derived once per query from the zoom level and the viewport's vertical
//! center latitude, keeping cell boundaries consistent across the whole
//! result set. Each event snaps independently per axis to the nearest
//! cell multiple; one [`ClusterCell`] is emitted per occupied cell.

use std::collections::BTreeMap;

use event_map_event_models::Event;
use event_map_geometry::{PixelScale, cell_size_degrees, pixel_radius};
use serde::{Deserialize, Serialize};

/// One occupied density cell: snapped cell center plus the number of
/// events that fell into it. Created fresh per query, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterCell {
    /// Snapped latitude of the cell center.
    pub latitude: f64,
    /// Snapped longitude of the cell center.
    pub longitude: f64,
    /// Number of events mapped to this cell.
    pub count: u64,
}

/// Whether the given zoom level should render aggregated density cells
/// instead of individual points.
///
/// Clusters at or below the threshold, itemizes above it. The threshold
/// is configuration (default 6.0), not derived data.
#[must_use]
pub fn should_cluster(zoom: f64, threshold: f64) -> bool {
    zoom <= threshold
}

/// Aggregates events into fixed-size geographic cells.
///
/// The cell size is computed once from `zoom` and `center_latitude` (the
/// viewport's vertical center), then each event's latitude and longitude
/// snap independently to the nearest cell multiple. Grouping is exact:
/// the cell key is the pair of integer cell indices, never a float.
///
/// Guarantees: every input event maps to exactly one cell, so the cell
/// counts sum to the input length; output order and boundaries are
/// deterministic for identical inputs; a single pass, O(n). An empty
/// input yields an empty output.
#[must_use]
pub fn cluster_events(
    events: &[Event],
    zoom: f64,
    center_latitude: f64,
    scale: &PixelScale,
) -> Vec<ClusterCell> {
    if events.is_empty() {
        return Vec::new();
    }

    let radius_px = pixel_radius(zoom, scale);
    let (cell_lat, cell_lon) = cell_size_degrees(radius_px, zoom, center_latitude);

    let mut cells: BTreeMap<(i64, i64), u64> = BTreeMap::new();

    for event in events {
        let key = (
            snap_index(event.latitude, cell_lat),
            snap_index(event.longitude, cell_lon),
        );
        *cells.entry(key).or_insert(0) += 1;
    }

    cells
        .into_iter()
        .map(|((lat_idx, lon_idx), count)| {
            #[allow(clippy::cast_precision_loss)]
            let latitude = lat_idx as f64 * cell_lat;
            #[allow(clippy::cast_precision_loss)]
            let longitude = lon_idx as f64 * cell_lon;
            ClusterCell {
                latitude,
                longitude,
                count,
            }
        })
        .collect()
}

/// Index of the nearest cell multiple: `round(value / cell_size)`.
#[allow(clippy::cast_possible_truncation)]
fn snap_index(value: f64, cell_size: f64) -> i64 {
    (value / cell_size).round() as i64
}
