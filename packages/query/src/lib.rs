#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Viewport query orchestration for the event map.
//!
//! Composes the store adapter, aggregation selector, clustering engine,
//! and fan-out engine into a single request/response call: a viewport
//! plus filter comes in, a renderable [`RenderSet`] goes out. Each query
//! is idempotent and side-effect-free (modulo the fan-out's randomized
//! angular offset when no seed is supplied), so callers that fire
//! overlapping queries during rapid panning can simply keep the latest
//! result.

use event_map_cluster::{ClusterCell, cluster_events, should_cluster};
use event_map_database::{EventStore, StoreError};
use event_map_database_models::{Filter, Projection, Viewport};
use event_map_event_models::Event;
use event_map_fanout::{FanConfig, FannedPoint, fan_out};
use event_map_geometry::PixelScale;
use serde::{Deserialize, Serialize};

/// Errors from running a map query.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    /// The store adapter failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Recognized engine configuration, with the documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Zoom level at or below which results are clustered into density
    /// cells instead of rendered individually.
    pub cluster_zoom_threshold: f64,
    /// Base on-screen point diameter in pixels, consumed by the renderer
    /// via [`event_map_geometry::point_diameter`].
    pub point_diameter_px: f64,
    /// Fan-out ring layout.
    pub fan: FanConfig,
    /// Pixel radius reference scale.
    pub scale: PixelScale,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            cluster_zoom_threshold: 6.0,
            point_diameter_px: 12.0,
            fan: FanConfig::default(),
            scale: PixelScale::default(),
        }
    }
}

/// The renderable result of one map query.
///
/// Either aggregated density cells (low zoom) or individual fanned
/// points (high zoom). Owned by the caller; nothing survives across
/// queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "items", rename_all = "snake_case")]
pub enum RenderSet {
    /// Density cells, one per occupied cluster cell.
    Clustered(Vec<ClusterCell>),
    /// Individual points, coincident groups fanned onto rings.
    Itemized(Vec<FannedPoint>),
}

impl RenderSet {
    /// Number of renderable items (cells or points).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Clustered(cells) => cells.len(),
            Self::Itemized(points) => points.len(),
        }
    }

    /// Whether the result set holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short mode label for logging.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::Clustered(_) => "clustered",
            Self::Itemized(_) => "itemized",
        }
    }
}

/// One query engine over one event store.
pub struct QueryEngine {
    store: EventStore,
    config: MapConfig,
}

impl QueryEngine {
    /// Creates an engine over the given store and configuration.
    #[must_use]
    pub const fn new(store: EventStore, config: MapConfig) -> Self {
        Self { store, config }
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    /// The underlying event store.
    #[must_use]
    pub const fn store(&self) -> &EventStore {
        &self.store
    }

    /// Runs one viewport query. Fan-out angular offsets are drawn from
    /// OS randomness; use [`QueryEngine::run_seeded`] for reproducible
    /// layout.
    ///
    /// A malformed viewport (south above north, west east of east,
    /// coordinates out of range, negative zoom) is logged and yields an
    /// empty result set of the mode the zoom selects — never an error.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the store adapter fails.
    pub async fn run(&self, viewport: &Viewport, filter: &Filter) -> Result<RenderSet, QueryError> {
        self.execute(viewport, filter, None).await
    }

    /// Like [`QueryEngine::run`], but with a fixed fan-out seed so
    /// identical queries produce identical layouts.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the store adapter fails.
    pub async fn run_seeded(
        &self,
        viewport: &Viewport,
        filter: &Filter,
        seed: u64,
    ) -> Result<RenderSet, QueryError> {
        self.execute(viewport, filter, Some(seed)).await
    }

    /// Fetches the full record for one event, for tooltip and detail
    /// presentation. Returns `Ok(None)` when the id is unknown.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError`] if the store adapter fails.
    pub async fn lookup(&self, id: &str) -> Result<Option<Event>, QueryError> {
        Ok(self.store.fetch_by_id(id).await?)
    }

    async fn execute(
        &self,
        viewport: &Viewport,
        filter: &Filter,
        seed: Option<u64>,
    ) -> Result<RenderSet, QueryError> {
        let clustered = should_cluster(viewport.zoom, self.config.cluster_zoom_threshold);

        if !viewport.is_valid() {
            log::warn!("Rejecting malformed viewport: {viewport:?}");
            return Ok(if clustered {
                RenderSet::Clustered(Vec::new())
            } else {
                RenderSet::Itemized(Vec::new())
            });
        }

        let events = self
            .store
            .fetch(viewport, filter, Projection::Minimal)
            .await?;

        let result = if clustered {
            RenderSet::Clustered(cluster_events(
                &events,
                viewport.zoom,
                viewport.bbox.center_latitude(),
                &self.config.scale,
            ))
        } else {
            RenderSet::Itemized(fan_out(events, viewport.zoom, &self.config.fan, seed))
        };

        log::debug!(
            "Query at zoom {} produced {} {} items",
            viewport.zoom,
            result.len(),
            result.mode()
        );

        Ok(result)
    }
}
