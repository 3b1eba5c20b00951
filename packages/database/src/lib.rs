#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Read-only event store adapter for the event map.
//!
//! Wraps an explicitly injected `switchy_database` handle over the
//! pre-built `events` `SQLite` table (columns `eventid`, `iyear`,
//! `latitude`, `longitude` plus descriptive text columns such as
//! `country_txt` and `summary`). The adapter issues bounding-box +
//! year-range + substring queries and point lookups; it never writes,
//! and it owns no clustering logic.
//!
//! The table is produced out of band (the dataset export pipeline);
//! this crate does not load, parse, or migrate it.

pub mod db;
pub mod queries;

use std::path::Path;

use event_map_database_models::{Filter, Projection, Viewport};
use event_map_event_models::Event;
use switchy_database::Database;

/// Errors from event store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing table is missing or the store has not been
    /// initialized. Callers should surface this as a loading state, not
    /// retry synchronously.
    #[error("Event store unavailable: {message}")]
    Unavailable {
        /// Description of what is missing.
        message: String,
    },

    /// Database query error.
    #[error("Database error: {0}")]
    Database(#[from] switchy_database::DatabaseError),

    /// Row decode error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}

/// Handle to the read-only events table.
///
/// Owns its database handle explicitly — there is no process-wide
/// singleton. Construct with [`EventStore::open`] for a `SQLite` file, or
/// [`EventStore::new`] to wrap an already-opened handle (tests inject an
/// in-memory database this way).
pub struct EventStore {
    db: Box<dyn Database>,
}

impl EventStore {
    /// Wraps an already-opened database handle without checking the
    /// schema. Call [`EventStore::ensure_ready`] before querying if the
    /// handle's provenance is uncertain.
    #[must_use]
    pub fn new(db: Box<dyn Database>) -> Self {
        Self { db }
    }

    /// Opens the events `SQLite` file and verifies the `events` table
    /// exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the file cannot be opened
    /// or lacks an `events` table.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let store = Self::new(db::open_sqlite(path)?);
        store.ensure_ready().await?;

        let count = store.count().await?;
        log::info!("Opened event store {} ({count} events)", path.display());

        Ok(store)
    }

    /// Verifies that the backing `events` table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if it does not.
    pub async fn ensure_ready(&self) -> Result<(), StoreError> {
        queries::ensure_events_table(self.db.as_ref()).await
    }

    /// Fetches events matching the viewport bounding box (inclusive) and
    /// filter, with the requested projection. Results are ordered newest
    /// year first, then by id, for downstream tie-break stability.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query or row decode fails.
    pub async fn fetch(
        &self,
        viewport: &Viewport,
        filter: &Filter,
        projection: Projection,
    ) -> Result<Vec<Event>, StoreError> {
        queries::fetch_events(self.db.as_ref(), viewport, filter, projection).await
    }

    /// Looks up a single event by its identifier, full projection.
    /// Returns `Ok(None)` when no such event exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query or row decode fails.
    pub async fn fetch_by_id(&self, id: &str) -> Result<Option<Event>, StoreError> {
        queries::fetch_event_by_id(self.db.as_ref(), id).await
    }

    /// The dataset's inclusive `(min, max)` year range, or `None` for an
    /// empty table. Used as the default filter bounds.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn year_range(&self) -> Result<Option<(i32, i32)>, StoreError> {
        queries::year_range(self.db.as_ref()).await
    }

    /// Total number of events in the table.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the query fails.
    pub async fn count(&self) -> Result<u64, StoreError> {
        queries::count_events(self.db.as_ref()).await
    }
}
