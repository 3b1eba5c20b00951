//! Database connection utilities.

use std::path::Path;

use switchy_database::Database;
use switchy_database_connection::init_sqlite_rusqlite;

use crate::StoreError;

/// Opens the `SQLite` file at `path`.
///
/// The events database is pre-built and read-only; no migrations run
/// here.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] if the file cannot be opened.
pub fn open_sqlite(path: &Path) -> Result<Box<dyn Database>, StoreError> {
    init_sqlite_rusqlite(Some(path)).map_err(|e| StoreError::Unavailable {
        message: format!("failed to open {}: {e}", path.display()),
    })
}
