//! Query functions for the read-only `events` table.
//!
//! All SQL lives here. Queries are assembled dynamically the same way
//! regardless of backend: `$N` placeholders with [`DatabaseValue`]
//! parameters, rows decoded via `moosicbox_json_utils`.

use std::fmt::Write as _;

use event_map_database_models::{Filter, Projection, Viewport};
use event_map_event_models::Event;
use moosicbox_json_utils::database::ToValue as _;
use switchy_database::{Database, DatabaseValue};

use crate::StoreError;

/// Descriptive columns materialized by [`Projection::Full`] in addition
/// to the core four. Carried opaquely on [`Event::attributes`].
const DESCRIPTIVE_COLUMNS: &[&str] = &["country_txt", "summary"];

/// Column searched by the free-text filter.
const SEARCH_COLUMN: &str = "summary";

/// Verifies the `events` table exists in the attached database.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] if the table is missing.
pub async fn ensure_events_table(db: &dyn Database) -> Result<(), StoreError> {
    let rows = db
        .query_raw_params(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = 'events'",
            &[],
        )
        .await?;

    if rows.is_empty() {
        return Err(StoreError::Unavailable {
            message: "no 'events' table in the attached database".to_string(),
        });
    }

    Ok(())
}

/// Queries events within a viewport bounding box with year-range and
/// free-text filters.
///
/// Bounds are inclusive on all four edges and on both ends of the year
/// range. Text matches are case-insensitive substring matches with LIKE
/// metacharacters escaped so they match literally. Rows with missing
/// coordinates never match. Results are ordered `iyear DESC, eventid`.
///
/// # Errors
///
/// Returns [`StoreError`] if the database operation or row decode fails.
pub async fn fetch_events(
    db: &dyn Database,
    viewport: &Viewport,
    filter: &Filter,
    projection: Projection,
) -> Result<Vec<Event>, StoreError> {
    let mut sql = String::from("SELECT eventid, iyear, latitude, longitude");
    if projection == Projection::Full {
        for column in DESCRIPTIVE_COLUMNS {
            write!(sql, ", {column}").unwrap();
        }
    }

    let bbox = &viewport.bbox;
    sql.push_str(
        " FROM events
         WHERE latitude BETWEEN $1 AND $2
           AND longitude BETWEEN $3 AND $4",
    );

    let mut params: Vec<DatabaseValue> = vec![
        DatabaseValue::Real64(bbox.south),
        DatabaseValue::Real64(bbox.north),
        DatabaseValue::Real64(bbox.west),
        DatabaseValue::Real64(bbox.east),
    ];
    if let Some(years) = &filter.years {
        write!(
            sql,
            " AND iyear BETWEEN ${} AND ${}",
            params.len() + 1,
            params.len() + 2
        )
        .unwrap();
        params.push(DatabaseValue::Int32(years.start));
        params.push(DatabaseValue::Int32(years.end));
    }

    if let Some(text) = filter.search_text() {
        write!(
            sql,
            " AND lower({SEARCH_COLUMN}) LIKE ${} ESCAPE '\\'",
            params.len() + 1
        )
        .unwrap();
        params.push(DatabaseValue::String(format!(
            "%{}%",
            escape_like(&text.to_lowercase())
        )));
    }

    sql.push_str(" ORDER BY iyear DESC, eventid");

    let rows = db.query_raw_params(&sql, &params).await?;

    log::debug!("fetch_events matched {} rows", rows.len());

    rows.iter().map(|row| decode_event(row, projection)).collect()
}

/// Looks up a single event by identifier, full projection.
///
/// The id is bound as text; `SQLite` column affinity coerces it when the
/// store carries a numeric `eventid` column, so the primary-key index is
/// used either way.
///
/// # Errors
///
/// Returns [`StoreError`] if the database operation or row decode fails.
pub async fn fetch_event_by_id(db: &dyn Database, id: &str) -> Result<Option<Event>, StoreError> {
    let mut sql = String::from("SELECT eventid, iyear, latitude, longitude");
    for column in DESCRIPTIVE_COLUMNS {
        write!(sql, ", {column}").unwrap();
    }
    sql.push_str(" FROM events WHERE eventid = $1 LIMIT 1");

    let rows = db
        .query_raw_params(&sql, &[DatabaseValue::String(id.to_string())])
        .await?;

    rows.first()
        .map(|row| decode_event(row, Projection::Full))
        .transpose()
}

/// Returns the inclusive `(min, max)` year range of the table, or `None`
/// when the table is empty.
///
/// # Errors
///
/// Returns [`StoreError`] if the database operation fails.
pub async fn year_range(db: &dyn Database) -> Result<Option<(i32, i32)>, StoreError> {
    let rows = db
        .query_raw_params(
            "SELECT MIN(iyear) as min_year, MAX(iyear) as max_year FROM events",
            &[],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Ok(None);
    };

    let min_year: Option<i32> = row.to_value("min_year").unwrap_or(None);
    let max_year: Option<i32> = row.to_value("max_year").unwrap_or(None);

    Ok(min_year.zip(max_year))
}

/// Returns the total number of events in the table.
///
/// # Errors
///
/// Returns [`StoreError`] if the database operation fails.
pub async fn count_events(db: &dyn Database) -> Result<u64, StoreError> {
    let rows = db
        .query_raw_params("SELECT COUNT(*) as count FROM events", &[])
        .await?;

    let count: i64 = rows.first().map_or(0, |r| r.to_value("count").unwrap_or(0));

    #[allow(clippy::cast_sign_loss)]
    Ok(count as u64)
}

/// Escapes LIKE metacharacters (`%`, `_`, and the escape character
/// itself) so the filter text matches literally, not as wildcards.
#[must_use]
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Decodes one row into an [`Event`].
fn decode_event(
    row: &switchy_database::Row,
    projection: Projection,
) -> Result<Event, StoreError> {
    // eventid is TEXT in our exports but INTEGER in some upstream ones;
    // accept both.
    let id: String = match row.to_value("eventid") {
        Ok(id) => id,
        Err(_) => {
            let numeric: i64 = row.to_value("eventid").map_err(|e| StoreError::Conversion {
                message: format!("Failed to parse eventid: {e}"),
            })?;
            numeric.to_string()
        }
    };

    let year: i32 = row.to_value("iyear").map_err(|e| StoreError::Conversion {
        message: format!("Failed to parse iyear for event {id}: {e}"),
    })?;
    let latitude: f64 = row.to_value("latitude").map_err(|e| StoreError::Conversion {
        message: format!("Failed to parse latitude for event {id}: {e}"),
    })?;
    let longitude: f64 = row
        .to_value("longitude")
        .map_err(|e| StoreError::Conversion {
            message: format!("Failed to parse longitude for event {id}: {e}"),
        })?;

    let mut event = Event::new(id, year, latitude, longitude);

    if projection == Projection::Full {
        for column in DESCRIPTIVE_COLUMNS {
            let value: Option<String> = row.to_value(column).unwrap_or(None);
            if let Some(value) = value {
                event.attributes.insert((*column).to_string(), value);
            }
        }
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_passes_plain_text() {
        assert_eq!(escape_like("bomb"), "bomb");
        assert_eq!(escape_like(""), "");
    }

    #[test]
    fn escape_like_escapes_metacharacters() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("%_\\"), "\\%\\_\\\\");
    }
}
