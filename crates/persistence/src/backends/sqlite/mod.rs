//! SQLite backend.
//!
//! Records are stored as JSON text in a single `records` table keyed by
//! (tenant, collection, id); version snapshots live in `record_versions`.
//! Dynamic filters and search predicates are expressed through SQLite's
//! `json_extract`/`json_each` functions against the document column.

mod analytics;
mod backend;
mod schema;
mod search;
mod store;
mod versioned;

pub use backend::{SqliteBackend, SqliteBackendConfig};

use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use crate::error::{BackendError, StoreError, StoreResult};
use crate::tenant::TenantContext;
use crate::types::StoredRecord;

pub(crate) fn internal_error(message: String) -> StoreError {
    StoreError::Backend(BackendError::Internal {
        backend_name: "sqlite".to_string(),
        message,
        source: None,
    })
}

pub(crate) fn serialization_error(message: String) -> StoreError {
    StoreError::Backend(BackendError::SerializationError { message })
}

/// Formats a timestamp for storage.
///
/// Fixed-width microsecond precision with a `Z` suffix, so stored values
/// compare correctly as strings.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time truncated to the precision the store persists.
///
/// Keeps in-memory records byte-identical to what a re-fetch would parse.
pub(crate) fn store_now() -> DateTime<Utc> {
    let now = Utc::now();
    now.with_nanosecond(now.nanosecond() / 1000 * 1000)
        .unwrap_or(now)
}

pub(crate) fn parse_timestamp(raw: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| internal_error(format!("failed to parse timestamp '{}': {}", raw, e)))
}

/// Loads a single record row regardless of its deletion state.
pub(crate) fn load_record(
    conn: &Connection,
    tenant: &TenantContext,
    collection: &str,
    id: &str,
) -> StoreResult<Option<StoredRecord>> {
    let row = conn
        .query_row(
            "SELECT data, created_at, updated_at, deleted_at
             FROM records
             WHERE tenant_id = ?1 AND collection = ?2 AND id = ?3",
            params![tenant.tenant_id().as_str(), collection, id],
            |row| {
                let data: String = row.get(0)?;
                let created_at: String = row.get(1)?;
                let updated_at: String = row.get(2)?;
                let deleted_at: Option<String> = row.get(3)?;
                Ok((data, created_at, updated_at, deleted_at))
            },
        )
        .optional()
        .map_err(|e| internal_error(format!("failed to read record: {}", e)))?;

    let Some((data, created_at, updated_at, deleted_at)) = row else {
        return Ok(None);
    };

    let document: Value = serde_json::from_str(&data)
        .map_err(|e| serialization_error(format!("failed to deserialize record: {}", e)))?;
    let created_at = parse_timestamp(&created_at)?;
    let updated_at = parse_timestamp(&updated_at)?;
    let deleted_at = deleted_at.as_deref().map(parse_timestamp).transpose()?;

    Ok(Some(StoredRecord::from_storage(
        collection,
        id,
        tenant.tenant_id().clone(),
        document,
        created_at,
        updated_at,
        deleted_at,
    )))
}

/// Logs a failed operation with its collection and name, then passes the
/// error through unchanged.
pub(crate) fn logged<T>(collection: &str, operation: &str, result: StoreResult<T>) -> StoreResult<T> {
    if let Err(e) = &result {
        tracing::error!(collection, operation, error = %e, "record store operation failed");
    }
    result
}
