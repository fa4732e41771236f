//! SQLite schema definitions and migrations.

use rusqlite::Connection;

use crate::error::{BackendError, StoreError, StoreResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 2;

fn migration_error(message: String) -> StoreError {
    StoreError::Backend(BackendError::MigrationError { message })
}

/// Initialize the database schema.
pub fn initialize_schema(conn: &Connection) -> StoreResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        set_schema_version(conn, 1)?;
        migrate_schema(conn, 1)?;
    } else if current_version < SCHEMA_VERSION {
        migrate_schema(conn, current_version)?;
    }

    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StoreResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| migration_error(format!("failed to create schema_version table: {}", e)))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Set the schema version.
fn set_schema_version(conn: &Connection, version: i32) -> StoreResult<()> {
    conn.execute("DELETE FROM schema_version", [])
        .map_err(|e| migration_error(format!("failed to clear schema_version: {}", e)))?;

    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )
    .map_err(|e| migration_error(format!("failed to set schema_version: {}", e)))?;

    Ok(())
}

/// Create the initial schema (version 1).
fn create_schema_v1(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS records (
            tenant_id TEXT NOT NULL,
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            PRIMARY KEY (tenant_id, collection, id)
        )",
        [],
    )
    .map_err(|e| migration_error(format!("failed to create records table: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS record_versions (
            tenant_id TEXT NOT NULL,
            collection TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            version_data TEXT NOT NULL,
            changes TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    )
    .map_err(|e| migration_error(format!("failed to create record_versions table: {}", e)))?;

    Ok(())
}

/// Run migrations from the given version up to [`SCHEMA_VERSION`].
fn migrate_schema(conn: &Connection, from_version: i32) -> StoreResult<()> {
    let mut version = from_version;

    while version < SCHEMA_VERSION {
        match version {
            1 => migrate_v1_to_v2(conn)?,
            _ => {
                return Err(migration_error(format!(
                    "no migration path from schema version {}",
                    version
                )));
            }
        }
        version += 1;
        set_schema_version(conn, version)?;
    }

    Ok(())
}

/// v2: indexes for listing and history queries.
fn migrate_v1_to_v2(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_records_created
         ON records (tenant_id, collection, created_at)",
        [],
    )
    .map_err(|e| migration_error(format!("failed to create records index: {}", e)))?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_versions_entity
         ON record_versions (tenant_id, collection, entity_id, created_at)",
        [],
    )
    .map_err(|e| migration_error(format!("failed to create versions index: {}", e)))?;

    Ok(())
}
