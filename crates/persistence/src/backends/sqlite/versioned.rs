//! VersionedStore implementation for SQLite.

use async_trait::async_trait;
use rusqlite::params;
use serde_json::Value;

use crate::core::VersionedStore;
use crate::error::{RecordError, StoreError, StoreResult};
use crate::tenant::{Operation, TenantContext};
use crate::types::VersionEntry;

use super::{format_timestamp, internal_error, load_record, logged, parse_timestamp, SqliteBackend};

impl SqliteBackend {
    fn record_version_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        changes: Value,
    ) -> StoreResult<VersionEntry> {
        tenant.check_permission(Operation::History, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        // Snapshots may be taken of soft-deleted records too.
        let record = load_record(&conn, tenant, collection, id)?.ok_or_else(|| {
            StoreError::Record(RecordError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
        })?;

        let now = super::store_now();
        let version_data = record.document().clone();
        let data_json = serde_json::to_string(&version_data)?;
        let changes_json = serde_json::to_string(&changes)?;

        conn.execute(
            "INSERT INTO record_versions (tenant_id, collection, entity_id, version_data, changes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                tenant.tenant_id().as_str(),
                collection,
                id,
                data_json,
                changes_json,
                format_timestamp(now)
            ],
        )
        .map_err(|e| internal_error(format!("failed to insert version: {}", e)))?;

        Ok(VersionEntry {
            collection: collection.to_string(),
            entity_id: id.to_string(),
            version_data,
            changes,
            created_at: now,
        })
    }

    fn version_history_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<Vec<VersionEntry>> {
        tenant.check_permission(Operation::History, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let mut stmt = conn
            .prepare(
                "SELECT version_data, changes, created_at FROM record_versions
                 WHERE tenant_id = ?1 AND collection = ?2 AND entity_id = ?3
                 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(|e| internal_error(format!("failed to prepare history query: {}", e)))?;

        let rows = stmt
            .query_map(
                params![tenant.tenant_id().as_str(), collection, id],
                |row| {
                    let version_data: String = row.get(0)?;
                    let changes: String = row.get(1)?;
                    let created_at: String = row.get(2)?;
                    Ok((version_data, changes, created_at))
                },
            )
            .map_err(|e| internal_error(format!("failed to query history: {}", e)))?;

        let mut entries = Vec::new();
        for row in rows {
            let (version_data, changes, created_at) =
                row.map_err(|e| internal_error(format!("failed to read history row: {}", e)))?;

            entries.push(VersionEntry {
                collection: collection.to_string(),
                entity_id: id.to_string(),
                version_data: serde_json::from_str(&version_data)?,
                changes: serde_json::from_str(&changes)?,
                created_at: parse_timestamp(&created_at)?,
            });
        }

        Ok(entries)
    }
}

#[async_trait]
impl VersionedStore for SqliteBackend {
    async fn record_version(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        changes: Value,
    ) -> StoreResult<VersionEntry> {
        logged(
            collection,
            "record_version",
            self.record_version_sync(tenant, collection, id, changes),
        )
    }

    async fn version_history(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<Vec<VersionEntry>> {
        logged(
            collection,
            "version_history",
            self.version_history_sync(tenant, collection, id),
        )
    }
}
