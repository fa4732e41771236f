//! RecordStore implementation for SQLite.

use async_trait::async_trait;
use rusqlite::{params, OptionalExtension};
use serde_json::Value;

use crate::core::RecordStore;
use crate::error::{QueryError, RecordError, StoreError, StoreResult};
use crate::tenant::{Operation, TenantContext};
use crate::types::{RecordPatch, StoredRecord};

use super::{format_timestamp, internal_error, load_record, logged, SqliteBackend};

/// Ensures the value is a JSON object and returns a mutable map handle.
fn require_object<'a>(
    value: &'a mut Value,
    what: &str,
) -> StoreResult<&'a mut serde_json::Map<String, Value>> {
    value.as_object_mut().ok_or_else(|| {
        StoreError::Query(QueryError::InvalidDocument {
            message: format!("{} must be a JSON object", what),
        })
    })
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::Record(RecordError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    })
}

/// Merges the patch's top-level fields into the document. The record ID is
/// pinned and cannot be rewritten through a patch.
fn merge_patch(
    document: &mut serde_json::Map<String, Value>,
    patch: serde_json::Map<String, Value>,
) {
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        document.insert(key, value);
    }
}

impl SqliteBackend {
    fn create_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        mut document: Value,
    ) -> StoreResult<StoredRecord> {
        tenant.check_permission(Operation::Create, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;
        let tenant_id = tenant.tenant_id().as_str();

        let obj = require_object(&mut document, "document")?;
        let id = obj
            .get("id")
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        obj.insert("id".to_string(), Value::String(id.clone()));

        let exists = conn
            .query_row(
                "SELECT 1 FROM records WHERE tenant_id = ?1 AND collection = ?2 AND id = ?3",
                params![tenant_id, collection, id],
                |_| Ok(()),
            )
            .optional()
            .map_err(|e| internal_error(format!("failed to check record existence: {}", e)))?
            .is_some();

        if exists {
            return Err(StoreError::Record(RecordError::AlreadyExists {
                collection: collection.to_string(),
                id,
            }));
        }

        let now = super::store_now();
        let ts = format_timestamp(now);
        let data = serde_json::to_string(&document)?;

        conn.execute(
            "INSERT INTO records (tenant_id, collection, id, data, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![tenant_id, collection, id, data, ts],
        )
        .map_err(|e| internal_error(format!("failed to insert record: {}", e)))?;

        Ok(StoredRecord::from_storage(
            collection,
            id,
            tenant.tenant_id().clone(),
            document,
            now,
            now,
            None,
        ))
    }

    fn get_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        tenant.check_permission(Operation::Read, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let record =
            load_record(&conn, tenant, collection, id)?.ok_or_else(|| not_found(collection, id))?;

        if let Some(deleted_at) = record.deleted_at() {
            return Err(StoreError::Record(RecordError::Gone {
                collection: collection.to_string(),
                id: id.to_string(),
                deleted_at: Some(deleted_at),
            }));
        }

        Ok(record)
    }

    fn get_any_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        tenant.check_permission(Operation::Read, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        load_record(&conn, tenant, collection, id)?.ok_or_else(|| not_found(collection, id))
    }

    fn update_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> StoreResult<StoredRecord> {
        tenant.check_permission(Operation::Update, collection)?;
        self.collection_schema(collection)?;
        let mut patch = patch;
        let patch_obj = std::mem::take(require_object(&mut patch, "patch")?);

        let conn = self.get_connection()?;
        let tenant_id = tenant.tenant_id().as_str();

        let mut record =
            load_record(&conn, tenant, collection, id)?.ok_or_else(|| not_found(collection, id))?;

        if let Some(deleted_at) = record.deleted_at() {
            return Err(StoreError::Record(RecordError::Gone {
                collection: collection.to_string(),
                id: id.to_string(),
                deleted_at: Some(deleted_at),
            }));
        }

        let doc_obj = require_object(record.document_mut(), "stored document")?;
        merge_patch(doc_obj, patch_obj);

        let now = super::store_now();
        let created_at = record.created_at();
        let data = serde_json::to_string(record.document())?;

        conn.execute(
            "UPDATE records SET data = ?1, updated_at = ?2
             WHERE tenant_id = ?3 AND collection = ?4 AND id = ?5",
            params![data, format_timestamp(now), tenant_id, collection, id],
        )
        .map_err(|e| internal_error(format!("failed to update record: {}", e)))?;

        Ok(StoredRecord::from_storage(
            collection,
            id,
            tenant.tenant_id().clone(),
            record.into_document(),
            created_at,
            now,
            None,
        ))
    }

    fn delete_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<()> {
        tenant.check_permission(Operation::Delete, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let rows = conn
            .execute(
                "DELETE FROM records WHERE tenant_id = ?1 AND collection = ?2 AND id = ?3",
                params![tenant.tenant_id().as_str(), collection, id],
            )
            .map_err(|e| internal_error(format!("failed to delete record: {}", e)))?;

        if rows == 0 {
            return Err(not_found(collection, id));
        }

        Ok(())
    }

    fn soft_delete_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        tenant.check_permission(Operation::Delete, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let record =
            load_record(&conn, tenant, collection, id)?.ok_or_else(|| not_found(collection, id))?;

        // Already deleted: keep the original timestamp.
        if record.is_deleted() {
            return Ok(record);
        }

        let now = super::store_now();
        conn.execute(
            "UPDATE records SET deleted_at = ?1
             WHERE tenant_id = ?2 AND collection = ?3 AND id = ?4",
            params![
                format_timestamp(now),
                tenant.tenant_id().as_str(),
                collection,
                id
            ],
        )
        .map_err(|e| internal_error(format!("failed to soft-delete record: {}", e)))?;

        Ok(StoredRecord::from_storage(
            collection,
            id,
            tenant.tenant_id().clone(),
            record.document().clone(),
            record.created_at(),
            record.updated_at(),
            Some(now),
        ))
    }

    fn restore_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        tenant.check_permission(Operation::Update, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let record =
            load_record(&conn, tenant, collection, id)?.ok_or_else(|| not_found(collection, id))?;

        if !record.is_deleted() {
            return Ok(record);
        }

        conn.execute(
            "UPDATE records SET deleted_at = NULL
             WHERE tenant_id = ?1 AND collection = ?2 AND id = ?3",
            params![tenant.tenant_id().as_str(), collection, id],
        )
        .map_err(|e| internal_error(format!("failed to restore record: {}", e)))?;

        Ok(StoredRecord::from_storage(
            collection,
            id,
            tenant.tenant_id().clone(),
            record.document().clone(),
            record.created_at(),
            record.updated_at(),
            None,
        ))
    }

    fn bulk_create_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        documents: Vec<Value>,
    ) -> StoreResult<Vec<StoredRecord>> {
        tenant.check_permission(Operation::Bulk, collection)?;
        self.collection_schema(collection)?;
        let mut conn = self.get_connection()?;
        let tenant_id = tenant.tenant_id().as_str().to_string();

        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("failed to begin transaction: {}", e)))?;

        let now = super::store_now();
        let ts = format_timestamp(now);
        let mut stored = Vec::with_capacity(documents.len());

        for mut document in documents {
            let obj = require_object(&mut document, "document")?;
            let id = obj
                .get("id")
                .and_then(|v| v.as_str())
                .map(String::from)
                .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
            obj.insert("id".to_string(), Value::String(id.clone()));

            let exists = tx
                .query_row(
                    "SELECT 1 FROM records WHERE tenant_id = ?1 AND collection = ?2 AND id = ?3",
                    params![tenant_id, collection, id],
                    |_| Ok(()),
                )
                .optional()
                .map_err(|e| internal_error(format!("failed to check record existence: {}", e)))?
                .is_some();

            if exists {
                return Err(StoreError::Record(RecordError::AlreadyExists {
                    collection: collection.to_string(),
                    id,
                }));
            }

            let data = serde_json::to_string(&document)?;
            tx.execute(
                "INSERT INTO records (tenant_id, collection, id, data, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![tenant_id, collection, id, data, ts],
            )
            .map_err(|e| internal_error(format!("failed to insert record: {}", e)))?;

            stored.push(StoredRecord::from_storage(
                collection,
                id,
                tenant.tenant_id().clone(),
                document,
                now,
                now,
                None,
            ));
        }

        tx.commit()
            .map_err(|e| internal_error(format!("failed to commit bulk create: {}", e)))?;

        Ok(stored)
    }

    fn bulk_update_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        updates: Vec<RecordPatch>,
    ) -> StoreResult<Vec<StoredRecord>> {
        tenant.check_permission(Operation::Bulk, collection)?;
        self.collection_schema(collection)?;
        let mut conn = self.get_connection()?;
        let tenant_id = tenant.tenant_id().as_str().to_string();

        // One transaction for the whole batch: either every update commits
        // or none does, and the returned error names the failing record.
        let tx = conn
            .transaction()
            .map_err(|e| internal_error(format!("failed to begin transaction: {}", e)))?;

        let now = super::store_now();
        let ts = format_timestamp(now);
        let mut stored = Vec::with_capacity(updates.len());

        for RecordPatch { id, patch } in updates {
            let mut patch = patch;
            let patch_obj = std::mem::take(require_object(&mut patch, "patch")?);

            let mut record = load_record(&tx, tenant, collection, &id)?
                .ok_or_else(|| not_found(collection, &id))?;

            if let Some(deleted_at) = record.deleted_at() {
                return Err(StoreError::Record(RecordError::Gone {
                    collection: collection.to_string(),
                    id,
                    deleted_at: Some(deleted_at),
                }));
            }

            let doc_obj = require_object(record.document_mut(), "stored document")?;
            merge_patch(doc_obj, patch_obj);

            let created_at = record.created_at();
            let data = serde_json::to_string(record.document())?;
            tx.execute(
                "UPDATE records SET data = ?1, updated_at = ?2
                 WHERE tenant_id = ?3 AND collection = ?4 AND id = ?5",
                params![data, ts, tenant_id, collection, id],
            )
            .map_err(|e| internal_error(format!("failed to update record: {}", e)))?;

            stored.push(StoredRecord::from_storage(
                collection,
                &id,
                tenant.tenant_id().clone(),
                record.into_document(),
                created_at,
                now,
                None,
            ));
        }

        tx.commit()
            .map_err(|e| internal_error(format!("failed to commit bulk update: {}", e)))?;

        Ok(stored)
    }

    fn bulk_delete_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        ids: &[&str],
    ) -> StoreResult<u64> {
        tenant.check_permission(Operation::Bulk, collection)?;
        self.collection_schema(collection)?;

        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.get_connection()?;

        let placeholders = vec!["?"; ids.len()].join(", ");
        let sql = format!(
            "DELETE FROM records WHERE tenant_id = ? AND collection = ? AND id IN ({})",
            placeholders
        );

        let mut values: Vec<rusqlite::types::Value> = Vec::with_capacity(ids.len() + 2);
        values.push(rusqlite::types::Value::Text(
            tenant.tenant_id().as_str().to_string(),
        ));
        values.push(rusqlite::types::Value::Text(collection.to_string()));
        for id in ids {
            values.push(rusqlite::types::Value::Text((*id).to_string()));
        }

        let rows = conn
            .execute(&sql, rusqlite::params_from_iter(values.iter()))
            .map_err(|e| internal_error(format!("failed to bulk-delete records: {}", e)))?;

        Ok(rows as u64)
    }

    fn count_sync(&self, tenant: &TenantContext, collection: &str) -> StoreResult<u64> {
        tenant.check_permission(Operation::Read, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records
                 WHERE tenant_id = ?1 AND collection = ?2 AND deleted_at IS NULL",
                params![tenant.tenant_id().as_str(), collection],
                |row| row.get(0),
            )
            .map_err(|e| internal_error(format!("failed to count records: {}", e)))?;

        Ok(count as u64)
    }
}

#[async_trait]
impl RecordStore for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn create(
        &self,
        tenant: &TenantContext,
        collection: &str,
        document: Value,
    ) -> StoreResult<StoredRecord> {
        logged(collection, "create", self.create_sync(tenant, collection, document))
    }

    async fn get(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        logged(collection, "get", self.get_sync(tenant, collection, id))
    }

    async fn get_any(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        logged(collection, "get_any", self.get_any_sync(tenant, collection, id))
    }

    async fn update(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
        patch: Value,
    ) -> StoreResult<StoredRecord> {
        logged(collection, "update", self.update_sync(tenant, collection, id, patch))
    }

    async fn delete(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<()> {
        logged(collection, "delete", self.delete_sync(tenant, collection, id))
    }

    async fn soft_delete(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        logged(
            collection,
            "soft_delete",
            self.soft_delete_sync(tenant, collection, id),
        )
    }

    async fn restore(
        &self,
        tenant: &TenantContext,
        collection: &str,
        id: &str,
    ) -> StoreResult<StoredRecord> {
        logged(collection, "restore", self.restore_sync(tenant, collection, id))
    }

    async fn bulk_create(
        &self,
        tenant: &TenantContext,
        collection: &str,
        documents: Vec<Value>,
    ) -> StoreResult<Vec<StoredRecord>> {
        logged(
            collection,
            "bulk_create",
            self.bulk_create_sync(tenant, collection, documents),
        )
    }

    async fn bulk_update(
        &self,
        tenant: &TenantContext,
        collection: &str,
        updates: Vec<RecordPatch>,
    ) -> StoreResult<Vec<StoredRecord>> {
        logged(
            collection,
            "bulk_update",
            self.bulk_update_sync(tenant, collection, updates),
        )
    }

    async fn bulk_delete(
        &self,
        tenant: &TenantContext,
        collection: &str,
        ids: &[&str],
    ) -> StoreResult<u64> {
        logged(
            collection,
            "bulk_delete",
            self.bulk_delete_sync(tenant, collection, ids),
        )
    }

    async fn count(&self, tenant: &TenantContext, collection: &str) -> StoreResult<u64> {
        logged(collection, "count", self.count_sync(tenant, collection))
    }
}
