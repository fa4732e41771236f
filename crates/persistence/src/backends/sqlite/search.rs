//! SearchStore implementation for SQLite.
//!
//! Listing and search queries are assembled as a WHERE fragment plus a
//! positional parameter list. Document fields are reached through
//! `json_extract` with the JSON path bound as a parameter; field names are
//! validated before they go anywhere near the SQL text.

use async_trait::async_trait;
use rusqlite::types::Value as SqlValue;
use serde_json::Value;

use crate::core::SearchStore;
use crate::error::{QueryError, StoreError, StoreResult};
use crate::tenant::{Operation, TenantContext};
use crate::types::{
    ListOptions, ListPage, SearchCriteria, SearchPage, SortDirection, StoredRecord,
    DEFAULT_SEARCH_LIMIT,
};

use super::{format_timestamp, internal_error, logged, parse_timestamp, SqliteBackend};

/// Validates a document field name and returns its JSON path.
///
/// Field names are restricted to alphanumerics and underscores so they can
/// never smuggle path syntax or SQL into a query.
fn json_path(field: &str) -> StoreResult<String> {
    if field.is_empty() || !field.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::Query(QueryError::InvalidFilter {
            field: field.to_string(),
            message: "field names may only contain alphanumerics and underscores".to_string(),
        }));
    }
    Ok(format!("$.{}", field))
}

/// Converts a JSON filter value to its SQLite comparison value.
fn filter_value(field: &str, value: &Value) -> StoreResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::Bool(b) => Ok(SqlValue::Integer(i64::from(*b))),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(SqlValue::Integer(i))
            } else if let Some(f) = n.as_f64() {
                Ok(SqlValue::Real(f))
            } else {
                Err(StoreError::Query(QueryError::InvalidFilter {
                    field: field.to_string(),
                    message: format!("unrepresentable number: {}", n),
                }))
            }
        }
        Value::String(s) => Ok(SqlValue::Text(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(StoreError::Query(QueryError::InvalidFilter {
            field: field.to_string(),
            message: "arrays and objects are not comparable as equality filters".to_string(),
        })),
    }
}

/// Maps an order field to a SQL expression. Metadata fields order on their
/// store columns; anything else orders on the document body.
fn order_expr(field: &str) -> StoreResult<String> {
    match field {
        "id" | "created_at" | "updated_at" => Ok(field.to_string()),
        _ => {
            // json_path validates the name before it is interpolated.
            let path = json_path(field)
                .map_err(|_| StoreError::Query(QueryError::InvalidOrderField {
                    field: field.to_string(),
                }))?;
            Ok(format!("json_extract(data, '{}')", path))
        }
    }
}

/// An assembled WHERE fragment plus its bound parameters, in order.
struct QueryParts {
    where_sql: String,
    params: Vec<SqlValue>,
}

impl QueryParts {
    fn scoped(tenant: &TenantContext, collection: &str, include_deleted: bool) -> Self {
        let mut where_sql = String::from("tenant_id = ? AND collection = ?");
        if !include_deleted {
            where_sql.push_str(" AND deleted_at IS NULL");
        }
        Self {
            where_sql,
            params: vec![
                SqlValue::Text(tenant.tenant_id().as_str().to_string()),
                SqlValue::Text(collection.to_string()),
            ],
        }
    }

    fn push_clause(&mut self, clause: &str, values: impl IntoIterator<Item = SqlValue>) {
        self.where_sql.push_str(" AND ");
        self.where_sql.push_str(clause);
        self.params.extend(values);
    }
}

impl SqliteBackend {
    fn run_count(&self, conn: &rusqlite::Connection, parts: &QueryParts) -> StoreResult<u64> {
        let sql = format!("SELECT COUNT(*) FROM records WHERE {}", parts.where_sql);
        let count: i64 = conn
            .query_row(&sql, rusqlite::params_from_iter(parts.params.iter()), |row| {
                row.get(0)
            })
            .map_err(|e| internal_error(format!("failed to count records: {}", e)))?;
        Ok(count as u64)
    }

    fn run_select(
        &self,
        conn: &rusqlite::Connection,
        tenant: &TenantContext,
        collection: &str,
        parts: &QueryParts,
        tail_sql: &str,
        tail_params: Vec<SqlValue>,
    ) -> StoreResult<Vec<StoredRecord>> {
        let sql = format!(
            "SELECT id, data, created_at, updated_at, deleted_at FROM records WHERE {}{}",
            parts.where_sql, tail_sql
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| internal_error(format!("failed to prepare query: {}", e)))?;

        let all_params: Vec<&SqlValue> =
            parts.params.iter().chain(tail_params.iter()).collect();

        let rows = stmt
            .query_map(rusqlite::params_from_iter(all_params), |row| {
                let id: String = row.get(0)?;
                let data: String = row.get(1)?;
                let created_at: String = row.get(2)?;
                let updated_at: String = row.get(3)?;
                let deleted_at: Option<String> = row.get(4)?;
                Ok((id, data, created_at, updated_at, deleted_at))
            })
            .map_err(|e| internal_error(format!("failed to query records: {}", e)))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, data, created_at, updated_at, deleted_at) =
                row.map_err(|e| internal_error(format!("failed to read row: {}", e)))?;

            let document: Value = serde_json::from_str(&data).map_err(|e| {
                super::serialization_error(format!("failed to deserialize record: {}", e))
            })?;

            records.push(StoredRecord::from_storage(
                collection,
                id,
                tenant.tenant_id().clone(),
                document,
                parse_timestamp(&created_at)?,
                parse_timestamp(&updated_at)?,
                deleted_at.as_deref().map(parse_timestamp).transpose()?,
            ));
        }

        Ok(records)
    }

    fn list_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        options: &ListOptions,
    ) -> StoreResult<ListPage> {
        tenant.check_permission(Operation::Search, collection)?;
        self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let mut parts = QueryParts::scoped(tenant, collection, options.include_deleted);
        for (field, value) in &options.filters {
            let path = json_path(field)?;
            let value = filter_value(field, value)?;
            parts.push_clause(
                "json_extract(data, ?) = ?",
                [SqlValue::Text(path), value],
            );
        }

        let total_count = self.run_count(&conn, &parts)?;

        let mut tail_sql = String::new();
        let mut tail_params = Vec::new();

        if let Some(order) = &options.order_by {
            let dir = match order.direction {
                SortDirection::Ascending => "ASC",
                SortDirection::Descending => "DESC",
            };
            tail_sql.push_str(&format!(" ORDER BY {} {}", order_expr(&order.field)?, dir));
        }

        match (options.page, options.limit) {
            (Some(page), Some(limit)) => {
                tail_sql.push_str(" LIMIT ? OFFSET ?");
                tail_params.push(SqlValue::Integer(i64::from(limit)));
                tail_params.push(SqlValue::Integer(i64::from(page) * i64::from(limit)));
            }
            (None, Some(limit)) => {
                tail_sql.push_str(" LIMIT ?");
                tail_params.push(SqlValue::Integer(i64::from(limit)));
            }
            // A page without a limit has no defined window.
            _ => {}
        }

        let records = self.run_select(&conn, tenant, collection, &parts, &tail_sql, tail_params)?;

        Ok(ListPage::new(records, total_count))
    }

    fn search_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        term: &str,
        columns: &[&str],
        limit: Option<u32>,
    ) -> StoreResult<Vec<StoredRecord>> {
        tenant.check_permission(Operation::Search, collection)?;
        self.collection_schema(collection)?;

        if columns.is_empty() {
            return Ok(Vec::new());
        }

        let conn = self.get_connection()?;
        let mut parts = QueryParts::scoped(tenant, collection, false);

        let pattern = format!("%{}%", term.to_lowercase());
        let mut clauses = Vec::with_capacity(columns.len());
        let mut values = Vec::with_capacity(columns.len() * 2);
        for column in columns {
            let path = json_path(column)?;
            clauses.push("lower(json_extract(data, ?)) LIKE ?");
            values.push(SqlValue::Text(path));
            values.push(SqlValue::Text(pattern.clone()));
        }
        parts.push_clause(&format!("({})", clauses.join(" OR ")), values);

        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        self.run_select(
            &conn,
            tenant,
            collection,
            &parts,
            " LIMIT ?",
            vec![SqlValue::Integer(i64::from(limit))],
        )
    }

    fn advanced_search_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        criteria: &SearchCriteria,
    ) -> StoreResult<SearchPage> {
        tenant.check_permission(Operation::Search, collection)?;
        let schema = self.collection_schema(collection)?;
        let conn = self.get_connection()?;

        let mut parts = QueryParts::scoped(tenant, collection, criteria.include_deleted);

        if let Some(query) = criteria.query.as_deref().filter(|q| !q.is_empty()) {
            let pattern = format!("%{}%", query.to_lowercase());
            let mut clauses = Vec::new();
            let mut values = Vec::new();
            for column in schema.text_columns() {
                let path = json_path(column)?;
                clauses.push("lower(json_extract(data, ?)) LIKE ?");
                values.push(SqlValue::Text(path));
                values.push(SqlValue::Text(pattern.clone()));
            }
            if !clauses.is_empty() {
                parts.push_clause(&format!("({})", clauses.join(" OR ")), values);
            }
        }

        if let Some(after) = criteria.created_after {
            parts.push_clause(
                "created_at >= ?",
                [SqlValue::Text(format_timestamp(after))],
            );
        }
        if let Some(before) = criteria.created_before {
            parts.push_clause(
                "created_at <= ?",
                [SqlValue::Text(format_timestamp(before))],
            );
        }

        // Tag containment: every requested tag must appear in the record's
        // tag array. Records without the array match nothing.
        let tag_path = json_path(schema.tag_column())?;
        for tag in &criteria.tags {
            parts.push_clause(
                "EXISTS (SELECT 1 FROM json_each(records.data, ?) je WHERE je.value = ?)",
                [
                    SqlValue::Text(tag_path.clone()),
                    SqlValue::Text(tag.clone()),
                ],
            );
        }

        if let Some(category) = &criteria.category {
            parts.push_clause(
                "json_extract(data, ?) = ?",
                [
                    SqlValue::Text(json_path(schema.category_column())?),
                    SqlValue::Text(category.clone()),
                ],
            );
        }
        if let Some(status) = &criteria.status {
            parts.push_clause(
                "json_extract(data, ?) = ?",
                [
                    SqlValue::Text(json_path(schema.status_column())?),
                    SqlValue::Text(status.clone()),
                ],
            );
        }

        let total_count = self.run_count(&conn, &parts)?;

        let limit = criteria.effective_limit();
        let offset = i64::from(criteria.page) * i64::from(limit);
        let records = self.run_select(
            &conn,
            tenant,
            collection,
            &parts,
            " LIMIT ? OFFSET ?",
            vec![
                SqlValue::Integer(i64::from(limit)),
                SqlValue::Integer(offset),
            ],
        )?;

        Ok(SearchPage::new(records, total_count, limit))
    }
}

#[async_trait]
impl SearchStore for SqliteBackend {
    async fn list(
        &self,
        tenant: &TenantContext,
        collection: &str,
        options: &ListOptions,
    ) -> StoreResult<ListPage> {
        logged(collection, "list", self.list_sync(tenant, collection, options))
    }

    async fn search(
        &self,
        tenant: &TenantContext,
        collection: &str,
        term: &str,
        columns: &[&str],
        limit: Option<u32>,
    ) -> StoreResult<Vec<StoredRecord>> {
        logged(
            collection,
            "search",
            self.search_sync(tenant, collection, term, columns, limit),
        )
    }

    async fn advanced_search(
        &self,
        tenant: &TenantContext,
        collection: &str,
        criteria: &SearchCriteria,
    ) -> StoreResult<SearchPage> {
        logged(
            collection,
            "advanced_search",
            self.advanced_search_sync(tenant, collection, criteria),
        )
    }
}
