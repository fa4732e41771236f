//! AnalyticsProvider implementation for SQLite.
//!
//! Only the raw window rows come from the database; histograms, timeline,
//! and growth are aggregated in process. The cost of a report is therefore
//! linear in the number of records created during the window.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rusqlite::params;
use serde_json::Value;

use crate::core::AnalyticsProvider;
use crate::error::StoreResult;
use crate::tenant::{Operation, TenantContext};
use crate::types::{AnalyticsReport, TimeRange, TimelinePoint};

use super::{format_timestamp, internal_error, logged, parse_timestamp, SqliteBackend};

impl SqliteBackend {
    fn analytics_sync(
        &self,
        tenant: &TenantContext,
        collection: &str,
        range: TimeRange,
    ) -> StoreResult<AnalyticsReport> {
        tenant.check_permission(Operation::Analytics, collection)?;
        let schema = self.collection_schema(collection)?;
        let conn = self.get_connection()?;
        let tenant_id = tenant.tenant_id().as_str();

        let now = super::store_now();
        let (window_start, _) = range.window(now);
        let (prev_start, prev_end) = range.previous_window(now);

        // Raw rows created within the window; aggregation happens below.
        let mut stmt = conn
            .prepare(
                "SELECT data, created_at FROM records
                 WHERE tenant_id = ?1 AND collection = ?2 AND created_at >= ?3",
            )
            .map_err(|e| internal_error(format!("failed to prepare analytics query: {}", e)))?;

        let rows = stmt
            .query_map(
                params![tenant_id, collection, format_timestamp(window_start)],
                |row| {
                    let data: String = row.get(0)?;
                    let created_at: String = row.get(1)?;
                    Ok((data, created_at))
                },
            )
            .map_err(|e| internal_error(format!("failed to query analytics rows: {}", e)))?;

        let mut total: u64 = 0;
        let mut by_category: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_status: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_day: BTreeMap<String, u64> = BTreeMap::new();

        for row in rows {
            let (data, created_at) =
                row.map_err(|e| internal_error(format!("failed to read analytics row: {}", e)))?;

            let document: Value = serde_json::from_str(&data)?;
            let created_at = parse_timestamp(&created_at)?;

            total += 1;

            if let Some(category) = document
                .get(schema.category_column())
                .and_then(|v| v.as_str())
            {
                *by_category.entry(category.to_string()).or_insert(0) += 1;
            }
            if let Some(status) = document.get(schema.status_column()).and_then(|v| v.as_str())
            {
                *by_status.entry(status.to_string()).or_insert(0) += 1;
            }

            let day = created_at.date_naive().to_string();
            *by_day.entry(day).or_insert(0) += 1;
        }

        let previous_total: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM records
                 WHERE tenant_id = ?1 AND collection = ?2
                   AND created_at >= ?3 AND created_at < ?4",
                params![
                    tenant_id,
                    collection,
                    format_timestamp(prev_start),
                    format_timestamp(prev_end)
                ],
                |row| row.get(0),
            )
            .map_err(|e| internal_error(format!("failed to count previous window: {}", e)))?;

        // BTreeMap iterates in key order, so the timeline comes out sorted
        // ascending by date string.
        let timeline = by_day
            .into_iter()
            .map(|(date, count)| TimelinePoint { date, count })
            .collect();

        Ok(AnalyticsReport {
            total,
            growth_percent: AnalyticsReport::growth(total, previous_total as u64),
            by_category,
            by_status,
            timeline,
        })
    }
}

#[async_trait]
impl AnalyticsProvider for SqliteBackend {
    async fn analytics(
        &self,
        tenant: &TenantContext,
        collection: &str,
        range: TimeRange,
    ) -> StoreResult<AnalyticsReport> {
        logged(
            collection,
            "analytics",
            self.analytics_sync(tenant, collection, range),
        )
    }
}
