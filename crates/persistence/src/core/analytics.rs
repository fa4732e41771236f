//! Analytics trait.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::tenant::TenantContext;
use crate::types::{AnalyticsReport, TimeRange};

/// Time-windowed creation analytics over a collection.
///
/// Aggregation happens client-side over the raw rows created within the
/// window, so the cost of a report is linear in the number of records the
/// window covers. Deletion state is ignored: the report describes what was
/// created, not what survives.
#[async_trait]
pub trait AnalyticsProvider: Send + Sync {
    /// Computes a creation report for the window ending now.
    ///
    /// The report carries the window total, the growth percentage relative
    /// to the preceding equal-length window (zero when that window was
    /// empty), category and status histograms, and a per-day timeline
    /// sorted ascending by date.
    async fn analytics(
        &self,
        tenant: &TenantContext,
        collection: &str,
        range: TimeRange,
    ) -> StoreResult<AnalyticsReport>;
}
