//! Listing and search trait.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::tenant::TenantContext;
use crate::types::{ListOptions, ListPage, SearchCriteria, SearchPage, StoredRecord};

/// Filtered listing and substring search over a collection.
///
/// Soft-deleted records are excluded from every operation here unless the
/// request sets `include_deleted`.
#[async_trait]
pub trait SearchStore: Send + Sync {
    /// Lists records matching the options' equality filters.
    ///
    /// Filters are conjunctive: every filter must match exactly. Pagination
    /// applies `page * limit` as the offset when both are given, or a plain
    /// limit when only `limit` is set. The returned
    /// [`meta.total_count`](crate::types::ListMeta::total_count) counts all
    /// matching records regardless of the page window. Result ordering is
    /// unspecified unless `order_by` is given.
    async fn list(
        &self,
        tenant: &TenantContext,
        collection: &str,
        options: &ListOptions,
    ) -> StoreResult<ListPage>;

    /// Case-insensitive substring search across the given document fields.
    ///
    /// A record matches when at least one of `columns` contains `term` as a
    /// case-insensitive substring. Results are capped at `limit` (default
    /// [`DEFAULT_SEARCH_LIMIT`](crate::types::DEFAULT_SEARCH_LIMIT)) and
    /// carry no relevance ranking; order is store-default.
    async fn search(
        &self,
        tenant: &TenantContext,
        collection: &str,
        term: &str,
        columns: &[&str],
        limit: Option<u32>,
    ) -> StoreResult<Vec<StoredRecord>>;

    /// Combined free-text, date-range, tag, category, and status search.
    ///
    /// The free-text query OR-matches the collection's registered text
    /// columns; all other clauses are AND-ed in. The returned page count is
    /// derived from the criteria's effective limit.
    async fn advanced_search(
        &self,
        tenant: &TenantContext,
        collection: &str,
        criteria: &SearchCriteria,
    ) -> StoreResult<SearchPage>;
}
