//! Listing and search request types.
//!
//! [`ListOptions`] describes a filtered/paginated listing; [`SearchCriteria`]
//! is the richer bundle used by advanced search. Both are plain descriptions
//! of a request and carry no connection state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::StoredRecord;

/// Default page size for search operations when the caller gives no limit.
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Sort direction for ordered listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order.
    #[default]
    Ascending,
    /// Descending order.
    Descending,
}

/// A single-field ordering directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    /// The field to order by. Metadata fields (`id`, `created_at`,
    /// `updated_at`) refer to store columns; anything else is looked up in
    /// the document body.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl OrderBy {
    /// Creates an ascending ordering on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Ascending,
        }
    }

    /// Creates a descending ordering on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Descending,
        }
    }
}

/// Options for a filtered, paginated listing.
///
/// Filters are conjunctive equality predicates: every entry must match
/// exactly. Result ordering is unspecified unless `order_by` is given.
///
/// # Examples
///
/// ```
/// use meridian_persistence::types::{ListOptions, OrderBy};
/// use serde_json::json;
///
/// let options = ListOptions::new()
///     .with_filter("status", json!("open"))
///     .with_page(0, 20)
///     .with_order(OrderBy::desc("created_at"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOptions {
    /// Equality filters, field name to required value.
    pub filters: BTreeMap<String, Value>,

    /// Zero-based page index. Only effective together with `limit`.
    pub page: Option<u32>,

    /// Maximum number of records per page.
    pub limit: Option<u32>,

    /// Optional single-field ordering.
    pub order_by: Option<OrderBy>,

    /// Include soft-deleted records. Defaults to `false`.
    pub include_deleted: bool,
}

impl ListOptions {
    /// Creates empty options (no filters, no pagination, no ordering).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    pub fn with_filter(mut self, field: impl Into<String>, value: Value) -> Self {
        self.filters.insert(field.into(), value);
        self
    }

    /// Sets the page index and page size.
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = Some(page);
        self.limit = Some(limit);
        self
    }

    /// Sets only the page size.
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets the ordering.
    pub fn with_order(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    /// Includes soft-deleted records in the listing.
    pub fn with_deleted(mut self) -> Self {
        self.include_deleted = true;
        self
    }
}

/// Metadata accompanying a listing page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListMeta {
    /// Count of all records matching the filters, regardless of pagination.
    pub total_count: u64,
}

/// A page of listing results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPage {
    /// The records in this page.
    pub records: Vec<StoredRecord>,

    /// Listing metadata.
    pub meta: ListMeta,
}

impl ListPage {
    /// Creates a new page.
    pub fn new(records: Vec<StoredRecord>, total_count: u64) -> Self {
        Self {
            records,
            meta: ListMeta { total_count },
        }
    }

    /// Returns `true` if this page has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the number of records in this page.
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Criteria for an advanced search.
///
/// All clauses are combined conjunctively; the free-text query itself is a
/// disjunctive case-insensitive substring match across the collection's
/// registered text columns.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    /// Free-text query, matched as a case-insensitive substring.
    pub query: Option<String>,

    /// Inclusive lower bound on creation time.
    pub created_after: Option<DateTime<Utc>>,

    /// Inclusive upper bound on creation time.
    pub created_before: Option<DateTime<Utc>>,

    /// Tags the record must all carry.
    pub tags: Vec<String>,

    /// Required category value.
    pub category: Option<String>,

    /// Required status value.
    pub status: Option<String>,

    /// Zero-based page index.
    pub page: u32,

    /// Page size. Defaults to [`DEFAULT_SEARCH_LIMIT`] when unset.
    pub limit: Option<u32>,

    /// Include soft-deleted records. Defaults to `false`.
    pub include_deleted: bool,
}

impl SearchCriteria {
    /// Creates empty criteria.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Sets the inclusive creation-date range.
    pub fn with_date_range(mut self, after: DateTime<Utc>, before: DateTime<Utc>) -> Self {
        self.created_after = Some(after);
        self.created_before = Some(before);
        self
    }

    /// Requires the record to carry all given tags.
    pub fn with_tags<S: Into<String>>(mut self, tags: impl IntoIterator<Item = S>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Requires the given category.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Requires the given status.
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the page index and page size.
    pub fn with_page(mut self, page: u32, limit: u32) -> Self {
        self.page = page;
        self.limit = Some(limit);
        self
    }

    /// Returns the effective page size.
    pub fn effective_limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_SEARCH_LIMIT).max(1)
    }
}

/// A page of advanced-search results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPage {
    /// The records in this page.
    pub records: Vec<StoredRecord>,

    /// Count of all records matching the criteria.
    pub total_count: u64,

    /// Number of pages at the search's effective page size.
    pub page_count: u32,
}

impl SearchPage {
    /// Creates a page, deriving `page_count` from the actual page size.
    pub fn new(records: Vec<StoredRecord>, total_count: u64, limit: u32) -> Self {
        let limit = u64::from(limit.max(1));
        let page_count = total_count.div_ceil(limit) as u32;
        Self {
            records,
            total_count,
            page_count,
        }
    }
}

/// A single entry in a bulk update batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPatch {
    /// The ID of the record to update.
    pub id: String,

    /// The partial document to merge into the record.
    pub patch: Value,
}

impl RecordPatch {
    /// Creates a patch for the given record ID.
    pub fn new(id: impl Into<String>, patch: Value) -> Self {
        Self {
            id: id.into(),
            patch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_options_builder() {
        let options = ListOptions::new()
            .with_filter("status", json!("open"))
            .with_filter("category", json!("emissions"))
            .with_page(2, 25)
            .with_order(OrderBy::desc("created_at"));

        assert_eq!(options.filters.len(), 2);
        assert_eq!(options.page, Some(2));
        assert_eq!(options.limit, Some(25));
        assert_eq!(
            options.order_by,
            Some(OrderBy {
                field: "created_at".to_string(),
                direction: SortDirection::Descending,
            })
        );
        assert!(!options.include_deleted);
    }

    #[test]
    fn test_search_criteria_effective_limit() {
        let criteria = SearchCriteria::new();
        assert_eq!(criteria.effective_limit(), DEFAULT_SEARCH_LIMIT);

        let criteria = SearchCriteria::new().with_page(0, 25);
        assert_eq!(criteria.effective_limit(), 25);

        // A zero limit is clamped rather than producing an empty page forever.
        let criteria = SearchCriteria {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(criteria.effective_limit(), 1);
    }

    #[test]
    fn test_search_page_count_uses_actual_limit() {
        let page = SearchPage::new(Vec::new(), 45, 20);
        assert_eq!(page.page_count, 3);

        let page = SearchPage::new(Vec::new(), 45, 10);
        assert_eq!(page.page_count, 5);

        let page = SearchPage::new(Vec::new(), 0, 10);
        assert_eq!(page.page_count, 0);
    }

    #[test]
    fn test_order_by_constructors() {
        assert_eq!(OrderBy::asc("title").direction, SortDirection::Ascending);
        assert_eq!(OrderBy::desc("title").direction, SortDirection::Descending);
    }
}
