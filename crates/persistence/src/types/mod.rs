//! Core types for stored records, queries, versions, and analytics.

mod analytics;
mod query;
mod record;
mod version;

pub use analytics::{AnalyticsReport, TimeRange, TimelinePoint};
pub use query::{
    ListMeta, ListOptions, ListPage, OrderBy, RecordPatch, SearchCriteria, SearchPage,
    SortDirection, DEFAULT_SEARCH_LIMIT,
};
pub use record::StoredRecord;
pub use version::VersionEntry;
