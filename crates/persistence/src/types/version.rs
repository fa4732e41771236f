//! Version snapshot type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An immutable snapshot of a record's state plus the delta applied to it.
///
/// Version entries are append-only: the store never mutates or deletes them,
/// so they accumulate monotonically per record ID. Every entry stores a full
/// copy of the record as it stood at write time, together with the changes
/// object the caller supplied, verbatim. There is no diffing or compaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionEntry {
    /// The collection of the versioned record.
    pub collection: String,

    /// The ID of the versioned record.
    pub entity_id: String,

    /// Full snapshot of the record document at write time.
    pub version_data: Value,

    /// The delta the caller applied, stored verbatim.
    pub changes: Value,

    /// When the snapshot was written.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serde_roundtrip() {
        let entry = VersionEntry {
            collection: "compliance_reports".to_string(),
            entity_id: "r-1".to_string(),
            version_data: json!({"title": "Q3 emissions", "status": "draft"}),
            changes: json!({"status": "published"}),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&entry).unwrap();
        let parsed: VersionEntry = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.entity_id, "r-1");
        assert_eq!(parsed.changes["status"], "published");
        assert_eq!(parsed.version_data["status"], "draft");
    }
}
