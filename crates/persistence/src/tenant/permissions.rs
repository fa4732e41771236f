//! Tenant permission types.
//!
//! Controls which operations a tenant context may perform, and against which
//! collections.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Operations that can be performed against the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    /// Create new records.
    Create,
    /// Read existing records.
    Read,
    /// Update existing records.
    Update,
    /// Delete records (soft or hard).
    Delete,
    /// List and search records.
    Search,
    /// Read or write version history.
    History,
    /// Compute analytics reports.
    Analytics,
    /// Perform bulk operations.
    Bulk,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "create"),
            Operation::Read => write!(f, "read"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
            Operation::Search => write!(f, "search"),
            Operation::History => write!(f, "history"),
            Operation::Analytics => write!(f, "analytics"),
            Operation::Bulk => write!(f, "bulk"),
        }
    }
}

/// Permissions granted to a tenant context.
///
/// Permissions can be full access, read-only, or custom combinations of
/// operations and collections built through [`TenantPermissions::builder`].
///
/// # Examples
///
/// ```
/// use meridian_persistence::tenant::{Operation, TenantPermissions};
///
/// let full = TenantPermissions::full_access();
/// assert!(full.can_perform(Operation::Create, "compliance_reports"));
///
/// let read_only = TenantPermissions::read_only();
/// assert!(read_only.can_perform(Operation::Read, "compliance_reports"));
/// assert!(!read_only.can_perform(Operation::Create, "compliance_reports"));
///
/// let custom = TenantPermissions::builder()
///     .allow_operations([Operation::Read, Operation::Search])
///     .allow_collections(["audits"])
///     .build();
/// assert!(custom.can_perform(Operation::Search, "audits"));
/// assert!(!custom.can_perform(Operation::Search, "incidents"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantPermissions {
    /// Allowed operations. If None, all operations are allowed.
    allowed_operations: Option<HashSet<Operation>>,

    /// Allowed collections. If None, all collections are allowed.
    allowed_collections: Option<HashSet<String>>,
}

impl TenantPermissions {
    /// Creates permissions with full access to all operations and collections.
    pub fn full_access() -> Self {
        Self {
            allowed_operations: None,
            allowed_collections: None,
        }
    }

    /// Creates read-only permissions (read, search, history, analytics).
    pub fn read_only() -> Self {
        let mut ops = HashSet::new();
        ops.insert(Operation::Read);
        ops.insert(Operation::Search);
        ops.insert(Operation::History);
        ops.insert(Operation::Analytics);
        Self {
            allowed_operations: Some(ops),
            allowed_collections: None,
        }
    }

    /// Returns a builder for custom permissions.
    pub fn builder() -> TenantPermissionsBuilder {
        TenantPermissionsBuilder::default()
    }

    /// Returns `true` if the given operation is allowed on the collection.
    pub fn can_perform(&self, operation: Operation, collection: &str) -> bool {
        if let Some(ops) = &self.allowed_operations {
            if !ops.contains(&operation) {
                return false;
            }
        }
        if let Some(collections) = &self.allowed_collections {
            if !collections.contains(collection) {
                return false;
            }
        }
        true
    }
}

/// Builder for [`TenantPermissions`].
#[derive(Debug, Default)]
pub struct TenantPermissionsBuilder {
    allowed_operations: Option<HashSet<Operation>>,
    allowed_collections: Option<HashSet<String>>,
}

impl TenantPermissionsBuilder {
    /// Restricts the permissions to the given operations.
    pub fn allow_operations(mut self, operations: impl IntoIterator<Item = Operation>) -> Self {
        self.allowed_operations = Some(operations.into_iter().collect());
        self
    }

    /// Restricts the permissions to the given collections.
    pub fn allow_collections<S: Into<String>>(
        mut self,
        collections: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_collections = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the permissions.
    pub fn build(self) -> TenantPermissions {
        TenantPermissions {
            allowed_operations: self.allowed_operations,
            allowed_collections: self.allowed_collections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_access() {
        let perms = TenantPermissions::full_access();
        assert!(perms.can_perform(Operation::Create, "anything"));
        assert!(perms.can_perform(Operation::Delete, "anything"));
        assert!(perms.can_perform(Operation::Bulk, "anything"));
    }

    #[test]
    fn test_read_only() {
        let perms = TenantPermissions::read_only();
        assert!(perms.can_perform(Operation::Read, "audits"));
        assert!(perms.can_perform(Operation::Search, "audits"));
        assert!(perms.can_perform(Operation::Analytics, "audits"));
        assert!(!perms.can_perform(Operation::Create, "audits"));
        assert!(!perms.can_perform(Operation::Update, "audits"));
        assert!(!perms.can_perform(Operation::Delete, "audits"));
    }

    #[test]
    fn test_collection_restriction() {
        let perms = TenantPermissions::builder()
            .allow_collections(["audits", "incidents"])
            .build();
        assert!(perms.can_perform(Operation::Create, "audits"));
        assert!(perms.can_perform(Operation::Read, "incidents"));
        assert!(!perms.can_perform(Operation::Read, "reports"));
    }

    #[test]
    fn test_combined_restriction() {
        let perms = TenantPermissions::builder()
            .allow_operations([Operation::Read])
            .allow_collections(["audits"])
            .build();
        assert!(perms.can_perform(Operation::Read, "audits"));
        assert!(!perms.can_perform(Operation::Read, "incidents"));
        assert!(!perms.can_perform(Operation::Update, "audits"));
    }

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "create");
        assert_eq!(Operation::Analytics.to_string(), "analytics");
        assert_eq!(Operation::Bulk.to_string(), "bulk");
    }
}
