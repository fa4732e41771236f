//! Tenant context for store operations.
//!
//! [`TenantContext`] provides validated tenant information required for ALL
//! store operations. Tenant isolation is enforced at the type level:
//! operations cannot be performed without a context.

use std::sync::Arc;

use super::id::TenantId;
use super::permissions::{Operation, TenantPermissions};
use crate::error::TenantError;

/// A validated tenant context required for all store operations.
///
/// The context carries the tenant identity and permissions, plus optional
/// audit metadata (acting user, correlation id for request tracing).
/// Permissions are shared behind an `Arc`, so cloning a context is cheap.
///
/// # Examples
///
/// ```
/// use meridian_persistence::tenant::{Operation, TenantContext, TenantId, TenantPermissions};
///
/// let ctx = TenantContext::new(
///     TenantId::new("acme-corp"),
///     TenantPermissions::full_access(),
/// );
/// assert!(ctx.check_permission(Operation::Create, "compliance_reports").is_ok());
///
/// let reader = TenantContext::new(
///     TenantId::new("acme-corp"),
///     TenantPermissions::read_only(),
/// );
/// assert!(reader.check_permission(Operation::Create, "compliance_reports").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct TenantContext {
    /// The tenant identifier.
    tenant_id: TenantId,
    /// The permissions for this context.
    permissions: Arc<TenantPermissions>,
    /// Optional user ID for audit purposes.
    user_id: Option<String>,
    /// Optional correlation ID for request tracing.
    correlation_id: Option<String>,
}

impl TenantContext {
    /// Creates a new tenant context with the given ID and permissions.
    pub fn new(tenant_id: TenantId, permissions: TenantPermissions) -> Self {
        Self {
            tenant_id,
            permissions: Arc::new(permissions),
            user_id: None,
            correlation_id: None,
        }
    }

    /// Attaches the acting user's ID for auditing.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Attaches a correlation ID for request tracing.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Returns the tenant ID.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the permissions for this context.
    pub fn permissions(&self) -> &TenantPermissions {
        &self.permissions
    }

    /// Returns the acting user's ID, if set.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the correlation ID, if set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Checks whether the given operation is permitted on the collection.
    ///
    /// # Errors
    ///
    /// Returns [`TenantError::OperationNotPermitted`] when the context's
    /// permissions do not allow the operation.
    pub fn check_permission(
        &self,
        operation: Operation,
        collection: &str,
    ) -> Result<(), TenantError> {
        if self.permissions.can_perform(operation, collection) {
            Ok(())
        } else {
            Err(TenantError::OperationNotPermitted {
                tenant_id: self.tenant_id.clone(),
                operation: operation.to_string(),
            })
        }
    }
}
