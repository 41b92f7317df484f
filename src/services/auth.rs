//! Pluggable authorization for administrator-only operations.

use crate::dao::models::canonical_id;

/// Authority deciding whether a caller may use administrator operations.
///
/// Kept as a trait so role lists or token-based checks can replace the
/// single-identity comparison without touching broadcast or statistics code.
pub trait AdminAuthorizer: Send + Sync {
    /// True when `caller_id` may run administrator operations.
    fn is_authorized(&self, caller_id: &str) -> bool;
}

/// Compares callers against the single configured administrator identity.
pub struct StaticAdminAuthorizer {
    admin_id: Option<String>,
}

impl StaticAdminAuthorizer {
    /// Build an authorizer for the configured identity.
    ///
    /// `None` or a blank identity authorizes nobody, so a deployment without
    /// `ARENA_ADMIN_ID` cannot be escalated into with an empty caller id.
    pub fn new(admin_id: Option<String>) -> Self {
        let admin_id = admin_id
            .map(|id| canonical_id(&id))
            .filter(|id| !id.is_empty());
        Self { admin_id }
    }
}

impl AdminAuthorizer for StaticAdminAuthorizer {
    fn is_authorized(&self, caller_id: &str) -> bool {
        match &self.admin_id {
            Some(admin_id) => canonical_id(caller_id) == *admin_id,
            None => false,
        }
    }
}
