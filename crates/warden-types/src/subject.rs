//! Subject (token identity) types.
//!
//! A [`Subject`] is the identity pair a signed session token speaks for:
//! which tenant the session belongs to and which entity is acting.
//!
//! # Design Rationale
//!
//! Subject lives in `warden-types` (not `warden-session`) because:
//!
//! 1. **Both sides need it**: `warden-core` loads roles by (tenant, entity),
//!    `warden-session` carries the same pair in token claims
//! 2. **No auth logic dependency**: Subject is pure identity, no permission
//!    or crypto logic
//! 3. **Avoids a circular dependency** between the core and session crates

use crate::{EntityId, TenantId};
use serde::{Deserialize, Serialize};

/// The identity an access decision is resolved for.
///
/// A Subject represents identity only, never permission. What the subject
/// may do is determined by the roles loaded for this pair.
///
/// # Example
///
/// ```
/// use warden_types::{EntityId, Subject, TenantId};
///
/// let subject = Subject::new(TenantId::new(), EntityId::new());
/// println!("resolving access for {subject}");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    /// The tenant the session belongs to.
    pub tenant: TenantId,
    /// The entity acting within that tenant.
    pub entity: EntityId,
}

impl Subject {
    /// Creates a new subject from a tenant/entity pair.
    #[must_use]
    pub fn new(tenant: TenantId, entity: EntityId) -> Self {
        Self { tenant, entity }
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.entity, self.tenant)
    }
}
