//! Role storage abstraction.
//!
//! The [`RoleRepository`] trait defines the interface this engine consumes
//! for role and assignment persistence. Backends (SQL, remote API, the
//! bundled [`MemoryRoleRepository`]) implement it; the engine itself never
//! touches storage directly.
//!
//! # Design Principles
//!
//! - **Async**: all operations are async for I/O efficiency
//! - **Merged reads**: `get_roles` returns roles with entity-assignment
//!   overrides already applied, so `Access` construction needs no
//!   knowledge of the override source
//! - **Atomic batches**: `set_permissions` applies a whole operation
//!   batch in one read-modify-write per role

mod memory;

pub use memory::MemoryRoleRepository;

use crate::grant::RolePermissions;
use crate::role::{PermissionOp, Role};
use crate::{AssignmentOverrides, EntityAssignment};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use warden_types::{EntityId, ErrorCode, RoleId, TenantId};

/// Errors raised by role repositories.
///
/// Per the engine's error taxonomy these are fatal: mutating a role or
/// assignment that does not exist indicates a programming/integration
/// bug, not an expected runtime condition. Callers propagate them rather
/// than mapping them to denials.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The referenced role does not exist.
    #[error("role not found: {0}")]
    RoleNotFound(RoleId),

    /// The referenced role/entity assignment does not exist.
    #[error("no assignment of role {role_id} to entity {entity_id}")]
    AssignmentNotFound {
        /// The role side of the missing pair.
        role_id: RoleId,
        /// The entity side of the missing pair.
        entity_id: EntityId,
    },

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ErrorCode for RepositoryError {
    fn code(&self) -> &'static str {
        match self {
            Self::RoleNotFound(_) => "ROLE_NOT_FOUND",
            Self::AssignmentNotFound { .. } => "ASSIGNMENT_NOT_FOUND",
            Self::Storage(_) => "STORAGE_FAILURE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Payload for creating a role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewRole {
    /// Tenant the role belongs to.
    pub tenant_id: TenantId,
    /// Human-readable role name.
    pub name: String,
    /// Initial grants; usually empty, populated via `set_permissions`.
    #[serde(default)]
    pub permissions: RolePermissions,
}

impl NewRole {
    /// Creates a payload with no initial grants.
    #[must_use]
    pub fn new(tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self {
            tenant_id,
            name: name.into(),
            permissions: RolePermissions::new(),
        }
    }
}

/// Role and assignment persistence, consumed by the engine.
///
/// Implementations must be thread-safe (`Send + Sync`) for use across
/// async tasks. `set_permissions` must be atomic per role; this engine
/// layers no optimistic concurrency on top, so concurrent batches against
/// one role are last-write-wins unless the backend locks.
pub trait RoleRepository: Send + Sync {
    /// Creates a role and returns the persisted record.
    fn add_role(
        &self,
        payload: NewRole,
    ) -> impl Future<Output = Result<Role, RepositoryError>> + Send;

    /// Fetches a role by id, `None` if absent.
    fn get_role(
        &self,
        role_id: &RoleId,
    ) -> impl Future<Output = Result<Option<Role>, RepositoryError>> + Send;

    /// Fetches the entity's roles within a tenant, with entity-assignment
    /// overrides already merged into each role's grants.
    fn get_roles(
        &self,
        tenant_id: &TenantId,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Vec<Role>, RepositoryError>> + Send;

    /// Fetches every role of a tenant (no overrides apply).
    fn get_roles_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> impl Future<Output = Result<Vec<Role>, RepositoryError>> + Send;

    /// Fetches every role an entity holds across tenants, overrides merged.
    fn get_roles_by_entity(
        &self,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<Vec<Role>, RepositoryError>> + Send;

    /// Adds an entity to a role, with optional overrides.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::RoleNotFound`] if the role does not exist.
    fn add_entity(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
        overrides: AssignmentOverrides,
    ) -> impl Future<Output = Result<EntityAssignment, RepositoryError>> + Send;

    /// Replaces the condition overrides of an existing assignment.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::AssignmentNotFound`] if the pair is not assigned.
    fn set_conditions(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
        conditions: BTreeMap<String, Value>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Replaces the filter overrides of an existing assignment.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::AssignmentNotFound`] if the pair is not assigned.
    fn set_filters(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
        filters: BTreeMap<String, Vec<String>>,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Removes an entity from a role, deleting the assignment.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::AssignmentNotFound`] if the pair is not assigned.
    fn del_entity(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Applies an operation batch to a role atomically and returns the
    /// resulting permissions mapping.
    ///
    /// # Errors
    ///
    /// [`RepositoryError::RoleNotFound`] if the role does not exist.
    fn set_permissions(
        &self,
        role_id: &RoleId,
        operations: Vec<PermissionOp>,
    ) -> impl Future<Output = Result<RolePermissions, RepositoryError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_stable() {
        let err = RepositoryError::RoleNotFound(RoleId::new());
        assert_eq!(err.code(), "ROLE_NOT_FOUND");
        assert!(!err.is_recoverable());

        let err = RepositoryError::Storage("connection reset".to_string());
        assert_eq!(err.code(), "STORAGE_FAILURE");
        assert!(err.is_recoverable());
    }

    #[test]
    fn display_names_the_pair() {
        let role_id = RoleId::new();
        let entity_id = EntityId::new();
        let err = RepositoryError::AssignmentNotFound { role_id, entity_id };
        let msg = err.to_string();
        assert!(msg.contains(&role_id.to_string()), "got: {msg}");
        assert!(msg.contains(&entity_id.to_string()), "got: {msg}");
    }
}
