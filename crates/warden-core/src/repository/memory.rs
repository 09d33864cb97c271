//! In-memory implementation of [`RoleRepository`].
//!
//! Backs the engine's tests and embedded/single-process deployments.
//! Locking is per-map via `parking_lot::RwLock`; `set_permissions` holds
//! the write lock for the whole batch, which makes the batch atomic per
//! store. Concurrent batches against the same role are last-write-wins,
//! matching the documented repository contract.

use super::{NewRole, RepositoryError, RoleRepository};
use crate::assignment::{AssignmentOverrides, EntityAssignment};
use crate::grant::RolePermissions;
use crate::role::{PermissionOp, Role};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use warden_types::{EntityId, RoleId, TenantId};

/// Thread-safe, in-memory role and assignment store.
///
/// # Example
///
/// ```
/// use warden_core::{MemoryRoleRepository, NewRole, RepositoryError, Role, RoleRepository};
/// use warden_types::TenantId;
///
/// async fn seed_reader(repo: &MemoryRoleRepository) -> Result<Role, RepositoryError> {
///     let role = repo.add_role(NewRole::new(TenantId::new(), "reader")).await?;
///     role.update().grant("account", "read").commit(repo).await
/// }
/// ```
#[derive(Debug, Default)]
pub struct MemoryRoleRepository {
    roles: RwLock<HashMap<RoleId, Role>>,
    assignments: RwLock<HashMap<(RoleId, EntityId), EntityAssignment>>,
}

impl MemoryRoleRepository {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn merged_roles_for(&self, entity_id: &EntityId, tenant: Option<&TenantId>) -> Vec<Role> {
        let roles = self.roles.read();
        let assignments = self.assignments.read();
        let mut merged: Vec<Role> = assignments
            .values()
            .filter(|assignment| assignment.entity_id == *entity_id)
            .filter_map(|assignment| {
                let role = roles.get(&assignment.role_id)?;
                if tenant.is_some_and(|tenant_id| role.tenant_id != *tenant_id) {
                    return None;
                }
                Some(assignment.apply(role))
            })
            .collect();
        // HashMap iteration order is arbitrary; keep results deterministic.
        merged.sort_by_key(|role| role.role_id);
        merged
    }
}

impl RoleRepository for MemoryRoleRepository {
    async fn add_role(&self, payload: NewRole) -> Result<Role, RepositoryError> {
        let role = Role {
            role_id: RoleId::new(),
            tenant_id: payload.tenant_id,
            name: payload.name,
            permissions: payload.permissions,
        };
        self.roles.write().insert(role.role_id, role.clone());
        Ok(role)
    }

    async fn get_role(&self, role_id: &RoleId) -> Result<Option<Role>, RepositoryError> {
        Ok(self.roles.read().get(role_id).cloned())
    }

    async fn get_roles(
        &self,
        tenant_id: &TenantId,
        entity_id: &EntityId,
    ) -> Result<Vec<Role>, RepositoryError> {
        Ok(self.merged_roles_for(entity_id, Some(tenant_id)))
    }

    async fn get_roles_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<Role>, RepositoryError> {
        let mut roles: Vec<Role> = self
            .roles
            .read()
            .values()
            .filter(|role| role.tenant_id == *tenant_id)
            .cloned()
            .collect();
        roles.sort_by_key(|role| role.role_id);
        Ok(roles)
    }

    async fn get_roles_by_entity(
        &self,
        entity_id: &EntityId,
    ) -> Result<Vec<Role>, RepositoryError> {
        Ok(self.merged_roles_for(entity_id, None))
    }

    async fn add_entity(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
        overrides: AssignmentOverrides,
    ) -> Result<EntityAssignment, RepositoryError> {
        if !self.roles.read().contains_key(role_id) {
            return Err(RepositoryError::RoleNotFound(*role_id));
        }
        let assignment = EntityAssignment::with_overrides(*role_id, *entity_id, overrides);
        self.assignments
            .write()
            .insert((*role_id, *entity_id), assignment.clone());
        Ok(assignment)
    }

    async fn set_conditions(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
        conditions: BTreeMap<String, Value>,
    ) -> Result<(), RepositoryError> {
        let mut assignments = self.assignments.write();
        let assignment = assignments.get_mut(&(*role_id, *entity_id)).ok_or(
            RepositoryError::AssignmentNotFound {
                role_id: *role_id,
                entity_id: *entity_id,
            },
        )?;
        assignment.conditions = Some(conditions);
        Ok(())
    }

    async fn set_filters(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
        filters: BTreeMap<String, Vec<String>>,
    ) -> Result<(), RepositoryError> {
        let mut assignments = self.assignments.write();
        let assignment = assignments.get_mut(&(*role_id, *entity_id)).ok_or(
            RepositoryError::AssignmentNotFound {
                role_id: *role_id,
                entity_id: *entity_id,
            },
        )?;
        assignment.filters = Some(filters);
        Ok(())
    }

    async fn del_entity(
        &self,
        role_id: &RoleId,
        entity_id: &EntityId,
    ) -> Result<(), RepositoryError> {
        self.assignments
            .write()
            .remove(&(*role_id, *entity_id))
            .map(|_| ())
            .ok_or(RepositoryError::AssignmentNotFound {
                role_id: *role_id,
                entity_id: *entity_id,
            })
    }

    async fn set_permissions(
        &self,
        role_id: &RoleId,
        operations: Vec<PermissionOp>,
    ) -> Result<RolePermissions, RepositoryError> {
        let mut roles = self.roles.write();
        let role = roles
            .get_mut(role_id)
            .ok_or(RepositoryError::RoleNotFound(*role_id))?;

        for operation in operations {
            match operation {
                PermissionOp::Set {
                    resource,
                    action,
                    grant,
                } => {
                    role.permissions
                        .entry(resource)
                        .or_default()
                        .insert(action, grant);
                }
                PermissionOp::Remove {
                    resource,
                    action: Some(action),
                } => {
                    if let Some(actions) = role.permissions.get_mut(&resource) {
                        actions.remove(&action);
                        if actions.is_empty() {
                            role.permissions.remove(&resource);
                        }
                    }
                }
                PermissionOp::Remove {
                    resource,
                    action: None,
                } => {
                    role.permissions.remove(&resource);
                }
            }
        }

        Ok(role.permissions.clone())
    }
}
