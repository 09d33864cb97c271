//! Roles and the role mutation batch.
//!
//! A [`Role`] is an immutable, tenant-scoped bundle of grants. Mutation
//! never touches a `Role` in place: [`Role::update`] returns a
//! [`RoleUpdate`] builder that accumulates [`PermissionOp`]s in memory and
//! pushes them to the repository in one atomic batch on
//! [`commit`](RoleUpdate::commit), which yields a *new* `Role` reflecting
//! the applied state.

use crate::grant::{Grant, RolePermissions};
use crate::repository::{RepositoryError, RoleRepository};
use serde::{Deserialize, Serialize};
use warden_types::{RoleId, TenantId};

/// A persisted, tenant-scoped bundle of resource/action grants.
///
/// # Immutability
///
/// Roles are immutable value types. All mutation flows through
/// [`update`](Self::update) + [`RoleUpdate::commit`], which returns a new
/// instance — never in-place mutation of a shared object. This enables:
///
/// - Safe sharing across threads and request handlers
/// - Clear audit trails (old role vs new role)
/// - Simple `Clone`, `Serialize`, `Deserialize`
///
/// # Example
///
/// ```
/// use warden_core::Role;
/// use warden_types::{RoleId, TenantId};
///
/// let role = Role::new(RoleId::new(), TenantId::new(), "auditor");
/// assert!(role.permissions.is_empty());
/// assert!(role.grant_for("account", "read").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    /// Stable identifier of this role.
    pub role_id: RoleId,
    /// Tenant the role belongs to.
    pub tenant_id: TenantId,
    /// Human-readable role name, unique per tenant by convention.
    pub name: String,
    /// Current grants, resource → action → [`Grant`].
    pub permissions: RolePermissions,
}

impl Role {
    /// Creates a role with no grants.
    #[must_use]
    pub fn new(role_id: RoleId, tenant_id: TenantId, name: impl Into<String>) -> Self {
        Self {
            role_id,
            tenant_id,
            name: name.into(),
            permissions: RolePermissions::new(),
        }
    }

    /// Looks up this role's grant for a resource/action pair.
    #[must_use]
    pub fn grant_for(&self, resource: &str, action: &str) -> Option<&Grant> {
        self.permissions.get(resource)?.get(action)
    }

    /// Starts an update batch against this role.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use warden_core::{Role, RoleRepository, RepositoryError};
    ///
    /// async fn promote(role: Role, repo: &impl RoleRepository) -> Result<Role, RepositoryError> {
    ///     role.update()
    ///         .grant("account", "read")
    ///         .grant("account", "create")
    ///         .commit(repo)
    ///         .await
    /// }
    /// ```
    #[must_use]
    pub fn update(&self) -> RoleUpdate {
        RoleUpdate {
            role: self.clone(),
            ops: Vec::new(),
        }
    }
}

/// One operation in a role mutation batch.
///
/// Operations apply in submission order; a later `Set` on the same
/// resource/action overwrites an earlier one within the same batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum PermissionOp {
    /// Set (or replace) the grant for a resource/action pair.
    Set {
        /// Resource name.
        resource: String,
        /// Action name.
        action: String,
        /// The grant to record.
        grant: Grant,
    },
    /// Remove one action, or the whole resource when `action` is `None`.
    Remove {
        /// Resource name.
        resource: String,
        /// Action to remove; `None` removes every action for the resource.
        action: Option<String>,
    },
}

/// An in-memory batch of permission operations, consumed by
/// [`commit`](Self::commit).
///
/// The builder is an explicit by-value object: each call takes and
/// returns it, and `commit` consumes it, so a batch can never be
/// committed twice or mutated after submission.
#[derive(Debug)]
#[must_use = "a RoleUpdate does nothing until committed"]
pub struct RoleUpdate {
    role: Role,
    ops: Vec<PermissionOp>,
}

impl RoleUpdate {
    /// Appends an unconditional grant for a resource/action pair.
    pub fn grant(self, resource: impl Into<String>, action: impl Into<String>) -> Self {
        self.grant_with(resource, action, Grant::Always)
    }

    /// Appends a grant with explicit conditions and/or filter.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_core::{Grant, Role};
    /// use warden_types::{RoleId, TenantId};
    /// use serde_json::json;
    ///
    /// let role = Role::new(RoleId::new(), TenantId::new(), "teller");
    /// let update = role.update().grant_with(
    ///     "account",
    ///     "transfer",
    ///     Grant::with_conditions(json!({ "limit": 500 })),
    /// );
    /// assert_eq!(update.ops().len(), 1);
    /// ```
    pub fn grant_with(
        mut self,
        resource: impl Into<String>,
        action: impl Into<String>,
        grant: Grant,
    ) -> Self {
        self.ops.push(PermissionOp::Set {
            resource: resource.into(),
            action: action.into(),
            grant,
        });
        self
    }

    /// Appends a removal of one action's grant.
    pub fn deny(mut self, resource: impl Into<String>, action: impl Into<String>) -> Self {
        self.ops.push(PermissionOp::Remove {
            resource: resource.into(),
            action: Some(action.into()),
        });
        self
    }

    /// Appends a removal of the entire resource entry (all actions).
    pub fn deny_resource(mut self, resource: impl Into<String>) -> Self {
        self.ops.push(PermissionOp::Remove {
            resource: resource.into(),
            action: None,
        });
        self
    }

    /// The accumulated operations, in submission order.
    #[must_use]
    pub fn ops(&self) -> &[PermissionOp] {
        &self.ops
    }

    /// Returns `true` if no operations have been accumulated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sends the batch to the repository and returns the updated role.
    ///
    /// The repository applies the batch atomically per role
    /// (read-modify-write on a single row) and returns the new
    /// permissions mapping; the returned `Role` is a fresh instance —
    /// the original is untouched.
    ///
    /// Concurrent `commit` calls against the same role may race at the
    /// storage layer (last write wins) unless the repository adds its
    /// own locking; this layer does not implement optimistic concurrency
    /// control.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::RoleNotFound`] if the role no longer
    /// exists — mutating a non-existent role is an integration bug, not
    /// an expected runtime condition.
    pub async fn commit<R: RoleRepository>(self, repository: &R) -> Result<Role, RepositoryError> {
        let permissions = repository
            .set_permissions(&self.role.role_id, self.ops)
            .await?;
        Ok(Role {
            permissions,
            ..self.role
        })
    }
}
