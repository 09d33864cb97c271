//! Permission resolution engine for Warden.
//!
//! This crate answers one question: may this entity perform this action on
//! this resource? It combines role-based grants (RBAC) with per-entity
//! attribute overrides (ABAC) and produces a single verdict plus an
//! optional attribute projection.
//!
//! # Resolution Model
//!
//! ```text
//! Decision = OR over roles ( Always | Validator(data, conditions) )
//! Filter   = union of role filter overrides, else schema filter
//! ```
//!
//! | Piece | Type | Controls |
//! |-------|------|----------|
//! | [`AccessSchema`] | Registry | Which resources/actions exist, their validators and filters |
//! | [`Role`] | Persisted record | What a role currently grants |
//! | [`EntityAssignment`] | Override record | Per-entity narrowing/widening of a role's conditions and filters |
//! | [`Access`] | Evaluator | Merged per-request decision over an entity's roles |
//! | [`Permission`] | Verdict | granted/denied + message, or granted + attribute projection |
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types  (IDs, Subject, ErrorCode)
//!       ↑
//! warden-core   ◄── THIS CRATE
//! (AccessSchema, Grant, Role, EntityAssignment, Access, Permission,
//!  RoleRepository trait + in-memory impl)
//!       ↑
//! warden-session (signed tokens construct Access from verified claims)
//! ```
//!
//! # Design Principles
//!
//! - **Fail closed** — an undeclared resource/action or an absent grant is
//!   a plain `false`, never an error
//! - **Most permissive role wins** — grants OR across roles; filter
//!   overrides union across roles
//! - **Update by replacement** — [`Role`] is immutable; mutation goes
//!   through a consumed-once [`RoleUpdate`] batch and yields a new `Role`
//!
//! # Example
//!
//! ```
//! use warden_core::{Access, AccessSchema, Grant, Role};
//! use warden_types::{RoleId, TenantId};
//! use std::sync::Arc;
//!
//! let schema = Arc::new(AccessSchema::builder().allow("account", "read").build());
//!
//! let mut role = Role::new(RoleId::new(), TenantId::new(), "reader");
//! role.permissions
//!     .entry("account".to_string())
//!     .or_default()
//!     .insert("read".to_string(), Grant::Always);
//!
//! let access = Access::new(schema, vec![role]);
//! assert!(access.has("account", "read", None));
//! assert!(!access.has("account", "create", None));
//! ```

pub mod access;
pub mod assignment;
pub mod grant;
pub mod permission;
pub mod repository;
pub mod role;
pub mod schema;

pub use access::Access;
pub use assignment::{AssignmentOverrides, EntityAssignment};
pub use grant::{Grant, RolePermissions};
pub use permission::Permission;
pub use repository::{MemoryRoleRepository, NewRole, RepositoryError, RoleRepository};
pub use role::{PermissionOp, Role, RoleUpdate};
pub use schema::{AccessSchema, AccessSchemaBuilder, ActionRule, Validator};
