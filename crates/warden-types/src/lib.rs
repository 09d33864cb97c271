//! Core types for Warden.
//!
//! This crate provides the foundational identifier types for the Warden
//! access-control engine. It sits at the bottom of the dependency graph:
//!
//! ```text
//! warden-types    : IDs, Subject, ErrorCode          ◄── THIS CRATE
//!     ↑
//! warden-core     : schema, Role, Access, Permission
//!     ↑
//! warden-session  : signed tokens, guards, session resolution
//! ```
//!
//! # Identifier Design
//!
//! All identifiers are UUID-based for:
//!
//! - **Network compatibility**: safe to transmit across processes/machines
//! - **Multi-tenancy**: globally unique without coordination
//! - **Serialization**: first-class serde support (transparent, as strings)
//!
//! # Example
//!
//! ```
//! use warden_types::{TenantId, EntityId, Subject};
//!
//! let tenant = TenantId::new();
//! let entity = EntityId::new();
//! let subject = Subject::new(tenant, entity);
//!
//! assert_eq!(subject.tenant, tenant);
//! ```

pub mod error;
pub mod id;
pub mod subject;

pub use error::ErrorCode;
pub use id::{EntityId, RoleId, TenantId};
pub use subject::Subject;
