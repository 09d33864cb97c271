//! Identifier types for Warden.
//!
//! All identifiers are UUID v4 newtypes. They serialize transparently as
//! UUID strings so they can ride inside token claims and persisted role
//! rows without a wrapper object.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier (UUID v4).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Identifier for a tenant.
    ///
    /// Every [`Role`](https://docs.rs/warden-core) is scoped to exactly one
    /// tenant; tokens carry the tenant the session was issued for.
    ///
    /// # Example
    ///
    /// ```
    /// use warden_types::TenantId;
    ///
    /// let a = TenantId::new();
    /// let b = TenantId::new();
    /// assert_ne!(a, b);
    /// ```
    TenantId
}

uuid_id! {
    /// Identifier for an authenticated entity (a user, service account, or
    /// device) that holds role assignments.
    EntityId
}

uuid_id! {
    /// Identifier for a persisted role.
    RoleId
}
