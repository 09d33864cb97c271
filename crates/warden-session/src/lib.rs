//! Signed sessions for Warden.
//!
//! This crate carries identity from the edge of the system to the
//! permission engine: it issues and verifies compact Ed25519-signed
//! tokens, resolves a verified token into an [`Access`]-bound session,
//! and hosts [`Guard`]s for ad-hoc authorization decisions outside the
//! resource/action model.
//!
//! # Token Lifecycle
//!
//! ```text
//! unissued → signed → (valid | expired | invalid)
//! ```
//!
//! Tokens are never renewed in place; an expired session gets a new
//! token from the issuer.
//!
//! # Crate Architecture
//!
//! ```text
//! warden-types  (IDs, Subject, ErrorCode)
//!     ↑              ↑
//! warden-core    warden-session  ◄── THIS CRATE
//! (Access)       (KeyStore, TokenIssuer/Verifier, SessionResolver, Guard)
//! ```
//!
//! # Data Flow
//!
//! ```text
//! caller → TokenVerifier::verify → RoleRepository::get_roles
//!        → Access::new → ResolvedSession → check()/filter()
//! ```
//!
//! # Design Principles
//!
//! - **Typed failures, never thrown** — verification returns
//!   `Result<_, TokenError>` with stable wire codes
//! - **Import once, share forever** — key material loads through a
//!   single-flight cell; concurrent first use cannot double-import
//! - **Guards fail closed and silent** — bad input, unknown names, and
//!   predicate panics all resolve to `false`
//!
//! [`Access`]: warden_core::Access

pub mod claims;
pub mod error;
pub mod guard;
pub mod keys;
pub mod resolver;
pub mod token;

pub use claims::{Claims, Expiry, ExpiryParseError};
pub use error::TokenError;
pub use guard::{Guard, GuardRegistry};
pub use keys::{KeyError, KeyMaterial, KeyStore};
pub use resolver::{ResolvedSession, SessionResolver};
pub use token::{TokenConfig, TokenIssuer, TokenVerifier};
