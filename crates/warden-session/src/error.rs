//! Token verification error types.
//!
//! Every way a token can fail verification maps to one of four stable
//! wire codes — `EXPIRED`, `INVALID_SIGNATURE`, `SCHEMA_MISMATCH`,
//! `INTERNAL_ERROR` — while the enum variants keep enough detail for
//! logs and tests. Verification failures are returned, never thrown
//! across the resolution boundary: the caller always receives a
//! `Result<_, TokenError>`.

use crate::keys::KeyError;
use chrono::{DateTime, Utc};
use thiserror::Error;
use warden_types::ErrorCode;

/// A failed token verification or session resolution.
///
/// Callers match on the variant for diagnostics and report
/// [`code()`](ErrorCode::code) at the transport boundary.
///
/// # Example
///
/// ```
/// use warden_session::TokenError;
/// use warden_types::ErrorCode;
///
/// let err = TokenError::InvalidSignature;
/// assert_eq!(err.code(), "INVALID_SIGNATURE");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's expiration time has passed.
    #[error("token expired at {expired_at}")]
    Expired {
        /// When the token stopped being valid.
        expired_at: DateTime<Utc>,
    },

    /// The signature does not verify against the configured public key.
    #[error("token signature verification failed")]
    InvalidSignature,

    /// The token is not a well-formed compact token (wrong part count,
    /// bad base64, unparseable header, unsupported algorithm).
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token was issued by a different issuer.
    #[error("issuer mismatch: expected '{expected}', found '{found}'")]
    IssuerMismatch {
        /// The issuer this verifier accepts.
        expected: String,
        /// The issuer the token carries.
        found: String,
    },

    /// The token was issued for a different audience.
    #[error("audience mismatch: expected '{expected}', found '{found}'")]
    AudienceMismatch {
        /// The audience this verifier accepts.
        expected: String,
        /// The audience the token carries.
        found: String,
    },

    /// The signed payload does not parse as the expected claim shape.
    #[error("claims do not match the expected session shape: {0}")]
    ClaimsShape(#[source] serde_json::Error),

    /// Key material could not be imported.
    #[error(transparent)]
    Key(#[from] KeyError),

    /// A collaborator failed while resolving the session (e.g. the role
    /// repository was unreachable).
    #[error("internal error during session resolution: {0}")]
    Internal(String),
}

impl ErrorCode for TokenError {
    fn code(&self) -> &'static str {
        match self {
            Self::Expired { .. } => "EXPIRED",
            Self::InvalidSignature
            | Self::Malformed(_)
            | Self::IssuerMismatch { .. }
            | Self::AudienceMismatch { .. } => "INVALID_SIGNATURE",
            Self::ClaimsShape(_) => "SCHEMA_MISMATCH",
            Self::Key(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        let expired = TokenError::Expired {
            expired_at: Utc::now(),
        };
        assert_eq!(expired.code(), "EXPIRED");
        assert_eq!(TokenError::InvalidSignature.code(), "INVALID_SIGNATURE");
        assert_eq!(
            TokenError::Malformed("two parts".to_string()).code(),
            "INVALID_SIGNATURE"
        );
        assert_eq!(
            TokenError::Internal("db down".to_string()).code(),
            "INTERNAL_ERROR"
        );
    }

    #[test]
    fn only_internal_is_recoverable() {
        assert!(TokenError::Internal("x".to_string()).is_recoverable());
        assert!(!TokenError::InvalidSignature.is_recoverable());
        assert!(!TokenError::Expired {
            expired_at: Utc::now()
        }
        .is_recoverable());
    }

    #[test]
    fn mismatch_display_names_both_sides() {
        let err = TokenError::AudienceMismatch {
            expected: "api".to_string(),
            found: "web".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("api"), "got: {msg}");
        assert!(msg.contains("web"), "got: {msg}");
    }
}
