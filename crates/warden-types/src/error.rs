//! Unified error interface for Warden.
//!
//! This module provides the [`ErrorCode`] trait for standardized error
//! handling across the Warden crates.
//!
//! # Design
//!
//! All Warden error types should implement [`ErrorCode`] to provide:
//!
//! - **Machine-readable codes**: for programmatic error handling at the
//!   transport boundary (the caller maps codes to HTTP/RPC responses)
//! - **Recoverability info**: for retry logic and user feedback
//!
//! # Example
//!
//! ```
//! use warden_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum MyError {
//!     Expired,
//!     Backend(String),
//! }
//!
//! impl ErrorCode for MyError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Expired => "EXPIRED",
//!             Self::Backend(_) => "INTERNAL_ERROR",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Backend(_))
//!     }
//! }
//!
//! assert_eq!(MyError::Expired.code(), "EXPIRED");
//! ```

/// Unified error code interface for Warden errors.
///
/// # Code Format
///
/// Error codes should be:
///
/// - **UPPER_SNAKE_CASE**: e.g. `"EXPIRED"`, `"INVALID_SIGNATURE"`
/// - **Stable**: codes are an API contract and must not change once defined
///
/// # Recoverability
///
/// An error is recoverable if retrying the same operation can plausibly
/// succeed without caller intervention (transient backend failures).
/// A denied permission or an expired token is not recoverable: the caller
/// must obtain a new token or different grants.
pub trait ErrorCode {
    /// Returns the stable machine-readable code for this error.
    fn code(&self) -> &'static str;

    /// Returns `true` if retrying may succeed without caller intervention.
    fn is_recoverable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Fixed;

    impl ErrorCode for Fixed {
        fn code(&self) -> &'static str {
            "FIXED"
        }
    }

    #[test]
    fn default_is_not_recoverable() {
        assert_eq!(Fixed.code(), "FIXED");
        assert!(!Fixed.is_recoverable());
    }
}
