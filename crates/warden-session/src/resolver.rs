//! Token-to-access session resolution.
//!
//! The [`SessionResolver`] ties the subsystems together: verify the
//! presented token, load the entity's merged roles from the repository,
//! and construct an [`Access`] evaluator bound to them. The result is a
//! [`ResolvedSession`] the request handler carries for the rest of the
//! request.

use crate::claims::Claims;
use crate::error::TokenError;
use crate::token::TokenVerifier;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use warden_core::{Access, AccessSchema, Permission, RoleRepository};

/// Resolves presented tokens into access-bound sessions.
///
/// One resolver is built at startup and shared across requests; it holds
/// the verifier, the schema, and the repository handle.
///
/// # Example
///
/// ```no_run
/// use warden_session::{ResolvedSession, SessionResolver, TokenError};
/// use warden_core::RoleRepository;
///
/// async fn authorize<R: RoleRepository>(
///     resolver: &SessionResolver<R>,
///     token: &str,
/// ) -> Result<ResolvedSession, TokenError> {
///     let session = resolver.resolve(token).await?;
///     if !session.has("account", "read", None) {
///         // deny the request
///     }
///     Ok(session)
/// }
/// ```
#[derive(Debug)]
pub struct SessionResolver<R> {
    verifier: TokenVerifier,
    repository: R,
    schema: Arc<AccessSchema>,
}

impl<R: RoleRepository> SessionResolver<R> {
    /// Creates a resolver over a verifier, repository, and schema.
    #[must_use]
    pub fn new(verifier: TokenVerifier, repository: R, schema: Arc<AccessSchema>) -> Self {
        Self {
            verifier,
            repository,
            schema,
        }
    }

    /// Verifies a token and constructs the session's [`Access`].
    ///
    /// # Errors
    ///
    /// Token failures pass through as their own [`TokenError`] variants;
    /// a repository failure surfaces as [`TokenError::Internal`] — the
    /// caller cannot distinguish storage detail and should not.
    pub async fn resolve(&self, token: &str) -> Result<ResolvedSession, TokenError> {
        let claims = self.verifier.verify(token)?;
        let roles = self
            .repository
            .get_roles(&claims.tid, &claims.eid)
            .await
            .map_err(|e| TokenError::Internal(e.to_string()))?;
        debug!(subject = %claims.subject(), roles = roles.len(), "session resolved");
        Ok(ResolvedSession {
            access: Access::new(Arc::clone(&self.schema), roles),
            claims,
        })
    }
}

/// A verified session: the token's claims plus the entity's [`Access`].
///
/// Immutable and request-scoped; drop it when the request ends.
#[derive(Debug, Clone)]
pub struct ResolvedSession {
    claims: Claims,
    access: Access,
}

impl ResolvedSession {
    /// The verified token claims.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The access evaluator bound to this session's roles.
    #[must_use]
    pub fn access(&self) -> &Access {
        &self.access
    }

    /// Shorthand for [`Access::has`].
    #[must_use]
    pub fn has(&self, resource: &str, action: &str, data: Option<&Value>) -> bool {
        self.access.has(resource, action, data)
    }

    /// Shorthand for [`Access::check`].
    #[must_use]
    pub fn check(&self, resource: &str, action: &str, data: Option<&Value>) -> Permission {
        self.access.check(resource, action, data)
    }
}
