//! Compact signed session tokens.
//!
//! A token is three base64url segments over a dot, like a JWS compact
//! serialization: `header.claims.signature`. The header is fixed
//! (`{"alg":"EdDSA","typ":"WDN1"}`), the claims are the flat JSON object
//! of [`Claims`], and the signature is Ed25519 over the ASCII bytes of
//! `header.claims`.
//!
//! Tokens are never renewed in place; when one expires a new one is
//! issued.

use crate::claims::{Claims, Expiry};
use crate::error::TokenError;
use crate::keys::KeyStore;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::Utc;
use ed25519_dalek::{Signature, Signer as _};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;
use warden_types::Subject;

/// Signature algorithm identifier carried in the header.
const ALG: &str = "EdDSA";
/// Token type identifier carried in the header.
const TYP: &str = "WDN1";

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

impl Header {
    fn current() -> Self {
        Self {
            alg: ALG.to_string(),
            typ: TYP.to_string(),
        }
    }
}

/// Issuer and audience a token is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    /// Value of the `iss` claim.
    pub issuer: String,
    /// Value of the `aud` claim.
    pub audience: String,
}

impl TokenConfig {
    /// Creates a config from issuer and audience strings.
    #[must_use]
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }
}

/// Issues signed session tokens.
///
/// # Example
///
/// ```
/// use warden_session::{Expiry, KeyStore, TokenConfig, TokenIssuer, TokenVerifier};
/// use warden_types::{EntityId, Subject, TenantId};
/// use std::collections::BTreeMap;
/// use std::sync::Arc;
///
/// let keys = Arc::new(KeyStore::from_seed([42u8; 32]));
/// let config = TokenConfig::new("warden", "api");
///
/// let issuer = TokenIssuer::new(config.clone(), Arc::clone(&keys));
/// let subject = Subject::new(TenantId::new(), EntityId::new());
/// let token = issuer
///     .issue(subject, BTreeMap::new(), "1 hour".parse().unwrap())
///     .unwrap();
///
/// let verifier = TokenVerifier::new(config, keys);
/// let claims = verifier.verify(&token).unwrap();
/// assert_eq!(claims.subject(), subject);
/// ```
#[derive(Debug)]
pub struct TokenIssuer {
    config: TokenConfig,
    keys: Arc<KeyStore>,
}

impl TokenIssuer {
    /// Creates an issuer over a signing-capable key store.
    #[must_use]
    pub fn new(config: TokenConfig, keys: Arc<KeyStore>) -> Self {
        Self { config, keys }
    }

    /// Builds, signs, and encodes a token for a subject.
    ///
    /// `extra` is the caller-defined session payload carried alongside
    /// the standard claims.
    ///
    /// # Errors
    ///
    /// Fails only on key import problems (first use of a bad store) or
    /// if the store cannot sign.
    pub fn issue(
        &self,
        subject: Subject,
        extra: BTreeMap<String, Value>,
        expiry: Expiry,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            iat: now.timestamp(),
            exp: expiry.resolve(now).timestamp(),
            tid: subject.tenant,
            eid: subject.entity,
            extra,
        };
        self.issue_claims(&claims)
    }

    /// Signs and encodes an explicit claim set.
    ///
    /// Exposed for callers that manage claim construction themselves;
    /// [`issue`](Self::issue) is the usual entry point.
    pub fn issue_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = serde_json::to_vec(&Header::current())
            .map_err(|e| TokenError::Internal(e.to_string()))?;
        let payload =
            serde_json::to_vec(claims).map_err(|e| TokenError::Internal(e.to_string()))?;

        let message = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let signature = self.keys.signing()?.sign(message.as_bytes());
        Ok(format!(
            "{message}.{}",
            URL_SAFE_NO_PAD.encode(signature.to_bytes())
        ))
    }
}

/// Verifies signed session tokens.
///
/// Verification checks, in order: token structure and header, signature,
/// claim shape, issuer, audience, expiry. Every failure is returned as a
/// typed [`TokenError`], never panicked or thrown past the caller.
#[derive(Debug)]
pub struct TokenVerifier {
    config: TokenConfig,
    keys: Arc<KeyStore>,
}

impl TokenVerifier {
    /// Creates a verifier; a verify-only public key store suffices.
    #[must_use]
    pub fn new(config: TokenConfig, keys: Arc<KeyStore>) -> Self {
        Self { config, keys }
    }

    /// Verifies a compact token and returns its claims.
    ///
    /// # Errors
    ///
    /// See [`TokenError`]; the variant's [`code`](warden_types::ErrorCode::code)
    /// is stable for transport-layer mapping.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut parts = token.split('.');
        let (Some(header_b64), Some(payload_b64), Some(signature_b64), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::Malformed("expected three segments".to_string()));
        };

        let header_bytes = URL_SAFE_NO_PAD
            .decode(header_b64)
            .map_err(|e| TokenError::Malformed(format!("header: {e}")))?;
        let header: Header = serde_json::from_slice(&header_bytes)
            .map_err(|e| TokenError::Malformed(format!("header: {e}")))?;
        if header.alg != ALG || header.typ != TYP {
            return Err(TokenError::Malformed(format!(
                "unsupported algorithm or type: {}/{}",
                header.alg, header.typ
            )));
        }

        let signature_bytes = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|e| TokenError::Malformed(format!("signature: {e}")))?;
        let signature = Signature::from_slice(&signature_bytes)
            .map_err(|_| TokenError::InvalidSignature)?;

        let message = format!("{header_b64}.{payload_b64}");
        self.keys
            .imported()?
            .verifying
            .verify_strict(message.as_bytes(), &signature)
            .map_err(|_| {
                debug!("token signature rejected");
                TokenError::InvalidSignature
            })?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| TokenError::Malformed(format!("payload: {e}")))?;
        let claims: Claims =
            serde_json::from_slice(&payload).map_err(TokenError::ClaimsShape)?;

        if claims.iss != self.config.issuer {
            return Err(TokenError::IssuerMismatch {
                expected: self.config.issuer.clone(),
                found: claims.iss,
            });
        }
        if claims.aud != self.config.audience {
            return Err(TokenError::AudienceMismatch {
                expected: self.config.audience.clone(),
                found: claims.aud,
            });
        }
        if Utc::now().timestamp() >= claims.exp {
            return Err(TokenError::Expired {
                expired_at: claims.expires_at(),
            });
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;
    use warden_types::{EntityId, ErrorCode, TenantId};

    fn fixture() -> (TokenIssuer, TokenVerifier, Subject) {
        let keys = Arc::new(KeyStore::from_seed([5u8; 32]));
        let config = TokenConfig::new("warden", "api");
        (
            TokenIssuer::new(config.clone(), Arc::clone(&keys)),
            TokenVerifier::new(config, keys),
            Subject::new(TenantId::new(), EntityId::new()),
        )
    }

    #[test]
    fn round_trip_preserves_claims() {
        let (issuer, verifier, subject) = fixture();
        let extra = BTreeMap::from([("plan".to_string(), json!("pro"))]);
        let token = issuer
            .issue(subject, extra.clone(), Expiry::In(Duration::hours(1)))
            .expect("issue");

        let claims = verifier.verify(&token).expect("verify");
        assert_eq!(claims.subject(), subject);
        assert_eq!(claims.extra, extra);
        assert_eq!(claims.iss, "warden");
        assert_eq!(claims.aud, "api");
    }

    #[test]
    fn expired_token_is_rejected_with_expired() {
        let (issuer, verifier, subject) = fixture();
        let token = issuer
            .issue(
                subject,
                BTreeMap::new(),
                Expiry::At(Utc::now() - Duration::seconds(2)),
            )
            .expect("issue");

        let err = verifier.verify(&token).expect_err("expired");
        assert_eq!(err.code(), "EXPIRED");
    }

    #[test]
    fn tampered_payload_fails_signature() {
        let (issuer, verifier, subject) = fixture();
        let token = issuer
            .issue(subject, BTreeMap::new(), Expiry::In(Duration::hours(1)))
            .expect("issue");

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&Claims {
                iss: "warden".to_string(),
                aud: "api".to_string(),
                iat: Utc::now().timestamp(),
                exp: (Utc::now() + Duration::hours(1)).timestamp(),
                tid: TenantId::new(),
                eid: EntityId::new(),
                extra: BTreeMap::new(),
            })
            .expect("serialize"),
        );
        parts[1] = &forged_payload;
        let forged = parts.join(".");

        let err = verifier.verify(&forged).expect_err("forged");
        assert!(matches!(err, TokenError::InvalidSignature));
    }

    #[test]
    fn wrong_key_fails_signature() {
        let (issuer, _, subject) = fixture();
        let token = issuer
            .issue(subject, BTreeMap::new(), Expiry::In(Duration::hours(1)))
            .expect("issue");

        let other = TokenVerifier::new(
            TokenConfig::new("warden", "api"),
            Arc::new(KeyStore::from_seed([6u8; 32])),
        );
        assert!(matches!(
            other.verify(&token),
            Err(TokenError::InvalidSignature)
        ));
    }

    #[test]
    fn issuer_and_audience_are_enforced() {
        let (issuer, _, subject) = fixture();
        let keys = Arc::new(KeyStore::from_seed([5u8; 32]));
        let token = issuer
            .issue(subject, BTreeMap::new(), Expiry::In(Duration::hours(1)))
            .expect("issue");

        let wrong_issuer =
            TokenVerifier::new(TokenConfig::new("other", "api"), Arc::clone(&keys));
        assert!(matches!(
            wrong_issuer.verify(&token),
            Err(TokenError::IssuerMismatch { .. })
        ));

        let wrong_audience = TokenVerifier::new(TokenConfig::new("warden", "web"), keys);
        assert!(matches!(
            wrong_audience.verify(&token),
            Err(TokenError::AudienceMismatch { .. })
        ));
    }

    #[test]
    fn garbage_is_malformed_not_a_panic() {
        let (_, verifier, _) = fixture();
        for garbage in ["", "a.b", "a.b.c.d", "??.??.??", "a.b.c"] {
            let err = verifier.verify(garbage).expect_err("garbage");
            assert_eq!(err.code(), "INVALID_SIGNATURE", "input: {garbage:?}");
        }
    }

    #[test]
    fn claims_shape_mismatch_has_its_own_code() {
        let keys = Arc::new(KeyStore::from_seed([5u8; 32]));
        let config = TokenConfig::new("warden", "api");
        let verifier = TokenVerifier::new(config, Arc::clone(&keys));

        // Sign a payload that is valid JSON but not a claim set.
        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header::current()).unwrap());
        let payload = URL_SAFE_NO_PAD.encode(br#"{"hello":"world"}"#);
        let message = format!("{header}.{payload}");
        let signature = keys.signing().expect("signing key").sign(message.as_bytes());
        let token = format!("{message}.{}", URL_SAFE_NO_PAD.encode(signature.to_bytes()));

        let err = verifier.verify(&token).expect_err("shape mismatch");
        assert_eq!(err.code(), "SCHEMA_MISMATCH");
    }
}
