//! Signing/verification key import.
//!
//! Key material is imported once per process and cached for its
//! lifetime. The import is lazy and single-flight: the first caller runs
//! the loader and parses the bytes inside a `OnceCell`, concurrent first
//! accesses block on that one initialization, and every later access is
//! a read of the shared, immutable keys. A process never double-imports.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use ed25519_dalek::{SigningKey, VerifyingKey, PUBLIC_KEY_LENGTH, SECRET_KEY_LENGTH};
use once_cell::sync::OnceCell;
use thiserror::Error;

/// Key import failures.
#[derive(Debug, Error)]
pub enum KeyError {
    /// Key bytes were not valid base64.
    #[error("key is not valid base64: {0}")]
    InvalidEncoding(#[from] base64::DecodeError),

    /// Key bytes have the wrong length.
    #[error("key has wrong length: expected {expected} bytes, found {found}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Actual byte length.
        found: usize,
    },

    /// Key bytes do not form a valid Ed25519 key.
    #[error("invalid key material: {0}")]
    InvalidKey(#[from] ed25519_dalek::SignatureError),

    /// The store holds only a public key but signing was requested.
    #[error("key store holds no signing key")]
    NotASigningKey,

    /// The loader could not produce key material.
    #[error("key material unavailable: {0}")]
    Unavailable(String),
}

/// Raw key material produced by a loader.
#[derive(Debug, Clone)]
pub enum KeyMaterial {
    /// An Ed25519 secret seed; yields both signing and verifying keys.
    SigningSeed([u8; SECRET_KEY_LENGTH]),
    /// An Ed25519 public key; yields a verify-only store.
    PublicKey([u8; PUBLIC_KEY_LENGTH]),
}

impl KeyMaterial {
    fn import(self) -> Result<ImportedKeys, KeyError> {
        match self {
            Self::SigningSeed(seed) => {
                let signing = SigningKey::from_bytes(&seed);
                let verifying = signing.verifying_key();
                Ok(ImportedKeys {
                    signing: Some(signing),
                    verifying,
                })
            }
            Self::PublicKey(bytes) => Ok(ImportedKeys {
                signing: None,
                verifying: VerifyingKey::from_bytes(&bytes)?,
            }),
        }
    }
}

/// Imported, immutable key pair shared for the life of the process.
#[derive(Debug, Clone)]
pub(crate) struct ImportedKeys {
    pub(crate) signing: Option<SigningKey>,
    pub(crate) verifying: VerifyingKey,
}

/// Lazily imported, memoized key material.
///
/// Issuers need a [`KeyMaterial::SigningSeed`]; verifiers get by with a
/// [`KeyMaterial::PublicKey`]. Wrap one store in an `Arc` and hand it to
/// both sides when a process issues and verifies.
///
/// # Example
///
/// ```
/// use warden_session::KeyStore;
///
/// let store = KeyStore::from_seed([7u8; 32]);
/// let public = store.public_key_base64().unwrap();
/// let verify_only = KeyStore::from_public_key_base64(public);
/// assert!(verify_only.public_key_base64().is_ok());
/// ```
pub struct KeyStore {
    loader: Box<dyn Fn() -> Result<KeyMaterial, KeyError> + Send + Sync>,
    cell: OnceCell<ImportedKeys>,
}

impl KeyStore {
    /// Creates a store over a signing seed already in memory.
    #[must_use]
    pub fn from_seed(seed: [u8; SECRET_KEY_LENGTH]) -> Self {
        Self::with_loader(move || Ok(KeyMaterial::SigningSeed(seed)))
    }

    /// Creates a store over a base64-encoded signing seed.
    ///
    /// Decoding happens on first use, inside the single-flight import.
    #[must_use]
    pub fn from_seed_base64(encoded: impl Into<String>) -> Self {
        let encoded = encoded.into();
        Self::with_loader(move || {
            Ok(KeyMaterial::SigningSeed(decode_exact::<SECRET_KEY_LENGTH>(
                &encoded,
            )?))
        })
    }

    /// Creates a verify-only store over a base64-encoded public key.
    #[must_use]
    pub fn from_public_key_base64(encoded: impl Into<String>) -> Self {
        let encoded = encoded.into();
        Self::with_loader(move || {
            Ok(KeyMaterial::PublicKey(decode_exact::<PUBLIC_KEY_LENGTH>(
                &encoded,
            )?))
        })
    }

    /// Creates a store over an arbitrary loader (file, KMS, env).
    ///
    /// The loader runs at most once successfully; a failed load is
    /// retried on the next access.
    #[must_use]
    pub fn with_loader<F>(loader: F) -> Self
    where
        F: Fn() -> Result<KeyMaterial, KeyError> + Send + Sync + 'static,
    {
        Self {
            loader: Box::new(loader),
            cell: OnceCell::new(),
        }
    }

    /// The imported keys, running the loader on first access.
    pub(crate) fn imported(&self) -> Result<&ImportedKeys, KeyError> {
        self.cell
            .get_or_try_init(|| (self.loader)().and_then(KeyMaterial::import))
    }

    /// The signing key, if this store was built from a seed.
    pub(crate) fn signing(&self) -> Result<&SigningKey, KeyError> {
        self.imported()?
            .signing
            .as_ref()
            .ok_or(KeyError::NotASigningKey)
    }

    /// The base64-encoded public key, importing on first use.
    ///
    /// # Errors
    ///
    /// Returns the import failure, if any.
    pub fn public_key_base64(&self) -> Result<String, KeyError> {
        Ok(STANDARD.encode(self.imported()?.verifying.as_bytes()))
    }
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("imported", &self.cell.get().is_some())
            .finish_non_exhaustive()
    }
}

fn decode_exact<const N: usize>(encoded: &str) -> Result<[u8; N], KeyError> {
    let bytes = STANDARD.decode(encoded)?;
    let found = bytes.len();
    bytes
        .try_into()
        .map_err(|_| KeyError::InvalidLength {
            expected: N,
            found,
        })
}
