//! Secret service: orchestrates the cipher, token codec, and store.
//!
//! # Lifecycle of a secret
//!
//! 1. [`SecretService::store`] encrypts the payload under a fresh key,
//!    persists the sealed text under a fresh storage key, and returns
//!    `storage_key~decryption_key`.
//! 2. [`SecretService::reveal`] decodes the token, consumes the stored
//!    record (the burn), and decrypts with the token's key.
//!
//! The record is consumed by the first reveal that reaches the store,
//! whether or not decryption afterwards succeeds. Absence has one shape:
//! an unknown, consumed, or expired token reads exactly like a record whose
//! key part fails to parse or decrypt. Callers cannot tell these cases
//! apart.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use common::ServiceError;

use crate::crypto::cipher::{self, CipherKey, SealedSecret};
use crate::store::SecretStore;
use crate::token;

/// TTL applied when the caller does not supply one: one week.
pub const DEFAULT_TTL_SECONDS: u64 = 604_800;

/// Upper bound on caller-supplied TTLs: four weeks.
pub const MAX_TTL_SECONDS: u64 = 2_419_200;

/// Stateless orchestrator over an injected store.
///
/// Holds no secret state of its own; everything lives behind the store
/// handle, so the service is cheap to share across request handlers.
pub struct SecretService {
    store: Arc<dyn SecretStore>,
}

impl SecretService {
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self { store }
    }

    /// Encrypt and persist `plaintext` for `ttl_seconds`, returning the
    /// token that reveals it.
    ///
    /// Bounds checking here is defensive; the HTTP layer rejects bad input
    /// with specific messages before this point.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Validation`] for an empty payload or a TTL outside
    /// `[1, MAX_TTL_SECONDS]`; [`ServiceError::Unavailable`] when the store
    /// cannot be reached. There are no retries, and a store failure leaves
    /// nothing behind: persistence is the final step.
    pub async fn store(&self, plaintext: &str, ttl_seconds: u64) -> Result<String, ServiceError> {
        if plaintext.is_empty() {
            return Err(ServiceError::Validation("secret must not be empty".into()));
        }
        if ttl_seconds == 0 || ttl_seconds > MAX_TTL_SECONDS {
            return Err(ServiceError::Validation(format!(
                "ttl must be between 1 and {MAX_TTL_SECONDS} seconds"
            )));
        }

        let storage_key = new_storage_key();
        let (sealed, key) = cipher::encrypt(plaintext.as_bytes())
            .map_err(|e| ServiceError::Internal(format!("encryption failed: {e}")))?;

        self.store
            .put(&storage_key, &sealed.to_string_repr(), ttl_seconds)
            .await?;

        debug!(storage_key = %storage_key, ttl_seconds, "secret stored");
        Ok(token::encode(&storage_key, Some(&key.encode())))
    }

    /// Redeem a token: burn the stored record and return the plaintext.
    ///
    /// `Ok(None)` covers every unredeemable case: unknown, consumed, or
    /// expired token, plus any key-parse or decryption failure. The store
    /// lookup itself consumes the record, so even a reveal that fails to
    /// decrypt has burned the secret.
    ///
    /// # Errors
    ///
    /// Only [`ServiceError::Unavailable`], when the store cannot be reached.
    /// Store failure is not absence and is reported as such.
    pub async fn reveal(&self, token_str: &str) -> Result<Option<String>, ServiceError> {
        let (storage_key, key_part) = token::decode(token_str);

        let Some(stored) = self.store.get_and_consume(storage_key).await? else {
            debug!(storage_key = %storage_key, "reveal found no live record");
            return Ok(None);
        };

        match key_part {
            // A token without a key part belongs to a record stored without
            // service-side encryption; hand the value back untouched.
            None => Ok(Some(stored)),
            Some(part) => {
                let opened = open_sealed(&stored, part);
                if opened.is_none() {
                    warn!(storage_key = %storage_key, "reveal burned a record it could not decrypt");
                }
                Ok(opened)
            }
        }
    }

    /// Report whether the token still refers to a live secret, without
    /// consuming it.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unavailable`] when the store cannot be reached.
    pub async fn preview(&self, token_str: &str) -> Result<bool, ServiceError> {
        let (storage_key, _) = token::decode(token_str);
        Ok(self.store.exists(storage_key).await?)
    }

    /// Probe the backing store.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Unavailable`] when the probe fails.
    pub async fn ping(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}

/// Fresh random storage key: 32 lowercase hex characters.
fn new_storage_key() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Open a stored sealed value with the token's key part.
///
/// Any failure (undecodable key, malformed sealed text, failed
/// authentication, non-UTF-8 plaintext) collapses to `None`, so the caller
/// sees the same absence as for an unknown token.
fn open_sealed(stored: &str, key_part: &str) -> Option<String> {
    let key = CipherKey::decode(key_part).ok()?;
    let sealed = SealedSecret::from_string_repr(stored).ok()?;
    let plaintext = cipher::decrypt(&sealed, &key).ok()?;
    String::from_utf8(plaintext).ok()
}
