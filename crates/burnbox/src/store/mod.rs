//! Secret storage: put-with-expiry, consume-on-read, existence probe.
//!
//! Two backends implement the [`SecretStore`] contract:
//!
//! - [`MemoryStore`]: an expiring key-value cache with native per-entry TTL
//!   and an atomic remove-and-return primitive.
//! - [`SqliteStore`]: a relational table that records the creation timestamp
//!   and computes expiry lazily at read time.
//!
//! The backend is chosen once at startup from the configuration and injected
//! into the service as an `Arc<dyn SecretStore>`; nothing selects a backend
//! per call.
//!
//! # Consume semantics
//!
//! `get_and_consume` is the single-use gate. The cache backend removes and
//! returns in one atomic step. The relational backend reads and then deletes
//! in two statements, so two racing consumers of the same key can in
//! principle both observe the value before either delete lands. That window
//! is a documented property of the relational backend, not something callers
//! may rely on being closed.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use common::ServiceError;

use crate::config::{Config, StoreBackend};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Errors produced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or an operation failed mid-flight.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => ServiceError::Unavailable(msg),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Unavailable(e.to_string())
    }
}

/// Backend-agnostic contract for storing and burning secrets.
///
/// Values are the text-safe sealed representation produced by the cipher
/// layer; the store treats them as opaque strings.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Store `ciphertext` under `storage_key`, readable for the next
    /// `ttl_seconds` and unreadable afterwards. Overwrites any existing
    /// record at the same key.
    async fn put(
        &self,
        storage_key: &str,
        ciphertext: &str,
        ttl_seconds: u64,
    ) -> Result<(), StoreError>;

    /// Return the stored ciphertext and destroy the record, or `None` when
    /// the key was never stored, was already consumed, or has expired.
    async fn get_and_consume(&self, storage_key: &str) -> Result<Option<String>, StoreError>;

    /// Report whether a live (unexpired, unconsumed) record exists under
    /// `storage_key`, without consuming it.
    async fn exists(&self, storage_key: &str) -> Result<bool, StoreError>;

    /// Probe backend liveness.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Build the store selected by `cfg.store_backend`.
///
/// For the sqlite backend this opens the pool and creates the schema.
///
/// # Errors
///
/// Returns [`StoreError::Unavailable`] if the sqlite database cannot be
/// opened or initialised.
pub async fn connect(cfg: &Config) -> Result<Arc<dyn SecretStore>, StoreError> {
    match cfg.store_backend {
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new(&cfg.store_prefix))),
        StoreBackend::Sqlite => {
            let store = SqliteStore::connect(&cfg.database_url).await?;
            Ok(Arc::new(store))
        }
    }
}
