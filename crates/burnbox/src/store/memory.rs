//! In-process expiring key-value cache backend.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::Expiry;

use super::{SecretStore, StoreError};

/// One cached secret: the sealed payload plus its expiry bookkeeping.
#[derive(Clone)]
struct CacheEntry {
    ciphertext: String,
    stored_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    /// Same predicate as the relational backend: a record is expired once
    /// strictly more than its TTL has elapsed since it was stored.
    fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.stored_at) > self.ttl
    }
}

/// Per-entry TTL policy: each entry expires its own `ttl` after insertion.
struct EntryTtl;

impl Expiry<String, CacheEntry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    /// An overwrite re-arms expiry from the new entry's `ttl`; the replaced
    /// entry's remaining deadline does not carry over.
    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheEntry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Expiring key-value cache backend.
///
/// The cache evicts entries itself once their TTL elapses, and its
/// remove-and-return primitive makes `get_and_consume` atomic: of any number
/// of concurrent consumers of one key, exactly one observes the value.
/// Eviction runs lazily in the cache, so reads additionally apply
/// [`CacheEntry::is_expired`] to keep expiry exact from the caller's point
/// of view.
///
/// Physical keys carry a configurable namespace prefix; tokens only ever
/// contain the bare storage key.
pub struct MemoryStore {
    cache: Cache<String, CacheEntry>,
    prefix: String,
}

impl MemoryStore {
    /// Create an empty store whose physical keys start with `prefix`.
    pub fn new(prefix: &str) -> Self {
        Self {
            cache: Cache::builder().expire_after(EntryTtl).build(),
            prefix: prefix.to_owned(),
        }
    }

    fn physical_key(&self, storage_key: &str) -> String {
        format!("{}{}", self.prefix, storage_key)
    }
}

#[async_trait]
impl SecretStore for MemoryStore {
    async fn put(
        &self,
        storage_key: &str,
        ciphertext: &str,
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        let entry = CacheEntry {
            ciphertext: ciphertext.to_owned(),
            stored_at: Instant::now(),
            ttl: Duration::from_secs(ttl_seconds),
        };
        self.cache.insert(self.physical_key(storage_key), entry).await;
        Ok(())
    }

    async fn get_and_consume(&self, storage_key: &str) -> Result<Option<String>, StoreError> {
        let removed = self.cache.remove(&self.physical_key(storage_key)).await;
        Ok(removed
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.ciphertext))
    }

    async fn exists(&self, storage_key: &str) -> Result<bool, StoreError> {
        let entry = self.cache.get(&self.physical_key(storage_key)).await;
        Ok(entry.is_some_and(|e| !e.is_expired(Instant::now())))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        // The cache lives in-process; if we are running, it is reachable.
        Ok(())
    }
}
