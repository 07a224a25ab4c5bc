//! SQLite table backend with lazy expiry.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::{SecretStore, StoreError};

/// Relational backend: one row per live secret.
///
/// SQLite has no native TTL, so every row carries its creation time and the
/// read path evaluates `now - creation_date > ttl`. An expired row is removed
/// by whichever read first observes it; until then it occupies storage but is
/// unreadable through this interface.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wrap an existing connection pool. The schema must already exist; see
    /// [`SqliteStore::init`].
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the secrets table if it is not present.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the DDL cannot be executed.
    pub async fn init(pool: &SqlitePool) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS secrets (
                storage_key   TEXT    PRIMARY KEY,
                creation_date INTEGER NOT NULL,
                ttl           INTEGER NOT NULL,
                value         TEXT    NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Open a pool for `url` and initialise the schema.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be opened
    /// or the schema cannot be created.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePool::connect(url).await?;
        Self::init(&pool).await?;
        Ok(Self::new(pool))
    }
}

#[async_trait]
impl SecretStore for SqliteStore {
    async fn put(
        &self,
        storage_key: &str,
        ciphertext: &str,
        ttl_seconds: u64,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT OR REPLACE INTO secrets (storage_key, creation_date, ttl, value)
             VALUES (?, ?, ?, ?)",
        )
        .bind(storage_key)
        .bind(Utc::now().timestamp())
        .bind(ttl_seconds as i64)
        .bind(ciphertext)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_and_consume(&self, storage_key: &str) -> Result<Option<String>, StoreError> {
        let row = sqlx::query_as::<_, (String, i64, i64)>(
            "SELECT value, creation_date, ttl FROM secrets WHERE storage_key = ?",
        )
        .bind(storage_key)
        .fetch_optional(&self.pool)
        .await?;

        let Some((value, creation_date, ttl)) = row else {
            return Ok(None);
        };

        // Read and delete are two statements, not one transaction: two
        // concurrent consumers of the same key can both observe the row
        // before either delete lands. Known property of this backend.
        sqlx::query("DELETE FROM secrets WHERE storage_key = ?")
            .bind(storage_key)
            .execute(&self.pool)
            .await?;

        if Utc::now().timestamp() - creation_date > ttl {
            // Lazy expiry: the stale row is gone now, and the caller sees
            // the same absence as for a key that was never stored.
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn exists(&self, storage_key: &str) -> Result<bool, StoreError> {
        let row = sqlx::query_as::<_, (i64, i64)>(
            "SELECT creation_date, ttl FROM secrets WHERE storage_key = ?",
        )
        .bind(storage_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((creation_date, ttl)) => Utc::now().timestamp() - creation_date <= ttl,
            None => false,
        })
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
