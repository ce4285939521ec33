//! # Key-Value Repository
//!
//! Reads and writes rows of the `kv_store` table.
//!
//! ```text
//! kv_store
//! ┌──────────────────────────────┬──────────────────┬─────────────────────┐
//! │ key (PK)                     │ value            │ updated_at          │
//! ├──────────────────────────────┼──────────────────┼─────────────────────┤
//! │ @GoMarketplace:productsData  │ [{"id":"1",…}]   │ 2026-10-18 09:46:00 │
//! └──────────────────────────────┴──────────────────┴─────────────────────┘
//! ```

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::StorageResult;

/// Repository for the `kv_store` table.
#[derive(Debug, Clone)]
pub struct KeyValueRepository {
    pool: SqlitePool,
}

impl KeyValueRepository {
    /// Creates a new KeyValueRepository.
    pub fn new(pool: SqlitePool) -> Self {
        KeyValueRepository { pool }
    }

    /// Gets the value stored under `key`.
    pub async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM kv_store WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        debug!(key = %key, found = value.is_some(), "kv get");
        Ok(value)
    }

    /// Inserts or replaces the value stored under `key`.
    pub async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at)
            VALUES (?1, ?2, CURRENT_TIMESTAMP)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        debug!(key = %key, bytes = value.len(), "kv set");
        Ok(())
    }

    /// Deletes the row for `key`, if any.
    pub async fn remove(&self, key: &str) -> StorageResult<()> {
        let result = sqlx::query("DELETE FROM kv_store WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        debug!(key = %key, removed = result.rows_affected(), "kv remove");
        Ok(())
    }
}
