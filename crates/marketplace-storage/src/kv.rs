//! # Key-Value Store
//!
//! The storage seam the cart persists through. Values are opaque strings;
//! the cart decides what goes in them.

use async_trait::async_trait;

use crate::error::StorageResult;

/// Async string key-value storage.
///
/// Implementations must be safe to share across tasks: the cart reads
/// through one handle at mount and writes through another from its
/// background persistence task.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value stored under `key`, or `None` if there is none.
    async fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Deletes `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> StorageResult<()>;
}
