//! Durable key-value store port
//!
//! Persists opaque serialized state across process restarts. Implementations
//! are provided by the infrastructure layer (file-based, in-memory).

use async_trait::async_trait;

#[async_trait]
pub trait KeyValueStorePort: Send + Sync {
    /// Read the value stored under `key`, `None` if absent.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}

