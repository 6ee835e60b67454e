/// Key-value storage
///
/// Everything MenuCraft persists (menus, their indexes, and local-auth
/// accounts) goes through the [`KvStore`] trait: JSON values under string
/// keys, with `get`, `set`, `mget` and `del`. There are no cross-key
/// transactions.
///
/// # Backends
///
/// - [`MemoryStore`]: process-local map for development and tests
/// - [`RedisStore`]: Redis strings holding JSON
/// - [`PgStore`]: a `kv_store` table in Postgres
///
/// # Example
///
/// ```
/// use menucraft_shared::store::{KvStore, MemoryStore};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryStore::new();
/// store.set("greeting", json!("hello")).await?;
/// assert_eq!(store.get("greeting").await?, Some(json!("hello")));
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;
pub mod redis_store;

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value as JsonValue;
use std::sync::Arc;
use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend unreachable or command failed
    #[error("Store backend error: {0}")]
    Backend(String),

    /// Value could not be encoded or decoded
    #[error("Store serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Shared handle to a store backend
pub type SharedStore = Arc<dyn KvStore>;

/// Minimal key-value contract
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Backend name for logs and health output
    fn name(&self) -> &'static str;

    /// Reads one key
    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError>;

    /// Writes one key, replacing any previous value
    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError>;

    /// Reads several keys; the result lines up with `keys`
    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<JsonValue>>, StoreError>;

    /// Removes one key; removing a missing key is not an error
    async fn del(&self, key: &str) -> Result<(), StoreError>;

    /// Liveness check
    async fn ping(&self) -> Result<bool, StoreError>;
}

/// Reads a key and decodes it into `T`
pub async fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key).await? {
        Some(value) => Ok(Some(serde_json::from_value(value)?)),
        None => Ok(None),
    }
}

/// Encodes `value` and writes it under `key`
pub async fn set_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    store.set(key, serde_json::to_value(value)?).await
}
