/// In-process store
///
/// A `HashMap` behind a tokio `RwLock`. Cloning shares the same map, so a
/// test can keep a handle and inspect what the API wrote.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{KvStore, StoreError};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, JsonValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Keys starting with `prefix`, sorted
    pub async fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let entries = self.entries.read().await;
        let mut keys: Vec<String> = entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<JsonValue>>, StoreError> {
        let entries = self.entries.read().await;
        Ok(keys.iter().map(|k| entries.get(k).cloned()).collect())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
