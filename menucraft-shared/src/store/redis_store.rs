/// Redis-backed store
///
/// Each key holds a JSON string. Batch reads use `MGET` so listing a user's
/// menus is a single round trip.

use async_trait::async_trait;
use redis::AsyncCommands;
use serde_json::Value as JsonValue;

use super::{KvStore, StoreError};
use crate::redis::{RedisClient, RedisClientError};

#[derive(Clone)]
pub struct RedisStore {
    client: RedisClient,
}

impl RedisStore {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

impl From<RedisClientError> for StoreError {
    fn from(err: RedisClientError) -> Self {
        StoreError::Backend(err.to_string())
    }
}

fn decode(raw: Option<String>) -> Result<Option<JsonValue>, StoreError> {
    raw.map(|s| serde_json::from_str(&s))
        .transpose()
        .map_err(StoreError::from)
}

#[async_trait]
impl KvStore for RedisStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let mut conn = self.client.get_connection();
        let key = self.client.namespaced(key);
        let raw: Option<String> = self.client.with_timeout(conn.get(&key)).await?;
        tracing::debug!(key = %key, hit = raw.is_some(), "redis get");
        decode(raw)
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        let mut conn = self.client.get_connection();
        let key = self.client.namespaced(key);
        let body = serde_json::to_string(&value)?;
        self.client
            .with_timeout(conn.set::<_, _, ()>(&key, body))
            .await?;
        tracing::debug!(key = %key, "redis set");
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<JsonValue>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.client.get_connection();
        let namespaced: Vec<String> = keys.iter().map(|k| self.client.namespaced(k)).collect();

        let raw: Vec<Option<String>> = self
            .client
            .with_timeout(redis::cmd("MGET").arg(&namespaced).query_async(&mut conn))
            .await?;
        tracing::debug!(keys = namespaced.len(), "redis mget");

        raw.into_iter().map(decode).collect()
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        let mut conn = self.client.get_connection();
        let key = self.client.namespaced(key);
        self.client.with_timeout(conn.del::<_, ()>(&key)).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        Ok(self.client.ping().await?)
    }
}
