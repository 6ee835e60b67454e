/// Postgres-backed store
///
/// One row per key in `kv_store(key TEXT PRIMARY KEY, value JSONB)`, the same
/// flat table shape hosted key-value stores use. Writes are upserts.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use sqlx::PgPool;
use std::collections::HashMap;

use super::{KvStore, StoreError};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(format!("Database error: {}", err))
    }
}

#[async_trait]
impl KvStore for PgStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, key: &str) -> Result<Option<JsonValue>, StoreError> {
        let value: Option<JsonValue> =
            sqlx::query_scalar("SELECT value FROM kv_store WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        tracing::debug!(key, hit = value.is_some(), "postgres get");
        Ok(value)
    }

    async fn set(&self, key: &str, value: JsonValue) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO kv_store (key, value, updated_at) VALUES ($1, $2, NOW())
             ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        tracing::debug!(key, "postgres set");
        Ok(())
    }

    async fn mget(&self, keys: &[String]) -> Result<Vec<Option<JsonValue>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(String, JsonValue)> =
            sqlx::query_as("SELECT key, value FROM kv_store WHERE key = ANY($1)")
                .bind(keys)
                .fetch_all(&self.pool)
                .await?;

        let by_key: HashMap<String, JsonValue> = rows.into_iter().collect();
        Ok(keys.iter().map(|k| by_key.get(k).cloned()).collect())
    }

    async fn del(&self, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<bool, StoreError> {
        Ok(crate::db::pool::health_check(&self.pool).await.is_ok())
    }
}
