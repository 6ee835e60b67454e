/// Redis client wrapper
///
/// Handles:
/// - Connecting through `redis::aio::ConnectionManager` (automatic reconnection)
/// - Connection and command timeouts
/// - Key namespacing so several deployments can share one Redis
/// - Configuration from environment variables
///
/// # Example
///
/// ```no_run
/// use menucraft_shared::redis::client::{RedisClient, RedisConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// assert_eq!(client.namespaced("menu:abc"), "menucraft:menu:abc");
/// # Ok(())
/// # }
/// ```

use redis::aio::ConnectionManager;
use redis::{Client, RedisError};
use serde::{Deserialize, Serialize};
use std::env;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Redis client errors
#[derive(Error, Debug)]
pub enum RedisClientError {
    /// Connection error
    #[error("Redis connection error: {0}")]
    ConnectionError(String),

    /// Command execution error
    #[error("Redis command error: {0}")]
    CommandError(String),

    /// Configuration error
    #[error("Redis configuration error: {0}")]
    ConfigError(String),

    /// Command did not finish in time
    #[error("Redis command timed out after {0}s")]
    Timeout(u64),
}

impl From<RedisError> for RedisClientError {
    fn from(err: RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => {
                RedisClientError::ConnectionError(format!("IO error: {}", err))
            }
            redis::ErrorKind::ResponseError => {
                RedisClientError::CommandError(format!("Response error: {}", err))
            }
            _ => RedisClientError::CommandError(err.to_string()),
        }
    }
}

/// Redis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Redis connection URL
    ///
    /// Format: redis://[username:password@]host:port[/db]
    pub url: String,

    /// Connection timeout in seconds
    pub connection_timeout_secs: u64,

    /// Command timeout in seconds
    pub command_timeout_secs: u64,

    /// Prefix put in front of every key (without the trailing `:`)
    pub key_prefix: String,
}

impl RedisConfig {
    /// Reads `REDIS_*` variables from the process environment (and `.env`)
    ///
    /// See [`RedisConfig::from_lookup`] for the variables and defaults.
    pub fn from_env() -> Result<Self, RedisClientError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any variable source
    ///
    /// - `REDIS_URL`: required
    /// - `REDIS_CONNECTION_TIMEOUT_SECS`: default 5
    /// - `REDIS_COMMAND_TIMEOUT_SECS`: default 10
    /// - `REDIS_KEY_PREFIX`: default `menucraft`
    ///
    /// # Errors
    ///
    /// `ConfigError` if the URL is missing or a timeout is not a number.
    pub fn from_lookup<F>(var: F) -> Result<Self, RedisClientError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secs = |key: &str, default: u64| match var(key) {
            None => Ok(default),
            Some(raw) => raw.trim().parse().map_err(|_| {
                RedisClientError::ConfigError(format!("{} must be a number of seconds", key))
            }),
        };

        let url = var("REDIS_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| RedisClientError::ConfigError("REDIS_URL is required".to_string()))?;

        Ok(Self {
            url,
            connection_timeout_secs: secs("REDIS_CONNECTION_TIMEOUT_SECS", 5)?,
            command_timeout_secs: secs("REDIS_COMMAND_TIMEOUT_SECS", 10)?,
            key_prefix: var("REDIS_KEY_PREFIX").unwrap_or_else(|| "menucraft".to_string()),
        })
    }

    /// Local Redis with default timeouts
    pub fn local() -> Self {
        Self {
            url: "redis://localhost:6379".to_string(),
            connection_timeout_secs: 5,
            command_timeout_secs: 10,
            key_prefix: "menucraft".to_string(),
        }
    }
}

/// Redis client with connection management
///
/// Cheap to clone; clones share the underlying connection manager.
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: Arc<RedisConfig>,
}

impl RedisClient {
    /// Connects to Redis
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid, or if the first connection
    /// cannot be made within the connection timeout.
    pub async fn new(config: RedisConfig) -> Result<Self, RedisClientError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            RedisClientError::ConfigError(format!("Invalid Redis URL: {}", e))
        })?;

        let manager = tokio::time::timeout(
            Duration::from_secs(config.connection_timeout_secs),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| RedisClientError::Timeout(config.connection_timeout_secs))?
        .map_err(|e| {
            RedisClientError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!(
            url = %sanitize_url(&config.url),
            prefix = %config.key_prefix,
            "Redis client connected"
        );

        Ok(Self {
            manager,
            config: Arc::new(config),
        })
    }

    /// Sends PING; `true` on PONG
    pub async fn ping(&self) -> Result<bool, RedisClientError> {
        let mut conn = self.get_connection();
        let pong: String = self
            .with_timeout(redis::cmd("PING").query_async(&mut conn))
            .await?;

        if pong == "PONG" {
            tracing::debug!("Redis health check: PONG received");
            Ok(true)
        } else {
            tracing::warn!("Redis health check: unexpected response: {}", pong);
            Ok(false)
        }
    }

    /// Runs a Redis future under the configured command timeout
    pub async fn with_timeout<T, F>(&self, fut: F) -> Result<T, RedisClientError>
    where
        F: Future<Output = Result<T, RedisError>>,
    {
        let secs = self.config.command_timeout_secs;
        tokio::time::timeout(Duration::from_secs(secs), fut)
            .await
            .map_err(|_| RedisClientError::Timeout(secs))?
            .map_err(RedisClientError::from)
    }

    /// Connection handle; the manager reconnects transparently
    pub fn get_connection(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Applies the key namespace
    pub fn namespaced(&self, key: &str) -> String {
        namespaced(&self.config.key_prefix, key)
    }

    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

fn namespaced(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", prefix, key)
    }
}

/// Replaces `user:password` in a Redis URL with `***:***` for logging
pub fn sanitize_url(url: &str) -> String {
    if let (Some(at_pos), Some(scheme_end)) = (url.find('@'), url.find("://")) {
        let scheme = &url[..scheme_end + 3];
        let host = &url[at_pos + 1..];
        return format!("{}***:***@{}", scheme, host);
    }
    url.to_string()
}
