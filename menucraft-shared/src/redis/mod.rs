/// Redis connection management
///
/// Backs [`crate::store::RedisStore`]. The client owns a
/// `redis::aio::ConnectionManager`, which reconnects on its own, and applies
/// the configured command timeout to every call.
///
/// # Example
///
/// ```no_run
/// use menucraft_shared::redis::{RedisClient, RedisConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = RedisConfig::from_env()?;
/// let client = RedisClient::new(config).await?;
///
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

pub mod client;

pub use client::{RedisClient, RedisClientError, RedisConfig};
