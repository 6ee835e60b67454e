/// Postgres plumbing for the `postgres` store backend
///
/// - `pool`: connection pool with a health check
/// - `migrations`: embedded schema migrations (`kv_store` table)

pub mod migrations;
pub mod pool;

pub use migrations::run_migrations;
pub use pool::{create_pool, health_check, DatabaseConfig};
