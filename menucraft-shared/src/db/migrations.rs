/// Schema migrations for the Postgres store
///
/// Migration files live in `migrations/` at the workspace root and are
/// embedded at compile time.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Applies any pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails; sqlx rolls that migration back.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
