//! # MenuCraft API Server
//!
//! Serves the menu builder's back end: signup and session endpoints,
//! authenticated menu save and lookup, and public menu pages by slug.
//!
//! ## Usage
//!
//! ```bash
//! STORE_BACKEND=memory JWT_SECRET=$(openssl rand -hex 32) cargo run -p menucraft-api
//! ```

use anyhow::Context;
use menucraft_api::{
    app::{build_router, AppState},
    config::{AuthProviderConfig, Config, StoreConfig},
};
use menucraft_shared::{
    auth::{
        local::{LocalAuth, LocalAuthConfig},
        supabase::SupabaseAuth,
        SharedIdentityProvider,
    },
    db,
    redis::{client::sanitize_url, RedisClient},
    store::{MemoryStore, PgStore, RedisStore, SharedStore},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "menucraft_api=debug,menucraft_shared=debug,tower_http=debug".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn connect_store(config: &StoreConfig) -> anyhow::Result<SharedStore> {
    let store: SharedStore = match config {
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
        StoreConfig::Redis(redis) => {
            tracing::info!(url = %sanitize_url(&redis.url), "Connecting to Redis");
            let client = RedisClient::new(redis.clone())
                .await
                .context("Failed to connect to Redis")?;
            Arc::new(RedisStore::new(client))
        }
        StoreConfig::Postgres(database) => {
            let pool = db::create_pool(database.clone())
                .await
                .context("Failed to connect to Postgres")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            Arc::new(PgStore::new(pool))
        }
    };

    tracing::info!(backend = store.name(), "Store ready");
    Ok(store)
}

fn identity_provider(
    config: &AuthProviderConfig,
    store: &SharedStore,
) -> anyhow::Result<SharedIdentityProvider> {
    let provider: SharedIdentityProvider = match config {
        AuthProviderConfig::Local { jwt_secret } => Arc::new(LocalAuth::new(
            store.clone(),
            LocalAuthConfig::new(jwt_secret.clone()),
        )),
        AuthProviderConfig::Supabase(supabase) => Arc::new(
            SupabaseAuth::new(supabase.clone()).context("Failed to build Supabase client")?,
        ),
    };

    tracing::info!(provider = provider.name(), "Identity provider ready");
    Ok(provider)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();

    tracing::info!(
        "MenuCraft API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let store = connect_store(&config.store).await?;
    let identity = identity_provider(&config.auth.provider, &store)?;

    if config.auth.allow_unverified_fallback {
        tracing::warn!("Unverified token payload fallback is enabled");
    }

    let bind_address = config.bind_address();
    let base_path = config.api.base_path.clone();
    let app = build_router(AppState::new(store, identity, config));

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}{}", bind_address, base_path);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}
