/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use menucraft_api::{app::{build_router, AppState}, config::Config};
/// use menucraft_shared::auth::local::{LocalAuth, LocalAuthConfig};
/// use menucraft_shared::store::{MemoryStore, SharedStore};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let store: SharedStore = Arc::new(MemoryStore::new());
/// let identity = Arc::new(LocalAuth::new(store.clone(), LocalAuthConfig::new("x".repeat(32))));
///
/// let app = build_router(AppState::new(store, identity, config));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{delete, get, post},
    Router,
};
use menucraft_shared::{
    auth::{middleware::create_auth_middleware, IdentityResolver, SharedIdentityProvider},
    menu::MenuRepository,
    store::SharedStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every
/// field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Key-value store backend
    pub store: SharedStore,

    /// Identity provider
    pub identity: SharedIdentityProvider,

    /// Bearer token resolution on top of `identity`
    pub resolver: IdentityResolver,

    /// Menu persistence on top of `store`
    pub menus: MenuRepository,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: SharedStore, identity: SharedIdentityProvider, config: Config) -> Self {
        let resolver = IdentityResolver::new(identity.clone(), config.auth.allow_unverified_fallback);

        Self {
            menus: MenuRepository::new(store.clone()),
            store,
            identity,
            resolver,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /health                          # Health check (public)
/// {base}/health                    # Same, under the base path
/// {base}/signup                    POST (public)
/// {base}/login                     POST (public)
/// {base}/refresh                   POST (public)
/// {base}/logout                    POST (auth)
/// {base}/templates                 GET  (public)
/// {base}/menu                      POST save, GET latest (auth)
/// {base}/menus                     GET  (auth)
/// {base}/menu/:menuId              GET  (auth, owner only)
/// {base}/menu/public/:slug         GET  (public)
/// {base}/menu/item/:itemId         DELETE (auth)
/// ```
///
/// `{base}` is `API_BASE_PATH` (default `/make-server`).
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/templates", get(routes::templates::list_templates))
        .route("/menu/public/:slug", get(routes::menus::get_public_menu));

    let protected_routes = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route(
            "/menu",
            post(routes::menus::save_menu).get(routes::menus::get_latest_menu),
        )
        .route("/menus", get(routes::menus::list_menus))
        .route("/menu/:menu_id", get(routes::menus::get_menu))
        .route("/menu/item/:item_id", delete(routes::menus::delete_menu_item))
        .route_layer(middleware::from_fn(create_auth_middleware(
            state.resolver.clone(),
        )));

    let api_routes = Router::new().merge(public_routes).merge(protected_routes);

    let base_path = state.config.api.base_path.as_str();
    let router = if base_path.is_empty() {
        api_routes
    } else {
        Router::new()
            .route("/health", get(routes::health::health_check))
            .nest(base_path, api_routes)
    };

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}
