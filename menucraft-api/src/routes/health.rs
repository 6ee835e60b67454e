/// Health check endpoint
///
/// Reports whether the server is up and its key-value store answers.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// GET {base}/health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "ok",
///   "version": "0.1.0",
///   "store": "connected",
///   "backend": "redis"
/// }
/// ```
///
/// `status` is `degraded` and `store` is `disconnected` when the store ping
/// fails. The status code is 200 either way.

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Store status
    pub store: String,

    /// Store backend name
    pub backend: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connected = match state.store.ping().await {
        Ok(ok) => ok,
        Err(e) => {
            tracing::warn!(error = %e, "Store ping failed");
            false
        }
    };

    Json(HealthResponse {
        status: if connected { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: if connected { "connected" } else { "disconnected" }.to_string(),
        backend: state.store.name().to_string(),
    })
}
