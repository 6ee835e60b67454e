/// Authentication middleware for Axum
///
/// Extracts the bearer token from the `Authorization` header, resolves it to
/// a user through an [`IdentityResolver`] and adds an [`AuthContext`] to the
/// request extensions.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use menucraft_shared::auth::middleware::{create_auth_middleware, AuthContext};
/// use menucraft_shared::auth::resolve::IdentityResolver;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}!", auth.user.email)
/// }
///
/// fn app(resolver: IdentityResolver) -> Router {
///     Router::new()
///         .route("/protected", get(handler))
///         .layer(middleware::from_fn(create_auth_middleware(resolver)))
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::provider::IdentityError;
use super::resolve::IdentityResolver;
use crate::models::User;

/// Authentication context added to request extensions
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// The resolved user
    pub user: User,

    /// Bearer token the request carried
    pub access_token: String,
}

impl AuthContext {
    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

/// Authentication errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingCredentials,

    #[error("Invalid authorization header: {0}")]
    InvalidFormat(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),
}

impl From<IdentityError> for AuthError {
    fn from(err: IdentityError) -> Self {
        if err.is_auth_failure() {
            AuthError::InvalidToken(err.to_string())
        } else {
            AuthError::Unavailable(err.to_string())
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AuthError::MissingCredentials | AuthError::InvalidFormat(_) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string())
            }
            AuthError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", "Unauthorized".to_string())
            }
            AuthError::Unavailable(msg) => {
                tracing::error!(error = %msg, "Identity resolution failed");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "service_unavailable",
                    "Identity provider unavailable".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": error, "message": message }))).into_response()
    }
}

/// Reads the token out of `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AuthError::InvalidFormat("Expected Bearer token".to_string()));
    }

    let token = token.trim();
    if token.is_empty() {
        return Err(AuthError::MissingCredentials);
    }
    Ok(token)
}

/// Resolves the request's bearer token into an [`AuthContext`]
pub async fn authenticate(
    resolver: &IdentityResolver,
    headers: &HeaderMap,
) -> Result<AuthContext, AuthError> {
    let token = bearer_token(headers)?;
    let user = resolver.resolve(token).await?;

    Ok(AuthContext {
        user,
        access_token: token.to_string(),
    })
}

/// Bearer authentication middleware
///
/// # Errors
///
/// 401 when the header is missing, malformed, or the token is rejected;
/// 503 when the identity provider could not be reached.
pub async fn auth_middleware(
    resolver: IdentityResolver,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let context = authenticate(&resolver, req.headers()).await?;

    tracing::debug!(user_id = %context.user.id, "Request authenticated");
    req.extensions_mut().insert(context);

    Ok(next.run(req).await)
}

/// Creates an authentication middleware closure for `middleware::from_fn`
pub fn create_auth_middleware(
    resolver: IdentityResolver,
) -> impl Fn(Request, Next) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>> + Clone {
    move |req, next| {
        let resolver = resolver.clone();
        Box::pin(auth_middleware(resolver, req, next))
    }
}
