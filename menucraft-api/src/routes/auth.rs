/// Authentication endpoints
///
/// Thin pass-throughs to the configured identity provider:
///
/// - `POST /signup` - Create an account (admin create, no email confirmation)
/// - `POST /login` - Email and password for a session
/// - `POST /refresh` - Refresh token for a new session
/// - `POST /logout` - End the caller's session (authenticated)

use crate::{
    app::AppState,
    error::{ApiJson, ApiResult},
};
use axum::{extract::State, Extension, Json};
use menucraft_shared::{
    auth::AuthContext,
    models::{NewUser, Session, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Signup request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, max = 72, message = "Password must be 6-72 characters"))]
    pub password: String,

    #[validate(length(max = 200, message = "Name must be at most 200 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 200, message = "Business name must be at most 200 characters"))]
    pub business_name: Option<String>,
}

/// Signup response
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub user: User,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Refresh request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Login and refresh response
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session: Session,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Create an account
///
/// # Endpoint
///
/// ```text
/// POST {base}/signup
/// Content-Type: application/json
///
/// {
///   "email": "owner@example.com",
///   "password": "hunter22",
///   "name": "Ana",
///   "businessName": "Ana's Tacos"
/// }
/// ```
///
/// # Response
///
/// ```json
/// { "user": { "id": "…", "email": "owner@example.com", "userMetadata": { "name": "Ana", "businessName": "Ana's Tacos" } } }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: validation failed or the email is taken
/// - `503 Service Unavailable`: identity provider unreachable
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<Json<SignupResponse>> {
    req.validate()?;

    let user = state
        .identity
        .sign_up(NewUser {
            email: req.email,
            password: req.password,
            name: req.name,
            business_name: req.business_name,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User signed up");
    Ok(Json(SignupResponse { user }))
}

/// Log in with email and password
///
/// # Errors
///
/// - `400 Bad Request`: malformed body
/// - `401 Unauthorized`: wrong email or password
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let session = state
        .identity
        .sign_in_with_password(&req.email, &req.password)
        .await?;

    Ok(Json(SessionResponse { session }))
}

/// Exchange a refresh token for a new session
///
/// # Errors
///
/// - `401 Unauthorized`: refresh token invalid, expired or revoked
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RefreshRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let session = state.identity.refresh_session(&req.refresh_token).await?;
    Ok(Json(SessionResponse { session }))
}

/// End the caller's session
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<LogoutResponse>> {
    state.identity.sign_out(&auth.access_token).await?;

    tracing::info!(user_id = %auth.user.id, "User signed out");
    Ok(Json(LogoutResponse { success: true }))
}
