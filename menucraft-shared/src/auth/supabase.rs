//! Supabase Auth (GoTrue) client
//!
//! Talks to the hosted identity service over its REST API. User-facing calls
//! (`token`, `user`, `logout`) go out with the anon key; account creation
//! and lookup by id use the service-role key.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::{IdentityError, IdentityProvider};
use crate::models::{NewUser, Session, User, UserMetadata};

/// Supabase project settings
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    pub url: String,

    /// Public anon key
    pub anon_key: String,

    /// Service-role key (server only)
    pub service_role_key: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// User object as GoTrue returns it
#[derive(Debug, Deserialize)]
struct GoTrueUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

impl From<GoTrueUser> for User {
    fn from(user: GoTrueUser) -> Self {
        User {
            id: user.id,
            email: user.email.unwrap_or_default(),
            user_metadata: user.user_metadata.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: GoTrueUser,
}

impl From<TokenResponse> for Session {
    fn from(token: TokenResponse) -> Self {
        Session {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: token
                .expires_at
                .unwrap_or_else(|| Utc::now().timestamp() + token.expires_in),
            user: token.user.into(),
        }
    }
}

/// GoTrue error bodies use several field names depending on the endpoint
#[derive(Debug, Default, Deserialize)]
struct GoTrueError {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl GoTrueError {
    fn text(&self) -> String {
        self.msg
            .as_ref()
            .or(self.message.as_ref())
            .or(self.error_description.as_ref())
            .or(self.error.as_ref())
            .cloned()
            .unwrap_or_else(|| "Unknown error".to_string())
    }

    fn is_user_exists(&self) -> bool {
        matches!(self.error_code.as_deref(), Some("email_exists" | "user_already_exists"))
            || self.text().contains("already been registered")
    }
}

#[derive(Serialize)]
struct AdminCreateUser<'a> {
    email: &'a str,
    password: &'a str,
    user_metadata: UserMetadata,
    email_confirm: bool,
}

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshGrant<'a> {
    refresh_token: &'a str,
}

/// Which grant an error came from; decides how 4xx is reported
#[derive(Debug, Clone, Copy)]
enum Call {
    SignUp,
    Token,
    UserToken,
    Admin,
}

fn map_error(call: Call, status: StatusCode, body: GoTrueError) -> IdentityError {
    let text = body.text();
    match (call, status) {
        (_, s) if s.is_server_error() => IdentityError::Provider(format!("{}: {}", s, text)),
        (Call::SignUp, _) if body.is_user_exists() => IdentityError::UserExists,
        (Call::SignUp, s) if s.is_client_error() => IdentityError::InvalidInput(text),
        (Call::Token, StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED) => {
            if text.to_lowercase().contains("refresh token") {
                IdentityError::InvalidToken(text)
            } else {
                IdentityError::InvalidCredentials
            }
        }
        (Call::UserToken, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
            if text.to_lowercase().contains("expired") {
                IdentityError::TokenExpired
            } else {
                IdentityError::InvalidToken(text)
            }
        }
        (_, s) => IdentityError::Provider(format!("{}: {}", s, text)),
    }
}

/// GoTrue REST client
#[derive(Clone)]
pub struct SupabaseAuth {
    http: reqwest::Client,
    config: SupabaseConfig,
}

impl SupabaseAuth {
    /// Builds the HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: SupabaseConfig) -> Result<Self, IdentityError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| IdentityError::Provider(format!("HTTP client: {}", e)))?;

        tracing::info!(url = %config.url, "Supabase auth client ready");
        Ok(Self { http, config })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1{}", self.config.url.trim_end_matches('/'), path)
    }

    fn public(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.config.anon_key)
    }

    fn admin(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.service_role_key)
            .bearer_auth(&self.config.service_role_key)
    }

    async fn execute(&self, builder: RequestBuilder) -> Result<Response, IdentityError> {
        builder
            .send()
            .await
            .map_err(|e| IdentityError::Provider(format!("Request failed: {}", e)))
    }

    async fn check(call: Call, response: Response) -> Result<Response, IdentityError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.json::<GoTrueError>().await.unwrap_or_default();
        tracing::debug!(?call, %status, message = %body.text(), "Supabase auth call failed");
        Err(map_error(call, status, body))
    }

    async fn send(&self, call: Call, builder: RequestBuilder) -> Result<Response, IdentityError> {
        let response = self.execute(builder).await?;
        Self::check(call, response).await
    }

    async fn decode<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, IdentityError> {
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::Provider(format!("Unexpected response: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for SupabaseAuth {
    fn name(&self) -> &'static str {
        "supabase"
    }

    async fn sign_up(&self, new_user: NewUser) -> Result<User, IdentityError> {
        let body = AdminCreateUser {
            email: &new_user.email,
            password: &new_user.password,
            user_metadata: new_user.metadata(),
            // No mail server is configured for menu owners
            email_confirm: true,
        };
        let request = self.admin(self.http.post(self.endpoint("/admin/users"))).json(&body);
        let response = self.send(Call::SignUp, request).await?;
        Ok(Self::decode::<GoTrueUser>(response).await?.into())
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let request = self
            .public(self.http.post(self.endpoint("/token?grant_type=password")))
            .json(&PasswordGrant { email, password });
        let response = self.send(Call::Token, request).await?;
        Ok(Self::decode::<TokenResponse>(response).await?.into())
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let request = self
            .public(self.http.post(self.endpoint("/token?grant_type=refresh_token")))
            .json(&RefreshGrant { refresh_token });
        let response = self.send(Call::Token, request).await?;
        Ok(Self::decode::<TokenResponse>(response).await?.into())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let request = self
            .public(self.http.post(self.endpoint("/logout")))
            .bearer_auth(access_token);
        self.send(Call::UserToken, request).await?;
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let request = self
            .public(self.http.get(self.endpoint("/user")))
            .bearer_auth(access_token);
        let response = self.send(Call::UserToken, request).await?;
        Ok(Self::decode::<GoTrueUser>(response).await?.into())
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, IdentityError> {
        let request = self.admin(self.http.get(self.endpoint(&format!("/admin/users/{}", user_id))));
        let response = self.execute(request).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = Self::check(Call::Admin, response).await?;
        Ok(Some(Self::decode::<GoTrueUser>(response).await?.into()))
    }
}
