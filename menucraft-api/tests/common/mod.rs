//! Common test utilities for integration tests
//!
//! Builds the full router over an in-memory store and the local identity
//! provider, so the tests need no Redis, Postgres or network.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use menucraft_api::app::{build_router, AppState};
use menucraft_api::config::Config;
use menucraft_shared::auth::local::{LocalAuth, LocalAuthConfig};
use menucraft_shared::auth::IdentityProvider;
use menucraft_shared::models::{NewUser, User};
use menucraft_shared::store::{MemoryStore, SharedStore};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const JWT_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "hunter22";
pub const BASE: &str = "/make-server";

/// A signed-up, logged-in user
pub struct TestUser {
    pub user: User,
    pub token: String,
}

impl TestUser {
    pub fn auth_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub store: MemoryStore,
    pub identity: Arc<LocalAuth>,
    pub user: TestUser,
}

impl TestContext {
    /// Fresh store, fresh provider, one user, default auth settings
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(Config::for_local(JWT_SECRET)).await
    }

    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        let store = MemoryStore::new();
        let shared: SharedStore = Arc::new(store.clone());
        let identity = Arc::new(LocalAuth::new(shared.clone(), LocalAuthConfig::new(JWT_SECRET)));

        let app = build_router(AppState::new(shared, identity.clone(), config));

        let mut ctx = TestContext {
            app,
            store,
            identity,
            user: TestUser {
                user: User {
                    id: String::new(),
                    email: String::new(),
                    user_metadata: Default::default(),
                },
                token: String::new(),
            },
        };
        ctx.user = ctx.create_user("Test Owner").await?;
        Ok(ctx)
    }

    /// Signs up another user directly through the provider
    pub async fn create_user(&self, business_name: &str) -> anyhow::Result<TestUser> {
        let email = format!("test-{}@example.com", Uuid::new_v4());
        let user = self
            .identity
            .sign_up(NewUser {
                email: email.clone(),
                password: PASSWORD.to_string(),
                name: Some("Test User".to_string()),
                business_name: Some(business_name.to_string()),
            })
            .await?;
        let session = self.identity.sign_in_with_password(&email, PASSWORD).await?;

        Ok(TestUser {
            user,
            token: session.access_token,
        })
    }

    /// Sends a request and returns the status and decoded JSON body
    ///
    /// `path` is relative to the base path; `token` is sent as a bearer token.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("{}{}", BASE, path));

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        (status, json)
    }

    /// Request as the default test user
    pub async fn send_as_user(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        self.send(method, path, Some(&self.user.token), body).await
    }

    /// Saves a menu as `token` and returns the response body
    pub async fn save_menu(&self, token: &str, menu: Value) -> Value {
        let (status, body) = self.send(Method::POST, "/menu", Some(token), Some(menu)).await;
        assert_eq!(status, StatusCode::OK, "save failed: {}", body);
        body
    }
}
