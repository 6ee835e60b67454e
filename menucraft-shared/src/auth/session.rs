/// Client-side session handling
///
/// [`SessionManager`] keeps the caller's current [`Session`] in a
/// [`SessionStorage`] and hands out access tokens that are good for at least
/// another minute, refreshing through the identity provider when needed.
///
/// # Example
///
/// ```no_run
/// use menucraft_shared::auth::session::{MemorySessionStorage, SessionManager};
/// use menucraft_shared::auth::provider::IdentityProvider;
///
/// # async fn example<P: IdentityProvider>(provider: P) -> Result<(), Box<dyn std::error::Error>> {
/// let manager = SessionManager::new(provider, MemorySessionStorage::default());
/// manager.login("owner@example.com", "hunter22").await?;
///
/// let token = manager.get_valid_token().await?;
/// println!("Authorization: Bearer {}", token);
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use super::provider::{IdentityError, IdentityProvider};
use crate::models::{NewUser, Session, User};

/// Tokens expiring sooner than this are refreshed before use
pub const REFRESH_THRESHOLD_SECS: i64 = 60;

/// Session manager errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Not logged in")]
    NotLoggedIn,

    /// Refresh was attempted and failed; the stored session was cleared
    #[error("Session expired: {0}")]
    Expired(IdentityError),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error("Session storage error: {0}")]
    Storage(String),
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::Storage(err.to_string())
    }
}

/// Where the current session is persisted
#[async_trait]
pub trait SessionStorage: Send + Sync {
    async fn load(&self) -> Result<Option<Session>, SessionError>;

    async fn store(&self, session: &Session) -> Result<(), SessionError>;

    async fn clear(&self) -> Result<(), SessionError>;
}

/// Process-local storage
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStorage {
    inner: Arc<RwLock<Option<Session>>>,
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        Ok(self.inner.read().await.clone())
    }

    async fn store(&self, session: &Session) -> Result<(), SessionError> {
        *self.inner.write().await = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        *self.inner.write().await = None;
        Ok(())
    }
}

/// Session persisted as a JSON file, surviving restarts
#[derive(Debug, Clone)]
pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

#[async_trait]
impl SessionStorage for FileSessionStorage {
    async fn load(&self) -> Result<Option<Session>, SessionError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, session: &Session) -> Result<(), SessionError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(session)?).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), SessionError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Login state on top of an identity provider
pub struct SessionManager<P, S> {
    provider: P,
    storage: S,
}

impl<P, S> SessionManager<P, S>
where
    P: IdentityProvider,
    S: SessionStorage,
{
    pub fn new(provider: P, storage: S) -> Self {
        Self { provider, storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        self.storage.store(&session).await?;
        Ok(session)
    }

    /// Creates the account, then logs in with the same credentials
    pub async fn signup(&self, new_user: NewUser) -> Result<Session, SessionError> {
        let email = new_user.email.clone();
        let password = new_user.password.clone();
        self.provider.sign_up(new_user).await?;
        self.login(&email, &password).await
    }

    /// Ends the provider session and forgets the local one
    ///
    /// The local session is cleared even when the provider call fails.
    pub async fn logout(&self) -> Result<(), SessionError> {
        let Some(session) = self.storage.load().await? else {
            return Ok(());
        };

        let result = self.provider.sign_out(&session.access_token).await;
        self.storage.clear().await?;

        if let Err(e) = result {
            tracing::warn!(error = %e, "Provider sign-out failed");
        }
        Ok(())
    }

    /// Exchanges the stored refresh token for a new session
    pub async fn refresh(&self) -> Result<Session, SessionError> {
        let current = self.storage.load().await?.ok_or(SessionError::NotLoggedIn)?;

        match self.provider.refresh_session(&current.refresh_token).await {
            Ok(session) => {
                self.storage.store(&session).await?;
                Ok(session)
            }
            Err(e) if e.is_auth_failure() => {
                self.storage.clear().await?;
                Err(SessionError::Expired(e))
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn current_user(&self) -> Result<Option<User>, SessionError> {
        Ok(self.storage.load().await?.map(|session| session.user))
    }

    /// Access token valid for at least [`REFRESH_THRESHOLD_SECS`]
    pub async fn get_valid_token(&self) -> Result<String, SessionError> {
        let session = self.storage.load().await?.ok_or(SessionError::NotLoggedIn)?;

        if session.expires_in(Utc::now().timestamp()) >= REFRESH_THRESHOLD_SECS {
            return Ok(session.access_token);
        }

        tracing::debug!(user_id = %session.user.id, "Access token near expiry, refreshing");
        Ok(self.refresh().await?.access_token)
    }
}
