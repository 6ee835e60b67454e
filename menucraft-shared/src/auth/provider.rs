/// Identity provider seam
///
/// MenuCraft never owns credentials itself; accounts, passwords and
/// sessions belong to an identity provider. The API only needs the handful
/// of calls in [`IdentityProvider`].
///
/// Implementations:
/// - [`crate::auth::supabase::SupabaseAuth`]: hosted GoTrue over HTTPS
/// - [`crate::auth::local::LocalAuth`]: self-contained, for development and tests

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::models::{NewUser, Session, User};
use crate::store::StoreError;

/// Identity provider errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Email/password pair rejected
    #[error("Invalid login credentials")]
    InvalidCredentials,

    /// Token rejected by the provider
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token is past its expiry
    #[error("Token has expired")]
    TokenExpired,

    /// Signup for an email that already has an account
    #[error("A user with this email address has already been registered")]
    UserExists,

    /// Signup data rejected
    #[error("Invalid signup data: {0}")]
    InvalidInput(String),

    /// Provider unreachable or answered unexpectedly
    #[error("Identity provider error: {0}")]
    Provider(String),

    /// Local account storage failed
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IdentityError {
    /// Whether the caller should be told 401 rather than 5xx
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            IdentityError::InvalidCredentials
                | IdentityError::InvalidToken(_)
                | IdentityError::TokenExpired
        )
    }
}

/// Shared handle to a provider
pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;

/// Calls MenuCraft makes against its identity provider
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// Creates a confirmed account (admin operation)
    async fn sign_up(&self, new_user: NewUser) -> Result<User, IdentityError>;

    /// Exchanges email and password for a session
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError>;

    /// Exchanges a refresh token for a new session
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError>;

    /// Ends the session the access token belongs to
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;

    /// Token introspection: the user an access token belongs to
    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError>;

    /// Admin lookup by id; `None` if no such user
    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, IdentityError>;
}
