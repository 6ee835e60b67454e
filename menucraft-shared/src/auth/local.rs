/// Self-contained identity provider
///
/// Keeps accounts in the same [`KvStore`] as the menus, hashes passwords
/// with Argon2id and issues HS256 JWT sessions. Meant for development,
/// self-hosting and tests; production deployments normally point at a
/// hosted provider instead.
///
/// # Storage
///
/// ```text
/// auth_user:{id}       account record (user, password hash, session version)
/// auth_email:{email}   id of the account registered with that email
/// ```
///
/// Signing out bumps the account's session version, which invalidates every
/// access and refresh token issued before.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{self, Claims, JwtError, TokenType};
use super::password;
use super::provider::{IdentityError, IdentityProvider};
use crate::models::{NewUser, Session, User};
use crate::store::{get_json, set_json, SharedStore};

/// Local provider settings
#[derive(Debug, Clone)]
pub struct LocalAuthConfig {
    /// HS256 signing secret (at least 32 bytes)
    pub jwt_secret: String,

    /// Access token lifetime
    pub access_ttl: Duration,

    /// Refresh token lifetime
    pub refresh_ttl: Duration,
}

impl LocalAuthConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl: Duration::hours(1),
            refresh_ttl: Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    user: User,
    password_hash: String,
    session_version: u32,
    created_at: DateTime<Utc>,
}

fn user_key(id: &str) -> String {
    format!("auth_user:{}", id)
}

fn email_key(email: &str) -> String {
    format!("auth_email:{}", email)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl From<JwtError> for IdentityError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => IdentityError::TokenExpired,
            JwtError::CreateError(msg) => IdentityError::Provider(msg),
            other => IdentityError::InvalidToken(other.to_string()),
        }
    }
}

impl From<password::PasswordError> for IdentityError {
    fn from(err: password::PasswordError) -> Self {
        IdentityError::Provider(err.to_string())
    }
}

/// In-process identity provider
#[derive(Clone)]
pub struct LocalAuth {
    store: SharedStore,
    config: LocalAuthConfig,
}

impl LocalAuth {
    pub fn new(store: SharedStore, config: LocalAuthConfig) -> Self {
        Self { store, config }
    }

    async fn load(&self, user_id: &str) -> Result<Option<Account>, IdentityError> {
        Ok(get_json(self.store.as_ref(), &user_key(user_id)).await?)
    }

    async fn save(&self, account: &Account) -> Result<(), IdentityError> {
        Ok(set_json(self.store.as_ref(), &user_key(&account.user.id), account).await?)
    }

    fn issue_session(&self, account: &Account) -> Result<Session, IdentityError> {
        let user = &account.user;
        let access = Claims::new(
            &user.id,
            &user.email,
            account.session_version,
            TokenType::Access,
            self.config.access_ttl,
        );
        let refresh = Claims::new(
            &user.id,
            &user.email,
            account.session_version,
            TokenType::Refresh,
            self.config.refresh_ttl,
        );

        Ok(Session {
            access_token: jwt::create_token(&access, &self.config.jwt_secret)?,
            refresh_token: jwt::create_token(&refresh, &self.config.jwt_secret)?,
            expires_at: access.exp,
            user: user.clone(),
        })
    }

    /// Loads the account a validated token names and checks it is current
    async fn account_for(&self, claims: &Claims) -> Result<Account, IdentityError> {
        let account = self
            .load(&claims.sub)
            .await?
            .ok_or_else(|| IdentityError::InvalidToken("User no longer exists".to_string()))?;

        if account.session_version != claims.ver {
            return Err(IdentityError::InvalidToken("Session has been revoked".to_string()));
        }
        Ok(account)
    }
}

#[async_trait]
impl IdentityProvider for LocalAuth {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn sign_up(&self, new_user: NewUser) -> Result<User, IdentityError> {
        let email = normalize_email(&new_user.email);
        if !email.contains('@') {
            return Err(IdentityError::InvalidInput("Invalid email address".to_string()));
        }
        password::validate_password(&new_user.password).map_err(IdentityError::InvalidInput)?;

        let taken: Option<String> = get_json(self.store.as_ref(), &email_key(&email)).await?;
        if taken.is_some() {
            return Err(IdentityError::UserExists);
        }

        let account = Account {
            user: User {
                id: Uuid::new_v4().to_string(),
                email: email.clone(),
                user_metadata: new_user.metadata(),
            },
            password_hash: password::hash_password(&new_user.password)?,
            session_version: 0,
            created_at: Utc::now(),
        };

        // Account first: a dangling account without its email index is invisible
        self.save(&account).await?;
        set_json(self.store.as_ref(), &email_key(&email), &account.user.id).await?;

        tracing::info!(user_id = %account.user.id, "Local account created");
        Ok(account.user)
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, IdentityError> {
        let email = normalize_email(email);
        let user_id: Option<String> = get_json(self.store.as_ref(), &email_key(&email)).await?;
        let account = match user_id {
            Some(id) => self.load(&id).await?,
            None => None,
        }
        .ok_or(IdentityError::InvalidCredentials)?;

        if !password::verify_password(password, &account.password_hash)? {
            return Err(IdentityError::InvalidCredentials);
        }

        self.issue_session(&account)
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let claims = jwt::validate_refresh_token(refresh_token, &self.config.jwt_secret)?;
        let account = self.account_for(&claims).await?;
        self.issue_session(&account)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let claims = jwt::validate_access_token(access_token, &self.config.jwt_secret)?;
        let mut account = self.account_for(&claims).await?;

        account.session_version = account.session_version.wrapping_add(1);
        self.save(&account).await?;

        tracing::info!(user_id = %account.user.id, "Local sessions revoked");
        Ok(())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let claims = jwt::validate_access_token(access_token, &self.config.jwt_secret)?;
        Ok(self.account_for(&claims).await?.user)
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<Option<User>, IdentityError> {
        Ok(self.load(user_id).await?.map(|account| account.user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    const SECRET: &str = "local-auth-test-secret-32-bytes-min";

    fn provider() -> LocalAuth {
        LocalAuth::new(Arc::new(MemoryStore::new()), LocalAuthConfig::new(SECRET))
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password: "hunter22".to_string(),
            name: Some("Ana".to_string()),
            business_name: Some("Ana's Tacos".to_string()),
        }
    }

    #[tokio::test]
    async fn test_sign_up_and_sign_in() {
        let auth = provider();
        let user = auth.sign_up(new_user("Ana@Example.com ")).await.unwrap();
        assert_eq!(user.email, "ana@example.com");
        assert_eq!(user.user_metadata.business_name.as_deref(), Some("Ana's Tacos"));

        let session = auth
            .sign_in_with_password("ana@example.com", "hunter22")
            .await
            .unwrap();
        assert_eq!(session.user.id, user.id);

        let me = auth.get_user(&session.access_token).await.unwrap();
        assert_eq!(me, user);
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected() {
        let auth = provider();
        auth.sign_up(new_user("ana@example.com")).await.unwrap();
        let result = auth.sign_up(new_user("ANA@example.com")).await;
        assert!(matches!(result, Err(IdentityError::UserExists)));
    }

    #[tokio::test]
    async fn test_sign_up_validates_input() {
        let auth = provider();
        assert!(matches!(
            auth.sign_up(new_user("not-an-email")).await,
            Err(IdentityError::InvalidInput(_))
        ));

        let mut short = new_user("ana@example.com");
        short.password = "123".to_string();
        assert!(matches!(auth.sign_up(short).await, Err(IdentityError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_email() {
        let auth = provider();
        auth.sign_up(new_user("ana@example.com")).await.unwrap();

        assert!(matches!(
            auth.sign_in_with_password("ana@example.com", "nope").await,
            Err(IdentityError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.sign_in_with_password("bob@example.com", "hunter22").await,
            Err(IdentityError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_refresh_session() {
        let auth = provider();
        auth.sign_up(new_user("ana@example.com")).await.unwrap();
        let session = auth
            .sign_in_with_password("ana@example.com", "hunter22")
            .await
            .unwrap();

        let refreshed = auth.refresh_session(&session.refresh_token).await.unwrap();
        assert_eq!(refreshed.user.id, session.user.id);
        assert!(auth.get_user(&refreshed.access_token).await.is_ok());

        // An access token is not a refresh token
        assert!(auth.refresh_session(&session.access_token).await.is_err());
    }

    #[tokio::test]
    async fn test_sign_out_revokes_tokens() {
        let auth = provider();
        auth.sign_up(new_user("ana@example.com")).await.unwrap();
        let session = auth
            .sign_in_with_password("ana@example.com", "hunter22")
            .await
            .unwrap();

        auth.sign_out(&session.access_token).await.unwrap();

        assert!(auth.get_user(&session.access_token).await.is_err());
        assert!(auth.refresh_session(&session.refresh_token).await.is_err());

        let again = auth
            .sign_in_with_password("ana@example.com", "hunter22")
            .await
            .unwrap();
        assert!(auth.get_user(&again.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_get_user_by_id() {
        let auth = provider();
        let user = auth.sign_up(new_user("ana@example.com")).await.unwrap();

        assert_eq!(auth.get_user_by_id(&user.id).await.unwrap(), Some(user));
        assert_eq!(auth.get_user_by_id("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_token_signed_elsewhere_rejected() {
        let auth = provider();
        let user = auth.sign_up(new_user("ana@example.com")).await.unwrap();

        let forged = Claims::new(&user.id, &user.email, 0, TokenType::Access, Duration::hours(1));
        let token = jwt::create_token(&forged, "some-other-secret-that-is-32-bytes").unwrap();
        assert!(matches!(
            auth.get_user(&token).await,
            Err(IdentityError::InvalidToken(_))
        ));
    }
}
