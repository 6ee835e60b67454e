/// JWT issuing and validation for the local identity provider
///
/// Tokens are HS256 signed. Besides the registered claims they carry the
/// account's email, the token type, and the account's session version; a
/// sign-out bumps the version, which invalidates every outstanding token.
///
/// # Token Types
///
/// - **Access Token**: short-lived (1 hour by default), sent as a bearer token
/// - **Refresh Token**: long-lived (30 days by default), traded for a new session
///
/// # Example
///
/// ```
/// use menucraft_shared::auth::jwt::{create_token, validate_access_token, Claims, TokenType};
/// use chrono::Duration;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-that-is-at-least-32-bytes-long";
/// let claims = Claims::new("user-1", "owner@example.com", 0, TokenType::Access, Duration::hours(1));
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_access_token(&token, secret)?;
/// assert_eq!(validated.sub, "user-1");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Issuer written into and required from every token
pub const ISSUER: &str = "menucraft";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Wrong token type for the operation
    #[error("Expected {expected} token")]
    WrongType { expected: &'static str },
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
        }
    }
}

/// JWT claims
///
/// # Standard Claims
///
/// - `sub`: user id
/// - `iss`: always "menucraft"
/// - `iat`, `nbf`, `exp`: unix timestamps
///
/// # Custom Claims
///
/// - `email`: account email at issue time
/// - `ver`: account session version
/// - `token_type`: access or refresh
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub nbf: i64,
    pub email: String,
    pub ver: u32,
    pub token_type: TokenType,
}

impl Claims {
    /// Claims valid from now for `ttl`
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        session_version: u32,
        token_type: TokenType,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            nbf: now.timestamp(),
            email: email.into(),
            ver: session_version,
            token_type,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Signs claims with HS256
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Verifies signature, expiry, not-before and issuer
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.leeway = 0;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// [`validate_token`] plus a check that it is an access token
pub fn validate_access_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    if claims.token_type != TokenType::Access {
        return Err(JwtError::WrongType {
            expected: TokenType::Access.as_str(),
        });
    }
    Ok(claims)
}

/// [`validate_token`] plus a check that it is a refresh token
pub fn validate_refresh_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let claims = validate_token(token, secret)?;
    if claims.token_type != TokenType::Refresh {
        return Err(JwtError::WrongType {
            expected: TokenType::Refresh.as_str(),
        });
    }
    Ok(claims)
}
