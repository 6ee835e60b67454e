/// Bearer token to user resolution
///
/// The provider's token introspection is authoritative. When it fails, and
/// the fallback is enabled, the JWT payload is decoded *without* checking
/// the signature, its `sub` is looked up through the provider's admin API,
/// and that user is accepted as long as the payload's `exp` has not passed.
/// Each fallback acceptance is logged at `warn`.
///
/// # Example
///
/// ```no_run
/// use menucraft_shared::auth::resolve::IdentityResolver;
/// use menucraft_shared::auth::provider::SharedIdentityProvider;
///
/// # async fn example(provider: SharedIdentityProvider, token: &str) {
/// let resolver = IdentityResolver::new(provider, true);
/// match resolver.resolve(token).await {
///     Ok(user) => println!("request from {}", user.id),
///     Err(e) => println!("rejected: {}", e),
/// }
/// # }
/// ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use serde::Deserialize;

use super::provider::{IdentityError, SharedIdentityProvider};
use crate::models::User;

/// Registered claims read from an unverified payload
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UnverifiedClaims {
    pub sub: String,

    #[serde(default)]
    pub exp: Option<i64>,
}

/// Decodes the middle segment of a JWT without verifying anything
pub fn decode_unverified(token: &str) -> Result<UnverifiedClaims, IdentityError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(IdentityError::InvalidToken("Malformed JWT".to_string())),
    };

    // Some encoders keep the '=' padding
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| IdentityError::InvalidToken(format!("Payload is not base64url: {}", e)))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| IdentityError::InvalidToken(format!("Payload is not a claims object: {}", e)))
}

/// Resolves bearer tokens to users
#[derive(Clone)]
pub struct IdentityResolver {
    provider: SharedIdentityProvider,
    allow_unverified_fallback: bool,
}

impl IdentityResolver {
    pub fn new(provider: SharedIdentityProvider, allow_unverified_fallback: bool) -> Self {
        Self {
            provider,
            allow_unverified_fallback,
        }
    }

    pub fn provider(&self) -> &SharedIdentityProvider {
        &self.provider
    }

    /// Returns the user the token belongs to
    ///
    /// # Errors
    ///
    /// Auth failures (`InvalidToken`, `TokenExpired`) when neither path
    /// accepts the token; `Provider`/`Store` errors when the provider itself
    /// failed and no fallback was possible.
    pub async fn resolve(&self, token: &str) -> Result<User, IdentityError> {
        let introspection_err = match self.provider.get_user(token).await {
            Ok(user) => return Ok(user),
            Err(e) => e,
        };

        if !self.allow_unverified_fallback {
            return Err(introspection_err);
        }

        tracing::debug!(
            provider = self.provider.name(),
            error = %introspection_err,
            "Token introspection failed, trying payload fallback"
        );

        let claims = match decode_unverified(token) {
            Ok(claims) => claims,
            Err(_) if !introspection_err.is_auth_failure() => return Err(introspection_err),
            Err(e) => return Err(e),
        };

        if let Some(exp) = claims.exp {
            if exp <= Utc::now().timestamp() {
                return Err(IdentityError::TokenExpired);
            }
        }

        match self.provider.get_user_by_id(&claims.sub).await? {
            Some(user) => {
                tracing::warn!(user_id = %user.id, "Accepted token through unverified payload fallback");
                Ok(user)
            }
            None => Err(IdentityError::InvalidToken("Unknown subject".to_string())),
        }
    }
}
