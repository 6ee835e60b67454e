/// Authentication
///
/// MenuCraft delegates accounts to an identity provider and only resolves
/// bearer tokens to users.
///
/// # Modules
///
/// - [`provider`]: the [`provider::IdentityProvider`] trait and its errors
/// - [`supabase`]: hosted GoTrue provider
/// - [`local`]: self-contained provider (Argon2id + HS256 JWT)
/// - [`resolve`]: bearer token to user, with the unverified payload fallback
/// - [`middleware`]: Axum middleware adding an [`middleware::AuthContext`]
/// - [`session`]: client-side session manager
/// - [`password`], [`jwt`]: primitives used by the local provider

pub mod jwt;
pub mod local;
pub mod middleware;
pub mod password;
pub mod provider;
pub mod resolve;
pub mod session;
pub mod supabase;

pub use middleware::AuthContext;
pub use provider::{IdentityError, IdentityProvider, SharedIdentityProvider};
pub use resolve::IdentityResolver;
