//! # MenuCraft Shared Library
//!
//! Types and business logic behind the MenuCraft API: menu records and their
//! persistence, identity providers and token resolution, and the key-value
//! store backends everything is kept in.
//!
//! ## Module Organization
//!
//! - `models`: menu, template and user records
//! - `menu`: menu repository (single record per menu plus per-user indexes)
//! - `slug`: public menu ids
//! - `store`: the `KvStore` trait and its memory, Redis and Postgres backends
//! - `auth`: identity providers, bearer resolution, middleware, session manager
//! - `redis`: Redis connection management
//! - `db`: Postgres pool and migrations

pub mod auth;
pub mod db;
pub mod menu;
pub mod models;
pub mod redis;
pub mod slug;
pub mod store;

/// Current version of the MenuCraft shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
