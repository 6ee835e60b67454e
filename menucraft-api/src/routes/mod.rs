/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Account endpoints (signup, login, refresh, logout)
/// - `menus`: Menu save, lookup, public view and item deletion
/// - `templates`: Built-in template catalog

pub mod auth;
pub mod health;
pub mod menus;
pub mod templates;
