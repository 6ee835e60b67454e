//! # MenuCraft API Server Library
//!
//! The HTTP side of MenuCraft: menu save and lookup, public menu pages and
//! account endpoints, on top of `menucraft_shared`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
