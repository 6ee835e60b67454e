/// Middleware modules for the API server
///
/// Bearer authentication lives in `menucraft_shared::auth::middleware`;
/// this crate only adds response hardening.

pub mod security;
