//! API Middleware
//!
//! Request authentication for protected endpoints.

pub mod auth;

pub use auth::{require_auth, AuthUser, JwtState};
