//! Credentials for the showcase API: password hashing and signed session tokens

pub mod jwt;
pub mod password;

pub use jwt::{JwtError, JwtValidator, SessionClaims, SESSION_AUDIENCE, SESSION_ISSUER};
pub use password::{hash_password, verify_password, PasswordError};
