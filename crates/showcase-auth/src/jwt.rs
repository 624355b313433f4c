//! Signed session tokens (HS256 JWT)
//!
//! Login and registration issue a [`SessionClaims`] token; every protected
//! endpoint validates signature, expiry, issuer, audience and token type
//! before trusting any claim.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Issuer written into every session token
pub const SESSION_ISSUER: &str = "showcase-api";

/// Audience written into every session token
pub const SESSION_AUDIENCE: &str = "showcase-web";

const SESSION_TOKEN_TYPE: &str = "session";

/// Claims carried by a session token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject: the user id (UUID string)
    pub sub: String,
    pub email: String,
    /// Platform role (`novice`, `mentor`, `admin`)
    pub role: String,
    pub token_type: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
    pub iss: String,
    pub aud: String,
}

impl SessionClaims {
    /// Claims valid from now for `validity`.
    ///
    /// Fails with [`JwtError::InvalidValidity`] when the expiry does not fit
    /// in a timestamp.
    pub fn new(
        user_id: String,
        email: String,
        role: String,
        validity: Duration,
    ) -> Result<Self, JwtError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(validity)
            .ok_or(JwtError::InvalidValidity)?;

        Ok(Self {
            sub: user_id,
            email,
            role,
            token_type: SESSION_TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: SESSION_ISSUER.to_string(),
            aud: SESSION_AUDIENCE.to_string(),
        })
    }

    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    pub fn is_session(&self) -> bool {
        self.token_type == SESSION_TOKEN_TYPE
    }
}

/// JWT errors
#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token type '{0}', expected 'session'")]
    WrongTokenType(String),

    #[error("Token validity is out of range")]
    InvalidValidity,
}

/// Validates session tokens signed with a shared HMAC secret
pub struct JwtValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_issuer(&[SESSION_ISSUER]);
        validation.set_audience(&[SESSION_AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims, JwtError> {
        let token_data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)?;
        let claims = token_data.claims;

        if claims.is_expired() {
            return Err(JwtError::TokenExpired);
        }

        if !claims.is_session() {
            return Err(JwtError::WrongTokenType(claims.token_type));
        }

        Ok(claims)
    }

    /// Sign claims with HMAC-SHA256
    pub fn encode(secret: &[u8], claims: &SessionClaims) -> Result<String, JwtError> {
        let header = Header::new(Algorithm::HS256);
        let encoding_key = EncodingKey::from_secret(secret);

        Ok(encode(&header, claims, &encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &[u8] = b"test_secret_key_1234567890";

    fn claims(validity: Duration) -> SessionClaims {
        SessionClaims::new(
            "3f1c0d2e-0000-4000-8000-000000000001".to_string(),
            "ana@example.com".to_string(),
            "mentor".to_string(),
            validity,
        )
        .unwrap()
    }

    #[test]
    fn test_signed_token_validates() {
        let token = JwtValidator::encode(TEST_SECRET, &claims(Duration::hours(1))).unwrap();

        let decoded = JwtValidator::new(TEST_SECRET).validate(&token).unwrap();

        assert_eq!(decoded.sub, "3f1c0d2e-0000-4000-8000-000000000001");
        assert_eq!(decoded.email, "ana@example.com");
        assert_eq!(decoded.role, "mentor");
        assert!(decoded.is_session());
    }

    #[test]
    fn test_expired_token_rejected() {
        let expired = claims(Duration::seconds(-10));
        assert!(expired.is_expired());

        let token = JwtValidator::encode(TEST_SECRET, &expired).unwrap();
        assert!(JwtValidator::new(TEST_SECRET).validate(&token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtValidator::encode(b"another-secret", &claims(Duration::hours(1))).unwrap();
        assert!(JwtValidator::new(TEST_SECRET).validate(&token).is_err());
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let token = JwtValidator::encode(TEST_SECRET, &claims(Duration::hours(1))).unwrap();
        let admin = JwtValidator::encode(
            TEST_SECRET,
            &SessionClaims::new(
                "other".to_string(),
                "x@example.com".to_string(),
                "admin".to_string(),
                Duration::hours(1),
            )
            .unwrap(),
        )
        .unwrap();

        // Splice the admin payload onto the original signature
        let parts: Vec<&str> = token.split('.').collect();
        let admin_parts: Vec<&str> = admin.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], admin_parts[1], parts[2]);

        assert!(JwtValidator::new(TEST_SECRET).validate(&forged).is_err());
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let token = JwtValidator::encode(TEST_SECRET, &claims(Duration::hours(1))).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        // {"alg":"none","typ":"JWT"}
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", parts[1]);

        assert!(JwtValidator::new(TEST_SECRET).validate(&unsigned).is_err());
    }

    #[test]
    fn test_non_session_token_rejected() {
        let mut other = claims(Duration::hours(1));
        other.token_type = "refresh".to_string();
        let token = JwtValidator::encode(TEST_SECRET, &other).unwrap();

        let err = JwtValidator::new(TEST_SECRET).validate(&token).unwrap_err();
        assert!(matches!(err, JwtError::WrongTokenType(t) if t == "refresh"));
    }

    #[test]
    fn test_out_of_range_validity_is_an_error() {
        let result = SessionClaims::new(
            "3f1c0d2e-0000-4000-8000-000000000001".to_string(),
            "ana@example.com".to_string(),
            "mentor".to_string(),
            Duration::hours(10_000_000_000),
        );

        assert!(matches!(result, Err(JwtError::InvalidValidity)));
    }
}
