//! Session token authentication
//!
//! Extracts the bearer token from the Authorization header, validates it and
//! makes the caller available to handlers as an `Extension<AuthUser>`.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use showcase_auth::JwtValidator;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::models::{ErrorResponse, UserRole};

/// Authenticated caller, taken from verified session claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(JwtValidator::new(secret)),
        }
    }
}

fn unauthorized(message: impl Into<String>, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.into(),
            code: Some(code.to_string()),
        }),
    )
}

/// Token of a `Bearer` credential. The scheme name is case-insensitive.
fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim_start().split_once(' ')?;
    let token = token.trim();

    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Require a valid session token on every request passing through.
///
/// Responds 401 when the header is missing or malformed, or when the token
/// has a bad signature, has expired, is not a session token or carries claims
/// that do not describe a user.
pub async fn require_auth(
    State(state): State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header", "MISSING_AUTH"))?;

    let token = bearer_token(auth_header).ok_or_else(|| {
        unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'",
            "INVALID_AUTH_FORMAT",
        )
    })?;

    let claims = state.validator.validate(token).map_err(|e| {
        debug!("Rejected session token: {}", e);
        unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN")
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| unauthorized("Token subject is not a user id", "INVALID_TOKEN"))?;

    let role = UserRole::parse(&claims.role)
        .ok_or_else(|| unauthorized("Token carries an unknown role", "INVALID_TOKEN"))?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
        role,
    });

    Ok(next.run(request).await)
}
