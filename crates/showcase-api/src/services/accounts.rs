//! User accounts and session issuance

use chrono::{Duration, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use showcase_auth::{hash_password, verify_password, JwtValidator, SessionClaims};
use showcase_db::entities::user;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{SessionResponse, User, UserRole};

pub const MIN_PASSWORD_CHARS: usize = 8;

/// Fields of an account about to be created
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

pub fn validate_username(username: &str) -> Result<String, ApiError> {
    let username = username.trim();
    let len = username.chars().count();
    if !(3..=32).contains(&len) {
        return Err(ApiError::BadRequest(
            "Username must be 3 to 32 characters".to_string(),
        ));
    }
    Ok(username.to_string())
}

/// Emails are compared case-insensitively, so they are stored lowercase.
pub fn normalize_email(email: &str) -> Result<String, ApiError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(ApiError::BadRequest("Invalid email address".to_string())),
    }
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

pub async fn create_account<C: ConnectionTrait>(
    db: &C,
    account: NewAccount,
) -> Result<user::Model, ApiError> {
    let username = validate_username(&account.username)?;
    let email = normalize_email(&account.email)?;
    validate_password(&account.password)?;

    let username_taken = user::Entity::find()
        .filter(user::Column::Username.eq(username.as_str()))
        .one(db)
        .await?
        .is_some();
    if username_taken {
        return Err(ApiError::conflict(
            "USERNAME_EXISTS",
            "Username is already taken",
        ));
    }

    let email_taken = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
        .is_some();
    if email_taken {
        return Err(ApiError::conflict(
            "EMAIL_EXISTS",
            "Email is already registered",
        ));
    }

    let password_hash = hash_password(&account.password)?;
    let now = Utc::now();

    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set(username),
        email: Set(email),
        password_hash: Set(password_hash),
        role: Set(account.role.into()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    info!("Created {} account {} ({})", account.role.as_str(), user.username, user.id);

    Ok(user)
}

/// Check credentials. Unknown email and wrong password look the same.
pub async fn authenticate<C: ConnectionTrait>(
    db: &C,
    email: &str,
    password: &str,
) -> Result<user::Model, ApiError> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let email = email.trim().to_lowercase();
    let Some(user) = user::Entity::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?
    else {
        warn!("Login attempt for unknown email");
        return Err(invalid());
    };

    if !verify_password(password, &user.password_hash)? {
        warn!("Failed login for user {}", user.id);
        return Err(invalid());
    }

    Ok(user)
}

/// Sign a session token for `user`.
pub fn issue_session(
    secret: &[u8],
    validity: Duration,
    user: user::Model,
) -> Result<SessionResponse, ApiError> {
    let role = UserRole::from(user.role);
    let claims = SessionClaims::new(
        user.id.to_string(),
        user.email.clone(),
        role.as_str().to_string(),
        validity,
    )?;
    let token = JwtValidator::encode(secret, &claims)?;

    let expires_at = Utc
        .timestamp_opt(claims.exp, 0)
        .single()
        .ok_or_else(|| ApiError::Internal("Token expiry out of range".to_string()))?;

    Ok(SessionResponse {
        token,
        user: User::from(user),
        expires_at,
    })
}
