use axum::{extract::State, http::StatusCode, Extension, Json};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use showcase_db::entities::{team, user};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::policy;
use crate::services::{accounts, ownership, teams};
use crate::AppState;

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = SessionResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Signup disabled or role not allowed", body = ErrorResponse),
        (status = 409, description = "Username or email already registered", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    if !state.allow_signup {
        return Err(ApiError::Forbidden(
            "Public registration is disabled".to_string(),
        ));
    }

    let role = req.role.unwrap_or(UserRole::Novice);
    if !policy::can_self_register_as(role) {
        return Err(ApiError::Forbidden(format!(
            "Role '{}' cannot be chosen at registration",
            role.as_str()
        )));
    }

    let user = accounts::create_account(
        &state.db,
        accounts::NewAccount {
            username: req.username,
            email: req.email,
            password: req.password,
            role,
        },
    )
    .await?;

    let session = accounts::issue_session(state.jwt_secret.as_bytes(), state.token_ttl, user)?;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
    let user = accounts::authenticate(&state.db, &req.email, &req.password).await?;

    info!("User {} logged in", user.id);

    let session = accounts::issue_session(state.jwt_secret.as_bytes(), state.token_ttl, user)?;
    Ok(Json(session))
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All users", body = UserList)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<Arc<AppState>>) -> Result<Json<UserList>, ApiError> {
    let users: Vec<User> = user::Entity::find()
        .order_by_asc(user::Column::CreatedAt)
        .order_by_asc(user::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(User::from)
        .collect();

    Ok(Json(UserList {
        total: users.len(),
        users,
    }))
}

/// Current user
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = User),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    let user = user::Entity::find_by_id(caller.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))?;

    Ok(Json(user.into()))
}

/// Projects the caller created or that belong to one of their teams
#[utoipa::path(
    get,
    path = "/api/users/me/projects",
    responses(
        (status = 200, description = "Caller's projects", body = MyProjectList),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn my_projects(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<MyProjectList>, ApiError> {
    let projects = ownership::my_projects(&state.db, &caller).await?;

    debug!("User {} has {} projects", caller.user_id, projects.len());

    Ok(Json(MyProjectList {
        total: projects.len(),
        projects,
    }))
}

/// Teams the caller is a member of
#[utoipa::path(
    get,
    path = "/api/users/me/teams",
    responses(
        (status = 200, description = "Caller's teams", body = TeamList),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn my_teams(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
) -> Result<Json<TeamList>, ApiError> {
    let team_ids = teams::team_ids_of(&state.db, caller.user_id).await?;

    let models = if team_ids.is_empty() {
        Vec::new()
    } else {
        team::Entity::find()
            .filter(team::Column::Id.is_in(team_ids))
            .order_by_desc(team::Column::CreatedAt)
            .order_by_desc(team::Column::Id)
            .all(&state.db)
            .await?
    };

    let views = teams::team_views(&state.db, models).await?;
    let total = views.len();

    Ok(Json(TeamList {
        teams: views,
        total,
        offset: 0,
        limit: total,
    }))
}
