use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use showcase_db::entities::team;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::services::{membership, teams};
use crate::AppState;

/// List teams
#[utoipa::path(
    get,
    path = "/api/teams",
    params(TeamQuery),
    responses(
        (status = 200, description = "Teams, newest first", body = TeamList)
    ),
    tag = "teams"
)]
pub async fn list_teams(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TeamQuery>,
) -> Result<Json<TeamList>, ApiError> {
    debug!("Listing teams: {:?}", query);

    let (offset, limit) = page_bounds(query.offset, query.limit);

    let mut select = team::Entity::find();
    if let Some(user_id) = query.user_id {
        let ids = teams::team_ids_of(&state.db, user_id).await?;
        if ids.is_empty() {
            return Ok(Json(TeamList {
                teams: Vec::new(),
                total: 0,
                offset,
                limit,
            }));
        }
        select = select.filter(team::Column::Id.is_in(ids));
    }

    let q = query.q.unwrap_or_default();
    let matching: Vec<team::Model> = select
        .order_by_desc(team::Column::CreatedAt)
        .order_by_desc(team::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .filter(|t| teams::matches_query(t, &q))
        .collect();

    let total = matching.len();
    let page = matching.into_iter().skip(offset).take(limit).collect();

    Ok(Json(TeamList {
        teams: teams::team_views(&state.db, page).await?,
        total,
        offset,
        limit,
    }))
}

/// Create a team; the caller becomes its creator and first member
#[utoipa::path(
    post,
    path = "/api/teams",
    request_body = CreateTeamRequest,
    responses(
        (status = 201, description = "Team created", body = Team),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn create_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<Team>), ApiError> {
    let team = teams::create_team(&state.db, &caller, req).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// Get a team
#[utoipa::path(
    get,
    path = "/api/teams/{id}",
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team", body = Team),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn get_team(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Team>, ApiError> {
    let team = teams::find_team(&state.db, id).await?;
    Ok(Json(teams::team_view(&state.db, team).await?))
}

/// Update name, description, visibility or tags
#[utoipa::path(
    put,
    path = "/api/teams/{id}",
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = UpdateTeamRequest,
    responses(
        (status = 200, description = "Updated team", body = Team),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller is not the team creator", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn update_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<Team>, ApiError> {
    Ok(Json(teams::update_team(&state.db, &caller, id, req).await?))
}

/// Delete a team. Its projects are kept and lose their team.
#[utoipa::path(
    delete,
    path = "/api/teams/{id}",
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 204, description = "Team deleted"),
        (status = 403, description = "Caller is not the team creator", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn delete_team(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    teams::delete_team(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List members in join order
#[utoipa::path(
    get,
    path = "/api/teams/{id}/members",
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Members", body = TeamMemberList),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    tag = "teams"
)]
pub async fn list_members(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamMemberList>, ApiError> {
    let members = membership::list_members(&state.db, id).await?;
    Ok(Json(TeamMemberList {
        total: members.len(),
        members,
    }))
}

/// Join a team or add a member
///
/// Joining a public team (or being added by the creator) takes effect at
/// once. Joining a private team records a request for the creator.
#[utoipa::path(
    post,
    path = "/api/teams/{id}/members",
    params(("id" = Uuid, Path, description = "Team ID")),
    request_body = AddMemberRequest,
    responses(
        (status = 200, description = "Member added", body = MembershipResponse),
        (status = 202, description = "Join request pending", body = MembershipResponse),
        (status = 403, description = "Not allowed to add this user", body = ErrorResponse),
        (status = 404, description = "Team or user not found", body = ErrorResponse),
        (status = 409, description = "Already a member or request pending", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn add_member(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> Result<(StatusCode, Json<MembershipResponse>), ApiError> {
    let outcome = membership::join(&state.db, &caller, id, req.user_id).await?;

    let status = match outcome.status {
        MembershipStatus::Pending => StatusCode::ACCEPTED,
        _ => StatusCode::OK,
    };

    Ok((status, Json(outcome)))
}

/// Leave a team or remove a member
#[utoipa::path(
    delete,
    path = "/api/teams/{id}/members/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("user_id" = Uuid, Path, description = "Member to remove")
    ),
    responses(
        (status = 200, description = "Member removed", body = MembershipResponse),
        (status = 403, description = "Not allowed to remove this member", body = ErrorResponse),
        (status = 404, description = "Team or membership not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn remove_member(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MembershipResponse>, ApiError> {
    Ok(Json(
        membership::leave(&state.db, &caller, id, user_id).await?,
    ))
}

/// Pending join requests of a team
#[utoipa::path(
    get,
    path = "/api/teams/{id}/requests",
    params(("id" = Uuid, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Pending requests", body = JoinRequestList),
        (status = 403, description = "Caller is not the team creator", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn list_requests(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<JoinRequestList>, ApiError> {
    let requests = membership::list_requests(&state.db, &caller, id).await?;
    Ok(Json(JoinRequestList {
        total: requests.len(),
        requests,
    }))
}

/// Approve a pending join request
#[utoipa::path(
    post,
    path = "/api/teams/{id}/requests/{user_id}/approve",
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("user_id" = Uuid, Path, description = "Requesting user")
    ),
    responses(
        (status = 200, description = "Request approved", body = MembershipResponse),
        (status = 403, description = "Caller is not the team creator", body = ErrorResponse),
        (status = 404, description = "Team or request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn approve_request(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<MembershipResponse>, ApiError> {
    Ok(Json(
        membership::approve(&state.db, &caller, id, user_id).await?,
    ))
}

/// Reject or withdraw a pending join request
#[utoipa::path(
    delete,
    path = "/api/teams/{id}/requests/{user_id}",
    params(
        ("id" = Uuid, Path, description = "Team ID"),
        ("user_id" = Uuid, Path, description = "Requesting user")
    ),
    responses(
        (status = 204, description = "Request discarded"),
        (status = 403, description = "Not allowed", body = ErrorResponse),
        (status = 404, description = "Team or request not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "teams"
)]
pub async fn discard_request(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, ApiError> {
    membership::discard_request(&state.db, &caller, id, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
