//! Team lookup, validation and lifecycle

use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use showcase_db::entities::{join_request, project, team, team_member};
use showcase_db::tags;
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{CreateTeamRequest, Team, UpdateTeamRequest};
use crate::policy;

pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_DESCRIPTION_CHARS: usize = 500;

pub fn validate_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim();
    let len = name.chars().count();
    if len == 0 || len > MAX_NAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Team name must be 1 to {} characters",
            MAX_NAME_CHARS
        )));
    }
    Ok(name.to_string())
}

/// Blank descriptions are stored as none.
pub fn validate_description(description: Option<String>) -> Result<Option<String>, ApiError> {
    let Some(description) = description else {
        return Ok(None);
    };
    let description = description.trim();
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Team description must be at most {} characters",
            MAX_DESCRIPTION_CHARS
        )));
    }
    Ok((!description.is_empty()).then(|| description.to_string()))
}

/// Case-insensitive match on name, description and tags
pub fn matches_query(team: &team::Model, q: &str) -> bool {
    let q = q.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    team.name.to_lowercase().contains(&q)
        || team
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&q))
        || tags::decode(&team.tags)
            .iter()
            .any(|t| t.to_lowercase().contains(&q))
}

pub async fn find_team<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<team::Model, ApiError> {
    team::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("Team"))
}

/// Memberships of a team, earliest joined first
pub async fn memberships<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
) -> Result<Vec<team_member::Model>, DbErr> {
    team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::Id)
        .all(db)
        .await
}

pub async fn is_member<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbErr> {
    Ok(team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team_id))
        .filter(team_member::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .is_some())
}

/// Ids of every team the user belongs to
pub async fn team_ids_of<C: ConnectionTrait>(db: &C, user_id: Uuid) -> Result<Vec<Uuid>, DbErr> {
    Ok(team_member::Entity::find()
        .filter(team_member::Column::UserId.eq(user_id))
        .all(db)
        .await?
        .into_iter()
        .map(|m| m.team_id)
        .collect())
}

pub async fn insert_member<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<team_member::Model, DbErr> {
    team_member::ActiveModel {
        team_id: Set(team_id),
        user_id: Set(user_id),
        joined_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Attach member ids and live project ids to each team.
pub async fn team_views<C: ConnectionTrait>(
    db: &C,
    teams: Vec<team::Model>,
) -> Result<Vec<Team>, DbErr> {
    if teams.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<Uuid> = teams.iter().map(|t| t.id).collect();

    let memberships = team_member::Entity::find()
        .filter(team_member::Column::TeamId.is_in(ids.clone()))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::Id)
        .all(db)
        .await?;

    let projects = project::Entity::find()
        .filter(project::Column::TeamId.is_in(ids))
        .filter(project::Column::DeletedAt.is_null())
        .order_by_asc(project::Column::CreatedAt)
        .order_by_asc(project::Column::Id)
        .all(db)
        .await?;

    let mut members: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for membership in memberships {
        members
            .entry(membership.team_id)
            .or_default()
            .push(membership.user_id);
    }

    let mut project_ids: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for project in projects {
        if let Some(team_id) = project.team_id {
            project_ids.entry(team_id).or_default().push(project.id);
        }
    }

    Ok(teams
        .into_iter()
        .map(|team| {
            let members = members.remove(&team.id).unwrap_or_default();
            let project_ids = project_ids.remove(&team.id).unwrap_or_default();
            Team {
                id: team.id,
                tags: tags::decode(&team.tags),
                name: team.name,
                description: team.description,
                created_by: team.created_by,
                is_public: team.is_public,
                member_count: members.len(),
                project_count: project_ids.len(),
                members,
                project_ids,
                created_at: team.created_at,
                updated_at: team.updated_at,
            }
        })
        .collect())
}

pub async fn team_view<C: ConnectionTrait>(db: &C, team: team::Model) -> Result<Team, ApiError> {
    team_views(db, vec![team])
        .await?
        .pop()
        .ok_or_else(|| ApiError::Internal("Team view could not be built".to_string()))
}

/// Remove a team together with its memberships and join requests.
/// Projects scoped to it stay and lose their team.
pub async fn purge_team<C: ConnectionTrait>(db: &C, team_id: Uuid) -> Result<(), DbErr> {
    join_request::Entity::delete_many()
        .filter(join_request::Column::TeamId.eq(team_id))
        .exec(db)
        .await?;

    team_member::Entity::delete_many()
        .filter(team_member::Column::TeamId.eq(team_id))
        .exec(db)
        .await?;

    project::Entity::update_many()
        .col_expr(project::Column::TeamId, Expr::value(Option::<Uuid>::None))
        .filter(project::Column::TeamId.eq(team_id))
        .exec(db)
        .await?;

    team::Entity::delete_by_id(team_id).exec(db).await?;

    Ok(())
}

/// Create a team with the caller as creator and first member.
pub async fn create_team(
    db: &DatabaseConnection,
    caller: &AuthUser,
    request: CreateTeamRequest,
) -> Result<Team, ApiError> {
    let name = validate_name(&request.name)?;
    let description = validate_description(request.description)?;
    let now = Utc::now();

    let txn = db.begin().await?;

    let team = team::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name),
        description: Set(description),
        created_by: Set(caller.user_id),
        is_public: Set(request.is_public),
        tags: Set(tags::encode(&request.tags)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    insert_member(&txn, team.id, caller.user_id).await?;

    txn.commit().await?;

    info!("Team {} ({}) created by {}", team.name, team.id, caller.user_id);

    team_view(db, team).await
}

pub async fn update_team(
    db: &DatabaseConnection,
    caller: &AuthUser,
    team_id: Uuid,
    request: UpdateTeamRequest,
) -> Result<Team, ApiError> {
    let team = find_team(db, team_id).await?;

    if !policy::can_manage_team(caller, &team) {
        return Err(ApiError::Forbidden(
            "Only the team creator can update this team".to_string(),
        ));
    }

    let mut active: team::ActiveModel = team.into();

    if let Some(name) = request.name {
        active.name = Set(validate_name(&name)?);
    }
    if request.description.is_some() {
        active.description = Set(validate_description(request.description)?);
    }
    if let Some(is_public) = request.is_public {
        active.is_public = Set(is_public);
    }
    if let Some(tag_list) = request.tags {
        active.tags = Set(tags::encode(&tag_list));
    }
    active.updated_at = Set(Utc::now());

    let team = active.update(db).await?;

    info!("Team {} updated by {}", team.id, caller.user_id);

    team_view(db, team).await
}

pub async fn delete_team(
    db: &DatabaseConnection,
    caller: &AuthUser,
    team_id: Uuid,
) -> Result<(), ApiError> {
    let txn = db.begin().await?;

    let team = find_team(&txn, team_id).await?;

    if !policy::can_manage_team(caller, &team) {
        return Err(ApiError::Forbidden(
            "Only the team creator can delete this team".to_string(),
        ));
    }

    purge_team(&txn, team.id).await?;
    txn.commit().await?;

    info!("Team {} deleted by {}", team_id, caller.user_id);

    Ok(())
}
