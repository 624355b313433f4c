//! Project validation, search and lifecycle
//!
//! Deleting a project only stamps `deleted_at`. Deleted projects vanish from
//! every listing and lookup, but their comments and suggestions stay valid.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use showcase_db::entities::project;
use showcase_db::tags;
use std::collections::BTreeSet;
use tracing::info;
use url::Url;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{
    page_bounds, CreateProjectRequest, Project, ProjectList, ProjectQuery, UpdateProjectRequest,
};
use crate::policy;
use crate::services::teams;

pub fn validate_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Project title is required".to_string()));
    }
    Ok(title.to_string())
}

/// Must be an absolute http or https URL with a host.
pub fn validate_code_url(raw: &str) -> Result<String, ApiError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ApiError::BadRequest("code_url is required".to_string()));
    }

    let parsed = Url::parse(raw)
        .map_err(|e| ApiError::BadRequest(format!("code_url is not a valid URL: {}", e)))?;

    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ApiError::BadRequest(
            "code_url must be an http or https URL".to_string(),
        ));
    }

    Ok(raw.to_string())
}

fn clean_description(description: Option<String>) -> Option<String> {
    description
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
}

/// Split a `tags=a,b` filter into lowercase tags.
pub fn parse_tag_filter(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

pub fn matches_query(project: &project::Model, q: &str) -> bool {
    let q = q.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    project.title.to_lowercase().contains(&q)
        || project
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&q))
        || tags::decode(&project.tags)
            .iter()
            .any(|t| t.to_lowercase().contains(&q))
}

/// True if the project carries at least one of `wanted` (lowercase).
pub fn has_any_tag(project: &project::Model, wanted: &[String]) -> bool {
    wanted.is_empty()
        || tags::decode(&project.tags)
            .iter()
            .any(|t| wanted.contains(&t.to_lowercase()))
}

/// Look up a project that has not been deleted.
pub async fn find_live<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<project::Model, ApiError> {
    project::Entity::find_by_id(id)
        .one(db)
        .await?
        .filter(|p| !p.is_deleted())
        .ok_or_else(|| ApiError::not_found("Project"))
}

/// The caller may only scope a project to a team they belong to.
async fn check_team_scope<C: ConnectionTrait>(
    db: &C,
    caller: &AuthUser,
    team_id: Uuid,
) -> Result<(), ApiError> {
    let team = teams::find_team(db, team_id).await?;
    if !teams::is_member(db, team.id, caller.user_id).await? {
        return Err(ApiError::Forbidden(
            "You must be a member of the team to add projects to it".to_string(),
        ));
    }
    Ok(())
}

pub async fn list<C: ConnectionTrait>(db: &C, query: ProjectQuery) -> Result<ProjectList, ApiError> {
    let (offset, limit) = page_bounds(query.offset, query.limit);

    let mut select = project::Entity::find().filter(project::Column::DeletedAt.is_null());
    if let Some(team_id) = query.team_id {
        select = select.filter(project::Column::TeamId.eq(team_id));
    }
    if let Some(created_by) = query.created_by {
        select = select.filter(project::Column::CreatedBy.eq(created_by));
    }

    let wanted_tags = query
        .tags
        .as_deref()
        .map(parse_tag_filter)
        .unwrap_or_default();
    let q = query.q.unwrap_or_default();

    let matching: Vec<project::Model> = select
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .filter(|p| matches_query(p, &q) && has_any_tag(p, &wanted_tags))
        .collect();

    let total = matching.len();
    let projects = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .map(Project::from)
        .collect();

    Ok(ProjectList {
        projects,
        total,
        offset,
        limit,
    })
}

/// Sorted distinct tags across live projects
pub async fn distinct_tags<C: ConnectionTrait>(db: &C) -> Result<Vec<String>, ApiError> {
    let projects = project::Entity::find()
        .filter(project::Column::DeletedAt.is_null())
        .all(db)
        .await?;

    let all: BTreeSet<String> = projects
        .iter()
        .flat_map(|p| tags::decode(&p.tags))
        .collect();

    Ok(all.into_iter().collect())
}

pub async fn create(
    db: &DatabaseConnection,
    caller: &AuthUser,
    request: CreateProjectRequest,
) -> Result<Project, ApiError> {
    let title = validate_title(&request.title)?;
    let code_url = validate_code_url(&request.code_url)?;

    if let Some(team_id) = request.team_id {
        check_team_scope(db, caller, team_id).await?;
    }

    let now = Utc::now();
    let project = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(clean_description(request.description)),
        code_url: Set(code_url),
        created_by: Set(caller.user_id),
        team_id: Set(request.team_id),
        tags: Set(tags::encode(&request.tags)),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    }
    .insert(db)
    .await?;

    info!("Project {} created by {}", project.id, caller.user_id);

    Ok(project.into())
}

pub async fn update(
    db: &DatabaseConnection,
    caller: &AuthUser,
    project_id: Uuid,
    request: UpdateProjectRequest,
) -> Result<Project, ApiError> {
    let project = find_live(db, project_id).await?;

    if !policy::can_edit_project(caller, &project) {
        return Err(ApiError::Forbidden(
            "Only the project creator can update this project".to_string(),
        ));
    }

    let current_team = project.team_id;
    let mut active: project::ActiveModel = project.into();

    if let Some(title) = request.title {
        active.title = Set(validate_title(&title)?);
    }
    if request.description.is_some() {
        active.description = Set(clean_description(request.description));
    }
    if let Some(code_url) = request.code_url {
        active.code_url = Set(validate_code_url(&code_url)?);
    }
    if let Some(team_id) = request.team_id {
        if let Some(new_team) = team_id.filter(|id| Some(*id) != current_team) {
            check_team_scope(db, caller, new_team).await?;
        }
        active.team_id = Set(team_id);
    }
    if let Some(tag_list) = request.tags {
        active.tags = Set(tags::encode(&tag_list));
    }
    active.updated_at = Set(Utc::now());

    let project = active.update(db).await?;

    info!("Project {} updated by {}", project.id, caller.user_id);

    Ok(project.into())
}

pub async fn soft_delete(
    db: &DatabaseConnection,
    caller: &AuthUser,
    project_id: Uuid,
) -> Result<(), ApiError> {
    let project = find_live(db, project_id).await?;

    if !policy::can_edit_project(caller, &project) {
        return Err(ApiError::Forbidden(
            "Only the project creator can delete this project".to_string(),
        ));
    }

    let now = Utc::now();
    let mut active: project::ActiveModel = project.into();
    active.deleted_at = Set(Some(now));
    active.updated_at = Set(now);
    active.update(db).await?;

    info!("Project {} deleted by {}", project_id, caller.user_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project_with(title: &str, tag_list: &[&str]) -> project::Model {
        let tag_list: Vec<String> = tag_list.iter().map(|t| t.to_string()).collect();
        project::Model {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: Some("Tracks habits".to_string()),
            code_url: "https://example.com/x".to_string(),
            created_by: Uuid::new_v4(),
            team_id: None,
            tags: tags::encode(&tag_list),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn code_url_must_be_http() {
        assert_eq!(
            validate_code_url(" https://github.com/a/b ").unwrap(),
            "https://github.com/a/b"
        );
        assert!(validate_code_url("http://gitlab.example.org/x").is_ok());
        assert!(validate_code_url("ftp://example.com/x").is_err());
        assert!(validate_code_url("javascript:alert(1)").is_err());
        assert!(validate_code_url("github.com/a/b").is_err());
        assert!(validate_code_url("").is_err());
    }

    #[test]
    fn title_required() {
        assert!(validate_title("  ").is_err());
        assert_eq!(validate_title(" Habit ").unwrap(), "Habit");
    }

    #[test]
    fn tag_filter_parsing() {
        assert_eq!(parse_tag_filter("Rust, web,,"), vec!["rust", "web"]);
        assert!(parse_tag_filter(" , ").is_empty());
    }

    #[test]
    fn search_and_tag_matching() {
        let p = project_with("Habit Tracker", &["Rust", "cli"]);

        assert!(matches_query(&p, "tracker"));
        assert!(matches_query(&p, "habits"));
        assert!(matches_query(&p, "RUST"));
        assert!(!matches_query(&p, "python"));

        assert!(has_any_tag(&p, &[]));
        assert!(has_any_tag(&p, &["rust".to_string(), "go".to_string()]));
        assert!(!has_any_tag(&p, &["go".to_string()]));
    }
}
