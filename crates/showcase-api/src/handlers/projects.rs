use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::services::projects;
use crate::AppState;

/// List projects
#[utoipa::path(
    get,
    path = "/api/projects",
    params(ProjectQuery),
    responses(
        (status = 200, description = "Projects, newest first", body = ProjectList)
    ),
    tag = "projects"
)]
pub async fn list_projects(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ProjectQuery>,
) -> Result<Json<ProjectList>, ApiError> {
    debug!("Listing projects: {:?}", query);
    Ok(Json(projects::list(&state.db, query).await?))
}

/// All tags used by live projects
#[utoipa::path(
    get,
    path = "/api/projects/tags",
    responses(
        (status = 200, description = "Sorted distinct tags", body = TagList)
    ),
    tag = "projects"
)]
pub async fn list_tags(State(state): State<Arc<AppState>>) -> Result<Json<TagList>, ApiError> {
    Ok(Json(TagList {
        tags: projects::distinct_tags(&state.db).await?,
    }))
}

/// Get a project
#[utoipa::path(
    get,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Project", body = Project),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    tag = "projects"
)]
pub async fn get_project(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    let project = projects::find_live(&state.db, id).await?;
    Ok(Json(project.into()))
}

/// Create a project
#[utoipa::path(
    post,
    path = "/api/projects",
    request_body = CreateProjectRequest,
    responses(
        (status = 201, description = "Project created", body = Project),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller is not a member of the team", body = ErrorResponse),
        (status = 404, description = "Team not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn create_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    let project = projects::create(&state.db, &caller, req).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

/// Update a project
#[utoipa::path(
    put,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    request_body = UpdateProjectRequest,
    responses(
        (status = 200, description = "Updated project", body = Project),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn update_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<Project>, ApiError> {
    Ok(Json(projects::update(&state.db, &caller, id, req).await?))
}

/// Delete a project. Comments and suggestions are kept.
#[utoipa::path(
    delete,
    path = "/api/projects/{id}",
    params(("id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 204, description = "Project deleted"),
        (status = 403, description = "Caller is not the project creator", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "projects"
)]
pub async fn delete_project(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    projects::soft_delete(&state.db, &caller, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
