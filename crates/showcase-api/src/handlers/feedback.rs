//! Comments and suggestions
//!
//! Both are short immutable notes attached to a project. The author is always
//! the authenticated caller; bodies never name an author.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use showcase_db::entities::{comment, suggestion, user};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::*;
use crate::services::projects;
use crate::AppState;

fn clean_content(content: &str) -> Result<String, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::BadRequest("Content must not be empty".to_string()));
    }
    Ok(content.to_string())
}

fn feedback_list(items: Vec<Feedback>) -> FeedbackList {
    FeedbackList {
        total: items.len(),
        items,
    }
}

/// Comments on a project, newest first
#[utoipa::path(
    get,
    path = "/api/comments/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Comments", body = FeedbackList)
    ),
    tag = "feedback"
)]
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<FeedbackList>, ApiError> {
    let rows = comment::Entity::find()
        .filter(comment::Column::ProjectId.eq(project_id))
        .order_by_desc(comment::Column::CreatedAt)
        .order_by_desc(comment::Column::Id)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .map(|(c, author)| Feedback {
            id: c.id,
            project_id: c.project_id,
            author_id: c.author_id,
            author: author.as_ref().map(UserSummary::from),
            content: c.content,
            created_at: c.created_at,
        })
        .collect();

    Ok(Json(feedback_list(items)))
}

/// Comment on a project
#[utoipa::path(
    post,
    path = "/api/comments",
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = Feedback),
        (status = 400, description = "Empty content", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "feedback"
)]
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let content = clean_content(&req.content)?;
    let project = projects::find_live(&state.db, req.project_id).await?;

    let saved = comment::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project.id),
        author_id: Set(caller.user_id),
        content: Set(content),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!("Comment {} added to project {}", saved.id, project.id);

    let author = user::Entity::find_by_id(caller.user_id)
        .one(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Feedback {
            id: saved.id,
            project_id: saved.project_id,
            author_id: saved.author_id,
            author: author.as_ref().map(UserSummary::from),
            content: saved.content,
            created_at: saved.created_at,
        }),
    ))
}

/// Suggestions for a project, newest first
#[utoipa::path(
    get,
    path = "/api/suggestions/{project_id}",
    params(("project_id" = Uuid, Path, description = "Project ID")),
    responses(
        (status = 200, description = "Suggestions", body = FeedbackList)
    ),
    tag = "feedback"
)]
pub async fn list_suggestions(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<Uuid>,
) -> Result<Json<FeedbackList>, ApiError> {
    let rows = suggestion::Entity::find()
        .filter(suggestion::Column::ProjectId.eq(project_id))
        .order_by_desc(suggestion::Column::CreatedAt)
        .order_by_desc(suggestion::Column::Id)
        .find_also_related(user::Entity)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .map(|(s, author)| Feedback {
            id: s.id,
            project_id: s.project_id,
            author_id: s.author_id,
            author: author.as_ref().map(UserSummary::from),
            content: s.content,
            created_at: s.created_at,
        })
        .collect();

    Ok(Json(feedback_list(items)))
}

/// Suggest an improvement to a project
#[utoipa::path(
    post,
    path = "/api/suggestions",
    request_body = CreateSuggestionRequest,
    responses(
        (status = 201, description = "Suggestion created", body = Feedback),
        (status = 400, description = "Empty content", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Project not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "feedback"
)]
pub async fn create_suggestion(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Json(req): Json<CreateSuggestionRequest>,
) -> Result<(StatusCode, Json<Feedback>), ApiError> {
    let content = clean_content(&req.content)?;
    let project = projects::find_live(&state.db, req.project_id).await?;

    let saved = suggestion::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(project.id),
        author_id: Set(caller.user_id),
        content: Set(content),
        created_at: Set(Utc::now()),
    }
    .insert(&state.db)
    .await?;

    info!("Suggestion {} added to project {}", saved.id, project.id);

    let author = user::Entity::find_by_id(caller.user_id)
        .one(&state.db)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(Feedback {
            id: saved.id,
            project_id: saved.project_id,
            author_id: saved.author_id,
            author: author.as_ref().map(UserSummary::from),
            content: saved.content,
            created_at: saved.created_at,
        }),
    ))
}
