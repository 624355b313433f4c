//! REST API for the project showcase
//!
//! Users, teams, projects, comments and suggestions over axum, with JWT
//! session authentication and an OpenAPI document served through Swagger UI.

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod services;

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use chrono::Duration;
use sea_orm::DatabaseConnection;
use std::{future::Future, net::SocketAddr, sync::Arc};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    pub db: DatabaseConnection,
    /// HMAC secret for session tokens
    pub jwt_secret: String,
    /// Lifetime of issued session tokens
    pub token_ttl: Duration,
    pub allow_signup: bool,
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Project Showcase API",
        version = "0.1.0",
        description = "Teams, projects and feedback for the project showcase"
    ),
    paths(
        handlers::system::health_check,
        handlers::users::register,
        handlers::users::login,
        handlers::users::list_users,
        handlers::users::get_current_user,
        handlers::users::my_projects,
        handlers::users::my_teams,
        handlers::projects::list_projects,
        handlers::projects::list_tags,
        handlers::projects::get_project,
        handlers::projects::create_project,
        handlers::projects::update_project,
        handlers::projects::delete_project,
        handlers::teams::list_teams,
        handlers::teams::create_team,
        handlers::teams::get_team,
        handlers::teams::update_team,
        handlers::teams::delete_team,
        handlers::teams::list_members,
        handlers::teams::add_member,
        handlers::teams::remove_member,
        handlers::teams::list_requests,
        handlers::teams::approve_request,
        handlers::teams::discard_request,
        handlers::feedback::list_comments,
        handlers::feedback::create_comment,
        handlers::feedback::list_suggestions,
        handlers::feedback::create_suggestion,
    ),
    components(
        schemas(
            models::ErrorResponse,
            models::HealthResponse,
            models::UserRole,
            models::User,
            models::UserSummary,
            models::UserList,
            models::RegisterRequest,
            models::LoginRequest,
            models::SessionResponse,
            models::Team,
            models::TeamList,
            models::CreateTeamRequest,
            models::UpdateTeamRequest,
            models::TeamMember,
            models::TeamMemberList,
            models::AddMemberRequest,
            models::MembershipStatus,
            models::MembershipResponse,
            models::JoinRequestInfo,
            models::JoinRequestList,
            models::Project,
            models::ProjectList,
            models::CreateProjectRequest,
            models::UpdateProjectRequest,
            models::TagList,
            models::MyProject,
            models::MyProjectList,
            models::Feedback,
            models::FeedbackList,
            models::CreateCommentRequest,
            models::CreateSuggestionRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "users", description = "Registration, login and the caller's own resources"),
        (name = "teams", description = "Teams, membership and join requests"),
        (name = "projects", description = "Project showcase"),
        (name = "feedback", description = "Comments and suggestions on projects"),
        (name = "system", description = "System health")
    )
)]
pub struct ApiDoc;

/// API server configuration
pub struct ApiServerConfig {
    /// Address to bind the API server
    pub bind_addr: SocketAddr,
    /// Enable CORS for the configured origins
    pub enable_cors: bool,
    /// Browser origins allowed to call the API
    pub cors_origins: Vec<String>,
    /// Secret for signing session tokens
    pub jwt_secret: String,
    /// Lifetime of issued session tokens
    pub token_ttl: Duration,
    /// Whether visitors may register themselves
    pub allow_signup: bool,
}

/// API Server
pub struct ApiServer {
    config: ApiServerConfig,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(config: ApiServerConfig, db: DatabaseConnection) -> Self {
        let state = Arc::new(AppState {
            db,
            jwt_secret: config.jwt_secret.clone(),
            token_ttl: config.token_ttl,
            allow_signup: config.allow_signup,
        });

        Self { config, state }
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let jwt_state = Arc::new(middleware::JwtState::new(self.config.jwt_secret.as_bytes()));

        let public_router = Router::new()
            .route("/api/health", get(handlers::system::health_check))
            .route(
                "/api/users",
                get(handlers::users::list_users).post(handlers::users::register),
            )
            .route("/api/users/login", post(handlers::users::login))
            .route("/api/projects", get(handlers::projects::list_projects))
            .route("/api/projects/tags", get(handlers::projects::list_tags))
            .route("/api/projects/{id}", get(handlers::projects::get_project))
            .route("/api/teams", get(handlers::teams::list_teams))
            .route("/api/teams/{id}", get(handlers::teams::get_team))
            .route(
                "/api/teams/{id}/members",
                get(handlers::teams::list_members),
            )
            .route(
                "/api/comments/{project_id}",
                get(handlers::feedback::list_comments),
            )
            .route(
                "/api/suggestions/{project_id}",
                get(handlers::feedback::list_suggestions),
            )
            .with_state(self.state.clone());

        let protected_router = Router::new()
            .route("/api/users/me", get(handlers::users::get_current_user))
            .route("/api/users/me/projects", get(handlers::users::my_projects))
            .route("/api/users/me/teams", get(handlers::users::my_teams))
            .route("/api/projects", post(handlers::projects::create_project))
            .route(
                "/api/projects/{id}",
                put(handlers::projects::update_project)
                    .delete(handlers::projects::delete_project),
            )
            .route("/api/teams", post(handlers::teams::create_team))
            .route(
                "/api/teams/{id}",
                put(handlers::teams::update_team)
                    .delete(handlers::teams::delete_team),
            )
            .route("/api/teams/{id}/members", post(handlers::teams::add_member))
            .route(
                "/api/teams/{id}/members/{user_id}",
                delete(handlers::teams::remove_member),
            )
            .route("/api/teams/{id}/requests", get(handlers::teams::list_requests))
            .route(
                "/api/teams/{id}/requests/{user_id}",
                delete(handlers::teams::discard_request),
            )
            .route(
                "/api/teams/{id}/requests/{user_id}/approve",
                post(handlers::teams::approve_request),
            )
            .route("/api/comments", post(handlers::feedback::create_comment))
            .route(
                "/api/suggestions",
                post(handlers::feedback::create_suggestion),
            )
            .with_state(self.state.clone())
            .layer(axum_middleware::from_fn_with_state(
                jwt_state,
                middleware::require_auth,
            ));

        let router = Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api/openapi.json", ApiDoc::openapi()))
            .merge(public_router)
            .merge(protected_router)
            .layer(TraceLayer::new_for_http());

        match self.cors_layer() {
            Some(cors) => router.layer(cors),
            None => router,
        }
    }

    fn cors_layer(&self) -> Option<CorsLayer> {
        if !self.config.enable_cors {
            return None;
        }

        let origins: Vec<HeaderValue> = self
            .config
            .cors_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();

        Some(
            CorsLayer::new()
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_origin(AllowOrigin::list(origins)),
        )
    }

    /// Serve until Ctrl-C
    pub async fn start(self) -> Result<(), anyhow::Error> {
        self.start_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl-C: {}", e);
            }
        })
        .await
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests
    pub async fn start_with_shutdown<F>(self, shutdown: F) -> Result<(), anyhow::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.build_router();

        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        let addr = listener.local_addr()?;

        info!("Starting API server on {}", addr);
        info!("OpenAPI spec: http://{}/api/openapi.json", addr);
        info!("Swagger UI: http://{}/swagger-ui", addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

        info!("API server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_generation() {
        let doc = ApiDoc::openapi();
        let json = serde_json::to_value(&doc).unwrap();

        assert!(json["paths"]["/api/teams/{id}/members/{user_id}"].is_object());
        assert!(json["components"]["securitySchemes"]["bearer_auth"].is_object());
    }
}
