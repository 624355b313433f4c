use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use showcase_db::entities::user::UserRole as DbUserRole;

/// Default page size for list endpoints
pub const DEFAULT_LIMIT: usize = 100;

/// Largest page size a client may request
pub const MAX_LIMIT: usize = 1000;

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Stable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database reachability ("ok" or "unavailable")
    pub database: String,
}

// ============================================================================
// Users and sessions
// ============================================================================

/// Platform role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Default role
    Novice,
    /// Reviews other people's projects
    Mentor,
    /// May manage any team or project
    Admin,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Novice => "novice",
            UserRole::Mentor => "mentor",
            UserRole::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "novice" => Some(UserRole::Novice),
            "mentor" => Some(UserRole::Mentor),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

impl From<DbUserRole> for UserRole {
    fn from(role: DbUserRole) -> Self {
        match role {
            DbUserRole::Novice => UserRole::Novice,
            DbUserRole::Mentor => UserRole::Mentor,
            DbUserRole::Admin => UserRole::Admin,
        }
    }
}

impl From<UserRole> for DbUserRole {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Novice => DbUserRole::Novice,
            UserRole::Mentor => DbUserRole::Mentor,
            UserRole::Admin => DbUserRole::Admin,
        }
    }
}

/// User account (never includes the password hash)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub created_at: DateTime<Utc>,
}

impl From<showcase_db::entities::user::Model> for User {
    fn from(model: showcase_db::entities::user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role.into(),
            created_at: model.created_at,
        }
    }
}

/// Short user reference embedded in other resources
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
}

impl From<&showcase_db::entities::user::Model> for UserSummary {
    fn from(model: &showcase_db::entities::user::Model) -> Self {
        Self {
            id: model.id,
            username: model.username.clone(),
        }
    }
}

/// List of users
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub users: Vec<User>,
    pub total: usize,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Public handle, 3 to 32 characters
    pub username: String,
    pub email: String,
    /// At least 8 characters
    pub password: String,
    /// `novice` (default) or `mentor`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued session (register and login)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    /// Bearer token for the Authorization header
    pub token: String,
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Teams
// ============================================================================

/// Team with its members and projects
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Team {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Current owner
    pub created_by: Uuid,
    pub is_public: bool,
    pub tags: Vec<String>,
    /// Member ids in join order
    pub members: Vec<Uuid>,
    /// Live projects scoped to this team
    pub project_ids: Vec<Uuid>,
    pub member_count: usize,
    pub project_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Paginated team list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamList {
    pub teams: Vec<Team>,
    /// Matches before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Team list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct TeamQuery {
    /// Only teams this user is a member of
    #[serde(default, alias = "userId")]
    pub user_id: Option<Uuid>,
    /// Case-insensitive match on name, description or tags
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Create team request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTeamRequest {
    /// 1 to 50 characters
    pub name: String,
    /// Up to 500 characters
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "isPublic")]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update team request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateTeamRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "isPublic")]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Member entry of a team
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamMember {
    pub user: UserSummary,
    pub joined_at: DateTime<Utc>,
    pub is_creator: bool,
}

/// Team members in join order
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeamMemberList {
    pub members: Vec<TeamMember>,
    pub total: usize,
}

/// Add-member / join request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddMemberRequest {
    #[serde(alias = "userId")]
    pub user_id: Uuid,
}

/// Outcome of a membership change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum MembershipStatus {
    /// User is now a member
    Joined,
    /// Join request recorded, waiting for approval
    Pending,
    /// User is no longer a member
    Left,
    /// Last member left, the team is gone
    TeamDeleted,
}

/// Membership change response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MembershipResponse {
    pub status: MembershipStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<Team>,
}

/// Pending join request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinRequestInfo {
    pub user: UserSummary,
    pub requested_at: DateTime<Utc>,
}

/// Pending join requests, oldest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct JoinRequestList {
    pub requests: Vec<JoinRequestInfo>,
    pub total: usize,
}

// ============================================================================
// Projects
// ============================================================================

/// Showcased project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub code_url: String,
    pub created_by: Uuid,
    pub team_id: Option<Uuid>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<showcase_db::entities::project::Model> for Project {
    fn from(model: showcase_db::entities::project::Model) -> Self {
        Self {
            id: model.id,
            tags: showcase_db::tags::decode(&model.tags),
            title: model.title,
            description: model.description,
            code_url: model.code_url,
            created_by: model.created_by,
            team_id: model.team_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Paginated project list
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProjectList {
    pub projects: Vec<Project>,
    /// Matches before pagination
    pub total: usize,
    pub offset: usize,
    pub limit: usize,
}

/// Project list filters
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ProjectQuery {
    /// Case-insensitive match on title, description or tags
    #[serde(default)]
    pub q: Option<String>,
    /// Comma-separated tags; a project matches if it carries any of them
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default, alias = "teamId")]
    pub team_id: Option<Uuid>,
    #[serde(default, alias = "createdBy")]
    pub created_by: Option<Uuid>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// Create project request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// http(s) link to the code repository
    #[serde(alias = "codeUrl")]
    pub code_url: String,
    /// Team to scope the project to; the caller must be a member
    #[serde(default, alias = "teamId")]
    pub team_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update project request; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProjectRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "codeUrl")]
    pub code_url: Option<String>,
    /// `null` detaches the project from its team
    #[serde(
        default,
        alias = "teamId",
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<Uuid>)]
    pub team_id: Option<Option<Uuid>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Distinct tags across live projects
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagList {
    pub tags: Vec<String>,
}

/// Project as seen by the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyProject {
    #[serde(flatten)]
    pub project: Project,
    /// Caller created the project
    pub is_direct_owner: bool,
    /// Project belongs to a team the caller is a member of
    pub is_team_project: bool,
    /// Caller may update or delete the project
    pub can_edit: bool,
}

/// Caller's projects
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MyProjectList {
    pub projects: Vec<MyProject>,
    pub total: usize,
}

// ============================================================================
// Comments and suggestions
// ============================================================================

/// A comment or suggestion attached to a project
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Feedback {
    pub id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    /// Present while the author account exists
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<UserSummary>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Comments or suggestions of a project, newest first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FeedbackList {
    pub items: Vec<Feedback>,
    pub total: usize,
}

/// Create comment request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateCommentRequest {
    #[serde(alias = "projectId")]
    pub project_id: Uuid,
    pub content: String,
}

/// Create suggestion request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSuggestionRequest {
    #[serde(alias = "projectId")]
    pub project_id: Uuid,
    #[serde(alias = "suggestion")]
    pub content: String,
}

/// Clamp client supplied pagination to `(offset, limit)`.
pub fn page_bounds(offset: Option<usize>, limit: Option<usize>) -> (usize, usize) {
    (
        offset.unwrap_or(0),
        limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
    )
}
