//! Authorization rules
//!
//! Pure functions over the caller and the loaded rows. Handlers and services
//! consult these before every mutation; nothing here touches the database.

use showcase_db::entities::{project, team};
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::UserRole;

/// What happens when `caller` asks to put `target` into a team
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDecision {
    /// Add the membership right away
    Grant,
    /// Record a join request for the owner to approve
    Request,
    /// Not allowed
    Deny,
}

/// Team creator or admin
pub fn can_manage_team(caller: &AuthUser, team: &team::Model) -> bool {
    caller.is_admin() || team.created_by == caller.user_id
}

/// Project creator or admin. Team membership alone is not enough.
pub fn can_edit_project(caller: &AuthUser, project: &project::Model) -> bool {
    caller.is_admin() || project.created_by == caller.user_id
}

/// The member themselves, the team creator or an admin
pub fn can_remove_member(caller: &AuthUser, team: &team::Model, member_id: Uuid) -> bool {
    caller.user_id == member_id || can_manage_team(caller, team)
}

/// The requesting user, the team creator or an admin
pub fn can_discard_request(caller: &AuthUser, team: &team::Model, requester_id: Uuid) -> bool {
    caller.user_id == requester_id || can_manage_team(caller, team)
}

pub fn join_decision(caller: &AuthUser, team: &team::Model, target_id: Uuid) -> JoinDecision {
    if can_manage_team(caller, team) {
        JoinDecision::Grant
    } else if caller.user_id != target_id {
        JoinDecision::Deny
    } else if team.is_public {
        JoinDecision::Grant
    } else {
        JoinDecision::Request
    }
}

/// Roles a visitor may pick for themselves at signup
pub fn can_self_register_as(role: UserRole) -> bool {
    matches!(role, UserRole::Novice | UserRole::Mentor)
}
