//! Joining, leaving and join-request handling
//!
//! Each operation runs in one transaction. A team always keeps at least one
//! member and its creator is always one of them: when the last member leaves
//! the team is removed, and when the creator leaves ownership passes to the
//! earliest-joined remaining member.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use showcase_db::entities::{join_request, team, team_member, user};
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::{
    JoinRequestInfo, MembershipResponse, MembershipStatus, TeamMember, UserSummary,
};
use crate::policy::{self, JoinDecision};
use crate::services::teams;

async fn find_user<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::not_found("User"))
}

async fn find_request<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Option<join_request::Model>, ApiError> {
    Ok(join_request::Entity::find()
        .filter(join_request::Column::TeamId.eq(team_id))
        .filter(join_request::Column::UserId.eq(user_id))
        .one(db)
        .await?)
}

async fn drop_request<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<u64, ApiError> {
    Ok(join_request::Entity::delete_many()
        .filter(join_request::Column::TeamId.eq(team_id))
        .filter(join_request::Column::UserId.eq(user_id))
        .exec(db)
        .await?
        .rows_affected)
}

async fn joined(db: &DatabaseConnection, team_id: Uuid) -> Result<MembershipResponse, ApiError> {
    let team = teams::find_team(db, team_id).await?;
    Ok(MembershipResponse {
        status: MembershipStatus::Joined,
        team: Some(teams::team_view(db, team).await?),
    })
}

/// Put `target_id` into the team, or queue a join request for a private team.
pub async fn join(
    db: &DatabaseConnection,
    caller: &AuthUser,
    team_id: Uuid,
    target_id: Uuid,
) -> Result<MembershipResponse, ApiError> {
    let txn = db.begin().await?;

    let team = teams::find_team(&txn, team_id).await?;
    find_user(&txn, target_id).await?;

    if teams::is_member(&txn, team.id, target_id).await? {
        return Err(ApiError::conflict(
            "ALREADY_MEMBER",
            "User is already a member of this team",
        ));
    }

    match policy::join_decision(caller, &team, target_id) {
        JoinDecision::Deny => Err(ApiError::Forbidden(
            "Only the team creator can add other users".to_string(),
        )),
        JoinDecision::Grant => {
            teams::insert_member(&txn, team.id, target_id).await?;
            drop_request(&txn, team.id, target_id).await?;
            txn.commit().await?;

            info!("User {} joined team {}", target_id, team.id);
            joined(db, team.id).await
        }
        JoinDecision::Request => {
            if find_request(&txn, team.id, target_id).await?.is_some() {
                return Err(ApiError::conflict(
                    "REQUEST_PENDING",
                    "A join request is already pending",
                ));
            }

            join_request::ActiveModel {
                team_id: Set(team.id),
                user_id: Set(target_id),
                requested_at: Set(Utc::now()),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
            txn.commit().await?;

            info!("User {} requested to join team {}", target_id, team.id);
            Ok(MembershipResponse {
                status: MembershipStatus::Pending,
                team: None,
            })
        }
    }
}

/// Remove `member_id` from the team, keeping the team's invariants.
pub async fn leave(
    db: &DatabaseConnection,
    caller: &AuthUser,
    team_id: Uuid,
    member_id: Uuid,
) -> Result<MembershipResponse, ApiError> {
    let txn = db.begin().await?;

    let team = teams::find_team(&txn, team_id).await?;

    if !policy::can_remove_member(caller, &team, member_id) {
        return Err(ApiError::Forbidden(
            "Only the member or the team creator can remove a member".to_string(),
        ));
    }

    let removed = team_member::Entity::delete_many()
        .filter(team_member::Column::TeamId.eq(team.id))
        .filter(team_member::Column::UserId.eq(member_id))
        .exec(&txn)
        .await?
        .rows_affected;

    if removed == 0 {
        return Err(ApiError::NotFound(
            "User is not a member of this team".to_string(),
        ));
    }

    let remaining = teams::memberships(&txn, team.id).await?;

    let Some(successor) = remaining.first() else {
        teams::purge_team(&txn, team.id).await?;
        txn.commit().await?;

        info!("Last member {} left, team {} deleted", member_id, team.id);
        return Ok(MembershipResponse {
            status: MembershipStatus::TeamDeleted,
            team: None,
        });
    };

    if team.created_by == member_id {
        let successor_id = successor.user_id;
        let mut active: team::ActiveModel = team.into();
        active.created_by = Set(successor_id);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        info!(
            "Creator {} left team {}, ownership passed to {}",
            member_id, team_id, successor_id
        );
    } else {
        info!("User {} left team {}", member_id, team_id);
    }

    txn.commit().await?;

    let team = teams::find_team(db, team_id).await?;
    Ok(MembershipResponse {
        status: MembershipStatus::Left,
        team: Some(teams::team_view(db, team).await?),
    })
}

/// Turn a pending join request into a membership.
pub async fn approve(
    db: &DatabaseConnection,
    caller: &AuthUser,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<MembershipResponse, ApiError> {
    let txn = db.begin().await?;

    let team = teams::find_team(&txn, team_id).await?;

    if !policy::can_manage_team(caller, &team) {
        return Err(ApiError::Forbidden(
            "Only the team creator can approve join requests".to_string(),
        ));
    }

    if find_request(&txn, team.id, user_id).await?.is_none() {
        return Err(ApiError::not_found("Join request"));
    }

    drop_request(&txn, team.id, user_id).await?;
    if !teams::is_member(&txn, team.id, user_id).await? {
        teams::insert_member(&txn, team.id, user_id).await?;
    }
    txn.commit().await?;

    info!("Join request of {} for team {} approved", user_id, team_id);
    joined(db, team_id).await
}

/// Reject (owner) or withdraw (requester) a pending join request.
pub async fn discard_request(
    db: &DatabaseConnection,
    caller: &AuthUser,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<(), ApiError> {
    let team = teams::find_team(db, team_id).await?;

    if !policy::can_discard_request(caller, &team, user_id) {
        return Err(ApiError::Forbidden(
            "Only the requester or the team creator can discard a join request".to_string(),
        ));
    }

    if drop_request(db, team.id, user_id).await? == 0 {
        return Err(ApiError::not_found("Join request"));
    }

    info!("Join request of {} for team {} discarded", user_id, team_id);
    Ok(())
}

pub async fn list_members<C: ConnectionTrait>(
    db: &C,
    team_id: Uuid,
) -> Result<Vec<TeamMember>, ApiError> {
    let team = teams::find_team(db, team_id).await?;

    let rows = team_member::Entity::find()
        .filter(team_member::Column::TeamId.eq(team.id))
        .order_by_asc(team_member::Column::JoinedAt)
        .order_by_asc(team_member::Column::Id)
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(membership, user)| {
            user.map(|user| TeamMember {
                is_creator: user.id == team.created_by,
                user: UserSummary::from(&user),
                joined_at: membership.joined_at,
            })
        })
        .collect())
}

pub async fn list_requests<C: ConnectionTrait>(
    db: &C,
    caller: &AuthUser,
    team_id: Uuid,
) -> Result<Vec<JoinRequestInfo>, ApiError> {
    let team = teams::find_team(db, team_id).await?;

    if !policy::can_manage_team(caller, &team) {
        return Err(ApiError::Forbidden(
            "Only the team creator can view join requests".to_string(),
        ));
    }

    let rows = join_request::Entity::find()
        .filter(join_request::Column::TeamId.eq(team.id))
        .order_by_asc(join_request::Column::RequestedAt)
        .order_by_asc(join_request::Column::Id)
        .find_also_related(user::Entity)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|(request, user)| {
            user.map(|user| JoinRequestInfo {
                user: UserSummary::from(&user),
                requested_at: request.requested_at,
            })
        })
        .collect())
}
