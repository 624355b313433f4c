//! User accounts

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a user on the platform
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum UserRole {
    /// Default role for self-registered accounts
    #[sea_orm(string_value = "novice")]
    Novice,

    /// Experienced member reviewing other people's projects
    #[sea_orm(string_value = "mentor")]
    Mentor,

    /// Platform administrator; may manage any team or project
    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Public handle (unique)
    #[sea_orm(unique)]
    pub username: String,

    /// Login email (unique)
    #[sea_orm(unique)]
    pub email: String,

    /// Argon2id PHC string; never leaves the server
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub role: UserRole,

    pub created_at: ChronoDateTimeUtc,

    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Teams this user is a member of
    #[sea_orm(has_many = "super::team_member::Entity")]
    TeamMemberships,

    /// Projects created by this user
    #[sea_orm(has_many = "super::project::Entity")]
    Projects,

    /// Comments written by this user
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,

    /// Suggestions written by this user
    #[sea_orm(has_many = "super::suggestion::Entity")]
    Suggestions,
}

impl Related<super::team_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TeamMemberships.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Projects.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl Related<super::suggestion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Suggestions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
