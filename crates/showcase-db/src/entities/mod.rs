//! Database entities

pub mod comment;
pub mod join_request;
pub mod project;
pub mod suggestion;
pub mod team;
pub mod team_member;
pub mod user;

pub use comment::Entity as Comment;
pub use join_request::Entity as JoinRequest;
pub use project::Entity as Project;
pub use suggestion::Entity as Suggestion;
pub use team::Entity as Team;
pub use team_member::Entity as TeamMember;
pub use user::Entity as User;

pub mod prelude {
    pub use super::comment::Entity as Comment;
    pub use super::join_request::Entity as JoinRequest;
    pub use super::project::Entity as Project;
    pub use super::suggestion::Entity as Suggestion;
    pub use super::team::Entity as Team;
    pub use super::team_member::Entity as TeamMember;
    pub use super::user::Entity as User;
}
