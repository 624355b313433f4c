//! "Mine vs. all" project classification

use sea_orm::{ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use showcase_db::entities::project;
use std::collections::HashSet;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::models::MyProject;
use crate::policy;
use crate::services::teams;

/// How a project relates to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ownership {
    pub is_direct_owner: bool,
    pub is_team_project: bool,
    pub can_edit: bool,
}

impl Ownership {
    /// Shown under "my projects"
    pub fn is_mine(&self) -> bool {
        self.is_direct_owner || self.is_team_project
    }
}

pub fn classify(
    project: &project::Model,
    caller: &AuthUser,
    member_team_ids: &HashSet<Uuid>,
) -> Ownership {
    Ownership {
        is_direct_owner: project.created_by == caller.user_id,
        is_team_project: project
            .team_id
            .is_some_and(|team_id| member_team_ids.contains(&team_id)),
        can_edit: policy::can_edit_project(caller, project),
    }
}

/// Live projects the caller created or that belong to one of their teams,
/// newest first.
pub async fn my_projects<C: ConnectionTrait>(
    db: &C,
    caller: &AuthUser,
) -> Result<Vec<MyProject>, ApiError> {
    let team_ids: HashSet<Uuid> = teams::team_ids_of(db, caller.user_id)
        .await?
        .into_iter()
        .collect();

    let mut scope = Condition::any().add(project::Column::CreatedBy.eq(caller.user_id));
    if !team_ids.is_empty() {
        scope = scope.add(project::Column::TeamId.is_in(team_ids.iter().copied()));
    }

    let projects = project::Entity::find()
        .filter(project::Column::DeletedAt.is_null())
        .filter(scope)
        .order_by_desc(project::Column::CreatedAt)
        .order_by_desc(project::Column::Id)
        .all(db)
        .await?;

    Ok(projects
        .into_iter()
        .filter_map(|project| {
            let ownership = classify(&project, caller, &team_ids);
            ownership.is_mine().then(|| MyProject {
                project: project.into(),
                is_direct_owner: ownership.is_direct_owner,
                is_team_project: ownership.is_team_project,
                can_edit: ownership.can_edit,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UserRole;
    use chrono::Utc;

    fn caller(role: UserRole) -> AuthUser {
        AuthUser {
            user_id: Uuid::new_v4(),
            email: "me@example.com".to_string(),
            role,
        }
    }

    fn project(created_by: Uuid, team_id: Option<Uuid>) -> project::Model {
        project::Model {
            id: Uuid::new_v4(),
            title: "Board".to_string(),
            description: None,
            code_url: "https://example.com/board".to_string(),
            created_by,
            team_id,
            tags: "[]".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn own_project_is_mine_and_editable() {
        let me = caller(UserRole::Novice);
        let ownership = classify(&project(me.user_id, None), &me, &HashSet::new());

        assert!(ownership.is_direct_owner);
        assert!(!ownership.is_team_project);
        assert!(ownership.can_edit);
        assert!(ownership.is_mine());
    }

    #[test]
    fn teammate_project_is_mine_but_read_only() {
        let me = caller(UserRole::Novice);
        let team_id = Uuid::new_v4();
        let teams: HashSet<Uuid> = [team_id].into_iter().collect();

        let ownership = classify(&project(Uuid::new_v4(), Some(team_id)), &me, &teams);

        assert!(!ownership.is_direct_owner);
        assert!(ownership.is_team_project);
        assert!(!ownership.can_edit);
        assert!(ownership.is_mine());
    }

    #[test]
    fn foreign_project_is_not_mine() {
        let me = caller(UserRole::Admin);
        let ownership = classify(
            &project(Uuid::new_v4(), Some(Uuid::new_v4())),
            &me,
            &HashSet::new(),
        );

        assert!(!ownership.is_mine());
        // admins may still edit everything
        assert!(ownership.can_edit);
    }
}
