//! Initial schema: users, teams, memberships, projects and project feedback

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ============================================================
        // users
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(uuid(User::Id).primary_key())
                    .col(string_len(User::Username, 32).unique_key())
                    .col(string_len(User::Email, 255).unique_key())
                    .col(string_len(User::PasswordHash, 255))
                    .col(string_len(User::Role, 16).default("novice"))
                    .col(timestamp_with_time_zone(User::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(User::UpdatedAt).default(Expr::current_timestamp()))
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // teams
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Team::Table)
                    .if_not_exists()
                    .col(uuid(Team::Id).primary_key())
                    .col(string_len(Team::Name, 50))
                    .col(text_null(Team::Description))
                    .col(uuid(Team::CreatedBy))
                    .col(boolean(Team::IsPublic).default(false))
                    .col(text(Team::Tags).default("[]"))
                    .col(timestamp_with_time_zone(Team::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Team::UpdatedAt).default(Expr::current_timestamp()))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_teams_created_by")
                            .from(Team::Table, Team::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_teams_created_by")
                    .table(Team::Table)
                    .col(Team::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // team_members
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(TeamMember::Table)
                    .if_not_exists()
                    .col(pk_auto(TeamMember::Id))
                    .col(uuid(TeamMember::TeamId))
                    .col(uuid(TeamMember::UserId))
                    .col(
                        timestamp_with_time_zone(TeamMember::JoinedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_team_id")
                            .from(TeamMember::Table, TeamMember::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_team_members_user_id")
                            .from(TeamMember::Table, TeamMember::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One membership row per (team, user)
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_team_user")
                    .table(TeamMember::Table)
                    .col(TeamMember::TeamId)
                    .col(TeamMember::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_team_members_user_id")
                    .table(TeamMember::Table)
                    .col(TeamMember::UserId)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // projects
        // ============================================================
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(string_len(Project::Title, 255))
                    .col(text_null(Project::Description))
                    .col(string_len(Project::CodeUrl, 2048))
                    .col(uuid(Project::CreatedBy))
                    .col(uuid_null(Project::TeamId))
                    .col(text(Project::Tags).default("[]"))
                    .col(timestamp_with_time_zone(Project::CreatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone(Project::UpdatedAt).default(Expr::current_timestamp()))
                    .col(timestamp_with_time_zone_null(Project::DeletedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_created_by")
                            .from(Project::Table, Project::CreatedBy)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_projects_team_id")
                            .from(Project::Table, Project::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_team_id")
                    .table(Project::Table)
                    .col(Project::TeamId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_projects_created_by")
                    .table(Project::Table)
                    .col(Project::CreatedBy)
                    .to_owned(),
            )
            .await?;

        // ============================================================
        // comments and suggestions share a shape
        // ============================================================
        for (table, fk_project, fk_author, idx) in [
            (
                Feedback::Comments,
                "fk_comments_project_id",
                "fk_comments_author_id",
                "idx_comments_project_id",
            ),
            (
                Feedback::Suggestions,
                "fk_suggestions_project_id",
                "fk_suggestions_author_id",
                "idx_suggestions_project_id",
            ),
        ] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(uuid(Feedback::Id).primary_key())
                        .col(uuid(Feedback::ProjectId))
                        .col(uuid(Feedback::AuthorId))
                        .col(text(Feedback::Content))
                        .col(
                            timestamp_with_time_zone(Feedback::CreatedAt)
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(fk_project)
                                .from(table, Feedback::ProjectId)
                                .to(Project::Table, Project::Id)
                                .on_delete(ForeignKeyAction::Restrict)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(fk_author)
                                .from(table, Feedback::AuthorId)
                                .to(User::Table, User::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name(idx)
                        .table(table)
                        .col(Feedback::ProjectId)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Feedback::Suggestions).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Feedback::Comments).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Project::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeamMember::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Team::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

// ============================================================
// Table identifiers
// ============================================================

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    Role,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
    Name,
    Description,
    CreatedBy,
    IsPublic,
    Tags,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum TeamMember {
    #[sea_orm(iden = "team_members")]
    Table,
    Id,
    TeamId,
    UserId,
    JoinedAt,
}

#[derive(DeriveIden)]
enum Project {
    #[sea_orm(iden = "projects")]
    Table,
    Id,
    Title,
    Description,
    CodeUrl,
    CreatedBy,
    TeamId,
    Tags,
    CreatedAt,
    UpdatedAt,
    DeletedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum Feedback {
    Comments,
    Suggestions,
    Id,
    ProjectId,
    AuthorId,
    Content,
    CreatedAt,
}
