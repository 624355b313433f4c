//! Persist requests to join private teams

use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JoinRequest::Table)
                    .if_not_exists()
                    .col(pk_auto(JoinRequest::Id))
                    .col(uuid(JoinRequest::TeamId))
                    .col(uuid(JoinRequest::UserId))
                    .col(
                        timestamp_with_time_zone(JoinRequest::RequestedAt)
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_join_requests_team_id")
                            .from(JoinRequest::Table, JoinRequest::TeamId)
                            .to(Team::Table, Team::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_join_requests_user_id")
                            .from(JoinRequest::Table, JoinRequest::UserId)
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
                    .name("idx_join_requests_team_user")
                    .table(JoinRequest::Table)
                    .col(JoinRequest::TeamId)
                    .col(JoinRequest::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JoinRequest::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JoinRequest {
    #[sea_orm(iden = "join_requests")]
    Table,
    Id,
    TeamId,
    UserId,
    RequestedAt,
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Team {
    #[sea_orm(iden = "teams")]
    Table,
    Id,
}
