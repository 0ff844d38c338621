use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appeal::Table)
                    .if_not_exists()
                    .col(uuid(Appeal::Id).primary_key())
                    .col(uuid(Appeal::ProjectId).not_null())
                    .col(uuid(Appeal::PromoteurId).not_null())
                    .col(text(Appeal::Reason).not_null())
                    .col(string_len(Appeal::Status, 32).not_null())
                    .col(integer(Appeal::EscalationLevel).not_null().default(0))
                    .col(timestamp_with_time_zone_null(Appeal::EscalatedAt))
                    .col(text_null(Appeal::DecisionNote))
                    .col(uuid_null(Appeal::DecidedBy))
                    .col(timestamp_with_time_zone(Appeal::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Appeal::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_appeal_project")
                            .from(Appeal::Table, Appeal::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Appeal::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Appeal {
    Table,
    Id,
    ProjectId,
    PromoteurId,
    Reason,
    Status,
    EscalationLevel,
    EscalatedAt,
    DecisionNote,
    DecidedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Project { Table, Id }
