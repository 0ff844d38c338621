//! Create `lead`. `promoteur_id` duplicates the project owner so pipelines can be listed without a join.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lead::Table)
                    .if_not_exists()
                    .col(uuid(Lead::Id).primary_key())
                    .col(uuid(Lead::ProjectId).not_null())
                    .col(uuid(Lead::ClientId).not_null())
                    .col(uuid(Lead::PromoteurId).not_null())
                    .col(text(Lead::Message).not_null())
                    .col(string_len_null(Lead::Phone, 32))
                    .col(string_len(Lead::Status, 32).not_null())
                    .col(timestamp_with_time_zone_null(Lead::FirstResponseAt))
                    .col(text_null(Lead::Notes))
                    .col(timestamp_with_time_zone(Lead::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Lead::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lead_project")
                            .from(Lead::Table, Lead::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Lead::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    ProjectId,
    ClientId,
    PromoteurId,
    Message,
    Phone,
    Status,
    FirstResponseAt,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Project { Table, Id }
