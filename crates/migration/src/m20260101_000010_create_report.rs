//! Create `report`. `target_id` is polymorphic over project, user and review, so it carries no FK.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Report::Table)
                    .if_not_exists()
                    .col(uuid(Report::Id).primary_key())
                    .col(uuid(Report::ReporterId).not_null())
                    .col(string_len(Report::TargetType, 16).not_null())
                    .col(uuid(Report::TargetId).not_null())
                    .col(text(Report::Reason).not_null())
                    .col(string_len(Report::Status, 32).not_null())
                    .col(text_null(Report::ResolutionNote))
                    .col(uuid_null(Report::HandledBy))
                    .col(timestamp_with_time_zone(Report::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Report::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Report::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Report { Table, Id, ReporterId, TargetType, TargetId, Reason, Status, ResolutionNote, HandledBy, CreatedAt, UpdatedAt }
