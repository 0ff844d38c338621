use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GdprRequest::Table)
                    .if_not_exists()
                    .col(uuid(GdprRequest::Id).primary_key())
                    .col(uuid(GdprRequest::UserId).not_null())
                    .col(string_len(GdprRequest::Kind, 16).not_null())
                    .col(string_len(GdprRequest::Status, 16).not_null())
                    .col(timestamp_with_time_zone(GdprRequest::CompletedAt).not_null())
                    .col(timestamp_with_time_zone(GdprRequest::CreatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(GdprRequest::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum GdprRequest { Table, Id, UserId, Kind, Status, CompletedAt, CreatedAt }
