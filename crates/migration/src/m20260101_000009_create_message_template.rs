use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MessageTemplate::Table)
                    .if_not_exists()
                    .col(uuid(MessageTemplate::Id).primary_key())
                    .col(string_len(MessageTemplate::Name, 128).unique_key().not_null())
                    .col(string_len(MessageTemplate::Channel, 16).not_null())
                    .col(string_len_null(MessageTemplate::Subject, 255))
                    .col(text(MessageTemplate::Body).not_null())
                    .col(boolean(MessageTemplate::Active).not_null().default(true))
                    .col(timestamp_with_time_zone(MessageTemplate::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(MessageTemplate::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MessageTemplate::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum MessageTemplate { Table, Id, Name, Channel, Subject, Body, Active, CreatedAt, UpdatedAt }
