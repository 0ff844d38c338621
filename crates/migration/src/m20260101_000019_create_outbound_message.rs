//! Create `outbound_message`, the delivery log of messages handed to the provider gateway.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(OutboundMessage::Table)
                    .if_not_exists()
                    .col(uuid(OutboundMessage::Id).primary_key())
                    .col(uuid_null(OutboundMessage::RecipientId))
                    .col(string_len(OutboundMessage::ToPhone, 32).not_null())
                    .col(uuid_null(OutboundMessage::TemplateId))
                    .col(text(OutboundMessage::Body).not_null())
                    .col(string_len(OutboundMessage::Channel, 16).not_null())
                    .col(string_len(OutboundMessage::Status, 16).not_null())
                    .col(string_len_null(OutboundMessage::ProviderMessageId, 128))
                    .col(text_null(OutboundMessage::Error))
                    .col(uuid(OutboundMessage::SentBy).not_null())
                    .col(timestamp_with_time_zone(OutboundMessage::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(OutboundMessage::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(OutboundMessage::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum OutboundMessage {
    Table,
    Id,
    RecipientId,
    ToPhone,
    TemplateId,
    Body,
    Channel,
    Status,
    ProviderMessageId,
    Error,
    SentBy,
    CreatedAt,
    UpdatedAt,
}
