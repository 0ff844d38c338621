//! Create `conversation` and `chat_message`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversation::Table)
                    .if_not_exists()
                    .col(uuid(Conversation::Id).primary_key())
                    .col(uuid(Conversation::ProjectId).not_null())
                    .col(uuid(Conversation::ClientId).not_null())
                    .col(uuid(Conversation::PromoteurId).not_null())
                    .col(timestamp_with_time_zone(Conversation::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Conversation::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_conversation_project")
                            .from(Conversation::Table, Conversation::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ChatMessage::Table)
                    .if_not_exists()
                    .col(uuid(ChatMessage::Id).primary_key())
                    .col(uuid(ChatMessage::ConversationId).not_null())
                    .col(uuid(ChatMessage::SenderId).not_null())
                    .col(text(ChatMessage::Body).not_null())
                    .col(timestamp_with_time_zone_null(ChatMessage::ReadAt))
                    .col(timestamp_with_time_zone(ChatMessage::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_chat_message_conversation")
                            .from(ChatMessage::Table, ChatMessage::ConversationId)
                            .to(Conversation::Table, Conversation::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ChatMessage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Conversation::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Conversation { Table, Id, ProjectId, ClientId, PromoteurId, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum ChatMessage { Table, Id, ConversationId, SenderId, Body, ReadAt, CreatedAt }

#[derive(DeriveIden)]
enum Project { Table, Id }
