//! Create `support_ticket` and its `ticket_message` thread.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SupportTicket::Table)
                    .if_not_exists()
                    .col(uuid(SupportTicket::Id).primary_key())
                    .col(uuid(SupportTicket::UserId).not_null())
                    .col(string_len(SupportTicket::Subject, 200).not_null())
                    .col(string_len(SupportTicket::Priority, 16).not_null())
                    .col(string_len(SupportTicket::Status, 32).not_null())
                    .col(uuid_null(SupportTicket::AssignedTo))
                    .col(timestamp_with_time_zone(SupportTicket::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SupportTicket::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TicketMessage::Table)
                    .if_not_exists()
                    .col(uuid(TicketMessage::Id).primary_key())
                    .col(uuid(TicketMessage::TicketId).not_null())
                    .col(uuid(TicketMessage::AuthorId).not_null())
                    .col(text(TicketMessage::Body).not_null())
                    .col(timestamp_with_time_zone(TicketMessage::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ticket_message_ticket")
                            .from(TicketMessage::Table, TicketMessage::TicketId)
                            .to(SupportTicket::Table, SupportTicket::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TicketMessage::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(SupportTicket::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SupportTicket { Table, Id, UserId, Subject, Priority, Status, AssignedTo, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum TicketMessage { Table, Id, TicketId, AuthorId, Body, CreatedAt }
