use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contract::Table)
                    .if_not_exists()
                    .col(uuid(Contract::Id).primary_key())
                    .col(uuid(Contract::LeadId).unique_key().not_null())
                    .col(uuid(Contract::ProjectId).not_null())
                    .col(uuid(Contract::PromoteurId).not_null())
                    .col(uuid(Contract::ClientId).not_null())
                    .col(big_integer(Contract::AmountCents).not_null())
                    .col(text(Contract::Terms).not_null())
                    .col(string_len(Contract::Status, 32).not_null())
                    .col(timestamp_with_time_zone_null(Contract::SentAt))
                    .col(timestamp_with_time_zone_null(Contract::SignedAt))
                    .col(timestamp_with_time_zone(Contract::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Contract::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_contract_lead")
                            .from(Contract::Table, Contract::LeadId)
                            .to(Lead::Table, Lead::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contract::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Contract {
    Table,
    Id,
    LeadId,
    ProjectId,
    PromoteurId,
    ClientId,
    AmountCents,
    Terms,
    Status,
    SentAt,
    SignedAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Lead { Table, Id }
