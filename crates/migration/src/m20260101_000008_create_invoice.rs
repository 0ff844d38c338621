//! Create `invoice` and `invoice_line`. Amounts are integer cents.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Invoice::Table)
                    .if_not_exists()
                    .col(uuid(Invoice::Id).primary_key())
                    .col(string_len(Invoice::Number, 32).unique_key().not_null())
                    .col(uuid(Invoice::PromoteurId).not_null())
                    .col(string_len(Invoice::Status, 32).not_null())
                    .col(big_integer(Invoice::SubtotalCents).not_null())
                    .col(integer(Invoice::TaxRateBps).not_null())
                    .col(big_integer(Invoice::TaxCents).not_null())
                    .col(big_integer(Invoice::TotalCents).not_null())
                    .col(string_len_null(Invoice::DueDate, 10))
                    .col(timestamp_with_time_zone_null(Invoice::IssuedAt))
                    .col(timestamp_with_time_zone_null(Invoice::PaidAt))
                    .col(string_len_null(Invoice::PaymentReference, 128))
                    .col(timestamp_with_time_zone(Invoice::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Invoice::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_promoteur")
                            .from(Invoice::Table, Invoice::PromoteurId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InvoiceLine::Table)
                    .if_not_exists()
                    .col(uuid(InvoiceLine::Id).primary_key())
                    .col(uuid(InvoiceLine::InvoiceId).not_null())
                    .col(integer(InvoiceLine::Position).not_null())
                    .col(string_len(InvoiceLine::Description, 500).not_null())
                    .col(integer(InvoiceLine::Quantity).not_null())
                    .col(big_integer(InvoiceLine::UnitPriceCents).not_null())
                    .col(big_integer(InvoiceLine::LineTotalCents).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_invoice_line_invoice")
                            .from(InvoiceLine::Table, InvoiceLine::InvoiceId)
                            .to(Invoice::Table, Invoice::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(InvoiceLine::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Invoice::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Invoice {
    Table,
    Id,
    Number,
    PromoteurId,
    Status,
    SubtotalCents,
    TaxRateBps,
    TaxCents,
    TotalCents,
    DueDate,
    IssuedAt,
    PaidAt,
    PaymentReference,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InvoiceLine { Table, Id, InvoiceId, Position, Description, Quantity, UnitPriceCents, LineTotalCents }

#[derive(DeriveIden)]
enum Users { Table, Id }
