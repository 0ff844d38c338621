use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SecurityIncident::Table)
                    .if_not_exists()
                    .col(uuid(SecurityIncident::Id).primary_key())
                    .col(string_len(SecurityIncident::Title, 200).not_null())
                    .col(text(SecurityIncident::Description).not_null())
                    .col(string_len(SecurityIncident::Severity, 16).not_null())
                    .col(string_len(SecurityIncident::Status, 32).not_null())
                    .col(uuid_null(SecurityIncident::AffectedUserId))
                    .col(uuid(SecurityIncident::ReportedBy).not_null())
                    .col(timestamp_with_time_zone_null(SecurityIncident::ResolvedAt))
                    .col(timestamp_with_time_zone(SecurityIncident::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(SecurityIncident::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SecurityIncident::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum SecurityIncident {
    Table,
    Id,
    Title,
    Description,
    Severity,
    Status,
    AffectedUserId,
    ReportedBy,
    ResolvedAt,
    CreatedAt,
    UpdatedAt,
}
