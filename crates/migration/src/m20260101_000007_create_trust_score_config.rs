//! Singleton row of trust-score weights. Absent until an admin saves it.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrustScoreConfig::Table)
                    .if_not_exists()
                    .col(uuid(TrustScoreConfig::Id).primary_key())
                    .col(double(TrustScoreConfig::Base).not_null())
                    .col(double(TrustScoreConfig::ReviewWeight).not_null())
                    .col(double(TrustScoreConfig::ResponseWeight).not_null())
                    .col(double(TrustScoreConfig::BadgeWeight).not_null())
                    .col(double(TrustScoreConfig::IncidentPenalty).not_null())
                    .col(double(TrustScoreConfig::ReportPenalty).not_null())
                    .col(uuid_null(TrustScoreConfig::UpdatedBy))
                    .col(timestamp_with_time_zone(TrustScoreConfig::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(TrustScoreConfig::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum TrustScoreConfig {
    Table,
    Id,
    Base,
    ReviewWeight,
    ResponseWeight,
    BadgeWeight,
    IncidentPenalty,
    ReportPenalty,
    UpdatedBy,
    UpdatedAt,
}
