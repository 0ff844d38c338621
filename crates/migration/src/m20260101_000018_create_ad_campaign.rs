use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdCampaign::Table)
                    .if_not_exists()
                    .col(uuid(AdCampaign::Id).primary_key())
                    .col(uuid(AdCampaign::ProjectId).not_null())
                    .col(uuid(AdCampaign::PromoteurId).not_null())
                    .col(string_len(AdCampaign::Title, 200).not_null())
                    .col(big_integer(AdCampaign::BudgetCents).not_null())
                    .col(big_integer(AdCampaign::CostPerClickCents).not_null())
                    .col(big_integer(AdCampaign::SpentCents).not_null().default(0))
                    .col(big_integer(AdCampaign::Impressions).not_null().default(0))
                    .col(big_integer(AdCampaign::Clicks).not_null().default(0))
                    .col(string_len(AdCampaign::Status, 32).not_null())
                    .col(timestamp_with_time_zone_null(AdCampaign::StartsAt))
                    .col(timestamp_with_time_zone_null(AdCampaign::EndsAt))
                    .col(timestamp_with_time_zone(AdCampaign::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(AdCampaign::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ad_campaign_project")
                            .from(AdCampaign::Table, AdCampaign::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AdCampaign::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AdCampaign {
    Table,
    Id,
    ProjectId,
    PromoteurId,
    Title,
    BudgetCents,
    CostPerClickCents,
    SpentCents,
    Impressions,
    Clicks,
    Status,
    StartsAt,
    EndsAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Project { Table, Id }
