//! Create `project` and `project_photo`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Project::Table)
                    .if_not_exists()
                    .col(uuid(Project::Id).primary_key())
                    .col(uuid(Project::OwnerId).not_null())
                    .col(string_len(Project::Title, 200).not_null())
                    .col(text(Project::Description).not_null())
                    .col(string_len(Project::City, 120).not_null())
                    .col(string_len_null(Project::Address, 255))
                    .col(double_null(Project::Latitude))
                    .col(double_null(Project::Longitude))
                    .col(big_integer_null(Project::PriceMinCents))
                    .col(big_integer_null(Project::PriceMaxCents))
                    .col(integer(Project::UnitsTotal).not_null())
                    .col(string_len_null(Project::DeliveryDate, 10))
                    .col(string_len(Project::Status, 32).not_null())
                    .col(text_null(Project::RejectionReason))
                    .col(timestamp_with_time_zone(Project::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Project::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_owner")
                            .from(Project::Table, Project::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ProjectPhoto::Table)
                    .if_not_exists()
                    .col(uuid(ProjectPhoto::Id).primary_key())
                    .col(uuid(ProjectPhoto::ProjectId).not_null())
                    .col(string_len(ProjectPhoto::Url, 2048).not_null())
                    .col(double_null(ProjectPhoto::Latitude))
                    .col(double_null(ProjectPhoto::Longitude))
                    .col(boolean(ProjectPhoto::GeoVerified).not_null().default(false))
                    .col(double_null(ProjectPhoto::DistanceKm))
                    .col(timestamp_with_time_zone(ProjectPhoto::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_photo_project")
                            .from(ProjectPhoto::Table, ProjectPhoto::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(ProjectPhoto::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Project::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Project {
    Table,
    Id,
    OwnerId,
    Title,
    Description,
    City,
    Address,
    Latitude,
    Longitude,
    PriceMinCents,
    PriceMaxCents,
    UnitsTotal,
    DeliveryDate,
    Status,
    RejectionReason,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProjectPhoto { Table, Id, ProjectId, Url, Latitude, Longitude, GeoVerified, DistanceKm, CreatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
