use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Brochure::Table)
                    .if_not_exists()
                    .col(uuid(Brochure::Id).primary_key())
                    .col(uuid(Brochure::ProjectId).not_null())
                    .col(integer(Brochure::Version).not_null())
                    .col(text(Brochure::Content).not_null())
                    .col(uuid(Brochure::GeneratedBy).not_null())
                    .col(timestamp_with_time_zone(Brochure::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_brochure_project")
                            .from(Brochure::Table, Brochure::ProjectId)
                            .to(Project::Table, Project::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Brochure::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Brochure { Table, Id, ProjectId, Version, Content, GeneratedBy, CreatedAt }

#[derive(DeriveIden)]
enum Project { Table, Id }
