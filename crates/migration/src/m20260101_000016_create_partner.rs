use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Partner::Table)
                    .if_not_exists()
                    .col(uuid(Partner::Id).primary_key())
                    .col(string_len(Partner::Name, 200).not_null())
                    .col(string_len(Partner::Category, 32).not_null())
                    .col(string_len_null(Partner::Website, 2048))
                    .col(string_len_null(Partner::ContactEmail, 255))
                    .col(boolean(Partner::Active).not_null().default(true))
                    .col(timestamp_with_time_zone(Partner::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Partner::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Partner::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Partner { Table, Id, Name, Category, Website, ContactEmail, Active, CreatedAt, UpdatedAt }
