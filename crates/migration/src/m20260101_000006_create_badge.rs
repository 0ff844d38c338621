//! Create `badge` and `user_badge` awards.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Badge::Table)
                    .if_not_exists()
                    .col(uuid(Badge::Id).primary_key())
                    .col(string_len(Badge::Code, 64).unique_key().not_null())
                    .col(string_len(Badge::Name, 128).not_null())
                    .col(text_null(Badge::Description))
                    .col(boolean(Badge::Active).not_null().default(true))
                    .col(timestamp_with_time_zone(Badge::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Badge::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserBadge::Table)
                    .if_not_exists()
                    .col(uuid(UserBadge::Id).primary_key())
                    .col(uuid(UserBadge::UserId).not_null())
                    .col(uuid(UserBadge::BadgeId).not_null())
                    .col(uuid(UserBadge::AwardedBy).not_null())
                    .col(text_null(UserBadge::Note))
                    .col(timestamp_with_time_zone(UserBadge::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badge_badge")
                            .from(UserBadge::Table, UserBadge::BadgeId)
                            .to(Badge::Table, Badge::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_badge_user")
                            .from(UserBadge::Table, UserBadge::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserBadge::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Badge::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Badge { Table, Id, Code, Name, Description, Active, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum UserBadge { Table, Id, UserId, BadgeId, AwardedBy, Note, CreatedAt }

#[derive(DeriveIden)]
enum Users { Table, Id }
