//! Create the academy tables: `course`, `lesson`, `enrollment`, `lesson_completion`.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Course::Table)
                    .if_not_exists()
                    .col(uuid(Course::Id).primary_key())
                    .col(string_len(Course::Title, 200).not_null())
                    .col(text(Course::Summary).not_null())
                    .col(boolean(Course::Published).not_null().default(false))
                    .col(timestamp_with_time_zone(Course::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Course::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Lesson::Table)
                    .if_not_exists()
                    .col(uuid(Lesson::Id).primary_key())
                    .col(uuid(Lesson::CourseId).not_null())
                    .col(string_len(Lesson::Title, 200).not_null())
                    .col(text(Lesson::Content).not_null())
                    .col(integer(Lesson::Position).not_null())
                    .col(timestamp_with_time_zone(Lesson::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lesson_course")
                            .from(Lesson::Table, Lesson::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Enrollment::Table)
                    .if_not_exists()
                    .col(uuid(Enrollment::Id).primary_key())
                    .col(uuid(Enrollment::UserId).not_null())
                    .col(uuid(Enrollment::CourseId).not_null())
                    .col(timestamp_with_time_zone(Enrollment::CreatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_enrollment_course")
                            .from(Enrollment::Table, Enrollment::CourseId)
                            .to(Course::Table, Course::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(LessonCompletion::Table)
                    .if_not_exists()
                    .col(uuid(LessonCompletion::Id).primary_key())
                    .col(uuid(LessonCompletion::EnrollmentId).not_null())
                    .col(uuid(LessonCompletion::LessonId).not_null())
                    .col(timestamp_with_time_zone(LessonCompletion::CompletedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lesson_completion_enrollment")
                            .from(LessonCompletion::Table, LessonCompletion::EnrollmentId)
                            .to(Enrollment::Table, Enrollment::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_lesson_completion_lesson")
                            .from(LessonCompletion::Table, LessonCompletion::LessonId)
                            .to(Lesson::Table, Lesson::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(LessonCompletion::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Enrollment::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Lesson::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Course::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Course { Table, Id, Title, Summary, Published, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Lesson { Table, Id, CourseId, Title, Content, Position, CreatedAt }

#[derive(DeriveIden)]
enum Enrollment { Table, Id, UserId, CourseId, CreatedAt }

#[derive(DeriveIden)]
enum LessonCompletion { Table, Id, EnrollmentId, LessonId, CompletedAt }
