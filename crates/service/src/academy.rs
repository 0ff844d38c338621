//! Training courses for promoteurs and clients: lessons, enrollment, progress.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::validate;
use models::{course, enrollment, lesson, lesson_completion};

use crate::actor::Actor;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub title: String,
    pub summary: String,
    #[serde(default)]
    pub published: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewLesson {
    pub title: String,
    pub content: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: course::Model,
    pub lessons: Vec<lesson::Model>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Progress {
    pub completed: u64,
    pub total: u64,
    pub percent: f64,
}

impl Progress {
    pub fn new(completed: u64, total: u64) -> Self {
        let percent = if total == 0 { 0.0 } else { (completed as f64 / total as f64 * 1000.0).round() / 10.0 };
        Self { completed, total, percent }
    }
}

pub async fn create_course(db: &DatabaseConnection, actor: &Actor, input: NewCourse) -> Result<course::Model, ServiceError> {
    actor.require_admin()?;
    course::validate_title(&input.title)?;
    let now = Utc::now().into();
    let created = course::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        summary: Set(input.summary),
        published: Set(input.published),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(course_id = %created.id, "course_created");
    Ok(created)
}

async fn find_course(db: &DatabaseConnection, id: Uuid) -> Result<course::Model, ServiceError> {
    course::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("course"))
}

/// Unpublished courses are hidden from everyone but admins.
async fn find_published(db: &DatabaseConnection, id: Uuid) -> Result<course::Model, ServiceError> {
    let c = find_course(db, id).await?;
    if !c.published {
        return Err(ServiceError::not_found("course"));
    }
    Ok(c)
}

pub async fn update_course(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: CourseUpdate) -> Result<course::Model, ServiceError> {
    actor.require_admin()?;
    let mut am: course::ActiveModel = find_course(db, id).await?.into();
    if let Some(t) = input.title {
        course::validate_title(&t)?;
        am.title = Set(t);
    }
    if let Some(s) = input.summary { am.summary = Set(s); }
    if let Some(p) = input.published { am.published = Set(p); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn add_lesson(db: &DatabaseConnection, actor: &Actor, course_id: Uuid, input: NewLesson) -> Result<lesson::Model, ServiceError> {
    actor.require_admin()?;
    lesson::validate_lesson(&input.title, input.position)?;
    validate::required("content", &input.content, 100_000)?;
    let c = find_course(db, course_id).await?;
    Ok(lesson::ActiveModel {
        id: Set(Uuid::new_v4()),
        course_id: Set(c.id),
        title: Set(input.title),
        content: Set(input.content),
        position: Set(input.position),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?)
}

pub async fn list_published(db: &DatabaseConnection) -> Result<Vec<course::Model>, ServiceError> {
    Ok(course::Entity::find()
        .filter(course::Column::Published.eq(true))
        .order_by_desc(course::Column::CreatedAt)
        .all(db)
        .await?)
}

async fn lessons_of(db: &DatabaseConnection, course_id: Uuid) -> Result<Vec<lesson::Model>, ServiceError> {
    Ok(lesson::Entity::find()
        .filter(lesson::Column::CourseId.eq(course_id))
        .order_by_asc(lesson::Column::Position)
        .all(db)
        .await?)
}

pub async fn get_course(db: &DatabaseConnection, id: Uuid) -> Result<CourseDetail, ServiceError> {
    let course = find_published(db, id).await?;
    let lessons = lessons_of(db, course.id).await?;
    Ok(CourseDetail { course, lessons })
}

async fn find_enrollment(db: &DatabaseConnection, user_id: Uuid, course_id: Uuid) -> Result<Option<enrollment::Model>, ServiceError> {
    Ok(enrollment::Entity::find()
        .filter(enrollment::Column::UserId.eq(user_id))
        .filter(enrollment::Column::CourseId.eq(course_id))
        .one(db)
        .await?)
}

/// Returns the enrollment and whether it was just created.
pub async fn enroll(db: &DatabaseConnection, actor: &Actor, course_id: Uuid) -> Result<(enrollment::Model, bool), ServiceError> {
    let c = find_published(db, course_id).await?;
    if let Some(e) = find_enrollment(db, actor.user_id, c.id).await? {
        return Ok((e, false));
    }
    let created = enrollment::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(actor.user_id),
        course_id: Set(c.id),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(course_id = %c.id, user_id = %actor.user_id, "course_enrolled");
    Ok((created, true))
}

pub async fn complete_lesson(db: &DatabaseConnection, actor: &Actor, course_id: Uuid, lesson_id: Uuid) -> Result<Progress, ServiceError> {
    let e = find_enrollment(db, actor.user_id, course_id)
        .await?
        .ok_or_else(|| ServiceError::forbidden("not enrolled"))?;
    let l = lesson::Entity::find_by_id(lesson_id)
        .one(db)
        .await?
        .filter(|l| l.course_id == course_id)
        .ok_or_else(|| ServiceError::not_found("lesson"))?;
    let done = lesson_completion::Entity::find()
        .filter(lesson_completion::Column::EnrollmentId.eq(e.id))
        .filter(lesson_completion::Column::LessonId.eq(l.id))
        .one(db)
        .await?;
    if done.is_none() {
        lesson_completion::ActiveModel {
            id: Set(Uuid::new_v4()),
            enrollment_id: Set(e.id),
            lesson_id: Set(l.id),
            completed_at: Set(Utc::now().into()),
        }
        .insert(db)
        .await?;
    }
    progress(db, actor, course_id).await
}

pub async fn progress(db: &DatabaseConnection, actor: &Actor, course_id: Uuid) -> Result<Progress, ServiceError> {
    let e = find_enrollment(db, actor.user_id, course_id)
        .await?
        .ok_or_else(|| ServiceError::forbidden("not enrolled"))?;
    let total = lesson::Entity::find()
        .filter(lesson::Column::CourseId.eq(course_id))
        .count(db)
        .await?;
    let completed = lesson_completion::Entity::find()
        .filter(lesson_completion::Column::EnrollmentId.eq(e.id))
        .count(db)
        .await?;
    Ok(Progress::new(completed, total))
}
