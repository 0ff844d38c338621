use axum::{extract::State, http::StatusCode, routing::{get, post, put}, Extension, Router};
use crate::extract::{Json, Path};
use uuid::Uuid;

use models::{course, enrollment, lesson};
use service::academy::{self, CourseDetail, CourseUpdate, NewCourse, NewLesson, Progress};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<course::Model>> {
    Ok(Json(academy::list_published(&state.db).await?))
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<CourseDetail> {
    Ok(Json(academy::get_course(&state.db, id).await?))
}

pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewCourse>) -> Created<course::Model> {
    Ok(created(academy::create_course(&state.db, &actor, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<CourseUpdate>,
) -> ApiResult<course::Model> {
    Ok(Json(academy::update_course(&state.db, &actor, id, input).await?))
}

pub async fn add_lesson(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewLesson>,
) -> Created<lesson::Model> {
    Ok(created(academy::add_lesson(&state.db, &actor, id, input).await?))
}

pub async fn enroll(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> Created<enrollment::Model> {
    let (enrollment, fresh) = academy::enroll(&state.db, &actor, id).await?;
    let status = if fresh { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(enrollment)))
}

pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((course_id, lesson_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Progress> {
    Ok(Json(academy::complete_lesson(&state.db, &actor, course_id, lesson_id).await?))
}

pub async fn progress(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<Progress> {
    Ok(Json(academy::progress(&state.db, &actor, id).await?))
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(list))
        .route("/courses/:id", get(get_one))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/courses", post(create))
        .route("/admin/courses/:id", put(update))
        .route("/admin/courses/:id/lessons", post(add_lesson))
        .route("/courses/:id/enroll", post(enroll))
        .route("/courses/:id/lessons/:lesson_id/complete", post(complete_lesson))
        .route("/courses/:id/progress", get(progress))
}
