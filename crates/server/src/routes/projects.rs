use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{brochure, project, project_photo};
use service::brochures::{self, BatchItem, BatchRequest};
use service::consistency::{self, ConsistencyReport};
use service::projects::{self, Moderation, NewPhoto, NewProject, ProjectQuery, ProjectUpdate};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::auth::MaybeActor;
use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/projects", tag = "projects",
    params(("city" = Option<String>, Query, description = "Filter by city"), ("page" = Option<u32>, Query, description = "1-based page"), ("per_page" = Option<u32>, Query, description = "Page size")),
    responses((status = 200, description = "Approved projects, paginated")))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<project::Model>> {
    Ok(Json(projects::list_public(&state.db, query, opts).await?))
}

#[utoipa::path(get, path = "/projects/{id}", tag = "projects",
    params(("id" = Uuid, Path, description = "Project id")),
    responses((status = 200, description = "Project"), (status = 404, description = "Not Found")))]
pub async fn get_one(State(state): State<AppState>, MaybeActor(actor): MaybeActor, Path(id): Path<Uuid>) -> ApiResult<project::Model> {
    Ok(Json(projects::get(&state.db, actor.as_ref(), id).await?))
}

#[utoipa::path(post, path = "/projects", tag = "projects", security(("bearer" = [])),
    request_body = crate::openapi::NewProjectRequest,
    responses((status = 201, description = "Draft created"), (status = 400, description = "Bad Request"), (status = 403, description = "Forbidden")))]
pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewProject>) -> Created<project::Model> {
    Ok(created(projects::create(&state.db, &actor, input).await?))
}

pub async fn list_mine(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<project::Model>> {
    Ok(Json(projects::list_mine(&state.db, &actor, opts).await?))
}

pub async fn list_admin(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ProjectQuery>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<project::Model>> {
    Ok(Json(projects::list_admin(&state.db, &actor, query, opts).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<ProjectUpdate>,
) -> ApiResult<project::Model> {
    Ok(Json(projects::update(&state.db, &actor, id, input).await?))
}

#[utoipa::path(post, path = "/projects/{id}/submit", tag = "projects", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    responses((status = 200, description = "Pending review"), (status = 400, description = "Illegal transition")))]
pub async fn submit(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<project::Model> {
    Ok(Json(projects::submit(&state.db, &actor, id).await?))
}

#[utoipa::path(post, path = "/admin/projects/{id}/moderate", tag = "projects", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = crate::openapi::ModerationRequest,
    responses((status = 200, description = "Approved or rejected"), (status = 403, description = "Forbidden")))]
pub async fn moderate(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<Moderation>,
) -> ApiResult<project::Model> {
    Ok(Json(projects::moderate(&state.db, &actor, id, input).await?))
}

pub async fn archive(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<project::Model> {
    Ok(Json(projects::archive(&state.db, &actor, id).await?))
}

pub async fn remove(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    projects::delete(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn photos(State(state): State<AppState>, MaybeActor(actor): MaybeActor, Path(id): Path<Uuid>) -> ApiResult<Vec<project_photo::Model>> {
    Ok(Json(projects::list_photos(&state.db, actor.as_ref(), id).await?))
}

pub async fn add_photo(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewPhoto>,
) -> Created<project_photo::Model> {
    let max_km = state.market.photo_max_distance_km;
    Ok(created(projects::add_photo(&state.db, &actor, id, input, max_km).await?))
}

pub async fn consistency(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<ConsistencyReport> {
    Ok(Json(consistency::report(&state.db, &actor, id).await?))
}

pub async fn generate_brochure(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> Created<brochure::Model> {
    Ok(created(brochures::generate(&state.db, &actor, id).await?))
}

pub async fn latest_brochure(State(state): State<AppState>, MaybeActor(actor): MaybeActor, Path(id): Path<Uuid>) -> ApiResult<brochure::Model> {
    Ok(Json(brochures::latest(&state.db, actor.as_ref(), id).await?))
}

pub async fn batch_brochures(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<BatchRequest>,
) -> ApiResult<Vec<BatchItem>> {
    let (max, parallelism) = (state.market.brochure_batch_max, state.market.brochure_parallelism);
    Ok(Json(brochures::batch(&state.db, &actor, input, max, parallelism).await?))
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(list))
        .route("/projects/:id", get(get_one))
        .route("/projects/:id/photos", get(photos))
        .route("/projects/:id/brochures/latest", get(latest_brochure))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create))
        .route("/projects/:id", axum::routing::put(update).delete(remove))
        .route("/projects/:id/submit", post(submit))
        .route("/projects/:id/archive", post(archive))
        .route("/projects/:id/photos", post(add_photo))
        .route("/projects/:id/consistency", get(consistency))
        .route("/projects/:id/brochures", post(generate_brochure))
        .route("/me/projects", get(list_mine))
        .route("/admin/projects", get(list_admin))
        .route("/admin/projects/:id/moderate", post(moderate))
        .route("/admin/brochures/batch", post(batch_brochures))
}
