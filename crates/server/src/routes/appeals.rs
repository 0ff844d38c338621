use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::appeal;
use service::appeals::{self, AppealDecision, AppealFilter, NewAppeal};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<NewAppeal>,
) -> Created<appeal::Model> {
    Ok(created(appeals::create(&state.db, &actor, project_id, input).await?))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<AppealFilter>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<appeal::Model>> {
    Ok(Json(appeals::list(&state.db, &actor, filter, opts).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<appeal::Model> {
    Ok(Json(appeals::get(&state.db, &actor, id).await?))
}

pub async fn escalate(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<appeal::Model> {
    Ok(Json(appeals::escalate(&state.db, &actor, id, state.market.appeal_max_escalation).await?))
}

pub async fn start_review(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<appeal::Model> {
    Ok(Json(appeals::start_review(&state.db, &actor, id).await?))
}

pub async fn decide(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<AppealDecision>,
) -> ApiResult<appeal::Model> {
    Ok(Json(appeals::decide(&state.db, &actor, id, input).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/appeals", post(create))
        .route("/appeals", get(list))
        .route("/appeals/:id", get(get_one))
        .route("/appeals/:id/escalate", post(escalate))
        .route("/admin/appeals/:id/review", post(start_review))
        .route("/admin/appeals/:id/decide", post(decide))
}
