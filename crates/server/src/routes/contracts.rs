use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::contract;
use service::contracts::{self, NewContract};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(lead_id): Path<Uuid>,
    Json(input): Json<NewContract>,
) -> Created<contract::Model> {
    Ok(created(contracts::create(&state.db, &actor, lead_id, input).await?))
}

pub async fn list(State(state): State<AppState>, Extension(actor): Extension<Actor>, Query(opts): Query<Pagination>) -> ApiResult<Page<contract::Model>> {
    Ok(Json(contracts::list(&state.db, &actor, opts).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<contract::Model> {
    Ok(Json(contracts::get(&state.db, &actor, id).await?))
}

pub async fn send(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<contract::Model> {
    Ok(Json(contracts::send(&state.db, &actor, id).await?))
}

pub async fn sign(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<contract::Model> {
    Ok(Json(contracts::sign(&state.db, &actor, id).await?))
}

pub async fn cancel(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<contract::Model> {
    Ok(Json(contracts::cancel(&state.db, &actor, id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/leads/:id/contract", post(create))
        .route("/contracts", get(list))
        .route("/contracts/:id", get(get_one))
        .route("/contracts/:id/send", post(send))
        .route("/contracts/:id/sign", post(sign))
        .route("/contracts/:id/cancel", post(cancel))
}
