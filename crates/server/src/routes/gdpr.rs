use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Query};
use serde_json::Value;

use common::pagination::Pagination;
use common::types::Page;
use models::gdpr_request;
use service::gdpr::{self, Erasure};
use service::Actor;

use super::ApiResult;
use crate::state::AppState;

pub async fn export(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Value> {
    Ok(Json(gdpr::export(&state.db, &actor).await?))
}

pub async fn erase(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Erasure> {
    Ok(Json(gdpr::erase(&state.db, &actor).await?))
}

pub async fn requests(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<gdpr_request::Model>> {
    Ok(Json(gdpr::list_requests(&state.db, &actor, opts).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/me/gdpr/export", get(export))
        .route("/me/gdpr/erase", post(erase))
        .route("/admin/gdpr/requests", get(requests))
}
