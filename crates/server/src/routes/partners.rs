use axum::{extract::State, http::StatusCode, routing::{get, post, put}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use models::partner;
use service::partners::{self, NewPartner, PartnerQuery, PartnerUpdate};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::errors::JsonApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>, Query(query): Query<PartnerQuery>) -> ApiResult<Vec<partner::Model>> {
    Ok(Json(partners::list_active(&state.db, query).await?))
}

pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewPartner>) -> Created<partner::Model> {
    Ok(created(partners::create(&state.db, &actor, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<PartnerUpdate>,
) -> ApiResult<partner::Model> {
    Ok(Json(partners::update(&state.db, &actor, id, input).await?))
}

pub async fn remove(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    partners::delete(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/partners", get(list))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/partners", post(create))
        .route("/admin/partners/:id", put(update).delete(remove))
}
