use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::ad_campaign;
use service::ads::{self, AdStatusUpdate, CampaignView, NewCampaign};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<NewCampaign>,
) -> Created<ad_campaign::Model> {
    Ok(created(ads::create(&state.db, &actor, project_id, input).await?))
}

pub async fn list_mine(State(state): State<AppState>, Extension(actor): Extension<Actor>, Query(opts): Query<Pagination>) -> ApiResult<Page<CampaignView>> {
    Ok(Json(ads::list_mine(&state.db, &actor, opts).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<CampaignView> {
    Ok(Json(ads::get(&state.db, &actor, id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<AdStatusUpdate>,
) -> ApiResult<ad_campaign::Model> {
    Ok(Json(ads::update_status(&state.db, &actor, id, input).await?))
}

pub async fn impression(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<CampaignView> {
    Ok(Json(ads::record_impression(&state.db, id).await?))
}

pub async fn click(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<CampaignView> {
    Ok(Json(ads::record_click(&state.db, id).await?))
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/ads/:id/impression", post(impression))
        .route("/ads/:id/click", post(click))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/ads", post(create))
        .route("/me/ads", get(list_mine))
        .route("/ads/:id", get(get_one))
        .route("/ads/:id/status", post(update_status))
}
