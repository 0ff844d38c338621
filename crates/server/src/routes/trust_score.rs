use axum::{extract::State, routing::get, Extension, Router};
use crate::extract::{Json, Path};
use uuid::Uuid;

use models::trust_score_config::Weights;
use service::trust_score::{self, TrustScore, WeightsUpdate};
use service::Actor;

use super::ApiResult;
use crate::state::AppState;

pub async fn score(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<TrustScore> {
    Ok(Json(trust_score::compute(&state.db, user_id, state.market.lead_sla_hours).await?))
}

pub async fn get_config(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Weights> {
    Ok(Json(trust_score::get_config(&state.db, &actor).await?))
}

pub async fn update_config(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<WeightsUpdate>,
) -> ApiResult<Weights> {
    Ok(Json(trust_score::update_config(&state.db, &actor, input).await?))
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/users/:id/trust-score", get(score))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/admin/trust-score/config", get(get_config).put(update_config))
}
