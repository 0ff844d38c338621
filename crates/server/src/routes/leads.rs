use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::lead;
use service::leads::{self, LeadFilter, NewLead, SlaStats, StatusUpdate};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

#[utoipa::path(post, path = "/projects/{id}/leads", tag = "leads", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = crate::openapi::NewLeadRequest,
    responses((status = 201, description = "Lead created"), (status = 403, description = "Clients only"), (status = 404, description = "Not Found")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<NewLead>,
) -> Created<lead::Model> {
    Ok(created(leads::create(&state.db, &actor, project_id, input).await?))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<LeadFilter>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<lead::Model>> {
    Ok(Json(leads::list(&state.db, &actor, filter, opts).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<lead::Model> {
    Ok(Json(leads::get(&state.db, &actor, id).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<StatusUpdate>,
) -> ApiResult<lead::Model> {
    Ok(Json(leads::update_status(&state.db, &actor, id, input).await?))
}

pub async fn sla(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<SlaStats> {
    Ok(Json(leads::sla_stats(&state.db, &actor, state.market.lead_sla_hours).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/leads", post(create))
        .route("/me/leads", get(list))
        .route("/me/leads/sla", get(sla))
        .route("/leads/:id", get(get_one))
        .route("/leads/:id/status", post(update_status))
}
