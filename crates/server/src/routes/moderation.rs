//! User reports and security incidents.

use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{report, security_incident};
use service::incidents::{self, IncidentFilter, IncidentStatusUpdate, NewIncident};
use service::reports::{self, NewReport, ReportFilter, ReportStatusUpdate};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn create_report(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewReport>) -> Created<report::Model> {
    Ok(created(reports::create(&state.db, &actor, input).await?))
}

pub async fn my_reports(State(state): State<AppState>, Extension(actor): Extension<Actor>, Query(opts): Query<Pagination>) -> ApiResult<Page<report::Model>> {
    Ok(Json(reports::list_mine(&state.db, &actor, opts).await?))
}

pub async fn all_reports(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<ReportFilter>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<report::Model>> {
    Ok(Json(reports::list_admin(&state.db, &actor, filter, opts).await?))
}

pub async fn report_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<ReportStatusUpdate>,
) -> ApiResult<report::Model> {
    Ok(Json(reports::update_status(&state.db, &actor, id, input).await?))
}

pub async fn create_incident(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<NewIncident>,
) -> Created<security_incident::Model> {
    Ok(created(incidents::create(&state.db, &actor, input).await?))
}

pub async fn list_incidents(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<IncidentFilter>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<security_incident::Model>> {
    Ok(Json(incidents::list(&state.db, &actor, filter, opts).await?))
}

pub async fn get_incident(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<security_incident::Model> {
    Ok(Json(incidents::get(&state.db, &actor, id).await?))
}

pub async fn incident_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<IncidentStatusUpdate>,
) -> ApiResult<security_incident::Model> {
    Ok(Json(incidents::update_status(&state.db, &actor, id, input).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", post(create_report))
        .route("/me/reports", get(my_reports))
        .route("/admin/reports", get(all_reports))
        .route("/admin/reports/:id/status", post(report_status))
        .route("/admin/incidents", post(create_incident).get(list_incidents))
        .route("/admin/incidents/:id", get(get_incident))
        .route("/admin/incidents/:id/status", post(incident_status))
}
