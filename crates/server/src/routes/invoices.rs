use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::invoice;
use service::invoices::{self, InvoiceWithLines, NewInvoice, Payment};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewInvoice>) -> Created<InvoiceWithLines> {
    Ok(created(invoices::create(&state.db, &actor, input).await?))
}

pub async fn list(State(state): State<AppState>, Extension(actor): Extension<Actor>, Query(opts): Query<Pagination>) -> ApiResult<Page<invoice::Model>> {
    Ok(Json(invoices::list(&state.db, &actor, opts).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<InvoiceWithLines> {
    Ok(Json(invoices::get(&state.db, &actor, id).await?))
}

pub async fn issue(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<invoice::Model> {
    Ok(Json(invoices::issue(&state.db, &actor, id).await?))
}

pub async fn pay(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<Payment>,
) -> ApiResult<invoice::Model> {
    Ok(Json(invoices::pay(&state.db, &actor, id, input).await?))
}

pub async fn cancel(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<invoice::Model> {
    Ok(Json(invoices::cancel(&state.db, &actor, id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/invoices", post(create))
        .route("/invoices", get(list))
        .route("/invoices/:id", get(get_one))
        .route("/admin/invoices/:id/issue", post(issue))
        .route("/admin/invoices/:id/pay", post(pay))
        .route("/admin/invoices/:id/cancel", post(cancel))
}
