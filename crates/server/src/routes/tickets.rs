use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::{support_ticket, ticket_message};
use service::tickets::{self, NewMessage, NewTicket, TicketFilter, TicketStatusUpdate, TicketThread};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewTicket>) -> Created<TicketThread> {
    Ok(created(tickets::create(&state.db, &actor, input).await?))
}

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<TicketFilter>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<support_ticket::Model>> {
    Ok(Json(tickets::list(&state.db, &actor, filter, opts).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<TicketThread> {
    Ok(Json(tickets::get(&state.db, &actor, id).await?))
}

pub async fn reply(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewMessage>,
) -> Created<ticket_message::Model> {
    Ok(created(tickets::reply(&state.db, &actor, id, input).await?))
}

pub async fn update_status(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<TicketStatusUpdate>,
) -> ApiResult<support_ticket::Model> {
    Ok(Json(tickets::update_status(&state.db, &actor, id, input).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", post(create).get(list))
        .route("/tickets/:id", get(get_one))
        .route("/tickets/:id/messages", post(reply))
        .route("/tickets/:id/status", post(update_status))
}
