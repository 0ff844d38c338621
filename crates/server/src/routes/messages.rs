use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Query};

use common::pagination::Pagination;
use common::types::Page;
use models::outbound_message;
use service::messaging::{self, WhatsappRequest};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

pub async fn send_whatsapp(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<WhatsappRequest>,
) -> Created<outbound_message::Model> {
    Ok(created(messaging::send_whatsapp(&state.db, state.gateway.as_ref(), &actor, input).await?))
}

pub async fn list(State(state): State<AppState>, Extension(actor): Extension<Actor>, Query(opts): Query<Pagination>) -> ApiResult<Page<outbound_message::Model>> {
    Ok(Json(messaging::list(&state.db, &actor, opts).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/messages/whatsapp", post(send_whatsapp))
        .route("/messages", get(list))
}
