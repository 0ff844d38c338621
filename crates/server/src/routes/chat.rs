use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path};
use uuid::Uuid;

use models::{chat_message, conversation};
use service::chat::{self, ConversationSummary, MarkedRead, NewChatMessage};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::state::AppState;

/// 201 when the conversation was just opened, 200 when it already existed.
pub async fn open(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(project_id): Path<Uuid>) -> Created<conversation::Model> {
    let (conv, fresh) = chat::open(&state.db, &actor, project_id).await?;
    let status = if fresh { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(conv)))
}

pub async fn list(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<ConversationSummary>> {
    Ok(Json(chat::list(&state.db, &actor).await?))
}

pub async fn messages(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<Vec<chat_message::Model>> {
    Ok(Json(chat::messages(&state.db, &actor, id).await?))
}

pub async fn send(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<NewChatMessage>,
) -> Created<chat_message::Model> {
    Ok(created(chat::send(&state.db, &actor, id, input).await?))
}

pub async fn mark_read(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<MarkedRead> {
    Ok(Json(chat::mark_read(&state.db, &actor, id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/conversations", post(open))
        .route("/conversations", get(list))
        .route("/conversations/:id/messages", get(messages).post(send))
        .route("/conversations/:id/read", post(mark_read))
}
