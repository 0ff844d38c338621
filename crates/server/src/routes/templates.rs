use std::collections::HashMap;

use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path};
use serde::Deserialize;
use uuid::Uuid;

use models::message_template;
use service::templates::{self, NewTemplate, Rendered, TemplateUpdate};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RenderRequest {
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewTemplate>) -> Created<message_template::Model> {
    Ok(created(templates::create(&state.db, &actor, input).await?))
}

pub async fn list(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<Vec<message_template::Model>> {
    Ok(Json(templates::list(&state.db, &actor).await?))
}

pub async fn get_one(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<message_template::Model> {
    Ok(Json(templates::get(&state.db, &actor, id).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<TemplateUpdate>,
) -> ApiResult<message_template::Model> {
    Ok(Json(templates::update(&state.db, &actor, id, input).await?))
}

pub async fn remove(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    templates::delete(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn render(State(state): State<AppState>, Path(id): Path<Uuid>, Json(input): Json<RenderRequest>) -> ApiResult<Rendered> {
    Ok(Json(templates::render(&state.db, id, &input.variables).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/templates", post(create).get(list))
        .route("/admin/templates/:id", get(get_one).put(update).delete(remove))
        .route("/templates/:id/render", post(render))
}
