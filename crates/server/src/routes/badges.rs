use axum::{extract::State, http::StatusCode, routing::{delete, get, post, put}, Extension, Router};
use crate::extract::{Json, Path};
use uuid::Uuid;

use models::{badge, user_badge};
use service::badges::{self, Award, AwardedBadge, BadgeUpdate, NewBadge};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::errors::JsonApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<badge::Model>> {
    Ok(Json(badges::list_active(&state.db).await?))
}

pub async fn for_user(State(state): State<AppState>, Path(user_id): Path<Uuid>) -> ApiResult<Vec<AwardedBadge>> {
    Ok(Json(badges::list_for_user(&state.db, user_id).await?))
}

pub async fn create(State(state): State<AppState>, Extension(actor): Extension<Actor>, Json(input): Json<NewBadge>) -> Created<badge::Model> {
    Ok(created(badges::create(&state.db, &actor, input).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<BadgeUpdate>,
) -> ApiResult<badge::Model> {
    Ok(Json(badges::update(&state.db, &actor, id, input).await?))
}

pub async fn award(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(user_id): Path<Uuid>,
    Json(input): Json<Award>,
) -> Created<user_badge::Model> {
    Ok(created(badges::award(&state.db, &actor, user_id, input).await?))
}

pub async fn revoke(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path((user_id, badge_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, JsonApiError> {
    badges::revoke(&state.db, &actor, user_id, badge_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/badges", get(list))
        .route("/users/:id/badges", get(for_user))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/badges", post(create))
        .route("/admin/badges/:id", put(update))
        .route("/admin/users/:id/badges", post(award))
        .route("/admin/users/:id/badges/:badge_id", delete(revoke))
}
