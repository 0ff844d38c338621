use axum::{extract::State, routing::{get, post}, Extension, Router};
use crate::extract::{Json, Path, Query};
use uuid::Uuid;

use common::pagination::Pagination;
use common::types::Page;
use models::user;
use service::users::{self, UserFilter};
use service::Actor;

use super::ApiResult;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(filter): Query<UserFilter>,
    Query(opts): Query<Pagination>,
) -> ApiResult<Page<user::Model>> {
    Ok(Json(users::list_users(&state.db, &actor, filter, opts).await?))
}

pub async fn suspend(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<user::Model> {
    Ok(Json(users::suspend(&state.db, &actor, id).await?))
}

pub async fn reactivate(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> ApiResult<user::Model> {
    Ok(Json(users::reactivate(&state.db, &actor, id).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(list))
        .route("/admin/users/:id/suspend", post(suspend))
        .route("/admin/users/:id/reactivate", post(reactivate))
}
