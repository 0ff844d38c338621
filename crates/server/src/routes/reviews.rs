use axum::{extract::State, http::StatusCode, routing::{delete, get, post}, Extension, Router};
use crate::extract::{Json, Path};
use uuid::Uuid;

use models::review;
use service::reviews::{self, NewReview, Reply, ReviewList};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::errors::JsonApiError;
use crate::state::AppState;

#[utoipa::path(get, path = "/projects/{id}/reviews", tag = "reviews",
    params(("id" = Uuid, Path, description = "Project id")),
    responses((status = 200, description = "Reviews with average rating")))]
pub async fn list(State(state): State<AppState>, Path(project_id): Path<Uuid>) -> ApiResult<ReviewList> {
    Ok(Json(reviews::list(&state.db, project_id).await?))
}

#[utoipa::path(post, path = "/projects/{id}/reviews", tag = "reviews", security(("bearer" = [])),
    params(("id" = Uuid, Path, description = "Project id")),
    request_body = crate::openapi::NewReviewRequest,
    responses((status = 201, description = "Review created"), (status = 409, description = "Already reviewed")))]
pub async fn create(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(project_id): Path<Uuid>,
    Json(input): Json<NewReview>,
) -> Created<review::Model> {
    Ok(created(reviews::create(&state.db, &actor, project_id, input).await?))
}

pub async fn reply(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<Uuid>,
    Json(input): Json<Reply>,
) -> ApiResult<review::Model> {
    Ok(Json(reviews::reply(&state.db, &actor, id, input).await?))
}

pub async fn remove(State(state): State<AppState>, Extension(actor): Extension<Actor>, Path(id): Path<Uuid>) -> Result<StatusCode, JsonApiError> {
    reviews::delete(&state.db, &actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/projects/:id/reviews", get(list))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/projects/:id/reviews", post(create))
        .route("/reviews/:id/reply", post(reply))
        .route("/reviews/:id", delete(remove))
}
