pub mod auth;
pub mod users;
pub mod badges;
pub mod trust_score;
pub mod projects;
pub mod leads;
pub mod reviews;
pub mod appeals;
pub mod invoices;
pub mod templates;
pub mod moderation;
pub mod tickets;
pub mod chat;
pub mod gdpr;
pub mod partners;
pub mod academy;
pub mod ads;
pub mod messages;
pub mod contracts;

use axum::http::StatusCode;
use axum::{middleware, routing::get, Router};
use crate::extract::Json;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use common::types::Health;

use crate::errors::JsonApiError;
use crate::openapi::ApiDoc;
use crate::state::AppState;

pub type ApiResult<T> = Result<Json<T>, JsonApiError>;
pub type Created<T> = Result<(StatusCode, Json<T>), JsonApiError>;

pub fn created<T>(value: T) -> (StatusCode, Json<T>) {
    (StatusCode::CREATED, Json(value))
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Routes reachable without a token. Handlers that care use `MaybeActor`.
fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .merge(auth::public_routes())
        .merge(projects::public_routes())
        .merge(reviews::public_routes())
        .merge(badges::public_routes())
        .merge(trust_score::public_routes())
        .merge(partners::public_routes())
        .merge(academy::public_routes())
        .merge(ads::public_routes())
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .merge(auth::routes())
        .merge(users::routes())
        .merge(badges::routes())
        .merge(trust_score::routes())
        .merge(projects::routes())
        .merge(leads::routes())
        .merge(reviews::routes())
        .merge(appeals::routes())
        .merge(invoices::routes())
        .merge(templates::routes())
        .merge(moderation::routes())
        .merge(tickets::routes())
        .merge(chat::routes())
        .merge(gdpr::routes())
        .merge(partners::routes())
        .merge(academy::routes())
        .merge(ads::routes())
        .merge(messages::routes())
        .merge(contracts::routes())
        .route_layer(middleware::from_fn_with_state(state, crate::auth::require_bearer))
}

/// Build the full application router: public, bearer-protected and docs routes.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    public_routes()
        .merge(protected_routes(state.clone()))
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
