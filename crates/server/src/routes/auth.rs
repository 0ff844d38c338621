use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::{get, post}, Extension, Router};
use crate::extract::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use uuid::Uuid;

use models::user::{self, Role};
use service::auth::domain::{LoginInput, RegisterInput};
use service::auth::repo::seaorm::SeaOrmAuthRepository;
use service::auth::AuthService;
use service::users::{self, ProfileUpdate};
use service::Actor;

use super::{created, ApiResult, Created};
use crate::auth::AUTH_COOKIE;
use crate::errors::JsonApiError;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RegisterOutput { pub user_id: Uuid }

#[derive(Serialize)]
pub struct LoginOutput {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub token: String,
}

pub(crate) fn auth_service(state: &AppState) -> AuthService<SeaOrmAuthRepository> {
    AuthService::new(Arc::new(SeaOrmAuthRepository::new(state.db.clone())), state.auth.clone())
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest,
    responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(State(state): State<AppState>, Json(input): Json<RegisterInput>) -> Created<RegisterOutput> {
    let user = auth_service(&state).register(input).await?;
    Ok(created(RegisterOutput { user_id: user.id }))
}

#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest,
    responses((status = 200, description = "Logged In", body = crate::openapi::LoginResponse), (status = 401, description = "Unauthorized")))]
pub async fn login(State(state): State<AppState>, jar: CookieJar, Json(input): Json<LoginInput>) -> Result<(CookieJar, Json<LoginOutput>), JsonApiError> {
    let session = auth_service(&state).login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let user = session.user;
    let out = LoginOutput { user_id: user.id, email: user.email, name: user.name, role: user.role, token: session.token };
    Ok((jar.add(cookie), Json(out)))
}

/// Always answers with an expired `auth_token`, even when the caller authenticated with the header.
pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let mut expired = Cookie::new(AUTH_COOKIE, "");
    expired.set_path("/");
    expired.set_http_only(true);
    expired.make_removal();
    (jar.add(expired), StatusCode::NO_CONTENT)
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", security(("bearer" = [])),
    responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")))]
pub async fn me(State(state): State<AppState>, Extension(actor): Extension<Actor>) -> ApiResult<user::Model> {
    Ok(Json(users::me(&state.db, &actor).await?))
}

pub async fn update_me(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(input): Json<ProfileUpdate>,
) -> ApiResult<user::Model> {
    Ok(Json(users::update_profile(&state.db, &actor, input).await?))
}

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me).put(update_me))
}
