//! Bearer authentication: `Authorization: Bearer <jwt>` or the `auth_token` cookie.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use tracing::warn;

use service::auth::token;
use service::Actor;

use crate::errors::JsonApiError;
use crate::state::AppState;

pub const AUTH_COOKIE: &str = "auth_token";

/// The raw token, from the header first and the cookie second.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, JsonApiError> {
    if let Some(value) = headers.get(AUTHORIZATION) {
        let value = value
            .to_str()
            .map_err(|_| JsonApiError::unauthorized("malformed Authorization header"))?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or_else(|| JsonApiError::unauthorized("expected a Bearer token"))?;
        return Ok(Some(token.trim().to_string()));
    }
    let jar = CookieJar::from_headers(headers);
    Ok(jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty()))
}

/// Rejects the request with 401 unless it carries a valid token; on success the
/// decoded [`Actor`] is available to handlers as `Extension<Actor>`.
pub async fn require_bearer(State(state): State<AppState>, mut req: Request, next: Next) -> Result<Response, JsonApiError> {
    let path = req.uri().path().to_owned();
    let Some(raw) = bearer_token(req.headers())? else {
        warn!(path = %path, "missing Authorization header and auth_token cookie");
        return Err(JsonApiError::unauthorized("missing bearer token"));
    };
    let actor = token::actor_from_token(&state.auth.jwt_secret, &raw).map_err(|e| {
        warn!(path = %path, err = %e, "token validation failed");
        JsonApiError::unauthorized("invalid or expired token")
    })?;
    req.extensions_mut().insert(actor);
    Ok(next.run(req).await)
}

/// The caller on public routes, when they sent a valid token.
pub struct MaybeActor(pub Option<Actor>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeActor {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let actor = bearer_token(&parts.headers)
            .ok()
            .flatten()
            .and_then(|raw| token::actor_from_token(&state.auth.jwt_secret, &raw).ok());
        Ok(MaybeActor(actor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn header_wins_over_cookie() {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        h.insert("cookie", HeaderValue::from_static("auth_token=xyz"));
        assert_eq!(bearer_token(&h).ok().flatten().as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_fallback_and_bad_scheme() {
        let mut h = HeaderMap::new();
        h.insert("cookie", HeaderValue::from_static("theme=dark; auth_token=xyz"));
        assert_eq!(bearer_token(&h).ok().flatten().as_deref(), Some("xyz"));

        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_static("Basic Zm9vOmJhcg=="));
        assert!(bearer_token(&h).is_err());
        assert!(bearer_token(&HeaderMap::new()).ok().flatten().is_none());
    }
}
