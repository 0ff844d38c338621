use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::{error, warn};

use service::auth::errors::AuthError;
use service::ServiceError;

/// JSON error body: `{"error": <kind>, "message": <detail>}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: &'static str,
    pub message: String,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: &'static str, message: impl Into<String>) -> Self {
        Self { status, error, message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation", message)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.error, "message": self.message });
        (self.status, Json(body)).into_response()
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        use models::errors::ModelError;
        match e {
            ServiceError::Validation(m) | ServiceError::Model(ModelError::Validation(m)) => Self::bad_request(m),
            ServiceError::Unauthorized(m) => Self::unauthorized(m),
            ServiceError::Forbidden(m) => Self::new(StatusCode::FORBIDDEN, "forbidden", m),
            ServiceError::NotFound(m) => Self::new(StatusCode::NOT_FOUND, "not_found", m),
            ServiceError::Conflict(m) | ServiceError::Model(ModelError::Conflict(m)) => Self::new(StatusCode::CONFLICT, "conflict", m),
            ServiceError::Db(m) | ServiceError::Model(ModelError::Db(m)) => {
                error!(error = %m, "database error");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
            }
        }
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        match e {
            AuthError::Validation(m) => Self::bad_request(m),
            AuthError::Conflict => Self::new(StatusCode::CONFLICT, "conflict", "user already exists"),
            AuthError::NotFound | AuthError::Unauthorized | AuthError::Inactive(_) | AuthError::TokenError(_) => {
                warn!(code, "authentication rejected");
                Self::unauthorized("invalid credentials")
            }
            AuthError::HashError(m) | AuthError::Repository(m) => {
                error!(code, error = %m, "auth failure");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", "internal server error")
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("bootstrap failed: {0}")]
    Bootstrap(String),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_errors_map_to_status() {
        let cases = [
            (ServiceError::validation("x"), StatusCode::BAD_REQUEST),
            (ServiceError::forbidden("x"), StatusCode::FORBIDDEN),
            (ServiceError::not_found("x"), StatusCode::NOT_FOUND),
            (ServiceError::conflict("x"), StatusCode::CONFLICT),
            (ServiceError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ServiceError::Db("boom".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(JsonApiError::from(err).status, status);
        }
        let model = ServiceError::Model(models::errors::ModelError::Validation("bad".into()));
        assert_eq!(JsonApiError::from(model).status, StatusCode::BAD_REQUEST);
        let dup = ServiceError::Model(models::errors::ModelError::Conflict("email".into()));
        assert_eq!(JsonApiError::from(dup).status, StatusCode::CONFLICT);
    }

    #[test]
    fn inactive_accounts_look_like_bad_credentials() {
        let e = JsonApiError::from(AuthError::Inactive(models::user::UserStatus::Suspended));
        assert_eq!(e.status, StatusCode::UNAUTHORIZED);
        assert_eq!(e.message, "invalid credentials");
    }

    #[test]
    fn internal_details_are_hidden() {
        let e = JsonApiError::from(ServiceError::Db("relation users does not exist".into()));
        assert_eq!(e.message, "internal server error");
    }
}
