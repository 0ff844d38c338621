use sea_orm::DbErr;
use thiserror::Error;

use models::errors::ModelError;

/// Outcome of a rejected business operation. The HTTP layer maps each variant to one status.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// The resource exists but the actor may not touch it.
    #[error("forbidden: {0}")]
    Forbidden(String),
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{entity} not found")) }

    pub fn forbidden(msg: impl Into<String>) -> Self { Self::Forbidden(msg.into()) }

    pub fn conflict(msg: impl Into<String>) -> Self { Self::Conflict(msg.into()) }

    pub fn validation(msg: impl Into<String>) -> Self { Self::Validation(msg.into()) }
}

/// Unique-constraint violations surface as `Conflict` so racing inserts still answer 409.
impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        match ModelError::from(e) {
            ModelError::Conflict(detail) => ServiceError::Conflict(format!("already exists ({detail})")),
            ModelError::Validation(msg) => ServiceError::Validation(msg),
            ModelError::Db(msg) => ServiceError::Db(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_the_entity() {
        assert_eq!(ServiceError::not_found("lead").to_string(), "not found: lead not found");
    }

    #[test]
    fn generic_db_error_stays_db() {
        assert!(matches!(ServiceError::from(DbErr::RecordNotInserted), ServiceError::Db(_)));
    }
}
