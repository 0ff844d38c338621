use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failures raised while validating or persisting a single entity.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("validation error: {0}")]
    Validation(String),
    /// A unique column already holds the value.
    #[error("duplicate value: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Db(String),
}

impl From<DbErr> for ModelError {
    fn from(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => ModelError::Conflict(detail),
            _ => ModelError::Db(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_db_errors_keep_their_message() {
        let err = ModelError::from(DbErr::Custom("pool timed out".into()));
        assert!(matches!(err, ModelError::Db(ref m) if m.contains("pool timed out")));
    }
}
