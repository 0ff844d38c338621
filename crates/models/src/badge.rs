use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "badge")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Codes are lowercase ascii letters, digits and underscores.
pub fn validate_code(code: &str) -> Result<(), ModelError> {
    if code.is_empty() || code.len() > 64 || !code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err(ModelError::Validation("code must match [a-z0-9_]+ (max 64)".into()));
    }
    Ok(())
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    validate::required("name", name, 128)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_charset() {
        assert!(validate_code("verified_promoteur_2").is_ok());
        assert!(validate_code("Verified").is_err());
        assert!(validate_code("top-seller").is_err());
        assert!(validate_code("").is_err());
    }
}
