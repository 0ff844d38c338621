use sea_orm::{entity::prelude::*, Set, DatabaseConnection};
use uuid::Uuid;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;
use crate::lifecycle::Lifecycle;
use crate::validate;

string_enum! {
    /// Account type.
    pub enum Role {
        Client => "client",
        Promoteur => "promoteur",
        Admin => "admin",
    }
}

string_enum! {
    pub enum UserStatus {
        Active => "active",
        Suspended => "suspended",
        Deleted => "deleted",
    }
}

impl Lifecycle for UserStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use UserStatus::*;
        matches!((self, next), (Active, Suspended) | (Suspended, Active) | (Active, Deleted) | (Suspended, Deleted))
    }

    fn is_terminal(self) -> bool { self == UserStatus::Deleted }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub role: String,
    pub status: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn role(&self) -> Result<Role, errors::ModelError> { self.role.parse() }
    pub fn status(&self) -> Result<UserStatus, errors::ModelError> { self.status.parse() }
}

pub fn validate_email(email: &str) -> Result<(), errors::ModelError> {
    validate::email(email)
}

pub fn validate_name(name: &str) -> Result<(), errors::ModelError> {
    validate::required("name", name, 128)
}

/// Normalized form used for storage and lookups.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

pub async fn create(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    role: Role,
    phone: Option<&str>,
) -> Result<Model, errors::ModelError> {
    let email = normalize_email(email);
    validate_email(&email)?;
    validate_name(name)?;
    if let Some(p) = phone { validate::phone(p)?; }
    let now = Utc::now().into();
    let am = ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        name: Set(name.trim().to_string()),
        phone: Set(phone.map(str::to_string)),
        role: Set(role.as_str().into()),
        status: Set(UserStatus::Active.as_str().into()),
        created_at: Set(now),
        updated_at: Set(now),
        deleted_at: Set(None),
    };
    Ok(am.insert(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_column_text() {
        assert_eq!("promoteur".parse::<Role>().unwrap(), Role::Promoteur);
        assert_eq!(Role::Admin.to_string(), "admin");
        assert!("superuser".parse::<Role>().is_err());
    }

    #[test]
    fn deleted_is_terminal() {
        assert!(UserStatus::Active.transition(UserStatus::Suspended).is_ok());
        assert!(UserStatus::Deleted.transition(UserStatus::Active).is_err());
        assert!(UserStatus::Deleted.is_terminal());
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }
}
