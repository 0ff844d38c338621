use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::validate;

string_enum! {
    pub enum Severity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

string_enum! {
    pub enum IncidentStatus {
        Open => "open",
        Investigating => "investigating",
        Resolved => "resolved",
    }
}

impl Lifecycle for IncidentStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use IncidentStatus::*;
        matches!((self, next), (Open, Investigating) | (Investigating, Resolved) | (Open, Resolved))
    }

    fn is_terminal(self) -> bool { self == IncidentStatus::Resolved }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "security_incident")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub severity: String,
    pub status: String,
    pub affected_user_id: Option<Uuid>,
    pub reported_by: Uuid,
    pub resolved_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<IncidentStatus, ModelError> { self.status.parse() }
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    validate::required("title", title, 200)
}
