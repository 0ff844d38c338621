use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::validate;

string_enum! {
    pub enum ReportTarget {
        Project => "project",
        User => "user",
        Review => "review",
    }
}

string_enum! {
    pub enum ReportStatus {
        Open => "open",
        Reviewing => "reviewing",
        Resolved => "resolved",
        Dismissed => "dismissed",
    }
}

impl Lifecycle for ReportStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use ReportStatus::*;
        matches!((self, next), (Open, Reviewing) | (Reviewing, Resolved) | (Reviewing, Dismissed) | (Open, Dismissed))
    }

    fn is_terminal(self) -> bool {
        matches!(self, ReportStatus::Resolved | ReportStatus::Dismissed)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "report")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub reporter_id: Uuid,
    pub target_type: String,
    pub target_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: String,
    pub resolution_note: Option<String>,
    pub handled_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<ReportStatus, ModelError> { self.status.parse() }
}

pub fn validate_reason(reason: &str) -> Result<(), ModelError> {
    validate::required("reason", reason, 2000)
}
