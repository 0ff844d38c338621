use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::{project, validate};

string_enum! {
    pub enum AppealStatus {
        Pending => "pending",
        UnderReview => "under_review",
        Accepted => "accepted",
        Rejected => "rejected",
    }
}

impl Lifecycle for AppealStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use AppealStatus::*;
        matches!((self, next), (Pending, UnderReview) | (UnderReview, Accepted) | (UnderReview, Rejected))
    }

    fn is_terminal(self) -> bool {
        matches!(self, AppealStatus::Accepted | AppealStatus::Rejected)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "appeal")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub promoteur_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub reason: String,
    pub status: String,
    pub escalation_level: i32,
    pub escalated_at: Option<DateTimeWithTimeZone>,
    pub decision_note: Option<String>,
    pub decided_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Project,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Project => Entity::belongs_to(project::Entity).from(Column::ProjectId).to(project::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<AppealStatus, ModelError> { self.status.parse() }
}

pub fn validate_reason(reason: &str) -> Result<(), ModelError> {
    validate::length_between("reason", reason, 10, 4000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_precedes_decision() {
        use AppealStatus::*;
        assert!(Pending.transition(Accepted).is_err());
        assert!(Pending.transition(UnderReview).is_ok());
        assert!(UnderReview.transition(Rejected).is_ok());
        assert!(Accepted.is_terminal() && Rejected.is_terminal());
        assert!(!Pending.is_terminal());
    }
}
