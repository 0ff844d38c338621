use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::{project, validate};

string_enum! {
    pub enum LeadStatus {
        New => "new",
        Contacted => "contacted",
        Qualified => "qualified",
        Won => "won",
        Lost => "lost",
    }
}

impl Lifecycle for LeadStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use LeadStatus::*;
        match (self, next) {
            (New, Contacted) | (Contacted, Qualified) | (Qualified, Won) => true,
            (from, Lost) => !from.is_terminal(),
            _ => false,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, LeadStatus::Won | LeadStatus::Lost)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lead")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub client_id: Uuid,
    pub promoteur_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub message: String,
    pub phone: Option<String>,
    pub status: String,
    pub first_response_at: Option<DateTimeWithTimeZone>,
    pub notes: Option<String>,
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
    pub fn status(&self) -> Result<LeadStatus, ModelError> { self.status.parse() }
}

pub fn validate_message(message: &str) -> Result<(), ModelError> {
    validate::required("message", message, 4000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pipeline_moves_forward_only() {
        use LeadStatus::*;
        assert!(New.transition(Contacted).is_ok());
        assert!(Contacted.transition(Qualified).is_ok());
        assert!(Qualified.transition(Won).is_ok());
        assert!(New.transition(Qualified).is_err());
        assert!(Qualified.transition(Contacted).is_err());
    }

    #[test]
    fn lost_from_any_open_state() {
        use LeadStatus::*;
        for s in [New, Contacted, Qualified] {
            assert!(s.transition(Lost).is_ok(), "{s}");
        }
        assert!(Won.transition(Lost).is_err());
        assert!(Lost.transition(Lost).is_err());
    }
}
