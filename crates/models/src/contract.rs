use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::{lead, validate};

string_enum! {
    pub enum ContractStatus {
        Draft => "draft",
        Sent => "sent",
        Signed => "signed",
        Cancelled => "cancelled",
    }
}

impl Lifecycle for ContractStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use ContractStatus::*;
        matches!((self, next), (Draft, Sent) | (Sent, Signed) | (Sent, Cancelled) | (Draft, Cancelled))
    }

    fn is_terminal(self) -> bool {
        matches!(self, ContractStatus::Signed | ContractStatus::Cancelled)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contract")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub lead_id: Uuid,
    pub project_id: Uuid,
    pub promoteur_id: Uuid,
    pub client_id: Uuid,
    pub amount_cents: i64,
    #[sea_orm(column_type = "Text")]
    pub terms: String,
    pub status: String,
    pub sent_at: Option<DateTimeWithTimeZone>,
    pub signed_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Lead,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Lead => Entity::belongs_to(lead::Entity).from(Column::LeadId).to(lead::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<ContractStatus, ModelError> { self.status.parse() }

    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.client_id == user_id || self.promoteur_id == user_id
    }
}

pub fn validate_terms(amount_cents: i64, terms: &str) -> Result<(), ModelError> {
    validate::positive("amount_cents", amount_cents)?;
    validate::required("terms", terms, 20_000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_contracts_cannot_be_cancelled() {
        use ContractStatus::*;
        assert!(Sent.transition(Signed).is_ok());
        assert!(Signed.transition(Cancelled).is_err());
        assert!(Draft.transition(Signed).is_err());
    }
}
