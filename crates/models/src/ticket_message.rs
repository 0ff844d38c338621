use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{support_ticket, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ticket_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ticket_id: Uuid,
    pub author_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Ticket,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Ticket => Entity::belongs_to(support_ticket::Entity)
                .from(Column::TicketId)
                .to(support_ticket::Column::Id)
                .into(),
        }
    }
}

impl Related<support_ticket::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ticket.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_body(body: &str) -> Result<(), ModelError> {
    validate::required("body", body, 4000)
}
