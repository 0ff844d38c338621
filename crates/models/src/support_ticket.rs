use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::validate;

string_enum! {
    pub enum Priority {
        Low => "low",
        Normal => "normal",
        High => "high",
    }
}

string_enum! {
    pub enum TicketStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

impl Lifecycle for TicketStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Open, InProgress) | (InProgress, Resolved) | (Resolved, Closed) | (Resolved, Open) | (Open, Closed)
        )
    }

    fn is_terminal(self) -> bool { self == TicketStatus::Closed }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "support_ticket")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject: String,
    pub priority: String,
    pub status: String,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Messages,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Messages => Entity::has_many(crate::ticket_message::Entity).into(),
        }
    }
}

impl Related<crate::ticket_message::Entity> for Entity {
    fn to() -> RelationDef { Relation::Messages.def() }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<TicketStatus, ModelError> { self.status.parse() }
}

pub fn validate_subject(subject: &str) -> Result<(), ModelError> {
    validate::required("subject", subject, 200)
}
