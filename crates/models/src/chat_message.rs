use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{conversation, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "chat_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender_id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub read_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Conversation,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Conversation => Entity::belongs_to(conversation::Entity)
                .from(Column::ConversationId)
                .to(conversation::Column::Id)
                .into(),
        }
    }
}

impl Related<conversation::Entity> for Entity {
    fn to() -> RelationDef { Relation::Conversation.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_body(body: &str) -> Result<(), ModelError> {
    validate::required("body", body, 4000)
}
