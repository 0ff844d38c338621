use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::lifecycle::Lifecycle;

string_enum! {
    pub enum DeliveryStatus {
        Queued => "queued",
        Sent => "sent",
        Failed => "failed",
    }
}

impl Lifecycle for DeliveryStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use DeliveryStatus::*;
        matches!((self, next), (Queued, Sent) | (Queued, Failed))
    }

    fn is_terminal(self) -> bool { self != DeliveryStatus::Queued }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "outbound_message")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub recipient_id: Option<Uuid>,
    pub to_phone: String,
    pub template_id: Option<Uuid>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub channel: String,
    pub status: String,
    pub provider_message_id: Option<String>,
    pub error: Option<String>,
    pub sent_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
