use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::{invoice, validate};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invoice_line")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub invoice_id: Uuid,
    pub position: i32,
    pub description: String,
    pub quantity: i32,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Invoice,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Invoice => Entity::belongs_to(invoice::Entity).from(Column::InvoiceId).to(invoice::Column::Id).into(),
        }
    }
}

impl Related<invoice::Entity> for Entity {
    fn to() -> RelationDef { Relation::Invoice.def() }
}

impl ActiveModelBehavior for ActiveModel {}

/// Validates one line and returns its total.
pub fn line_total(description: &str, quantity: i32, unit_price_cents: i64) -> Result<i64, ModelError> {
    validate::required("description", description, 500)?;
    validate::positive("quantity", quantity as i64)?;
    validate::non_negative("unit_price_cents", unit_price_cents)?;
    unit_price_cents
        .checked_mul(quantity as i64)
        .ok_or_else(|| ModelError::Validation("line total overflows".into()))
}
