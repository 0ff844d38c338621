use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;

string_enum! {
    pub enum PartnerCategory {
        Bank => "bank",
        Notary => "notary",
        Insurer => "insurer",
        Architect => "architect",
        Other => "other",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "partner")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate_fields(name: Option<&str>, website: Option<&str>, contact_email: Option<&str>) -> Result<(), ModelError> {
    if let Some(n) = name { validate::required("name", n, 200)?; }
    if let Some(w) = website { validate::http_url("website", w)?; }
    if let Some(e) = contact_email { validate::email(e)?; }
    Ok(())
}
