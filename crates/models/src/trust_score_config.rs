use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// The configuration is a single row under this key.
pub const SINGLETON_ID: Uuid = Uuid::nil();

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "trust_score_config")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub base: f64,
    pub review_weight: f64,
    pub response_weight: f64,
    pub badge_weight: f64,
    pub incident_penalty: f64,
    pub report_penalty: f64,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Weights used to compute trust scores, detached from storage.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub base: f64,
    pub review_weight: f64,
    pub response_weight: f64,
    pub badge_weight: f64,
    pub incident_penalty: f64,
    pub report_penalty: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            base: 20.0,
            review_weight: 35.0,
            response_weight: 25.0,
            badge_weight: 20.0,
            incident_penalty: 10.0,
            report_penalty: 5.0,
        }
    }
}

impl From<&Model> for Weights {
    fn from(m: &Model) -> Self {
        Self {
            base: m.base,
            review_weight: m.review_weight,
            response_weight: m.response_weight,
            badge_weight: m.badge_weight,
            incident_penalty: m.incident_penalty,
            report_penalty: m.report_penalty,
        }
    }
}

impl Weights {
    pub fn validate(&self) -> Result<(), ModelError> {
        let fields = [
            ("base", self.base),
            ("review_weight", self.review_weight),
            ("response_weight", self.response_weight),
            ("badge_weight", self.badge_weight),
            ("incident_penalty", self.incident_penalty),
            ("report_penalty", self.report_penalty),
        ];
        for (name, v) in fields {
            if !v.is_finite() || v < 0.0 {
                return Err(ModelError::Validation(format!("{name} must be a finite number >= 0")));
            }
        }
        Ok(())
    }
}
