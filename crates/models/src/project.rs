use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::{user, validate};

string_enum! {
    pub enum ProjectStatus {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
        Archived => "archived",
    }
}

impl Lifecycle for ProjectStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, next),
            (Draft, Submitted)
                | (Rejected, Submitted)
                | (Submitted, Approved)
                | (Submitted, Rejected)
                | (Approved, Archived)
                | (Draft, Archived)
        )
    }

    fn is_terminal(self) -> bool { self == ProjectStatus::Archived }
}

impl ProjectStatus {
    /// Content may only be edited while the project is not under or past moderation.
    pub fn is_editable(self) -> bool {
        matches!(self, ProjectStatus::Draft | ProjectStatus::Rejected)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "project")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_min_cents: Option<i64>,
    pub price_max_cents: Option<i64>,
    pub units_total: i32,
    pub delivery_date: Option<String>,
    pub status: String,
    pub rejection_reason: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Owner,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Owner => Entity::belongs_to(user::Entity).from(Column::OwnerId).to(user::Column::Id).into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn status(&self) -> Result<ProjectStatus, ModelError> { self.status.parse() }

    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

pub fn validate_title(title: &str) -> Result<(), ModelError> {
    validate::length_between("title", title, 3, 200)
}

pub fn validate_city(city: &str) -> Result<(), ModelError> {
    validate::required("city", city, 120)
}

/// Latitude and longitude come as a pair and must lie in their ranges.
pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ModelError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lon)) => {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(ModelError::Validation("latitude must be within -90..=90".into()));
            }
            if !(-180.0..=180.0).contains(&lon) {
                return Err(ModelError::Validation("longitude must be within -180..=180".into()));
            }
            Ok(())
        }
        _ => Err(ModelError::Validation("latitude and longitude must be given together".into())),
    }
}

pub fn validate_price_range(min: Option<i64>, max: Option<i64>) -> Result<(), ModelError> {
    if let Some(v) = min { validate::non_negative("price_min_cents", v)?; }
    if let Some(v) = max { validate::non_negative("price_max_cents", v)?; }
    if let (Some(lo), Some(hi)) = (min, max) {
        if lo > hi {
            return Err(ModelError::Validation("price_min_cents must not exceed price_max_cents".into()));
        }
    }
    Ok(())
}

pub fn validate_units(units_total: i32) -> Result<(), ModelError> {
    validate::non_negative("units_total", units_total as i64)
}

pub fn validate_delivery_date(value: Option<&str>) -> Result<(), ModelError> {
    match value {
        Some(d) => validate::iso_date("delivery_date", d),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moderation_flow() {
        use ProjectStatus::*;
        assert!(Draft.transition(Submitted).is_ok());
        assert!(Submitted.transition(Approved).is_ok());
        assert!(Submitted.transition(Rejected).is_ok());
        assert!(Rejected.transition(Submitted).is_ok());
        assert!(Approved.transition(Archived).is_ok());
        assert!(Draft.transition(Approved).is_err());
        assert!(Approved.transition(Submitted).is_err());
        assert!(Archived.transition(Draft).is_err());
    }

    #[test]
    fn transition_error_names_both_states() {
        let err = ProjectStatus::Draft.transition(ProjectStatus::Approved).unwrap_err();
        assert_eq!(err.to_string(), "validation error: invalid transition from draft to approved");
    }

    #[test]
    fn coordinates_come_in_pairs() {
        assert!(validate_coordinates(Some(48.85), Some(2.35)).is_ok());
        assert!(validate_coordinates(Some(48.85), None).is_err());
        assert!(validate_coordinates(Some(91.0), Some(2.0)).is_err());
        assert!(validate_coordinates(None, None).is_ok());
    }

    #[test]
    fn price_range_is_ordered() {
        assert!(validate_price_range(Some(100), Some(200)).is_ok());
        assert!(validate_price_range(Some(300), Some(200)).is_err());
        assert!(validate_price_range(Some(-1), None).is_err());
        assert!(validate_price_range(None, Some(10)).is_ok());
    }
}
