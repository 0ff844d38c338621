use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::lifecycle::Lifecycle;
use crate::{project, validate};

string_enum! {
    pub enum AdStatus {
        Draft => "draft",
        Active => "active",
        Paused => "paused",
        Ended => "ended",
    }
}

impl Lifecycle for AdStatus {
    fn can_transition_to(self, next: Self) -> bool {
        use AdStatus::*;
        matches!(
            (self, next),
            (Draft, Active) | (Active, Paused) | (Paused, Active) | (Active, Ended) | (Paused, Ended) | (Draft, Ended)
        )
    }

    fn is_terminal(self) -> bool { self == AdStatus::Ended }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ad_campaign")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub project_id: Uuid,
    pub promoteur_id: Uuid,
    pub title: String,
    pub budget_cents: i64,
    pub cost_per_click_cents: i64,
    pub spent_cents: i64,
    pub impressions: i64,
    pub clicks: i64,
    pub status: String,
    pub starts_at: Option<DateTimeWithTimeZone>,
    pub ends_at: Option<DateTimeWithTimeZone>,
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
    pub fn status(&self) -> Result<AdStatus, ModelError> { self.status.parse() }

    /// Click-through rate as a percentage, 0 before the first impression.
    pub fn ctr(&self) -> f64 {
        ctr(self.impressions, self.clicks)
    }
}

pub fn ctr(impressions: i64, clicks: i64) -> f64 {
    if impressions <= 0 {
        return 0.0;
    }
    (clicks as f64 / impressions as f64 * 10_000.0).round() / 100.0
}

pub fn validate_campaign(title: &str, budget_cents: i64, cost_per_click_cents: i64) -> Result<(), ModelError> {
    validate::required("title", title, 200)?;
    validate::positive("budget_cents", budget_cents)?;
    validate::positive("cost_per_click_cents", cost_per_click_cents)
}
