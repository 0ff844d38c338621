//! Promoteur reputation: a weighted blend of reviews, lead responsiveness and badges, minus penalties.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::lead;
use models::report::{self, ReportStatus, ReportTarget};
use models::security_incident::{self, IncidentStatus};
use models::trust_score_config::{self, Weights, SINGLETON_ID};
use models::user::Role;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::{badges, projects, reviews, users};

/// Badges beyond this count add nothing.
pub const BADGE_CAP: u64 = 5;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeightsUpdate {
    pub base: Option<f64>,
    pub review_weight: Option<f64>,
    pub response_weight: Option<f64>,
    pub badge_weight: Option<f64>,
    pub incident_penalty: Option<f64>,
    pub report_penalty: Option<f64>,
}

/// Raw activity figures feeding the score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub average_rating: Option<f64>,
    pub responded_leads: u64,
    pub on_time_responses: u64,
    pub badge_count: u64,
    pub open_incidents: u64,
    pub resolved_reports: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Breakdown {
    pub base: f64,
    pub review: f64,
    pub response: f64,
    pub badges: f64,
    pub incident_penalty: f64,
    pub report_penalty: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrustScore {
    pub user_id: Uuid,
    pub score: f64,
    pub breakdown: Breakdown,
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub fn compute_score(w: &Weights, i: &Inputs) -> (f64, Breakdown) {
    let review_ratio = i.average_rating.map(|r| r / 5.0).unwrap_or(0.0);
    let response_ratio = if i.responded_leads == 0 { 1.0 } else { i.on_time_responses as f64 / i.responded_leads as f64 };
    let badge_ratio = i.badge_count.min(BADGE_CAP) as f64 / BADGE_CAP as f64;
    let b = Breakdown {
        base: w.base,
        review: review_ratio * w.review_weight,
        response: response_ratio * w.response_weight,
        badges: badge_ratio * w.badge_weight,
        incident_penalty: w.incident_penalty * i.open_incidents as f64,
        report_penalty: w.report_penalty * i.resolved_reports as f64,
    };
    let raw = b.base + b.review + b.response + b.badges - b.incident_penalty - b.report_penalty;
    let breakdown = Breakdown {
        base: round1(b.base),
        review: round1(b.review),
        response: round1(b.response),
        badges: round1(b.badges),
        incident_penalty: round1(b.incident_penalty),
        report_penalty: round1(b.report_penalty),
    };
    (round1(raw.clamp(0.0, 100.0)), breakdown)
}

pub async fn load_weights(db: &DatabaseConnection) -> Result<Weights, ServiceError> {
    let row = trust_score_config::Entity::find_by_id(SINGLETON_ID).one(db).await?;
    Ok(row.as_ref().map(Weights::from).unwrap_or_default())
}

pub async fn get_config(db: &DatabaseConnection, actor: &Actor) -> Result<Weights, ServiceError> {
    actor.require_admin()?;
    load_weights(db).await
}

pub async fn update_config(db: &DatabaseConnection, actor: &Actor, input: WeightsUpdate) -> Result<Weights, ServiceError> {
    actor.require_admin()?;
    let current = trust_score_config::Entity::find_by_id(SINGLETON_ID).one(db).await?;
    let mut w = current.as_ref().map(Weights::from).unwrap_or_default();
    if let Some(v) = input.base { w.base = v; }
    if let Some(v) = input.review_weight { w.review_weight = v; }
    if let Some(v) = input.response_weight { w.response_weight = v; }
    if let Some(v) = input.badge_weight { w.badge_weight = v; }
    if let Some(v) = input.incident_penalty { w.incident_penalty = v; }
    if let Some(v) = input.report_penalty { w.report_penalty = v; }
    w.validate()?;

    let exists = current.is_some();
    let mut am = match current {
        Some(row) => row.into(),
        None => trust_score_config::ActiveModel { id: Set(SINGLETON_ID), ..Default::default() },
    };
    am.base = Set(w.base);
    am.review_weight = Set(w.review_weight);
    am.response_weight = Set(w.response_weight);
    am.badge_weight = Set(w.badge_weight);
    am.incident_penalty = Set(w.incident_penalty);
    am.report_penalty = Set(w.report_penalty);
    am.updated_by = Set(Some(actor.user_id));
    am.updated_at = Set(Utc::now().into());
    // the singleton id is always set, so `save` would always UPDATE
    if exists {
        am.update(db).await?;
    } else {
        am.insert(db).await?;
    }
    info!(updated_by = %actor.user_id, "trust_score_config_updated");
    Ok(w)
}

async fn gather(db: &DatabaseConnection, user_id: Uuid, sla_hours: i64) -> Result<Inputs, ServiceError> {
    let ratings = reviews::ratings_for_promoteur(db, user_id).await?;
    let average_rating = reviews::average(ratings);

    let responded: Vec<lead::Model> = lead::Entity::find()
        .filter(lead::Column::PromoteurId.eq(user_id))
        .filter(lead::Column::FirstResponseAt.is_not_null())
        .all(db)
        .await?;
    let on_time = responded
        .iter()
        .filter(|l| l.first_response_at.is_some_and(|at| (at - l.created_at).num_seconds() <= sla_hours * 3600))
        .count() as u64;

    let badge_count = badges::count_for_user(db, user_id).await?;

    let open_incidents = security_incident::Entity::find()
        .filter(security_incident::Column::AffectedUserId.eq(user_id))
        .filter(security_incident::Column::Status.ne(IncidentStatus::Resolved.as_str()))
        .count(db)
        .await?;

    let mut resolved_reports = report::Entity::find()
        .filter(report::Column::Status.eq(ReportStatus::Resolved.as_str()))
        .filter(report::Column::TargetType.eq(ReportTarget::User.as_str()))
        .filter(report::Column::TargetId.eq(user_id))
        .count(db)
        .await?;
    let project_ids = projects::ids_owned_by(db, user_id).await?;
    if !project_ids.is_empty() {
        resolved_reports += report::Entity::find()
            .filter(report::Column::Status.eq(ReportStatus::Resolved.as_str()))
            .filter(report::Column::TargetType.eq(ReportTarget::Project.as_str()))
            .filter(report::Column::TargetId.is_in(project_ids))
            .count(db)
            .await?;
    }

    Ok(Inputs {
        average_rating,
        responded_leads: responded.len() as u64,
        on_time_responses: on_time,
        badge_count,
        open_incidents,
        resolved_reports,
    })
}

pub async fn compute(db: &DatabaseConnection, user_id: Uuid, sla_hours: i64) -> Result<TrustScore, ServiceError> {
    let u = users::get_user(db, user_id).await?;
    if u.role()? != Role::Promoteur {
        return Err(ServiceError::not_found("trust score"));
    }
    let weights = load_weights(db).await?;
    let inputs = gather(db, user_id, sla_hours).await?;
    let (score, breakdown) = compute_score(&weights, &inputs);
    Ok(TrustScore { user_id, score, breakdown })
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::project::ProjectStatus;
    use crate::reviews::NewReview;
    use crate::test_support::{get_db, seed_project, seed_user};

    #[test]
    fn newcomer_gets_base_plus_response() {
        let (score, b) = compute_score(&Weights::default(), &Inputs::default());
        assert_eq!(b.review, 0.0);
        assert_eq!(b.response, 25.0);
        assert_eq!(score, 45.0);
    }

    #[test]
    fn full_marks_cap_at_hundred() {
        let i = Inputs { average_rating: Some(5.0), responded_leads: 4, on_time_responses: 4, badge_count: 9, ..Default::default() };
        let (score, b) = compute_score(&Weights::default(), &i);
        assert_eq!(b.badges, 20.0);
        assert_eq!(score, 100.0);
    }

    #[test]
    fn penalties_floor_at_zero() {
        let i = Inputs { open_incidents: 10, resolved_reports: 3, ..Default::default() };
        let (score, b) = compute_score(&Weights::default(), &i);
        assert_eq!(b.incident_penalty, 100.0);
        assert_eq!(b.report_penalty, 15.0);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn mixed_activity_rounds_to_one_decimal() {
        let i = Inputs { average_rating: Some(4.33), responded_leads: 3, on_time_responses: 2, badge_count: 1, ..Default::default() };
        let (score, _) = compute_score(&Weights::default(), &i);
        // 20 + 30.31 + 16.667 + 4
        assert_eq!(score, 71.0);
    }

    #[tokio::test]
    async fn config_defaults_then_partial_update() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (_, p) = seed_user(&db, Role::Promoteur).await?;
        assert_eq!(get_config(&db, &admin).await?, Weights::default());
        assert!(get_config(&db, &p).await.is_err());

        let w = update_config(&db, &admin, WeightsUpdate { base: Some(10.0), ..Default::default() }).await?;
        assert_eq!(w.base, 10.0);
        assert_eq!(w.review_weight, 35.0);
        let w = update_config(&db, &admin, WeightsUpdate { report_penalty: Some(2.5), ..Default::default() }).await?;
        assert_eq!(w.base, 10.0);
        assert_eq!(get_config(&db, &admin).await?.report_penalty, 2.5);
        assert_eq!(trust_score_config::Entity::find().count(&db).await?, 1);

        assert!(update_config(&db, &admin, WeightsUpdate { badge_weight: Some(-1.0), ..Default::default() }).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn computed_from_reviews() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (p, owner) = seed_user(&db, Role::Promoteur).await?;
        let (c, client) = seed_user(&db, Role::Client).await?;
        let project = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        reviews::create(&db, &client, project.id, NewReview { rating: 5, comment: None }).await?;

        let ts = compute(&db, p.id, 24).await?;
        // 20 + 35 + 25 + 0
        assert_eq!(ts.score, 80.0);
        assert!(matches!(compute(&db, c.id, 24).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }
}
