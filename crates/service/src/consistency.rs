//! Listing completeness score: a weighted checklist over a project and its photos.

use sea_orm::DatabaseConnection;
use serde::Serialize;
use uuid::Uuid;

use models::{project, project_photo};

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::projects;

pub const MIN_DESCRIPTION_CHARS: usize = 200;
pub const MIN_PHOTOS: usize = 3;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Check {
    pub name: &'static str,
    pub passed: bool,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    pub project_id: Uuid,
    pub score: u32,
    pub checks: Vec<Check>,
}

/// Weights sum to 100.
pub fn evaluate(p: &project::Model, photos: &[project_photo::Model]) -> Vec<Check> {
    let price_ok = match (p.price_min_cents, p.price_max_cents) {
        (Some(lo), Some(hi)) => lo >= 0 && lo <= hi,
        _ => false,
    };
    vec![
        Check { name: "description_length", passed: p.description.trim().chars().count() >= MIN_DESCRIPTION_CHARS, weight: 20 },
        Check { name: "coordinates", passed: p.coordinates().is_some(), weight: 15 },
        Check { name: "price_range", passed: price_ok, weight: 15 },
        Check { name: "units_total", passed: p.units_total > 0, weight: 10 },
        Check { name: "delivery_date", passed: p.delivery_date.is_some(), weight: 10 },
        Check { name: "photo_count", passed: photos.len() >= MIN_PHOTOS, weight: 15 },
        Check { name: "geo_verified_photo", passed: photos.iter().any(|ph| ph.geo_verified), weight: 15 },
    ]
}

pub fn score(checks: &[Check]) -> u32 {
    checks.iter().filter(|c| c.passed).map(|c| c.weight).sum()
}

pub async fn report(db: &DatabaseConnection, actor: &Actor, project_id: Uuid) -> Result<ConsistencyReport, ServiceError> {
    let p = projects::find_owned(db, actor, project_id).await?;
    let photos = projects::photos_of(db, p.id).await?;
    let checks = evaluate(&p, &photos);
    Ok(ConsistencyReport { project_id: p.id, score: score(&checks), checks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use models::project::ProjectStatus;
    use models::user::Role;
    use crate::projects::NewPhoto;
    use crate::test_support::{get_db, seed_project, seed_user};

    fn bare_project() -> project::Model {
        let now = Utc::now().into();
        project::Model {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Tower".into(),
            description: String::new(),
            city: "Abidjan".into(),
            address: None,
            latitude: None,
            longitude: None,
            price_min_cents: None,
            price_max_cents: None,
            units_total: 0,
            delivery_date: None,
            status: "draft".into(),
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn weights_sum_to_hundred() {
        let checks = evaluate(&bare_project(), &[]);
        assert_eq!(checks.iter().map(|c| c.weight).sum::<u32>(), 100);
        assert_eq!(score(&checks), 0);
    }

    #[test]
    fn partial_listing() {
        let mut p = bare_project();
        p.description = "x".repeat(200);
        p.units_total = 4;
        p.price_min_cents = Some(10);
        p.price_max_cents = Some(5);
        let checks = evaluate(&p, &[]);
        // description + units; incoherent prices do not count
        assert_eq!(score(&checks), 30);
    }

    #[tokio::test]
    async fn report_counts_photos() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Draft).await?;

        let before = report(&db, &owner, p.id).await?;
        // coordinates, price, units, delivery date
        assert_eq!(before.score, 50);

        for i in 0..3 {
            let photo = NewPhoto { url: format!("https://cdn.example.com/{i}.jpg"), latitude: Some(14.6937), longitude: Some(-17.4441) };
            projects::add_photo(&db, &owner, p.id, photo, 2.0).await?;
        }
        let after = report(&db, &owner, p.id).await?;
        assert_eq!(after.score, 80);

        assert!(matches!(report(&db, &client, p.id).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }
}
