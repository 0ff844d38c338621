//! Versioned markdown brochures, generated one at a time or in bounded parallel batches.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use models::brochure;
use models::project::{self, ProjectStatus};
use models::project_photo;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::projects;

#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    pub project_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct BatchItem {
    pub project_id: Uuid,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brochure_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BatchItem {
    fn from_result(project_id: Uuid, res: Result<brochure::Model, ServiceError>) -> Self {
        match res {
            Ok(b) => Self { project_id, ok: true, brochure_id: Some(b.id), error: None },
            Err(e) => Self { project_id, ok: false, brochure_id: None, error: Some(e.to_string()) },
        }
    }
}

fn money(cents: i64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// Markdown body for `p` and its photos.
pub fn render(p: &project::Model, photos: &[project_photo::Model]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}\n", p.title);
    let _ = writeln!(out, "- City: {}", p.city);
    if let Some(addr) = &p.address {
        let _ = writeln!(out, "- Address: {addr}");
    }
    let price = match (p.price_min_cents, p.price_max_cents) {
        (Some(lo), Some(hi)) => format!("{} - {}", money(lo), money(hi)),
        (Some(lo), None) => format!("from {}", money(lo)),
        (None, Some(hi)) => format!("up to {}", money(hi)),
        (None, None) => "on request".to_string(),
    };
    let _ = writeln!(out, "- Price: {price}");
    let _ = writeln!(out, "- Units: {}", p.units_total);
    let _ = writeln!(out, "- Delivery: {}", p.delivery_date.as_deref().unwrap_or("to be announced"));
    let verified = photos.iter().filter(|ph| ph.geo_verified).count();
    let _ = writeln!(out, "- Photos: {} ({} geo-verified)", photos.len(), verified);
    let _ = writeln!(out, "\n## Description\n\n{}", p.description);
    out
}

async fn next_version(db: &DatabaseConnection, project_id: Uuid) -> Result<i32, ServiceError> {
    let last = brochure::Entity::find()
        .filter(brochure::Column::ProjectId.eq(project_id))
        .order_by_desc(brochure::Column::Version)
        .one(db)
        .await?;
    Ok(last.map(|b| b.version + 1).unwrap_or(1))
}

/// Generate the next brochure version. Drafts have nothing to publish yet.
pub async fn generate(db: &DatabaseConnection, actor: &Actor, project_id: Uuid) -> Result<brochure::Model, ServiceError> {
    let p = projects::find_owned(db, actor, project_id).await?;
    if p.status()? == ProjectStatus::Draft {
        return Err(ServiceError::validation("draft projects have no brochure"));
    }
    let photos = projects::photos_of(db, p.id).await?;
    let content = render(&p, &photos);
    let version = next_version(db, p.id).await?;
    let created = brochure::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        version: Set(version),
        content: Set(content),
        generated_by: Set(actor.user_id),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    info!(project_id = %p.id, version, "brochure_generated");
    Ok(created)
}

pub async fn latest(db: &DatabaseConnection, actor: Option<&Actor>, project_id: Uuid) -> Result<brochure::Model, ServiceError> {
    let p = projects::find_visible(db, actor, project_id).await?;
    brochure::Entity::find()
        .filter(brochure::Column::ProjectId.eq(p.id))
        .order_by_desc(brochure::Column::Version)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("brochure"))
}

/// Order-preserving dedupe.
fn unique_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Run `job` once per id with at most `parallelism` jobs in flight.
///
/// Outcomes follow `ids` order. A job that panics becomes an error outcome for its id.
async fn fan_out<T, F, Fut>(ids: Vec<Uuid>, parallelism: usize, job: F) -> Vec<(Uuid, Result<T, ServiceError>)>
where
    T: Send + 'static,
    F: Fn(Uuid) -> Fut,
    Fut: Future<Output = Result<T, ServiceError>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(parallelism.max(1)));
    let mut handles: Vec<(Uuid, JoinHandle<Result<T, ServiceError>>)> = Vec::with_capacity(ids.len());
    for id in ids {
        let semaphore = Arc::clone(&semaphore);
        let fut = job(id);
        let handle = tokio::spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| ServiceError::Db(format!("semaphore closed: {e}")))?;
            fut.await
        });
        handles.push((id, handle));
    }

    let mut outcomes = Vec::with_capacity(handles.len());
    for (id, handle) in handles {
        let res = match handle.await {
            Ok(res) => res,
            Err(join_err) => Err(ServiceError::Db(format!("generation task failed: {join_err}"))),
        };
        outcomes.push((id, res));
    }
    outcomes
}

/// Generate brochures for many projects with at most `parallelism` in flight.
///
/// Results follow request order. A failing project yields an error item and never aborts the others.
pub async fn batch(
    db: &DatabaseConnection,
    actor: &Actor,
    input: BatchRequest,
    max_items: usize,
    parallelism: usize,
) -> Result<Vec<BatchItem>, ServiceError> {
    actor.require_admin()?;
    let ids = unique_ids(&input.project_ids);
    if ids.is_empty() || ids.len() > max_items {
        return Err(ServiceError::validation(format!("project_ids must hold 1..={max_items} ids")));
    }

    let outcomes = fan_out(ids, parallelism, |id| {
        let db = db.clone();
        let actor = *actor;
        async move { generate(&db, &actor, id).await }
    })
    .await;

    let mut results = Vec::with_capacity(outcomes.len());
    for (id, res) in outcomes {
        if let Err(e) = &res {
            warn!(project_id = %id, error = %e, "brochure_batch_item_failed");
        }
        results.push(BatchItem::from_result(id, res));
    }
    let ok = results.iter().filter(|r| r.ok).count();
    info!(total = results.len(), ok, "brochure_batch_done");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::user::Role;
    use crate::projects::NewPhoto;
    use crate::test_support::{get_db, seed_project, seed_user};

    #[tokio::test]
    async fn versions_increase_and_drafts_refused() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let photo = NewPhoto { url: "https://cdn.example.com/a.jpg".into(), latitude: Some(14.6940), longitude: Some(-17.4440) };
        projects::add_photo(&db, &owner, p.id, photo, 2.0).await?;

        let v1 = generate(&db, &owner, p.id).await?;
        let v2 = generate(&db, &owner, p.id).await?;
        assert_eq!((v1.version, v2.version), (1, 2));
        assert!(v1.content.starts_with("# Residence Les Palmiers"));
        assert!(v1.content.contains("- Price: 50000.00 - 90000.00"));
        assert!(v1.content.contains("- Photos: 1 (1 geo-verified)"));
        assert_eq!(latest(&db, Some(&client), p.id).await?.id, v2.id);
        assert!(matches!(generate(&db, &client, p.id).await, Err(ServiceError::Forbidden(_))));

        let draft = seed_project(&db, owner.user_id, ProjectStatus::Draft).await?;
        assert!(matches!(generate(&db, &owner, draft.id).await, Err(ServiceError::Validation(_))));
        assert!(matches!(latest(&db, None, draft.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn batch_isolates_failures_and_keeps_order() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let a = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let draft = seed_project(&db, owner.user_id, ProjectStatus::Draft).await?;
        let b = seed_project(&db, owner.user_id, ProjectStatus::Submitted).await?;
        let missing = Uuid::new_v4();

        let req = BatchRequest { project_ids: vec![a.id, draft.id, a.id, missing, b.id] };
        let out = batch(&db, &admin, req, 10, 2).await?;
        let ids: Vec<Uuid> = out.iter().map(|i| i.project_id).collect();
        assert_eq!(ids, vec![a.id, draft.id, missing, b.id]);
        let oks: Vec<bool> = out.iter().map(|i| i.ok).collect();
        assert_eq!(oks, vec![true, false, false, true]);
        assert!(out[1].error.is_some());
        assert!(out[0].brochure_id.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn batch_bounds() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let empty = BatchRequest { project_ids: vec![] };
        assert!(matches!(batch(&db, &admin, empty, 3, 2).await, Err(ServiceError::Validation(_))));
        let many = BatchRequest { project_ids: (0..4).map(|_| Uuid::new_v4()).collect() };
        assert!(matches!(batch(&db, &admin, many, 3, 2).await, Err(ServiceError::Validation(_))));
        let one = BatchRequest { project_ids: vec![Uuid::new_v4()] };
        assert!(matches!(batch(&db, &owner, one, 3, 2).await, Err(ServiceError::Forbidden(_))));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn fan_out_never_exceeds_parallelism() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::time::Duration;

        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let ids: Vec<Uuid> = (0..9).map(|_| Uuid::new_v4()).collect();
        let outcomes = fan_out(ids.clone(), 3, |id| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(15)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok(id)
            }
        })
        .await;

        let peak = peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak was {peak}");
        assert!(peak >= 2, "jobs never overlapped");
        let got: Vec<Uuid> = outcomes.into_iter().map(|(_, r)| r.unwrap()).collect();
        assert_eq!(got, ids);
    }

    #[tokio::test]
    async fn panicking_job_becomes_an_error_item() {
        let ids: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        let bad = ids[1];
        let outcomes = fan_out(ids.clone(), 2, move |id| async move {
            if id == bad {
                panic!("renderer blew up");
            }
            Ok(id)
        })
        .await;

        assert_eq!(outcomes.len(), 3);
        assert!(outcomes[0].1.is_ok());
        assert!(outcomes[2].1.is_ok());
        match &outcomes[1] {
            (id, Err(ServiceError::Db(m))) => {
                assert_eq!(*id, bad);
                assert!(m.contains("generation task failed"), "{m}");
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn unique_ids_keeps_first_occurrence() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        assert_eq!(unique_ids(&[b, a, b, a]), vec![b, a]);
    }
}
