//! Sales pipeline: client enquiries on approved projects and their follow-up.

use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::lead::{self, LeadStatus};
use models::lifecycle::Lifecycle;
use models::project::ProjectStatus;
use models::user::Role;
use models::validate;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::projects;

#[derive(Debug, Clone, Deserialize)]
pub struct NewLead {
    pub message: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeadFilter {
    pub status: Option<LeadStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: LeadStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlaStats {
    pub sla_hours: i64,
    pub total: u64,
    pub responded: u64,
    pub breached: u64,
    pub pending_breached: u64,
    pub avg_response_hours: Option<f64>,
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, project_id: Uuid, input: NewLead) -> Result<lead::Model, ServiceError> {
    actor.require_role(Role::Client)?;
    lead::validate_message(&input.message)?;
    if let Some(phone) = &input.phone {
        validate::phone(phone)?;
    }
    let p = projects::find_visible(db, Some(actor), project_id).await?;
    if p.status()? != ProjectStatus::Approved {
        return Err(ServiceError::validation("project is not accepting leads"));
    }

    let open = lead::Entity::find()
        .filter(lead::Column::ProjectId.eq(p.id))
        .filter(lead::Column::ClientId.eq(actor.user_id))
        .filter(lead::Column::Status.is_in([LeadStatus::New.as_str(), LeadStatus::Contacted.as_str(), LeadStatus::Qualified.as_str()]))
        .one(db)
        .await?;
    if open.is_some() {
        return Err(ServiceError::conflict("an open lead already exists for this project"));
    }

    let now = Utc::now().into();
    let am = lead::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        client_id: Set(actor.user_id),
        promoteur_id: Set(p.owner_id),
        message: Set(input.message),
        phone: Set(input.phone),
        status: Set(LeadStatus::New.as_str().into()),
        first_response_at: Set(None),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    info!(lead_id = %created.id, project_id = %p.id, client_id = %actor.user_id, "lead_created");
    Ok(created)
}

pub async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<lead::Model, ServiceError> {
    lead::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("lead"))
}

/// Leads are visible to their client, the project's promoteur and admins.
pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<lead::Model, ServiceError> {
    let l = find(db, id).await?;
    if actor.is_admin() || l.client_id == actor.user_id || l.promoteur_id == actor.user_id {
        return Ok(l);
    }
    Err(ServiceError::forbidden("not a party to this lead"))
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, filter: LeadFilter, opts: Pagination) -> Result<Page<lead::Model>, ServiceError> {
    let mut q = lead::Entity::find().order_by_desc(lead::Column::CreatedAt);
    q = match actor.role {
        Role::Promoteur => q.filter(lead::Column::PromoteurId.eq(actor.user_id)),
        Role::Client => q.filter(lead::Column::ClientId.eq(actor.user_id)),
        Role::Admin => q,
    };
    if let Some(status) = filter.status {
        q = q.filter(lead::Column::Status.eq(status.as_str()));
    }
    pagination::fetch(db, q, opts).await
}

/// Apply a status change; the first move out of `new` stamps the response time.
pub async fn apply_status<C: ConnectionTrait>(conn: &C, l: lead::Model, next: LeadStatus, notes: Option<String>) -> Result<lead::Model, ServiceError> {
    let current = l.status()?;
    current.transition(next)?;
    let id = l.id;
    let first_response = l.first_response_at.is_none() && current == LeadStatus::New;
    let mut am: lead::ActiveModel = l.into();
    let now = Utc::now().into();
    am.status = Set(next.as_str().into());
    if first_response {
        am.first_response_at = Set(Some(now));
    }
    if let Some(n) = notes {
        am.notes = Set(Some(n));
    }
    am.updated_at = Set(now);
    let updated = am.update(conn).await?;
    info!(lead_id = %id, status = %next, "lead_status_changed");
    Ok(updated)
}

pub async fn update_status(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: StatusUpdate) -> Result<lead::Model, ServiceError> {
    let l = find(db, id).await?;
    if l.promoteur_id != actor.user_id {
        return Err(ServiceError::forbidden("only the project's promoteur can update the pipeline"));
    }
    apply_status(db, l, input.status, input.notes).await
}

fn hours_between(from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> f64 {
    (to - from).num_seconds() as f64 / 3600.0
}

/// SLA figures over `leads` as of `now`.
pub fn summarize(leads: &[lead::Model], now: DateTime<FixedOffset>, sla_hours: i64) -> SlaStats {
    let sla = sla_hours as f64;
    let mut responded = 0u64;
    let mut breached = 0u64;
    let mut pending_breached = 0u64;
    let mut total_hours = 0.0;
    for l in leads {
        match l.first_response_at {
            Some(at) => {
                let h = hours_between(l.created_at, at);
                responded += 1;
                total_hours += h;
                if h > sla {
                    breached += 1;
                }
            }
            None => {
                if l.status == LeadStatus::New.as_str() && hours_between(l.created_at, now) > sla {
                    breached += 1;
                    pending_breached += 1;
                }
            }
        }
    }
    let avg_response_hours = (responded > 0).then(|| (total_hours / responded as f64 * 100.0).round() / 100.0);
    SlaStats { sla_hours, total: leads.len() as u64, responded, breached, pending_breached, avg_response_hours }
}

pub async fn sla_stats(db: &DatabaseConnection, actor: &Actor, sla_hours: i64) -> Result<SlaStats, ServiceError> {
    actor.require_role(Role::Promoteur)?;
    let leads = lead::Entity::find()
        .filter(lead::Column::PromoteurId.eq(actor.user_id))
        .all(db)
        .await?;
    Ok(summarize(&leads, Utc::now().into(), sla_hours))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::test_support::{get_db, seed_project, seed_user};

    fn lead_at(created_hours_ago: i64, responded_after: Option<i64>, now: DateTime<FixedOffset>) -> lead::Model {
        let created = now - Duration::hours(created_hours_ago);
        lead::Model {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            promoteur_id: Uuid::new_v4(),
            message: "Interested".into(),
            phone: None,
            status: if responded_after.is_some() { "contacted".into() } else { "new".into() },
            first_response_at: responded_after.map(|h| created + Duration::hours(h)),
            notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn sla_summary() {
        let now: DateTime<FixedOffset> = Utc::now().into();
        let leads = vec![
            lead_at(100, Some(2), now),
            lead_at(100, Some(30), now),
            lead_at(48, None, now),
            lead_at(1, None, now),
        ];
        let s = summarize(&leads, now, 24);
        assert_eq!(s.total, 4);
        assert_eq!(s.responded, 2);
        assert_eq!(s.breached, 2);
        assert_eq!(s.pending_breached, 1);
        assert_eq!(s.avg_response_hours, Some(16.0));
    }

    #[test]
    fn empty_summary() {
        let s = summarize(&[], Utc::now().into(), 24);
        assert_eq!(s.total, 0);
        assert_eq!(s.avg_response_hours, None);
    }

    #[tokio::test]
    async fn lead_pipeline() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let (_, stranger) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;

        let l = create(&db, &client, p.id, NewLead { message: "Is a 3-room unit available?".into(), phone: Some("+221771234567".into()) }).await?;
        assert_eq!(l.promoteur_id, owner.user_id);
        assert!(matches!(
            create(&db, &client, p.id, NewLead { message: "again".into(), phone: None }).await,
            Err(ServiceError::Conflict(_))
        ));

        assert!(matches!(get(&db, &stranger, l.id).await, Err(ServiceError::Forbidden(_))));
        assert!(get(&db, &owner, l.id).await.is_ok());

        assert!(matches!(
            update_status(&db, &client, l.id, StatusUpdate { status: LeadStatus::Contacted, notes: None }).await,
            Err(ServiceError::Forbidden(_))
        ));
        let contacted = update_status(&db, &owner, l.id, StatusUpdate { status: LeadStatus::Contacted, notes: Some("called".into()) }).await?;
        let stamped = contacted.first_response_at.expect("stamped");
        let qualified = update_status(&db, &owner, l.id, StatusUpdate { status: LeadStatus::Qualified, notes: None }).await?;
        assert_eq!(qualified.first_response_at, Some(stamped));
        assert_eq!(qualified.notes.as_deref(), Some("called"));
        assert!(update_status(&db, &owner, l.id, StatusUpdate { status: LeadStatus::New, notes: None }).await.is_err());

        let lost = update_status(&db, &owner, l.id, StatusUpdate { status: LeadStatus::Lost, notes: None }).await?;
        assert_eq!(lost.status, "lost");
        // once closed, the client may enquire again
        create(&db, &client, p.id, NewLead { message: "Back again".into(), phone: None }).await?;

        let mine = list(&db, &owner, LeadFilter::default(), Pagination::default()).await?;
        assert_eq!(mine.total, 2);
        let open = list(&db, &client, LeadFilter { status: Some(LeadStatus::New) }, Pagination::default()).await?;
        assert_eq!(open.total, 1);

        let stats = sla_stats(&db, &owner, 24).await?;
        assert_eq!(stats.total, 2);
        assert_eq!(stats.responded, 1);
        assert_eq!(stats.breached, 0);
        Ok(())
    }

    #[tokio::test]
    async fn leads_need_an_approved_project() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let draft = seed_project(&db, owner.user_id, ProjectStatus::Draft).await?;
        let approved = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        assert!(matches!(
            create(&db, &client, draft.id, NewLead { message: "hello".into(), phone: None }).await,
            Err(ServiceError::NotFound(_))
        ));
        assert!(matches!(
            create(&db, &owner, approved.id, NewLead { message: "hello".into(), phone: None }).await,
            Err(ServiceError::Forbidden(_))
        ));
        Ok(())
    }
}
