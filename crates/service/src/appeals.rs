//! Appeals against project rejections, with bounded escalation.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::appeal::{self, AppealStatus};
use models::lifecycle::Lifecycle;
use models::project::ProjectStatus;
use models::user::Role;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::projects;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppeal {
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppealFilter {
    pub status: Option<AppealStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppealDecision {
    pub accept: bool,
    pub note: String,
}

const OPEN: [AppealStatus; 2] = [AppealStatus::Pending, AppealStatus::UnderReview];

pub async fn create(db: &DatabaseConnection, actor: &Actor, project_id: Uuid, input: NewAppeal) -> Result<appeal::Model, ServiceError> {
    appeal::validate_reason(&input.reason)?;
    let p = projects::find(db, project_id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    if p.status()? != ProjectStatus::Rejected {
        return Err(ServiceError::validation("only rejected projects can be appealed"));
    }
    let open = appeal::Entity::find()
        .filter(appeal::Column::ProjectId.eq(p.id))
        .filter(appeal::Column::Status.is_in(OPEN.map(|s| s.as_str())))
        .one(db)
        .await?;
    if open.is_some() {
        return Err(ServiceError::conflict("an appeal is already open for this project"));
    }
    let now = Utc::now().into();
    let am = appeal::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        promoteur_id: Set(actor.user_id),
        reason: Set(input.reason),
        status: Set(AppealStatus::Pending.as_str().into()),
        escalation_level: Set(0),
        escalated_at: Set(None),
        decision_note: Set(None),
        decided_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    info!(appeal_id = %created.id, project_id = %p.id, "appeal_created");
    Ok(created)
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<appeal::Model, ServiceError> {
    appeal::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("appeal"))
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<appeal::Model, ServiceError> {
    let a = find(db, id).await?;
    actor.require_owner_or_admin(a.promoteur_id)?;
    Ok(a)
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, filter: AppealFilter, opts: Pagination) -> Result<Page<appeal::Model>, ServiceError> {
    let mut q = appeal::Entity::find().order_by_desc(appeal::Column::CreatedAt);
    match actor.role {
        Role::Admin => {}
        Role::Promoteur => q = q.filter(appeal::Column::PromoteurId.eq(actor.user_id)),
        Role::Client => return Err(ServiceError::forbidden("clients have no appeals")),
    }
    if let Some(status) = filter.status {
        q = q.filter(appeal::Column::Status.eq(status.as_str()));
    }
    pagination::fetch(db, q, opts).await
}

/// Raise the escalation level of an open appeal, up to `max_level`.
pub async fn escalate(db: &DatabaseConnection, actor: &Actor, id: Uuid, max_level: i32) -> Result<appeal::Model, ServiceError> {
    let a = find(db, id).await?;
    if a.promoteur_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    if a.status()?.is_terminal() {
        return Err(ServiceError::validation("appeal is already decided"));
    }
    if a.escalation_level >= max_level {
        return Err(ServiceError::validation(format!("escalation limit reached ({max_level})")));
    }
    let level = a.escalation_level + 1;
    let mut am: appeal::ActiveModel = a.into();
    let now = Utc::now().into();
    am.escalation_level = Set(level);
    am.escalated_at = Set(Some(now));
    am.updated_at = Set(now);
    let updated = am.update(db).await?;
    info!(appeal_id = %id, level, "appeal_escalated");
    Ok(updated)
}

pub async fn start_review(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<appeal::Model, ServiceError> {
    actor.require_admin()?;
    let a = find(db, id).await?;
    a.status()?.transition(AppealStatus::UnderReview)?;
    let mut am: appeal::ActiveModel = a.into();
    am.status = Set(AppealStatus::UnderReview.as_str().into());
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Decide an appeal under review. Accepting sends the project back to moderation.
pub async fn decide(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: AppealDecision) -> Result<appeal::Model, ServiceError> {
    actor.require_admin()?;
    if input.note.trim().is_empty() {
        return Err(ServiceError::validation("note required"));
    }
    let a = find(db, id).await?;
    let next = if input.accept { AppealStatus::Accepted } else { AppealStatus::Rejected };
    a.status()?.transition(next)?;
    let project_id = a.project_id;

    let txn = db.begin().await?;
    if input.accept {
        let p = projects::find(&txn, project_id).await?;
        // the owner may already have resubmitted while the appeal was open
        if p.status()? != ProjectStatus::Submitted {
            projects::transition(&txn, p, ProjectStatus::Submitted, None).await?;
        }
    }
    let mut am: appeal::ActiveModel = a.into();
    am.status = Set(next.as_str().into());
    am.decision_note = Set(Some(input.note));
    am.decided_by = Set(Some(actor.user_id));
    am.updated_at = Set(Utc::now().into());
    let decided = am.update(&txn).await?;
    txn.commit().await?;
    info!(appeal_id = %id, status = %next, "appeal_decided");
    Ok(decided)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_project, seed_user};

    fn reason() -> NewAppeal {
        NewAppeal { reason: "Photos were updated with the final renders.".into() }
    }

    #[tokio::test]
    async fn accepted_appeal_resubmits_project() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Rejected).await?;

        let a = create(&db, &owner, p.id, reason()).await?;
        assert!(matches!(create(&db, &owner, p.id, reason()).await, Err(ServiceError::Conflict(_))));

        let decision = AppealDecision { accept: true, note: "ok".into() };
        // must be under review first
        assert!(decide(&db, &admin, a.id, decision.clone()).await.is_err());
        start_review(&db, &admin, a.id).await?;
        let decided = decide(&db, &admin, a.id, decision).await?;
        assert_eq!(decided.status, "accepted");
        assert_eq!(decided.decided_by, Some(admin.user_id));
        assert_eq!(projects::find(&db, p.id).await?.status, "submitted");
        Ok(())
    }

    #[tokio::test]
    async fn accepting_after_owner_resubmitted_keeps_project_submitted() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Rejected).await?;
        let a = create(&db, &owner, p.id, reason()).await?;
        projects::submit(&db, &owner, p.id).await?;

        start_review(&db, &admin, a.id).await?;
        let decided = decide(&db, &admin, a.id, AppealDecision { accept: true, note: "fine".into() }).await?;
        assert_eq!(decided.status, "accepted");
        assert_eq!(projects::find(&db, p.id).await?.status, "submitted");
        Ok(())
    }

    #[tokio::test]
    async fn rejected_appeal_leaves_project_rejected() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Rejected).await?;
        let a = create(&db, &owner, p.id, reason()).await?;
        start_review(&db, &admin, a.id).await?;
        decide(&db, &admin, a.id, AppealDecision { accept: false, note: "still incomplete".into() }).await?;
        assert_eq!(projects::find(&db, p.id).await?.status, "rejected");
        // a decided appeal frees the slot for a new one
        create(&db, &owner, p.id, reason()).await?;
        Ok(())
    }

    #[tokio::test]
    async fn escalation_is_bounded() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Rejected).await?;
        let a = create(&db, &owner, p.id, reason()).await?;
        assert_eq!(escalate(&db, &owner, a.id, 2).await?.escalation_level, 1);
        assert_eq!(escalate(&db, &owner, a.id, 2).await?.escalation_level, 2);
        assert!(matches!(escalate(&db, &owner, a.id, 2).await, Err(ServiceError::Validation(_))));
        Ok(())
    }

    #[tokio::test]
    async fn only_rejected_projects_and_owners() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, other) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let approved = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let rejected = seed_project(&db, owner.user_id, ProjectStatus::Rejected).await?;
        assert!(matches!(create(&db, &owner, approved.id, reason()).await, Err(ServiceError::Validation(_))));
        assert!(matches!(create(&db, &other, rejected.id, reason()).await, Err(ServiceError::Forbidden(_))));
        let a = create(&db, &owner, rejected.id, reason()).await?;
        assert!(matches!(get(&db, &other, a.id).await, Err(ServiceError::Forbidden(_))));
        assert_eq!(list(&db, &owner, AppealFilter::default(), Pagination::default()).await?.total, 1);
        assert_eq!(list(&db, &other, AppealFilter::default(), Pagination::default()).await?.total, 0);
        assert!(list(&db, &client, AppealFilter::default(), Pagination::default()).await.is_err());
        Ok(())
    }
}
