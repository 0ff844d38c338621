//! User-submitted content reports and their moderation.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::lifecycle::Lifecycle;
use models::report::{self, ReportStatus, ReportTarget};
use models::review;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::{projects, users};

#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub target_type: ReportTarget,
    pub target_id: Uuid,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportStatusUpdate {
    pub status: ReportStatus,
    pub note: Option<String>,
}

async fn ensure_target(db: &DatabaseConnection, target: ReportTarget, id: Uuid) -> Result<(), ServiceError> {
    match target {
        ReportTarget::Project => projects::find(db, id).await.map(|_| ()),
        ReportTarget::User => users::get_user(db, id).await.map(|_| ()),
        ReportTarget::Review => review::Entity::find_by_id(id)
            .one(db)
            .await?
            .map(|_| ())
            .ok_or_else(|| ServiceError::not_found("review")),
    }
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewReport) -> Result<report::Model, ServiceError> {
    report::validate_reason(&input.reason)?;
    ensure_target(db, input.target_type, input.target_id).await?;
    let open = report::Entity::find()
        .filter(report::Column::ReporterId.eq(actor.user_id))
        .filter(report::Column::TargetType.eq(input.target_type.as_str()))
        .filter(report::Column::TargetId.eq(input.target_id))
        .filter(report::Column::Status.is_in([ReportStatus::Open.as_str(), ReportStatus::Reviewing.as_str()]))
        .one(db)
        .await?;
    if open.is_some() {
        return Err(ServiceError::conflict("you already reported this"));
    }
    let now = Utc::now().into();
    let created = report::ActiveModel {
        id: Set(Uuid::new_v4()),
        reporter_id: Set(actor.user_id),
        target_type: Set(input.target_type.as_str().into()),
        target_id: Set(input.target_id),
        reason: Set(input.reason),
        status: Set(ReportStatus::Open.as_str().into()),
        resolution_note: Set(None),
        handled_by: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(report_id = %created.id, target = %input.target_type, target_id = %input.target_id, "report_created");
    Ok(created)
}

pub async fn list_mine(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<report::Model>, ServiceError> {
    let q = report::Entity::find()
        .filter(report::Column::ReporterId.eq(actor.user_id))
        .order_by_desc(report::Column::CreatedAt);
    pagination::fetch(db, q, opts).await
}

pub async fn list_admin(db: &DatabaseConnection, actor: &Actor, filter: ReportFilter, opts: Pagination) -> Result<Page<report::Model>, ServiceError> {
    actor.require_admin()?;
    let mut q = report::Entity::find().order_by_desc(report::Column::CreatedAt);
    if let Some(status) = filter.status {
        q = q.filter(report::Column::Status.eq(status.as_str()));
    }
    pagination::fetch(db, q, opts).await
}

pub async fn update_status(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: ReportStatusUpdate) -> Result<report::Model, ServiceError> {
    actor.require_admin()?;
    let r = report::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("report"))?;
    r.status()?.transition(input.status)?;
    let mut am: report::ActiveModel = r.into();
    am.status = Set(input.status.as_str().into());
    if input.note.is_some() {
        am.resolution_note = Set(input.note);
    }
    am.handled_by = Set(Some(actor.user_id));
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(report_id = %id, status = %input.status, "report_status_changed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::project::ProjectStatus;
    use models::user::Role;
    use crate::test_support::{get_db, seed_project, seed_user};

    #[tokio::test]
    async fn one_open_report_per_target() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let input = || NewReport { target_type: ReportTarget::Project, target_id: p.id, reason: "Fake photos".into() };

        let r = create(&db, &client, input()).await?;
        assert!(matches!(create(&db, &client, input()).await, Err(ServiceError::Conflict(_))));

        update_status(&db, &admin, r.id, ReportStatusUpdate { status: ReportStatus::Reviewing, note: None }).await?;
        let done = update_status(&db, &admin, r.id, ReportStatusUpdate { status: ReportStatus::Resolved, note: Some("removed".into()) }).await?;
        assert_eq!(done.handled_by, Some(admin.user_id));
        assert_eq!(done.resolution_note.as_deref(), Some("removed"));

        // closed reports no longer block
        create(&db, &client, input()).await?;
        assert_eq!(list_mine(&db, &client, Pagination::default()).await?.total, 2);
        let open = list_admin(&db, &admin, ReportFilter { status: Some(ReportStatus::Open) }, Pagination::default()).await?;
        assert_eq!(open.total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn target_must_exist_and_transitions_checked() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let (u, admin) = seed_user(&db, Role::Admin).await?;
        let missing = NewReport { target_type: ReportTarget::Review, target_id: Uuid::new_v4(), reason: "spam".into() };
        assert!(matches!(create(&db, &client, missing).await, Err(ServiceError::NotFound(_))));

        let r = create(&db, &client, NewReport { target_type: ReportTarget::User, target_id: u.id, reason: "rude".into() }).await?;
        let bad = update_status(&db, &admin, r.id, ReportStatusUpdate { status: ReportStatus::Resolved, note: None }).await;
        assert!(matches!(bad, Err(ServiceError::Model(_))));
        assert!(matches!(
            update_status(&db, &client, r.id, ReportStatusUpdate { status: ReportStatus::Dismissed, note: None }).await,
            Err(ServiceError::Forbidden(_))
        ));
        update_status(&db, &admin, r.id, ReportStatusUpdate { status: ReportStatus::Dismissed, note: None }).await?;
        Ok(())
    }
}
