//! Security incident register, admin only.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use common::types::Page;
use models::lifecycle::Lifecycle;
use models::security_incident::{self, IncidentStatus, Severity};
use models::validate;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::users;

#[derive(Debug, Clone, Deserialize)]
pub struct NewIncident {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub affected_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncidentFilter {
    pub status: Option<IncidentStatus>,
    pub severity: Option<Severity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncidentStatusUpdate {
    pub status: IncidentStatus,
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewIncident) -> Result<security_incident::Model, ServiceError> {
    actor.require_admin()?;
    security_incident::validate_title(&input.title)?;
    validate::required("description", &input.description, 10_000)?;
    if let Some(uid) = input.affected_user_id {
        users::get_user(db, uid).await?;
    }
    let now = Utc::now().into();
    let created = security_incident::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(input.title),
        description: Set(input.description),
        severity: Set(input.severity.as_str().into()),
        status: Set(IncidentStatus::Open.as_str().into()),
        affected_user_id: Set(input.affected_user_id),
        reported_by: Set(actor.user_id),
        resolved_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    warn!(incident_id = %created.id, severity = %input.severity, "security_incident_opened");
    Ok(created)
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<security_incident::Model, ServiceError> {
    actor.require_admin()?;
    security_incident::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("incident"))
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, filter: IncidentFilter, opts: Pagination) -> Result<Page<security_incident::Model>, ServiceError> {
    actor.require_admin()?;
    let mut q = security_incident::Entity::find().order_by_desc(security_incident::Column::CreatedAt);
    if let Some(status) = filter.status {
        q = q.filter(security_incident::Column::Status.eq(status.as_str()));
    }
    if let Some(severity) = filter.severity {
        q = q.filter(security_incident::Column::Severity.eq(severity.as_str()));
    }
    pagination::fetch(db, q, opts).await
}

pub async fn update_status(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: IncidentStatusUpdate) -> Result<security_incident::Model, ServiceError> {
    let inc = get(db, actor, id).await?;
    inc.status()?.transition(input.status)?;
    let now = Utc::now().into();
    let mut am: security_incident::ActiveModel = inc.into();
    am.status = Set(input.status.as_str().into());
    if input.status == IncidentStatus::Resolved {
        am.resolved_at = Set(Some(now));
    }
    am.updated_at = Set(now);
    let updated = am.update(db).await?;
    info!(incident_id = %id, status = %input.status, "security_incident_status_changed");
    Ok(updated)
}
