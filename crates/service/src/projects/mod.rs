//! Project listings: creation, moderation workflow, photos.

pub mod geo;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::lifecycle::Lifecycle;
use models::project::{self, ProjectStatus};
use models::project_photo;
use models::user::Role;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};

#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
    pub title: String,
    pub description: String,
    pub city: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_min_cents: Option<i64>,
    pub price_max_cents: Option<i64>,
    #[serde(default)]
    pub units_total: i32,
    pub delivery_date: Option<String>,
}

/// Absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_min_cents: Option<i64>,
    pub price_max_cents: Option<i64>,
    pub units_total: Option<i32>,
    pub delivery_date: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Moderation {
    pub decision: Decision,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectQuery {
    pub city: Option<String>,
    pub status: Option<ProjectStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPhoto {
    pub url: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

fn validate_new(input: &NewProject) -> Result<(), ServiceError> {
    project::validate_title(&input.title)?;
    project::validate_city(&input.city)?;
    project::validate_coordinates(input.latitude, input.longitude)?;
    project::validate_price_range(input.price_min_cents, input.price_max_cents)?;
    project::validate_units(input.units_total)?;
    project::validate_delivery_date(input.delivery_date.as_deref())?;
    Ok(())
}

pub async fn find<C: ConnectionTrait>(conn: &C, id: Uuid) -> Result<project::Model, ServiceError> {
    project::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("project"))
}

/// Load a project the caller owns (or any project, for admins).
pub async fn find_owned(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<project::Model, ServiceError> {
    let p = find(db, id).await?;
    actor.require_owner_or_admin(p.owner_id)?;
    Ok(p)
}

/// Approved projects are public; anything else is visible to its owner and admins only.
pub async fn find_visible(db: &DatabaseConnection, actor: Option<&Actor>, id: Uuid) -> Result<project::Model, ServiceError> {
    let p = find(db, id).await?;
    if p.status()? == ProjectStatus::Approved {
        return Ok(p);
    }
    match actor {
        Some(a) if a.is_admin() || a.user_id == p.owner_id => Ok(p),
        _ => Err(ServiceError::not_found("project")),
    }
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewProject) -> Result<project::Model, ServiceError> {
    actor.require_role(Role::Promoteur)?;
    validate_new(&input)?;
    let now = Utc::now().into();
    let am = project::ActiveModel {
        id: Set(Uuid::new_v4()),
        owner_id: Set(actor.user_id),
        title: Set(input.title.trim().to_string()),
        description: Set(input.description),
        city: Set(input.city.trim().to_string()),
        address: Set(input.address),
        latitude: Set(input.latitude),
        longitude: Set(input.longitude),
        price_min_cents: Set(input.price_min_cents),
        price_max_cents: Set(input.price_max_cents),
        units_total: Set(input.units_total),
        delivery_date: Set(input.delivery_date),
        status: Set(ProjectStatus::Draft.as_str().into()),
        rejection_reason: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    info!(project_id = %created.id, owner_id = %actor.user_id, "project_created");
    Ok(created)
}

pub async fn get(db: &DatabaseConnection, actor: Option<&Actor>, id: Uuid) -> Result<project::Model, ServiceError> {
    find_visible(db, actor, id).await
}

pub async fn list_public(db: &DatabaseConnection, query: ProjectQuery, opts: Pagination) -> Result<Page<project::Model>, ServiceError> {
    let mut q = project::Entity::find()
        .filter(project::Column::Status.eq(ProjectStatus::Approved.as_str()))
        .order_by_desc(project::Column::CreatedAt);
    if let Some(city) = query.city.filter(|c| !c.trim().is_empty()) {
        q = q.filter(project::Column::City.eq(city.trim()));
    }
    pagination::fetch(db, q, opts).await
}

pub async fn list_mine(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<project::Model>, ServiceError> {
    actor.require_role(Role::Promoteur)?;
    let q = project::Entity::find()
        .filter(project::Column::OwnerId.eq(actor.user_id))
        .order_by_desc(project::Column::CreatedAt);
    pagination::fetch(db, q, opts).await
}

pub async fn list_admin(db: &DatabaseConnection, actor: &Actor, query: ProjectQuery, opts: Pagination) -> Result<Page<project::Model>, ServiceError> {
    actor.require_admin()?;
    let mut q = project::Entity::find().order_by_desc(project::Column::CreatedAt);
    if let Some(status) = query.status {
        q = q.filter(project::Column::Status.eq(status.as_str()));
    }
    if let Some(city) = query.city {
        q = q.filter(project::Column::City.eq(city));
    }
    pagination::fetch(db, q, opts).await
}

pub async fn update(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: ProjectUpdate) -> Result<project::Model, ServiceError> {
    let p = find(db, id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    if !p.status()?.is_editable() {
        return Err(ServiceError::validation(format!("project cannot be edited while {}", p.status)));
    }

    let latitude = input.latitude.or(p.latitude);
    let longitude = input.longitude.or(p.longitude);
    let price_min = input.price_min_cents.or(p.price_min_cents);
    let price_max = input.price_max_cents.or(p.price_max_cents);
    project::validate_coordinates(latitude, longitude)?;
    project::validate_price_range(price_min, price_max)?;

    let mut am: project::ActiveModel = p.into();
    if let Some(title) = input.title {
        project::validate_title(&title)?;
        am.title = Set(title.trim().to_string());
    }
    if let Some(description) = input.description { am.description = Set(description); }
    if let Some(city) = input.city {
        project::validate_city(&city)?;
        am.city = Set(city.trim().to_string());
    }
    if let Some(address) = input.address { am.address = Set(Some(address)); }
    if let Some(units) = input.units_total {
        project::validate_units(units)?;
        am.units_total = Set(units);
    }
    if let Some(date) = input.delivery_date {
        project::validate_delivery_date(Some(&date))?;
        am.delivery_date = Set(Some(date));
    }
    am.latitude = Set(latitude);
    am.longitude = Set(longitude);
    am.price_min_cents = Set(price_min);
    am.price_max_cents = Set(price_max);
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

/// Move a project to `next`, checking the transition.
pub async fn transition<C: ConnectionTrait>(
    conn: &C,
    p: project::Model,
    next: ProjectStatus,
    rejection_reason: Option<String>,
) -> Result<project::Model, ServiceError> {
    let id = p.id;
    p.status()?.transition(next)?;
    let mut am: project::ActiveModel = p.into();
    am.status = Set(next.as_str().into());
    am.rejection_reason = Set(rejection_reason);
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(conn).await?;
    info!(project_id = %id, status = %next, "project_status_changed");
    Ok(updated)
}

pub async fn submit(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<project::Model, ServiceError> {
    let p = find(db, id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    transition(db, p, ProjectStatus::Submitted, None).await
}

pub async fn moderate(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: Moderation) -> Result<project::Model, ServiceError> {
    actor.require_admin()?;
    let p = find(db, id).await?;
    match input.decision {
        Decision::Approve => transition(db, p, ProjectStatus::Approved, None).await,
        Decision::Reject => {
            let reason = input
                .reason
                .map(|r| r.trim().to_string())
                .filter(|r| !r.is_empty())
                .ok_or_else(|| ServiceError::validation("reason required when rejecting"))?;
            transition(db, p, ProjectStatus::Rejected, Some(reason)).await
        }
    }
}

pub async fn archive(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<project::Model, ServiceError> {
    let p = find_owned(db, actor, id).await?;
    let reason = p.rejection_reason.clone();
    transition(db, p, ProjectStatus::Archived, reason).await
}

pub async fn delete(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    let p = find(db, id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    if p.status()? != ProjectStatus::Draft {
        return Err(ServiceError::validation("only draft projects can be deleted"));
    }
    p.delete(db).await?;
    info!(project_id = %id, "project_deleted");
    Ok(())
}

pub async fn add_photo(
    db: &DatabaseConnection,
    actor: &Actor,
    id: Uuid,
    input: NewPhoto,
    max_distance_km: f64,
) -> Result<project_photo::Model, ServiceError> {
    let p = find(db, id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    project_photo::validate_url(&input.url)?;
    project::validate_coordinates(input.latitude, input.longitude)?;

    let photo_coords = input.latitude.zip(input.longitude);
    let distance_km = match (p.coordinates(), photo_coords) {
        (Some(site), Some(shot)) => Some(geo::haversine_km(site, shot)),
        _ => None,
    };
    let geo_verified = distance_km.is_some_and(|d| d <= max_distance_km);

    let am = project_photo::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        url: Set(input.url),
        latitude: Set(input.latitude),
        longitude: Set(input.longitude),
        geo_verified: Set(geo_verified),
        distance_km: Set(distance_km),
        created_at: Set(Utc::now().into()),
    };
    let photo = am.insert(db).await?;
    info!(project_id = %p.id, photo_id = %photo.id, geo_verified, "project_photo_added");
    Ok(photo)
}

/// Ids of every project owned by `owner_id`.
pub async fn ids_owned_by<C: ConnectionTrait>(conn: &C, owner_id: Uuid) -> Result<Vec<Uuid>, ServiceError> {
    let owned = project::Entity::find()
        .filter(project::Column::OwnerId.eq(owner_id))
        .all(conn)
        .await?;
    Ok(owned.into_iter().map(|p| p.id).collect())
}

pub async fn photos_of<C: ConnectionTrait>(conn: &C, project_id: Uuid) -> Result<Vec<project_photo::Model>, ServiceError> {
    Ok(project_photo::Entity::find()
        .filter(project_photo::Column::ProjectId.eq(project_id))
        .order_by_asc(project_photo::Column::CreatedAt)
        .all(conn)
        .await?)
}

pub async fn list_photos(db: &DatabaseConnection, actor: Option<&Actor>, id: Uuid) -> Result<Vec<project_photo::Model>, ServiceError> {
    let p = find_visible(db, actor, id).await?;
    photos_of(db, p.id).await
}
