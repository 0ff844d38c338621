//! Badge catalogue and awards to promoteurs.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::user::Role;
use models::{badge, user_badge};

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::users;

#[derive(Debug, Clone, Deserialize)]
pub struct NewBadge {
    pub code: String,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BadgeUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Award {
    pub badge_id: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AwardedBadge {
    pub badge: badge::Model,
    pub awarded_at: chrono::DateTime<chrono::FixedOffset>,
    pub note: Option<String>,
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewBadge) -> Result<badge::Model, ServiceError> {
    actor.require_admin()?;
    badge::validate_code(&input.code)?;
    badge::validate_name(&input.name)?;
    let now = Utc::now().into();
    let am = badge::ActiveModel {
        id: Set(Uuid::new_v4()),
        code: Set(input.code),
        name: Set(input.name.trim().to_string()),
        description: Set(input.description),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    };
    let created = am.insert(db).await?;
    info!(badge_id = %created.id, code = %created.code, "badge_created");
    Ok(created)
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<badge::Model, ServiceError> {
    badge::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("badge"))
}

pub async fn update(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: BadgeUpdate) -> Result<badge::Model, ServiceError> {
    actor.require_admin()?;
    let mut am: badge::ActiveModel = find(db, id).await?.into();
    if let Some(name) = input.name {
        badge::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = input.description { am.description = Set(Some(description)); }
    if let Some(active) = input.active { am.active = Set(active); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn list_active(db: &DatabaseConnection) -> Result<Vec<badge::Model>, ServiceError> {
    Ok(badge::Entity::find()
        .filter(badge::Column::Active.eq(true))
        .order_by_asc(badge::Column::Code)
        .all(db)
        .await?)
}

pub async fn award(db: &DatabaseConnection, actor: &Actor, user_id: Uuid, input: Award) -> Result<user_badge::Model, ServiceError> {
    actor.require_admin()?;
    let target = users::get_user(db, user_id).await?;
    if target.role()? != Role::Promoteur {
        return Err(ServiceError::validation("badges are awarded to promoteurs only"));
    }
    let b = find(db, input.badge_id).await?;
    if !b.active {
        return Err(ServiceError::validation("badge is inactive"));
    }
    let existing = user_badge::Entity::find()
        .filter(user_badge::Column::UserId.eq(user_id))
        .filter(user_badge::Column::BadgeId.eq(b.id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::conflict("badge already awarded"));
    }
    let am = user_badge::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        badge_id: Set(b.id),
        awarded_by: Set(actor.user_id),
        note: Set(input.note),
        created_at: Set(Utc::now().into()),
    };
    let awarded = am.insert(db).await?;
    info!(user_id = %user_id, badge = %b.code, "badge_awarded");
    Ok(awarded)
}

pub async fn revoke(db: &DatabaseConnection, actor: &Actor, user_id: Uuid, badge_id: Uuid) -> Result<(), ServiceError> {
    actor.require_admin()?;
    let res = user_badge::Entity::delete_many()
        .filter(user_badge::Column::UserId.eq(user_id))
        .filter(user_badge::Column::BadgeId.eq(badge_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("user badge"));
    }
    info!(user_id = %user_id, badge_id = %badge_id, "badge_revoked");
    Ok(())
}

pub async fn list_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<AwardedBadge>, ServiceError> {
    let rows = user_badge::Entity::find()
        .filter(user_badge::Column::UserId.eq(user_id))
        .order_by_asc(user_badge::Column::CreatedAt)
        .find_also_related(badge::Entity)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(ub, b)| b.map(|badge| AwardedBadge { badge, awarded_at: ub.created_at, note: ub.note }))
        .collect())
}

pub async fn count_for_user(db: &DatabaseConnection, user_id: Uuid) -> Result<u64, ServiceError> {
    Ok(user_badge::Entity::find()
        .filter(user_badge::Column::UserId.eq(user_id))
        .count(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_user};

    #[tokio::test]
    async fn award_and_revoke() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (p, promoteur) = seed_user(&db, Role::Promoteur).await?;
        let (c, _) = seed_user(&db, Role::Client).await?;

        assert!(matches!(
            create(&db, &promoteur, NewBadge { code: "x".into(), name: "X".into(), description: None }).await,
            Err(ServiceError::Forbidden(_))
        ));
        let b = create(&db, &admin, NewBadge { code: "verified".into(), name: "Verified".into(), description: None }).await?;
        assert!(matches!(
            create(&db, &admin, NewBadge { code: "verified".into(), name: "Dup".into(), description: None }).await,
            Err(ServiceError::Conflict(_))
        ));

        award(&db, &admin, p.id, Award { badge_id: b.id, note: Some("KYC done".into()) }).await?;
        assert!(matches!(award(&db, &admin, p.id, Award { badge_id: b.id, note: None }).await, Err(ServiceError::Conflict(_))));
        assert!(matches!(award(&db, &admin, c.id, Award { badge_id: b.id, note: None }).await, Err(ServiceError::Validation(_))));

        let listed = list_for_user(&db, p.id).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].badge.code, "verified");
        assert_eq!(count_for_user(&db, p.id).await?, 1);

        revoke(&db, &admin, p.id, b.id).await?;
        assert!(matches!(revoke(&db, &admin, p.id, b.id).await, Err(ServiceError::NotFound(_))));
        assert_eq!(count_for_user(&db, p.id).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn inactive_badges_are_hidden() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let b = create(&db, &admin, NewBadge { code: "top_seller".into(), name: "Top seller".into(), description: None }).await?;
        assert_eq!(list_active(&db).await?.len(), 1);
        update(&db, &admin, b.id, BadgeUpdate { active: Some(false), ..Default::default() }).await?;
        assert!(list_active(&db).await?.is_empty());
        Ok(())
    }
}
