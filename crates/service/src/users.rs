//! Profile self-service and admin moderation of accounts.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::lifecycle::Lifecycle;
use models::user::{self, Role, UserStatus};
use models::validate;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};

/// Fields a user may change on their own profile.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

pub async fn get_user(db: &DatabaseConnection, id: Uuid) -> Result<user::Model, ServiceError> {
    user::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("user"))
}

pub async fn me(db: &DatabaseConnection, actor: &Actor) -> Result<user::Model, ServiceError> {
    get_user(db, actor.user_id).await
}

pub async fn update_profile(db: &DatabaseConnection, actor: &Actor, input: ProfileUpdate) -> Result<user::Model, ServiceError> {
    let mut am: user::ActiveModel = get_user(db, actor.user_id).await?.into();
    if let Some(name) = input.name {
        user::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(phone) = input.phone {
        // empty string clears the number
        if phone.trim().is_empty() {
            am.phone = Set(None);
        } else {
            validate::phone(&phone)?;
            am.phone = Set(Some(phone));
        }
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn list_users(db: &DatabaseConnection, actor: &Actor, filter: UserFilter, opts: Pagination) -> Result<Page<user::Model>, ServiceError> {
    actor.require_admin()?;
    let mut q = user::Entity::find().order_by_desc(user::Column::CreatedAt);
    if let Some(role) = filter.role {
        q = q.filter(user::Column::Role.eq(role.as_str()));
    }
    if let Some(status) = filter.status {
        q = q.filter(user::Column::Status.eq(status.as_str()));
    }
    pagination::fetch(db, q, opts).await
}

async fn set_status(db: &DatabaseConnection, id: Uuid, next: UserStatus) -> Result<user::Model, ServiceError> {
    let found = get_user(db, id).await?;
    found.status()?.transition(next)?;
    let mut am: user::ActiveModel = found.into();
    am.status = Set(next.as_str().into());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(user_id = %id, status = %next, "user_status_changed");
    Ok(updated)
}

pub async fn suspend(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<user::Model, ServiceError> {
    actor.require_admin()?;
    if actor.user_id == id {
        return Err(ServiceError::validation("cannot suspend yourself"));
    }
    set_status(db, id, UserStatus::Suspended).await
}

pub async fn reactivate(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<user::Model, ServiceError> {
    actor.require_admin()?;
    set_status(db, id, UserStatus::Active).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_user};

    #[tokio::test]
    async fn profile_update_is_partial() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (u, actor) = seed_user(&db, Role::Client).await?;
        let updated = update_profile(&db, &actor, ProfileUpdate { name: Some("New Name".into()), phone: None }).await?;
        assert_eq!(updated.name, "New Name");
        assert_eq!(updated.phone, u.phone);

        let err = update_profile(&db, &actor, ProfileUpdate { name: None, phone: Some("123".into()) }).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        Ok(())
    }

    #[tokio::test]
    async fn suspend_and_reactivate() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (p, promoteur) = seed_user(&db, Role::Promoteur).await?;

        assert!(matches!(suspend(&db, &promoteur, p.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(suspend(&db, &admin, admin.user_id).await, Err(ServiceError::Validation(_))));

        let s = suspend(&db, &admin, p.id).await?;
        assert_eq!(s.status, "suspended");
        let r = reactivate(&db, &admin, p.id).await?;
        assert_eq!(r.status, "active");

        let page = list_users(&db, &admin, UserFilter { role: Some(Role::Promoteur), status: None }, Pagination::default()).await?;
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].id, p.id);
        Ok(())
    }

    #[tokio::test]
    async fn deleted_users_stay_deleted() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (c, _) = seed_user(&db, Role::Client).await?;
        set_status(&db, c.id, UserStatus::Deleted).await?;
        assert!(matches!(reactivate(&db, &admin, c.id).await, Err(ServiceError::Model(_))));
        Ok(())
    }
}
