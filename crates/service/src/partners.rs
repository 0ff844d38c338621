//! Partner directory (banks, notaries, insurers, architects).

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use models::partner::{self, PartnerCategory};

use crate::actor::Actor;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPartner {
    pub name: String,
    pub category: PartnerCategory,
    pub website: Option<String>,
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerUpdate {
    pub name: Option<String>,
    pub category: Option<PartnerCategory>,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartnerQuery {
    pub category: Option<PartnerCategory>,
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewPartner) -> Result<partner::Model, ServiceError> {
    actor.require_admin()?;
    partner::validate_fields(Some(&input.name), input.website.as_deref(), input.contact_email.as_deref())?;
    let now = Utc::now().into();
    let created = partner::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name),
        category: Set(input.category.as_str().into()),
        website: Set(input.website),
        contact_email: Set(input.contact_email),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(partner_id = %created.id, category = %input.category, "partner_created");
    Ok(created)
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<partner::Model, ServiceError> {
    partner::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("partner"))
}

pub async fn update(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: PartnerUpdate) -> Result<partner::Model, ServiceError> {
    actor.require_admin()?;
    partner::validate_fields(input.name.as_deref(), input.website.as_deref(), input.contact_email.as_deref())?;
    let mut am: partner::ActiveModel = find(db, id).await?.into();
    if let Some(v) = input.name { am.name = Set(v); }
    if let Some(v) = input.category { am.category = Set(v.as_str().into()); }
    if let Some(v) = input.website { am.website = Set(Some(v)); }
    if let Some(v) = input.contact_email { am.contact_email = Set(Some(v)); }
    if let Some(v) = input.active { am.active = Set(v); }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    actor.require_admin()?;
    let res = partner::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("partner"));
    }
    Ok(())
}

/// Active partners, optionally narrowed to one category.
pub async fn list_active(db: &DatabaseConnection, query: PartnerQuery) -> Result<Vec<partner::Model>, ServiceError> {
    let mut q = partner::Entity::find()
        .filter(partner::Column::Active.eq(true))
        .order_by_asc(partner::Column::Name);
    if let Some(c) = query.category {
        q = q.filter(partner::Column::Category.eq(c.as_str()));
    }
    Ok(q.all(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::user::Role;
    use crate::test_support::{get_db, seed_user};

    fn bank(name: &str) -> NewPartner {
        NewPartner {
            name: name.into(),
            category: PartnerCategory::Bank,
            website: Some("https://bank.example.com".into()),
            contact_email: Some("loans@bank.example.com".into()),
        }
    }

    #[tokio::test]
    async fn directory_lists_active_by_category() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let b = create(&db, &admin, bank("Banque Atlantique")).await?;
        create(&db, &admin, bank("Ecobank")).await?;
        let notary = NewPartner { name: "Etude Diop".into(), category: PartnerCategory::Notary, website: None, contact_email: None };
        create(&db, &admin, notary).await?;

        assert_eq!(list_active(&db, PartnerQuery::default()).await?.len(), 3);
        let banks = list_active(&db, PartnerQuery { category: Some(PartnerCategory::Bank) }).await?;
        assert_eq!(banks.iter().map(|p| p.name.as_str()).collect::<Vec<_>>(), vec!["Banque Atlantique", "Ecobank"]);

        update(&db, &admin, b.id, PartnerUpdate { active: Some(false), ..Default::default() }).await?;
        assert_eq!(list_active(&db, PartnerQuery { category: Some(PartnerCategory::Bank) }).await?.len(), 1);

        assert!(matches!(create(&db, &client, bank("X")).await, Err(ServiceError::Forbidden(_))));
        delete(&db, &admin, b.id).await?;
        assert!(matches!(delete(&db, &admin, b.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn rejects_bad_links() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let mut p = bank("Bad");
        p.website = Some("ftp://bank".into());
        assert!(create(&db, &admin, p).await.is_err());
        let mut p = bank("Bad");
        p.contact_email = Some("nobody".into());
        assert!(create(&db, &admin, p).await.is_err());
        Ok(())
    }
}
