//! Sale contracts drawn from qualified leads.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::contract::{self, ContractStatus};
use models::lead::LeadStatus;
use models::lifecycle::Lifecycle;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::leads;
use crate::pagination::{self, Pagination};

#[derive(Debug, Clone, Deserialize)]
pub struct NewContract {
    pub amount_cents: i64,
    pub terms: String,
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, lead_id: Uuid, input: NewContract) -> Result<contract::Model, ServiceError> {
    contract::validate_terms(input.amount_cents, &input.terms)?;
    let l = leads::find(db, lead_id).await?;
    if l.promoteur_id != actor.user_id {
        return Err(ServiceError::forbidden("only the project's promoteur can draft a contract"));
    }
    if !matches!(l.status()?, LeadStatus::Qualified | LeadStatus::Won) {
        return Err(ServiceError::validation("lead must be qualified or won"));
    }
    let now = Utc::now().into();
    let created = contract::ActiveModel {
        id: Set(Uuid::new_v4()),
        lead_id: Set(l.id),
        project_id: Set(l.project_id),
        promoteur_id: Set(l.promoteur_id),
        client_id: Set(l.client_id),
        amount_cents: Set(input.amount_cents),
        terms: Set(input.terms),
        status: Set(ContractStatus::Draft.as_str().into()),
        sent_at: Set(None),
        signed_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(contract_id = %created.id, lead_id = %l.id, amount_cents = created.amount_cents, "contract_drafted");
    Ok(created)
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<contract::Model, ServiceError> {
    contract::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("contract"))
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<contract::Model, ServiceError> {
    let c = find(db, id).await?;
    if !c.is_party(actor.user_id) && !actor.is_admin() {
        return Err(ServiceError::forbidden("not a party to this contract"));
    }
    Ok(c)
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<contract::Model>, ServiceError> {
    let q = contract::Entity::find()
        .filter(
            Condition::any()
                .add(contract::Column::ClientId.eq(actor.user_id))
                .add(contract::Column::PromoteurId.eq(actor.user_id)),
        )
        .order_by_desc(contract::Column::CreatedAt);
    pagination::fetch(db, q, opts).await
}

pub async fn send(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<contract::Model, ServiceError> {
    let c = find(db, id).await?;
    if c.promoteur_id != actor.user_id {
        return Err(ServiceError::forbidden("only the promoteur can send the contract"));
    }
    c.status()?.transition(ContractStatus::Sent)?;
    let now = Utc::now().into();
    let mut am: contract::ActiveModel = c.into();
    am.status = Set(ContractStatus::Sent.as_str().into());
    am.sent_at = Set(Some(now));
    am.updated_at = Set(now);
    let updated = am.update(db).await?;
    info!(contract_id = %id, "contract_sent");
    Ok(updated)
}

/// Client signature. The lead is marked won in the same transaction.
pub async fn sign(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<contract::Model, ServiceError> {
    let c = find(db, id).await?;
    if c.client_id != actor.user_id {
        return Err(ServiceError::forbidden("only the client can sign"));
    }
    c.status()?.transition(ContractStatus::Signed)?;
    let lead_id = c.lead_id;

    let txn = db.begin().await?;
    let l = leads::find(&txn, lead_id).await?;
    if l.status()? != LeadStatus::Won {
        leads::apply_status(&txn, l, LeadStatus::Won, None).await?;
    }
    let now = Utc::now().into();
    let mut am: contract::ActiveModel = c.into();
    am.status = Set(ContractStatus::Signed.as_str().into());
    am.signed_at = Set(Some(now));
    am.updated_at = Set(now);
    let signed = am.update(&txn).await?;
    txn.commit().await?;
    info!(contract_id = %id, lead_id = %lead_id, "contract_signed");
    Ok(signed)
}

pub async fn cancel(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<contract::Model, ServiceError> {
    let c = find(db, id).await?;
    if !c.is_party(actor.user_id) {
        return Err(ServiceError::forbidden("not a party to this contract"));
    }
    c.status()?.transition(ContractStatus::Cancelled)?;
    let mut am: contract::ActiveModel = c.into();
    am.status = Set(ContractStatus::Cancelled.as_str().into());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(contract_id = %id, "contract_cancelled");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::lead;
    use models::project::ProjectStatus;
    use models::user::Role;
    use crate::leads::{NewLead, StatusUpdate};
    use crate::test_support::{get_db, seed_project, seed_user};

    fn terms() -> NewContract {
        NewContract { amount_cents: 7_500_000, terms: "Apartment B12, 30% deposit at signature.".into() }
    }

    async fn qualified_lead(db: &DatabaseConnection, owner: &Actor, client: &Actor) -> Result<lead::Model, anyhow::Error> {
        let p = seed_project(db, owner.user_id, ProjectStatus::Approved).await?;
        let l = leads::create(db, client, p.id, NewLead { message: "B12 please".into(), phone: None }).await?;
        for status in [LeadStatus::Contacted, LeadStatus::Qualified] {
            leads::update_status(db, owner, l.id, StatusUpdate { status, notes: None }).await?;
        }
        Ok(leads::find(db, l.id).await?)
    }

    #[tokio::test]
    async fn signing_wins_the_lead() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let l = qualified_lead(&db, &owner, &client).await?;

        let c = create(&db, &owner, l.id, terms()).await?;
        assert!(matches!(create(&db, &owner, l.id, terms()).await, Err(ServiceError::Conflict(_))));
        assert!(sign(&db, &client, c.id).await.is_err());
        assert!(matches!(send(&db, &client, c.id).await, Err(ServiceError::Forbidden(_))));
        send(&db, &owner, c.id).await?;
        assert!(matches!(sign(&db, &owner, c.id).await, Err(ServiceError::Forbidden(_))));
        let signed = sign(&db, &client, c.id).await?;
        assert!(signed.signed_at.is_some());
        assert_eq!(leads::find(&db, l.id).await?.status, "won");
        assert!(cancel(&db, &client, c.id).await.is_err());
        assert_eq!(list(&db, &client, Pagination::default()).await?.total, 1);
        Ok(())
    }

    #[tokio::test]
    async fn needs_qualified_lead_and_party() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let (_, outsider) = seed_user(&db, Role::Client).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let fresh = leads::create(&db, &client, p.id, NewLead { message: "Hi".into(), phone: None }).await?;
        assert!(matches!(create(&db, &owner, fresh.id, terms()).await, Err(ServiceError::Validation(_))));

        let l = qualified_lead(&db, &owner, &outsider).await?;
        let c = create(&db, &owner, l.id, terms()).await?;
        assert!(matches!(get(&db, &client, c.id).await, Err(ServiceError::Forbidden(_))));
        get(&db, &admin, c.id).await?;
        let cancelled = cancel(&db, &outsider, c.id).await?;
        assert_eq!(cancelled.status, "cancelled");
        Ok(())
    }
}
