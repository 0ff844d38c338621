//! Pay-per-click ad campaigns on approved projects.

use chrono::Utc;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::ad_campaign::{self, AdStatus};
use models::lifecycle::Lifecycle;
use models::project::ProjectStatus;
use models::user::Role;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::projects;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCampaign {
    pub title: String,
    pub budget_cents: i64,
    pub cost_per_click_cents: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdStatusUpdate {
    pub status: AdStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignView {
    #[serde(flatten)]
    pub campaign: ad_campaign::Model,
    pub ctr: f64,
}

impl From<ad_campaign::Model> for CampaignView {
    fn from(campaign: ad_campaign::Model) -> Self {
        let ctr = campaign.ctr();
        Self { campaign, ctr }
    }
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, project_id: Uuid, input: NewCampaign) -> Result<ad_campaign::Model, ServiceError> {
    ad_campaign::validate_campaign(&input.title, input.budget_cents, input.cost_per_click_cents)?;
    let p = projects::find(db, project_id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    if p.status()? != ProjectStatus::Approved {
        return Err(ServiceError::validation("only approved projects can be advertised"));
    }
    let now = Utc::now().into();
    let created = ad_campaign::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        promoteur_id: Set(actor.user_id),
        title: Set(input.title),
        budget_cents: Set(input.budget_cents),
        cost_per_click_cents: Set(input.cost_per_click_cents),
        spent_cents: Set(0),
        impressions: Set(0),
        clicks: Set(0),
        status: Set(AdStatus::Draft.as_str().into()),
        starts_at: Set(None),
        ends_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(campaign_id = %created.id, project_id = %p.id, budget_cents = created.budget_cents, "ad_campaign_created");
    Ok(created)
}

async fn find(db: &DatabaseConnection, id: Uuid) -> Result<ad_campaign::Model, ServiceError> {
    ad_campaign::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("campaign"))
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<CampaignView, ServiceError> {
    let c = find(db, id).await?;
    actor.require_owner_or_admin(c.promoteur_id)?;
    Ok(c.into())
}

pub async fn list_mine(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<CampaignView>, ServiceError> {
    actor.require_role(Role::Promoteur)?;
    let q = ad_campaign::Entity::find()
        .filter(ad_campaign::Column::PromoteurId.eq(actor.user_id))
        .order_by_desc(ad_campaign::Column::CreatedAt);
    let page = pagination::fetch(db, q, opts).await?;
    Ok(Page {
        items: page.items.into_iter().map(CampaignView::from).collect(),
        page: page.page,
        per_page: page.per_page,
        total: page.total,
    })
}

pub async fn update_status(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: AdStatusUpdate) -> Result<ad_campaign::Model, ServiceError> {
    let c = find(db, id).await?;
    if c.promoteur_id != actor.user_id {
        return Err(ServiceError::forbidden("not the owner"));
    }
    let from = c.status()?;
    from.transition(input.status)?;
    let now = Utc::now().into();
    let mut am: ad_campaign::ActiveModel = c.into();
    am.status = Set(input.status.as_str().into());
    match input.status {
        AdStatus::Active if from == AdStatus::Draft => am.starts_at = Set(Some(now)),
        AdStatus::Ended => am.ends_at = Set(Some(now)),
        _ => {}
    }
    am.updated_at = Set(now);
    let updated = am.update(db).await?;
    info!(campaign_id = %id, status = %input.status, "ad_campaign_status_changed");
    Ok(updated)
}

/// Bump the counters of an active campaign in one statement so concurrent hits never overwrite each other.
pub async fn record_impression(db: &DatabaseConnection, id: Uuid) -> Result<CampaignView, ServiceError> {
    find(db, id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = ad_campaign::Entity::update_many()
        .col_expr(ad_campaign::Column::Impressions, Expr::col(ad_campaign::Column::Impressions).add(1))
        .col_expr(ad_campaign::Column::UpdatedAt, Expr::value(now))
        .filter(ad_campaign::Column::Id.eq(id))
        .filter(ad_campaign::Column::Status.eq(AdStatus::Active.as_str()))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::validation("campaign is not active"));
    }
    Ok(find(db, id).await?.into())
}

/// Charge one click. The campaign ends once its budget is spent; clicks past that are refused.
pub async fn record_click(db: &DatabaseConnection, id: Uuid) -> Result<CampaignView, ServiceError> {
    find(db, id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let active = AdStatus::Active.as_str();
    let charged = ad_campaign::Entity::update_many()
        .col_expr(ad_campaign::Column::Clicks, Expr::col(ad_campaign::Column::Clicks).add(1))
        .col_expr(
            ad_campaign::Column::SpentCents,
            Expr::col(ad_campaign::Column::SpentCents).add(Expr::col(ad_campaign::Column::CostPerClickCents)),
        )
        .col_expr(ad_campaign::Column::UpdatedAt, Expr::value(now))
        .filter(ad_campaign::Column::Id.eq(id))
        .filter(ad_campaign::Column::Status.eq(active))
        .filter(Expr::col(ad_campaign::Column::SpentCents).lt(Expr::col(ad_campaign::Column::BudgetCents)))
        .exec(db)
        .await?;
    if charged.rows_affected == 0 {
        return Err(ServiceError::validation("campaign is not active"));
    }

    let ended = ad_campaign::Entity::update_many()
        .col_expr(ad_campaign::Column::Status, Expr::value(AdStatus::Ended.as_str()))
        .col_expr(ad_campaign::Column::EndsAt, Expr::value(now))
        .filter(ad_campaign::Column::Id.eq(id))
        .filter(ad_campaign::Column::Status.eq(active))
        .filter(Expr::col(ad_campaign::Column::SpentCents).gte(Expr::col(ad_campaign::Column::BudgetCents)))
        .exec(db)
        .await?;
    let view: CampaignView = find(db, id).await?.into();
    if ended.rows_affected > 0 {
        info!(campaign_id = %id, spent_cents = view.campaign.spent_cents, "ad_campaign_budget_exhausted");
    }
    Ok(view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_project, seed_user};

    fn campaign() -> NewCampaign {
        NewCampaign { title: "Launch week".into(), budget_cents: 250, cost_per_click_cents: 100 }
    }

    #[tokio::test]
    async fn clicks_spend_budget_until_ended() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let c = create(&db, &owner, p.id, campaign()).await?;
        assert!(matches!(record_click(&db, c.id).await, Err(ServiceError::Validation(_))));

        let active = update_status(&db, &owner, c.id, AdStatusUpdate { status: AdStatus::Active }).await?;
        assert!(active.starts_at.is_some());
        for _ in 0..4 {
            record_impression(&db, c.id).await?;
        }
        record_click(&db, c.id).await?;
        let view = record_click(&db, c.id).await?;
        assert_eq!(view.campaign.spent_cents, 200);
        assert_eq!(view.ctr, 50.0);
        let view = record_click(&db, c.id).await?;
        assert_eq!(view.campaign.status, "ended");
        assert!(view.campaign.ends_at.is_some());
        assert!(record_impression(&db, c.id).await.is_err());
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_clicks_are_all_charged() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let input = NewCampaign { title: "Open house".into(), budget_cents: 1_000, cost_per_click_cents: 100 };
        let c = create(&db, &owner, p.id, input).await?;
        update_status(&db, &owner, c.id, AdStatusUpdate { status: AdStatus::Active }).await?;

        let handles: Vec<_> = (0..12)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { record_click(&db, c.id).await })
            })
            .collect();
        let mut charged = 0;
        for h in handles {
            if h.await?.is_ok() {
                charged += 1;
            }
        }
        assert_eq!(charged, 10);

        let stored = find(&db, c.id).await?;
        assert_eq!(stored.clicks, 10);
        assert_eq!(stored.spent_cents, 1_000);
        assert_eq!(stored.status, "ended");
        Ok(())
    }

    #[tokio::test]
    async fn owner_rules() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, other) = seed_user(&db, Role::Promoteur).await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let submitted = seed_project(&db, owner.user_id, ProjectStatus::Submitted).await?;
        assert!(matches!(create(&db, &owner, submitted.id, campaign()).await, Err(ServiceError::Validation(_))));

        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        assert!(matches!(create(&db, &other, p.id, campaign()).await, Err(ServiceError::Forbidden(_))));
        let c = create(&db, &owner, p.id, campaign()).await?;
        assert!(matches!(get(&db, &other, c.id).await, Err(ServiceError::Forbidden(_))));
        assert_eq!(get(&db, &admin, c.id).await?.ctr, 0.0);
        assert!(update_status(&db, &owner, c.id, AdStatusUpdate { status: AdStatus::Paused }).await.is_err());
        assert_eq!(list_mine(&db, &owner, Pagination::default()).await?.total, 1);
        assert_eq!(list_mine(&db, &other, Pagination::default()).await?.total, 0);
        Ok(())
    }
}
