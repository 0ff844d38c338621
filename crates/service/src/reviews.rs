//! Client reviews of approved projects, with a single reply from the promoteur.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::project::ProjectStatus;
use models::review;
use models::user::Role;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::projects;

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub rating: i32,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reply {
    pub reply: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewList {
    pub average: Option<f64>,
    pub count: u64,
    pub items: Vec<review::Model>,
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, project_id: Uuid, input: NewReview) -> Result<review::Model, ServiceError> {
    actor.require_role(Role::Client)?;
    review::validate_rating(input.rating)?;
    review::validate_comment(input.comment.as_deref())?;
    let p = projects::find_visible(db, Some(actor), project_id).await?;
    if p.status()? != ProjectStatus::Approved {
        return Err(ServiceError::validation("only approved projects can be reviewed"));
    }
    let existing = review::Entity::find()
        .filter(review::Column::ProjectId.eq(p.id))
        .filter(review::Column::ClientId.eq(actor.user_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(ServiceError::conflict("you already reviewed this project"));
    }
    let now = Utc::now().into();
    let am = review::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        client_id: Set(actor.user_id),
        rating: Set(input.rating),
        comment: Set(input.comment),
        reply: Set(None),
        replied_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    };
    // the unique index still guards concurrent submissions
    let created = am.insert(db).await?;
    info!(review_id = %created.id, project_id = %p.id, rating = created.rating, "review_created");
    Ok(created)
}

pub fn average(ratings: impl IntoIterator<Item = i32>) -> Option<f64> {
    let (sum, n) = ratings.into_iter().fold((0i64, 0u64), |(s, n), r| (s + r as i64, n + 1));
    (n > 0).then(|| (sum as f64 / n as f64 * 100.0).round() / 100.0)
}

pub async fn list(db: &DatabaseConnection, project_id: Uuid) -> Result<ReviewList, ServiceError> {
    let p = projects::find_visible(db, None, project_id).await?;
    let items = review::Entity::find()
        .filter(review::Column::ProjectId.eq(p.id))
        .order_by_desc(review::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(ReviewList { average: average(items.iter().map(|r| r.rating)), count: items.len() as u64, items })
}

pub async fn reply(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: Reply) -> Result<review::Model, ServiceError> {
    review::validate_reply(&input.reply)?;
    let r = review::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("review"))?;
    let p = projects::find(db, r.project_id).await?;
    if p.owner_id != actor.user_id {
        return Err(ServiceError::forbidden("only the project owner can reply"));
    }
    if r.reply.is_some() {
        return Err(ServiceError::conflict("review already has a reply"));
    }
    let mut am: review::ActiveModel = r.into();
    let now = Utc::now().into();
    am.reply = Set(Some(input.reply));
    am.replied_at = Set(Some(now));
    am.updated_at = Set(now);
    Ok(am.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    let r = review::Entity::find_by_id(id).one(db).await?.ok_or_else(|| ServiceError::not_found("review"))?;
    actor.require_owner_or_admin(r.client_id)?;
    r.delete(db).await?;
    info!(review_id = %id, "review_deleted");
    Ok(())
}

/// Ratings received across all of a promoteur's projects.
pub async fn ratings_for_promoteur(db: &DatabaseConnection, promoteur_id: Uuid) -> Result<Vec<i32>, ServiceError> {
    let project_ids: Vec<Uuid> = projects::ids_owned_by(db, promoteur_id).await?;
    if project_ids.is_empty() {
        return Ok(Vec::new());
    }
    let reviews = review::Entity::find()
        .filter(review::Column::ProjectId.is_in(project_ids))
        .all(db)
        .await?;
    Ok(reviews.into_iter().map(|r| r.rating).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_project, seed_user};

    #[test]
    fn average_rounds_to_cents() {
        assert_eq!(average(Vec::<i32>::new()), None);
        assert_eq!(average([4, 5]), Some(4.5));
        assert_eq!(average([5, 4, 4]), Some(4.33));
    }

    #[tokio::test]
    async fn one_review_per_client_and_one_reply() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let (_, other) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;

        let r = create(&db, &client, p.id, NewReview { rating: 4, comment: Some("Solid build".into()) }).await?;
        assert!(matches!(create(&db, &client, p.id, NewReview { rating: 5, comment: None }).await, Err(ServiceError::Conflict(_))));
        assert!(create(&db, &other, p.id, NewReview { rating: 9, comment: None }).await.is_err());
        create(&db, &other, p.id, NewReview { rating: 5, comment: None }).await?;

        let listed = list(&db, p.id).await?;
        assert_eq!(listed.count, 2);
        assert_eq!(listed.average, Some(4.5));

        assert!(matches!(reply(&db, &client, r.id, Reply { reply: "thanks".into() }).await, Err(ServiceError::Forbidden(_))));
        let replied = reply(&db, &owner, r.id, Reply { reply: "Thank you!".into() }).await?;
        assert!(replied.replied_at.is_some());
        assert!(matches!(reply(&db, &owner, r.id, Reply { reply: "again".into() }).await, Err(ServiceError::Conflict(_))));

        assert_eq!(ratings_for_promoteur(&db, owner.user_id).await?.len(), 2);

        assert!(matches!(delete(&db, &other, r.id).await, Err(ServiceError::Forbidden(_))));
        delete(&db, &client, r.id).await?;
        assert_eq!(list(&db, p.id).await?.count, 1);
        Ok(())
    }

    #[tokio::test]
    async fn drafts_cannot_be_reviewed() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Submitted).await?;
        assert!(create(&db, &client, p.id, NewReview { rating: 3, comment: None }).await.is_err());
        Ok(())
    }
}
