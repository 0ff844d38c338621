//! Client to promoteur conversations about a project.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};
use sea_orm::sea_query::Expr;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::chat_message;
use models::conversation;
use models::user::Role;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::projects;

#[derive(Debug, Clone, Deserialize)]
pub struct NewChatMessage {
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationSummary {
    #[serde(flatten)]
    pub conversation: conversation::Model,
    pub unread: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MarkedRead {
    pub marked: u64,
}

/// Returns the conversation and whether it was just created.
pub async fn open(db: &DatabaseConnection, actor: &Actor, project_id: Uuid) -> Result<(conversation::Model, bool), ServiceError> {
    actor.require_role(Role::Client)?;
    let p = projects::find_visible(db, Some(actor), project_id).await?;
    let existing = conversation::Entity::find()
        .filter(conversation::Column::ProjectId.eq(p.id))
        .filter(conversation::Column::ClientId.eq(actor.user_id))
        .one(db)
        .await?;
    if let Some(c) = existing {
        return Ok((c, false));
    }
    let now = Utc::now().into();
    let created = conversation::ActiveModel {
        id: Set(Uuid::new_v4()),
        project_id: Set(p.id),
        client_id: Set(actor.user_id),
        promoteur_id: Set(p.owner_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(conversation_id = %created.id, project_id = %p.id, "conversation_opened");
    Ok((created, true))
}

async fn find_participating(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<conversation::Model, ServiceError> {
    let c = conversation::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("conversation"))?;
    if !c.is_participant(actor.user_id) {
        return Err(ServiceError::forbidden("not a participant"));
    }
    Ok(c)
}

fn unread_for(conversation_id: Uuid, reader: Uuid) -> Condition {
    Condition::all()
        .add(chat_message::Column::ConversationId.eq(conversation_id))
        .add(chat_message::Column::SenderId.ne(reader))
        .add(chat_message::Column::ReadAt.is_null())
}

pub async fn list(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<ConversationSummary>, ServiceError> {
    let convs = conversation::Entity::find()
        .filter(
            Condition::any()
                .add(conversation::Column::ClientId.eq(actor.user_id))
                .add(conversation::Column::PromoteurId.eq(actor.user_id)),
        )
        .order_by_desc(conversation::Column::UpdatedAt)
        .all(db)
        .await?;
    let mut out = Vec::with_capacity(convs.len());
    for c in convs {
        let unread = chat_message::Entity::find().filter(unread_for(c.id, actor.user_id)).count(db).await?;
        out.push(ConversationSummary { conversation: c, unread });
    }
    Ok(out)
}

pub async fn messages(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<Vec<chat_message::Model>, ServiceError> {
    let c = find_participating(db, actor, id).await?;
    Ok(chat_message::Entity::find()
        .filter(chat_message::Column::ConversationId.eq(c.id))
        .order_by_asc(chat_message::Column::CreatedAt)
        .all(db)
        .await?)
}

pub async fn send(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: NewChatMessage) -> Result<chat_message::Model, ServiceError> {
    chat_message::validate_body(&input.body)?;
    let c = find_participating(db, actor, id).await?;
    let now = Utc::now().into();
    let msg = chat_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        conversation_id: Set(c.id),
        sender_id: Set(actor.user_id),
        body: Set(input.body),
        read_at: Set(None),
        created_at: Set(now),
    }
    .insert(db)
    .await?;
    let mut am: conversation::ActiveModel = c.into();
    am.updated_at = Set(now);
    am.update(db).await?;
    Ok(msg)
}

/// Mark the other party's messages as read.
pub async fn mark_read(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<MarkedRead, ServiceError> {
    let c = find_participating(db, actor, id).await?;
    let now: sea_orm::prelude::DateTimeWithTimeZone = Utc::now().into();
    let res = chat_message::Entity::update_many()
        .col_expr(chat_message::Column::ReadAt, Expr::value(now))
        .filter(unread_for(c.id, actor.user_id))
        .exec(db)
        .await?;
    Ok(MarkedRead { marked: res.rows_affected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::project::ProjectStatus;
    use crate::test_support::{get_db, seed_project, seed_user};

    fn text(body: &str) -> NewChatMessage {
        NewChatMessage { body: body.into() }
    }

    #[tokio::test]
    async fn open_is_idempotent() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let (c1, created) = open(&db, &client, p.id).await?;
        assert!(created);
        let (c2, created) = open(&db, &client, p.id).await?;
        assert!(!created);
        assert_eq!(c1.id, c2.id);
        assert_eq!(c1.promoteur_id, owner.user_id);
        assert!(matches!(open(&db, &owner, p.id).await, Err(ServiceError::Forbidden(_))));

        let draft = seed_project(&db, owner.user_id, ProjectStatus::Draft).await?;
        assert!(matches!(open(&db, &client, draft.id).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn unread_counts_and_mark_read() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, owner) = seed_user(&db, Role::Promoteur).await?;
        let (_, client) = seed_user(&db, Role::Client).await?;
        let (_, stranger) = seed_user(&db, Role::Client).await?;
        let p = seed_project(&db, owner.user_id, ProjectStatus::Approved).await?;
        let (c, _) = open(&db, &client, p.id).await?;

        send(&db, &client, c.id, text("Is the ground floor available?")).await?;
        send(&db, &client, c.id, text("With a garden?")).await?;
        send(&db, &owner, c.id, text("Yes, two units left.")).await?;

        let for_owner = list(&db, &owner).await?;
        assert_eq!(for_owner.len(), 1);
        assert_eq!(for_owner[0].unread, 2);
        assert_eq!(list(&db, &client).await?[0].unread, 1);

        assert_eq!(mark_read(&db, &owner, c.id).await?.marked, 2);
        assert_eq!(mark_read(&db, &owner, c.id).await?.marked, 0);
        assert_eq!(list(&db, &owner).await?[0].unread, 0);
        assert_eq!(messages(&db, &client, c.id).await?.len(), 3);

        assert!(matches!(messages(&db, &stranger, c.id).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(send(&db, &stranger, c.id, text("hi")).await, Err(ServiceError::Forbidden(_))));
        assert!(send(&db, &client, c.id, text("")).await.is_err());
        Ok(())
    }
}
