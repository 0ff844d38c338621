//! Support tickets: a subject plus a message thread between a user and the admins.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::lifecycle::Lifecycle;
use models::support_ticket::{self, Priority, TicketStatus};
use models::ticket_message;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};

#[derive(Debug, Clone, Deserialize)]
pub struct NewTicket {
    pub subject: String,
    pub body: String,
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMessage {
    pub body: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TicketStatusUpdate {
    pub status: TicketStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct TicketThread {
    #[serde(flatten)]
    pub ticket: support_ticket::Model,
    pub messages: Vec<ticket_message::Model>,
}

async fn insert_message<C: ConnectionTrait>(conn: &C, ticket_id: Uuid, author_id: Uuid, body: String) -> Result<ticket_message::Model, ServiceError> {
    Ok(ticket_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        ticket_id: Set(ticket_id),
        author_id: Set(author_id),
        body: Set(body),
        created_at: Set(Utc::now().into()),
    }
    .insert(conn)
    .await?)
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewTicket) -> Result<TicketThread, ServiceError> {
    support_ticket::validate_subject(&input.subject)?;
    ticket_message::validate_body(&input.body)?;
    let now = Utc::now().into();
    let txn = db.begin().await?;
    let ticket = support_ticket::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(actor.user_id),
        subject: Set(input.subject),
        priority: Set(input.priority.unwrap_or(Priority::Normal).as_str().into()),
        status: Set(TicketStatus::Open.as_str().into()),
        assigned_to: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;
    let first = insert_message(&txn, ticket.id, actor.user_id, input.body).await?;
    txn.commit().await?;
    info!(ticket_id = %ticket.id, priority = %ticket.priority, "ticket_created");
    Ok(TicketThread { ticket, messages: vec![first] })
}

async fn find_accessible(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<support_ticket::Model, ServiceError> {
    let t = support_ticket::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("ticket"))?;
    actor.require_owner_or_admin(t.user_id)?;
    Ok(t)
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, filter: TicketFilter, opts: Pagination) -> Result<Page<support_ticket::Model>, ServiceError> {
    let mut q = support_ticket::Entity::find().order_by_desc(support_ticket::Column::CreatedAt);
    if !actor.is_admin() {
        q = q.filter(support_ticket::Column::UserId.eq(actor.user_id));
    }
    if let Some(status) = filter.status {
        q = q.filter(support_ticket::Column::Status.eq(status.as_str()));
    }
    pagination::fetch(db, q, opts).await
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<TicketThread, ServiceError> {
    let ticket = find_accessible(db, actor, id).await?;
    let messages = ticket_message::Entity::find()
        .filter(ticket_message::Column::TicketId.eq(ticket.id))
        .order_by_asc(ticket_message::Column::CreatedAt)
        .all(db)
        .await?;
    Ok(TicketThread { ticket, messages })
}

/// Add a message. An admin answering an open ticket takes it in charge.
pub async fn reply(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: NewMessage) -> Result<ticket_message::Model, ServiceError> {
    ticket_message::validate_body(&input.body)?;
    let t = find_accessible(db, actor, id).await?;
    let status = t.status()?;
    if status == TicketStatus::Closed {
        return Err(ServiceError::validation("ticket is closed"));
    }
    let txn = db.begin().await?;
    let msg = insert_message(&txn, t.id, actor.user_id, input.body).await?;
    let mut am: support_ticket::ActiveModel = t.into();
    if actor.is_admin() && status == TicketStatus::Open {
        am.status = Set(TicketStatus::InProgress.as_str().into());
        am.assigned_to = Set(Some(actor.user_id));
    }
    am.updated_at = Set(Utc::now().into());
    am.update(&txn).await?;
    txn.commit().await?;
    Ok(msg)
}

/// Owners may only close or reopen; admins may make any legal move.
pub async fn update_status(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: TicketStatusUpdate) -> Result<support_ticket::Model, ServiceError> {
    let t = find_accessible(db, actor, id).await?;
    if !actor.is_admin() && !matches!(input.status, TicketStatus::Closed | TicketStatus::Open) {
        return Err(ServiceError::forbidden("only close or reopen is allowed"));
    }
    t.status()?.transition(input.status)?;
    let mut am: support_ticket::ActiveModel = t.into();
    am.status = Set(input.status.as_str().into());
    am.updated_at = Set(Utc::now().into());
    let updated = am.update(db).await?;
    info!(ticket_id = %id, status = %input.status, "ticket_status_changed");
    Ok(updated)
}
