//! Data export and erasure for the current user.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use common::types::Page;
use models::gdpr_request::{self, GdprKind, GdprStatus};
use models::user::{self, UserStatus};
use models::{chat_message, lead, project, review, support_ticket, ticket_message, user_credentials};

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::{badges, users};

pub const ERASED_NAME: &str = "Deleted user";

#[derive(Debug, Clone, Serialize)]
pub struct Erasure {
    pub user_id: Uuid,
    pub request_id: Uuid,
}

pub fn erased_email(id: Uuid) -> String {
    format!("deleted-{id}@invalid.local")
}

async fn record<C: ConnectionTrait>(conn: &C, user_id: Uuid, kind: GdprKind) -> Result<gdpr_request::Model, ServiceError> {
    let now = Utc::now().into();
    let req = gdpr_request::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        kind: Set(kind.as_str().into()),
        status: Set(GdprStatus::Completed.as_str().into()),
        completed_at: Set(now),
        created_at: Set(now),
    }
    .insert(conn)
    .await?;
    info!(user_id = %user_id, kind = %kind, "gdpr_request_completed");
    Ok(req)
}

/// Everything the platform holds about the caller, as one JSON document.
pub async fn export(db: &DatabaseConnection, actor: &Actor) -> Result<Value, ServiceError> {
    let me = users::get_user(db, actor.user_id).await?;
    let projects = project::Entity::find()
        .filter(project::Column::OwnerId.eq(me.id))
        .order_by_asc(project::Column::CreatedAt)
        .all(db)
        .await?;
    let leads = lead::Entity::find()
        .filter(lead::Column::ClientId.eq(me.id).or(lead::Column::PromoteurId.eq(me.id)))
        .order_by_asc(lead::Column::CreatedAt)
        .all(db)
        .await?;
    let reviews = review::Entity::find()
        .filter(review::Column::ClientId.eq(me.id))
        .order_by_asc(review::Column::CreatedAt)
        .all(db)
        .await?;
    let tickets = support_ticket::Entity::find()
        .filter(support_ticket::Column::UserId.eq(me.id))
        .order_by_asc(support_ticket::Column::CreatedAt)
        .find_with_related(ticket_message::Entity)
        .all(db)
        .await?;
    let tickets: Vec<Value> = tickets
        .into_iter()
        .map(|(t, messages)| json!({ "ticket": t, "messages": messages }))
        .collect();
    let chat = chat_message::Entity::find()
        .filter(chat_message::Column::SenderId.eq(me.id))
        .order_by_asc(chat_message::Column::CreatedAt)
        .all(db)
        .await?;
    let badges = badges::list_for_user(db, me.id).await?;

    record(db, me.id, GdprKind::Export).await?;
    Ok(json!({
        "exported_at": Utc::now().to_rfc3339(),
        "profile": me,
        "projects": projects,
        "leads": leads,
        "reviews": reviews,
        "tickets": tickets,
        "chat_messages": chat,
        "badges": badges,
    }))
}

/// Anonymise the caller's account. Content they created stays, detached from any identity.
pub async fn erase(db: &DatabaseConnection, actor: &Actor) -> Result<Erasure, ServiceError> {
    if actor.is_admin() {
        return Err(ServiceError::forbidden("admins cannot erase their own account"));
    }
    let me = users::get_user(db, actor.user_id).await?;
    if me.status()? == UserStatus::Deleted {
        return Err(ServiceError::validation("account already erased"));
    }
    let id = me.id;
    let now = Utc::now().into();

    let txn = db.begin().await?;
    let mut am: user::ActiveModel = me.into();
    am.email = Set(erased_email(id));
    am.name = Set(ERASED_NAME.into());
    am.phone = Set(None);
    am.status = Set(UserStatus::Deleted.as_str().into());
    am.deleted_at = Set(Some(now));
    am.updated_at = Set(now);
    am.update(&txn).await?;

    user_credentials::revoke(&txn, id).await?;
    lead::Entity::update_many()
        .col_expr(lead::Column::Phone, Expr::value(Option::<String>::None))
        .filter(lead::Column::ClientId.eq(id))
        .exec(&txn)
        .await?;
    let req = record(&txn, id, GdprKind::Erasure).await?;
    txn.commit().await?;
    Ok(Erasure { user_id: id, request_id: req.id })
}

pub async fn list_requests(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<gdpr_request::Model>, ServiceError> {
    actor.require_admin()?;
    let q = gdpr_request::Entity::find().order_by_desc(gdpr_request::Column::CreatedAt);
    pagination::fetch(db, q, opts).await
}
