//! Outbound WhatsApp messages through a pluggable provider gateway.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use common::types::Page;
use models::lead;
use models::message_template::Channel;
use models::outbound_message::{self, DeliveryStatus};
use models::user::Role;
use models::validate;

use crate::actor::Actor;
use crate::errors::ServiceError;
use crate::pagination::{self, Pagination};
use crate::{templates, users};

#[derive(Debug, Error)]
#[error("provider rejected message: {0}")]
pub struct GatewayError(pub String);

/// A provider able to deliver one WhatsApp message.
#[async_trait]
pub trait MessageGateway: Send + Sync {
    /// Returns the provider's message id.
    async fn send_whatsapp(&self, to_phone: &str, body: &str) -> Result<String, GatewayError>;
}

/// Writes messages to the log instead of calling a provider.
#[derive(Debug, Default, Clone)]
pub struct LogGateway;

#[async_trait]
impl MessageGateway for LogGateway {
    async fn send_whatsapp(&self, to_phone: &str, body: &str) -> Result<String, GatewayError> {
        let id = format!("log-{}", Uuid::new_v4().simple());
        info!(provider_message_id = %id, to = %to_phone, chars = body.chars().count(), "whatsapp_message_logged");
        Ok(id)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WhatsappRequest {
    pub to_user_id: Option<Uuid>,
    pub to_phone: Option<String>,
    pub template_id: Option<Uuid>,
    /// Alternative to `template_id`: an active whatsapp template with this name.
    pub template_name: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    pub body: Option<String>,
}

struct Recipient {
    user_id: Option<Uuid>,
    phone: String,
}

async fn resolve_recipient(db: &DatabaseConnection, input: &WhatsappRequest) -> Result<Recipient, ServiceError> {
    match (input.to_user_id, input.to_phone.as_deref()) {
        (Some(uid), None) => {
            let u = users::get_user(db, uid).await?;
            let phone = u.phone.ok_or_else(|| ServiceError::validation("recipient has no phone number"))?;
            Ok(Recipient { user_id: Some(u.id), phone })
        }
        (None, Some(phone)) => {
            validate::phone(phone)?;
            Ok(Recipient { user_id: None, phone: phone.to_string() })
        }
        _ => Err(ServiceError::validation("exactly one of to_user_id or to_phone is required")),
    }
}

/// Promoteurs may only reach people who left a lead on one of their projects.
async fn ensure_promoteur_may_contact(db: &DatabaseConnection, actor: &Actor, to: &Recipient) -> Result<(), ServiceError> {
    let mut who = Condition::any().add(lead::Column::Phone.eq(to.phone.as_str()));
    if let Some(uid) = to.user_id {
        who = who.add(lead::Column::ClientId.eq(uid));
    }
    let hit = lead::Entity::find()
        .filter(lead::Column::PromoteurId.eq(actor.user_id))
        .filter(who)
        .one(db)
        .await?;
    if hit.is_none() {
        return Err(ServiceError::forbidden("recipient holds no lead on your projects"));
    }
    Ok(())
}

/// Rendered body and the template it came from, if any.
async fn compose(db: &DatabaseConnection, input: &WhatsappRequest) -> Result<(Option<Uuid>, String), ServiceError> {
    let template = match (input.template_id, input.template_name.as_deref()) {
        (Some(_), Some(_)) => return Err(ServiceError::validation("give template_id or template_name, not both")),
        (Some(tid), None) => Some(templates::find(db, tid).await?),
        (None, Some(name)) => Some(
            templates::find_active_by_name(db, name, Channel::Whatsapp)
                .await?
                .ok_or_else(|| ServiceError::not_found("template"))?,
        ),
        (None, None) => None,
    };
    if let Some(t) = template {
        if t.channel()? != Channel::Whatsapp {
            return Err(ServiceError::validation("template is not a whatsapp template"));
        }
        let body = templates::render_template(&t, &input.variables)?.body;
        return Ok((Some(t.id), body));
    }
    let body = input.body.clone().unwrap_or_default();
    validate::required("body", &body, 4096)?;
    Ok((None, body))
}

/// Store, hand to the gateway, then record the outcome. A provider failure is stored, not returned.
pub async fn send_whatsapp(
    db: &DatabaseConnection,
    gateway: &dyn MessageGateway,
    actor: &Actor,
    input: WhatsappRequest,
) -> Result<outbound_message::Model, ServiceError> {
    if actor.role == Role::Client {
        return Err(ServiceError::forbidden("promoteur or admin role required"));
    }
    let to = resolve_recipient(db, &input).await?;
    if actor.role == Role::Promoteur {
        ensure_promoteur_may_contact(db, actor, &to).await?;
    }
    let (template_id, body) = compose(db, &input).await?;

    let now = Utc::now().into();
    let queued = outbound_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        recipient_id: Set(to.user_id),
        to_phone: Set(to.phone.clone()),
        template_id: Set(template_id),
        body: Set(body.clone()),
        channel: Set(Channel::Whatsapp.as_str().into()),
        status: Set(DeliveryStatus::Queued.as_str().into()),
        provider_message_id: Set(None),
        error: Set(None),
        sent_by: Set(actor.user_id),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;

    let outcome = gateway.send_whatsapp(&to.phone, &body).await;
    let mut am: outbound_message::ActiveModel = queued.into();
    match outcome {
        Ok(provider_id) => {
            am.status = Set(DeliveryStatus::Sent.as_str().into());
            am.provider_message_id = Set(Some(provider_id));
        }
        Err(e) => {
            warn!(error = %e, "whatsapp_delivery_failed");
            am.status = Set(DeliveryStatus::Failed.as_str().into());
            am.error = Set(Some(e.to_string()));
        }
    }
    am.updated_at = Set(Utc::now().into());
    let stored = am.update(db).await?;
    info!(message_id = %stored.id, status = %stored.status, "whatsapp_message_processed");
    Ok(stored)
}

pub async fn list(db: &DatabaseConnection, actor: &Actor, opts: Pagination) -> Result<Page<outbound_message::Model>, ServiceError> {
    let mut q = outbound_message::Entity::find().order_by_desc(outbound_message::Column::CreatedAt);
    if !actor.is_admin() {
        q = q.filter(outbound_message::Column::SentBy.eq(actor.user_id));
    }
    pagination::fetch(db, q, opts).await
}
