//! Message templates with `{{var}}` placeholders.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use models::message_template::{self, Channel, RenderError};
use models::validate;

use crate::actor::Actor;
use crate::errors::ServiceError;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub channel: Channel,
    pub subject: Option<String>,
    pub body: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool { true }

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub subject: Option<String>,
    pub body: Option<String>,
    pub active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Rendered {
    pub subject: Option<String>,
    pub body: String,
}

fn check_text(field: &str, text: &str) -> Result<(), ServiceError> {
    message_template::placeholders(text).map_err(|e| ServiceError::validation(format!("{field}: {e}")))?;
    Ok(())
}

pub async fn create(db: &DatabaseConnection, actor: &Actor, input: NewTemplate) -> Result<message_template::Model, ServiceError> {
    actor.require_admin()?;
    message_template::validate_name(&input.name)?;
    validate::required("body", &input.body, 10_000)?;
    check_text("body", &input.body)?;
    if let Some(s) = &input.subject {
        check_text("subject", s)?;
    }
    let now = Utc::now().into();
    let created = message_template::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        channel: Set(input.channel.as_str().into()),
        subject: Set(input.subject),
        body: Set(input.body),
        active: Set(input.active),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(template_id = %created.id, name = %created.name, "template_created");
    Ok(created)
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<message_template::Model, ServiceError> {
    message_template::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("template"))
}

pub async fn get(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<message_template::Model, ServiceError> {
    actor.require_admin()?;
    find(db, id).await
}

pub async fn list(db: &DatabaseConnection, actor: &Actor) -> Result<Vec<message_template::Model>, ServiceError> {
    actor.require_admin()?;
    Ok(message_template::Entity::find()
        .order_by_asc(message_template::Column::Name)
        .all(db)
        .await?)
}

pub async fn update(db: &DatabaseConnection, actor: &Actor, id: Uuid, input: TemplateUpdate) -> Result<message_template::Model, ServiceError> {
    actor.require_admin()?;
    let t = find(db, id).await?;
    let mut am: message_template::ActiveModel = t.into();
    if let Some(name) = input.name {
        message_template::validate_name(&name)?;
        am.name = Set(name.trim().to_string());
    }
    if let Some(subject) = input.subject {
        check_text("subject", &subject)?;
        am.subject = Set(Some(subject));
    }
    if let Some(body) = input.body {
        validate::required("body", &body, 10_000)?;
        check_text("body", &body)?;
        am.body = Set(body);
    }
    if let Some(active) = input.active {
        am.active = Set(active);
    }
    am.updated_at = Set(Utc::now().into());
    Ok(am.update(db).await?)
}

pub async fn delete(db: &DatabaseConnection, actor: &Actor, id: Uuid) -> Result<(), ServiceError> {
    actor.require_admin()?;
    let res = message_template::Entity::delete_by_id(id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(ServiceError::not_found("template"));
    }
    info!(template_id = %id, "template_deleted");
    Ok(())
}

fn render_text(text: &str, vars: &HashMap<String, String>) -> Result<String, ServiceError> {
    message_template::render(text, vars).map_err(|e| match e {
        RenderError::Malformed(m) => ServiceError::Model(m),
        RenderError::Missing(names) => ServiceError::validation(format!("missing variables: {}", names.join(", "))),
    })
}

/// Render an active template. Every placeholder must have a value.
pub fn render_template(t: &message_template::Model, vars: &HashMap<String, String>) -> Result<Rendered, ServiceError> {
    if !t.active {
        return Err(ServiceError::validation("template is inactive"));
    }
    let subject = t.subject.as_deref().map(|s| render_text(s, vars)).transpose()?;
    let body = render_text(&t.body, vars)?;
    Ok(Rendered { subject, body })
}

pub async fn render(db: &DatabaseConnection, id: Uuid, vars: &HashMap<String, String>) -> Result<Rendered, ServiceError> {
    let t = find(db, id).await?;
    render_template(&t, vars)
}

/// Active templates on `channel`, looked up by name.
pub async fn find_active_by_name(db: &DatabaseConnection, name: &str, channel: Channel) -> Result<Option<message_template::Model>, ServiceError> {
    Ok(message_template::Entity::find()
        .filter(message_template::Column::Name.eq(name))
        .filter(message_template::Column::Channel.eq(channel.as_str()))
        .filter(message_template::Column::Active.eq(true))
        .one(db)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, seed_user};
    use models::user::Role;

    fn visit() -> NewTemplate {
        NewTemplate {
            name: "visit_invite".into(),
            channel: Channel::Whatsapp,
            subject: Some("Visit of {{project}}".into()),
            body: "Hello {{name}}, your visit of {{project}} is on {{date}}.".into(),
            active: true,
        }
    }

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[tokio::test]
    async fn render_reports_missing_names() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let t = create(&db, &admin, visit()).await?;

        let out = render(&db, t.id, &vars(&[("name", "Awa"), ("project", "Les Palmiers"), ("date", "12/03")])).await?;
        assert_eq!(out.subject.as_deref(), Some("Visit of Les Palmiers"));
        assert_eq!(out.body, "Hello Awa, your visit of Les Palmiers is on 12/03.");

        match render(&db, t.id, &vars(&[("project", "X")])).await {
            Err(ServiceError::Validation(msg)) => assert_eq!(msg, "missing variables: name, date"),
            other => panic!("unexpected {other:?}"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn crud_validates_placeholders() -> Result<(), anyhow::Error> {
        let db = get_db().await?;
        let (_, admin) = seed_user(&db, Role::Admin).await?;
        let (_, promoteur) = seed_user(&db, Role::Promoteur).await?;

        let mut broken = visit();
        broken.body = "Hello {{name".into();
        assert!(matches!(create(&db, &admin, broken).await, Err(ServiceError::Validation(_))));
        assert!(matches!(create(&db, &promoteur, visit()).await, Err(ServiceError::Forbidden(_))));

        let t = create(&db, &admin, visit()).await?;
        assert!(matches!(create(&db, &admin, visit()).await, Err(ServiceError::Conflict(_))));
        assert!(update(&db, &admin, t.id, TemplateUpdate { body: Some("{{oops".into()), ..Default::default() }).await.is_err());

        let t = update(&db, &admin, t.id, TemplateUpdate { active: Some(false), ..Default::default() }).await?;
        assert!(render_template(&t, &HashMap::new()).is_err());
        assert!(find_active_by_name(&db, "visit_invite", Channel::Whatsapp).await?.is_none());

        delete(&db, &admin, t.id).await?;
        assert!(matches!(delete(&db, &admin, t.id).await, Err(ServiceError::NotFound(_))));
        assert!(list(&db, &admin).await?.is_empty());
        Ok(())
    }
}
