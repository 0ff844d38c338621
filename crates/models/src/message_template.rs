use std::collections::HashMap;

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;
use crate::validate;

string_enum! {
    pub enum Channel {
        Email => "email",
        Whatsapp => "whatsapp",
        Sms => "sms",
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message_template")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub channel: String,
    pub subject: Option<String>,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn channel(&self) -> Result<Channel, ModelError> { self.channel.parse() }
}

pub fn validate_name(name: &str) -> Result<(), ModelError> {
    validate::required("name", name, 128)
}

/// Placeholder names in `{{name}}` form, in order of first appearance.
pub fn placeholders(text: &str) -> Result<Vec<String>, ModelError> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(ModelError::Validation("unterminated placeholder '{{'".into()));
        };
        let name = after[..end].trim();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            return Err(ModelError::Validation(format!("invalid placeholder '{{{{{}}}}}'", &after[..end])));
        }
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
        rest = &after[end + 2..];
    }
    Ok(names)
}

/// Substitutes every placeholder. Returns the missing variable names on failure.
pub fn render(text: &str, vars: &HashMap<String, String>) -> Result<String, RenderError> {
    let names = placeholders(text).map_err(RenderError::Malformed)?;
    let missing: Vec<String> = names.iter().filter(|n| !vars.contains_key(*n)).cloned().collect();
    if !missing.is_empty() {
        return Err(RenderError::Missing(missing));
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        // placeholders() already checked termination
        let end = after.find("}}").unwrap_or(after.len());
        let name = after[..end].trim();
        if let Some(v) = vars.get(name) {
            out.push_str(v);
        }
        rest = after.get(end + 2..).unwrap_or("");
    }
    out.push_str(rest);
    Ok(out)
}

#[derive(Debug)]
pub enum RenderError {
    Malformed(ModelError),
    Missing(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (ToString::to_string(k), ToString::to_string(v))).collect()
    }

    #[test]
    fn finds_unique_placeholders() {
        let names = placeholders("Hi {{ name }}, {{project}} by {{name}}").unwrap();
        assert_eq!(names, vec!["name", "project"]);
    }

    #[test]
    fn unterminated_is_rejected() {
        assert!(placeholders("Hello {{name").is_err());
        assert!(placeholders("Hello {{}}").is_err());
    }

    #[test]
    fn renders_all_variables() {
        let out = render("Hi {{name}}, visit {{ project }}.", &vars(&[("name", "Ana"), ("project", "Les Palmiers")])).unwrap();
        assert_eq!(out, "Hi Ana, visit Les Palmiers.");
    }

    #[test]
    fn reports_missing_variables() {
        match render("{{a}} {{b}} {{c}}", &vars(&[("b", "x")])) {
            Err(RenderError::Missing(m)) => assert_eq!(m, vec!["a", "c"]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
