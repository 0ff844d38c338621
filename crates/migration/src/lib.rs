//! Migrator registering one migration per component in dependency order.
//! Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20260101_000001_create_users;
mod m20260101_000002_create_project;
mod m20260101_000003_create_lead;
mod m20260101_000004_create_review;
mod m20260101_000005_create_appeal;
mod m20260101_000006_create_badge;
mod m20260101_000007_create_trust_score_config;
mod m20260101_000008_create_invoice;
mod m20260101_000009_create_message_template;
mod m20260101_000010_create_report;
mod m20260101_000011_create_security_incident;
mod m20260101_000012_create_support_ticket;
mod m20260101_000013_create_brochure;
mod m20260101_000014_create_chat;
mod m20260101_000015_create_gdpr_request;
mod m20260101_000016_create_partner;
mod m20260101_000017_create_academy;
mod m20260101_000018_create_ad_campaign;
mod m20260101_000019_create_outbound_message;
mod m20260101_000020_create_contract;
mod m20260101_000099_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260101_000001_create_users::Migration),
            Box::new(m20260101_000002_create_project::Migration),
            Box::new(m20260101_000003_create_lead::Migration),
            Box::new(m20260101_000004_create_review::Migration),
            Box::new(m20260101_000005_create_appeal::Migration),
            Box::new(m20260101_000006_create_badge::Migration),
            Box::new(m20260101_000007_create_trust_score_config::Migration),
            Box::new(m20260101_000008_create_invoice::Migration),
            Box::new(m20260101_000009_create_message_template::Migration),
            Box::new(m20260101_000010_create_report::Migration),
            Box::new(m20260101_000011_create_security_incident::Migration),
            Box::new(m20260101_000012_create_support_ticket::Migration),
            Box::new(m20260101_000013_create_brochure::Migration),
            Box::new(m20260101_000014_create_chat::Migration),
            Box::new(m20260101_000015_create_gdpr_request::Migration),
            Box::new(m20260101_000016_create_partner::Migration),
            Box::new(m20260101_000017_create_academy::Migration),
            Box::new(m20260101_000018_create_ad_campaign::Migration),
            Box::new(m20260101_000019_create_outbound_message::Migration),
            Box::new(m20260101_000020_create_contract::Migration),
            // Indexes should always be applied last
            Box::new(m20260101_000099_add_indexes::Migration),
        ]
    }
}
