#[macro_use]
mod macros;

pub mod errors;
pub mod db;
pub mod lifecycle;
pub mod validate;

pub mod user;
pub mod user_credentials;
pub mod project;
pub mod project_photo;
pub mod lead;
pub mod review;
pub mod appeal;
pub mod badge;
pub mod user_badge;
pub mod trust_score_config;
pub mod invoice;
pub mod invoice_line;
pub mod message_template;
pub mod report;
pub mod security_incident;
pub mod support_ticket;
pub mod ticket_message;
pub mod brochure;
pub mod conversation;
pub mod chat_message;
pub mod gdpr_request;
pub mod partner;
pub mod course;
pub mod lesson;
pub mod enrollment;
pub mod lesson_completion;
pub mod ad_campaign;
pub mod outbound_message;
pub mod contract;

pub use lifecycle::Lifecycle;
