//! Service layer: marketplace business operations on top of `models`.
//! - Every operation takes the database handle and, when it needs authorization, an explicit [`actor::Actor`].
//! - Entity validation and status transition rules live in `models`; ownership and cross-entity rules live here.
//! - Errors are reported as [`errors::ServiceError`], which the HTTP layer maps to status codes.

pub mod errors;
pub mod actor;
pub mod pagination;
pub mod auth;
pub mod users;
pub mod projects;
pub mod consistency;
pub mod leads;
pub mod reviews;
pub mod appeals;
pub mod badges;
pub mod trust_score;
pub mod invoices;
pub mod templates;
pub mod reports;
pub mod incidents;
pub mod tickets;
pub mod brochures;
pub mod chat;
pub mod gdpr;
pub mod partners;
pub mod academy;
pub mod ads;
pub mod messaging;
pub mod contracts;
#[cfg(test)]
pub mod test_support;

pub use actor::Actor;
pub use errors::ServiceError;
