//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, bearer tokens and the bootstrap admin live here.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod repo;
pub mod token;

pub use service::{AuthConfig, AuthService};
