//! # CDR Core
//!
//! Core business logic for the CDR patient service: patient identity,
//! identifier preference enforcement, program enrollment, and the
//! audit/void behaviour shared by every record.
//!
//! **No API concerns**: HTTP routing, serialization and request validation
//! belong in `api-rest`. This crate owns the invariants:
//!
//! - at most one preferred identifier per (patient, identifier type);
//! - at most one enrollment per (patient, program), ever;
//! - every mutation stamps the audit trail, and deletion is always
//!   logical (voiding), never physical.

pub mod audit;
pub mod clients;
pub mod config;
pub mod error;
pub mod model;
pub mod principal;
pub mod services;
pub mod store;

pub use audit::AuditTrail;
pub use config::CoreConfig;
pub use error::{CdrError, CdrResult};
pub use principal::Principal;
