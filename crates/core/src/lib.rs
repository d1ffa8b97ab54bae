//! `agencyhub-core`: shared building blocks for the agency back-office.
//!
//! Identifiers, the domain error model and the tenant-ownership marker. No
//! infrastructure or transport concerns live here.

pub mod error;
pub mod id;
pub mod tenant;

pub use error::DomainError;
pub use id::{AgencyId, RecordId, UserId};
pub use tenant::TenantScoped;
