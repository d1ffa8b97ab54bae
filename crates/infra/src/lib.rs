//! Infrastructure layer: query model, tenant scoping, repositories, users.

pub mod query;
pub mod records;
pub mod repository;
pub mod scope;
pub mod users;

pub use query::{ColumnRef, Predicate, Query, Value};
pub use records::{Client, Invoice, Project, ProjectStatus, Record, Reminder};
pub use repository::{InMemoryRepository, Repository, RepositoryError};
pub use scope::{AGENCY_COLUMN, ScopedQuery, scope_to_agency};
pub use users::{InMemoryUserDirectory, LoginError, UserAccount, UserDirectory, authenticate};
