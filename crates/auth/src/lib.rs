//! `agencyhub-auth`: sessions, roles, permissions and tenant resolution.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod agency;
pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod session;
pub mod signer;

pub use agency::{AgencyContext, AgencyScope, ScopeError, get_agency_context};
pub use authorize::{AuthorizationExplanation, AuthzError, RbacRegistry, authorize, explain_authorization};
pub use claims::{SessionClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, hash_password, verify_password};
pub use permissions::{Permission, RoleGrant, permissions_for_role_name, role_grant, role_has_permission};
pub use roles::Role;
pub use session::{Session, SessionBindingError};
pub use signer::{SessionError, SessionSigner};
