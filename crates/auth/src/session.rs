use serde::{Deserialize, Serialize};
use thiserror::Error;

use agencyhub_core::{AgencyId, UserId};

use crate::Role;

/// Authenticated identity attached to a request.
///
/// Created on login and never mutated afterwards; a role or agency change
/// requires a new login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    /// Absent for `super_admin`, mandatory for every other role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<AgencyId>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionBindingError {
    #[error("role '{0}' requires an agency id")]
    MissingAgency(Role),
}

impl Session {
    /// Build a session, rejecting tenant-bound roles without an agency.
    ///
    /// A super-admin never carries an agency; any id passed for one is dropped.
    pub fn new(
        user_id: UserId,
        email: impl Into<String>,
        role: Role,
        agency_id: Option<AgencyId>,
    ) -> Result<Self, SessionBindingError> {
        let session = Self {
            user_id,
            email: email.into(),
            role,
            agency_id: if role.is_tenant_bound() { agency_id } else { None },
        };
        session.check_binding()?;
        Ok(session)
    }

    /// Verify the role/agency pairing of an already-built session.
    pub fn check_binding(&self) -> Result<(), SessionBindingError> {
        if self.role.is_tenant_bound() && self.agency_id.is_none() {
            return Err(SessionBindingError::MissingAgency(self.role));
        }
        Ok(())
    }
}
