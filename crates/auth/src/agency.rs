//! Per-request tenant resolution.
//!
//! [`get_agency_context`] turns a verified session into the scope every
//! tenant-owned read and write must run under. The agency id is taken from
//! the signed session claim and never looked up again.

use serde::Serialize;
use thiserror::Error;

use agencyhub_core::{AgencyId, UserId};

use crate::{Role, Session};

/// Which rows an actor may see.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "agency_id", rename_all = "snake_case")]
pub enum AgencyScope {
    /// No tenant restriction (super-admin only).
    Global,
    /// Restricted to one agency.
    Agency(AgencyId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("invalid agency context: {0}")]
    InvalidContext(String),

    #[error("agency {requested} is outside the actor's agency {own}")]
    CrossTenant { own: AgencyId, requested: AgencyId },
}

/// Effective tenant of the authenticated actor, valid for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgencyContext {
    user_id: UserId,
    role: Role,
    scope: AgencyScope,
}

/// Derive the agency context of `session`.
///
/// A tenant-bound role without an agency id is an error, never an
/// unrestricted context.
pub fn get_agency_context(session: &Session) -> Result<AgencyContext, ScopeError> {
    let scope = match session.role {
        Role::SuperAdmin => AgencyScope::Global,
        Role::Admin | Role::Staff => match session.agency_id {
            Some(agency_id) => AgencyScope::Agency(agency_id),
            None => {
                return Err(ScopeError::InvalidContext(format!(
                    "session for user {} has role '{}' but no agency",
                    session.user_id, session.role
                )));
            }
        },
    };

    Ok(AgencyContext {
        user_id: session.user_id,
        role: session.role,
        scope,
    })
}

impl AgencyContext {
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn scope(&self) -> AgencyScope {
        self.scope
    }

    /// The actor's agency; `None` means unrestricted.
    pub fn agency_id(&self) -> Option<AgencyId> {
        match self.scope {
            AgencyScope::Global => None,
            AgencyScope::Agency(id) => Some(id),
        }
    }

    pub fn can_access(&self, agency_id: AgencyId) -> bool {
        match self.scope {
            AgencyScope::Global => true,
            AgencyScope::Agency(own) => own == agency_id,
        }
    }

    /// Agency a newly created record is owned by.
    ///
    /// Tenant-bound actors always write into their own agency. A super-admin
    /// has none, so it must say which agency the record belongs to.
    pub fn owning_agency(&self, requested: Option<AgencyId>) -> Result<AgencyId, ScopeError> {
        match (self.scope, requested) {
            (AgencyScope::Agency(own), None) => Ok(own),
            (AgencyScope::Agency(own), Some(requested)) if requested == own => Ok(own),
            (AgencyScope::Agency(own), Some(requested)) => Err(ScopeError::CrossTenant { own, requested }),
            (AgencyScope::Global, Some(requested)) => Ok(requested),
            (AgencyScope::Global, None) => Err(ScopeError::InvalidContext(
                "an agency id is required when acting without a tenant".to_string(),
            )),
        }
    }
}
