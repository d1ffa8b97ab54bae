use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Back-office role carried in every session.
///
/// The set is closed: a token naming any other role fails to decode and is
/// treated as no session at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Platform operator. Not bound to any agency; sees every tenant.
    SuperAdmin,
    /// Agency owner/manager.
    Admin,
    /// Agency employee with day-to-day access.
    Staff,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::SuperAdmin, Role::Admin, Role::Staff];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::Admin => "admin",
            Role::Staff => "staff",
        }
    }

    /// Whether sessions with this role must carry an agency id.
    pub fn is_tenant_bound(&self) -> bool {
        match self {
            Role::SuperAdmin => false,
            Role::Admin | Role::Staff => true,
        }
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "super_admin" => Ok(Role::SuperAdmin),
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
