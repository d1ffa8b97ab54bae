use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Role;

/// Capability checked by the authorization gate.
///
/// Wire names keep the `canManageX` form used in session payloads and API
/// query strings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Permission {
    #[serde(rename = "canManageClients")]
    ManageClients,
    #[serde(rename = "canManageProjects")]
    ManageProjects,
    #[serde(rename = "canManagePayments")]
    ManagePayments,
    #[serde(rename = "canManageInvoices")]
    ManageInvoices,
    #[serde(rename = "canManageHosting")]
    ManageHosting,
    #[serde(rename = "canManageReminders")]
    ManageReminders,
    #[serde(rename = "canManagePortfolio")]
    ManagePortfolio,
    #[serde(rename = "canManageUsers")]
    ManageUsers,
    #[serde(rename = "canManageAgencies")]
    ManageAgencies,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown permission '{0}'")]
pub struct UnknownPermission(pub String);

impl Permission {
    pub const ALL: [Permission; 9] = [
        Permission::ManageClients,
        Permission::ManageProjects,
        Permission::ManagePayments,
        Permission::ManageInvoices,
        Permission::ManageHosting,
        Permission::ManageReminders,
        Permission::ManagePortfolio,
        Permission::ManageUsers,
        Permission::ManageAgencies,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ManageClients => "canManageClients",
            Permission::ManageProjects => "canManageProjects",
            Permission::ManagePayments => "canManagePayments",
            Permission::ManageInvoices => "canManageInvoices",
            Permission::ManageHosting => "canManageHosting",
            Permission::ManageReminders => "canManageReminders",
            Permission::ManagePortfolio => "canManagePortfolio",
            Permission::ManageUsers => "canManageUsers",
            Permission::ManageAgencies => "canManageAgencies",
        }
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Permission::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_string()))
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a role is granted by the static permission table.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoleGrant {
    /// Every permission, without consulting the table.
    All,
    /// Exactly the listed permissions.
    Only(&'static [Permission]),
}

impl RoleGrant {
    pub fn allows(&self, permission: Permission) -> bool {
        match self {
            RoleGrant::All => true,
            RoleGrant::Only(granted) => granted.contains(&permission),
        }
    }

    /// Concrete permission list, sorted.
    pub fn permissions(&self) -> Vec<Permission> {
        let mut perms = match self {
            RoleGrant::All => Permission::ALL.to_vec(),
            RoleGrant::Only(granted) => granted.to_vec(),
        };
        perms.sort();
        perms
    }
}

const ADMIN_GRANTS: &[Permission] = &[
    Permission::ManageClients,
    Permission::ManageProjects,
    Permission::ManagePayments,
    Permission::ManageInvoices,
    Permission::ManageHosting,
    Permission::ManageReminders,
    Permission::ManagePortfolio,
    Permission::ManageUsers,
];

const STAFF_GRANTS: &[Permission] = &[
    Permission::ManageClients,
    Permission::ManageProjects,
    Permission::ManageReminders,
    Permission::ManagePortfolio,
];

/// Role → permission table.
pub fn role_grant(role: Role) -> RoleGrant {
    match role {
        Role::SuperAdmin => RoleGrant::All,
        Role::Admin => RoleGrant::Only(ADMIN_GRANTS),
        Role::Staff => RoleGrant::Only(STAFF_GRANTS),
    }
}

pub fn role_has_permission(role: Role, permission: Permission) -> bool {
    role_grant(role).allows(permission)
}

/// Permission lookup by role name, for audit/display callers holding raw strings.
///
/// Unknown role names grant nothing.
pub fn permissions_for_role_name(name: &str) -> Vec<Permission> {
    match name.parse::<Role>() {
        Ok(role) => role_grant(role).permissions(),
        Err(_) => Vec::new(),
    }
}
