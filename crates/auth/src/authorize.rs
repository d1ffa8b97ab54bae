use serde::Serialize;
use thiserror::Error;

use agencyhub_core::{AgencyId, UserId};

use crate::permissions::{Permission, RoleGrant, role_grant};
use crate::{Role, Session};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("authentication required")]
    Unauthenticated,

    #[error("forbidden: role '{role}' lacks permission '{permission}'")]
    Forbidden { role: Role, permission: Permission },
}

/// All-or-nothing authorization decision for one request.
///
/// - No IO
/// - No panics
/// - No session means `Unauthenticated`, whatever permission was asked for
pub fn authorize(session: Option<&Session>, required: Option<Permission>) -> Result<&Session, AuthzError> {
    let session = session.ok_or(AuthzError::Unauthenticated)?;

    if let Some(permission) = required {
        if !role_grant(session.role).allows(permission) {
            return Err(AuthzError::Forbidden {
                role: session.role,
                permission,
            });
        }
    }

    Ok(session)
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    /// The permission that was being checked.
    pub required_permission: Permission,

    /// Whether the authorization was granted.
    pub granted: bool,

    /// Human-readable reason for the decision.
    pub reason: String,

    /// Details about the session being checked.
    pub principal: PrincipalState,

    /// If denied, this explains what was missing.
    pub denial_reason: Option<DenialReason>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: UserId,
    pub role: Role,
    pub agency_id: Option<AgencyId>,
    pub effective_permissions: Vec<Permission>,
    pub unrestricted: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    MissingPermission,
}

/// Explain why `session` would be allowed or denied `required`.
///
/// Answers "why was this request denied?" without changing the decision
/// made by [`authorize`].
pub fn explain_authorization(session: &Session, required: Permission) -> AuthorizationExplanation {
    let grant = role_grant(session.role);
    let unrestricted = matches!(grant, RoleGrant::All);

    let principal = PrincipalState {
        user_id: session.user_id,
        role: session.role,
        agency_id: session.agency_id,
        effective_permissions: grant.permissions(),
        unrestricted,
    };

    if grant.allows(required) {
        let reason = if unrestricted {
            format!("Role '{}' is granted every permission", session.role)
        } else {
            format!("Role '{}' is granted '{}'", session.role, required)
        };

        return AuthorizationExplanation {
            required_permission: required,
            granted: true,
            reason,
            principal,
            denial_reason: None,
        };
    }

    let granting_roles: Vec<&str> = Role::ALL
        .iter()
        .filter(|r| role_grant(**r).allows(required))
        .map(|r| r.as_str())
        .collect();

    AuthorizationExplanation {
        required_permission: required,
        granted: false,
        reason: format!(
            "Role '{}' is not granted '{}'. Current permissions: {:?}",
            session.role,
            required,
            principal
                .effective_permissions
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
        ),
        principal,
        denial_reason: Some(DenialReason {
            kind: DenialKind::MissingPermission,
            message: format!("Missing required permission: '{required}'"),
            suggestions: vec![format!(
                "Sign in with one of the roles granting '{required}': {granting_roles:?}"
            )],
        }),
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub permissions: Vec<Permission>,
    pub tenant_bound: bool,
    pub description: &'static str,
}

/// Permission definition (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct PermissionDefinition {
    pub name: Permission,
    pub description: &'static str,
    pub category: &'static str,
}

/// Complete view of the role/permission table.
#[derive(Debug, Clone, Serialize)]
pub struct RbacRegistry {
    pub roles: Vec<RoleDefinition>,
    pub permissions: Vec<PermissionDefinition>,
}

impl RbacRegistry {
    pub fn build() -> Self {
        let roles = Role::ALL
            .iter()
            .map(|role| RoleDefinition {
                name: *role,
                permissions: role_grant(*role).permissions(),
                tenant_bound: role.is_tenant_bound(),
                description: role_description(*role),
            })
            .collect();

        let permissions = Permission::ALL
            .iter()
            .map(|perm| PermissionDefinition {
                name: *perm,
                description: permission_description(*perm),
                category: permission_category(*perm),
            })
            .collect();

        Self { roles, permissions }
    }

    pub fn role(&self, role: Role) -> Option<&RoleDefinition> {
        self.roles.iter().find(|r| r.name == role)
    }
}

fn role_description(role: Role) -> &'static str {
    match role {
        Role::SuperAdmin => "Platform operator with every permission across all agencies",
        Role::Admin => "Agency administrator with full access inside one agency",
        Role::Staff => "Agency staff with client, project, reminder and portfolio access",
    }
}

fn permission_description(perm: Permission) -> &'static str {
    match perm {
        Permission::ManageClients => "Create, update and delete clients",
        Permission::ManageProjects => "Create, update and delete projects",
        Permission::ManagePayments => "Record and edit payments",
        Permission::ManageInvoices => "Issue, edit and delete invoices",
        Permission::ManageHosting => "Manage hosting subscriptions",
        Permission::ManageReminders => "Create and complete reminders",
        Permission::ManagePortfolio => "Publish and edit portfolio entries",
        Permission::ManageUsers => "Manage back-office users and inspect roles",
        Permission::ManageAgencies => "Create and administer agencies",
    }
}

fn permission_category(perm: Permission) -> &'static str {
    match perm {
        Permission::ManageClients | Permission::ManageProjects | Permission::ManagePortfolio => "work",
        Permission::ManagePayments | Permission::ManageInvoices | Permission::ManageHosting => "billing",
        Permission::ManageReminders => "planning",
        Permission::ManageUsers | Permission::ManageAgencies => "system",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        let agency = role.is_tenant_bound().then(AgencyId::new);
        Session::new(UserId::new(), "someone@example.com", role, agency).unwrap()
    }

    #[test]
    fn missing_session_is_unauthenticated_for_any_requirement() {
        assert_eq!(authorize(None, None), Err(AuthzError::Unauthenticated));
        for p in Permission::ALL {
            assert_eq!(authorize(None, Some(p)), Err(AuthzError::Unauthenticated));
        }
    }

    #[test]
    fn staff_is_forbidden_from_invoices() {
        let s = session(Role::Staff);
        assert_eq!(
            authorize(Some(&s), Some(Permission::ManageInvoices)),
            Err(AuthzError::Forbidden {
                role: Role::Staff,
                permission: Permission::ManageInvoices,
            })
        );
    }

    #[test]
    fn granted_permission_returns_the_session() {
        let s = session(Role::Staff);
        assert_eq!(authorize(Some(&s), Some(Permission::ManageClients)), Ok(&s));
        assert_eq!(authorize(Some(&s), None), Ok(&s));
    }

    #[test]
    fn super_admin_passes_every_check() {
        let s = session(Role::SuperAdmin);
        for p in Permission::ALL {
            assert!(authorize(Some(&s), Some(p)).is_ok());
        }
    }

    #[test]
    fn explanation_agrees_with_decision() {
        for role in Role::ALL {
            let s = session(role);
            for p in Permission::ALL {
                let explained = explain_authorization(&s, p);
                assert_eq!(explained.granted, authorize(Some(&s), Some(p)).is_ok());
                assert_eq!(explained.denial_reason.is_some(), !explained.granted);
            }
        }
    }

    #[test]
    fn denial_suggests_granting_roles() {
        let s = session(Role::Staff);
        let explained = explain_authorization(&s, Permission::ManageInvoices);
        let denial = explained.denial_reason.unwrap();
        assert_eq!(denial.kind, DenialKind::MissingPermission);
        assert!(denial.suggestions[0].contains("admin"));
    }

    #[test]
    fn registry_lists_every_role_and_permission() {
        let registry = RbacRegistry::build();
        assert_eq!(registry.roles.len(), Role::ALL.len());
        assert_eq!(registry.permissions.len(), Permission::ALL.len());
        assert!(!registry.role(Role::SuperAdmin).unwrap().tenant_bound);
    }
}
