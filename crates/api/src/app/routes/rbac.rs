//! RBAC audit endpoints.
//!
//! Listing roles and permissions needs `canManageUsers`; `explain` only needs
//! a session and always answers for the caller.

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use agencyhub_auth::{Permission, RbacRegistry, Role, explain_authorization};

use crate::app::{dto::ExplainQuery, errors};
use crate::authz;
use crate::context::RequestSession;

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/:name", get(get_role))
        .route("/permissions", get(list_permissions))
        .route("/explain", get(explain))
}

/// GET /admin/rbac/roles
pub async fn list_roles(Extension(request): Extension<RequestSession>) -> axum::response::Response {
    if let Err(r) = authz::authorize(&request, Some(Permission::ManageUsers)) {
        return r.into_response();
    }

    let registry = RbacRegistry::build();
    (StatusCode::OK, Json(serde_json::json!({ "roles": registry.roles }))).into_response()
}

/// GET /admin/rbac/roles/:name
pub async fn get_role(
    Extension(request): Extension<RequestSession>,
    Path(name): Path<String>,
) -> axum::response::Response {
    if let Err(r) = authz::authorize(&request, Some(Permission::ManageUsers)) {
        return r.into_response();
    }

    let registry = RbacRegistry::build();
    match name.parse::<Role>().ok().and_then(|role| registry.role(role)) {
        Some(role) => (StatusCode::OK, Json(serde_json::json!({ "role": role }))).into_response(),
        None => errors::json_error(StatusCode::NOT_FOUND, "not_found", "role not found"),
    }
}

/// GET /admin/rbac/permissions
pub async fn list_permissions(Extension(request): Extension<RequestSession>) -> axum::response::Response {
    if let Err(r) = authz::authorize(&request, Some(Permission::ManageUsers)) {
        return r.into_response();
    }

    let registry = RbacRegistry::build();
    (StatusCode::OK, Json(serde_json::json!({ "permissions": registry.permissions }))).into_response()
}

/// GET /admin/rbac/explain?permission=X
pub async fn explain(
    Extension(request): Extension<RequestSession>,
    query: Result<Query<ExplainQuery>, axum::extract::rejection::QueryRejection>,
) -> axum::response::Response {
    let session = match authz::authorize(&request, None) {
        Ok(s) => s,
        Err(r) => return r.into_response(),
    };
    let Ok(Query(query)) = query else {
        return errors::json_error(StatusCode::BAD_REQUEST, "invalid_query", "missing `permission` parameter");
    };

    let permission = match query.permission.parse::<Permission>() {
        Ok(p) => p,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "unknown_permission", e.to_string()),
    };

    let explanation = explain_authorization(&session, permission);
    (StatusCode::OK, Json(serde_json::json!({ "explanation": explanation }))).into_response()
}
