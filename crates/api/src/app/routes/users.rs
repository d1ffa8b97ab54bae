//! Back-office account management.
//!
//! Admins create accounts inside their own agency. Only a super-admin may
//! create another super-admin, or an account in an agency it names.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};

use agencyhub_auth::{AgencyScope, Permission, Role};
use agencyhub_infra::{UserAccount, UserDirectory};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::RequestSession;

pub fn router() -> Router {
    Router::new().route("/", post(create_user))
}

/// POST /admin/users
pub async fn create_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    payload: Result<Json<dto::CreateUserRequest>, JsonRejection>,
) -> axum::response::Response {
    let (session, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageUsers)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    if let Err(e) = dto::require_email(body.email.trim()).and_then(|_| dto::require_password(&body.password)) {
        return errors::domain_error_to_response(e);
    }

    let agency_id = match body.role {
        Role::SuperAdmin => {
            if ctx.scope() != AgencyScope::Global {
                return errors::json_error(
                    StatusCode::FORBIDDEN,
                    "forbidden",
                    "only a super-admin can create a super-admin",
                );
            }
            None
        }
        Role::Admin | Role::Staff => match ctx.owning_agency(body.agency_id) {
            Ok(a) => Some(a),
            Err(e) => return errors::scope_error_to_response(e),
        },
    };

    let account = match UserAccount::new(body.email.trim(), &body.password, body.role, agency_id) {
        Ok(a) => a,
        Err(e) => {
            tracing::error!(error = %e, "password hashing failed");
            return errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "password_error",
                "could not store password",
            );
        }
    };

    match services.users.insert(account.clone()) {
        Ok(()) => {
            tracing::info!(
                actor = %session.user_id,
                user_id = %account.id,
                role = %account.role,
                "user created"
            );
            (StatusCode::CREATED, Json(account)).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}
