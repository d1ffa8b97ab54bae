//! Authorization gate for HTTP handlers.
//!
//! Every route that reads or writes agency data calls [`authorize`] (or
//! [`authorize_scoped`]) before touching a repository. The outcome is either
//! the caller's session or a ready-to-return 401/403 response.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use agencyhub_auth::{AgencyContext, AuthzError, Permission, Session, get_agency_context};

use crate::app::errors;
use crate::context::RequestSession;

/// A pre-built rejection (401 or 403 with a JSON `{error, message}` body).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl Rejection {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }
}

impl From<AuthzError> for Rejection {
    fn from(err: AuthzError) -> Self {
        let (status, code) = match err {
            AuthzError::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            AuthzError::Forbidden { .. } => (StatusCode::FORBIDDEN, "forbidden"),
        };
        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        errors::json_error(self.status, self.code, self.message)
    }
}

/// Require a session and, optionally, a permission.
pub fn authorize(request: &RequestSession, required: Option<Permission>) -> Result<Session, Rejection> {
    match agencyhub_auth::authorize(request.session(), required) {
        Ok(session) => Ok(session.clone()),
        Err(err) => {
            match &err {
                AuthzError::Unauthenticated => tracing::debug!("request without a valid session"),
                AuthzError::Forbidden { role, permission } => {
                    tracing::info!(%role, %permission, "authorization denied")
                }
            }
            Err(err.into())
        }
    }
}

/// [`authorize`], then resolve the caller's agency context.
///
/// A tenant-bound session without an agency is rejected with 403
/// `invalid_context` rather than proceeding unscoped.
pub fn authorize_scoped(
    request: &RequestSession,
    required: Option<Permission>,
) -> Result<(Session, AgencyContext), Rejection> {
    let session = authorize(request, required)?;
    let context = get_agency_context(&session).map_err(|e| {
        tracing::warn!(user_id = %session.user_id, error = %e, "rejecting session with invalid agency context");
        Rejection {
            status: StatusCode::FORBIDDEN,
            code: "invalid_context",
            message: e.to_string(),
        }
    })?;
    Ok((session, context))
}
