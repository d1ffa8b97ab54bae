//! Login and logout.
//!
//! Login is the only place a session cookie is issued; logout only clears it.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use chrono::Utc;

use agencyhub_infra::{LoginError, authenticate};

use crate::app::dto::{LoginRequest, SessionResponse};
use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::errors;
use crate::session::CookieSessionStore;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(sessions): Extension<Arc<CookieSessionStore>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> axum::response::Response {
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    let session = match authenticate(services.users.as_ref(), &body.email, &body.password) {
        Ok(s) => s,
        Err(LoginError::InvalidCredentials) => {
            tracing::info!(email = %body.email, "login rejected");
            return errors::json_error(StatusCode::UNAUTHORIZED, "invalid_credentials", "invalid email or password");
        }
        Err(e @ LoginError::Binding(_)) => {
            tracing::warn!(email = %body.email, error = %e, "account has an invalid agency binding");
            return errors::json_error(StatusCode::FORBIDDEN, "invalid_context", e.to_string());
        }
    };

    let now = Utc::now();
    let (token, cookie) = match sessions.set_session(&session, now) {
        Ok(v) => v,
        Err(e) => {
            tracing::error!(error = %e, "failed to sign session");
            return errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "session_error", "could not issue session");
        }
    };

    tracing::info!(user_id = %session.user_id, role = %session.role, "login succeeded");

    let mut response = SessionResponse::from_session(&session);
    response.expires_at = Some(now + sessions.ttl());

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({ "session": response, "token": token })),
    )
        .into_response()
}

pub async fn logout(Extension(sessions): Extension<Arc<CookieSessionStore>>) -> axum::response::Response {
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, sessions.clear_session())]).into_response()
}
