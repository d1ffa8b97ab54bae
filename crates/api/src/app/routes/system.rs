use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::app::dto::SessionResponse;
use crate::authz;
use crate::context::RequestSession;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// The caller's session and the agency scope it resolves to.
pub async fn whoami(Extension(request): Extension<RequestSession>) -> axum::response::Response {
    let (session, ctx) = match authz::authorize_scoped(&request, None) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };

    let mut body = SessionResponse::from_session(&session);
    body.scope = Some(ctx.scope());
    (StatusCode::OK, Json(body)).into_response()
}
