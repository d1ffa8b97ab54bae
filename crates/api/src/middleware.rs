use std::sync::Arc;

use axum::{
    extract::State,
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use crate::context::RequestSession;
use crate::session::CookieSessionStore;

#[derive(Clone)]
pub struct SessionState {
    pub sessions: Arc<CookieSessionStore>,
}

/// Resolve the request's session and attach it as a [`RequestSession`].
///
/// Never rejects: authorization is decided per route by the gate.
pub async fn session_middleware(
    State(state): State<SessionState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let session = state.sessions.get_session(req.headers(), Utc::now());

    req.extensions_mut().insert(RequestSession::new(session));

    next.run(req).await
}
