//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage wiring (user directory and record repositories)
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and input checks
//! - `errors.rs`: consistent `{error, message}` responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use agencyhub_auth::SessionSigner;

use crate::config::ApiConfig;
use crate::middleware::{self, SessionState};
use crate::session::CookieSessionStore;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Assemble the router around already-built services and session store.
pub fn build_router(services: Arc<AppServices>, sessions: Arc<CookieSessionStore>) -> Router {
    let session_state = SessionState {
        sessions: sessions.clone(),
    };

    let routed = routes::router()
        .layer(Extension(services))
        .layer(Extension(sessions))
        .layer(axum::middleware::from_fn_with_state(
            session_state,
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routed)
        .layer(ServiceBuilder::new())
}

/// Build the full HTTP router from configuration (used by `main.rs`).
pub fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let signer = SessionSigner::new(config.session_secret.as_bytes(), config.session_ttl);
    let sessions = Arc::new(CookieSessionStore::new(
        signer,
        config.cookie_name.clone(),
        config.cookie_secure,
    ));

    let services = Arc::new(AppServices::in_memory());
    if let Some(admin) = &config.bootstrap_admin {
        services.bootstrap_admin(admin)?;
    }

    Ok(build_router(services, sessions))
}
