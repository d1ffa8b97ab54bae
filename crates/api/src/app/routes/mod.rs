use axum::{routing::get, Router};

pub mod auth;
pub mod clients;
pub mod common;
pub mod invoices;
pub mod projects;
pub mod rbac;
pub mod reminders;
pub mod system;
pub mod users;

/// Router for every endpoint behind the session middleware.
///
/// Nothing here rejects at the router level; each handler runs the
/// authorization gate itself.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/auth", auth::router())
        .nest("/clients", clients::router())
        .nest("/projects", projects::router())
        .nest("/invoices", invoices::router())
        .nest("/reminders", reminders::router())
        .nest("/admin/rbac", rbac::router())
        .nest("/admin/users", users::router())
}
