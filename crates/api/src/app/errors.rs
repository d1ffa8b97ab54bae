use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use agencyhub_auth::ScopeError;
use agencyhub_core::DomainError;
use agencyhub_infra::RepositoryError;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn repository_error_to_response(err: RepositoryError) -> axum::response::Response {
    match err {
        RepositoryError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        RepositoryError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        other => {
            tracing::error!(error = %other, "repository failure");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", other.to_string())
        }
    }
}

pub fn scope_error_to_response(err: ScopeError) -> axum::response::Response {
    match err {
        ScopeError::InvalidContext(msg) => json_error(StatusCode::FORBIDDEN, "invalid_context", msg),
        e @ ScopeError::CrossTenant { .. } => {
            json_error(StatusCode::FORBIDDEN, "tenant_isolation", e.to_string())
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        e @ DomainError::Validation { .. } => json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()),
        e @ DomainError::InvalidId { .. } => json_error(StatusCode::BAD_REQUEST, "invalid_id", e.to_string()),
    }
}
