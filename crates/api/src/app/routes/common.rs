//! Helpers shared by the tenant-scoped record routes.
//!
//! Each helper runs the authorization gate first, then builds its query
//! through `scope_to_agency` before touching the repository.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use agencyhub_auth::{AgencyContext, Permission};
use agencyhub_core::{AgencyId, RecordId};
use agencyhub_infra::{Client, Record, Repository, ScopedQuery, scope_to_agency};

use crate::app::errors;
use crate::authz;
use crate::context::RequestSession;

/// Alias used for every single-table query issued by the routes.
pub const ALIAS: &str = "t";

pub fn parse_id(id: &str) -> Result<RecordId, Response> {
    id.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid record id"))
}

pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Response> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.body_text()))
}

/// All rows of `R` visible in `ctx`.
pub fn scoped_all<R: Record>(ctx: &AgencyContext) -> ScopedQuery {
    scope_to_agency(R::query(ALIAS), ctx, ALIAS)
}

/// The row of `R` with `id`, if visible in `ctx`.
pub fn scoped_by_id<R: Record>(ctx: &AgencyContext, id: RecordId) -> ScopedQuery {
    scope_to_agency(R::query(ALIAS).filter_eq("id", id), ctx, ALIAS)
}

pub fn list_records<R>(repo: &dyn Repository<R>, request: &RequestSession) -> Response
where
    R: Record + Serialize,
{
    let (_, ctx) = match authz::authorize_scoped(request, None) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };

    match repo.find_all(&scoped_all::<R>(&ctx)) {
        Ok(items) => (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub fn get_record<R>(repo: &dyn Repository<R>, request: &RequestSession, id: &str) -> Response
where
    R: Record + Serialize,
{
    let (_, ctx) = match authz::authorize_scoped(request, None) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match repo.find_one(&scoped_by_id::<R>(&ctx, id)) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub fn delete_record<R: Record>(
    repo: &dyn Repository<R>,
    request: &RequestSession,
    id: &str,
    permission: Permission,
) -> Response {
    let (session, ctx) = match authz::authorize_scoped(request, Some(permission)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let id = match parse_id(id) {
        Ok(id) => id,
        Err(r) => return r,
    };

    match repo.delete(&scoped_by_id::<R>(&ctx, id)) {
        Ok(0) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        Ok(_) => {
            tracing::info!(table = R::TABLE, %id, user_id = %session.user_id, "record deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

/// Check that `client_id` is visible in `ctx` and belongs to `agency_id`.
pub fn client_in_agency(
    clients: &dyn Repository<Client>,
    ctx: &AgencyContext,
    client_id: RecordId,
    agency_id: AgencyId,
) -> Result<(), Response> {
    match clients.find_one(&scoped_by_id::<Client>(ctx, client_id)) {
        Ok(client) if client.agency_id == agency_id => Ok(()),
        Ok(_) | Err(agencyhub_infra::RepositoryError::NotFound) => Err(errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "unknown_client",
            "client does not exist in this agency",
        )),
        Err(e) => Err(errors::repository_error_to_response(e)),
    }
}
