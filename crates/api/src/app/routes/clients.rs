use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;

use agencyhub_auth::Permission;
use agencyhub_core::RecordId;
use agencyhub_infra::{Client, Repository};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::RequestSession;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/:id", get(get_client).patch(update_client).delete(delete_client))
}

pub async fn list_clients(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
) -> axum::response::Response {
    common::list_records(services.clients.as_ref(), &request)
}

pub async fn get_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::get_record(services.clients.as_ref(), &request, &id)
}

pub async fn delete_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::delete_record(services.clients.as_ref(), &request, &id, Permission::ManageClients)
}

pub async fn create_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    payload: Result<Json<dto::CreateClientRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageClients)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    if let Err(e) = dto::require_non_empty("name", &body.name).and_then(|_| dto::require_email(&body.email)) {
        return errors::domain_error_to_response(e);
    }

    let agency_id = match ctx.owning_agency(body.agency_id) {
        Ok(a) => a,
        Err(e) => return errors::scope_error_to_response(e),
    };

    let client = Client {
        id: RecordId::new(),
        agency_id,
        name: body.name.trim().to_string(),
        email: body.email.trim().to_string(),
        company: body.company,
        created_at: Utc::now(),
    };

    match services.clients.insert(client) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_client(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateClientRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageClients)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let id = match common::parse_id(&id) {
        Ok(id) => id,
        Err(r) => return r,
    };
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    let query = common::scoped_by_id::<Client>(&ctx, id);
    let mut client = match services.clients.find_one(&query) {
        Ok(c) => c,
        Err(e) => return errors::repository_error_to_response(e),
    };

    if let Some(name) = body.name {
        if let Err(e) = dto::require_non_empty("name", &name) {
            return errors::domain_error_to_response(e);
        }
        client.name = name.trim().to_string();
    }
    if let Some(email) = body.email {
        if let Err(e) = dto::require_email(&email) {
            return errors::domain_error_to_response(e);
        }
        client.email = email.trim().to_string();
    }
    if body.company.is_some() {
        client.company = body.company;
    }

    match services.clients.update(&query, client) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
