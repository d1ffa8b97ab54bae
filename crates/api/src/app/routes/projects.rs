use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use agencyhub_auth::Permission;
use agencyhub_core::RecordId;
use agencyhub_infra::{Project, Repository};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::RequestSession;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_projects).post(create_project))
        .route("/:id", get(get_project).patch(update_project).delete(delete_project))
}

pub async fn list_projects(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
) -> axum::response::Response {
    common::list_records(services.projects.as_ref(), &request)
}

pub async fn get_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::get_record(services.projects.as_ref(), &request, &id)
}

pub async fn delete_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::delete_record(services.projects.as_ref(), &request, &id, Permission::ManageProjects)
}

pub async fn create_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    payload: Result<Json<dto::CreateProjectRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageProjects)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    if let Err(e) = dto::require_non_empty("name", &body.name) {
        return errors::domain_error_to_response(e);
    }

    let agency_id = match ctx.owning_agency(body.agency_id) {
        Ok(a) => a,
        Err(e) => return errors::scope_error_to_response(e),
    };
    if let Err(r) = common::client_in_agency(services.clients.as_ref(), &ctx, body.client_id, agency_id) {
        return r;
    }

    let project = Project {
        id: RecordId::new(),
        agency_id,
        client_id: body.client_id,
        name: body.name.trim().to_string(),
        status: body.status.unwrap_or_default(),
    };

    match services.projects.insert(project) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_project(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateProjectRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageProjects)) {
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

    let query = common::scoped_by_id::<Project>(&ctx, id);
    let mut project = match services.projects.find_one(&query) {
        Ok(p) => p,
        Err(e) => return errors::repository_error_to_response(e),
    };

    if let Some(name) = body.name {
        if let Err(e) = dto::require_non_empty("name", &name) {
            return errors::domain_error_to_response(e);
        }
        project.name = name.trim().to_string();
    }
    if let Some(status) = body.status {
        project.status = status;
    }

    match services.projects.update(&query, project) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
