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
use agencyhub_infra::{Reminder, Repository};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::RequestSession;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_reminders).post(create_reminder))
        .route("/:id", get(get_reminder).patch(update_reminder).delete(delete_reminder))
}

pub async fn list_reminders(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
) -> axum::response::Response {
    common::list_records(services.reminders.as_ref(), &request)
}

pub async fn get_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::get_record(services.reminders.as_ref(), &request, &id)
}

pub async fn delete_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::delete_record(services.reminders.as_ref(), &request, &id, Permission::ManageReminders)
}

pub async fn create_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    payload: Result<Json<dto::CreateReminderRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageReminders)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    if let Err(e) = dto::require_non_empty("title", &body.title) {
        return errors::domain_error_to_response(e);
    }

    let agency_id = match ctx.owning_agency(body.agency_id) {
        Ok(a) => a,
        Err(e) => return errors::scope_error_to_response(e),
    };

    let reminder = Reminder {
        id: RecordId::new(),
        agency_id,
        title: body.title.trim().to_string(),
        due_on: body.due_on,
        done: false,
    };

    match services.reminders.insert(reminder) {
        Ok(created) => (StatusCode::CREATED, Json(created)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_reminder(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateReminderRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageReminders)) {
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

    let query = common::scoped_by_id::<Reminder>(&ctx, id);
    let mut reminder = match services.reminders.find_one(&query) {
        Ok(r) => r,
        Err(e) => return errors::repository_error_to_response(e),
    };

    if let Some(title) = body.title {
        if let Err(e) = dto::require_non_empty("title", &title) {
            return errors::domain_error_to_response(e);
        }
        reminder.title = title.trim().to_string();
    }
    if let Some(due_on) = body.due_on {
        reminder.due_on = due_on;
    }
    if let Some(done) = body.done {
        reminder.done = done;
    }

    match services.reminders.update(&query, reminder) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
