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
use agencyhub_infra::{Invoice, Repository};

use crate::app::routes::common;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::authz;
use crate::context::RequestSession;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_invoices).post(create_invoice))
        .route("/:id", get(get_invoice).patch(update_invoice).delete(delete_invoice))
}

pub async fn list_invoices(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
) -> axum::response::Response {
    common::list_records(services.invoices.as_ref(), &request)
}

pub async fn get_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::get_record(services.invoices.as_ref(), &request, &id)
}

pub async fn delete_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
) -> axum::response::Response {
    common::delete_record(services.invoices.as_ref(), &request, &id, Permission::ManageInvoices)
}

pub async fn create_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    payload: Result<Json<dto::CreateInvoiceRequest>, JsonRejection>,
) -> axum::response::Response {
    let (session, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageInvoices)) {
        Ok(v) => v,
        Err(r) => return r.into_response(),
    };
    let body = match common::json_body(payload) {
        Ok(b) => b,
        Err(r) => return r,
    };

    if let Err(e) = dto::require_non_empty("number", &body.number)
        .and_then(|_| dto::require_non_negative("amount_cents", body.amount_cents))
    {
        return errors::domain_error_to_response(e);
    }

    let agency_id = match ctx.owning_agency(body.agency_id) {
        Ok(a) => a,
        Err(e) => return errors::scope_error_to_response(e),
    };
    if let Err(r) = common::client_in_agency(services.clients.as_ref(), &ctx, body.client_id, agency_id) {
        return r;
    }

    let invoice = Invoice {
        id: RecordId::new(),
        agency_id,
        client_id: body.client_id,
        number: body.number.trim().to_string(),
        amount_cents: body.amount_cents,
        paid: false,
    };

    match services.invoices.insert(invoice) {
        Ok(created) => {
            tracing::info!(invoice_id = %created.id, %agency_id, user_id = %session.user_id, "invoice issued");
            (StatusCode::CREATED, Json(created)).into_response()
        }
        Err(e) => errors::repository_error_to_response(e),
    }
}

pub async fn update_invoice(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(request): Extension<RequestSession>,
    Path(id): Path<String>,
    payload: Result<Json<dto::UpdateInvoiceRequest>, JsonRejection>,
) -> axum::response::Response {
    let (_, ctx) = match authz::authorize_scoped(&request, Some(Permission::ManageInvoices)) {
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

    let query = common::scoped_by_id::<Invoice>(&ctx, id);
    let mut invoice = match services.invoices.find_one(&query) {
        Ok(i) => i,
        Err(e) => return errors::repository_error_to_response(e),
    };

    if let Some(amount_cents) = body.amount_cents {
        if let Err(e) = dto::require_non_negative("amount_cents", amount_cents) {
            return errors::domain_error_to_response(e);
        }
        invoice.amount_cents = amount_cents;
    }
    if let Some(paid) = body.paid {
        invoice.paid = paid;
    }

    match services.invoices.update(&query, invoice) {
        Ok(updated) => (StatusCode::OK, Json(updated)).into_response(),
        Err(e) => errors::repository_error_to_response(e),
    }
}
