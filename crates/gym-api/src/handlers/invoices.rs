//! Invoice handlers

use axum::{
    extract::{Path, State},
    Json,
};
use gym_service::dto::{CreateInvoiceRequest, InvoiceResponse, RecordPaymentRequest};
use gym_service::InvoiceService;

use crate::extractors::{InvoiceIdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Create an invoice for a member
///
/// POST /invoices
pub async fn create_invoice(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateInvoiceRequest>,
) -> ApiResult<Created<Json<InvoiceResponse>>> {
    let service = InvoiceService::new(state.service_context());
    let response = service.create_invoice(request).await?;
    Ok(Created(Json(response)))
}

/// Get invoice with pending balance and per-item status
///
/// GET /invoices/{invoice_id}
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(path): Path<InvoiceIdPath>,
) -> ApiResult<Json<InvoiceResponse>> {
    let invoice_id = path.invoice_id()?;
    let service = InvoiceService::new(state.service_context());
    Ok(Json(service.get_invoice(invoice_id).await?))
}

/// Record a payment against an invoice
///
/// POST /invoices/{invoice_id}/payments
pub async fn record_payment(
    State(state): State<AppState>,
    Path(path): Path<InvoiceIdPath>,
    ValidatedJson(request): ValidatedJson<RecordPaymentRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    let invoice_id = path.invoice_id()?;
    let service = InvoiceService::new(state.service_context());
    Ok(Json(service.record_payment(invoice_id, request).await?))
}
