//! Service lifecycle handlers
//!
//! Change-date and freeze on a single invoice item.

use axum::{extract::State, Json};
use gym_service::dto::{ChangeDateRequest, FreezeRequest, FreezeResponse, InvoiceResponse};
use gym_service::LedgerService;

use crate::extractors::{IdempotencyKey, StaffActor, ValidatedJson};
use crate::response::ApiResult;
use crate::state::AppState;

/// Move the start and/or expiry date of one service
///
/// POST /services/change-date
pub async fn change_date(
    State(state): State<AppState>,
    StaffActor(actor): StaffActor,
    ValidatedJson(request): ValidatedJson<ChangeDateRequest>,
) -> ApiResult<Json<InvoiceResponse>> {
    let service = LedgerService::new(state.service_context());
    Ok(Json(service.change_date(request, actor).await?))
}

/// Freeze one service, extending its expiry and debiting the member's budget
///
/// POST /services/freeze
pub async fn freeze(
    State(state): State<AppState>,
    StaffActor(actor): StaffActor,
    IdempotencyKey(key): IdempotencyKey,
    ValidatedJson(request): ValidatedJson<FreezeRequest>,
) -> ApiResult<Json<FreezeResponse>> {
    let service = LedgerService::new(state.service_context());
    let response = service.freeze(request, actor, key.as_deref()).await?;
    Ok(Json(response))
}
