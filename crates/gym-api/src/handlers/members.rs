//! Member handlers
//!
//! Enrollment and the member's view of their services and freezes.

use axum::{
    extract::{Path, State},
    Json,
};
use gym_service::dto::{EnrollMemberRequest, FreezeRecordResponse, MemberResponse, ServiceResponse};
use gym_service::MemberService;

use crate::extractors::{MemberIdPath, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Enroll a new member
///
/// POST /members
pub async fn enroll_member(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EnrollMemberRequest>,
) -> ApiResult<Created<Json<MemberResponse>>> {
    let service = MemberService::new(state.service_context());
    let response = service.enroll(request).await?;
    Ok(Created(Json(response)))
}

/// Get member with derived status and freeze budget
///
/// GET /members/{member_id}
pub async fn get_member(
    State(state): State<AppState>,
    Path(path): Path<MemberIdPath>,
) -> ApiResult<Json<MemberResponse>> {
    let member_id = path.member_id()?;
    let service = MemberService::new(state.service_context());
    Ok(Json(service.get_member(member_id).await?))
}

/// List every service (invoice item) of a member
///
/// GET /members/{member_id}/services
pub async fn list_member_services(
    State(state): State<AppState>,
    Path(path): Path<MemberIdPath>,
) -> ApiResult<Json<Vec<ServiceResponse>>> {
    let member_id = path.member_id()?;
    let service = MemberService::new(state.service_context());
    Ok(Json(service.list_services(member_id).await?))
}

/// Freeze history, newest first
///
/// GET /members/{member_id}/freezes
pub async fn list_member_freezes(
    State(state): State<AppState>,
    Path(path): Path<MemberIdPath>,
) -> ApiResult<Json<Vec<FreezeRecordResponse>>> {
    let member_id = path.member_id()?;
    let service = MemberService::new(state.service_context());
    Ok(Json(service.list_freezes(member_id).await?))
}
