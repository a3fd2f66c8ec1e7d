//! Optional ledger headers
//!
//! `x-staff-id` names the staff member acting at the front desk and is
//! recorded on freezes and date changes. `idempotency-key` makes a freeze
//! at-most-once.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::response::ApiError;

pub const STAFF_ID_HEADER: &str = "x-staff-id";
pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

const MAX_HEADER_VALUE_LEN: usize = 128;

fn optional_header(parts: &Parts, header: &'static str) -> Result<Option<String>, ApiError> {
    let Some(value) = parts.headers.get(header) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| ApiError::InvalidHeader {
            header,
            message: "must be visible ASCII".to_string(),
        })?
        .trim();

    if value.is_empty() {
        return Ok(None);
    }
    if value.len() > MAX_HEADER_VALUE_LEN {
        return Err(ApiError::InvalidHeader {
            header,
            message: format!("must be at most {MAX_HEADER_VALUE_LEN} characters"),
        });
    }
    Ok(Some(value.to_string()))
}

/// Acting staff member, if the caller named one
#[derive(Debug, Clone, Default)]
pub struct StaffActor(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for StaffActor
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        optional_header(parts, STAFF_ID_HEADER).map(StaffActor)
    }
}

/// Client-chosen key that deduplicates retries
#[derive(Debug, Clone, Default)]
pub struct IdempotencyKey(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for IdempotencyKey
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        optional_header(parts, IDEMPOTENCY_KEY_HEADER).map(IdempotencyKey)
    }
}
