//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chrono::{DateTime, Utc};
use gym_core::{InvoiceStatus, MembershipStatus, Snowflake, MAX_FREEZE_REASON_LEN};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use validator::Validate;

use super::de;

/// `MAX_FREEZE_REASON_LEN` typed as `u64`, as the `validator` length bound requires
const MAX_FREEZE_REASON_LEN_U64: u64 = MAX_FREEZE_REASON_LEN as u64;

// ============================================================================
// Member Requests
// ============================================================================

/// Plan the member enrolls on
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PlanRequest {
    #[validate(length(min = 1, max = 64, message = "Plan id must be 1-64 characters"))]
    pub plan_id: String,

    #[validate(length(min = 1, max = 100, message = "Plan name must be 1-100 characters"))]
    pub plan_name: String,

    /// Defaults to the time of enrollment
    #[serde(default, deserialize_with = "de::optional_date")]
    pub enrolled_at: Option<DateTime<Utc>>,
}

/// Enroll member request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EnrollMemberRequest {
    #[validate(length(min = 1, max = 32, message = "Member code must be 1-32 characters"))]
    pub member_code: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(max = 32, message = "Phone must be at most 32 characters"))]
    pub phone: Option<String>,

    #[validate(nested)]
    pub plan: Option<PlanRequest>,

    pub status: Option<MembershipStatus>,
}

// ============================================================================
// Invoice Requests
// ============================================================================

/// One line of a new invoice
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct InvoiceItemRequest {
    #[validate(length(min = 1, max = 200, message = "Description must be 1-200 characters"))]
    pub description: String,

    /// Free-text duration label, e.g. "3 months"
    #[validate(length(max = 64, message = "Duration must be at most 64 characters"))]
    pub duration: Option<String>,

    #[serde(default, deserialize_with = "de::optional_date")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "de::optional_date")]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Create invoice request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInvoiceRequest {
    #[validate(length(min = 1, max = 64, message = "Invoice number must be 1-64 characters"))]
    pub invoice_number: String,

    pub member_id: Snowflake,

    /// Defaults to `draft`
    pub status: Option<InvoiceStatus>,

    /// Minor currency units
    #[validate(range(min = 0, message = "Total must not be negative"))]
    pub total: i64,

    #[validate(length(min = 1, message = "An invoice needs at least one item"), nested)]
    pub items: Vec<InvoiceItemRequest>,
}

/// Record payment request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RecordPaymentRequest {
    /// Minor currency units
    #[validate(range(min = 1, message = "Payment amount must be positive"))]
    pub amount: i64,
}

// ============================================================================
// Ledger Requests
// ============================================================================

/// Change the date window of one invoice item
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChangeDateRequest {
    pub invoice_id: Snowflake,

    #[serde(deserialize_with = "de::index")]
    pub item_index: usize,

    #[serde(default, deserialize_with = "de::optional_date")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "de::optional_date")]
    pub expiry_date: Option<DateTime<Utc>>,
}

/// Freeze one invoice item and extend its expiry
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FreezeRequest {
    pub invoice_id: Snowflake,

    #[serde(deserialize_with = "de::index")]
    pub item_index: usize,

    #[serde(deserialize_with = "de::date")]
    pub start_date: DateTime<Utc>,

    #[serde(deserialize_with = "de::date")]
    pub end_date: DateTime<Utc>,

    #[validate(length(max = MAX_FREEZE_REASON_LEN_U64, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
}

impl FreezeRequest {
    /// Hex SHA-256 over everything that decides what the freeze does
    ///
    /// Dates hash in their parsed form, so `2024-03-01` and
    /// `2024-03-01T00:00:00Z` are the same request.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.invoice_id.to_string().as_bytes());
        hasher.update([0]);
        hasher.update(self.item_index.to_string().as_bytes());
        hasher.update([0]);
        hasher.update(self.start_date.to_rfc3339().as_bytes());
        hasher.update([0]);
        hasher.update(self.end_date.to_rfc3339().as_bytes());
        hasher.update([0]);
        match &self.reason {
            Some(reason) => {
                hasher.update([1]);
                hasher.update(reason.as_bytes());
            }
            None => hasher.update([0]),
        }
        format!("{:x}", hasher.finalize())
    }
}
