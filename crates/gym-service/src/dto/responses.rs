//! Response DTOs for API endpoints
//!
//! Snowflake IDs are serialized as strings for JavaScript compatibility.
//! Derived fields (`is_active`, `days_remaining`, `pending`, the actual
//! membership status) are computed when the response is built, never stored.

use chrono::{DateTime, Utc};
use gym_core::{InvoiceStatus, MembershipStatus};
use serde::{Deserialize, Serialize};

// ============================================================================
// Member Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub plan_id: String,
    pub plan_name: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Freeze allowance of a member
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FreezeBudgetResponse {
    pub used: u32,
    pub remaining: u32,
    pub budget: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub id: String,
    pub member_code: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_plan: Option<PlanResponse>,
    /// What staff last recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored_status: Option<MembershipStatus>,
    /// `active` whenever any service is running
    pub status: MembershipStatus,
    pub freeze_budget: FreezeBudgetResponse,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One invoice item seen from the member's side
#[derive(Debug, Clone, Serialize)]
pub struct ServiceResponse {
    pub invoice_id: String,
    pub invoice_number: String,
    pub item_index: usize,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub days_remaining: i64,
}

// ============================================================================
// Invoice Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItemResponse {
    pub item_index: usize,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub days_remaining: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub invoice_number: String,
    pub member_id: String,
    pub status: InvoiceStatus,
    pub total: i64,
    pub total_paid: i64,
    pub pending: i64,
    pub items: Vec<InvoiceItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Ledger Responses
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeRecordResponse {
    pub id: String,
    pub member_id: String,
    pub invoice_id: String,
    pub item_index: usize,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
    pub previous_expiry_date: DateTime<Utc>,
    pub new_expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of a freeze
///
/// Also the body stored for idempotent replay, hence `Deserialize`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FreezeResponse {
    pub invoice: InvoiceResponse,
    pub total_freeze_days_used: u32,
    pub remaining_freeze_days: u32,
    pub freeze: FreezeRecordResponse,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each backing service
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub storage: String,
    pub cache: String,
}

fn probe_label(healthy: bool) -> String {
    if healthy { "healthy" } else { "unhealthy" }.to_string()
}

impl ReadinessResponse {
    pub fn ready(storage_healthy: bool, cache_healthy: bool) -> Self {
        Self {
            status: if storage_healthy && cache_healthy {
                "ready"
            } else {
                "not_ready"
            }
            .to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                storage: probe_label(storage_healthy),
                cache: probe_label(cache_healthy),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        self.status == "ready"
    }
}
