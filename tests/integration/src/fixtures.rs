//! Test fixtures and data generators
//!
//! Request bodies are plain JSON so the tests exercise the same lenient
//! formats (string ids, `YYYY-MM-DD` dates) a front-desk form sends.

use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Enrollment body with a unique member code
pub fn enroll_member_body() -> Value {
    let suffix = unique_suffix();
    json!({
        "member_code": format!("GYM-{suffix}"),
        "first_name": "Test",
        "last_name": format!("Member {suffix}"),
        "email": format!("member{suffix}@example.com"),
        "plan": {"plan_id": "gold", "plan_name": "Gold"}
    })
}

/// Invoice body with one dated service and one open-ended service
pub fn invoice_body(member_id: &str, start_date: &str, expiry_date: &str) -> Value {
    let suffix = unique_suffix();
    json!({
        "invoice_number": format!("INV-{suffix}"),
        "member_id": member_id,
        "total": 12000,
        "items": [
            {"description": "Annual membership", "duration": "12 months",
             "start_date": start_date, "expiry_date": expiry_date},
            {"description": "Locker"}
        ]
    })
}

pub fn freeze_body(invoice_id: &str, item_index: usize, start_date: &str, end_date: &str) -> Value {
    json!({
        "invoice_id": invoice_id,
        "item_index": item_index,
        "start_date": start_date,
        "end_date": end_date,
        "reason": "Travel"
    })
}

#[derive(Debug, Deserialize)]
pub struct FreezeBudget {
    pub used: u32,
    pub remaining: u32,
    pub budget: u32,
}

#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub id: String,
    pub member_code: String,
    pub status: String,
    pub stored_status: Option<String>,
    pub freeze_budget: FreezeBudget,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceItemResponse {
    pub item_index: usize,
    pub description: String,
    pub start_date: Option<String>,
    pub expiry_date: Option<String>,
    pub is_active: bool,
    pub days_remaining: i64,
}

#[derive(Debug, Deserialize)]
pub struct InvoiceResponse {
    pub id: String,
    pub member_id: String,
    pub status: String,
    pub total: i64,
    pub total_paid: i64,
    pub pending: i64,
    pub items: Vec<InvoiceItemResponse>,
}

#[derive(Debug, Deserialize)]
pub struct ServiceResponse {
    pub invoice_id: String,
    pub item_index: usize,
    pub is_active: bool,
    pub days_remaining: i64,
}

#[derive(Debug, Deserialize)]
pub struct FreezeRecordResponse {
    pub id: String,
    pub days: u32,
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub previous_expiry_date: String,
    pub new_expiry_date: String,
}

#[derive(Debug, Deserialize)]
pub struct FreezeResponse {
    pub invoice: InvoiceResponse,
    pub total_freeze_days_used: u32,
    pub remaining_freeze_days: u32,
    pub freeze: FreezeRecordResponse,
}
