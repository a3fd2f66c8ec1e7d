//! Freeze record database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for service_freezes table
#[derive(Debug, Clone, FromRow)]
pub struct FreezeModel {
    pub id: i64,
    pub member_id: i64,
    pub invoice_id: i64,
    pub item_index: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days: i32,
    pub reason: Option<String>,
    pub actor: Option<String>,
    pub previous_expiry_date: DateTime<Utc>,
    pub new_expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
