//! Member database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for members table
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub id: i64,
    pub member_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub plan_id: Option<String>,
    pub plan_name: Option<String>,
    pub plan_enrolled_at: Option<DateTime<Utc>>,
    pub status: Option<String>,
    pub total_freeze_days_used: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
