//! Invoice database model

use chrono::{DateTime, Utc};
use gym_core::entities::InvoiceItem;
use sqlx::types::Json;
use sqlx::FromRow;

/// Database model for invoices table
///
/// Items are kept as a JSONB array; an item's identity is its position.
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceModel {
    pub id: i64,
    pub invoice_number: String,
    pub member_id: i64,
    pub status: String,
    pub total: i64,
    pub total_paid: i64,
    pub items: Json<Vec<InvoiceItem>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
