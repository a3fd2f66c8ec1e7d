//! Freeze record - audit trail entry for one freeze-with-extension

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A freeze that was applied to a service
///
/// Written in the same atomic unit as the budget debit and the expiry
/// extension, so the history always sums to the member's used days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreezeRecord {
    pub id: Snowflake,
    pub member_id: Snowflake,
    pub invoice_id: Snowflake,
    pub item_index: usize,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days: u32,
    pub reason: Option<String>,
    /// Staff identity that requested the freeze, if known
    pub actor: Option<String>,
    pub previous_expiry_date: DateTime<Utc>,
    pub new_expiry_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
