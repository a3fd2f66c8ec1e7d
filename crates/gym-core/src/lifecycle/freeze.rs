//! Freeze-with-extension
//!
//! A freeze pauses a service by pushing its expiry out by the number of
//! frozen days and debiting the same number of days from the member's
//! allowance. Both happen together or not at all.

use chrono::{DateTime, Duration, Utc};

use super::window::freeze_day_count;
use crate::entities::{FreezeRecord, Invoice, Member};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

pub const MAX_FREEZE_REASON_LEN: usize = 500;

/// A freeze request, resolved to ids and UTC instants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreezeCommand {
    /// Id assigned to the resulting freeze record
    pub freeze_id: Snowflake,
    pub invoice_id: Snowflake,
    pub item_index: usize,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub reason: Option<String>,
    pub actor: Option<String>,
}

impl FreezeCommand {
    /// Checks that need neither the member nor the invoice
    ///
    /// Returns the inclusive day count.
    pub fn validate(&self) -> Result<u32, DomainError> {
        if let Some(reason) = &self.reason {
            if reason.chars().count() > MAX_FREEZE_REASON_LEN {
                return Err(DomainError::ValidationError(format!(
                    "Freeze reason must be at most {MAX_FREEZE_REASON_LEN} characters"
                )));
            }
        }
        freeze_day_count(self.start_date, self.end_date)
    }
}

/// Debit the member's allowance and extend the addressed item
///
/// Every check runs before anything is written, so on error both `member`
/// and `invoice` are exactly as they were passed in.
pub fn apply_freeze(
    member: &mut Member,
    invoice: &mut Invoice,
    command: &FreezeCommand,
    now: DateTime<Utc>,
) -> Result<FreezeRecord, DomainError> {
    let days = command.validate()?;

    if invoice.member_id != member.id {
        return Err(DomainError::InternalError(format!(
            "Invoice {} belongs to member {}, not {}",
            invoice.id, invoice.member_id, member.id
        )));
    }

    let previous_expiry = invoice.item(command.item_index)?.expiry_date.ok_or_else(|| {
        DomainError::ValidationError(format!(
            "Item {} has no expiry date to extend",
            command.item_index
        ))
    })?;
    let new_expiry = previous_expiry + Duration::days(i64::from(days));
    let budget = member.freeze_budget.try_debit(days)?;

    // validated; commit
    member.freeze_budget = budget;
    member.updated_at = now;
    invoice.item_mut(command.item_index)?.expiry_date = Some(new_expiry);
    invoice.updated_at = now;

    Ok(FreezeRecord {
        id: command.freeze_id,
        member_id: member.id,
        invoice_id: invoice.id,
        item_index: command.item_index,
        start_date: command.start_date,
        end_date: command.end_date,
        days,
        reason: command.reason.clone(),
        actor: command.actor.clone(),
        previous_expiry_date: previous_expiry,
        new_expiry_date: new_expiry,
        created_at: now,
    })
}
