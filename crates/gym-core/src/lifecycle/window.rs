//! Date windows on invoice items and the change-date rule

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::Invoice;
use crate::error::DomainError;

/// An item's access window; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateWindow {
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl DateWindow {
    pub const fn new(start_date: Option<DateTime<Utc>>, expiry_date: Option<DateTime<Utc>>) -> Self {
        Self {
            start_date,
            expiry_date,
        }
    }

    /// `expiry >= start` when both ends are known
    pub fn is_ordered(&self) -> bool {
        match (self.start_date, self.expiry_date) {
            (Some(start), Some(expiry)) => expiry >= start,
            _ => true,
        }
    }
}

/// Requested change to one item's window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChangeDates {
    pub start_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
}

impl ChangeDates {
    /// Check the request on its own, before any item is looked at
    pub fn validate(&self) -> Result<(), DomainError> {
        match (self.start_date, self.expiry_date) {
            (None, None) => Err(DomainError::ValidationError(
                "At least one of start_date or expiry_date is required".to_string(),
            )),
            (Some(start), Some(expiry)) if start >= expiry => Err(DomainError::ValidationError(
                "start_date must be before expiry_date".to_string(),
            )),
            _ => Ok(()),
        }
    }

    /// The window that results from applying this change to `current`
    pub fn merge(&self, current: DateWindow) -> DateWindow {
        DateWindow {
            start_date: self.start_date.or(current.start_date),
            expiry_date: self.expiry_date.or(current.expiry_date),
        }
    }
}

/// Rewrite the window of `invoice.items[index]`
///
/// Nothing is written unless the request and the merged window are both valid.
pub fn apply_change_dates(
    invoice: &mut Invoice,
    index: usize,
    change: &ChangeDates,
) -> Result<DateWindow, DomainError> {
    change.validate()?;

    let item = invoice.item_mut(index)?;
    let window = change.merge(item.window());
    if !window.is_ordered() {
        return Err(DomainError::ValidationError(
            "Resulting expiry_date would be before start_date".to_string(),
        ));
    }

    item.start_date = window.start_date;
    item.expiry_date = window.expiry_date;
    invoice.updated_at = Utc::now();
    Ok(window)
}

/// Inclusive day count of a freeze window: both boundary days count
///
/// # Errors
/// `ValidationError` when `start >= end`.
pub fn freeze_day_count(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<u32, DomainError> {
    if start >= end {
        return Err(DomainError::ValidationError(
            "Freeze start_date must be before end_date".to_string(),
        ));
    }
    let days = (end - start).num_days() + 1;
    u32::try_from(days)
        .ok()
        .filter(|d| *d > 0)
        .ok_or_else(|| DomainError::ValidationError(format!("Invalid freeze length: {days} days")))
}
