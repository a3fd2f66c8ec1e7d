//! Freeze-day budget - the per-member allowance of service-pause days
//!
//! Every member may freeze their services for at most [`FREEZE_DAY_BUDGET`]
//! days over their whole tenure. The allowance is shared across all of the
//! member's services and is never replenished.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Lifetime freeze allowance per member, in days
pub const FREEZE_DAY_BUDGET: u32 = 30;

/// Freeze days consumed by a member
///
/// The only way to grow the counter is [`FreezeBudget::try_debit`], which
/// refuses any debit that would take `used` past the budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FreezeBudget {
    used: u32,
}

impl FreezeBudget {
    /// Rehydrate a budget from a stored counter
    ///
    /// Values above the budget (legacy data) are kept as-is so that
    /// `remaining()` reports zero rather than hiding the overdraw.
    pub const fn with_used(used: u32) -> Self {
        Self { used }
    }

    /// Total freeze days used so far
    #[inline]
    pub const fn used(&self) -> u32 {
        self.used
    }

    /// Freeze days still available
    #[inline]
    pub const fn remaining(&self) -> u32 {
        FREEZE_DAY_BUDGET.saturating_sub(self.used)
    }

    /// The fixed policy ceiling
    #[inline]
    pub const fn limit(&self) -> u32 {
        FREEZE_DAY_BUDGET
    }

    /// Whether `days` more freeze days fit in the remaining allowance
    #[inline]
    pub const fn can_cover(&self, days: u32) -> bool {
        days <= self.remaining()
    }

    /// Debit `days` from the allowance, returning the new budget
    ///
    /// # Errors
    /// `ValidationError` for a zero-day debit, `FreezeBudgetExceeded` when
    /// `days` is larger than what remains.
    pub fn try_debit(self, days: u32) -> Result<Self, DomainError> {
        if days == 0 {
            return Err(DomainError::ValidationError(
                "Freeze must cover at least one day".to_string(),
            ));
        }
        if !self.can_cover(days) {
            return Err(DomainError::FreezeBudgetExceeded {
                requested: days,
                remaining: self.remaining(),
            });
        }
        Ok(Self {
            used: self.used + days,
        })
    }
}
