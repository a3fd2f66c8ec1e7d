//! Member entity - a gym member enrolled at the club

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::{FreezeBudget, Snowflake};

/// Stored membership status
///
/// This is what staff last recorded. The status shown to users is derived on
/// read, see [`crate::lifecycle::actual_membership_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    Inactive,
    Expired,
    #[default]
    Pending,
    Suspended,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Expired => "expired",
            Self::Pending => "pending",
            Self::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "expired" => Ok(Self::Expired),
            "pending" => Ok(Self::Pending),
            "suspended" => Ok(Self::Suspended),
            other => Err(DomainError::ValidationError(format!(
                "Unknown membership status: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The plan a member is currently enrolled on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentPlan {
    pub plan_id: String,
    pub plan_name: String,
    pub enrolled_at: DateTime<Utc>,
}

/// Member entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: Snowflake,
    /// Human-facing member code printed on cards and receipts
    pub member_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub current_plan: Option<CurrentPlan>,
    pub status: Option<MembershipStatus>,
    pub freeze_budget: FreezeBudget,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Enroll a new member with an untouched freeze budget
    pub fn new(
        id: Snowflake,
        member_code: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            member_code: member_code.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: None,
            phone: None,
            current_plan: None,
            status: None,
            freeze_budget: FreezeBudget::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_plan(mut self, plan: CurrentPlan) -> Self {
        self.current_plan = Some(plan);
        self
    }

    pub fn with_status(mut self, status: MembershipStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Cumulative freeze days used across all services
    #[inline]
    pub fn total_freeze_days_used(&self) -> u32 {
        self.freeze_budget.used()
    }

    #[inline]
    pub fn remaining_freeze_days(&self) -> u32 {
        self.freeze_budget.remaining()
    }

    /// Consume freeze days from the member's allowance
    ///
    /// Leaves the member untouched on error.
    pub fn debit_freeze_days(&mut self, days: u32) -> Result<(), DomainError> {
        self.freeze_budget = self.freeze_budget.try_debit(days)?;
        self.updated_at = Utc::now();
        Ok(())
    }
}
