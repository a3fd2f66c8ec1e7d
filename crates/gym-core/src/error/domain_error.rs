//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(Snowflake),

    #[error("Invoice not found: {0}")]
    InvoiceNotFound(Snowflake),

    #[error("Invoice {invoice_id} has no item at index {index}")]
    InvoiceItemNotFound { invoice_id: Snowflake, index: usize },

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Freeze of {requested} days exceeds remaining allowance of {remaining} days")]
    FreezeBudgetExceeded { requested: u32, remaining: u32 },

    #[error("Invoice is {0} and cannot accept payments")]
    InvoiceClosed(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Member code already in use: {0}")]
    MemberCodeExists(String),

    #[error("Invoice number already in use: {0}")]
    InvoiceNumberExists(String),

    #[error("A request with this idempotency key is still being processed")]
    IdempotencyKeyInFlight,

    #[error("Idempotency key was already used for a different request")]
    IdempotencyKeyReused,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::InvoiceNotFound(_) => "UNKNOWN_INVOICE",
            Self::InvoiceItemNotFound { .. } => "UNKNOWN_INVOICE_ITEM",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::FreezeBudgetExceeded { .. } => "FREEZE_BUDGET_EXCEEDED",
            Self::InvoiceClosed(_) => "INVOICE_CLOSED",

            // Conflict
            Self::MemberCodeExists(_) => "MEMBER_CODE_EXISTS",
            Self::InvoiceNumberExists(_) => "INVOICE_NUMBER_EXISTS",
            Self::IdempotencyKeyInFlight => "IDEMPOTENCY_KEY_IN_FLIGHT",
            Self::IdempotencyKeyReused => "IDEMPOTENCY_KEY_REUSED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MemberNotFound(_) | Self::InvoiceNotFound(_) | Self::InvoiceItemNotFound { .. }
        )
    }

    /// Check if this is a validation error (budget overdraws included)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_) | Self::FreezeBudgetExceeded { .. } | Self::InvoiceClosed(_)
        )
    }

    /// Check if this is a freeze budget overdraw
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, Self::FreezeBudgetExceeded { .. })
    }

    /// Well-formed request the current state cannot accept
    pub fn is_unprocessable(&self) -> bool {
        matches!(self, Self::FreezeBudgetExceeded { .. } | Self::IdempotencyKeyReused)
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::MemberCodeExists(_) | Self::InvoiceNumberExists(_) | Self::IdempotencyKeyInFlight
        )
    }

    /// Check if this is a storage/cache failure the caller may retry
    pub fn is_infrastructure(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::CacheError(_))
    }

    /// Structured numbers for clients to correct the request, if any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::FreezeBudgetExceeded { requested, remaining } => Some(serde_json::json!({
                "requested_days": requested,
                "remaining_freeze_days": remaining,
            })),
            Self::InvoiceItemNotFound { invoice_id, index } => Some(serde_json::json!({
                "invoice_id": invoice_id.to_string(),
                "item_index": index,
            })),
            _ => None,
        }
    }
}
