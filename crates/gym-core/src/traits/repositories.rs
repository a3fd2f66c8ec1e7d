//! Repository traits (ports) - define the interface for data access
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation. Writes that must be atomic (payments, date
//! changes, freezes) are single trait methods so each backend can make them
//! atomic in its own way.

use async_trait::async_trait;

use crate::entities::{FreezeRecord, Invoice, Member};
use crate::error::DomainError;
use crate::lifecycle::{ChangeDates, FreezeCommand};
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Member Repository
// ============================================================================

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Find member by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Member>>;

    /// Find member by display code
    async fn find_by_code(&self, member_code: &str) -> RepoResult<Option<Member>>;

    /// Create a new member; `MemberCodeExists` on a duplicate code
    async fn create(&self, member: &Member) -> RepoResult<()>;
}

// ============================================================================
// Invoice Repository
// ============================================================================

#[async_trait]
pub trait InvoiceRepository: Send + Sync {
    /// Find invoice by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Invoice>>;

    /// All invoices of a member, oldest first
    async fn find_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<Invoice>>;

    /// Create a new invoice; `InvoiceNumberExists` on a duplicate number
    async fn create(&self, invoice: &Invoice) -> RepoResult<()>;

    /// Add a payment to the invoice and return it updated
    async fn record_payment(&self, invoice_id: Snowflake, amount: i64) -> RepoResult<Invoice>;
}

// ============================================================================
// Ledger Repository
// ============================================================================

/// Everything a successful freeze touched
#[derive(Debug, Clone)]
pub struct FreezeOutcome {
    pub invoice: Invoice,
    pub member: Member,
    pub record: FreezeRecord,
}

#[async_trait]
pub trait LedgerRepository: Send + Sync {
    /// Rewrite one item's date window; other items are untouched
    async fn change_item_dates(
        &self,
        invoice_id: Snowflake,
        item_index: usize,
        change: &ChangeDates,
    ) -> RepoResult<Invoice>;

    /// Debit the invoice owner's freeze budget, extend the item, and append
    /// the freeze record as one unit
    ///
    /// Concurrent calls for the same member are serialised: two freezes that
    /// together overdraw the budget never both succeed.
    async fn apply_freeze(&self, command: &FreezeCommand) -> RepoResult<FreezeOutcome>;

    /// Freeze history of a member, newest first
    async fn find_freezes_by_member(&self, member_id: Snowflake) -> RepoResult<Vec<FreezeRecord>>;
}
