//! # gym-core
//!
//! Domain layer containing members, invoices, the service lifecycle rules
//! (freeze budget, date windows, active/expired derivation), repository traits,
//! and domain events. This crate has zero dependencies on infrastructure
//! (database, web framework, etc.).

pub mod entities;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    CurrentPlan, FreezeRecord, Invoice, InvoiceItem, InvoiceStatus, Member, MembershipStatus,
};
pub use error::DomainError;
pub use events::DomainEvent;
pub use lifecycle::{
    actual_membership_status, apply_change_dates, apply_freeze, days_remaining, freeze_day_count,
    is_active, service_status, start_of_day, ChangeDates, DateWindow, FreezeCommand, ServiceStatus,
    MAX_FREEZE_REASON_LEN,
};
pub use traits::{
    EventPublisher, FreezeOutcome, IdempotencyStore, InvoiceRepository, LedgerRepository,
    MemberRepository, RepoResult, Reservation,
};
pub use value_objects::{
    FreezeBudget, Snowflake, SnowflakeGenerator, SnowflakeParseError, FREEZE_DAY_BUDGET,
};
