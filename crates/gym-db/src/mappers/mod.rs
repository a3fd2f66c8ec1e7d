//! Entity to model mappers
//!
//! - `TryFrom<Model> for Entity`: rows to domain objects, failing on values
//!   the domain cannot represent
//! - `*Insert` structs: entity data prepared for binding

mod freeze;
mod invoice;
mod member;

pub use freeze::FreezeInsert;
pub use invoice::InvoiceInsert;
pub use member::MemberInsert;

use gym_core::error::DomainError;

/// A stored value that does not fit its domain type
pub(crate) fn corrupt(column: &str, value: impl std::fmt::Display) -> DomainError {
    DomainError::DatabaseError(format!("Unexpected value in column {column}: {value}"))
}
