//! Database models
//!
//! Row shapes as stored in PostgreSQL. Conversions to domain entities live in
//! [`crate::mappers`].

mod freeze;
mod invoice;
mod member;

pub use freeze::FreezeModel;
pub use invoice::InvoiceModel;
pub use member::MemberModel;
