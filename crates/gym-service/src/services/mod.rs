//! Business logic services
//!
//! Each service borrows the [`ServiceContext`] for the duration of a request
//! and orchestrates repositories, lifecycle rules and event publishing.

pub mod context;
pub mod error;
pub mod invoice;
pub mod ledger;
pub mod member;

pub use context::{ServiceContext, ServiceContextBuilder};
pub use error::{ServiceError, ServiceResult};
pub use invoice::InvoiceService;
pub use ledger::LedgerService;
pub use member::MemberService;
