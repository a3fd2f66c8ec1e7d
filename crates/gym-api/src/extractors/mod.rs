//! Axum extractors for request handling
//!
//! Custom extractors for validated bodies, id path parameters and the
//! ledger's optional request headers.

mod headers;
mod path;
mod validated;

pub use headers::{IdempotencyKey, StaffActor, IDEMPOTENCY_KEY_HEADER, STAFF_ID_HEADER};
pub use path::{InvoiceIdPath, MemberIdPath};
pub use validated::ValidatedJson;
