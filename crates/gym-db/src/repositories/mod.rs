//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in gym-core.

mod error;
mod invoice;
mod ledger;
mod member;

pub use invoice::PgInvoiceRepository;
pub use ledger::PgLedgerRepository;
pub use member::PgMemberRepository;
