//! Domain entities - core business objects

mod freeze;
mod invoice;
mod member;

pub use freeze::FreezeRecord;
pub use invoice::{Invoice, InvoiceItem, InvoiceStatus};
pub use member::{CurrentPlan, Member, MembershipStatus};
