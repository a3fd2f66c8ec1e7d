//! Service lifecycle rules
//!
//! Pure functions over members and invoice items: date-window changes,
//! freeze-with-extension, and active/expired status derivation. Repositories
//! call into these so the same rules hold for every storage backend.

mod freeze;
mod status;
mod window;

pub use freeze::{apply_freeze, FreezeCommand, MAX_FREEZE_REASON_LEN};
pub use status::{
    actual_membership_status, days_remaining, is_active, service_status, start_of_day,
    ServiceStatus,
};
pub use window::{apply_change_dates, freeze_day_count, ChangeDates, DateWindow};
