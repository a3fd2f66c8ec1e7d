//! Active/expired derivation
//!
//! Computed on every read from `(expiry_date, now)`; nothing here is stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::MembershipStatus;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Midnight UTC of the day containing `now`
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Whole days left on a service, rounded up, never negative
///
/// Measured from the start of today, so an expiry of exactly today's
/// midnight yields 0. No expiry yields 0.
pub fn days_remaining(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(expiry) = expiry_date else {
        return 0;
    };
    let millis = (expiry - start_of_day(now)).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

/// A service is active through the whole of its expiry day; open-ended services always are
pub fn is_active(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expiry_date.map_or(true, |expiry| expiry >= start_of_day(now))
}

/// Derived state of one service at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub is_active: bool,
    pub days_remaining: i64,
}

pub fn service_status(expiry_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> ServiceStatus {
    ServiceStatus {
        is_active: is_active(expiry_date, now),
        days_remaining: days_remaining(expiry_date, now),
    }
}

/// Status shown for a member: active if any service is, else what was stored
pub fn actual_membership_status<I>(stored: Option<MembershipStatus>, services: I) -> MembershipStatus
where
    I: IntoIterator<Item = ServiceStatus>,
{
    if services.into_iter().any(|s| s.is_active) {
        MembershipStatus::Active
    } else {
        stored.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_start_of_day() {
        assert_eq!(start_of_day(at(2024, 3, 1, 17)), at(2024, 3, 1, 0));
    }

    #[test]
    fn test_days_remaining_expiring_today_is_zero() {
        let today = at(2024, 3, 1, 0);
        assert_eq!(days_remaining(Some(today), today), 0);
        assert_eq!(days_remaining(Some(today), at(2024, 3, 1, 15)), 0);
    }

    #[test]
    fn test_days_remaining_rounds_up() {
        let now = at(2024, 3, 1, 9);
        assert_eq!(days_remaining(Some(at(2024, 3, 2, 0)), now), 1);
        assert_eq!(days_remaining(Some(at(2024, 3, 2, 1)), now), 2);
        assert_eq!(days_remaining(Some(at(2024, 3, 31, 0)), now), 30);
    }

    #[test]
    fn test_days_remaining_never_negative() {
        let now = at(2024, 3, 1, 9);
        assert_eq!(days_remaining(Some(now - Duration::days(40)), now), 0);
        assert_eq!(days_remaining(None, now), 0);
    }

    #[test]
    fn test_is_active_boundaries() {
        let now = at(2024, 3, 1, 20);
        assert!(is_active(None, now));
        assert!(is_active(Some(at(2024, 3, 1, 0)), now));
        assert!(!is_active(Some(at(2024, 2, 29, 23)), now));
    }

    #[test]
    fn test_actual_membership_status() {
        let active = ServiceStatus {
            is_active: true,
            days_remaining: 10,
        };
        let expired = ServiceStatus {
            is_active: false,
            days_remaining: 0,
        };

        assert_eq!(
            actual_membership_status(Some(MembershipStatus::Expired), [expired, active]),
            MembershipStatus::Active
        );
        assert_eq!(
            actual_membership_status(Some(MembershipStatus::Suspended), [expired]),
            MembershipStatus::Suspended
        );
        assert_eq!(actual_membership_status(None, []), MembershipStatus::Pending);
    }
}
