use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// `end = now`, `start = now - years * 365 days`. Leap days are ignored on
/// purpose; the lookback is a calendar-day approximation.
pub fn resolve_window(lookback_years: u32, now_utc: DateTime<Utc>) -> DateWindow {
    let start = now_utc - Duration::days(i64::from(lookback_years) * DAYS_PER_YEAR);
    DateWindow {
        start,
        end: now_utc,
    }
}
