//! Daily schedule alignment.
//!
//! The engine runs once at startup and then daily at a fixed hour; the
//! first sleep aligns the loop to the next occurrence of that hour.

use chrono::{DateTime, Duration, NaiveTime, Utc};

/// Delay from `now` until the next occurrence of `hour:00:00` UTC.
pub fn next_run_delay(now: DateTime<Utc>, hour: u32) -> std::time::Duration {
    let run_time = NaiveTime::from_hms_opt(hour.min(23), 0, 0)
        .unwrap_or(NaiveTime::MIN);
    let mut next = now.date_naive().and_time(run_time).and_utc();
    if next <= now {
        next += Duration::days(1);
    }
    (next - now).to_std().unwrap_or_default()
}
