//! Storage backends for Concierge.
//!
//! Two stores live here: the per-session message history and the customer
//! table that the capability tools read and write. Each has an in-memory
//! implementation and a SQLite one.

pub mod in_memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use in_memory::{InMemoryCustomers, InMemoryHistory};

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteCustomers, SqliteHistory, open_pool};

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Timestamp for the next message of a session.
///
/// Stores keep microsecond precision, so the clock is truncated to it. When
/// the clock has not moved past the session's latest message (same tick, or
/// the wall clock stepped backwards) the previous timestamp is bumped by one
/// microsecond.
pub fn next_timestamp(last: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    let now = now
        .duration_trunc(Duration::microseconds(1))
        .unwrap_or(now);
    match last {
        Some(prev) if prev >= now => prev + Duration::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_timestamp_is_now() {
        let before = Utc::now() - Duration::seconds(1);
        assert!(next_timestamp(None) > before);
    }

    #[test]
    fn timestamp_after_future_message_is_bumped() {
        let future = Utc::now() + Duration::seconds(60);
        assert_eq!(next_timestamp(Some(future)), future + Duration::microseconds(1));
    }

    #[test]
    fn timestamps_strictly_increase() {
        let mut last = None;
        for _ in 0..100 {
            let ts = next_timestamp(last);
            if let Some(prev) = last {
                assert!(ts > prev);
            }
            last = Some(ts);
        }
    }
}
