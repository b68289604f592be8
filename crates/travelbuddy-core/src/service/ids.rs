use std::sync::Mutex;

use chrono::{DateTime, Utc};
use tracing::warn;

/// Stored ids above this leave no room to count upward and are not tracked.
const MAX_TRACKED_ID: i64 = i64::MAX / 2;

/// Millisecond-timestamp ids that never repeat, even when several records
/// are created within the same millisecond.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: Mutex<i64>,
}

impl IdGenerator {
    pub(crate) fn next(&self, now: DateTime<Utc>) -> i64 {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let now_ms = now.timestamp_millis();
        let id = match last.checked_add(1) {
            Some(after) => now_ms.max(after),
            None => {
                warn!(last = *last, "Id counter exhausted, restarting from the clock");
                now_ms
            }
        };
        *last = id;
        id
    }

    /// Make sure later ids sort after `id`.
    pub(crate) fn observe(&self, id: i64) {
        if id > MAX_TRACKED_ID {
            warn!(id, "Ignoring out-of-range stored id");
            return;
        }
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        *last = (*last).max(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_same_millisecond_ids_are_distinct() {
        let ids = IdGenerator::default();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let first = ids.next(now);
        let second = ids.next(now);
        assert_eq!(first, now.timestamp_millis());
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_observed_ids_are_skipped() {
        let ids = IdGenerator::default();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        ids.observe(now.timestamp_millis() + 500);
        assert_eq!(ids.next(now), now.timestamp_millis() + 501);
    }

    #[test]
    fn test_huge_observed_id_is_ignored() {
        let ids = IdGenerator::default();
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        ids.observe(i64::MAX);
        assert_eq!(ids.next(now), now.timestamp_millis());
    }

    #[test]
    fn test_exhausted_counter_falls_back_to_clock() {
        let ids = IdGenerator {
            last: Mutex::new(i64::MAX),
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(ids.next(now), now.timestamp_millis());
        assert_eq!(ids.next(now), now.timestamp_millis() + 1);
    }
}
