//! Time entry duration rules.

use crate::error::CoreError;
use crate::types::Timestamp;

/// Whole minutes between `started_at` and `ended_at`.
///
/// The end must be strictly after the start. There is no upper bound: an
/// entry left running overnight can still be stopped at the current time.
pub fn entry_minutes(started_at: Timestamp, ended_at: Timestamp) -> Result<i64, CoreError> {
    if ended_at <= started_at {
        return Err(CoreError::Validation(
            "ended_at: must be after started_at".into(),
        ));
    }
    Ok((ended_at - started_at).num_minutes())
}

/// Minutes for an optional end; a running entry counts as zero.
pub fn optional_entry_minutes(
    started_at: Timestamp,
    ended_at: Option<Timestamp>,
) -> Result<i64, CoreError> {
    match ended_at {
        Some(end) => entry_minutes(started_at, end),
        None => Ok(0),
    }
}

/// Render minutes as `H:MM` for exports and summaries.
pub fn format_minutes(minutes: i64) -> String {
    let sign = if minutes < 0 { "-" } else { "" };
    let minutes = minutes.abs();
    format!("{sign}{}:{:02}", minutes / 60, minutes % 60)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 3, 4, h, m, 0).unwrap()
    }

    #[test]
    fn minutes_between_start_and_end() {
        assert_eq!(entry_minutes(at(9, 0), at(10, 30)).unwrap(), 90);
    }

    #[test]
    fn partial_minutes_are_truncated() {
        let end = at(9, 0) + Duration::seconds(119);
        assert_eq!(entry_minutes(at(9, 0), end).unwrap(), 1);
    }

    #[test]
    fn end_must_follow_start() {
        assert_matches!(entry_minutes(at(9, 0), at(9, 0)), Err(CoreError::Validation(_)));
        assert_matches!(entry_minutes(at(10, 0), at(9, 0)), Err(CoreError::Validation(_)));
    }

    #[test]
    fn entries_left_running_past_a_day_can_be_stopped() {
        let end = at(9, 0) + Duration::hours(30);
        assert_eq!(entry_minutes(at(9, 0), end).unwrap(), 30 * 60);
    }

    #[test]
    fn running_entry_counts_zero() {
        assert_eq!(optional_entry_minutes(at(9, 0), None).unwrap(), 0);
    }

    #[test]
    fn format_hours_and_minutes() {
        assert_eq!(format_minutes(0), "0:00");
        assert_eq!(format_minutes(95), "1:35");
        assert_eq!(format_minutes(-61), "-1:01");
    }
}
