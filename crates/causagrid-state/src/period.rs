//! Period-key computation in the business timezone.
//!
//! Statistics are bucketed by the calendar day and hour of the
//! jurisdiction the records belong to, which sits at a fixed UTC−3
//! (no DST currently). Binding period keys to this offset — never to
//! server-local time — keeps a late-night report attributed to the
//! same day no matter where the worker runs.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Timelike, Utc};

/// Business timezone offset from UTC, in seconds.
const BUSINESS_OFFSET_SECS: i32 = -3 * 3600;

fn business_offset() -> FixedOffset {
    // -3h is always in range for FixedOffset.
    FixedOffset::east_opt(BUSINESS_OFFSET_SECS).expect("fixed offset in range")
}

fn business_datetime(epoch: u64) -> DateTime<FixedOffset> {
    let utc = DateTime::<Utc>::from_timestamp(epoch as i64, 0).unwrap_or_default();
    utc.with_timezone(&business_offset())
}

/// Current unix time in seconds.
pub fn now_epoch() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Calendar date (`YYYY-MM-DD`) of the given epoch in the business timezone.
pub fn business_date(epoch: u64) -> String {
    business_datetime(epoch).format("%Y-%m-%d").to_string()
}

/// Hour of day (0–23) of the given epoch in the business timezone.
pub fn business_hour(epoch: u64) -> u8 {
    business_datetime(epoch).hour() as u8
}

/// Weekday (Monday = 1 … Sunday = 7) of the given epoch in the business timezone.
pub fn business_weekday(epoch: u64) -> u8 {
    business_datetime(epoch).weekday().number_from_monday() as u8
}

/// The date string one calendar day before `date`.
///
/// Falls back to the input when it does not parse as `YYYY-MM-DD`.
pub fn previous_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.pred_opt())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| date.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2026-03-15 12:00:00 UTC → 09:00 UTC−3, same date.
    const MIDDAY: u64 = 1773576000;

    #[test]
    fn midday_keeps_the_utc_date() {
        assert_eq!(business_date(MIDDAY), "2026-03-15");
        assert_eq!(business_hour(MIDDAY), 9);
    }

    #[test]
    fn early_utc_morning_is_previous_business_day() {
        // 2026-03-15 01:30 UTC is 22:30 on the 14th at UTC−3.
        let epoch = MIDDAY - 10 * 3600 - 30 * 60;
        assert_eq!(business_date(epoch), "2026-03-14");
        assert_eq!(business_hour(epoch), 22);
    }

    #[test]
    fn weekday_is_monday_based() {
        // 2026-03-15 is a Sunday.
        assert_eq!(business_weekday(MIDDAY), 7);
        assert_eq!(business_weekday(MIDDAY + 24 * 3600), 1);
    }

    #[test]
    fn previous_date_crosses_month_and_year() {
        assert_eq!(previous_date("2026-03-01"), "2026-02-28");
        assert_eq!(previous_date("2026-01-01"), "2025-12-31");
        assert_eq!(previous_date("2024-03-01"), "2024-02-29");
    }

    #[test]
    fn previous_date_of_garbage_is_identity() {
        assert_eq!(previous_date("not-a-date"), "not-a-date");
    }
}
