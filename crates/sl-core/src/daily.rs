//! Per-calendar-day sleep allocation.
//!
//! Each completed session is spread over the calendar days it touches:
//!
//! - a session that starts and ends on the same date adds its whole duration
//!   to that date;
//! - otherwise the sleep date gets the time left until midnight, the wake date
//!   gets the time since midnight, and every date strictly in between gets a
//!   full 24 hours.
//!
//! The pieces of a split session always sum to its duration.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::record::SleepEntry;

/// Sleep hours per local calendar date, ascending.
pub type DailyAllocation = BTreeMap<NaiveDate, f64>;

const SECONDS_PER_DAY: u32 = 24 * 60 * 60;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Splits one session into `(date, hours)` pieces, oldest date first.
///
/// Returns nothing for a session that does not end after it starts.
pub fn split_session(
    sleep_start: NaiveDateTime,
    wake_end: NaiveDateTime,
) -> Vec<(NaiveDate, f64)> {
    if wake_end <= sleep_start {
        return Vec::new();
    }

    let sleep_date = sleep_start.date();
    let wake_date = wake_end.date();

    if sleep_date == wake_date {
        let hours = SleepEntry::completed(sleep_start, wake_end)
            .hours()
            .unwrap_or_default();
        return vec![(sleep_date, hours)];
    }

    let until_midnight = SECONDS_PER_DAY - sleep_start.num_seconds_from_midnight();
    let since_midnight = wake_end.num_seconds_from_midnight();

    let mut pieces = vec![(sleep_date, f64::from(until_midnight) / SECONDS_PER_HOUR)];
    pieces.extend(
        sleep_date
            .iter_days()
            .skip(1)
            .take_while(|day| *day < wake_date)
            .map(|day| (day, 24.0)),
    );
    pieces.push((wake_date, f64::from(since_midnight) / SECONDS_PER_HOUR));
    pieces
}

/// Builds the daily allocation for all entries.
///
/// Keys run without gaps from the earliest sleep date (open entries included)
/// through `today`, or through the latest wake date if a record ends later.
/// Days without sleep hold 0.
pub fn allocate_daily(entries: &[SleepEntry], today: NaiveDate) -> DailyAllocation {
    let Some(first_day) = entries.iter().map(|e| e.sleep_start.date()).min() else {
        return DailyAllocation::new();
    };
    let last_day = entries
        .iter()
        .filter_map(|e| e.wake_end)
        .map(|wake| wake.date())
        .max()
        .map_or(today, |latest| latest.max(today));

    let mut daily: DailyAllocation = first_day
        .iter_days()
        .take_while(|day| *day <= last_day)
        .map(|day| (day, 0.0))
        .collect();

    for entry in entries {
        let Some(wake_end) = entry.wake_end else {
            continue;
        };
        if wake_end <= entry.sleep_start {
            tracing::warn!(
                sleep = %entry.sleep_start,
                wake = %wake_end,
                "ignoring record that does not end after it starts"
            );
            continue;
        }
        for (day, hours) in split_session(entry.sleep_start, wake_end) {
            *daily.entry(day).or_insert(0.0) += hours;
        }
    }

    daily
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        date(y, m, d).and_hms_opt(h, min, 0).unwrap()
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-9,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_overnight_session_splits_at_midnight() {
        let entries = [SleepEntry::completed(
            dt(2024, 1, 1, 23, 0),
            dt(2024, 1, 2, 7, 0),
        )];
        let daily = allocate_daily(&entries, date(2024, 1, 2));

        assert_eq!(daily.len(), 2);
        assert_close(daily[&date(2024, 1, 1)], 1.0);
        assert_close(daily[&date(2024, 1, 2)], 7.0);
    }

    #[test]
    fn test_multi_day_session_fills_intervening_days() {
        let entries = [SleepEntry::completed(
            dt(2024, 1, 1, 22, 0),
            dt(2024, 1, 4, 6, 0),
        )];
        let daily = allocate_daily(&entries, date(2024, 1, 4));

        let values: Vec<_> = daily.values().copied().collect();
        assert_eq!(values, vec![2.0, 24.0, 24.0, 6.0]);
    }

    #[test]
    fn test_session_just_over_a_day_fills_middle_day() {
        // 26 hours: one intervening calendar day even though the span is
        // less than two full days.
        let pieces = split_session(dt(2024, 1, 1, 23, 0), dt(2024, 1, 3, 1, 0));
        assert_eq!(
            pieces,
            vec![
                (date(2024, 1, 1), 1.0),
                (date(2024, 1, 2), 24.0),
                (date(2024, 1, 3), 1.0),
            ]
        );
    }

    #[test]
    fn test_same_day_session_adds_full_duration() {
        let entries = [
            SleepEntry::completed(dt(2024, 1, 1, 1, 0), dt(2024, 1, 1, 7, 30)),
            SleepEntry::completed(dt(2024, 1, 1, 14, 0), dt(2024, 1, 1, 14, 40)),
        ];
        let daily = allocate_daily(&entries, date(2024, 1, 1));
        assert_close(daily[&date(2024, 1, 1)], 7.17);
    }

    #[test]
    fn test_split_uses_minutes() {
        let pieces = split_session(dt(2024, 1, 1, 23, 45), dt(2024, 1, 2, 6, 15));
        assert_eq!(pieces, vec![(date(2024, 1, 1), 0.25), (date(2024, 1, 2), 6.25)]);
    }

    #[test]
    fn test_range_runs_through_today_with_zero_days() {
        let entries = [SleepEntry::completed(
            dt(2024, 1, 1, 23, 0),
            dt(2024, 1, 2, 7, 0),
        )];
        let daily = allocate_daily(&entries, date(2024, 1, 5));

        assert_eq!(daily.len(), 5);
        assert_close(daily[&date(2024, 1, 3)], 0.0);
        assert_close(daily[&date(2024, 1, 5)], 0.0);
    }

    #[test]
    fn test_open_entry_only_extends_range() {
        let entries = [
            SleepEntry::open(dt(2024, 1, 3, 23, 0)),
            SleepEntry::completed(dt(2024, 1, 2, 0, 30), dt(2024, 1, 2, 8, 0)),
        ];
        let daily = allocate_daily(&entries, date(2024, 1, 3));
        assert_eq!(daily.keys().next(), Some(&date(2024, 1, 2)));
        assert_close(daily[&date(2024, 1, 2)], 7.5);
        assert_close(daily[&date(2024, 1, 3)], 0.0);

        let only_open = [SleepEntry::open(dt(2024, 1, 1, 23, 0))];
        let daily = allocate_daily(&only_open, date(2024, 1, 2));
        assert_eq!(daily.len(), 2);
        assert!(daily.values().all(|hours| *hours == 0.0));
    }

    #[test]
    fn test_backwards_session_is_ignored() {
        let entries = [SleepEntry::completed(
            dt(2024, 1, 2, 7, 0),
            dt(2024, 1, 1, 23, 0),
        )];
        let daily = allocate_daily(&entries, date(2024, 1, 2));
        assert!(daily.values().all(|hours| *hours == 0.0));
        assert!(split_session(dt(2024, 1, 1, 7, 0), dt(2024, 1, 1, 7, 0)).is_empty());
    }

    #[test]
    fn test_wake_after_today_extends_range() {
        let entries = [SleepEntry::completed(
            dt(2024, 1, 1, 23, 0),
            dt(2024, 1, 3, 7, 0),
        )];
        let daily = allocate_daily(&entries, date(2024, 1, 1));
        assert_eq!(daily.keys().next_back(), Some(&date(2024, 1, 3)));
    }

    #[test]
    fn test_empty_entries() {
        assert!(allocate_daily(&[], date(2024, 1, 1)).is_empty());
    }

    mod proptest_tests {
        use super::*;
        use chrono::Duration;
        use proptest::prelude::*;

        fn base() -> NaiveDateTime {
            dt(2024, 1, 1, 0, 0)
        }

        proptest! {
            #[test]
            fn split_sums_to_duration(
                start_minutes in 0i64..525_600,
                duration_minutes in 1i64..(60 * 24 * 6)
            ) {
                let sleep = base() + Duration::minutes(start_minutes);
                let wake = sleep + Duration::minutes(duration_minutes);
                let hours = SleepEntry::completed(sleep, wake).hours().unwrap();
                let total: f64 = split_session(sleep, wake).iter().map(|(_, h)| h).sum();
                prop_assert!((total - hours).abs() <= 0.01,
                    "split total {} != duration {}", total, hours);
            }

            #[test]
            fn split_never_exceeds_a_day(
                start_minutes in 0i64..525_600,
                duration_minutes in 1i64..(60 * 24 * 6)
            ) {
                let sleep = base() + Duration::minutes(start_minutes);
                let wake = sleep + Duration::minutes(duration_minutes);
                for (_, hours) in split_session(sleep, wake) {
                    prop_assert!((0.0..=24.0).contains(&hours));
                }
            }

            #[test]
            fn keys_are_contiguous(
                sessions in prop::collection::vec((0i64..200_000, 1i64..3000), 1..20)
            ) {
                let entries: Vec<SleepEntry> = sessions
                    .iter()
                    .map(|(start, len)| {
                        let sleep = base() + Duration::minutes(*start);
                        SleepEntry::completed(sleep, sleep + Duration::minutes(*len))
                    })
                    .collect();
                let today = date(2024, 6, 1);
                let daily = allocate_daily(&entries, today);

                let first = entries.iter().map(|e| e.sleep_start.date()).min().unwrap();
                prop_assert_eq!(daily.keys().next().copied(), Some(first));
                prop_assert!(daily.contains_key(&today));

                let keys: Vec<_> = daily.keys().copied().collect();
                for pair in keys.windows(2) {
                    prop_assert_eq!(pair[1] - pair[0], Duration::days(1));
                }
            }
        }
    }
}
