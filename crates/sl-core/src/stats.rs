//! Summary and rolling statistics.
//!
//! Rolling averages look only at settled days: everything up to and including
//! yesterday. Today's total is still growing and is never averaged.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::daily::{DailyAllocation, allocate_daily};
use crate::record::SleepEntry;
use crate::timestamp;

/// Trailing window sizes, in days, for rolling averages.
pub const ROLLING_WINDOWS: [usize; 9] = [1, 2, 3, 7, 30, 60, 90, 180, 365];

/// Days shown in the chart window.
pub const CHART_DAYS: usize = 30;

/// Rounds to two decimal places, halves away from zero.
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    round2(values.iter().sum::<f64>() / values.len() as f64)
}

/// Average daily sleep over a trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingAverage {
    /// Window size in days.
    pub days: usize,
    /// Mean hours per day, rounded to two decimals.
    pub average: f64,
}

/// Hours slept on one date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyHours {
    pub date: NaiveDate,
    pub hours: f64,
}

/// Rolling averages for every window in [`ROLLING_WINDOWS`].
///
/// A window longer than the settled history averages over all of it rather
/// than padding with zeros.
pub fn rolling_averages(daily: &DailyAllocation, yesterday: NaiveDate) -> Vec<RollingAverage> {
    let settled: Vec<f64> = daily.range(..=yesterday).map(|(_, hours)| *hours).collect();

    ROLLING_WINDOWS
        .iter()
        .map(|&days| RollingAverage {
            days,
            average: mean(&settled[settled.len().saturating_sub(days)..]),
        })
        .collect()
}

/// The last [`CHART_DAYS`] settled days, oldest first.
pub fn chart_window(daily: &DailyAllocation, yesterday: NaiveDate) -> Vec<DailyHours> {
    let settled: Vec<DailyHours> = daily
        .range(..=yesterday)
        .map(|(date, hours)| DailyHours {
            date: *date,
            hours: *hours,
        })
        .collect();
    settled[settled.len().saturating_sub(CHART_DAYS)..].to_vec()
}

/// Daily allocation together with the figures derived from it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    pub daily: DailyAllocation,
    pub averages: Vec<RollingAverage>,
    pub chart: Vec<DailyHours>,
}

/// Computes daily statistics as of `today`.
pub fn daily_stats(entries: &[SleepEntry], today: NaiveDate) -> DailyStats {
    let daily = allocate_daily(entries, today);
    let yesterday = today.pred_opt().unwrap_or(today);

    DailyStats {
        averages: rolling_averages(&daily, yesterday),
        chart: chart_window(&daily, yesterday),
        daily,
    }
}

/// Per-record summary statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SleepSummary {
    /// Mean hours over completed records.
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub total_records: usize,
    pub complete_records: usize,
    /// Earliest sleep start among all records.
    #[serde(with = "timestamp::canonical_option")]
    pub start_date: Option<NaiveDateTime>,
    /// Whole days from `start_date` to now.
    pub days_elapsed: i64,
}

/// Summarizes records as of `now`. No records yields all zeros.
pub fn summarize(entries: &[SleepEntry], now: NaiveDateTime) -> SleepSummary {
    let hours: Vec<f64> = entries.iter().filter_map(SleepEntry::hours).collect();
    let start_date = entries.iter().map(|e| e.sleep_start).min();

    let (min, max) = if hours.is_empty() {
        (0.0, 0.0)
    } else {
        hours.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), h| {
            (lo.min(*h), hi.max(*h))
        })
    };

    SleepSummary {
        average: mean(&hours),
        min,
        max,
        total_records: entries.len(),
        complete_records: hours.len(),
        start_date,
        days_elapsed: start_date.map_or(0, |start| (now - start).num_days().abs()),
    }
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

    /// Allocation with `values` on consecutive days starting 2024-01-01.
    fn allocation(values: &[f64]) -> DailyAllocation {
        date(2024, 1, 1)
            .iter_days()
            .zip(values.iter().copied())
            .collect()
    }

    fn average_for(averages: &[RollingAverage], days: usize) -> f64 {
        averages.iter().find(|a| a.days == days).unwrap().average
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(7.166_666), 7.17);
        assert_eq!(round2(7.125), 7.13);
        assert_eq!(round2(-1.234), -1.23);
    }

    #[test]
    fn test_rolling_windows_trail_on_yesterday() {
        // Jan 1..=Jan 10, with Jan 10 treated as today.
        let daily = allocation(&[6.0, 7.0, 8.0, 5.0, 9.0, 7.0, 6.0, 8.0, 7.5, 12.0]);
        let averages = rolling_averages(&daily, date(2024, 1, 9));

        assert_eq!(averages.len(), ROLLING_WINDOWS.len());
        assert_eq!(average_for(&averages, 1), 7.5);
        assert_eq!(average_for(&averages, 2), 7.75);
        assert_eq!(average_for(&averages, 3), 7.17);
        // Last 7 settled days: Jan 3..=Jan 9.
        assert_eq!(average_for(&averages, 7), 7.21);
    }

    #[test]
    fn test_short_history_averages_everything() {
        let daily = allocation(&[6.0, 8.0, 7.0]);
        let averages = rolling_averages(&daily, date(2024, 1, 3));

        assert_eq!(average_for(&averages, 3), 7.0);
        assert_eq!(average_for(&averages, 30), 7.0);
        assert_eq!(average_for(&averages, 365), 7.0);
    }

    #[test]
    fn test_zero_days_count_toward_average() {
        let daily = allocation(&[8.0, 0.0, 0.0, 8.0]);
        let averages = rolling_averages(&daily, date(2024, 1, 4));
        assert_eq!(average_for(&averages, 7), 4.0);
    }

    #[test]
    fn test_no_settled_days_yields_zero() {
        let daily = allocation(&[8.0]);
        let averages = rolling_averages(&daily, date(2023, 12, 31));
        assert!(averages.iter().all(|a| a.average == 0.0));

        let averages = rolling_averages(&DailyAllocation::new(), date(2024, 1, 1));
        assert!(averages.iter().all(|a| a.average == 0.0));
    }

    #[test]
    fn test_chart_window_caps_at_thirty_days() {
        let values: Vec<f64> = (0..45).map(f64::from).collect();
        let daily = allocation(&values);
        let yesterday = date(2024, 2, 13); // index 43

        let chart = chart_window(&daily, yesterday);
        assert_eq!(chart.len(), CHART_DAYS);
        assert_eq!(chart.first().unwrap().hours, 14.0);
        assert_eq!(chart.last().unwrap().date, yesterday);

        let short = chart_window(&allocation(&[1.0, 2.0]), date(2024, 1, 2));
        assert_eq!(short.len(), 2);
    }

    #[test]
    fn test_daily_stats_excludes_today() {
        let entries = [
            SleepEntry::completed(dt(2024, 1, 1, 23, 0), dt(2024, 1, 2, 7, 0)),
            SleepEntry::completed(dt(2024, 1, 3, 0, 0), dt(2024, 1, 3, 9, 0)),
        ];
        let stats = daily_stats(&entries, date(2024, 1, 3));

        assert_eq!(stats.daily.len(), 3);
        // Settled: Jan 1 (1h), Jan 2 (7h). Jan 3 is today.
        assert_eq!(average_for(&stats.averages, 1), 7.0);
        assert_eq!(average_for(&stats.averages, 7), 4.0);
        assert_eq!(stats.chart.len(), 2);
    }

    #[test]
    fn test_summarize_records() {
        let entries = [
            SleepEntry::open(dt(2024, 1, 3, 23, 0)),
            SleepEntry::completed(dt(2024, 1, 2, 22, 30), dt(2024, 1, 3, 6, 0)),
            SleepEntry::completed(dt(2024, 1, 1, 23, 0), dt(2024, 1, 2, 7, 0)),
        ];
        let summary = summarize(&entries, dt(2024, 1, 11, 12, 0));

        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.complete_records, 2);
        assert_eq!(summary.average, 7.75);
        assert_eq!(summary.min, 7.5);
        assert_eq!(summary.max, 8.0);
        assert_eq!(summary.start_date, Some(dt(2024, 1, 1, 23, 0)));
        assert_eq!(summary.days_elapsed, 9);
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], dt(2024, 1, 1, 0, 0));
        assert_eq!(summary, SleepSummary::default());
        assert_eq!(summary.start_date, None);
    }

    #[test]
    fn test_summary_serializes_null_start_date() {
        let json = serde_json::to_value(SleepSummary::default()).unwrap();
        assert!(json["start_date"].is_null());
        assert_eq!(json["total_records"], 0);
    }

    #[test]
    fn test_daily_stats_serializes_dates_as_keys() {
        let entries = [SleepEntry::completed(
            dt(2024, 1, 1, 23, 0),
            dt(2024, 1, 2, 7, 0),
        )];
        let stats = daily_stats(&entries, date(2024, 1, 2));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["daily"]["2024-01-01"], 1.0);
        assert_eq!(json["daily"]["2024-01-02"], 7.0);
        assert_eq!(json["chart"][0]["date"], "2024-01-01");
    }
}
