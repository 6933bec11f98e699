//! The `daily` command: rolling averages and a per-day chart.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use sl_core::{DailyAllocation, DailyHours, DailyStats, RollingAverage};
use sl_store::{LineStore, SleepLog};

const BAR_WIDTH: usize = 10;

// ========== Progress Bar ==========

/// Generates a 10-character bar for `value` relative to `max`.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: f64, max: f64) -> String {
    if max <= 0.0 {
        return "░".repeat(BAR_WIDTH);
    }

    let ratio = value / max;
    let filled = if ratio < 0.05 && value > 0.0 {
        1
    } else {
        (ratio * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize
    };

    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

// ========== Text Output ==========

fn hours_label(hours: f64) -> String {
    format!("{hours:.2}h")
}

fn format_average(average: &RollingAverage) -> String {
    let unit = if average.days == 1 { "day" } else { "days" };
    let label = hours_label(average.average);
    format!("{:>3} {unit:<5}{label:>7}\n", average.days)
}

fn format_chart(chart: &[DailyHours]) -> String {
    let max = chart.iter().map(|day| day.hours).fold(0.0, f64::max);
    chart
        .iter()
        .map(|day| {
            let label = hours_label(day.hours);
            format!("{}  {}  {label:>6}\n", day.date, progress_bar(day.hours, max))
        })
        .collect()
}

/// The last `days` entries of the allocation, oldest first.
fn last_days(daily: &DailyAllocation, days: usize) -> DailyAllocation {
    daily
        .iter()
        .rev()
        .take(days)
        .map(|(date, hours)| (*date, *hours))
        .collect()
}

/// Formats the human-readable daily report.
pub fn format_daily(stats: &DailyStats, days: Option<usize>) -> String {
    if stats.daily.is_empty() {
        return "No records.\n".to_string();
    }

    let mut output = String::from("ROLLING AVERAGES\n────────────────\n");
    for average in &stats.averages {
        output.push_str(&format_average(average));
    }

    output.push_str("\nLAST 30 DAYS\n────────────\n");
    if stats.chart.is_empty() {
        output.push_str("(no completed days yet)\n");
    } else {
        output.push_str(&format_chart(&stats.chart));
    }

    if let Some(days) = days {
        output.push_str("\nDAILY TOTALS\n────────────\n");
        for (date, hours) in &last_days(&stats.daily, days) {
            let label = hours_label(*hours);
            output.push_str(&format!("{date}  {label:>6}\n"));
        }
    }

    output
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
struct JsonDaily<'a> {
    generated_for: NaiveDate,
    averages: &'a [RollingAverage],
    chart: &'a [DailyHours],
    daily: DailyAllocation,
}

/// Formats the daily report as JSON. `days` limits the `daily` map.
pub fn format_daily_json(
    stats: &DailyStats,
    today: NaiveDate,
    days: Option<usize>,
) -> Result<String> {
    let report = JsonDaily {
        generated_for: today,
        averages: &stats.averages,
        chart: &stats.chart,
        daily: days.map_or_else(|| stats.daily.clone(), |n| last_days(&stats.daily, n)),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

// ========== Public Interface ==========

/// Runs the daily command.
pub fn run<S: LineStore, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    today: NaiveDate,
    json: bool,
    days: Option<usize>,
) -> Result<()> {
    let stats = log.daily_stats(today)?;
    if json {
        writeln!(writer, "{}", format_daily_json(&stats, today, days)?)?;
    } else {
        write!(writer, "{}", format_daily(&stats, days))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use sl_store::MemoryStore;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
    }

    fn sample_log() -> SleepLog<MemoryStore> {
        SleepLog::new(MemoryStore::with_lines([
            "2024-01-01T23:00,2024-01-02T07:00",
            "2024-01-02T22:00,2024-01-04T06:00",
        ]))
    }

    fn render(log: &SleepLog<MemoryStore>, json: bool, days: Option<usize>) -> String {
        let mut out = Vec::new();
        run(&mut out, log, today(), json, days).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_progress_bar_full() {
        assert_eq!(progress_bar(24.0, 24.0), "██████████");
    }

    #[test]
    fn test_progress_bar_partial() {
        assert_eq!(progress_bar(9.0, 24.0), "████░░░░░░");
    }

    #[test]
    fn test_progress_bar_minimum() {
        assert_eq!(progress_bar(0.5, 24.0), "█░░░░░░░░░");
    }

    #[test]
    fn test_progress_bar_zero() {
        assert_eq!(progress_bar(0.0, 8.0), "░░░░░░░░░░");
        assert_eq!(progress_bar(0.0, 0.0), "░░░░░░░░░░");
    }

    #[test]
    fn test_daily_report() {
        assert_snapshot!(render(&sample_log(), false, Some(3)), @r"
        ROLLING AVERAGES
        ────────────────
          1 day    6.00h
          2 days  15.00h
          3 days  13.00h
          7 days  10.00h
         30 days  10.00h
         60 days  10.00h
         90 days  10.00h
        180 days  10.00h
        365 days  10.00h

        LAST 30 DAYS
        ────────────
        2024-01-01  █░░░░░░░░░   1.00h
        2024-01-02  ████░░░░░░   9.00h
        2024-01-03  ██████████  24.00h
        2024-01-04  ███░░░░░░░   6.00h

        DAILY TOTALS
        ────────────
        2024-01-03  24.00h
        2024-01-04   6.00h
        2024-01-05   0.00h
        ");
    }

    #[test]
    fn test_daily_json_limits_daily_map() {
        let json: serde_json::Value =
            serde_json::from_str(&render(&sample_log(), true, Some(2))).unwrap();

        assert_eq!(json["generated_for"], "2024-01-05");
        assert_eq!(json["averages"][0]["days"], 1);
        assert_eq!(json["averages"][0]["average"], 6.0);
        assert_eq!(json["chart"].as_array().unwrap().len(), 4);
        let daily = json["daily"].as_object().unwrap();
        assert_eq!(daily.len(), 2);
        assert_eq!(daily["2024-01-04"], 6.0);
        assert_eq!(daily["2024-01-05"], 0.0);
    }

    #[test]
    fn test_only_today_has_no_chart() {
        let log = SleepLog::new(MemoryStore::with_lines([
            "2024-01-05T01:00,2024-01-05T07:00",
        ]));
        let output = render(&log, false, None);
        assert!(output.contains("  1 day    0.00h"));
        assert!(output.contains("(no completed days yet)"));
    }

    #[test]
    fn test_empty_log() {
        assert_eq!(render(&SleepLog::in_memory(), false, None), "No records.\n");
    }
}
