//! Status command: current state and time since the latest event.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Serialize;
use sl_core::{SleepEntry, SleepState, current_state, elapsed_since, timestamp};
use sl_store::{LineStore, SleepLog};

#[derive(Debug, Serialize)]
struct JsonStatus {
    status: SleepState,
    #[serde(with = "timestamp::canonical_option")]
    since: Option<NaiveDateTime>,
    elapsed: Option<String>,
}

pub fn run<S: LineStore, W: Write>(
    writer: &mut W,
    log: &SleepLog<S>,
    now: NaiveDateTime,
    json: bool,
) -> Result<()> {
    let latest = log.latest_entry()?;
    let state = current_state(latest.as_ref());
    let elapsed = elapsed_since(latest.as_ref(), now);

    if json {
        let status = JsonStatus {
            status: state,
            since: latest.as_ref().map(SleepEntry::latest_timestamp),
            elapsed: elapsed.as_ref().map(ToString::to_string),
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&status)?)?;
        return Ok(());
    }

    match elapsed {
        Some(elapsed) => writeln!(writer, "{} {elapsed}", state.label())?,
        None => writeln!(writer, "{} (no records)", state.label())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::NaiveDate;
    use insta::assert_snapshot;
    use sl_store::MemoryStore;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 10, 0)
            .unwrap()
    }

    fn render(lines: &[&str], json: bool) -> String {
        let log = SleepLog::new(MemoryStore::with_lines(lines.iter().copied()));
        let mut out = Vec::new();
        run(&mut out, &log, now(), json).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn status_while_asleep() {
        assert_eq!(render(&["2024-01-02T01:40,"], false), "Sleeping 07:30\n");
    }

    #[test]
    fn status_after_waking() {
        assert_eq!(
            render(&["2024-01-01T23:00,2024-01-02T07:00"], false),
            "Awake 02:00\n"
        );
    }

    #[test]
    fn status_with_future_event() {
        assert_eq!(
            render(&["2024-01-01T23:00,2024-01-02T12:00"], false),
            "Awake -03:00\n"
        );
    }

    #[test]
    fn status_without_records() {
        assert_eq!(render(&[], false), "Awake (no records)\n");
    }

    #[test]
    fn status_json() {
        assert_snapshot!(render(&["2024-01-02T01:40,"], true), @r#"
        {
          "status": "sleep",
          "since": "2024-01-02T01:40",
          "elapsed": "07:30"
        }
        "#);
    }

    #[test]
    fn status_json_without_records() {
        assert_snapshot!(render(&[], true), @r#"
        {
          "status": "wake",
          "since": null,
          "elapsed": null
        }
        "#);
    }
}
