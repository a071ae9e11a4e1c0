//! JSONL log of executed directives.
//!
//! Every directive the engine runs is appended as one line to
//! `{config_dir}/command-logs/YYYY-MM-DD.jsonl`. Best-effort: never panics
//! or fails the caller.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::CommandResponse;

#[derive(Serialize)]
struct CommandAuditEntry<'a> {
    ts: i64,
    command: &'a str,
    args: &'a [String],
    ok: bool,
    message: &'a str,
    send_response: bool,
    get_response: bool,
    duration_ms: u64,
}

/// Append one executed directive to today's log in `logs_dir`.
pub fn log_command(
    logs_dir: &Path,
    command: &str,
    args: &[String],
    response: &CommandResponse,
    duration: Duration,
) {
    log_command_at(logs_dir, Utc::now(), command, args, response, duration);
}

/// [`log_command`] on the blocking pool, so file IO stays off the async
/// workers. Resolves once the line is written.
pub async fn record(
    logs_dir: PathBuf,
    command: &'static str,
    args: Vec<String>,
    response: CommandResponse,
    duration: Duration,
) {
    let written = tokio::task::spawn_blocking(move || {
        log_command(&logs_dir, command, &args, &response, duration);
    })
    .await;
    if let Err(e) = written {
        tracing::warn!(command, error = %e, "command log writer failed");
    }
}

fn log_command_at(
    logs_dir: &Path,
    at: DateTime<Utc>,
    command: &str,
    args: &[String],
    response: &CommandResponse,
    duration: Duration,
) {
    let entry = CommandAuditEntry {
        ts: at.timestamp(),
        command,
        args,
        ok: response.is_success,
        message: &response.message,
        send_response: response.send_response,
        get_response: response.get_response,
        duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
    };

    if let Err(e) = fs::create_dir_all(logs_dir) {
        tracing::debug!(dir = %logs_dir.display(), error = %e, "command log dir unavailable");
        return;
    }
    let path = logs_dir.join(log_file_name(at));

    if let Ok(json) = serde_json::to_string(&entry) {
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&path) {
            let _ = writeln!(file, "{json}");
        }
    }
}

/// `YYYY-MM-DD.jsonl` for the UTC day of `at`.
fn log_file_name(at: DateTime<Utc>) -> String {
    format!("{}.jsonl", at.format("%Y-%m-%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name() {
        let at = DateTime::from_timestamp(1_740_355_200, 0).unwrap();
        assert_eq!(log_file_name(at), "2025-02-24.jsonl");
        let end_of_day = DateTime::from_timestamp(1_740_355_200 + 86_399, 0).unwrap();
        assert_eq!(log_file_name(end_of_day), "2025-02-24.jsonl");
    }

    #[test]
    fn test_log_command_appends_lines() {
        let dir = std::env::temp_dir().join("pocket_assist_test_audit");
        let _ = fs::remove_dir_all(&dir);
        let at = DateTime::from_timestamp(946_684_800, 0).unwrap();
        let args = vec!["50".to_string()];
        let ok = CommandResponse::success("Volume set to 50%");
        log_command_at(&dir, at, "volume", &args, &ok, Duration::from_millis(3));
        log_command_at(&dir, at, "volume", &args, &ok, Duration::from_millis(4));

        let text = fs::read_to_string(dir.join("2000-01-01.jsonl")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["command"], "volume");
        assert_eq!(first["args"][0], "50");
        assert_eq!(first["ok"], true);
        assert_eq!(first["duration_ms"], 3);
        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_record_writes_before_returning() {
        let dir = std::env::temp_dir().join("pocket_assist_test_audit_record");
        let _ = fs::remove_dir_all(&dir);
        let r = CommandResponse::failure("Ola is not installed on this device");
        let args = vec!["OLA".to_string(), "Airport".to_string()];
        record(dir.clone(), "book_cab", args, r, Duration::from_millis(2)).await;

        let file = fs::read_dir(&dir).unwrap().next().unwrap().unwrap().path();
        let text = fs::read_to_string(file).unwrap();
        let entry: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(entry["command"], "book_cab");
        assert_eq!(entry["ok"], false);
        assert_eq!(entry["args"][1], "Airport");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_log_command_unwritable_dir_no_panic() {
        let bogus = Path::new("/proc/pocket-assist-test-nonexistent");
        let r = CommandResponse::failure("nope");
        log_command(bogus, "call", &[], &r, Duration::from_millis(1));
    }
}
