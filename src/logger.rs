//! Observation log
//!
//! Appends one timestamped line per event to a file and mirrors it to
//! standard output. No buffering, no rotation, no levels.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use tracing::warn;

/// Append-only observation log shared by scenarios and stress workers.
///
/// Line format: `"<ISO-8601 timestamp> - <message>"`. Safe to call from
/// concurrent workers; interleaving across workers is unordered.
pub struct RunLog {
    file: File,
}

impl RunLog {
    /// Open the log file in append mode, creating it if absent.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }

    /// Append a timestamped line to the file and to stdout.
    ///
    /// Never fails the caller: an append error is reported on the
    /// diagnostic layer only.
    pub fn log(&self, message: &str) {
        let line = format!(
            "{} - {}",
            Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message
        );
        println!("{line}");
        if let Err(e) = writeln!(&self.file, "{line}") {
            warn!("Failed to append to observation log: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_appends_timestamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke-log.txt");

        let log = RunLog::open(&path).unwrap();
        log.log("Navigating to Google...");
        log.log("Search performed.");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        for (line, message) in lines.iter().zip(["Navigating to Google...", "Search performed."]) {
            let (timestamp, rest) = line.split_once(" - ").unwrap();
            assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
            assert_eq!(rest, message);
        }
    }

    #[test]
    fn test_open_appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("smoke-log.txt");

        RunLog::open(&path).unwrap().log("first run");
        RunLog::open(&path).unwrap().log("second run");

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
