//! Scripted smoke scenarios
//!
//! Five single-pass scenarios, each a linear sequence of navigation,
//! element lookup, interaction, and assertion steps against one site,
//! run inside its own browser session.

pub mod accessibility;
pub mod images;
pub mod news;
pub mod timing;
pub mod video;

use tracing::{error, info};

use crate::browser::BrowserError;
use crate::logger::RunLog;
use crate::stats::RunStats;
use crate::RunConfig;

/// Run the five scenarios sequentially, each in its own failure boundary.
/// Returns the number of scenarios that failed.
pub async fn run_all(log: &RunLog, stats: &RunStats, config: &RunConfig) -> usize {
    let mut failures = 0;

    failures += report(log, "news search", news::run(log, stats, config).await);
    failures += report(log, "image search", images::run(log, stats, config).await);
    failures += report(log, "video search", video::run(log, stats, config).await);
    failures += report(log, "load-time measurement", timing::run(log, stats, config).await);
    failures += report(log, "accessibility check", accessibility::run(log, stats, config).await);

    failures
}

/// Log a scenario outcome. A failure is logged with its message and debug
/// trace and counted; it does not stop the remaining scenarios.
fn report(log: &RunLog, name: &str, outcome: Result<(), BrowserError>) -> usize {
    match outcome {
        Ok(()) => {
            info!(scenario = name, "scenario completed");
            0
        }
        Err(e) => {
            error!(scenario = name, error = %e, "scenario failed");
            log.log(&format!("Error: {e}"));
            log.log(&format!("Trace: {e:?}"));
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_logs_message_and_trace() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = RunLog::open(&path).unwrap();

        let failed = report(
            &log,
            "news search",
            Err(BrowserError::ElementNotFound("textarea.gLFyf (waited 20s)".into())),
        );
        assert_eq!(failed, 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("Error: Element not found: textarea.gLFyf (waited 20s)"));
        assert!(contents.contains("Trace: ElementNotFound"));
    }

    #[test]
    fn test_report_success_logs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = RunLog::open(&path).unwrap();

        assert_eq!(report(&log, "video search", Ok(())), 0);
        assert!(std::fs::read_to_string(&path).unwrap().is_empty());
    }
}
