//! Stress runner
//!
//! Repeats the basic search flow with a small fixed number of concurrent
//! workers per keyword. Each worker owns its own browser session across its
//! iterations; per-iteration errors are logged and never abort the worker.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::warn;

use crate::browser::{with_session, BrowserError, BrowserSession, BrowserSessionConfig};
use crate::logger::RunLog;
use crate::stats::RunStats;

const SEARCH_ENGINE_URL: &str = "https://www.google.com";
const SEARCH_INPUT: &str = "textarea.gLFyf";
const RESULTS_CONTAINER: &str = "#search";

const SEARCH_BOX_TIMEOUT: Duration = Duration::from_secs(20);
const RESULTS_TIMEOUT: Duration = Duration::from_secs(30);

/// Stress plan: keywords crossed with workers and per-worker iterations.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StressConfig {
    /// Keywords searched sequentially
    pub keywords: Vec<String>,
    /// Concurrent workers per keyword
    pub concurrent_workers: usize,
    /// Sequential search iterations per worker
    pub iterations: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            keywords: vec!["cats".to_string(), "dogs".to_string(), "birds".to_string()],
            concurrent_workers: 2,
            iterations: 3,
        }
    }
}

impl StressConfig {
    /// Total iteration attempts across the whole plan
    pub fn total_attempts(&self) -> usize {
        self.keywords.len() * self.concurrent_workers * self.iterations
    }

    /// Total sessions the plan opens (one per worker per keyword)
    pub fn total_sessions(&self) -> usize {
        self.keywords.len() * self.concurrent_workers
    }
}

/// Run the stress plan: for each keyword in order, launch the workers
/// concurrently and wait for all of them before the next keyword.
pub async fn run(
    log: &Arc<RunLog>,
    stats: &Arc<RunStats>,
    session_config: BrowserSessionConfig,
    config: &StressConfig,
) {
    log.log("Stress testing Google Search...");

    for keyword in &config.keywords {
        log.log(&format!("Starting stress test for keyword: {keyword}"));

        let mut workers = Vec::with_capacity(config.concurrent_workers);
        for worker in 0..config.concurrent_workers {
            let log = Arc::clone(log);
            let stats = Arc::clone(stats);
            let keyword = keyword.clone();
            let session_config = session_config.clone();
            let iterations = config.iterations;

            workers.push(tokio::spawn(async move {
                let outcome: Result<(), BrowserError> =
                    with_session(session_config, &stats, |session| {
                        let log = Arc::clone(&log);
                        let stats = Arc::clone(&stats);
                        let keyword = keyword.clone();
                        async move {
                            run_iterations(&log, &stats, &keyword, iterations, |_| {
                                let session = Arc::clone(&session);
                                let keyword = keyword.clone();
                                async move { search_once(&session, &keyword).await }
                            })
                            .await;
                            Ok(())
                        }
                    })
                    .await;

                if let Err(e) = outcome {
                    warn!(worker, error = %e, "stress worker could not run");
                    log.log(&format!("Stress worker {} could not open a session: {e}", worker + 1));
                }
            }));
        }

        for joined in join_all(workers).await {
            if let Err(e) = joined {
                warn!("stress worker task panicked: {}", e);
                log.log(&format!("Stress worker aborted: {e}"));
            }
        }

        log.log(&format!("Completed stress test for keyword: {keyword}"));
    }
}

/// Run the per-worker iteration loop, catching and logging each iteration
/// error without aborting the remaining iterations.
pub(crate) async fn run_iterations<F, Fut>(
    log: &RunLog,
    stats: &RunStats,
    keyword: &str,
    iterations: usize,
    mut attempt: F,
) where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<(), BrowserError>>,
{
    for number in 1..=iterations {
        stats.record_iteration_attempt();
        log.log(&format!("Search {number} for keyword: {keyword}"));

        match attempt(number).await {
            Ok(()) => {
                log.log(&format!("Search {number} for keyword \"{keyword}\" completed."));
            }
            Err(e) => {
                stats.record_iteration_failure();
                log.log(&format!(
                    "Search {number} for keyword \"{keyword}\" failed \
                     (ErrorKind=SearchIterationFailed): {e}"
                ));
            }
        }
    }
}

/// One search iteration inside an already-open session.
async fn search_once(session: &BrowserSession, keyword: &str) -> Result<(), BrowserError> {
    session.navigate(SEARCH_ENGINE_URL).await?;
    session.wait_for_quiescence().await?;

    let search_box = session.wait_for_element(SEARCH_INPUT, SEARCH_BOX_TIMEOUT).await?;
    session.type_and_submit(&search_box, keyword).await?;

    session.wait_for_element(RESULTS_CONTAINER, RESULTS_TIMEOUT).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_default_plan_counts() {
        let config = StressConfig::default();
        assert_eq!(config.keywords.len(), 3);
        assert_eq!(config.total_attempts(), 18);
        assert_eq!(config.total_sessions(), 6);
    }

    #[tokio::test]
    async fn test_iteration_failure_does_not_stop_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = RunLog::open(&path).unwrap();
        let stats = RunStats::new();
        let calls = AtomicUsize::new(0);

        run_iterations(&log, &stats, "dogs", 3, |number| {
            calls.fetch_add(1, Ordering::Relaxed);
            async move {
                if number == 2 {
                    Err(BrowserError::ElementNotFound("textarea.gLFyf (waited 20s)".into()))
                } else {
                    Ok(())
                }
            }
        })
        .await;

        assert_eq!(calls.load(Ordering::Relaxed), 3);
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.iterations_attempted, 3);
        assert_eq!(snapshot.iterations_failed, 1);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.matches("ErrorKind=SearchIterationFailed").count(), 1);
        assert_eq!(contents.matches("completed.").count(), 2);
    }

    #[tokio::test]
    async fn test_all_iterations_logged_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.txt");
        let log = RunLog::open(&path).unwrap();
        let stats = RunStats::new();

        run_iterations(&log, &stats, "birds", 3, |_| async { Ok(()) }).await;

        let contents = std::fs::read_to_string(&path).unwrap();
        let first = contents.find("Search 1 for keyword: birds").unwrap();
        let second = contents.find("Search 2 for keyword: birds").unwrap();
        let third = contents.find("Search 3 for keyword: birds").unwrap();
        assert!(first < second && second < third);
    }
}
