//! web-smoke entry point
//!
//! Runs the five scripted scenarios sequentially, then the stress pass,
//! and finishes with a run summary.
//!
//! Environment variables:
//! - `WEB_SMOKE_HEADFUL` - run with a visible browser window (headless off)
//! - `WEB_SMOKE_CHROME` - explicit Chrome/Chromium binary path

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use web_smoke::logger::RunLog;
use web_smoke::stats::RunStats;
use web_smoke::stress::{self, StressConfig};
use web_smoke::{scenarios, RunConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = web_smoke::init_logging();

    info!("Starting web-smoke");
    if let Some(dir) = web_smoke::log_dir() {
        info!("Diagnostic logs saved to: {}", dir.display());
    }

    let mut config = RunConfig::default();
    if std::env::var("WEB_SMOKE_HEADFUL").map(|v| !v.is_empty()).unwrap_or(false) {
        config.headless = false;
    }
    if let Ok(path) = std::env::var("WEB_SMOKE_CHROME") {
        if !path.is_empty() {
            config.chrome_path = Some(path);
        }
    }

    let log = Arc::new(
        RunLog::open(&config.log_file)
            .with_context(|| format!("failed to open observation log {}", config.log_file))?,
    );
    let stats = Arc::new(RunStats::new());

    let scenario_failures = scenarios::run_all(&log, &stats, &config).await;

    let stress_config = StressConfig::default();
    stress::run(&log, &stats, config.session(), &stress_config).await;

    let snapshot = stats.snapshot();
    info!(
        sessions_opened = snapshot.sessions_opened,
        sessions_closed = snapshot.sessions_closed,
        iterations_attempted = snapshot.iterations_attempted,
        iterations_failed = snapshot.iterations_failed,
        checks_passed = snapshot.checks_passed,
        checks_failed = snapshot.checks_failed,
        "Run complete"
    );
    log.log(&format!(
        "Run complete: {} scenario failure(s), {}/{} sessions closed, \
         {}/{} stress iterations failed, {} checks passed, {} checks failed.",
        scenario_failures,
        snapshot.sessions_closed,
        snapshot.sessions_opened,
        snapshot.iterations_failed,
        snapshot.iterations_attempted,
        snapshot.checks_passed,
        snapshot.checks_failed,
    ));

    Ok(())
}
