//! web-smoke
//!
//! Scripted browser smoke checks against public search and video properties.
//! Runs five single-pass scenarios (news search, image search, video search,
//! load-time measurement, accessibility check) followed by a small concurrent
//! stress pass, logging observations to a file and the console.

pub mod browser;
pub mod logger;
pub mod scenarios;
pub mod stats;
pub mod stress;

use std::path::PathBuf;

/// Run configuration
///
/// Launch-level knobs only. Scenario selectors, keywords, timeouts, and
/// thresholds are fixed literals in the scenario definitions.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunConfig {
    /// Run Chrome in headless mode
    pub headless: bool,
    /// Path to Chrome/Chromium executable (auto-detected when unset)
    pub chrome_path: Option<String>,
    /// Observation log file path
    pub log_file: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            log_file: "smoke-log.txt".to_string(),
        }
    }
}

impl RunConfig {
    /// Build a per-session browser config from the run-level knobs.
    pub fn session(&self) -> browser::BrowserSessionConfig {
        browser::BrowserSessionConfig::isolated()
            .headless(self.headless)
            .chrome_path(self.chrome_path.clone())
    }
}

/// Get diagnostic log directory path (shared across modules)
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("web-smoke").join("logs"))
}

/// Initialize diagnostic logging: console layer plus a daily-rolling file
/// layer when the log directory is available.
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "web-smoke.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_config_default() {
        let config = RunConfig::default();
        assert!(config.headless);
        assert!(config.chrome_path.is_none());
        assert_eq!(config.log_file, "smoke-log.txt");
    }

    #[test]
    fn test_session_config_inherits_run_knobs() {
        let config = RunConfig {
            headless: false,
            chrome_path: Some("/usr/bin/chromium".into()),
            ..Default::default()
        };
        let session = config.session();
        assert!(!session.headless);
        assert_eq!(session.chrome_path.as_deref(), Some("/usr/bin/chromium"));
    }
}
