//! Accessibility check scenario
//!
//! Counts elements on the search engine home exposing an accessible-name
//! attribute and logs whether any exist.

use crate::browser::{with_session, BrowserError};
use crate::logger::RunLog;
use crate::stats::RunStats;
use crate::RunConfig;

const SEARCH_ENGINE_URL: &str = "https://www.google.com";
const ARIA_LABEL_COUNT_JS: &str = "document.querySelectorAll('[aria-label]').length";

pub async fn run(log: &RunLog, stats: &RunStats, config: &RunConfig) -> Result<(), BrowserError> {
    with_session(config.session(), stats, |session| async move {
        log.log("Checking Google page accessibility...");
        session.navigate(SEARCH_ENGINE_URL).await?;
        session.wait_for_quiescence().await?;

        let count = session
            .execute_js(ARIA_LABEL_COUNT_JS)
            .await?
            .as_u64()
            .unwrap_or(0);

        log.log(&format!("Elements with aria-label attribute: {count}"));
        if count > 0 {
            stats.record_check_passed();
            log.log("Elements with aria-label attribute found.");
        } else {
            stats.record_check_failed();
            log.log("No elements with aria-label attribute found.");
        }

        Ok(())
    })
    .await
}
