//! News search scenario
//!
//! Searches the engine for "Google news", follows the first organic result
//! when it points at the news property, and checks the landing page title.

use std::time::Duration;

use tracing::debug;

use crate::browser::{with_session, BrowserError};
use crate::logger::RunLog;
use crate::stats::RunStats;
use crate::RunConfig;

const SEARCH_ENGINE_URL: &str = "https://www.google.com";
const SEARCH_INPUT: &str = "textarea.gLFyf";
const FIRST_RESULT: &str = "#search .g a";
const QUERY: &str = "Google news";
const EXPECTED_DOMAIN: &str = "news.google.com";
const EXPECTED_TITLE: &str = "Google News";

const SETTLE_DELAY: Duration = Duration::from_secs(5);
const SEARCH_BOX_TIMEOUT: Duration = Duration::from_secs(20);
const RESULT_TIMEOUT: Duration = Duration::from_secs(30);
const CONTENT_LOAD_TIMEOUT_SECS: u64 = 30;

/// Fail with `UnexpectedDestination` unless the href points at the expected
/// news domain.
pub(crate) fn check_destination(href: Option<&str>) -> Result<(), BrowserError> {
    match href {
        Some(h) if h.contains(EXPECTED_DOMAIN) => Ok(()),
        Some(h) => Err(BrowserError::UnexpectedDestination(format!(
            "first result does not lead to {}: {}",
            EXPECTED_DOMAIN, h
        ))),
        None => Err(BrowserError::UnexpectedDestination(
            "first result has no href".into(),
        )),
    }
}

pub async fn run(log: &RunLog, stats: &RunStats, config: &RunConfig) -> Result<(), BrowserError> {
    with_session(config.session(), stats, |session| async move {
        log.log("Navigating to Google...");
        session.navigate(SEARCH_ENGINE_URL).await?;
        session.wait_for_quiescence().await?;
        session.settle(SETTLE_DELAY).await;

        log.log(&format!("Looking for element with selector: {SEARCH_INPUT}"));
        let search_box = session.wait_for_element(SEARCH_INPUT, SEARCH_BOX_TIMEOUT).await?;
        session.type_and_submit(&search_box, QUERY).await?;
        log.log("Search performed.");

        let first_result = session.wait_for_element(FIRST_RESULT, RESULT_TIMEOUT).await?;
        let href = session.read_attribute(&first_result, "href").await?;
        log.log(&format!("Found link: {}", href.as_deref().unwrap_or("(none)")));

        check_destination(href.as_deref())?;

        session.click(&first_result).await?;
        log.log("Waiting for page to load...");
        match session.wait_for_navigation(CONTENT_LOAD_TIMEOUT_SECS).await {
            Ok(()) => {}
            // The click's navigation may already have completed.
            Err(BrowserError::Timeout(_)) => debug!("content load wait ended on timeout"),
            Err(e) => return Err(e),
        }

        let title = session.title().await?;
        if title.contains(EXPECTED_TITLE) {
            stats.record_check_passed();
            log.log("Successfully navigated to Google News.");
        } else {
            stats.record_check_failed();
            log.log(&format!(
                "Title mismatch: expected \"{EXPECTED_TITLE}\" marker, got \"{title}\"."
            ));
        }

        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_href_proceeds() {
        assert!(check_destination(Some("https://news.google.com/home")).is_ok());
    }

    #[test]
    fn test_other_href_is_unexpected_destination() {
        let err = check_destination(Some("https://en.wikipedia.org/wiki/Google_News")).unwrap_err();
        assert!(matches!(err, BrowserError::UnexpectedDestination(_)));
    }

    #[test]
    fn test_missing_href_is_unexpected_destination() {
        let err = check_destination(None).unwrap_err();
        assert!(matches!(err, BrowserError::UnexpectedDestination(_)));
    }
}
