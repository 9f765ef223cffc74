//! Video search scenario
//!
//! Searches the video platform for "funny cat videos" and logs whether any
//! results came back.

use std::time::Duration;

use crate::browser::{with_session, BrowserError};
use crate::logger::RunLog;
use crate::stats::RunStats;
use crate::RunConfig;

const VIDEO_PLATFORM_URL: &str = "https://www.youtube.com";
const SEARCH_INPUT: &str = "input#search";
const VIDEO_RESULT: &str = "ytd-video-renderer";
const QUERY: &str = "funny cat videos";

const SETTLE_DELAY: Duration = Duration::from_secs(5);
const SEARCH_BOX_TIMEOUT: Duration = Duration::from_secs(20);
const RESULT_TIMEOUT: Duration = Duration::from_secs(30);

pub async fn run(log: &RunLog, stats: &RunStats, config: &RunConfig) -> Result<(), BrowserError> {
    with_session(config.session(), stats, |session| async move {
        log.log("Navigating to YouTube...");
        session.navigate(VIDEO_PLATFORM_URL).await?;
        session.wait_for_quiescence().await?;
        session.settle(SETTLE_DELAY).await;

        log.log(&format!("Looking for element with selector: {SEARCH_INPUT}"));
        let search_box = session.wait_for_element(SEARCH_INPUT, SEARCH_BOX_TIMEOUT).await?;
        session.type_and_submit(&search_box, QUERY).await?;
        log.log("Search performed.");

        session.wait_for_element(VIDEO_RESULT, RESULT_TIMEOUT).await?;
        let videos = session.find_elements(VIDEO_RESULT).await?;

        if videos.is_empty() {
            stats.record_check_failed();
            log.log("No videos found.");
        } else {
            stats.record_check_passed();
            log.log("Videos found.");
        }

        Ok(())
    })
    .await
}
