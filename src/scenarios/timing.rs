//! Load-time measurement scenario
//!
//! Measures how long the search engine home takes to reach network
//! quiescence and classifies the result against a fixed budget.

use std::time::Instant;

use crate::browser::{with_session, BrowserError};
use crate::logger::RunLog;
use crate::stats::RunStats;
use crate::RunConfig;

const SEARCH_ENGINE_URL: &str = "https://www.google.com";
const LOAD_TIME_BUDGET_MS: u128 = 2000;

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum LoadClass {
    Fast,
    Slow,
}

/// Classification is "fast" iff elapsed is strictly under the budget.
pub(crate) fn classify_load(elapsed_ms: u128) -> LoadClass {
    if elapsed_ms < LOAD_TIME_BUDGET_MS {
        LoadClass::Fast
    } else {
        LoadClass::Slow
    }
}

pub async fn run(log: &RunLog, stats: &RunStats, config: &RunConfig) -> Result<(), BrowserError> {
    with_session(config.session(), stats, |session| async move {
        log.log("Measuring Google page load time...");

        let start = Instant::now();
        session.navigate(SEARCH_ENGINE_URL).await?;
        session.wait_for_quiescence().await?;
        let elapsed_ms = start.elapsed().as_millis();

        log.log(&format!("Page load time: {elapsed_ms} ms"));
        match classify_load(elapsed_ms) {
            LoadClass::Fast => {
                stats.record_check_passed();
                log.log("Page loads quickly.");
            }
            LoadClass::Slow => {
                stats.record_check_failed();
                log.log("Page loads slowly.");
            }
        }

        Ok(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_under_budget_is_fast() {
        assert_eq!(classify_load(0), LoadClass::Fast);
        assert_eq!(classify_load(1999), LoadClass::Fast);
    }

    #[test]
    fn test_budget_boundary_is_slow() {
        assert_eq!(classify_load(2000), LoadClass::Slow);
        assert_eq!(classify_load(2001), LoadClass::Slow);
    }
}
