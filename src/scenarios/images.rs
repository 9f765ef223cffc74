//! Image search scenario
//!
//! Opens the images tab, searches for "cats", and checks whether the first
//! few results carry the keyword in their alt, title, or src attributes.

use std::time::Duration;

use crate::browser::{with_session, BrowserError};
use crate::logger::RunLog;
use crate::stats::RunStats;
use crate::RunConfig;

const SEARCH_ENGINE_URL: &str = "https://www.google.com";
// Fixed path into the header bar; tied to the site's current markup.
const IMAGES_TAB: &str = "#gb > div > div:nth-child(1) > div > div:nth-child(2) > a";
const SEARCH_INPUT: &str = "textarea.gLFyf";
const IMAGE: &str = "img";
const QUERY: &str = "cats";
const KEYWORD: &str = "cat";
const SAMPLE_LIMIT: usize = 5;

const IMAGES_TAB_TIMEOUT: Duration = Duration::from_secs(30);
const SEARCH_BOX_TIMEOUT: Duration = Duration::from_secs(30);
const IMAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// True when any of the three attributes contains the keyword,
/// case-insensitively.
pub(crate) fn matches_keyword(
    alt: Option<&str>,
    title: Option<&str>,
    src: Option<&str>,
    keyword: &str,
) -> bool {
    let needle = keyword.to_lowercase();
    [alt, title, src]
        .into_iter()
        .flatten()
        .any(|value| value.to_lowercase().contains(&needle))
}

fn fmt_attr(value: Option<&str>) -> &str {
    value.unwrap_or("(none)")
}

pub async fn run(log: &RunLog, stats: &RunStats, config: &RunConfig) -> Result<(), BrowserError> {
    with_session(config.session(), stats, |session| async move {
        log.log("Navigating to Google...");
        session.navigate(SEARCH_ENGINE_URL).await?;
        session.wait_for_quiescence().await?;

        log.log(&format!("Looking for element with selector: {IMAGES_TAB}"));
        let images_tab = session.wait_for_element(IMAGES_TAB, IMAGES_TAB_TIMEOUT).await?;
        session.click(&images_tab).await?;
        log.log("Clicked on Images link.");
        session.wait_for_quiescence().await?;

        log.log(&format!("Looking for element with selector: {SEARCH_INPUT}"));
        let search_box = session.wait_for_element(SEARCH_INPUT, SEARCH_BOX_TIMEOUT).await?;
        session.type_and_submit(&search_box, QUERY).await?;
        log.log("Search performed.");
        session.wait_for_quiescence().await?;

        log.log("Waiting for search results to load...");
        session.wait_for_element(IMAGE, IMAGE_TIMEOUT).await?;
        let images = session.find_elements(IMAGE).await?;

        if images.is_empty() {
            log.log("No images found.");
            return Ok(());
        }
        log.log("Images found.");

        for (index, image) in images.iter().take(SAMPLE_LIMIT).enumerate() {
            let number = index + 1;
            let alt = session.read_attribute(image, "alt").await?;
            let title = session.read_attribute(image, "title").await?;
            let src = session.read_attribute(image, "src").await?;

            log.log(&format!(
                "Image {number}: alt=\"{}\", title=\"{}\", src=\"{}\"",
                fmt_attr(alt.as_deref()),
                fmt_attr(title.as_deref()),
                fmt_attr(src.as_deref()),
            ));

            if matches_keyword(alt.as_deref(), title.as_deref(), src.as_deref(), KEYWORD) {
                stats.record_check_passed();
                log.log(&format!("Image {number} matches the query \"{QUERY}\"."));
            } else {
                stats.record_check_failed();
                log.log(&format!("Image {number} does not match the query \"{QUERY}\"."));
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
    fn test_match_is_case_insensitive_across_attributes() {
        assert!(matches_keyword(Some("A sleeping CAT"), None, None, "cat"));
        assert!(matches_keyword(None, Some("Cat photo"), None, "cat"));
        assert!(matches_keyword(None, None, Some("https://cdn/cats/1.jpg"), "cat"));
        assert!(!matches_keyword(Some("a dog"), Some("puppy"), Some("https://cdn/dogs/1.jpg"), "cat"));
        assert!(!matches_keyword(None, None, None, "cat"));
    }

    #[test]
    fn test_match_counts_over_sample() {
        // Seven retrieved images; only the first five are sampled.
        let retrieved: Vec<(Option<&str>, Option<&str>, Option<&str>)> = vec![
            (Some("cat"), None, None),
            (Some("dog"), None, None),
            (None, Some("CATS!"), None),
            (None, None, None),
            (None, None, Some("/img/cat-5.png")),
            (Some("cat again"), None, None),
            (Some("cat once more"), None, None),
        ];

        let verdicts: Vec<bool> = retrieved
            .iter()
            .take(SAMPLE_LIMIT)
            .map(|(alt, title, src)| matches_keyword(*alt, *title, *src, KEYWORD))
            .collect();

        assert_eq!(verdicts.len(), SAMPLE_LIMIT);
        assert_eq!(verdicts.iter().filter(|m| **m).count(), 3);
        assert_eq!(verdicts.iter().filter(|m| !**m).count(), 2);
    }
}
