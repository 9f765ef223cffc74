//! Browser session management
//!
//! Handles launching and controlling individual Chrome browser instances
//! over the Chrome DevTools Protocol, and provides the scripted step
//! vocabulary (navigate, quiescence wait, element wait, typing, clicks)
//! used by the scenarios and the stress runner.

use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::input::{DispatchKeyEventParams, DispatchKeyEventType};
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::{Element, Page};
use futures::StreamExt;
use rand::Rng;
use rand::SeedableRng;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::BrowserError;
use crate::stats::RunStats;

/// Global counter for sequential session naming (Session-1, Session-2, ...)
static SESSION_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Quiet window with no network activity that counts as "page finished loading"
const NETWORK_IDLE_WINDOW: Duration = Duration::from_millis(500);

/// Upper bound on the quiescence wait; reaching it proceeds rather than fails
/// (long-polling connections would otherwise starve the scenario).
const QUIESCENCE_CAP: Duration = Duration::from_secs(30);

/// Polling interval for element waits
const ELEMENT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Find Chrome/Chromium executable on the system
fn find_chrome() -> Option<PathBuf> {
    let candidates: Vec<PathBuf> = if cfg!(target_os = "windows") {
        let mut paths = vec![
            PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(PathBuf::from(format!(
                r"{}\Google\Chrome\Application\chrome.exe",
                local
            )));
        }
        paths
    } else if cfg!(target_os = "macos") {
        vec![PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        )]
    } else {
        vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
        ]
    };

    candidates.into_iter().find(|p| p.exists())
}

/// Configuration for a browser session
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrowserSessionConfig {
    /// Path to Chrome/Chromium executable
    pub chrome_path: Option<String>,
    /// Run in headless mode
    pub headless: bool,
    /// User data directory
    pub user_data_dir: Option<String>,
    /// Navigation timeout in seconds
    pub timeout_secs: u64,
    /// Window width
    pub window_width: u32,
    /// Window height
    pub window_height: u32,
}

impl Default for BrowserSessionConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            user_data_dir: None,
            timeout_secs: 60,
            window_width: 1280,
            window_height: 720,
        }
    }
}

impl BrowserSessionConfig {
    /// Create a config with a fresh throwaway user data directory, so
    /// concurrent sessions never share profile state.
    pub fn isolated() -> Self {
        let base = std::env::temp_dir().join("web-smoke").join("browser_data");
        let user_data_dir = base
            .join(uuid::Uuid::new_v4().to_string())
            .to_string_lossy()
            .to_string();

        Self {
            user_data_dir: Some(user_data_dir),
            ..Default::default()
        }
    }

    /// Set headless mode
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set Chrome path
    pub fn chrome_path(mut self, path: Option<String>) -> Self {
        self.chrome_path = path;
        self
    }

    /// Set navigation timeout
    pub fn timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// A browser session for one scenario or stress worker.
///
/// Owns exactly one Chrome instance and one page. Element handles obtained
/// from it are only valid while the session is open.
pub struct BrowserSession {
    /// Display name, e.g. "Session-1"
    pub id: String,
    /// The browser instance
    browser: Arc<RwLock<Option<Browser>>>,
    /// Current active page
    page: Arc<RwLock<Option<Page>>>,
    /// Session configuration
    config: BrowserSessionConfig,
    /// Whether session is alive
    alive: Arc<AtomicBool>,
}

impl BrowserSession {
    /// Launch a new browser session with the given config
    pub async fn launch(config: BrowserSessionConfig) -> Result<Self, BrowserError> {
        let session_id = format!("Session-{}", SESSION_COUNTER.fetch_add(1, Ordering::Relaxed));

        info!(
            "Launching browser session {} (headless: {})",
            session_id, config.headless
        );

        // Check if Chrome is available before attempting launch
        if config.chrome_path.is_none() && find_chrome().is_none() {
            return Err(BrowserError::LaunchFailed(
                "Chrome/Chromium not found. Install Chrome or set WEB_SMOKE_CHROME.".to_string(),
            ));
        }

        let mut builder = BrowserConfig::builder();

        // BrowserConfig is headless unless told otherwise
        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        } else if let Some(chrome_path) = find_chrome() {
            debug!("Auto-detected Chrome at: {}", chrome_path.display());
            builder = builder.chrome_executable(chrome_path);
        }

        if let Some(ref dir) = config.user_data_dir {
            let _ = std::fs::create_dir_all(dir);
            builder = builder.user_data_dir(dir);
        }

        builder = builder
            .no_sandbox()
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-notifications")
            .arg("--no-default-browser-check")
            .window_size(config.window_width, config.window_height);

        let browser_config = builder
            .build()
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn handler in background; when the handler ends Chrome has
        // disconnected or crashed.
        let session_id_clone = session_id.clone();
        let alive_flag = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive_flag.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Session {} CDP handler event error: {}", session_id_clone, e);
                }
            }
            debug!("Session {} Chrome disconnected (event handler ended)", session_id_clone);
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        // Chrome opens with a blank tab; adopt it and close any extras.
        let page = {
            let mut pages = browser
                .pages()
                .await
                .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

            let main_page = if !pages.is_empty() {
                pages.remove(0)
            } else {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?
            };

            for extra_page in pages {
                debug!("Closing extra blank tab");
                let _ = extra_page.close().await;
            }

            main_page
        };

        // Network domain must be enabled for the quiescence event listeners.
        page.execute(EnableParams::default())
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Browser session {} created", session_id);

        Ok(Self {
            id: session_id,
            browser: Arc::new(RwLock::new(Some(browser))),
            page: Arc::new(RwLock::new(Some(page))),
            config,
            alive: alive_flag,
        })
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check if the session is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Clone out the active page handle
    async fn page(&self) -> Result<Page, BrowserError> {
        self.page
            .read()
            .await
            .clone()
            .ok_or_else(|| BrowserError::ConnectionLost("No active page".into()))
    }

    /// Navigate to a URL
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        let page = self.page().await?;

        debug!("Session {} navigating to: {}", self.id, url);
        tokio::time::timeout(Duration::from_secs(self.config.timeout_secs), page.goto(url))
            .await
            .map_err(|_| BrowserError::Timeout(format!("Navigation to {} timed out", url)))?
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    /// Wait until network activity has been idle for a short continuous
    /// window, the heuristic "page finished loading" signal.
    ///
    /// Reaching the overall cap proceeds rather than fails.
    pub async fn wait_for_quiescence(&self) -> Result<(), BrowserError> {
        let page = self.page().await?;

        let mut requests = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        let cap = tokio::time::sleep(QUIESCENCE_CAP);
        tokio::pin!(cap);

        loop {
            // The quiet timer re-arms on every observed network event.
            let quiet = tokio::time::sleep(NETWORK_IDLE_WINDOW);
            tokio::pin!(quiet);

            tokio::select! {
                _ = &mut quiet => return Ok(()),
                _ = &mut cap => {
                    debug!("Session {} quiescence wait capped after {:?}", self.id, QUIESCENCE_CAP);
                    return Ok(());
                }
                maybe = requests.next() => if maybe.is_none() { return Ok(()); },
                maybe = finished.next() => if maybe.is_none() { return Ok(()); },
                maybe = failed.next() => if maybe.is_none() { return Ok(()); },
            }
        }
    }

    /// Fixed settle delay between quiescence and the first interaction
    pub async fn settle(&self, delay: Duration) {
        debug!("Session {} settling for {:?}", self.id, delay);
        tokio::time::sleep(delay).await;
    }

    /// Suspend until an element matching the selector appears in the
    /// document, or the timeout elapses.
    pub async fn wait_for_element(
        &self,
        selector: &str,
        timeout: Duration,
    ) -> Result<Element, BrowserError> {
        let page = self.page().await?;
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Ok(element) = page.find_element(selector).await {
                return Ok(element);
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(BrowserError::ElementNotFound(format!(
                    "{} (waited {}s)",
                    selector,
                    timeout.as_secs()
                )));
            }
            tokio::time::sleep(ELEMENT_POLL_INTERVAL).await;
        }
    }

    /// Find all elements currently matching the selector
    pub async fn find_elements(&self, selector: &str) -> Result<Vec<Element>, BrowserError> {
        let page = self.page().await?;
        page.find_elements(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))
    }

    /// Read the named attribute from an element, `None` when unset
    pub async fn read_attribute(
        &self,
        element: &Element,
        name: &str,
    ) -> Result<Option<String>, BrowserError> {
        element
            .attribute(name)
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))
    }

    /// Click an element
    pub async fn click(&self, element: &Element) -> Result<(), BrowserError> {
        element
            .click()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;
        Ok(())
    }

    /// Type text into an element character by character and submit with an
    /// Enter keystroke. Uses raw CDP keyboard events with a non-zero delay
    /// between characters.
    pub async fn type_and_submit(
        &self,
        element: &Element,
        text: &str,
    ) -> Result<(), BrowserError> {
        let page = self.page().await?;

        // Focus the element first
        element.click().await.ok();

        let mut rng = rand::rngs::StdRng::from_entropy();

        for c in text.chars() {
            let key_down = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::KeyDown)
                .text(c.to_string())
                .build()
                .unwrap();
            page.execute(key_down)
                .await
                .map_err(|e| BrowserError::JavaScriptError(format!("CDP keyDown failed: {}", e)))?;

            let key_up = DispatchKeyEventParams::builder()
                .r#type(DispatchKeyEventType::KeyUp)
                .build()
                .unwrap();
            page.execute(key_up)
                .await
                .map_err(|e| BrowserError::JavaScriptError(format!("CDP keyUp failed: {}", e)))?;

            let delay = rng.gen_range(60..140);
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        self.press_enter(&page).await
    }

    /// Press Enter via raw CDP key events (triggers form submission)
    async fn press_enter(&self, page: &Page) -> Result<(), BrowserError> {
        let key_down = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::RawKeyDown)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .build()
            .unwrap();
        page.execute(key_down)
            .await
            .map_err(|e| BrowserError::JavaScriptError(format!("CDP Enter keyDown failed: {}", e)))?;

        // char event with \r triggers form submission in most browsers
        let char_event = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::Char)
            .text("\r")
            .build()
            .unwrap();
        page.execute(char_event)
            .await
            .map_err(|e| BrowserError::JavaScriptError(format!("CDP Enter char failed: {}", e)))?;

        let key_up = DispatchKeyEventParams::builder()
            .r#type(DispatchKeyEventType::KeyUp)
            .key("Enter")
            .code("Enter")
            .windows_virtual_key_code(13)
            .native_virtual_key_code(13)
            .build()
            .unwrap();
        page.execute(key_up)
            .await
            .map_err(|e| BrowserError::JavaScriptError(format!("CDP Enter keyUp failed: {}", e)))?;

        Ok(())
    }

    /// Wait for an in-flight navigation to complete
    pub async fn wait_for_navigation(&self, timeout_secs: u64) -> Result<(), BrowserError> {
        let page = self.page().await?;

        tokio::time::timeout(Duration::from_secs(timeout_secs), page.wait_for_navigation())
            .await
            .map_err(|_| BrowserError::Timeout("Navigation timeout".into()))?
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        Ok(())
    }

    /// Read the current document title
    pub async fn title(&self) -> Result<String, BrowserError> {
        let page = self.page().await?;
        let title = page
            .get_title()
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;
        Ok(title.unwrap_or_default())
    }

    /// Execute JavaScript on the page and return its value as JSON
    pub async fn execute_js(&self, script: &str) -> Result<serde_json::Value, BrowserError> {
        let page = self.page().await?;
        let result = page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::JavaScriptError(e.to_string()))?;
        Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
    }

    /// Close the browser session. Best-effort: failures are logged, never
    /// propagated.
    pub async fn close(&self) {
        self.alive.store(false, Ordering::Relaxed);

        {
            let mut page = self.page.write().await;
            if let Some(p) = page.take() {
                let _ = p.close().await;
            }
        }

        {
            let mut browser = self.browser.write().await;
            if let Some(mut b) = browser.take() {
                if let Err(e) = b.close().await {
                    warn!("Session {} browser close failed: {}", self.id, e);
                }
                let _ = b.wait().await;
            }
        }

        info!("Browser session {} closed", self.id);
    }
}

/// Run a scripted task against a fresh browser session, closing the session
/// unconditionally afterward — including when the task errors. The task's
/// result is returned only after the release step completes.
pub async fn with_session<T, F, Fut>(
    config: BrowserSessionConfig,
    stats: &RunStats,
    task: F,
) -> Result<T, BrowserError>
where
    F: FnOnce(Arc<BrowserSession>) -> Fut,
    Fut: Future<Output = Result<T, BrowserError>>,
{
    let session = Arc::new(BrowserSession::launch(config).await?);
    stats.record_session_opened();

    let result = task(Arc::clone(&session)).await;

    session.close().await;
    stats.record_session_closed();

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolated_configs_get_distinct_data_dirs() {
        let a = BrowserSessionConfig::isolated();
        let b = BrowserSessionConfig::isolated();

        let dir_a = a.user_data_dir.unwrap();
        let dir_b = b.user_data_dir.unwrap();
        assert_ne!(dir_a, dir_b);
        assert!(dir_a.contains("browser_data"));
    }

    #[test]
    fn test_config_builders() {
        let config = BrowserSessionConfig::isolated()
            .headless(false)
            .chrome_path(Some("/usr/bin/chromium".into()))
            .timeout(30);

        assert!(!config.headless);
        assert_eq!(config.chrome_path.as_deref(), Some("/usr/bin/chromium"));
        assert_eq!(config.timeout_secs, 30);
    }
}
