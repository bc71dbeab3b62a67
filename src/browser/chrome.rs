use crate::config::Viewport;
use crate::error::{Result, SuiteError};
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How long `navigate` waits for the page load event
const LOAD_TIMEOUT: Duration = Duration::from_secs(30);

pub struct ChromeDriver {
    browser: Browser,
    temp_dir: Option<PathBuf>,
    viewport: Option<Viewport>,
}

/// Connection mode for Chrome browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionMode {
    /// Sandboxed mode - launches Chrome using system installation
    Sandboxed {
        chrome_path: Option<String>,
        no_sandbox: bool,
        headless: bool,
    },
    /// Advanced mode - connects to existing Chrome on debug port
    DebugPort(u16),
}

impl ChromeDriver {
    /// Create new ChromeDriver with specified connection mode
    pub async fn new(mode: ConnectionMode) -> Result<Self> {
        let (browser, temp_dir) = match mode {
            ConnectionMode::Sandboxed {
                chrome_path,
                no_sandbox,
                headless,
            } => {
                // Unique profile directory per browser instance so parallel
                // scenarios never share profile data
                let unique_id = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .map_err(|e| SuiteError::LaunchFailed(format!("System clock error: {}", e)))?
                    .as_nanos();
                let temp_dir =
                    std::env::temp_dir().join(format!("product-modal-e2e-{}", unique_id));
                std::fs::create_dir_all(&temp_dir).map_err(|e| {
                    SuiteError::LaunchFailed(format!("Failed to create temp directory: {}", e))
                })?;

                let mut config = if headless {
                    BrowserConfig::builder()
                } else {
                    BrowserConfig::builder().with_head()
                };

                config = config.user_data_dir(&temp_dir);

                // Linux AppArmor workaround
                if no_sandbox {
                    config = config.arg("--no-sandbox");
                }

                // Without an explicit path chromiumoxide looks up the system Chrome
                if let Some(path) = chrome_path {
                    config = config.chrome_executable(path);
                }

                let config = config.build().map_err(|e| {
                    SuiteError::LaunchFailed(format!(
                        "{}. \n\n\
                         Chrome not found. You can:\n\
                         - Install Chrome: https://www.google.com/chrome/\n\
                         - Ubuntu/Debian: sudo apt install chromium-browser\n\
                         - Or specify path: --chrome-path /path/to/chrome",
                        e
                    ))
                })?;

                let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
                    SuiteError::LaunchFailed(format!(
                        "{}. Linux sandbox issue? Try: --no-sandbox",
                        e
                    ))
                })?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Drive browser events
                    }
                });

                (browser, Some(temp_dir))
            }
            ConnectionMode::DebugPort(port) => {
                let url = format!("http://localhost:{}", port);
                let (browser, mut handler) = Browser::connect(&url).await.map_err(|e| {
                    SuiteError::ConnectionFailed(format!(
                        "Failed to connect to Chrome on port {}. \
                             Make sure Chrome is running with --remote-debugging-port={}: {}",
                        port, port, e
                    ))
                })?;

                tokio::spawn(async move {
                    while (handler.next().await).is_some() {
                        // Drive browser events
                    }
                });

                (browser, None)
            }
        };

        Ok(Self {
            browser,
            temp_dir,
            viewport: None,
        })
    }

    /// Emulate this viewport on every page returned by `navigate`
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = Some(viewport);
        self
    }

    /// Navigate a fresh page to `url` and wait for its load event
    pub async fn navigate(&self, url: &str) -> Result<Page> {
        use chromiumoxide::cdp::browser_protocol::page::{EventLoadEventFired, NavigateParams};

        log::info!("Navigating to {}", url);

        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| SuiteError::NavigationFailed(format!("Failed to create page: {}", e)))?;

        if let Some(viewport) = self.viewport {
            Self::set_viewport(&page, viewport).await?;
        }

        // Subscribe before navigating so the load event cannot be missed
        let mut load_events = page.event_listener::<EventLoadEventFired>().await?;

        let params = NavigateParams::builder()
            .url(url)
            .build()
            .map_err(|e| SuiteError::NavigationFailed(format!("Invalid URL {}: {}", url, e)))?;

        let response = page.execute(params).await.map_err(|e| {
            let error_str = e.to_string();

            // "oneshot canceled" means the browser connection is gone
            if error_str.contains("oneshot canceled") {
                SuiteError::NavigationFailed(
                    "Browser connection lost. The browser may have been closed or crashed."
                        .to_string(),
                )
            } else {
                SuiteError::NavigationFailed(format!("Failed to navigate to {}: {}", url, e))
            }
        })?;

        if let Some(error_text) = &response.result.error_text {
            return Err(SuiteError::NavigationFailed(format!(
                "Navigation error: {}",
                error_text
            )));
        }

        match tokio::time::timeout(LOAD_TIMEOUT, load_events.next()).await {
            Ok(Some(_)) => log::debug!("Load event fired for {}", url),
            Ok(None) => log::warn!("Load event stream closed before {} finished loading", url),
            Err(_) => {
                return Err(SuiteError::NavigationFailed(format!(
                    "Timed out after {:?} waiting for {} to load",
                    LOAD_TIMEOUT, url
                )));
            }
        }

        Ok(page)
    }

    async fn set_viewport(page: &Page, viewport: Viewport) -> Result<()> {
        use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;

        let params: SetDeviceMetricsOverrideParams = serde_json::from_value(serde_json::json!({
            "width": viewport.width,
            "height": viewport.height,
            "deviceScaleFactor": 1,
            "mobile": false,
        }))
        .map_err(|e| SuiteError::Other(format!("Invalid viewport {}: {}", viewport, e)))?;

        page.execute(params).await?;
        log::debug!("Viewport set to {}", viewport);
        Ok(())
    }

    /// Take a PNG screenshot of `page`
    pub async fn screenshot(page: &Page) -> Result<Vec<u8>> {
        page.screenshot(chromiumoxide::page::ScreenshotParams::default())
            .await
            .map_err(|e| SuiteError::Other(format!("Failed to take screenshot: {}", e)))
    }

    /// Take a screenshot of `page` and save it to `path`
    pub async fn screenshot_to_file(page: &Page, path: &Path) -> Result<()> {
        let screenshot_data = Self::screenshot(page).await?;

        tokio::fs::write(path, screenshot_data)
            .await
            .map_err(|e| SuiteError::Other(format!("Failed to write screenshot: {}", e)))?;

        Ok(())
    }

    /// Close the browser connection
    pub async fn close(mut self) -> Result<()> {
        self.browser
            .close()
            .await
            .map_err(|e| SuiteError::Other(e.to_string()))?;
        Ok(())
    }
}

impl Drop for ChromeDriver {
    fn drop(&mut self) {
        if let Some(temp_dir) = &self.temp_dir {
            if temp_dir.exists() {
                let _ = std::fs::remove_dir_all(temp_dir);
            }
        }
    }
}
