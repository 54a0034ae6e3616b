use crate::error::{AppError, Result};
use crate::scrape::{EmbeddedItem, PageState};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36";

const VIEWPORT_WIDTH: u32 = 1366;
const VIEWPORT_HEIGHT: u32 = 768;

/// Window given to late network activity after navigation settles.
const SETTLE_DELAY: Duration = Duration::from_millis(500);

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);

/// In-page lookup of the structured item data the target site keeps in a
/// script global. Returns an empty id when the global is absent or bare so
/// the caller falls back to scanning inline scripts.
const EMBEDDED_ITEM_SCRIPT: &str = r#"
(() => {
    try {
        const data = window.TralbumData;
        if (data && data.id != null) {
            return { id: String(data.id), item_type: data.item_type || 'track' };
        }
    } catch (e) {}
    return { id: '', item_type: 'track' };
})()
"#;

/// Launches an isolated browser session per call.
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    async fn open(&self) -> Result<Box<dyn BrowserSession>>;
}

/// A single scoped browser session. `close` must be called on every exit
/// path; nothing else tears the process down.
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigate to `url`, wait for the page to settle and capture its state.
    async fn load_page_state(&mut self, url: &str) -> Result<PageState>;

    /// Tear down the page, browser process and event handler.
    async fn close(&mut self);
}

/// Chromium-backed engine. Every session is its own sandboxless,
/// single-process browser instance, suitable for restricted-privilege
/// execution environments.
#[derive(Default)]
pub struct ChromiumEngine;

impl ChromiumEngine {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open(&self) -> Result<Box<dyn BrowserSession>> {
        let config = BrowserConfig::builder()
            .no_sandbox()
            .viewport(Some(Viewport {
                width: VIEWPORT_WIDTH,
                height: VIEWPORT_HEIGHT,
                device_scale_factor: Some(1.0),
                ..Default::default()
            }))
            .request_timeout(NAVIGATION_TIMEOUT)
            .arg("--disable-setuid-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--no-first-run")
            .arg("--no-zygote")
            .arg("--single-process")
            .arg("--disable-gpu")
            .build()
            .map_err(AppError::Navigation)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler error: {e}");
                }
            }
        });

        Ok(Box::new(ChromiumSession {
            browser,
            handler_task,
        }))
    }
}

pub struct ChromiumSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn load_page_state(&mut self, url: &str) -> Result<PageState> {
        let page = self.browser.new_page("about:blank").await?;

        // Realistic identification reduces the odds of a bot-specific page
        // variant; must be set before navigation.
        page.execute(SetUserAgentOverrideParams::new(
            DESKTOP_USER_AGENT.to_string(),
        ))
        .await?;

        page.goto(url).await?;
        page.wait_for_navigation().await?;
        tokio::time::sleep(SETTLE_DELAY).await;

        let embedded_item = match page.evaluate(EMBEDDED_ITEM_SCRIPT).await {
            Ok(result) => result
                .into_value::<EmbeddedItem>()
                .ok()
                .filter(|item| !item.id.is_empty()),
            Err(e) => {
                debug!("could not evaluate embedded item data: {e}");
                None
            }
        };

        let html = page.content().await?;

        if let Err(e) = page.close().await {
            warn!("failed to close page: {e}");
        }

        Ok(PageState {
            embedded_item,
            html,
        })
    }

    async fn close(&mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("failed to close browser: {e}");
        }
        let _ = self.browser.wait().await;
        self.handler_task.abort();
    }
}
