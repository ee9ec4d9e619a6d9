use super::{BrowserSession, Launcher, WaitCondition};
use crate::config::BrowserConfig;
use crate::selector::Locator;
use crate::{Error, Result};
use async_trait::async_trait;
use eoka::{Browser, Page};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Poll cadence while waiting for an XPath to match.
const XPATH_POLL: Duration = Duration::from_millis(100);

/// Resolve an XPath to its first element node and return a CSS selector for
/// it. The node is tagged once; a node that already carries a tag keeps it.
const MARK_XPATH_JS: &str = r#"(() => {
    const found = document.evaluate(XPATH, document, null, XPathResult.FIRST_ORDERED_NODE_TYPE, null);
    const el = found.singleNodeValue;
    if (!el || el.nodeType !== Node.ELEMENT_NODE) return null;
    let mark = el.getAttribute('data-chem-locator');
    if (!mark) {
        mark = MARK;
        el.setAttribute('data-chem-locator', mark);
    }
    return "[data-chem-locator='" + mark + "']";
})()"#;

const READ_TEXT_JS: &str = r#"(() => {
    const el = document.querySelector(SELECTOR);
    return el ? el.innerText : null;
})()"#;

static MARKS: AtomicU64 = AtomicU64::new(0);

/// Launches headless Chrome through eoka.
#[derive(Debug, Clone, Default)]
pub struct EokaLauncher {
    browser: BrowserConfig,
}

impl EokaLauncher {
    pub fn new(browser: BrowserConfig) -> Self {
        Self { browser }
    }
}

#[async_trait]
impl Launcher for EokaLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>> {
        Ok(Box::new(EokaSession::launch(&self.browser).await?))
    }
}

/// A browser with one page.
pub struct EokaSession {
    browser: Option<Browser>,
    page: Page,
}

impl EokaSession {
    pub async fn launch(config: &BrowserConfig) -> Result<Self> {
        let stealth = eoka::StealthConfig {
            headless: config.headless,
            proxy: config.proxy.clone(),
            user_agent: config.user_agent.clone(),
            viewport_width: config.viewport.as_ref().map(|v| v.width).unwrap_or(1280),
            viewport_height: config.viewport.as_ref().map(|v| v.height).unwrap_or(720),
            ..Default::default()
        };

        debug!(
            "Launching browser (headless: {}, proxy: {:?})",
            config.headless, config.proxy
        );
        let browser = Browser::launch_with_config(stealth).await?;
        let page = match browser.new_page("about:blank").await {
            Ok(page) => page,
            Err(e) => {
                if let Err(close_err) = browser.close().await {
                    warn!("Browser teardown failed: {}", close_err);
                }
                return Err(e.into());
            }
        };

        Ok(Self {
            browser: Some(browser),
            page,
        })
    }

    /// The underlying page.
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// CSS selector for a locator, resolving XPath in the page. Waits up to
    /// `timeout` for an XPath to match.
    async fn css(&self, locator: &Locator, timeout: Duration) -> Result<String> {
        if let Some(css) = locator.css() {
            return Ok(css);
        }
        let Locator::XPath(xpath) = locator else {
            return Err(Error::SelectorUnsupported(locator.to_string()));
        };

        let mark = MARKS.fetch_add(1, Ordering::Relaxed).to_string();
        let js = MARK_XPATH_JS
            .replace("MARK", &serde_json::to_string(&mark)?)
            .replace("XPATH", &serde_json::to_string(xpath)?);
        let deadline = Instant::now() + timeout;
        loop {
            let found: Option<String> = self.page.evaluate(&js).await?;
            if let Some(css) = found {
                return Ok(css);
            }
            if Instant::now() + XPATH_POLL > deadline {
                return Err(Error::Timeout(format!("{} after {:?}", locator, timeout)));
            }
            tokio::time::sleep(XPATH_POLL).await;
        }
    }
}

#[async_trait]
impl BrowserSession for EokaSession {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.page.goto(url).await?;
        Ok(())
    }

    async fn wait_for(&self, locator: &Locator, condition: WaitCondition, timeout: Duration) -> Result<()> {
        let start = Instant::now();
        let selector = self.css(locator, timeout).await?;
        let remaining = timeout.saturating_sub(start.elapsed()).as_millis() as u64;
        debug!("wait_for {:?}: {}", condition, selector);

        let waited = match condition {
            WaitCondition::Clickable => self.page.wait_for_visible(&selector, remaining).await,
            WaitCondition::Present => self.page.wait_for(&selector, remaining).await,
        };
        match waited {
            Ok(_) => Ok(()),
            Err(eoka::Error::Timeout(_)) => {
                Err(Error::Timeout(format!("{} after {:?}", locator, timeout)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn read_text(&self, locator: &Locator) -> Result<String> {
        let selector = self.css(locator, Duration::ZERO).await?;
        let js = READ_TEXT_JS.replace("SELECTOR", &serde_json::to_string(&selector)?);
        let text: Option<String> = self.page.evaluate(&js).await?;
        text.ok_or_else(|| Error::ElementNotFound(locator.to_string()))
    }

    async fn click(&self, locator: &Locator) -> Result<()> {
        let selector = self.css(locator, Duration::ZERO).await?;
        self.page.click(&selector).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(browser) = self.browser.take() {
            browser.close().await?;
        }
        Ok(())
    }
}
