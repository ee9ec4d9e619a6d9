//! Browser interaction: load the page, click the element tile, wait for the
//! data panel to settle, read it.

mod session;
pub mod stabilize;

pub use session::{EokaLauncher, EokaSession};

use crate::config::{SiteConfig, TimingConfig};
use crate::selector::Locator;
use crate::{CompoundSource, Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// How long to wait for, and in what state, before touching an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitCondition {
    /// Attached and visible, so a click will land.
    Clickable,
    /// Attached to the DOM.
    Present,
}

/// One live browser page.
#[async_trait]
pub trait BrowserSession: Send + Sync {
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Wait until the element matches `condition`, failing with a timeout
    /// error after `timeout`.
    async fn wait_for(&self, locator: &Locator, condition: WaitCondition, timeout: Duration) -> Result<()>;

    /// Rendered text of the element.
    async fn read_text(&self, locator: &Locator) -> Result<String>;

    async fn click(&self, locator: &Locator) -> Result<()>;

    /// Release the browser. Called exactly once.
    async fn close(&mut self) -> Result<()>;
}

/// Opens browser sessions. One session per lookup.
#[async_trait]
pub trait Launcher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>>;
}

/// Driver progress, logged on each transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    PageLoaded,
    TargetClicked,
    ContentStabilizing,
    ContentReady,
    SecondaryPageLoaded,
    Done,
    Failed,
}

impl fmt::Display for DriverState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::PageLoaded => "page_loaded",
            Self::TargetClicked => "target_clicked",
            Self::ContentStabilizing => "content_stabilizing",
            Self::ContentReady => "content_ready",
            Self::SecondaryPageLoaded => "secondary_page_loaded",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Text pulled from the page plus the compounds for its symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawExtraction {
    pub click_text: String,
    pub read_text: String,
    pub compounds: Vec<String>,
}

/// Why an extraction failed. Does not say which step failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverFailure {
    #[error("timed out: {0}")]
    TimedOut(String),
    #[error("{0}")]
    Failed(String),
}

impl DriverFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut(_))
    }
}

impl From<Error> for DriverFailure {
    fn from(e: Error) -> Self {
        if e.is_timeout() {
            Self::TimedOut(e.to_string())
        } else {
            Self::Failed(e.to_string())
        }
    }
}

/// Runs the click-then-read sequence against one session.
#[derive(Clone)]
pub struct InteractionDriver {
    site: SiteConfig,
    timing: TimingConfig,
    compounds: Arc<dyn CompoundSource>,
}

impl InteractionDriver {
    pub fn new(site: SiteConfig, timing: TimingConfig, compounds: Arc<dyn CompoundSource>) -> Self {
        Self {
            site,
            timing,
            compounds,
        }
    }

    /// Run the sequence and close the session, whatever the outcome.
    ///
    /// Takes ownership so it can run on its own task.
    pub async fn extract(
        self,
        mut session: Box<dyn BrowserSession>,
        click: Locator,
        read: Locator,
    ) -> std::result::Result<RawExtraction, DriverFailure> {
        let mut state = DriverState::Idle;
        let outcome = self.run(session.as_ref(), &click, &read, &mut state).await;

        if let Err(ref e) = outcome {
            warn!("Extraction failed in state {}: {}", state, e);
            transition(&mut state, DriverState::Failed);
        }
        if let Err(e) = session.close().await {
            warn!("Session teardown failed: {}", e);
        }

        outcome.map_err(DriverFailure::from)
    }

    async fn run(
        &self,
        session: &dyn BrowserSession,
        click: &Locator,
        read: &Locator,
        state: &mut DriverState,
    ) -> Result<RawExtraction> {
        let wait = self.timing.wait_timeout();

        let url = self.view_url(&self.site.properties_fragment)?;
        info!("Navigating to: {}", url);
        session.navigate(&url).await?;
        transition(state, DriverState::PageLoaded);

        session.wait_for(click, WaitCondition::Clickable, wait).await?;
        let click_text = session.read_text(click).await?;
        let symbol = click_text
            .trim()
            .lines()
            .nth(1)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::ElementNotFound(format!("no symbol line in {}", click)))?
            .to_string();
        info!("click: {} ({})", click, symbol);
        session.click(click).await?;
        transition(state, DriverState::TargetClicked);

        session.wait_for(read, WaitCondition::Present, wait).await?;
        transition(state, DriverState::ContentStabilizing);

        let settled = stabilize::watch(
            move || session.read_text(read),
            self.timing.poll_interval(),
            self.timing.stabilize_ceiling(),
        )
        .await?;
        if !settled.settled {
            warn!(
                "{} did not settle after {} samples, using last sample",
                read, settled.samples
            );
        }
        transition(state, DriverState::ContentReady);

        if self.site.mirror_compounds_view {
            let url = self.view_url(&self.site.compounds_fragment)?;
            debug!("Navigating to: {}", url);
            session.navigate(&url).await?;
        }
        transition(state, DriverState::SecondaryPageLoaded);

        let compounds = self.compounds.compounds(&symbol).await;
        debug!("{} compounds for {}", compounds.len(), symbol);
        transition(state, DriverState::Done);

        Ok(RawExtraction {
            click_text,
            read_text: settled.text,
            compounds,
        })
    }

    fn view_url(&self, fragment: &str) -> Result<String> {
        let mut url = Url::parse(&self.site.url)
            .map_err(|e| Error::Config(format!("site.url '{}': {}", self.site.url, e)))?;
        url.set_fragment(Some(fragment));
        Ok(url.into())
    }
}

fn transition(state: &mut DriverState, next: DriverState) {
    debug!("{} -> {}", state, next);
    *state = next;
}
