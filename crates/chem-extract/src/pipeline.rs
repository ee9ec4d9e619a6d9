//! Symbol in, element record out.

use crate::cache::{JsonFileCache, ResultCache};
use crate::config::{Config, SiteConfig, TimingConfig};
use crate::driver::{DriverFailure, EokaLauncher, InteractionDriver, Launcher};
use crate::record::{format_element, ElementRecord};
use crate::{resolver, CompoundClient, CompoundSource, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Why a lookup produced no record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unknown element symbol: {0:?}")]
    UnknownSymbol(String),

    #[error("timed out waiting for element data")]
    ExtractionTimeout,

    #[error("failed to retrieve element data: {0}")]
    ExtractionFailed(String),
}

/// The lookup pipeline: resolve, check the cache, drive a browser, format,
/// store.
///
/// Shareable across tasks. Each lookup that misses the cache launches its own
/// browser session.
#[derive(Clone)]
pub struct ElementSearch {
    site: SiteConfig,
    timing: TimingConfig,
    launcher: Arc<dyn Launcher>,
    cache: Arc<dyn ResultCache>,
    compounds: Arc<dyn CompoundSource>,
}

impl ElementSearch {
    pub fn new(
        config: &Config,
        launcher: Arc<dyn Launcher>,
        cache: Arc<dyn ResultCache>,
        compounds: Arc<dyn CompoundSource>,
    ) -> Self {
        Self {
            site: config.site.clone(),
            timing: config.timing.clone(),
            launcher,
            cache,
            compounds,
        }
    }

    /// Eoka browser, JSON file cache and HTTP compound client, all from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let compounds = CompoundClient::new(&config.compounds.client_config())?;
        Ok(Self::new(
            config,
            Arc::new(EokaLauncher::new(config.browser.clone())),
            Arc::new(JsonFileCache::new(&config.cache.dir)),
            Arc::new(compounds),
        ))
    }

    /// Look up one element by symbol, case-insensitive.
    pub async fn lookup_element(&self, symbol: &str) -> std::result::Result<ElementRecord, LookupError> {
        let symbol = symbol.trim();
        let atomic_id = resolver::atomic_id(symbol)
            .ok_or_else(|| LookupError::UnknownSymbol(symbol.to_string()))?;

        match self.cache.lookup(symbol) {
            Ok(Some(record)) => {
                info!("Cache hit: {}", resolver::capitalize(symbol));
                return Ok(record);
            }
            Ok(None) => debug!("Cache miss: {}", resolver::capitalize(symbol)),
            Err(e) => warn!("Unreadable cache entry for {}, ignoring: {}", symbol, e),
        }

        let click = self
            .site
            .click_locator(&atomic_id)
            .map_err(|e| LookupError::ExtractionFailed(e.to_string()))?;
        let read = self
            .site
            .read_locator()
            .map_err(|e| LookupError::ExtractionFailed(e.to_string()))?;

        let launcher = self.launcher.clone();
        let driver = InteractionDriver::new(self.site.clone(), self.timing.clone(), self.compounds.clone());

        // Own task, from launch on, so the session is closed even if this
        // future is dropped.
        let task = tokio::spawn(async move {
            let session = launcher.launch().await.map_err(DriverFailure::from)?;
            driver.extract(session, click, read).await
        });
        let raw = task
            .await
            .map_err(|e| LookupError::ExtractionFailed(e.to_string()))?
            .map_err(|failure| {
                if failure.is_timeout() {
                    LookupError::ExtractionTimeout
                } else {
                    LookupError::ExtractionFailed(failure.to_string())
                }
            })?;

        if raw.click_text.trim().is_empty() || raw.read_text.trim().is_empty() {
            return Err(LookupError::ExtractionFailed("page returned no element text".into()));
        }

        let record = format_element(&raw.click_text, &raw.read_text, raw.compounds);
        if let Err(e) = self.cache.store(symbol, &record) {
            warn!("Failed to cache {}: {}", symbol, e);
        }
        Ok(record)
    }
}
