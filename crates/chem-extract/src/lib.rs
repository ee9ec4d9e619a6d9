//! # chem-extract
//!
//! Element property extraction from a JavaScript-rendered periodic table.
//! Click the element tile, wait for the data panel to settle, read it, and
//! normalize the text into an [`ElementRecord`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chem_extract::{Config, ElementSearch};
//!
//! # #[tokio::main]
//! # async fn main() -> chem_extract::Result<()> {
//! let config = Config::load("chem-search.yaml")?;
//! let search = ElementSearch::from_config(&config)?;
//! match search.lookup_element("fe").await {
//!     Ok(record) => println!("{}", record),
//!     Err(e) => eprintln!("{}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod config;
pub mod cache;
pub mod driver;
pub mod history;
pub mod pipeline;
pub mod record;
pub mod resolver;
pub mod selector;

pub use cache::{JsonFileCache, MemoryCache, ResultCache};
pub use chem_compounds::{CompoundClient, CompoundConfig, CompoundSource};
pub use config::{
    BrowserConfig, CacheConfig, CompoundsConfig, Config, LocatorConfig, SiteConfig, TimingConfig,
    Viewport,
};
pub use driver::{
    BrowserSession, DriverFailure, DriverState, EokaLauncher, InteractionDriver, Launcher,
    RawExtraction, WaitCondition,
};
pub use history::SearchHistory;
pub use pipeline::{ElementSearch, LookupError};
pub use record::{format_element, ElementRecord, ParsedProperties, Property, PropertyKey};
pub use selector::{Locator, SelectorStrategy};

/// Result type for chem-extract operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during config loading, browser interaction, or caching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("browser error: {0}")]
    Browser(#[from] eoka::Error),

    #[error("compound source error: {0}")]
    Compounds(#[from] chem_compounds::Error),

    #[error("unsupported selector: {0:?}")]
    SelectorUnsupported(String),

    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

impl Error {
    /// Whether this error came from a bounded wait running out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Browser(eoka::Error::Timeout(_)))
    }
}
