pub mod schema;

pub use schema::{
    BrowserConfig, CacheConfig, CompoundsConfig, Config, LocatorConfig, SiteConfig, TimingConfig,
    Viewport,
};
