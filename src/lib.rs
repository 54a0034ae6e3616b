pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod fetch;
pub mod scrape;
pub mod storage;
pub mod thumbnail;

use browser::BrowserEngine;
use config::Config;
use fetch::MediaFetcher;
use std::sync::Arc;
use storage::ObjectStorage;

/// Application state shared across handlers. The service handles are
/// stateless and reused across requests; constructing them in `main` and
/// injecting them here keeps the pipelines substitutable with test doubles.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub storage: Arc<dyn ObjectStorage>,
    pub browser: Arc<dyn BrowserEngine>,
}
