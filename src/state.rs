//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;

use crate::config::Config;
use crate::render::template::Template;

/// Type alias for the rendered-HTML response cache (user id -> page).
pub type HtmlCache = Cache<String, String>;

/// Type alias for the SVG card cache (user id -> SVG document).
pub type SvgCache = Cache<String, String>;

/// Type alias for the PNG card cache (user id -> PNG bytes).
pub type PngCache = Cache<String, Vec<u8>>;

/// Cache capacity (number of entries per cache). Pages are a few KB,
/// PNGs a few hundred KB.
const CACHE_CAPACITY: u64 = 10_000;

/// Cache TTL. Diary activity changes at human pace; the CDN in front
/// holds responses longer via Cache-Control.
const CACHE_TTL: Duration = Duration::from_secs(300);

/// Upstream fetch timeout. The external profile page and poster
/// endpoints occasionally hang; a request must not.
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared application state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// HTTP client for all upstream fetches.
    pub http: reqwest::Client,

    /// Application configuration.
    pub config: Arc<Config>,

    /// Page template, loaded and validated at startup.
    pub template: Arc<Template>,

    /// In-memory caches for the three card renditions, keyed by user id.
    pub html_cache: HtmlCache,
    pub svg_cache: SvgCache,
    pub png_cache: PngCache,
}

impl AppState {
    /// Create application state from configuration.
    ///
    /// Fails when the page template cannot be loaded or is missing its
    /// content marker.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let template = Template::from_file(&config.template_path)?;

        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()?;

        let html_cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        let svg_cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        let png_cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();

        tracing::info!(
            cache_capacity = CACHE_CAPACITY,
            cache_ttl_secs = CACHE_TTL.as_secs(),
            fetch_timeout_secs = FETCH_TIMEOUT.as_secs(),
            "application state initialized"
        );

        Ok(Self {
            http,
            config: Arc::new(config),
            template: Arc::new(template),
            html_cache,
            svg_cache,
            png_cache,
        })
    }
}
