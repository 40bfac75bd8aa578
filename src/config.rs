//! Application configuration loaded from environment variables.

use crate::diary::DiarySource;

/// Default primary display font for the SVG/PNG card.
const DEFAULT_FONT_URL: &str =
    "https://8font.com/wp-content/uploads/2023/10/TiemposText-Semibold.ttf";

/// Fallback font used when the primary URL cannot be fetched.
const DEFAULT_FONT_FALLBACK_URL: &str =
    "https://github.com/google/fonts/raw/main/ofl/cantataone/CantataOne-Regular.ttf";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address (e.g., "0.0.0.0:8080").
    pub bind_addr: String,

    /// Letterboxd base URL. Overridable so tests and mirrors can point the
    /// fetchers elsewhere.
    pub letterboxd_url: String,

    /// Which external representation to normalize from (diary page or RSS feed).
    pub source: DiarySource,

    /// Value for `Cache-Control: public, max-age=<N>` on card responses,
    /// in seconds.
    pub cache_max_age: u32,

    /// Primary display font URL for the SVG/PNG card.
    pub font_url: String,

    /// Fallback font URL, used when the primary fetch fails.
    pub font_fallback_url: String,

    /// Path to the static HTML page template.
    pub template_path: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// All variables are optional and default for local development:
    /// - `CARD_BIND_ADDR`: Server bind address (default: "0.0.0.0:8080")
    /// - `CARD_LETTERBOXD_URL`: Letterboxd base URL (default: "https://letterboxd.com")
    /// - `CARD_SOURCE`: "html" or "rss" (default: "rss")
    /// - `CARD_CACHE_MAX_AGE`: Cache-Control max-age seconds (default: 3600)
    /// - `CARD_FONT_URL`: Primary card font URL
    /// - `CARD_FONT_FALLBACK_URL`: Fallback card font URL
    /// - `CARD_TEMPLATE_PATH`: Page template path (default: "assets/template.html")
    pub fn from_env() -> anyhow::Result<Self> {
        let bind_addr =
            std::env::var("CARD_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let letterboxd_url = std::env::var("CARD_LETTERBOXD_URL")
            .unwrap_or_else(|_| "https://letterboxd.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let source: DiarySource = std::env::var("CARD_SOURCE")
            .unwrap_or_else(|_| "rss".to_string())
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;

        let cache_max_age = std::env::var("CARD_CACHE_MAX_AGE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let font_url =
            std::env::var("CARD_FONT_URL").unwrap_or_else(|_| DEFAULT_FONT_URL.to_string());

        let font_fallback_url = std::env::var("CARD_FONT_FALLBACK_URL")
            .unwrap_or_else(|_| DEFAULT_FONT_FALLBACK_URL.to_string());

        let template_path = std::env::var("CARD_TEMPLATE_PATH")
            .unwrap_or_else(|_| "assets/template.html".to_string());

        tracing::info!(
            bind_addr = %bind_addr,
            letterboxd_url = %letterboxd_url,
            source = ?source,
            cache_max_age = cache_max_age,
            template_path = %template_path,
            "configuration loaded"
        );

        Ok(Self {
            bind_addr,
            letterboxd_url,
            source,
            cache_max_age,
            font_url,
            font_fallback_url,
            template_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Mutex to serialize config tests that manipulate env vars.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const ENV_KEYS: &[&str] = &[
        "CARD_BIND_ADDR",
        "CARD_LETTERBOXD_URL",
        "CARD_SOURCE",
        "CARD_CACHE_MAX_AGE",
        "CARD_FONT_URL",
        "CARD_FONT_FALLBACK_URL",
        "CARD_TEMPLATE_PATH",
    ];

    /// Helper to run config tests with isolated env vars.
    /// Uses a mutex to prevent concurrent env var races.
    fn with_env_vars<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let _guard = ENV_MUTEX.lock().unwrap();

        let saved: Vec<_> = ENV_KEYS
            .iter()
            .map(|k| (*k, std::env::var(k).ok()))
            .collect();

        // SAFETY: Serialized by mutex; only test code touches these vars.
        unsafe {
            for k in ENV_KEYS {
                std::env::remove_var(k);
            }
            for (k, v) in vars {
                std::env::set_var(k, v);
            }
        }

        f();

        // SAFETY: Restoring original env state.
        unsafe {
            for (k, v) in &saved {
                match v {
                    Some(val) => std::env::set_var(k, val),
                    None => std::env::remove_var(k),
                }
            }
        }
    }

    #[test]
    fn config_defaults() {
        with_env_vars(&[], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.bind_addr, "0.0.0.0:8080");
            assert_eq!(config.letterboxd_url, "https://letterboxd.com");
            assert_eq!(config.source, DiarySource::Rss);
            assert_eq!(config.cache_max_age, 3600);
            assert_eq!(config.template_path, "assets/template.html");
        });
    }

    #[test]
    fn config_custom_values() {
        with_env_vars(
            &[
                ("CARD_BIND_ADDR", "127.0.0.1:9090"),
                ("CARD_LETTERBOXD_URL", "http://localhost:4000"),
                ("CARD_SOURCE", "html"),
                ("CARD_CACHE_MAX_AGE", "57600"),
                ("CARD_TEMPLATE_PATH", "custom/template.html"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.bind_addr, "127.0.0.1:9090");
                assert_eq!(config.letterboxd_url, "http://localhost:4000");
                assert_eq!(config.source, DiarySource::Html);
                assert_eq!(config.cache_max_age, 57600);
                assert_eq!(config.template_path, "custom/template.html");
            },
        );
    }

    #[test]
    fn config_base_url_trailing_slash_stripped() {
        with_env_vars(&[("CARD_LETTERBOXD_URL", "https://letterboxd.com/")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.letterboxd_url, "https://letterboxd.com");
        });
    }

    #[test]
    fn config_invalid_source_rejected() {
        with_env_vars(&[("CARD_SOURCE", "atom")], || {
            assert!(Config::from_env().is_err());
        });
    }

    #[test]
    fn config_unparseable_max_age_falls_back() {
        with_env_vars(&[("CARD_CACHE_MAX_AGE", "not-a-number")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.cache_max_age, 3600);
        });
    }
}
