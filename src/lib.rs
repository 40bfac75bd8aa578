//! Letterboxd diary cards - HTML, SVG, and PNG renditions of a user's
//! recent diary activity.
//!
//! This crate provides a lightweight HTTP server that scrapes a public
//! Letterboxd profile (diary page or RSS feed), normalizes both sources
//! into a common entry shape, and renders the result as an embeddable
//! HTML page, an 854x160 SVG card, or a rasterized PNG. It is designed
//! to be placed behind a CDN for edge caching.
//!
//! # Architecture
//!
//! - **Fetch**: Retrieves the diary page, RSS feed, poster fragments, and
//!   display font over HTTP
//! - **Normalize**: Converts either source into up to four [`diary::DiaryEntry`]
//!   records
//! - **Render**: Generates the HTML fragment with maud and splices it into
//!   a static page template, then inlines assets and minifies
//! - **Card**: Lays the entries out as an SVG card and rasterizes it with
//!   resvg
//! - **Cache**: In-process moka caches + Cache-Control headers for CDN caching
//!
//! # URL Pattern
//!
//! ```text
//! GET /api/html/{user_id}
//! GET /api/svg/{user_id}
//! GET /api/png/{user_id}
//! ```

pub mod card;
pub mod config;
pub mod diary;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod render;
pub mod routes;
pub mod state;

pub use config::Config;
pub use error::CardError;
pub use routes::router;
pub use state::AppState;
