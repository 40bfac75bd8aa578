//! Route definitions for the card service.
//!
//! ## Routes
//!
//! - `GET /health` - Health check (JSON)
//! - `GET /api/html/{user_id}` - Self-contained HTML page
//! - `GET /api/svg/{user_id}` - SVG card
//! - `GET /api/png/{user_id}` - Rasterized PNG card
//!
//! The text endpoints (html, svg) are gzip-compressed; the PNG endpoint
//! is served uncompressed.

mod health;
mod html;
mod png;
mod svg;

use axum::Router;
use axum::http::{HeaderValue, Request};
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::state::AppState;

/// Build the complete card service router, middleware included.
///
/// Cards are embedded cross-origin (README badges, profile widgets), so
/// CORS is wide open.
pub fn router(state: AppState) -> Router {
    let text = Router::new()
        .route("/html/{user_id}", get(html::html_card))
        .route("/svg/{user_id}", get(svg::svg_card))
        .layer(CompressionLayer::new());

    let api = text.merge(Router::new().route("/png/{user_id}", get(png::png_card)));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api)
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                tracing::span!(
                    Level::INFO,
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Uniform Cache-Control header for all card responses.
pub(crate) fn cache_control(state: &AppState) -> HeaderValue {
    HeaderValue::from_str(&format!("public, max-age={}", state.config.cache_max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=3600"))
}
