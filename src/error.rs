//! Error types for the card service.
//!
//! Every pipeline stage returns a typed `Result`; errors propagate to the
//! HTTP boundary, are logged once there, and surface as a 500 with the
//! error message as the body. Card responses are consumed by `<img>` tags
//! and README embeds, so error bodies are plain text rather than HTML.

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

/// Card service error type.
#[derive(Debug, thiserror::Error)]
pub enum CardError {
    /// An upstream HTTP fetch failed or answered with a non-success status.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The RSS feed could not be parsed.
    #[error("feed parse failed: {0}")]
    Feed(#[from] rss::Error),

    /// The page template could not be loaded or is missing its
    /// content marker.
    #[error("template error: {0}")]
    Template(String),

    /// SVG generation or PNG rasterization failed.
    #[error("image error: {0}")]
    Image(String),

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for CardError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "card generation failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
