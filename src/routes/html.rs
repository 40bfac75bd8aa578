//! HTML card route handler.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::CardError;
use crate::pipeline;
use crate::state::AppState;

/// Handle `GET /api/html/{user_id}`.
pub async fn html_card(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, CardError> {
    let user_id = user_id.trim().to_string();

    if let Some(cached) = state.html_cache.get(&user_id).await {
        tracing::debug!(user = %user_id, "html cache hit");
        return Ok(build_response(&state, &cached));
    }

    tracing::debug!(user = %user_id, "html cache miss, generating");

    let html = pipeline::generate_html(&state, &user_id).await?;
    state.html_cache.insert(user_id, html.clone()).await;

    Ok(build_response(&state, &html))
}

/// Build an HTTP response with HTML content, cache headers, and an ETag.
fn build_response(state: &AppState, html: &str) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(header::CACHE_CONTROL, super::cache_control(state));

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    (StatusCode::OK, headers, html.to_string()).into_response()
}
