//! PNG card route handler.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::CardError;
use crate::pipeline;
use crate::state::AppState;

/// Handle `GET /api/png/{user_id}`.
pub async fn png_card(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, CardError> {
    let user_id = user_id.trim().to_string();

    if let Some(cached) = state.png_cache.get(&user_id).await {
        tracing::debug!(user = %user_id, "png cache hit");
        return Ok(png_response(&state, &cached));
    }

    tracing::debug!(user = %user_id, "png cache miss, generating");

    let png = pipeline::generate_png(&state, &user_id).await?;
    state.png_cache.insert(user_id, png.clone()).await;

    Ok(png_response(&state, &png))
}

/// Build an HTTP response with binary PNG content and cache headers.
fn png_response(state: &AppState, png: &[u8]) -> Response {
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static("image/png")),
        (header::CACHE_CONTROL, super::cache_control(state)),
    ];

    (StatusCode::OK, headers, png.to_vec()).into_response()
}
