//! SVG card route handler.

use axum::extract::{Path, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::error::CardError;
use crate::pipeline;
use crate::state::AppState;

/// Handle `GET /api/svg/{user_id}`.
pub async fn svg_card(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, CardError> {
    let user_id = user_id.trim().to_string();

    if let Some(cached) = state.svg_cache.get(&user_id).await {
        tracing::debug!(user = %user_id, "svg cache hit");
        return Ok(svg_response(&state, &cached));
    }

    tracing::debug!(user = %user_id, "svg cache miss, generating");

    let card = pipeline::generate_svg(&state, &user_id).await?;
    state.svg_cache.insert(user_id, card.svg.clone()).await;

    Ok(svg_response(&state, &card.svg))
}

/// Build an HTTP response with SVG content and cache headers.
fn svg_response(state: &AppState, svg: &str) -> Response {
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("image/svg+xml"),
        ),
        (header::CACHE_CONTROL, super::cache_control(state)),
    ];

    (StatusCode::OK, headers, svg.to_string()).into_response()
}
