//! Pipeline orchestration: fetch, normalize, render, post-process, and
//! convert through the image chain.
//!
//! Each `generate_*` function runs a prefix of the full chain:
//!
//! ```text
//! fetch -> normalize -> render -> post-process   (html)
//!                    \-> vectorize               (svg)
//!                         \-> rasterize          (png)
//! ```

use crate::card::{self, VectorCard};
use crate::diary::{self, DiaryEntry, DiarySource};
use crate::error::CardError;
use crate::fetch;
use crate::render;
use crate::render::postprocess;
use crate::state::AppState;

/// Fetch and normalize diary entries from the configured source.
pub async fn entries(state: &AppState, user: &str) -> Result<Vec<DiaryEntry>, CardError> {
    let base = &state.config.letterboxd_url;

    match state.config.source {
        DiarySource::Html => {
            let page = fetch::diary_page(&state.http, base, user).await?;
            diary::from_html(&state.http, base, &page).await
        }
        DiarySource::Rss => {
            let channel = fetch::diary_feed(&state.http, base, user).await?;
            Ok(diary::from_feed(&channel))
        }
    }
}

/// Generate the self-contained, minified HTML page.
pub async fn generate_html(state: &AppState, user: &str) -> Result<String, CardError> {
    let entries = entries(state, user).await?;

    tracing::debug!(user = %user, entries = entries.len(), "rendering html card");

    let body = render::fragment(&entries).into_string();
    let page = state.template.splice(&body);
    let inlined = postprocess::inline_assets(&state.http, &page).await;

    Ok(postprocess::minify(&inlined))
}

/// Generate the SVG card.
///
/// Poster references are inlined to data URIs first so the vector image
/// is self-contained, then the display font is fetched (primary URL with
/// one fallback) and the card laid out.
pub async fn generate_svg(state: &AppState, user: &str) -> Result<VectorCard, CardError> {
    let mut entries = entries(state, user).await?;

    for entry in &mut entries {
        if !entry.poster.is_empty() {
            entry.poster = postprocess::inline_assets(&state.http, &entry.poster).await;
        }
    }

    let font = fetch::font(
        &state.http,
        &state.config.font_url,
        &state.config.font_fallback_url,
    )
    .await?;

    tracing::debug!(user = %user, entries = entries.len(), "rendering svg card");

    Ok(card::vectorize(&entries, font))
}

/// Generate the rasterized PNG card.
pub async fn generate_png(state: &AppState, user: &str) -> Result<Vec<u8>, CardError> {
    let card = generate_svg(state, user).await?;
    card::rasterize(&card)
}
