//! HTML rendering for diary entries.
//!
//! The per-entry fragment is generated with [maud](https://maud.lambda.xyz/)
//! (automatic escaping for all dynamic text) and spliced into the static
//! page template. Poster and title markup produced by the normalizer are
//! trusted fragments and pass through unescaped.

pub mod postprocess;
pub mod template;

use maud::{Markup, PreEscaped, html};

use crate::diary::DiaryEntry;

/// Render normalized entries into the movie-list fragment.
///
/// Each entry becomes a `div.movie` block wrapping the poster markup and
/// the title / release-year / rating details.
pub fn fragment(entries: &[DiaryEntry]) -> Markup {
    html! {
        @for entry in entries {
            div class="movie" {
                (PreEscaped(entry.poster.as_str()))
                div class="movie-details" {
                    a class="movie-title" href=(entry.link) { (entry.title) }
                    span class="release-year" { (entry.release_year) }
                    span class="rating" { (entry.rating) }
                }
            }
        }
    }
}
