//! SVG card generation and PNG rasterization.
//!
//! Normalized entries are laid out directly into a fixed 854x160 SVG card
//! (the same records the HTML fragment is rendered from), which resvg then
//! rasterizes at 3x zoom. Only the fetched display font is offered to the
//! rasterizer; system fonts are never loaded, keeping output identical
//! across hosts.

use std::sync::Arc;
use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::diary::{DiaryEntry, MAX_ENTRIES};
use crate::error::CardError;

/// Card dimensions.
pub const CARD_WIDTH: u32 = 854;
pub const CARD_HEIGHT: u32 = 160;

/// Fixed zoom level for rasterization.
const RASTER_ZOOM: f32 = 3.0;

/// Family name the SVG text references; the fetched font is registered
/// under its own name, so this must match the primary font.
const FONT_FAMILY: &str = "TiemposText-Semibold";

/// Background and text colors (Letterboxd dark palette).
const BG_COLOR: &str = "#14181c";
const TITLE_COLOR: &str = "#ffffff";
const YEAR_COLOR: &str = "#89a0b3";
const RATING_COLOR: &str = "#00e054";

static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// A generated vector card: the SVG document plus the font it references,
/// carried together so rasterization needs no further fetches.
#[derive(Debug, Clone)]
pub struct VectorCard {
    pub svg: String,
    pub font: Vec<u8>,
}

/// Lay the entries out as an 854x160 SVG card.
///
/// The star glyph is replaced with a plain asterisk because the display
/// font lacks it; the half-star glyph survives. No `<title>` element is
/// emitted.
pub fn vectorize(entries: &[DiaryEntry], font: Vec<u8>) -> VectorCard {
    let mut svg = String::with_capacity(8192);

    svg.push_str(&format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}"><rect width="{w}" height="{h}" rx="8" fill="{bg}"/>"##,
        w = CARD_WIDTH,
        h = CARD_HEIGHT,
        bg = BG_COLOR,
    ));

    let slot = CARD_WIDTH / MAX_ENTRIES as u32;

    for (i, entry) in entries.iter().take(MAX_ENTRIES).enumerate() {
        let x = i as u32 * slot + 16;

        if let Some(src) = poster_src(&entry.poster) {
            svg.push_str(&format!(
                r##"<image href="{src}" x="{x}" y="24" width="74" height="112" preserveAspectRatio="xMidYMid slice"/>"##,
                src = escape_attr(&src),
            ));
        }

        let tx = x + 86;

        svg.push_str(&format!(
            r##"<text x="{tx}" y="52" font-family="{font}" font-size="15" font-weight="600" fill="{fill}">{title}</text>"##,
            font = FONT_FAMILY,
            fill = TITLE_COLOR,
            title = escape_text(&truncate(&entry.title, 14)),
        ));

        if !entry.release_year.is_empty() {
            svg.push_str(&format!(
                r##"<text x="{tx}" y="78" font-family="{font}" font-size="13" font-weight="600" fill="{fill}">{year}</text>"##,
                font = FONT_FAMILY,
                fill = YEAR_COLOR,
                year = escape_text(&entry.release_year),
            ));
        }

        if !entry.rating.is_empty() {
            svg.push_str(&format!(
                r##"<text x="{tx}" y="104" font-family="{font}" font-size="14" font-weight="600" fill="{fill}">{rating}</text>"##,
                font = FONT_FAMILY,
                fill = RATING_COLOR,
                rating = escape_text(&entry.rating.replace('★', "*")),
            ));
        }
    }

    svg.push_str("</svg>");

    VectorCard { svg, font }
}

/// Rasterize the vector card to PNG bytes at fixed 3x zoom.
pub fn rasterize(card: &VectorCard) -> Result<Vec<u8>, CardError> {
    let mut db = resvg::usvg::fontdb::Database::new();
    db.load_font_data(card.font.clone());

    let mut options = resvg::usvg::Options::default();
    options.font_family = FONT_FAMILY.to_string();
    options.fontdb = Arc::new(db);

    let tree = resvg::usvg::Tree::from_str(&card.svg, &options)
        .map_err(|e| CardError::Image(format!("SVG parse error: {e}")))?;

    let width = (CARD_WIDTH as f32 * RASTER_ZOOM) as u32;
    let height = (CARD_HEIGHT as f32 * RASTER_ZOOM) as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| CardError::Image("failed to create pixmap".to_string()))?;

    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(RASTER_ZOOM, RASTER_ZOOM),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| CardError::Image(format!("PNG encode error: {e}")))
}

/// Pull the `src` attribute out of poster markup, if any.
fn poster_src(poster: &str) -> Option<String> {
    if poster.is_empty() {
        return None;
    }
    let doc = Html::parse_fragment(poster);
    doc.select(&IMG_SEL)
        .next()
        .and_then(|img| img.value().attr("src"))
        .map(|s| s.to_string())
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1x1 transparent PNG.
    const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8BQDwAEhQGAhKmMIQAAAABJRU5ErkJggg==";

    fn entry() -> DiaryEntry {
        DiaryEntry {
            title: "Anatomy of a Fall".to_string(),
            link: "https://letterboxd.com/film/anatomy-of-a-fall/".to_string(),
            poster: format!(r#"<img class="image" src="{PIXEL}" alt="">"#),
            release_year: "2023".to_string(),
            rating: "★★★★½".to_string(),
        }
    }

    #[test]
    fn vectorize_has_fixed_dimensions() {
        let card = vectorize(&[entry()], Vec::new());
        assert!(card.svg.contains(r#"width="854" height="160""#));
        assert!(card.svg.contains(r#"viewBox="0 0 854 160""#));
    }

    #[test]
    fn vectorize_replaces_stars_with_asterisks() {
        let card = vectorize(&[entry()], Vec::new());
        assert!(!card.svg.contains('★'));
        assert!(card.svg.contains("****½"));
    }

    #[test]
    fn vectorize_emits_no_title_element() {
        let card = vectorize(&[entry()], Vec::new());
        assert!(!card.svg.contains("<title>"));
    }

    #[test]
    fn vectorize_embeds_poster_src() {
        let card = vectorize(&[entry()], Vec::new());
        assert!(card.svg.contains(&format!(r#"href="{PIXEL}""#)));
    }

    #[test]
    fn vectorize_skips_missing_fields() {
        let e = DiaryEntry {
            title: "Untitled".to_string(),
            ..Default::default()
        };
        let card = vectorize(&[e], Vec::new());
        assert!(!card.svg.contains("<image"));
        assert_eq!(card.svg.matches("<text").count(), 1);
    }

    #[test]
    fn vectorize_caps_at_four_blocks() {
        let entries: Vec<_> = (0..6)
            .map(|i| DiaryEntry {
                title: format!("Film {i}"),
                ..Default::default()
            })
            .collect();
        let card = vectorize(&entries, Vec::new());
        assert!(card.svg.contains("Film 3"));
        assert!(!card.svg.contains("Film 4"));
    }

    #[test]
    fn vectorize_escapes_title_text() {
        let e = DiaryEntry {
            title: "Fast & <Furious>".to_string(),
            ..Default::default()
        };
        let card = vectorize(&[e], Vec::new());
        assert!(card.svg.contains("Fast &amp; &lt;Fur"));
    }

    #[test]
    fn vectorize_is_deterministic() {
        let a = vectorize(&[entry()], Vec::new());
        let b = vectorize(&[entry()], Vec::new());
        assert_eq!(a.svg, b.svg);
    }

    #[test]
    fn truncate_short_titles_untouched() {
        assert_eq!(truncate("Aftersun", 14), "Aftersun");
        assert_eq!(truncate("Anatomy of a Fall", 14), "Anatomy of a…");
    }

    #[test]
    fn rasterize_produces_png_bytes() {
        let card = vectorize(&[entry()], Vec::new());
        let png = rasterize(&card).unwrap();
        assert!(png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn rasterize_rejects_broken_svg() {
        let card = VectorCard {
            svg: "<svg".to_string(),
            font: Vec::new(),
        };
        assert!(matches!(rasterize(&card), Err(CardError::Image(_))));
    }
}
