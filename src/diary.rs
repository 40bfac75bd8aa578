//! Diary entry normalization.
//!
//! Two parallel sources (the public diary page and the RSS feed) converge
//! on the same [`DiaryEntry`] shape, so every renderer downstream is
//! source-agnostic. Entries are built fresh per request and are immutable
//! once constructed.

use std::str::FromStr;
use std::sync::LazyLock;

use maud::html;
use scraper::{Html, Selector};

use crate::error::CardError;
use crate::fetch;

/// Maximum number of entries per rendering.
pub const MAX_ENTRIES: usize = 4;

/// Guid prefixes that mark diary activity in the RSS feed. Other item
/// types (list updates etc.) are excluded.
const DIARY_GUID_PREFIXES: &[&str] = &["letterboxd-review-", "letterboxd-watch-"];

/// One watched-title record.
///
/// Every field defaults to the empty string rather than being absent, so
/// downstream templating never has to handle missing values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiaryEntry {
    /// Plain display name of the watched title.
    pub title: String,
    /// Absolute URL of the title's Letterboxd detail page.
    pub link: String,
    /// Pre-rendered `<img>` markup for the poster thumbnail.
    pub poster: String,
    /// Release year label.
    pub release_year: String,
    /// Star rating as glyphs (e.g. "★★★½").
    pub rating: String,
}

/// Which external representation to normalize from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiarySource {
    /// Scrape the rendered diary page at `/{user}/films/diary/`.
    Html,
    /// Parse the syndication feed at `/{user}/rss/`.
    Rss,
}

impl FromStr for DiarySource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "rss" => Ok(Self::Rss),
            other => Err(format!("unknown diary source '{other}' (expected 'html' or 'rss')")),
        }
    }
}

static DIARY_TABLE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#diary-table").unwrap());
static DIARY_ROW: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tbody > tr.diary-entry-row").unwrap());
static FILM_DETAILS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.td-film-details").unwrap());
static POSTER_IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img.image").unwrap());
static LINKED_POSTER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div.linked-film-poster").unwrap());
static TITLE_ANCHOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").unwrap());
static RELEASED_CELL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.td-released").unwrap());
static RATING_SPAN: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("td.td-rating span.rating").unwrap());
static ANY_IMG: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());

/// Convert a numeric rating (0-5 in 0.5 increments) into star glyphs:
/// `floor(rating)` full stars plus one half-star glyph for a fractional
/// remainder. 0 yields the empty string.
pub fn rating_stars(rating: f32) -> String {
    let full = rating.floor() as usize;
    let mut stars = "★".repeat(full);
    if rating.fract() > 0.0 {
        stars.push('½');
    }
    stars
}

/// Poster hydration hint scraped from a diary row.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PosterHint {
    slug: String,
    key: String,
}

/// The synchronously-extractable parts of one diary row. Plain strings
/// only: the scraped DOM is dropped before any fetch is awaited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct RawRow {
    title: String,
    href: String,
    release_year: String,
    rating: String,
    poster: Option<PosterHint>,
}

/// Normalize entries from the rendered diary page.
///
/// Row extraction is synchronous; poster hydration fans out concurrently
/// and is fail-fast - one failed poster fetch fails the whole batch.
pub async fn from_html(
    client: &reqwest::Client,
    base: &str,
    page: &str,
) -> Result<Vec<DiaryEntry>, CardError> {
    let rows = scrape_rows(page);

    tracing::debug!(rows = rows.len(), "scraped diary rows");

    let tasks = rows.into_iter().map(|row| hydrate_row(client, base, row));
    futures::future::try_join_all(tasks).await
}

/// Extract up to [`MAX_ENTRIES`] raw rows from the diary page.
///
/// A page without a diary table yields zero rows, which renders as an
/// empty card rather than failing.
fn scrape_rows(page: &str) -> Vec<RawRow> {
    let doc = Html::parse_document(page);

    let Some(table) = doc.select(&DIARY_TABLE).next() else {
        return Vec::new();
    };

    table
        .select(&DIARY_ROW)
        .take(MAX_ENTRIES)
        .map(|row| {
            let details = row.select(&FILM_DETAILS).next();

            let poster = details.and_then(|d| {
                // The thumbnail hint must exist before a secondary fetch
                // is worth issuing.
                d.select(&POSTER_IMG).next()?;
                let linked = d.select(&LINKED_POSTER).next()?;
                let slug = linked.value().attr("data-film-slug")?;
                let key = linked.value().attr("data-cache-busting-key")?;
                Some(PosterHint {
                    slug: slug.to_string(),
                    key: key.to_string(),
                })
            });

            let (title, href) = details
                .and_then(|d| d.select(&TITLE_ANCHOR).next())
                .map(|a| {
                    (
                        a.text().collect::<String>().trim().to_string(),
                        a.value().attr("href").unwrap_or_default().to_string(),
                    )
                })
                .unwrap_or_default();

            let release_year = row
                .select(&RELEASED_CELL)
                .next()
                .map(|c| c.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            let rating = row
                .select(&RATING_SPAN)
                .next()
                .map(|s| s.text().collect::<String>().trim().to_string())
                .unwrap_or_default();

            RawRow {
                title,
                href,
                release_year,
                rating,
                poster,
            }
        })
        .collect()
}

/// Turn a raw row into a finished entry, fetching the poster preview
/// fragment when the row carried a hint.
async fn hydrate_row(
    client: &reqwest::Client,
    base: &str,
    row: RawRow,
) -> Result<DiaryEntry, CardError> {
    let poster = match &row.poster {
        Some(hint) => {
            let fragment = fetch::poster_fragment(client, base, &hint.slug, &hint.key).await?;
            poster_from_fragment(&fragment)
        }
        None => String::new(),
    };

    let link = if row.href.starts_with('/') {
        format!("{base}{}", row.href)
    } else {
        row.href
    };

    Ok(DiaryEntry {
        title: row.title,
        link,
        poster,
        release_year: row.release_year,
        rating: row.rating,
    })
}

/// Extract the preview `<img>` markup from a poster AJAX fragment.
fn poster_from_fragment(fragment: &str) -> String {
    let doc = Html::parse_fragment(fragment);
    doc.select(&POSTER_IMG)
        .next()
        .map(|img| img.html())
        .unwrap_or_default()
}

/// Normalize entries from the RSS feed.
///
/// Only review/watch items count as diary activity; list updates and other
/// item types are filtered out before the four-entry cap is applied.
pub fn from_feed(channel: &rss::Channel) -> Vec<DiaryEntry> {
    channel
        .items()
        .iter()
        .filter(|item| {
            item.guid()
                .is_some_and(|g| is_diary_guid(g.value()))
        })
        .take(MAX_ENTRIES)
        .map(|item| {
            let title = letterboxd_ext(item, "filmTitle").unwrap_or_default().to_string();
            let release_year = letterboxd_ext(item, "filmYear").unwrap_or_default().to_string();

            let rating = letterboxd_ext(item, "memberRating")
                .and_then(|v| v.parse::<f32>().ok())
                .map(rating_stars)
                .unwrap_or_default();

            let poster = item
                .description()
                .or_else(|| item.content())
                .map(poster_from_content)
                .unwrap_or_default();

            DiaryEntry {
                title,
                link: item.link().unwrap_or_default().to_string(),
                poster,
                release_year,
                rating,
            }
        })
        .collect()
}

fn is_diary_guid(guid: &str) -> bool {
    DIARY_GUID_PREFIXES.iter().any(|p| guid.starts_with(p))
}

/// Look up a `letterboxd:` extension element on a feed item.
fn letterboxd_ext<'a>(item: &'a rss::Item, name: &str) -> Option<&'a str> {
    item.extensions()
        .get("letterboxd")?
        .get(name)?
        .first()?
        .value()
}

/// Extract the poster image from an item's embedded content fragment and
/// re-tag it with the presentation class the templates expect.
fn poster_from_content(content: &str) -> String {
    let doc = Html::parse_fragment(content);
    let Some(img) = doc.select(&ANY_IMG).next() else {
        return String::new();
    };

    let src = img.value().attr("src").unwrap_or_default();
    let alt = img.value().attr("alt").unwrap_or_default();

    html! { img class="image" src=(src) alt=(alt); }.into_string()
}
