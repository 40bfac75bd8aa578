//! HTTP fetchers for the external Letterboxd surfaces and the card font.
//!
//! Every fetcher takes the injected [`reqwest::Client`] from application
//! state; nothing here holds module-level connections.

use crate::error::CardError;

/// Fetch the rendered diary page for a user.
///
/// Intermediary caches are told not to serve a stale copy; the service
/// does its own caching at the response layer.
pub async fn diary_page(
    client: &reqwest::Client,
    base: &str,
    user: &str,
) -> Result<String, CardError> {
    let url = format!("{base}/{user}/films/diary/");
    let text = fetch_text(client, &url).await?;

    tracing::debug!(user = %user, bytes = text.len(), "fetched diary page");
    Ok(text)
}

/// Fetch and parse the RSS feed for a user.
///
/// The `rss` crate parses namespaced extension elements
/// (`letterboxd:filmTitle`, `letterboxd:memberRating`, `tmdb:movieId`,
/// `dc:creator`, ...) into each item's extension map without any
/// per-field configuration.
pub async fn diary_feed(
    client: &reqwest::Client,
    base: &str,
    user: &str,
) -> Result<rss::Channel, CardError> {
    let url = format!("{base}/{user}/rss/");
    let bytes = fetch_bytes(client, &url).await?;

    let channel = rss::Channel::read_from(&bytes[..])?;

    tracing::debug!(user = %user, items = channel.items().len(), "fetched diary feed");
    Ok(channel)
}

/// Fetch the poster preview fragment for a film slug.
///
/// `key` is the cache-busting token scraped from the diary row.
pub async fn poster_fragment(
    client: &reqwest::Client,
    base: &str,
    slug: &str,
    key: &str,
) -> Result<String, CardError> {
    let url = format!("{base}/ajax/poster/film/{slug}/std/35x52/?k={key}");
    fetch_text(client, &url).await
}

/// Fetch the card display font, falling back to the secondary URL when
/// the primary fetch fails. Both failing fails SVG/PNG generation.
pub async fn font(
    client: &reqwest::Client,
    primary: &str,
    fallback: &str,
) -> Result<Vec<u8>, CardError> {
    match fetch_bytes(client, primary).await {
        Ok(bytes) => Ok(bytes),
        Err(err) => {
            tracing::warn!(error = %err, url = %primary, "primary font fetch failed, using fallback");
            fetch_bytes(client, fallback)
                .await
                .map_err(|e| CardError::Image(format!("font fetch failed: {e}")))
        }
    }
}

/// GET a URL and return the body as text.
async fn fetch_text(client: &reqwest::Client, url: &str) -> Result<String, CardError> {
    let response = send(client, url).await?;
    response
        .text()
        .await
        .map_err(|e| CardError::Fetch(e.to_string()))
}

/// GET a URL and return the body as bytes.
async fn fetch_bytes(client: &reqwest::Client, url: &str) -> Result<Vec<u8>, CardError> {
    let response = send(client, url).await?;
    response
        .bytes()
        .await
        .map(|b| b.to_vec())
        .map_err(|e| CardError::Fetch(e.to_string()))
}

/// Issue the GET and map a non-success status to a `Fetch` error carrying
/// the status text.
async fn send(client: &reqwest::Client, url: &str) -> Result<reqwest::Response, CardError> {
    let response = client
        .get(url)
        .header("cache-control", "no-cache")
        .send()
        .await
        .map_err(|e| CardError::Fetch(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(CardError::Fetch(format!(
            "{} answered {}",
            url,
            status.canonical_reason().unwrap_or(status.as_str())
        )));
    }

    Ok(response)
}
