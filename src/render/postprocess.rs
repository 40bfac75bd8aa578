//! Post-processing of the rendered page: asset inlining and minification.
//!
//! Inlining replaces external stylesheet links with `<style>` blocks and
//! remote poster `src` attributes with base64 data URIs, so the document
//! is self-contained. Inlining is best-effort: a dead asset URL is logged
//! and left referenced, since the document still renders without it.

use std::sync::LazyLock;

use base64::Engine;
use regex::Regex;

static STYLESHEET_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<link[^>]*rel="stylesheet"[^>]*>"#).unwrap()
});

static HREF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).unwrap());

static IMG_SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<img[^>]+src="(https?://[^"]+)""#).unwrap());

static COMMENT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

static INTER_TAG_WS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">\s+<").unwrap());

static WS_RUN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Inline external stylesheets and remote images into the document.
pub async fn inline_assets(client: &reqwest::Client, html: &str) -> String {
    let html = inline_stylesheets(client, html).await;
    inline_images(client, &html).await
}

/// Replace `<link rel="stylesheet" href="...">` tags with inline
/// `<style>` blocks. Relative hrefs have no base to resolve against and
/// are left alone.
async fn inline_stylesheets(client: &reqwest::Client, html: &str) -> String {
    let mut replacements = Vec::new();

    for m in STYLESHEET_LINK_RE.find_iter(html) {
        let tag = m.as_str();
        let Some(href) = HREF_RE
            .captures(tag)
            .map(|c| c.get(1).map_or("", |g| g.as_str()).to_string())
        else {
            continue;
        };
        if !href.starts_with("http") {
            tracing::debug!(href = %href, "skipping non-absolute stylesheet");
            continue;
        }

        match fetch_asset(client, &href).await {
            Some(css) => {
                let css = String::from_utf8_lossy(&css).into_owned();
                replacements.push((tag.to_string(), format!("<style>{css}</style>")));
            }
            None => tracing::warn!(href = %href, "stylesheet fetch failed, leaving link in place"),
        }
    }

    let mut out = html.to_string();
    for (tag, style) in replacements {
        out = out.replacen(&tag, &style, 1);
    }
    out
}

/// Replace remote `<img src>` URLs with base64 data URIs.
async fn inline_images(client: &reqwest::Client, html: &str) -> String {
    let mut urls: Vec<String> = IMG_SRC_RE
        .captures_iter(html)
        .map(|c| c[1].to_string())
        .collect();
    urls.sort();
    urls.dedup();

    let mut out = html.to_string();
    for url in urls {
        match fetch_asset(client, &url).await {
            Some(bytes) => {
                let needle = format!(r#"src="{url}""#);
                let inlined = format!(r#"src="{}""#, data_uri(&bytes));
                out = out.replace(&needle, &inlined);
            }
            None => tracing::warn!(url = %url, "image fetch failed, leaving src in place"),
        }
    }
    out
}

/// Fetch an asset, returning `None` on any failure.
async fn fetch_asset(client: &reqwest::Client, url: &str) -> Option<Vec<u8>> {
    let response = client.get(url).send().await.ok()?;
    if !response.status().is_success() {
        return None;
    }
    response.bytes().await.ok().map(|b| b.to_vec())
}

/// Encode image bytes as a `data:` URI.
pub fn data_uri(bytes: &[u8]) -> String {
    let mime = detect_image_mime(bytes);
    let b64 = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{b64}")
}

/// Detect MIME type from image bytes (basic magic byte detection).
fn detect_image_mime(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\x89PNG") {
        "image/png"
    } else if bytes.starts_with(b"\xFF\xD8\xFF") {
        "image/jpeg"
    } else if bytes.starts_with(b"GIF8") {
        "image/gif"
    } else if bytes.starts_with(b"RIFF") && bytes.get(8..12) == Some(b"WEBP") {
        "image/webp"
    } else {
        // Posters are overwhelmingly JPEG
        "image/jpeg"
    }
}

/// Minify the document: strip comments, collapse whitespace between tags,
/// then collapse remaining whitespace runs (inline CSS included).
pub fn minify(html: &str) -> String {
    let html = COMMENT_RE.replace_all(html, "");
    let html = INTER_TAG_WS_RE.replace_all(&html, "><");
    let html = WS_RUN_RE.replace_all(&html, " ");
    html.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minify_strips_comments() {
        assert_eq!(minify("<p>hi</p><!-- gone --><p>bye</p>"), "<p>hi</p><p>bye</p>");
    }

    #[test]
    fn minify_collapses_inter_tag_whitespace() {
        assert_eq!(minify("<div>\n  <p>x</p>\n</div>"), "<div><p>x</p></div>");
    }

    #[test]
    fn minify_collapses_runs_in_text_and_css() {
        assert_eq!(
            minify("<style>body {\n  color: red;\n}</style>"),
            "<style>body { color: red; }</style>"
        );
    }

    #[test]
    fn minify_is_idempotent() {
        let once = minify("<div>  <span>a   b</span>  </div><!-- c -->");
        assert_eq!(minify(&once), once);
    }

    #[test]
    fn data_uri_png() {
        let uri = data_uri(b"\x89PNG\r\n\x1a\n....");
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn data_uri_jpeg_default() {
        let uri = data_uri(b"\xFF\xD8\xFFsomething");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
        let uri = data_uri(b"unknown bytes");
        assert!(uri.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn detect_mime_variants() {
        assert_eq!(detect_image_mime(b"GIF89a..."), "image/gif");
        assert_eq!(detect_image_mime(b"RIFF\x00\x00\x00\x00WEBPVP8 "), "image/webp");
    }

    #[tokio::test]
    async fn inline_assets_without_remote_refs_is_identity() {
        let html = r#"<html><head><link rel="stylesheet" href="/local.css"></head><body><img src="data:image/png;base64,AA=="></body></html>"#;
        let client = reqwest::Client::new();
        assert_eq!(inline_assets(&client, html).await, html);
    }

    #[test]
    fn img_src_regex_matches_remote_only() {
        let html = r#"<img class="image" src="https://a.ltrbxd.com/p.jpg"><img src="data:image/png;base64,AA==">"#;
        let urls: Vec<_> = IMG_SRC_RE.captures_iter(html).map(|c| c[1].to_string()).collect();
        assert_eq!(urls, vec!["https://a.ltrbxd.com/p.jpg".to_string()]);
    }
}
