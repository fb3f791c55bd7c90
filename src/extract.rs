//! Deep-mode content extraction: fetch a result page and distil a
//! plain-text excerpt.
//!
//! Extraction is best-effort and strictly per-URL: any fetch or parse
//! failure yields an empty excerpt for that URL and never disturbs
//! sibling extractions or the surrounding aggregation.

use scraper::{Html, Selector};
use url::Url;

/// Default maximum characters kept from an extracted excerpt.
pub const DEFAULT_EXCERPT_MAX_CHARS: usize = 5000;

/// Candidate selectors for "main content" regions, tried in order.
/// Every match of every selector contributes text.
const CONTENT_SELECTORS: &[&str] = &[
    "article",
    "main",
    ".content",
    "#content",
    ".post-content",
    ".article-content",
    "[role='main']",
];

/// Fetch `url` and extract a plain-text excerpt of at most `max_chars`
/// characters.
///
/// Only absolute http(s) URLs are visited; relative or malformed links
/// are skipped without a fetch. Any transport or status error yields an
/// empty excerpt.
pub async fn fetch_excerpt(client: &reqwest::Client, url: &str, max_chars: usize) -> String {
    if !is_fetchable(url) {
        tracing::trace!(url, "skipping non-http(s) link");
        return String::new();
    }

    let response = match client.get(url).send().await {
        Ok(r) => r,
        Err(err) => {
            tracing::warn!(url, error = %err, "page fetch failed");
            return String::new();
        }
    };

    let response = match response.error_for_status() {
        Ok(r) => r,
        Err(err) => {
            tracing::warn!(url, error = %err, "page returned error status");
            return String::new();
        }
    };

    match response.text().await {
        Ok(html) => extract_excerpt(&html, max_chars),
        Err(err) => {
            tracing::warn!(url, error = %err, "page body read failed");
            String::new()
        }
    }
}

/// True if `url` is an absolute http or https URL.
pub fn is_fetchable(url: &str) -> bool {
    matches!(
        Url::parse(url).map(|u| u.scheme().to_owned()),
        Ok(scheme) if scheme == "http" || scheme == "https"
    )
}

/// Extract a whitespace-collapsed text excerpt from raw HTML.
///
/// Policy, in priority order:
/// 1. the page meta description, if present;
/// 2. text of every match of the common main-content selectors;
/// 3. if neither yielded anything, all paragraph text.
///
/// The result is truncated to `max_chars` characters.
pub fn extract_excerpt(html: &str, max_chars: usize) -> String {
    let document = Html::parse_document(html);

    let mut sections: Vec<String> = Vec::new();

    if let Some(desc) = meta_description(&document) {
        sections.push(format!("Description: {desc}"));
    }

    for selector_str in CONTENT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        for element in document.select(&selector) {
            let text = clean_text(&element.text().collect::<String>());
            if !text.is_empty() {
                sections.push(text);
            }
        }
    }

    // Nothing recognisable — fall back to paragraph text.
    if sections.is_empty() {
        if let Ok(selector) = Selector::parse("p") {
            for element in document.select(&selector) {
                let text = clean_text(&element.text().collect::<String>());
                if !text.is_empty() {
                    sections.push(text);
                }
            }
        }
    }

    truncate_chars(sections.join("\n").trim(), max_chars)
}

/// Read the `content` attribute of `<meta name="description">`, if any.
fn meta_description(document: &Html) -> Option<String> {
    let selector = Selector::parse("meta[name='description']").ok()?;
    document
        .select(&selector)
        .next()
        .and_then(|el| el.value().attr("content"))
        .map(clean_text)
        .filter(|desc| !desc.is_empty())
}

/// Collapse all runs of whitespace to single spaces and trim.
fn clean_text(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters, on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_owned(),
        None => text.to_owned(),
    }
}
