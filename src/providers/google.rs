//! Google provider — best results but aggressive bot detection.
//!
//! Scrapes the classic results page. Google employs CAPTCHAs, consent
//! walls, and IP-based rate limiting, so this provider fails (hard, as a
//! network error, or soft, as zero parsed results) more often than the
//! others; the aggregator treats either outcome as a partial result.

use super::{direct_link, Recipe, ScrapedProvider, SelectorSet};

const SELECTORS: SelectorSet = SelectorSet {
    result: "div.g",
    title: "h3",
    snippet: "div.VwiC3b",
    link: "a",
    link_attr: "href",
};

/// Build the Google provider adapter.
pub fn google() -> ScrapedProvider {
    ScrapedProvider::new(
        "Google",
        Recipe::GetQuery {
            base: "https://www.google.com/search",
            param: "q",
        },
        SELECTORS,
        direct_link,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ProviderHandle;

    const MOCK_GOOGLE_HTML: &str = r#"<!DOCTYPE html>
<html>
<body>
<div id="search">
<div class="g">
    <a href="https://www.rust-lang.org/"><h3>Rust Programming Language</h3></a>
    <div class="VwiC3b">A language empowering everyone to build reliable software.</div>
</div>
<div class="g">
    <a href="https://crates.io/"><h3>crates.io: Rust Package Registry</h3></a>
    <div class="VwiC3b">The Rust community's crate registry.</div>
</div>
</div>
</body>
</html>"#;

    #[test]
    fn parse_mock_html_returns_results() {
        let provider = google();
        let results = provider.parse(MOCK_GOOGLE_HTML).expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].link, "https://www.rust-lang.org/");
        assert!(results[0].snippet.contains("reliable"));
        assert_eq!(results[0].source, "Google");
        assert_eq!(results[1].link, "https://crates.io/");
    }

    #[test]
    fn parse_consent_wall_returns_empty() {
        // A consent interstitial has none of the result selectors;
        // that parses as "no results", not an error.
        let html = "<html><body><div>Before you continue to Google…</div></body></html>";
        let provider = google();
        let results = provider.parse(html).expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn provider_name() {
        assert_eq!(google().name(), "Google");
    }

    #[tokio::test]
    #[ignore] // Live test — run with `cargo test -- --ignored`
    async fn live_google_search() {
        let provider = google();
        let config = crate::config::SearchConfig::default();
        // Google may block; we only assert the call completes either way.
        let _ = provider.search("rust programming", &config).await;
    }
}
