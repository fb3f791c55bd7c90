//! DuckDuckGo provider — most scraper-friendly source.
//!
//! Uses the HTML-only endpoint at `https://html.duckduckgo.com/html/`,
//! which requires no JavaScript and tolerates automated requests.
//! Result links come wrapped in a `duckduckgo.com/l/?uddg=…` redirect
//! that has to be unwrapped before the URL is useful.

use url::Url;

use super::{Recipe, ScrapedProvider, SelectorSet};

const SELECTORS: SelectorSet = SelectorSet {
    result: ".result",
    title: "h2",
    snippet: ".result__snippet",
    link: "a.result__a",
    link_attr: "href",
};

/// Build the DuckDuckGo provider adapter.
pub fn duckduckgo() -> ScrapedProvider {
    ScrapedProvider::new(
        "DuckDuckGo",
        Recipe::FormPost {
            endpoint: "https://html.duckduckgo.com/html/",
            param: "q",
        },
        SELECTORS,
        unwrap_redirect,
    )
}

/// Extract the destination URL from DuckDuckGo's redirect wrapper.
///
/// Hrefs look like `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=…`;
/// the `uddg` query parameter carries the real, percent-encoded URL.
/// Direct links pass through unchanged; unparseable hrefs drop the result.
fn unwrap_redirect(href: &str) -> Option<String> {
    let full_href = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_owned()
    };

    let parsed = Url::parse(&full_href).ok()?;

    if parsed.host_str() == Some("duckduckgo.com") && parsed.path().starts_with("/l/") {
        parsed
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, value)| value.into_owned())
    } else {
        Some(full_href)
    }
}
