//! Provider adapters: selector-set-driven scrapers for web search sources.
//!
//! Every provider differs only in its target URL, request shape, and the
//! CSS selectors used to pull titles/snippets/links out of the fetched
//! markup. Those differences are data ([`SelectorSet`] + [`Recipe`]), not
//! control flow: one [`ScrapedProvider`] implementation covers all
//! variants, and each submodule supplies its variant's data.

pub mod bing;
pub mod duckduckgo;
pub mod google;

pub use bing::bing;
pub use duckduckgo::duckduckgo;
pub use google::google;

use async_trait::async_trait;
use scraper::{Html, Selector};
use std::sync::Arc;
use url::Url;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::http;
use crate::types::{SearchProvider, SearchResult};

/// A pluggable search provider adapter.
///
/// Implementors issue exactly one outbound fetch to a provider-specific
/// search URL and parse the response into [`SearchResult`] values. Each
/// adapter bounds its own network time; none blocks indefinitely.
///
/// Scrape-parse failures fail soft (empty result list); network-visit
/// failures fail hard ([`SearchError::Http`]).
#[async_trait]
pub trait ProviderHandle: Send + Sync {
    /// Perform a web search and return parsed results in page order.
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>>;

    /// Human-readable provider name, used as [`SearchResult::source`].
    fn name(&self) -> &str;
}

/// CSS selectors for pulling structured results out of a provider's
/// results page.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSet {
    /// Selector matching one result container element.
    pub result: &'static str,
    /// Selector for the title element, within a result container.
    pub title: &'static str,
    /// Selector for the snippet element, within a result container.
    pub snippet: &'static str,
    /// Selector for the link element, within a result container.
    pub link: &'static str,
    /// Attribute of the link element holding the URL.
    pub link_attr: &'static str,
}

/// How to issue the search request for a provider.
#[derive(Debug, Clone, Copy)]
pub enum Recipe {
    /// GET with the query percent-encoded into a query-string parameter.
    GetQuery {
        base: &'static str,
        param: &'static str,
    },
    /// Form POST with the query as a form field.
    FormPost {
        endpoint: &'static str,
        param: &'static str,
    },
}

/// Post-processes a raw `href` into the final result URL.
///
/// Returning `None` drops the result (malformed or unusable link).
pub type LinkFilter = fn(&str) -> Option<String>;

/// Accept the href as-is, dropping only empty values.
pub(crate) fn direct_link(href: &str) -> Option<String> {
    if href.is_empty() {
        None
    } else {
        Some(href.to_owned())
    }
}

/// A selector-set-driven provider scraper.
///
/// Stateless: every [`search`](ProviderHandle::search) call builds its
/// own client and shares nothing with sibling invocations.
pub struct ScrapedProvider {
    name: &'static str,
    recipe: Recipe,
    selectors: SelectorSet,
    link_filter: LinkFilter,
}

impl ScrapedProvider {
    /// Assemble a provider from its variant data.
    pub fn new(
        name: &'static str,
        recipe: Recipe,
        selectors: SelectorSet,
        link_filter: LinkFilter,
    ) -> Self {
        Self {
            name,
            recipe,
            selectors,
            link_filter,
        }
    }

    /// Parse a results page into search results.
    ///
    /// Rows with an empty title or an unusable link are skipped; a page
    /// where nothing matches parses to an empty list, indistinguishable
    /// from "no results".
    pub(crate) fn parse(&self, html: &str) -> Result<Vec<SearchResult>> {
        parse_results(html, &self.selectors, self.name, self.link_filter)
    }
}

#[async_trait]
impl ProviderHandle for ScrapedProvider {
    async fn search(&self, query: &str, config: &SearchConfig) -> Result<Vec<SearchResult>> {
        tracing::trace!(provider = self.name, query, "provider search");

        let client = http::build_client(config)?;

        let request = match self.recipe {
            Recipe::GetQuery { base, param } => {
                let url = Url::parse_with_params(base, [(param, query)]).map_err(|e| {
                    SearchError::Http(format!("{}: invalid search URL: {e}", self.name))
                })?;
                client.get(url)
            }
            Recipe::FormPost { endpoint, param } => client.post(endpoint).form(&[(param, query)]),
        };

        let response = request
            .header("Accept-Language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| SearchError::Http(format!("{} request failed: {e}", self.name)))?
            .error_for_status()
            .map_err(|e| SearchError::Http(format!("{} HTTP error: {e}", self.name)))?;

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Http(format!("{} response read failed: {e}", self.name)))?;

        tracing::trace!(provider = self.name, bytes = html.len(), "response received");

        self.parse(&html)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// Build adapter instances for the given provider variants.
pub fn build(providers: &[SearchProvider]) -> Vec<Arc<dyn ProviderHandle>> {
    providers
        .iter()
        .map(|provider| -> Arc<dyn ProviderHandle> {
            match provider {
                SearchProvider::DuckDuckGo => Arc::new(duckduckgo()),
                SearchProvider::Google => Arc::new(google()),
                SearchProvider::Bing => Arc::new(bing()),
            }
        })
        .collect()
}

/// Shared selector-driven results-page parser.
fn parse_results(
    html: &str,
    selectors: &SelectorSet,
    source: &str,
    link_filter: LinkFilter,
) -> Result<Vec<SearchResult>> {
    let document = Html::parse_document(html);

    let result_sel = Selector::parse(selectors.result)
        .map_err(|e| SearchError::Parse(format!("invalid result selector: {e:?}")))?;
    let title_sel = Selector::parse(selectors.title)
        .map_err(|e| SearchError::Parse(format!("invalid title selector: {e:?}")))?;
    let snippet_sel = Selector::parse(selectors.snippet)
        .map_err(|e| SearchError::Parse(format!("invalid snippet selector: {e:?}")))?;
    let link_sel = Selector::parse(selectors.link)
        .map_err(|e| SearchError::Parse(format!("invalid link selector: {e:?}")))?;

    let mut results = Vec::new();

    for element in document.select(&result_sel) {
        let title = element
            .select(&title_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .unwrap_or_default();
        if title.is_empty() {
            continue;
        }

        let href = match element
            .select(&link_sel)
            .next()
            .and_then(|el| el.value().attr(selectors.link_attr))
        {
            Some(h) => h,
            None => continue,
        };

        let link = match link_filter(href) {
            Some(l) => l,
            None => continue,
        };

        let snippet = element
            .select(&snippet_sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_owned())
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            snippet,
            link,
            inner_content: None,
            source: source.to_owned(),
        });
    }

    tracing::debug!(source, count = results.len(), "results parsed");
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTORS: SelectorSet = SelectorSet {
        result: ".row",
        title: ".title",
        snippet: ".blurb",
        link: "a.out",
        link_attr: "href",
    };

    const MOCK_HTML: &str = r#"<html><body>
        <div class="row">
            <a class="out" href="https://one.example.com"><span class="title">First</span></a>
            <p class="blurb">First snippet</p>
        </div>
        <div class="row">
            <a class="out" href=""><span class="title">Empty link</span></a>
        </div>
        <div class="row">
            <a class="out" href="https://two.example.com"><span class="title">Second</span></a>
        </div>
        <div class="row">
            <a class="out" href="https://three.example.com"><span class="title">  </span></a>
        </div>
    </body></html>"#;

    #[test]
    fn parse_skips_rows_without_usable_title_or_link() {
        let results = parse_results(MOCK_HTML, &SELECTORS, "Mock", direct_link)
            .expect("should parse");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First");
        assert_eq!(results[0].snippet, "First snippet");
        assert_eq!(results[0].link, "https://one.example.com");
        assert_eq!(results[0].source, "Mock");
        assert_eq!(results[1].title, "Second");
        assert_eq!(results[1].snippet, "");
    }

    #[test]
    fn parse_preserves_page_order() {
        let results = parse_results(MOCK_HTML, &SELECTORS, "Mock", direct_link)
            .expect("should parse");
        assert_eq!(results[0].link, "https://one.example.com");
        assert_eq!(results[1].link, "https://two.example.com");
    }

    #[test]
    fn parse_empty_html_returns_empty() {
        let results = parse_results("<html><body></body></html>", &SELECTORS, "Mock", direct_link)
            .expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn parse_results_never_populate_inner_content() {
        let results = parse_results(MOCK_HTML, &SELECTORS, "Mock", direct_link)
            .expect("should parse");
        assert!(results.iter().all(|r| r.inner_content.is_none()));
    }

    #[test]
    fn link_filter_can_drop_results() {
        fn reject_all(_href: &str) -> Option<String> {
            None
        }
        let results = parse_results(MOCK_HTML, &SELECTORS, "Mock", reject_all)
            .expect("should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn direct_link_rejects_empty() {
        assert!(direct_link("").is_none());
        assert_eq!(
            direct_link("https://example.com").as_deref(),
            Some("https://example.com")
        );
    }

    #[test]
    fn build_creates_one_adapter_per_variant() {
        let handles = build(SearchProvider::all());
        assert_eq!(handles.len(), 3);
        let names: Vec<&str> = handles.iter().map(|h| h.name()).collect();
        assert!(names.contains(&"DuckDuckGo"));
        assert!(names.contains(&"Google"));
        assert!(names.contains(&"Bing"));
    }

    #[test]
    fn scraped_provider_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ScrapedProvider>();
    }
}
