//! Core types for search results, aggregated responses, and provider identification.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single search result scraped from one provider's results page.
///
/// Immutable once produced by a provider adapter, except for
/// `inner_content`, which the deep-search pipeline attaches later.
/// Duplicate results across providers are kept as-is — no deduplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The title of the result page.
    pub title: String,
    /// A text snippet summarising the page content.
    pub snippet: String,
    /// The result URL.
    pub link: String,
    /// Extracted page excerpt, populated only in deep mode for the
    /// capped head of the result list. Empty string means the visit
    /// was attempted but yielded nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_content: Option<String>,
    /// Which provider returned this result.
    pub source: String,
}

/// The aggregated response for one query — the unit stored in the cache.
///
/// Built once per aggregation call and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The original query string.
    pub query: String,
    /// Concatenated results from all providers, in completion order.
    pub results: Vec<SearchResult>,
    /// Best-effort summarization output (deep mode only). On
    /// summarizer failure or timeout this is a fixed placeholder,
    /// never an error.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_result: Option<String>,
    /// Wall-clock time the aggregation took, in milliseconds.
    pub duration_ms: u64,
}

/// Search providers that metasearch can scrape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchProvider {
    /// DuckDuckGo HTML endpoint — most scraper-friendly.
    DuckDuckGo,
    /// Google — best results, aggressive bot detection.
    Google,
    /// Bing — decent fallback provider.
    Bing,
}

impl SearchProvider {
    /// Returns the human-readable name of this provider.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DuckDuckGo => "DuckDuckGo",
            Self::Google => "Google",
            Self::Bing => "Bing",
        }
    }

    /// Returns all available provider variants.
    pub fn all() -> &'static [SearchProvider] {
        &[Self::DuckDuckGo, Self::Google, Self::Bing]
    }
}

impl fmt::Display for SearchProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
