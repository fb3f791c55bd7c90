//! # metasearch
//!
//! Concurrent multi-provider web search aggregation behind a bounded
//! in-memory response cache.
//!
//! The crate scrapes several public search providers for one query at
//! the same time, concatenates whatever each returns, and — in deep
//! mode — visits the top results to attach an extracted page excerpt
//! and offers the enriched set to a best-effort summarization service.
//! Responses are cached by normalized query with strict limits on item
//! count and total byte footprint, evicting oldest-created entries
//! first.
//!
//! ## Design
//!
//! - Providers are selector-set-driven scrapers behind one trait;
//!   each variant contributes only its URL, request shape, and CSS
//!   selectors
//! - Fan-out launches one task per provider and awaits all of them;
//!   per-provider failures are collected, never fatal
//! - The cache tracks serialized byte sizes exactly and evicts in
//!   creation-time FIFO order, deliberately not LRU
//! - A process-wide token bucket rejects (never queues) requests over
//!   the configured rate

pub mod aggregate;
pub mod cache;
pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod limiter;
pub mod providers;
pub mod server;
pub mod summarize;
pub mod types;

pub use aggregate::ProviderFailure;
pub use cache::ResponseCache;
pub use config::{AppConfig, CacheConfig, SearchConfig, ServerConfig};
pub use error::{Result, SearchError};
pub use types::{SearchProvider, SearchResponse, SearchResult};

use std::sync::Arc;

use providers::ProviderHandle;
use summarize::Summarizer;

/// Search all configured providers concurrently and merge the results.
///
/// Builds adapters from `config.providers` and runs a shallow
/// aggregation: no page visits, no summarization. Returns the merged
/// response together with any per-provider failures.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid and
/// [`SearchError::EmptyQuery`] for an empty query. Provider failures
/// are returned alongside the response, not as errors.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> metasearch::Result<()> {
/// let config = metasearch::SearchConfig::default();
/// let (response, failures) = metasearch::search("rust programming", &config).await?;
/// for result in &response.results {
///     println!("{}: {}", result.source, result.link);
/// }
/// eprintln!("{} providers failed", failures.len());
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    config: &SearchConfig,
) -> Result<(SearchResponse, Vec<ProviderFailure>)> {
    config.validate()?;
    let providers = providers::build(&config.providers);
    aggregate::aggregate(query, &providers, false, config, None).await
}

/// Deep search: aggregate, enrich the top results with extracted page
/// content, and (when a summarizer is supplied) attach a best-effort
/// formatted summary.
///
/// # Errors
///
/// Same as [`search`]. Extraction and summarization failures degrade
/// per-URL / to a placeholder and are never returned as errors.
pub async fn deep_search(
    query: &str,
    config: &SearchConfig,
    summarizer: Option<&dyn Summarizer>,
) -> Result<(SearchResponse, Vec<ProviderFailure>)> {
    config.validate()?;
    let providers = providers::build(&config.providers);
    aggregate::aggregate(query, &providers, true, config, summarizer).await
}

/// Build the adapter set for an explicit list of provider variants.
///
/// Exposed for callers that hold their own provider set (e.g. the
/// server constructs adapters once and reuses them per request).
pub fn build_providers(variants: &[SearchProvider]) -> Vec<Arc<dyn ProviderHandle>> {
    providers::build(variants)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_validates_config_empty_providers() {
        let config = SearchConfig {
            providers: vec![],
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("provider"));
    }

    #[tokio::test]
    async fn search_validates_config_zero_timeout() {
        let config = SearchConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        let result = search("test", &config).await;
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout"));
    }

    #[tokio::test]
    async fn search_rejects_empty_query() {
        let config = SearchConfig::default();
        let result = search("   ", &config).await;
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
    }

    #[tokio::test]
    async fn deep_search_validates_config() {
        let config = SearchConfig {
            deep_result_cap: 0,
            ..Default::default()
        };
        let result = deep_search("test", &config, None).await;
        assert!(result.is_err());
    }

    #[test]
    fn build_providers_matches_variants() {
        let handles = build_providers(&[SearchProvider::Bing]);
        assert_eq!(handles.len(), 1);
        assert_eq!(handles[0].name(), "Bing");
    }
}
