//! Concurrent multi-provider fan-out aggregator.
//!
//! One task per provider, all launched together and all awaited; results
//! are merged only here, in the coordinating task, so the result list
//! needs no lock. A failing provider contributes zero results and a
//! recorded error — partial results are the normal success case, not a
//! degraded one. There is no early exit: aggregation waits for the
//! slowest provider (each one bounds its own network time).

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;

use crate::config::SearchConfig;
use crate::error::{Result, SearchError};
use crate::extract;
use crate::http;
use crate::providers::ProviderHandle;
use crate::summarize::{self, Summarizer};
use crate::types::{SearchResponse, SearchResult};

/// A provider that failed during fan-out, with its error.
#[derive(Debug)]
pub struct ProviderFailure {
    /// Name of the failing provider.
    pub provider: String,
    /// The network-visit error it reported.
    pub error: SearchError,
}

/// Run one query against all `providers` concurrently and merge the
/// outcome into a [`SearchResponse`].
///
/// Results are concatenated in provider completion order; no
/// cross-provider ordering is promised, but each provider's own page
/// order is preserved. In deep mode the first
/// [`deep_result_cap`](SearchConfig::deep_result_cap) results are
/// enriched with an extracted page excerpt, and — when a `summarizer`
/// is supplied — the whole set is offered to it under the configured
/// timeout, degrading to a placeholder on failure.
///
/// # Errors
///
/// Only malformed caller input is a hard rejection:
/// [`SearchError::EmptyQuery`] for an empty or whitespace-only query.
/// Provider failures are returned alongside the response, never as an
/// overall error.
pub async fn aggregate(
    query: &str,
    providers: &[Arc<dyn ProviderHandle>],
    deep: bool,
    config: &SearchConfig,
    summarizer: Option<&dyn Summarizer>,
) -> Result<(SearchResponse, Vec<ProviderFailure>)> {
    if query.trim().is_empty() {
        return Err(SearchError::EmptyQuery);
    }

    let started = Instant::now();

    // Fan out: one task per provider, collected in completion order.
    let mut tasks = FuturesUnordered::new();
    for provider in providers {
        let provider = Arc::clone(provider);
        let query = query.to_owned();
        let config = config.clone();
        tasks.push(async move {
            let outcome = provider.search(&query, &config).await;
            (provider.name().to_owned(), outcome)
        });
    }

    let mut results: Vec<SearchResult> = Vec::new();
    let mut failures: Vec<ProviderFailure> = Vec::new();

    while let Some((provider, outcome)) = tasks.next().await {
        match outcome {
            Ok(provider_results) => {
                tracing::debug!(%provider, count = provider_results.len(), "provider done");
                results.extend(provider_results);
            }
            Err(error) => {
                tracing::warn!(%provider, %error, "provider search failed");
                failures.push(ProviderFailure { provider, error });
            }
        }
    }

    if deep {
        enrich_top_results(&mut results, config).await;
    }

    let formatted_result = match (deep, summarizer) {
        (true, Some(summarizer)) => {
            let prompt = summarize::build_prompt(query, &results);
            Some(
                summarize::summarize_with_timeout(summarizer, &prompt, config.summarize_timeout())
                    .await,
            )
        }
        _ => None,
    };

    let response = SearchResponse {
        query: query.to_owned(),
        results,
        formatted_result,
        duration_ms: started.elapsed().as_millis() as u64,
    };

    Ok((response, failures))
}

/// Attach extracted page excerpts to at most the first
/// `deep_result_cap` results.
///
/// Visits run sequentially, each bounded by the deep-fetch timeout.
/// A failed or skipped visit attaches an empty excerpt; results past
/// the cap are left untouched.
async fn enrich_top_results(results: &mut [SearchResult], config: &SearchConfig) {
    let client = match http::client_with_timeout(config, config.deep_fetch_timeout()) {
        Ok(client) => client,
        Err(err) => {
            tracing::warn!(error = %err, "deep-fetch client unavailable; skipping enrichment");
            return;
        }
    };

    let cap = config.deep_result_cap;
    for result in results.iter_mut().take(cap) {
        let excerpt =
            extract::fetch_excerpt(&client, &result.link, config.excerpt_max_chars).await;
        result.inner_content = Some(excerpt);
    }

    tracing::debug!(
        enriched = results.len().min(cap),
        total = results.len(),
        "deep enrichment complete"
    );
}
