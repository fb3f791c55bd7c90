//! Thin HTTP surface over the aggregator and cache.
//!
//! Every search request goes: admission check → cache lookup →
//! fan-out aggregation on miss → cache store → JSON response. Cache
//! store failures are logged and never fail the response.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::aggregate::aggregate;
use crate::cache::ResponseCache;
use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::limiter::AdmissionLimiter;
use crate::providers::ProviderHandle;
use crate::summarize::Summarizer;

/// Shared state injected into every handler.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<ResponseCache>,
    pub limiter: Arc<AdmissionLimiter>,
    pub providers: Arc<Vec<Arc<dyn ProviderHandle>>>,
    pub search_config: Arc<SearchConfig>,
    /// Present only when a summarizer is configured; deep search
    /// skips the formatting step without one.
    pub summarizer: Option<Arc<dyn Summarizer>>,
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    search: Option<String>,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/search", get(search_handler))
        .route("/search/deep", get(deep_search_handler))
        .route("/cache/stats", get(cache_stats))
        .route("/cache/metrics", get(cache_metrics))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    run_search(state, params, false).await
}

async fn deep_search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Response {
    run_search(state, params, true).await
}

async fn run_search(state: AppState, params: SearchParams, deep: bool) -> Response {
    if !state.limiter.try_acquire() {
        return (StatusCode::TOO_MANY_REQUESTS, "Too many requests").into_response();
    }

    let Some(query) = params.search.filter(|q| !q.trim().is_empty()) else {
        return (StatusCode::BAD_REQUEST, "Missing search parameter").into_response();
    };

    if let Some(cached) = state.cache.get(&query) {
        tracing::debug!(%query, "cache hit");
        return Json(&*cached).into_response();
    }

    let summarizer = if deep { state.summarizer.as_deref() } else { None };

    match aggregate(&query, &state.providers, deep, &state.search_config, summarizer).await {
        Ok((response, failures)) => {
            for failure in &failures {
                tracing::warn!(
                    provider = %failure.provider,
                    error = %failure.error,
                    "provider failed during request"
                );
            }
            if let Err(err) = state.cache.set(&query, response.clone()) {
                tracing::warn!(%err, "failed to cache response");
            }
            Json(response).into_response()
        }
        Err(SearchError::EmptyQuery) => {
            (StatusCode::BAD_REQUEST, "Missing search parameter").into_response()
        }
        Err(err) => {
            tracing::error!(%err, "aggregation failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

async fn cache_stats(State(state): State<AppState>) -> Response {
    Json(state.cache.stats()).into_response()
}

async fn cache_metrics(State(state): State<AppState>) -> Response {
    Json(state.cache.metrics()).into_response()
}
