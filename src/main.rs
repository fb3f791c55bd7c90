//! metasearchd — the aggregation server binary.

use std::sync::Arc;

use metasearch::cache::{spawn_sweeper, ResponseCache};
use metasearch::config::AppConfig;
use metasearch::limiter::AdmissionLimiter;
use metasearch::server::{router, AppState};
use metasearch::summarize::{OpenAiSummarizer, Summarizer};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let cache = Arc::new(ResponseCache::new(&config.cache));
    let sweeper = spawn_sweeper(Arc::clone(&cache), config.cache.cleanup_interval());

    let summarizer: Option<Arc<dyn Summarizer>> = OpenAiSummarizer::from_config(&config.summarizer)
        .map(|s| Arc::new(s) as Arc<dyn Summarizer>);
    if summarizer.is_none() {
        tracing::info!("no summarizer API key configured; deep search will skip formatting");
    }

    let state = AppState {
        cache,
        limiter: Arc::new(AdmissionLimiter::new(config.server.rate_burst)),
        providers: Arc::new(metasearch::build_providers(&config.search.providers)),
        search_config: Arc::new(config.search.clone()),
        summarizer,
    };

    let addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("metasearchd listening on http://{addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to install ctrl-c handler");
    }
}
