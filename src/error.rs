//! Error types for the metasearch crate.
//!
//! All errors carry stable string messages suitable for display and for
//! programmatic matching. Provider and extraction failures are local:
//! they are collected or degraded at the aggregator boundary rather
//! than unwinding past it.

/// Errors that can occur during search, extraction, or caching.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The caller supplied an empty or whitespace-only query.
    #[error("empty search query")]
    EmptyQuery,

    /// An HTTP request to a provider or result page failed.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Failed to parse a scraped HTML response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The cache could not serialize a value to account for its size.
    /// The offending value is never admitted; existing entries are untouched.
    #[error("cache error: {0}")]
    Cache(String),

    /// The summarization collaborator returned an error.
    #[error("summarization error: {0}")]
    Summarize(String),
}

/// Convenience type alias for metasearch results.
pub type Result<T> = std::result::Result<T, SearchError>;
