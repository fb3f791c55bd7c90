//! Configuration with sensible defaults and layered env loading.
//!
//! [`AppConfig`] groups the server, search, cache, and summarizer
//! settings. Everything has a built-in default; `METASEARCH_*`
//! environment variables are layered on top via figment, with `__`
//! separating nesting levels (e.g. `METASEARCH_CACHE__MAX_ITEMS`).

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::SearchError;
use crate::types::SearchProvider;

/// Configuration for search aggregation and deep-mode enrichment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Which providers to scrape. Queried concurrently; results are concatenated.
    pub providers: Vec<SearchProvider>,
    /// Per-provider HTTP request timeout in seconds.
    pub timeout_seconds: u64,
    /// Per-URL fetch timeout for deep-mode page visits, in seconds.
    pub deep_fetch_timeout_seconds: u64,
    /// Maximum number of results enriched with page content in deep mode.
    pub deep_result_cap: usize,
    /// Maximum characters kept from an extracted page excerpt.
    pub excerpt_max_chars: usize,
    /// Overall timeout for the best-effort summarization call, in seconds.
    pub summarize_timeout_seconds: u64,
    /// Custom User-Agent. If `None`, rotates through a built-in list of
    /// realistic browser User-Agents.
    pub user_agent: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            providers: SearchProvider::all().to_vec(),
            timeout_seconds: 8,
            deep_fetch_timeout_seconds: 10,
            deep_result_cap: 10,
            excerpt_max_chars: 5000,
            summarize_timeout_seconds: 30,
            user_agent: None,
        }
    }
}

impl SearchConfig {
    /// Validates this configuration, returning an error if any field is invalid.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.providers.is_empty() {
            return Err(SearchError::Config(
                "at least one provider must be enabled".into(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(SearchError::Config(
                "timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.deep_fetch_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "deep_fetch_timeout_seconds must be greater than 0".into(),
            ));
        }
        if self.deep_result_cap == 0 {
            return Err(SearchError::Config(
                "deep_result_cap must be greater than 0".into(),
            ));
        }
        if self.excerpt_max_chars == 0 {
            return Err(SearchError::Config(
                "excerpt_max_chars must be greater than 0".into(),
            ));
        }
        if self.summarize_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "summarize_timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Deep-mode per-URL fetch timeout as a [`Duration`].
    pub fn deep_fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.deep_fetch_timeout_seconds)
    }

    /// Summarization timeout as a [`Duration`].
    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_secs(self.summarize_timeout_seconds)
    }
}

/// Configuration for the bounded response cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached responses.
    pub max_items: usize,
    /// Maximum total serialized size of cached responses, in bytes.
    pub max_bytes: u64,
    /// How long an entry stays resident before expiring, in seconds.
    /// 0 disables time-based expiry.
    pub default_ttl_seconds: u64,
    /// Interval between background expiry sweeps, in seconds.
    pub cleanup_interval_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: 1000,
            max_bytes: 50 * 1024 * 1024,
            default_ttl_seconds: 300,
            cleanup_interval_seconds: 600,
        }
    }
}

impl CacheConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.max_items == 0 {
            return Err(SearchError::Config(
                "max_items must be greater than 0".into(),
            ));
        }
        if self.max_bytes == 0 {
            return Err(SearchError::Config(
                "max_bytes must be greater than 0".into(),
            ));
        }
        if self.cleanup_interval_seconds == 0 {
            return Err(SearchError::Config(
                "cleanup_interval_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Entry time-to-live as a [`Duration`]. Zero means no expiry.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// Sweep interval as a [`Duration`].
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds)
    }
}

/// Configuration for the HTTP surface and admission limiting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// TCP port to listen on.
    pub port: u16,
    /// Token-bucket burst size. One token is replenished per second;
    /// requests beyond the available tokens are rejected, not queued.
    pub rate_burst: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            rate_burst: 5,
        }
    }
}

impl ServerConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.rate_burst == 0 {
            return Err(SearchError::Config(
                "rate_burst must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration for the OpenAI-compatible summarization collaborator.
///
/// Summarization is enabled only when `api_key` is set; without it,
/// deep search still runs but skips the formatting step.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// API key. `None` disables summarization.
    pub api_key: Option<String>,
    /// Chat model name.
    pub model: String,
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-3.5-turbo".into(),
            base_url: "https://api.openai.com/v1".into(),
        }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub search: SearchConfig,
    pub cache: CacheConfig,
    pub summarizer: SummarizerConfig,
}

impl AppConfig {
    /// Load configuration: built-in defaults overlaid with
    /// `METASEARCH_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if an environment variable cannot
    /// be parsed into the target field type.
    pub fn load() -> Result<Self, SearchError> {
        Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Env::prefixed("METASEARCH_").split("__"))
            .extract()
            .map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Validates all sections.
    pub fn validate(&self) -> Result<(), SearchError> {
        self.server.validate()?;
        self.search.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
