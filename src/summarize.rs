//! Summarization collaborator boundary.
//!
//! Deep search offers the enriched results to an external
//! text-formatting service. The call is strictly best-effort: it is
//! raced against a fixed wall-clock timeout, and any error or timeout
//! degrades `formatted_result` to [`SUMMARY_UNAVAILABLE`] instead of
//! failing the request. Work on the losing side of the race is
//! abandoned, not cancelled.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::config::SummarizerConfig;
use crate::error::{Result, SearchError};
use crate::types::SearchResult;

/// Placeholder returned when summarization errors out or times out.
pub const SUMMARY_UNAVAILABLE: &str = "Error processing results with AI";

/// An external service that turns enriched search results into free text.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Format a prepared prompt into a summary.
    async fn format_results(&self, prompt: &str) -> Result<String>;
}

/// Race `summarizer` against `timeout`, degrading to the fixed
/// placeholder on error or timeout.
pub async fn summarize_with_timeout(
    summarizer: &dyn Summarizer,
    prompt: &str,
    timeout: Duration,
) -> String {
    match tokio::time::timeout(timeout, summarizer.format_results(prompt)).await {
        Ok(Ok(text)) => text,
        Ok(Err(err)) => {
            tracing::warn!(error = %err, "summarization failed");
            SUMMARY_UNAVAILABLE.to_owned()
        }
        Err(_) => {
            tracing::warn!(timeout_secs = timeout.as_secs(), "summarization timed out");
            SUMMARY_UNAVAILABLE.to_owned()
        }
    }
}

/// Build the single prompt string offered to the collaborator:
/// the query, each result's fields, and a fixed instruction block.
pub fn build_prompt(query: &str, results: &[SearchResult]) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("Search Query: {query}\n\n"));
    prompt.push_str("Search Results:\n");

    for result in results {
        prompt.push_str(&format!("\nTitle: {}\n", result.title));
        prompt.push_str(&format!("URL: {}\n", result.link));
        prompt.push_str(&format!("Description: {}\n", result.snippet));
        prompt.push_str(&format!(
            "PageContent: {}\n",
            result.inner_content.as_deref().unwrap_or("")
        ));
    }

    prompt.push_str(
        "\nInstructions:\n\
        You are tasked with generating a response based on the search results \
        from a given query. The goal is to summarize the key information and \
        insights from the search results in a clear and concise manner.\n\
        1. Review the search results and identify the most relevant and important information.\n\
        2. Summarize the key points and insights from the search results.\n\
        3. Provide a brief overview of the main topics and themes covered in the search results.\n\
        4. Use simple, straightforward language that is easy to understand.\n\
        5. Avoid repeating information or including unnecessary details.\n\
        6. Keep the response concise and focused on the main points.\n\
        7. Attach links to the original sources of information under each point.\n",
    );

    prompt
}

/// Summarizer backed by an OpenAI-compatible chat-completions API.
pub struct OpenAiSummarizer {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

impl OpenAiSummarizer {
    /// Build a summarizer from config. Returns `None` when no API key
    /// is configured; deep search then skips the formatting step.
    pub fn from_config(config: &SummarizerConfig) -> Option<Self> {
        let api_key = config.api_key.clone()?;
        Some(Self {
            client: reqwest::Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn format_results(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| SearchError::Summarize(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| SearchError::Summarize(format!("API error: {e}")))?;

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Summarize(format!("malformed response: {e}")))?;

        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| SearchError::Summarize("response contained no choices".into()))
    }
}
