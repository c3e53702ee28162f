//! Web search client used to enrich company research with recent public information.
//!
//! Search is strictly best-effort: callers log and discard every `SearchError`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::SearchSettings;

/// Upper bound on documents folded into a prompt.
pub const MAX_CONTEXT_DOCUMENTS: usize = 5;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// One hit returned by the search provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResultDocument {
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResultDocument>,
}

#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultDocument>, SearchError>;
}

/// HTTP search provider: `GET {url}?q=<query>` with a bearer key.
#[derive(Clone)]
pub struct SearchClient {
    client: Client,
    settings: SearchSettings,
}

impl SearchClient {
    pub fn new(settings: SearchSettings) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(15))
                .build()
                .expect("Failed to build HTTP client"),
            settings,
        }
    }
}

#[async_trait]
impl SearchProvider for SearchClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultDocument>, SearchError> {
        let response = self
            .client
            .get(&self.settings.url)
            .bearer_auth(&self.settings.api_key)
            .query(&[("q", query)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(SearchError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: SearchResponse = response.json().await?;
        debug!("Search returned {} documents", body.results.len());
        Ok(body.results)
    }
}

/// Query sent to the provider for a company research request.
pub fn company_query(company: &str, position: &str) -> String {
    format!("{company} company {position} culture news")
}

/// Renders search hits as a prompt section. Returns `None` when there is nothing to add.
pub fn render_context(documents: &[SearchResultDocument]) -> Option<String> {
    if documents.is_empty() {
        return None;
    }

    let mut context = String::from("Recent information found on the web:\n");
    for (i, doc) in documents.iter().take(MAX_CONTEXT_DOCUMENTS).enumerate() {
        context.push_str(&format!(
            "\n[{}] {}\n{}\nSource: {}\n",
            i + 1,
            doc.title.trim(),
            doc.snippet.trim(),
            doc.url.trim()
        ));
    }
    Some(context)
}
