//! Scripted model and search doubles shared by unit and router tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::llm_client::{ChatMessage, CompletionModel, LlmError};
use crate::search::{SearchError, SearchProvider, SearchResultDocument};

/// Replays canned completions in order and records every (system, user) pair.
pub struct ScriptedModel {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedModel {
    pub fn new(responses: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionModel for ScriptedModel {
    async fn complete(&self, system: &str, messages: &[ChatMessage]) -> Result<String, LlmError> {
        let user = messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.calls.lock().unwrap().push((system.to_string(), user));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(LlmError::EmptyContent))
    }
}

pub struct FailingSearch;

#[async_trait]
impl SearchProvider for FailingSearch {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResultDocument>, SearchError> {
        Err(SearchError::Api {
            status: 503,
            message: "search unavailable".into(),
        })
    }
}

pub struct StaticSearch {
    documents: Vec<SearchResultDocument>,
    queries: Mutex<Vec<String>>,
}

impl StaticSearch {
    pub fn new(documents: Vec<SearchResultDocument>) -> Self {
        Self {
            documents,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StaticSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchResultDocument>, SearchError> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.documents.clone())
    }
}

/// Config with no pacing delay and nothing external configured.
pub fn test_config() -> Config {
    Config::from_lookup(|key| (key == "STAGE_DELAY_MS").then(|| "0".to_string()))
        .expect("static test config is valid")
}
