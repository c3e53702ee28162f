use std::sync::Arc;

use crate::analysis::orchestrator::Orchestrator;
use crate::config::Config;
use crate::llm_client::{CompletionModel, LlmClient};
use crate::search::{SearchClient, SearchProvider};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// `None` when no model-provider key is configured; analysis requests then fail with 500.
    pub orchestrator: Option<Arc<Orchestrator>>,
}

impl AppState {
    pub fn new(
        config: Config,
        model: Option<Arc<dyn CompletionModel>>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        let orchestrator = model
            .map(|model| Arc::new(Orchestrator::new(model, search, config.stage_delay)));
        Self {
            config,
            orchestrator,
        }
    }

    /// Wires the production model and search clients from configuration.
    pub fn from_config(config: Config) -> Self {
        let model = config.anthropic_api_key.clone().map(|key| {
            Arc::new(LlmClient::new(key, config.llm_api_url.clone())) as Arc<dyn CompletionModel>
        });
        let search = config
            .search_settings()
            .map(|settings| Arc::new(SearchClient::new(settings)) as Arc<dyn SearchProvider>);
        Self::new(config, model, search)
    }
}
