use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm_client::ANTHROPIC_API_URL;

const DEFAULT_STAGE_DELAY_MS: u64 = 500;

/// Application configuration loaded from environment variables.
/// Every variable is optional; the model key is checked per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub llm_api_url: String,
    pub search_api_url: Option<String>,
    pub search_api_key: Option<String>,
    /// Pause between cosmetic progress stages.
    pub stage_delay: Duration,
    pub port: u16,
    pub rust_log: String,
}

/// Endpoint and credential for the optional web search augmentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    pub url: String,
    pub api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let stage_delay_ms = match get("STAGE_DELAY_MS") {
            Some(raw) => raw
                .parse::<u64>()
                .context("STAGE_DELAY_MS must be a whole number of milliseconds")?,
            None => DEFAULT_STAGE_DELAY_MS,
        };

        Ok(Config {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            llm_api_url: get("LLM_API_URL").unwrap_or_else(|| ANTHROPIC_API_URL.to_string()),
            search_api_url: get("SEARCH_API_URL"),
            search_api_key: get("SEARCH_API_KEY"),
            stage_delay: Duration::from_millis(stage_delay_ms),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Search augmentation is active only when both the URL and the key are set.
    pub fn search_settings(&self) -> Option<SearchSettings> {
        match (&self.search_api_url, &self.search_api_key) {
            (Some(url), Some(api_key)) => Some(SearchSettings {
                url: url.clone(),
                api_key: api_key.clone(),
            }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.stage_delay, Duration::from_millis(500));
        assert_eq!(config.llm_api_url, ANTHROPIC_API_URL);
        assert!(config.anthropic_api_key.is_none());
        assert!(config.search_settings().is_none());
    }

    #[test]
    fn test_search_requires_both_url_and_key() {
        let only_url = config_from(&[("SEARCH_API_URL", "https://search.test")]).unwrap();
        assert!(only_url.search_settings().is_none());

        let only_key = config_from(&[("SEARCH_API_KEY", "k")]).unwrap();
        assert!(only_key.search_settings().is_none());

        let both = config_from(&[
            ("SEARCH_API_URL", "https://search.test"),
            ("SEARCH_API_KEY", "k"),
        ])
        .unwrap();
        assert_eq!(
            both.search_settings(),
            Some(SearchSettings {
                url: "https://search.test".to_string(),
                api_key: "k".to_string(),
            })
        );
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config = config_from(&[("ANTHROPIC_API_KEY", "  "), ("PORT", "")]).unwrap();
        assert!(config.anthropic_api_key.is_none());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "not-a-port")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_stage_delay_override() {
        let config = config_from(&[("STAGE_DELAY_MS", "0")]).unwrap();
        assert_eq!(config.stage_delay, Duration::ZERO);
        assert!(config_from(&[("STAGE_DELAY_MS", "soon")]).is_err());
    }
}
