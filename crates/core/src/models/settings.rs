use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::errors::CoreError;

/// Default persistence backend (collection rooted at `/stocks`).
pub const DEFAULT_BACKEND_URL: &str = "https://capx-stock-portfolio-backend.onrender.com/";

/// Session configuration. Every field has a default, so a partial JSON
/// document (or none at all) is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the persistence backend.
    pub backend_url: String,

    /// Optional API keys for market-data providers.
    /// Keys: provider name (e.g., "finnhub").
    /// Values: the API key string.
    pub api_keys: HashMap<String, String>,

    /// Per-request timeout for backend and market-data HTTP calls.
    pub request_timeout_secs: u64,

    /// How many holdings the "top performers" view shows.
    pub top_performers_limit: usize,

    /// How many holdings the "recent activity" view shows.
    pub recent_activity_limit: usize,

    /// Tickers offered as quick picks before any search results.
    pub quick_pick_tickers: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            api_keys: HashMap::new(),
            request_timeout_secs: 30,
            top_performers_limit: 3,
            recent_activity_limit: 5,
            quick_pick_tickers: ["AAPL", "NVDA", "MSFT", "GOOG", "META"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields fall back to defaults.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| CoreError::Config(format!("Failed to parse settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.backend_url.trim().is_empty() {
            return Err(CoreError::Config("backend_url must not be empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(CoreError::Config(
                "request_timeout_secs must be greater than 0".into(),
            ));
        }
        Ok(())
    }

    /// Builder-style helper to set a provider API key.
    #[must_use]
    pub fn with_api_key(mut self, provider: impl Into<String>, key: impl Into<String>) -> Self {
        self.api_keys.insert(provider.into(), key.into());
        self
    }

    #[must_use]
    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }
}
