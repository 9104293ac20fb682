use std::collections::HashMap;
use std::time::Duration;

use super::finnhub::FinnhubProvider;
use super::traits::MarketDataProvider;

/// Registry of available market-data providers, in priority order.
///
/// Lookups try providers in registration order and fall back to the next one
/// on failure. New providers can be added without touching the lookup code.
pub struct MarketDataRegistry {
    providers: Vec<Box<dyn MarketDataProvider>>,
}

impl MarketDataRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Create a registry with every provider whose API key is configured.
    pub fn new_with_defaults(api_keys: &HashMap<String, String>, timeout: Duration) -> Self {
        let mut registry = Self::new();

        // Finnhub: search + quote, requires API key
        if let Some(key) = api_keys.get("finnhub") {
            registry.register(Box::new(FinnhubProvider::with_timeout(key.clone(), timeout)));
        }

        registry
    }

    /// Register a new provider at the lowest priority.
    pub fn register(&mut self, provider: Box<dyn MarketDataProvider>) {
        self.providers.push(provider);
    }

    /// All providers, ordered by registration priority.
    pub fn providers(&self) -> impl Iterator<Item = &dyn MarketDataProvider> {
        self.providers.iter().map(|p| p.as_ref())
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }
}

impl Default for MarketDataRegistry {
    fn default() -> Self {
        Self::new()
    }
}
