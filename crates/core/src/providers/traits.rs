use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::market::SymbolMatch;

/// Trait abstraction for market-data providers.
///
/// Each API (Finnhub today) implements this trait; the lookup service only
/// sees the trait, so a provider can be replaced or stacked as a fallback
/// without touching the rest of the crate.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Search symbols matching `query`. An empty list is a normal result.
    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError>;

    /// Current price of `symbol`.
    async fn quote(&self, symbol: &str) -> Result<f64, CoreError>;
}
