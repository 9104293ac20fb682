use log::{debug, warn};

use crate::models::holding::{normalize_ticker, HoldingInput};
use crate::models::market::{LookupOutcome, StockData, SymbolMatch};
use crate::providers::registry::MarketDataRegistry;

/// Resolves tickers to a display name and current price for the add/edit form.
///
/// Lookups are best-effort. Nothing here returns an error: an unknown symbol
/// becomes `LookupOutcome::InvalidTicker` and a provider outage becomes
/// `LookupOutcome::FetchError`, for the form layer to display. Providers are
/// tried in registration order and the first that answers wins.
pub struct StockLookupService {
    registry: MarketDataRegistry,
    quick_picks: Vec<String>,
}

impl StockLookupService {
    pub fn new(registry: MarketDataRegistry) -> Self {
        Self {
            registry,
            quick_picks: Vec::new(),
        }
    }

    /// Tickers offered before any search results.
    #[must_use]
    pub fn with_quick_picks(mut self, tickers: &[String]) -> Self {
        self.quick_picks = tickers.iter().map(|t| normalize_ticker(t)).collect();
        self
    }

    /// Check if at least one provider is configured.
    pub fn has_provider(&self) -> bool {
        !self.registry.is_empty()
    }

    pub fn provider_names(&self) -> Vec<String> {
        self.registry.provider_names()
    }

    /// Resolve `ticker` to its name (first search hit) and current quote.
    pub async fn lookup(&self, ticker: &str) -> LookupOutcome {
        let symbol = normalize_ticker(ticker);
        if symbol.is_empty() {
            return LookupOutcome::InvalidTicker;
        }
        if self.registry.is_empty() {
            return LookupOutcome::FetchError("No market data provider configured".into());
        }

        let mut last_error = None;
        for provider in self.registry.providers() {
            let matches = match provider.search(&symbol).await {
                Ok(matches) => matches,
                Err(e) => {
                    warn!("{} search for {symbol} failed: {e}", provider.name());
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            let Some(first) = matches.into_iter().next() else {
                debug!("{} has no match for {symbol}", provider.name());
                return LookupOutcome::InvalidTicker;
            };

            match provider.quote(&symbol).await {
                Ok(current_price) => {
                    return LookupOutcome::Found(StockData {
                        symbol,
                        name: first.description,
                        current_price,
                    });
                }
                Err(e) => {
                    warn!("{} quote for {symbol} failed: {e}", provider.name());
                    last_error = Some(e.to_string());
                }
            }
        }

        LookupOutcome::FetchError(last_error.unwrap_or_else(|| "No provider answered".into()))
    }

    /// Quick picks followed by search results for `query`.
    ///
    /// An empty query, or a search that fails on every provider, yields only
    /// the quick picks.
    pub async fn suggestions(&self, query: &str) -> Vec<SymbolMatch> {
        let mut suggestions: Vec<SymbolMatch> = self
            .quick_picks
            .iter()
            .map(|t| SymbolMatch::new(t.clone(), ""))
            .collect();

        let query = normalize_ticker(query);
        if query.is_empty() {
            return suggestions;
        }

        for provider in self.registry.providers() {
            match provider.search(&query).await {
                Ok(matches) => {
                    suggestions.extend(matches);
                    break;
                }
                Err(e) => warn!("{} suggestions for {query} failed: {e}", provider.name()),
            }
        }

        suggestions
    }

    /// Pre-fill a candidate from a successful lookup plus the user's entries.
    pub fn to_input(&self, data: &StockData, quantity: f64, buy_price: f64) -> HoldingInput {
        HoldingInput::new(
            data.name.clone(),
            data.symbol.clone(),
            quantity,
            buy_price,
            data.current_price,
        )
    }
}
