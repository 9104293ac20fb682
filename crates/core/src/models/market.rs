use serde::{Deserialize, Serialize};

/// A symbol search candidate returned by a market-data provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolMatch {
    /// Ticker symbol (e.g., "AAPL")
    pub symbol: String,

    /// Human-readable description (e.g., "APPLE INC")
    pub description: String,
}

impl SymbolMatch {
    pub fn new(symbol: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            description: description.into(),
        }
    }
}

/// Display name and current price resolved for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockData {
    pub symbol: String,
    pub name: String,
    pub current_price: f64,
}

/// Result of resolving a ticker for the add/edit form.
///
/// Lookups are best-effort: a missing symbol or a provider outage is a normal
/// outcome for the form to display, never an error for the store.
#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    /// The symbol resolved to a name and a current price
    Found(StockData),
    /// The search returned no candidates for the symbol
    InvalidTicker,
    /// Every provider failed; carries the last failure for logging/display
    FetchError(String),
}

impl LookupOutcome {
    /// Message the form shows for a degraded lookup, `None` on success.
    #[must_use]
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            LookupOutcome::Found(_) => None,
            LookupOutcome::InvalidTicker => Some("Invalid ticker symbol"),
            LookupOutcome::FetchError(_) => Some("Error fetching stock data"),
        }
    }

    /// The resolved data, if any.
    #[must_use]
    pub fn found(&self) -> Option<&StockData> {
        match self {
            LookupOutcome::Found(data) => Some(data),
            _ => None,
        }
    }
}
