use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::market::SymbolMatch;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER: &str = "Finnhub";

/// Finnhub API provider for symbol search and quotes.
///
/// - **Free tier**: 60 requests/minute.
/// - **Requires**: API key (set via settings as "finnhub").
/// - **Endpoints**: `/search?q=` and `/quote?symbol=`.
///
/// The key is sent as the `X-Finnhub-Token` header rather than a query
/// parameter so it never shows up in logged URLs.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(30))
    }

    pub fn with_timeout(api_key: String, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at a different host (proxies, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T, CoreError> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("Finnhub request: {endpoint}");

        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(api_error("Rate limit exceeded"));
        }
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(api_error("Invalid or missing API key"));
        }
        if !status.is_success() {
            return Err(api_error(format!("HTTP {status} for {endpoint}")));
        }

        response
            .json()
            .await
            .map_err(|e| api_error(format!("Failed to parse {endpoint} response: {e}")))
    }
}

fn api_error(message: impl Into<String>) -> CoreError {
    CoreError::Api {
        provider: PROVIDER.into(),
        message: message.into(),
    }
}

// ── Finnhub API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<SearchItem>,
}

#[derive(Deserialize)]
struct SearchItem {
    symbol: String,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    error: Option<String>,
}

#[async_trait]
impl MarketDataProvider for FinnhubProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        let resp: SearchResponse = self.fetch("/search", &[("q", query)]).await?;
        Ok(resp
            .result
            .into_iter()
            .map(|item| SymbolMatch::new(item.symbol, item.description))
            .collect())
    }

    async fn quote(&self, symbol: &str) -> Result<f64, CoreError> {
        let symbol = symbol.to_uppercase();
        let resp: QuoteResponse = self.fetch("/quote", &[("symbol", symbol.as_str())]).await?;

        if let Some(error) = resp.error {
            return Err(api_error(format!("Quote for {symbol} failed: {error}")));
        }
        resp.c
            .filter(|price| price.is_finite())
            .ok_or_else(|| api_error(format!("No quote data for {symbol}")))
    }
}
