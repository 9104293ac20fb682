pub mod backend;
pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod store;

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use backend::{http::HttpStockBackend, traits::StockBackend};
use models::{
    holding::{Holding, HoldingInput},
    market::{LookupOutcome, StockData, SymbolMatch},
    metrics::{GroupedHolding, HoldingPerformance, PerformancePoint, PortfolioMetrics, RankedHolding},
    settings::Settings,
};
use providers::registry::MarketDataRegistry;
use services::{lookup_service::StockLookupService, metrics_service::MetricsService};
use store::holdings_store::HoldingsStore;

use errors::CoreError;

/// Main entry point for the stock-portfolio core library.
///
/// One session per signed-in user: create it when the session starts, drop it
/// (or [`close`](Self::close) it) when the session ends. Holds the holdings
/// store and every service that operates on it. Derived views are recomputed
/// from the current snapshot on every call.
#[must_use]
pub struct PortfolioSession {
    settings: Settings,
    store: HoldingsStore,
    metrics_service: MetricsService,
    lookup_service: StockLookupService,
}

impl std::fmt::Debug for PortfolioSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioSession")
            .field("backend_url", &self.settings.backend_url)
            .field("store", &self.store)
            .field("providers", &self.lookup_service.provider_names())
            .finish()
    }
}

impl PortfolioSession {
    /// Build a session talking to the configured REST backend and market-data
    /// providers.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let timeout = Duration::from_secs(settings.request_timeout_secs);
        let backend = Arc::new(HttpStockBackend::new(settings.backend_url.clone(), timeout));
        let registry = MarketDataRegistry::new_with_defaults(&settings.api_keys, timeout);
        Ok(Self::with_parts(settings, backend, registry))
    }

    /// Build a session from injected parts (tests, offline backends, custom providers).
    pub fn with_parts(
        settings: Settings,
        backend: Arc<dyn StockBackend>,
        registry: MarketDataRegistry,
    ) -> Self {
        let lookup_service =
            StockLookupService::new(registry).with_quick_picks(&settings.quick_pick_tickers);
        Self {
            store: HoldingsStore::new(backend),
            metrics_service: MetricsService::new(),
            lookup_service,
            settings,
        }
    }

    /// End the session. In-flight results are discarded.
    pub fn close(&self) {
        self.store.close();
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Direct access to the store (flags, selection, form state).
    #[must_use]
    pub fn store(&self) -> &HoldingsStore {
        &self.store
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Current snapshot of holdings.
    #[must_use]
    pub fn holdings(&self) -> Arc<Vec<Holding>> {
        self.store.holdings()
    }

    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.store.refresh().await
    }

    pub async fn add_holding(&self, input: HoldingInput) -> Result<Holding, CoreError> {
        self.store.create(input).await
    }

    pub async fn edit_holding(&self, id: &str, input: HoldingInput) -> Result<Holding, CoreError> {
        self.store.edit(id, input).await
    }

    pub async fn delete_holding(&self, id: &str) -> Result<(), CoreError> {
        self.store.delete(id).await
    }

    /// Save the form: edits the selected holding, creates otherwise.
    pub async fn submit_form(&self, input: HoldingInput) -> Result<Holding, CoreError> {
        self.store.submit_form(input).await
    }

    pub fn select_for_edit(&self, holding: Option<Holding>) {
        self.store.select_for_edit(holding);
    }

    /// Number of holdings (lots) in the snapshot.
    #[must_use]
    pub fn stock_count(&self) -> usize {
        self.store.holdings().len()
    }

    // ── Metrics ─────────────────────────────────────────────────────

    #[must_use]
    pub fn metrics(&self) -> PortfolioMetrics {
        self.metrics_service
            .compute_portfolio_metrics(&self.store.holdings())
    }

    #[must_use]
    pub fn grouped(&self) -> Vec<GroupedHolding> {
        self.metrics_service.group_by_ticker(&self.store.holdings())
    }

    /// Best holdings by return, limited by `top_performers_limit`.
    #[must_use]
    pub fn top_performers(&self) -> Vec<RankedHolding> {
        self.metrics_service
            .top_performers(&self.store.holdings(), self.settings.top_performers_limit)
    }

    /// Largest movers, limited by `recent_activity_limit`.
    #[must_use]
    pub fn recent_activity(&self) -> Vec<RankedHolding> {
        self.metrics_service
            .recent_activity(&self.store.holdings(), self.settings.recent_activity_limit)
    }

    /// Ticker group with the largest unrealized profit.
    #[must_use]
    pub fn best_performer(&self) -> Option<GroupedHolding> {
        let groups = self.grouped();
        self.metrics_service.find_best_performer(&groups).cloned()
    }

    #[must_use]
    pub fn performance_series(&self) -> Vec<PerformancePoint> {
        self.metrics_service
            .performance_series(&self.store.holdings())
    }

    #[must_use]
    pub fn holding_performance(&self, holding: &Holding) -> HoldingPerformance {
        self.metrics_service.holding_performance(holding)
    }

    /// Newest backend modification time across the snapshot.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.metrics_service.latest_update(&self.store.holdings())
    }

    // ── Market data ─────────────────────────────────────────────────

    pub async fn lookup(&self, ticker: &str) -> LookupOutcome {
        self.lookup_service.lookup(ticker).await
    }

    pub async fn suggestions(&self, query: &str) -> Vec<SymbolMatch> {
        self.lookup_service.suggestions(query).await
    }

    /// Candidate pre-filled from a lookup result.
    pub fn input_from_lookup(&self, data: &StockData, quantity: f64, buy_price: f64) -> HoldingInput {
        self.lookup_service.to_input(data, quantity, buy_price)
    }
}
