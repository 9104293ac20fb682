use async_trait::async_trait;
use std::sync::Arc;

use stock_portfolio_core::backend::memory::InMemoryStockBackend;
use stock_portfolio_core::backend::traits::StockBackend;
use stock_portfolio_core::errors::CoreError;
use stock_portfolio_core::models::holding::{Holding, HoldingInput};
use stock_portfolio_core::models::market::{LookupOutcome, SymbolMatch};
use stock_portfolio_core::models::settings::Settings;
use stock_portfolio_core::providers::registry::MarketDataRegistry;
use stock_portfolio_core::providers::traits::MarketDataProvider;
use stock_portfolio_core::PortfolioSession;

// ═══════════════════════════════════════════════════════════════════
// Mock Market Data Provider (for testing without real API calls)
// ═══════════════════════════════════════════════════════════════════

struct MockMarketData;

#[async_trait]
impl MarketDataProvider for MockMarketData {
    fn name(&self) -> &str {
        "MockMarketData"
    }

    async fn search(&self, query: &str) -> Result<Vec<SymbolMatch>, CoreError> {
        Ok(match query {
            "AAPL" => vec![SymbolMatch::new("AAPL", "APPLE INC")],
            "META" => vec![SymbolMatch::new("META", "META PLATFORMS INC-CLASS A")],
            _ => Vec::new(),
        })
    }

    async fn quote(&self, symbol: &str) -> Result<f64, CoreError> {
        match symbol {
            "AAPL" => Ok(180.0),
            "META" => Ok(512.0),
            _ => Err(CoreError::Api {
                provider: "MockMarketData".into(),
                message: format!("No quote for {symbol}"),
            }),
        }
    }
}

fn session_with(settings: Settings) -> (PortfolioSession, Arc<InMemoryStockBackend>) {
    let backend = Arc::new(InMemoryStockBackend::new());
    let mut registry = MarketDataRegistry::new();
    registry.register(Box::new(MockMarketData));
    let session = PortfolioSession::with_parts(settings, backend.clone(), registry);
    (session, backend)
}

/// Two AAPL lots, one MSFT loser, one NVDA winner.
async fn seeded_session(settings: Settings) -> (PortfolioSession, Arc<InMemoryStockBackend>) {
    let (session, backend) = session_with(settings);
    for input in [
        HoldingInput::new("Apple Inc.", "AAPL", 10.0, 150.0, 180.0),
        HoldingInput::new("Microsoft", "MSFT", 5.0, 400.0, 380.0),
        HoldingInput::new("Apple Inc.", "aapl", 5.0, 170.0, 180.0),
        HoldingInput::new("Nvidia", "NVDA", 2.0, 100.0, 140.0),
    ] {
        session.add_holding(input).await.unwrap();
    }
    (session, backend)
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn tickers(ranked: &[stock_portfolio_core::models::metrics::RankedHolding]) -> Vec<&str> {
    ranked.iter().map(|r| r.holding.ticker.as_str()).collect()
}

// ═══════════════════════════════════════════════════════════════════
// Full Workflow: add → metrics → rankings → edit → delete
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn full_workflow() {
    let (session, backend) = seeded_session(Settings::default()).await;

    assert_eq!(session.stock_count(), 4);
    assert_eq!(backend.len(), 4);
    assert!(session.last_updated().is_some());

    // Totals
    let metrics = session.metrics();
    assert!(approx(metrics.total_investment, 4550.0));
    assert!(approx(metrics.current_value, 4880.0));
    assert!(approx(metrics.total_gain, 330.0));
    assert!(approx(metrics.percentage_gain, 330.0 / 4550.0 * 100.0));
    assert!(metrics.is_gain());

    // Grouping keeps first-seen order and the first lot's prices
    let grouped = session.grouped();
    let group_tickers: Vec<&str> = grouped.iter().map(|g| g.ticker.as_str()).collect();
    assert_eq!(group_tickers, vec!["AAPL", "MSFT", "NVDA"]);
    assert_eq!(grouped[0].total_quantity, 15.0);
    assert_eq!(grouped[0].lot_count, 2);
    assert_eq!(grouped[0].buy_price, 150.0);

    // Best performer by profit: AAPL (15 * 30 = 450)
    let best = session.best_performer().unwrap();
    assert_eq!(best.ticker, "AAPL");
    assert!(approx(best.profit(), 450.0));

    // Rankings: NVDA +40%, AAPL +20%, AAPL +5.88%, MSFT -5%
    assert_eq!(tickers(&session.top_performers()), vec!["NVDA", "AAPL", "AAPL"]);
    assert_eq!(
        tickers(&session.recent_activity()),
        vec!["NVDA", "AAPL", "AAPL", "MSFT"]
    );

    // Edit the MSFT lot into the top winner (+50%)
    let msft = session
        .holdings()
        .iter()
        .find(|h| h.ticker == "MSFT")
        .cloned()
        .unwrap();
    let perf = session.holding_performance(&msft);
    assert!(!perf.is_positive);
    assert!(approx(perf.gain_loss, -100.0));

    let edited = session
        .edit_holding(&msft.id, HoldingInput::new("Microsoft", "MSFT", 5.0, 400.0, 600.0))
        .await
        .unwrap();
    assert_eq!(edited.id, msft.id);
    assert_eq!(session.store().find(&msft.id).unwrap().current_price, 600.0);
    assert_eq!(tickers(&session.top_performers())[..1], ["MSFT"]);

    // Delete it
    session.delete_holding(&msft.id).await.unwrap();
    assert_eq!(session.stock_count(), 3);
    assert!(session.store().find(&msft.id).is_none());

    let series = session.performance_series();
    let series_tickers: Vec<&str> = series.iter().map(|p| p.ticker.as_str()).collect();
    assert_eq!(series_tickers, vec!["AAPL", "AAPL", "NVDA"]);
    assert!(approx(series[2].current_value, 280.0));
}

#[tokio::test]
async fn view_limits_come_from_settings() {
    let settings = Settings {
        top_performers_limit: 1,
        recent_activity_limit: 2,
        ..Settings::default()
    };
    let (session, _) = seeded_session(settings).await;

    assert_eq!(tickers(&session.top_performers()), vec!["NVDA"]);
    assert_eq!(tickers(&session.recent_activity()), vec!["NVDA", "AAPL"]);
}

#[tokio::test]
async fn empty_session_views() {
    let (session, _) = session_with(Settings::default());
    session.refresh().await.unwrap();

    assert_eq!(session.stock_count(), 0);
    assert_eq!(session.metrics().percentage_gain, 0.0);
    assert!(session.grouped().is_empty());
    assert!(session.best_performer().is_none());
    assert!(session.top_performers().is_empty());
    assert!(session.last_updated().is_none());
}

// ═══════════════════════════════════════════════════════════════════
// Backend changes
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn refresh_picks_up_backend_changes() {
    let backend = Arc::new(InMemoryStockBackend::new());
    let session = PortfolioSession::with_parts(
        Settings::default(),
        backend.clone(),
        MarketDataRegistry::new(),
    );

    backend
        .create(&HoldingInput::new("Meta", "META", 1.0, 300.0, 350.0))
        .await
        .unwrap();
    assert_eq!(session.stock_count(), 0);

    session.refresh().await.unwrap();
    assert_eq!(session.stock_count(), 1);
}

// ═══════════════════════════════════════════════════════════════════
// Form workflow through the session
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn submit_form_creates_then_edits() {
    let (session, _) = session_with(Settings::default());

    session.store().set_show_form(true);
    let created = session
        .submit_form(HoldingInput::new("Apple Inc.", "AAPL", 1.0, 150.0, 180.0))
        .await
        .unwrap();
    assert!(!session.store().show_form());
    assert_eq!(session.stock_count(), 1);

    session.select_for_edit(Some(created.clone()));
    assert!(session.store().show_form());

    let mut input = HoldingInput::from(&created);
    input.quantity = 4.0;
    let edited = session.submit_form(input).await.unwrap();

    assert_eq!(edited.id, created.id);
    assert_eq!(session.stock_count(), 1);
    assert_eq!(session.holdings()[0].quantity, 4.0);
    assert!(session.store().selected_for_edit().is_none());
    assert!(!session.store().show_form());
}

#[tokio::test]
async fn invalid_form_keeps_form_open() {
    let (session, backend) = session_with(Settings::default());
    session.store().set_show_form(true);

    let err = session
        .submit_form(HoldingInput::new("Apple Inc.", "AAPL", 0.0, 150.0, 180.0))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert!(session.store().show_form());
    assert!(backend.is_empty());
    assert!(session.store().last_error().is_none());
}

// ═══════════════════════════════════════════════════════════════════
// Lookup → candidate → add
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn lookup_prefills_new_holding() {
    let (session, _) = session_with(Settings::default());

    let outcome = session.lookup("meta").await;
    let data = outcome.found().unwrap();
    assert_eq!(data.name, "META PLATFORMS INC-CLASS A");

    let input = session.input_from_lookup(data, 2.0, 480.0);
    let added = session.add_holding(input).await.unwrap();

    assert_eq!(added.ticker, "META");
    assert_eq!(added.current_price, 512.0);
    let perf = session.holding_performance(&added);
    assert!(approx(perf.gain_loss, 64.0));
}

#[tokio::test]
async fn lookup_unknown_ticker() {
    let (session, _) = session_with(Settings::default());
    assert_eq!(session.lookup("ZZZZ").await, LookupOutcome::InvalidTicker);
}

#[tokio::test]
async fn suggestions_start_with_configured_quick_picks() {
    let (session, _) = session_with(Settings::default());

    let suggestions = session.suggestions("aapl").await;
    let symbols: Vec<&str> = suggestions.iter().map(|s| s.symbol.as_str()).collect();

    assert_eq!(symbols, vec!["AAPL", "NVDA", "MSFT", "GOOG", "META", "AAPL"]);
    assert_eq!(suggestions[5].description, "APPLE INC");
}

// ═══════════════════════════════════════════════════════════════════
// Session lifecycle
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn closed_session_rejects_operations() {
    let (session, backend) = seeded_session(Settings::default()).await;
    session.close();

    let err = session
        .add_holding(HoldingInput::new("Meta", "META", 1.0, 1.0, 1.0))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::SessionClosed));
    assert!(matches!(session.refresh().await, Err(CoreError::SessionClosed)));
    assert_eq!(backend.len(), 4);

    // The last snapshot stays readable
    assert_eq!(session.stock_count(), 4);
}

#[test]
fn new_validates_settings() {
    let settings = Settings {
        backend_url: String::new(),
        ..Settings::default()
    };
    let err = PortfolioSession::new(settings).unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}

#[test]
fn new_with_default_settings() {
    let session = PortfolioSession::new(Settings::default().with_api_key("finnhub", "k")).unwrap();
    let debug = format!("{session:?}");
    assert!(debug.contains("PortfolioSession"));
    assert!(debug.contains("Finnhub"));
    assert_eq!(session.stock_count(), 0);
}

// ═══════════════════════════════════════════════════════════════════
// In-memory backend
// ═══════════════════════════════════════════════════════════════════

mod in_memory_backend {
    use super::*;

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let backend = InMemoryStockBackend::new();
        let input = HoldingInput::new("Apple", "AAPL", 1.0, 1.0, 1.0);
        let a = backend.create(&input).await.unwrap();
        let b = backend.create(&input).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.last_updated.is_some());
        assert_eq!(backend.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let backend = InMemoryStockBackend::new();
        let input = HoldingInput::new("Apple", "AAPL", 1.0, 1.0, 1.0);
        assert!(matches!(backend.get("nope").await, Err(CoreError::NotFound(_))));
        assert!(matches!(
            backend.update("nope", &input).await,
            Err(CoreError::NotFound(_))
        ));
        assert!(matches!(backend.delete("nope").await, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn with_holdings_keeps_order() {
        let seed = vec![
            Holding::from_input("b", HoldingInput::new("B", "B", 1.0, 1.0, 1.0)),
            Holding::from_input("a", HoldingInput::new("A", "A", 1.0, 1.0, 1.0)),
        ];
        let backend = InMemoryStockBackend::with_holdings(seed);
        let ids: Vec<String> = backend.list().await.unwrap().into_iter().map(|h| h.id).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(backend.get("a").await.unwrap().ticker, "A");
    }
}
