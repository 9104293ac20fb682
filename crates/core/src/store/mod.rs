pub mod holdings_store;
