pub mod holding;
pub mod market;
pub mod metrics;
pub mod settings;
