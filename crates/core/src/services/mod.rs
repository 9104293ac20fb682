pub mod lookup_service;
pub mod metrics_service;
