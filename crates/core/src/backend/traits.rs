use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingInput};

/// Persistence backend for holdings: a collection resource keyed by an opaque
/// string id.
///
/// The store only ever talks to this trait, so the HTTP client can be swapped
/// for the in-memory backend (tests, offline use) or any other implementation.
/// Not-found must be reported as `CoreError::NotFound`.
#[async_trait]
pub trait StockBackend: Send + Sync {
    /// Human-readable name of this backend (for logs/errors).
    fn name(&self) -> &str;

    /// `GET /stocks`: every holding the backend knows.
    async fn list(&self) -> Result<Vec<Holding>, CoreError>;

    /// `GET /stocks/{id}`
    async fn get(&self, id: &str) -> Result<Holding, CoreError>;

    /// `POST /stocks`: returns the created record with its assigned id.
    async fn create(&self, input: &HoldingInput) -> Result<Holding, CoreError>;

    /// `PUT /stocks/{id}`: full-record replacement.
    async fn update(&self, id: &str, input: &HoldingInput) -> Result<Holding, CoreError>;

    /// `DELETE /stocks/{id}`
    async fn delete(&self, id: &str) -> Result<(), CoreError>;
}
