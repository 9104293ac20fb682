use async_trait::async_trait;
use chrono::Utc;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use super::traits::StockBackend;
use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingInput};

/// In-process backend holding records in memory.
///
/// Behaves like the REST backend: assigns a fresh UUID on create, stamps
/// `last_updated` on every write, and reports unknown ids as `NotFound`.
/// Useful offline and as a test double.
#[derive(Debug, Default)]
pub struct InMemoryStockBackend {
    records: Mutex<Vec<Holding>>,
}

impl InMemoryStockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing records (kept in the given order).
    pub fn with_holdings(holdings: Vec<Holding>) -> Self {
        Self {
            records: Mutex::new(holdings),
        }
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Holding>> {
        // A panic while holding the lock cannot leave a half-written record:
        // every write is a single push/assign/remove.
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StockBackend for InMemoryStockBackend {
    fn name(&self) -> &str {
        "In-memory"
    }

    async fn list(&self) -> Result<Vec<Holding>, CoreError> {
        Ok(self.lock().clone())
    }

    async fn get(&self, id: &str) -> Result<Holding, CoreError> {
        self.lock()
            .iter()
            .find(|h| h.id == id)
            .cloned()
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    async fn create(&self, input: &HoldingInput) -> Result<Holding, CoreError> {
        let holding = Holding::from_input(Uuid::new_v4().to_string(), input.clone())
            .with_last_updated(Utc::now());
        self.lock().push(holding.clone());
        Ok(holding)
    }

    async fn update(&self, id: &str, input: &HoldingInput) -> Result<Holding, CoreError> {
        let mut records = self.lock();
        let slot = records
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        *slot = Holding::from_input(id, input.clone()).with_last_updated(Utc::now());
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        let mut records = self.lock();
        let idx = records
            .iter()
            .position(|h| h.id == id)
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;
        records.remove(idx);
        Ok(())
    }
}
