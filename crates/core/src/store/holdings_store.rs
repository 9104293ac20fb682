use log::{debug, warn};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::Mutex;

use crate::backend::traits::StockBackend;
use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingInput};

pub const FETCH_FAILED: &str = "Failed to fetch stocks";
pub const ADD_FAILED: &str = "Failed to add stock";
pub const UPDATE_FAILED: &str = "Failed to update stock";
pub const DELETE_FAILED: &str = "Failed to delete stock";

/// Snapshot plus UI-facing flags, replaced/updated under one short lock.
#[derive(Debug, Clone, Default)]
struct StoreState {
    holdings: Arc<Vec<Holding>>,
    /// Operations entered but not yet finished (waiting on the gate included).
    pending: usize,
    last_error: Option<String>,
    selected_for_edit: Option<Holding>,
    show_form: bool,
}

/// Owns the holdings snapshot for one session.
///
/// Every mutation is two explicit phases: **mutate** (one backend call) then
/// **reload** (full list fetch that replaces the snapshot wholesale). The
/// reload starts only after the mutate call succeeded. If the mutate phase
/// fails, the backend error is returned, `last_error` carries the operation's
/// message and no reload happens. If the reload phase fails, the change is
/// already committed on the backend, `CoreError::Reload` is returned and the
/// snapshot stays at its last known-good state.
///
/// Operations on one store are single-flight: a mutation or refresh waits for
/// the previous one to finish, so overlapping calls run in issue order.
/// Readers never wait; they see the last completed snapshot.
///
/// After [`close`](Self::close), in-flight operations still finish their
/// network calls but their results are discarded, and new operations fail
/// with `CoreError::SessionClosed`.
pub struct HoldingsStore {
    backend: Arc<dyn StockBackend>,
    state: RwLock<StoreState>,
    gate: Mutex<()>,
    closed: AtomicBool,
}

impl std::fmt::Debug for HoldingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("HoldingsStore")
            .field("backend", &self.backend.name())
            .field("holdings", &state.holdings.len())
            .field("pending", &state.pending)
            .field("last_error", &state.last_error)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl HoldingsStore {
    /// Create an empty store for a new session. Call [`refresh`](Self::refresh)
    /// to load the backend's holdings.
    pub fn new(backend: Arc<dyn StockBackend>) -> Self {
        Self {
            backend,
            state: RwLock::new(StoreState::default()),
            gate: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// The current snapshot. Cheap to clone and never changes under the caller.
    #[must_use]
    pub fn holdings(&self) -> Arc<Vec<Holding>> {
        Arc::clone(&self.read().holdings)
    }

    /// Look up a holding in the current snapshot.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<Holding> {
        self.read().holdings.iter().find(|h| h.id == id).cloned()
    }

    /// `true` while any operation is pending.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.read().pending > 0
    }

    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.read().last_error.clone()
    }

    #[must_use]
    pub fn selected_for_edit(&self) -> Option<Holding> {
        self.read().selected_for_edit.clone()
    }

    #[must_use]
    pub fn show_form(&self) -> bool {
        self.read().show_form
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    // ── Local transitions (no I/O) ──────────────────────────────────

    /// Choose the holding the form edits. Selecting a holding opens the form.
    pub fn select_for_edit(&self, holding: Option<Holding>) {
        let mut state = self.write();
        if holding.is_some() {
            state.show_form = true;
        }
        state.selected_for_edit = holding;
    }

    pub fn set_show_form(&self, show: bool) {
        self.write().show_form = show;
    }

    /// Close the form and drop the selection.
    pub fn close_form(&self) {
        let mut state = self.write();
        state.show_form = false;
        state.selected_for_edit = None;
    }

    /// End the session. Results of in-flight operations are discarded.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        debug!("Holdings store closed");
    }

    // ── Backend operations ──────────────────────────────────────────

    /// Fetch the full list and replace the snapshot.
    ///
    /// On failure the snapshot is unchanged and `last_error` is set.
    pub async fn refresh(&self) -> Result<(), CoreError> {
        self.ensure_open()?;
        let _pending = self.begin();
        let _gate = self.gate.lock().await;
        self.reload().await
    }

    /// Fetch one record straight from the backend. The snapshot is not touched.
    pub async fn get(&self, id: &str) -> Result<Holding, CoreError> {
        self.ensure_open()?;
        self.backend.get(id).await
    }

    /// Validate, create on the backend, then reload.
    /// Returns the record as the backend created it.
    pub async fn create(&self, input: HoldingInput) -> Result<Holding, CoreError> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_open()?;
        let _pending = self.begin();
        let _gate = self.gate.lock().await;

        let created = self.mutate(ADD_FAILED, self.backend.create(&input)).await?;
        debug!("Created {} ({})", created.ticker, created.id);
        self.reload_after_mutation().await?;
        Ok(created)
    }

    /// Validate, replace the record `id` on the backend, then reload.
    /// An unknown id comes back from the backend as `CoreError::NotFound`.
    pub async fn edit(&self, id: &str, input: HoldingInput) -> Result<Holding, CoreError> {
        let input = input.normalized();
        input.validate()?;
        self.ensure_open()?;
        let _pending = self.begin();
        let _gate = self.gate.lock().await;

        let updated = self.mutate(UPDATE_FAILED, self.backend.update(id, &input)).await?;
        debug!("Updated {} ({id})", updated.ticker);
        self.reload_after_mutation().await?;
        Ok(updated)
    }

    /// Delete the record `id` on the backend, then reload.
    /// An unknown id is a backend error, not a local no-op.
    pub async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.ensure_open()?;
        let _pending = self.begin();
        let _gate = self.gate.lock().await;

        self.mutate(DELETE_FAILED, self.backend.delete(id)).await?;
        debug!("Deleted {id}");
        self.reload_after_mutation().await
    }

    /// Submit the form: edit the selected holding, or create when nothing is
    /// selected. On success the form closes and the selection clears.
    pub async fn submit_form(&self, input: HoldingInput) -> Result<Holding, CoreError> {
        let selected = self.selected_for_edit();
        let saved = match selected {
            Some(holding) => self.edit(&holding.id, input).await?,
            None => self.create(input).await?,
        };
        self.close_form();
        Ok(saved)
    }

    // ── Internal ────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), CoreError> {
        if self.is_closed() {
            return Err(CoreError::SessionClosed);
        }
        Ok(())
    }

    /// Enter the pending state; it is left when the returned guard drops.
    fn begin(&self) -> PendingGuard<'_> {
        let mut state = self.write();
        state.pending += 1;
        state.last_error = None;
        PendingGuard { store: self }
    }

    /// Run the mutate phase, recording `message` in `last_error` on failure.
    async fn mutate<T>(
        &self,
        message: &str,
        call: impl Future<Output = Result<T, CoreError>>,
    ) -> Result<T, CoreError> {
        match call.await {
            Ok(value) => {
                self.ensure_open()?;
                Ok(value)
            }
            Err(e) => {
                warn!("{message}: {e}");
                self.ensure_open()?;
                self.write().last_error = Some(message.to_string());
                Err(e)
            }
        }
    }

    async fn reload_after_mutation(&self) -> Result<(), CoreError> {
        match self.reload().await {
            Err(CoreError::SessionClosed) => Err(CoreError::SessionClosed),
            Err(e) => Err(CoreError::Reload(e.to_string())),
            Ok(()) => Ok(()),
        }
    }

    /// Fetch the full list and swap it in. Records without an id are dropped.
    async fn reload(&self) -> Result<(), CoreError> {
        let fetched = self.backend.list().await;
        self.ensure_open()?;

        match fetched {
            Ok(list) => {
                let total = list.len();
                let holdings: Vec<Holding> = list.into_iter().filter(|h| !h.id.is_empty()).collect();
                if holdings.len() != total {
                    warn!(
                        "Dropped {} record(s) without an id from {}",
                        total - holdings.len(),
                        self.backend.name()
                    );
                }
                debug!("Loaded {} holding(s)", holdings.len());
                self.write().holdings = Arc::new(holdings);
                Ok(())
            }
            Err(e) => {
                warn!("{FETCH_FAILED}: {e}");
                self.write().last_error = Some(FETCH_FAILED.to_string());
                Err(e)
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        // Writers never panic mid-update; recover the guard rather than poison readers.
        self.state.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Leaves the pending state on drop, including on early `?` returns and
/// when the operation's future is dropped.
struct PendingGuard<'a> {
    store: &'a HoldingsStore,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.store.write();
        state.pending = state.pending.saturating_sub(1);
    }
}
