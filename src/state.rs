//! Application state shared across handlers.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::selection::SelectionOrchestrator;
use crate::store::MistakeStore;

/// The mistake store, shared between handlers and the orchestrator
pub type SharedStore = Arc<Mutex<MistakeStore>>;

/// Application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    /// Shared mistake store (attempt ledger, aggregates, exposure)
    pub store: SharedStore,

    /// The selection pipeline
    pub orchestrator: Arc<SelectionOrchestrator>,
}

impl AppState {
    pub fn new(store: SharedStore, orchestrator: Arc<SelectionOrchestrator>) -> Self {
        Self {
            store,
            orchestrator,
        }
    }
}

/// Error returned when the store lock cannot be acquired
#[derive(Debug)]
pub struct StoreLockError;

impl std::fmt::Display for StoreLockError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Mistake store unavailable")
    }
}

impl std::error::Error for StoreLockError {}

/// Try to acquire the store lock, returning an error if poisoned
pub fn try_lock_store(
    store: &SharedStore,
) -> Result<MutexGuard<'_, MistakeStore>, StoreLockError> {
    store.lock().map_err(|_: PoisonError<_>| {
        tracing::error!("Mistake store mutex poisoned - a thread panicked while holding the lock");
        StoreLockError
    })
}
