//! Signal persistence trait and an in-memory store.

use std::collections::BTreeMap;
use std::sync::Mutex;

use thiserror::Error;

use crate::domain::{Signal, SignalId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("signal {0} not found")]
    NotFound(SignalId),

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Durable home of signals. Each `save` is expected to be atomic.
pub trait SignalStore: Send + Sync {
    fn save(&self, signal: &Signal) -> Result<(), StoreError>;

    fn load(&self, id: SignalId) -> Result<Signal, StoreError>;

    /// All signals ordered by id.
    fn all(&self) -> Result<Vec<Signal>, StoreError>;
}

/// Store backed by a map in memory.
#[derive(Debug, Default)]
pub struct MemorySignalStore {
    signals: Mutex<BTreeMap<SignalId, Signal>>,
    saves: Mutex<usize>,
}

impl MemorySignalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_signals(signals: impl IntoIterator<Item = Signal>) -> Self {
        let store = Self::new();
        {
            let mut map = store.lock_signals();
            for signal in signals {
                map.insert(signal.id, signal);
            }
        }
        store
    }

    /// Number of `save` calls so far.
    pub fn save_count(&self) -> usize {
        *self.saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_signals(&self) -> std::sync::MutexGuard<'_, BTreeMap<SignalId, Signal>> {
        self.signals
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl SignalStore for MemorySignalStore {
    fn save(&self, signal: &Signal) -> Result<(), StoreError> {
        self.lock_signals().insert(signal.id, signal.clone());
        *self.saves.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) += 1;
        Ok(())
    }

    fn load(&self, id: SignalId) -> Result<Signal, StoreError> {
        self.lock_signals()
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn all(&self) -> Result<Vec<Signal>, StoreError> {
        Ok(self.lock_signals().values().cloned().collect())
    }
}
