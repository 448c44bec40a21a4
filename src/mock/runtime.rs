use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::constants::MOCK_STATE_KEY;
use crate::storage::KvStore;

use super::state::IsolatedMockState;

/// Persisted offline state machine.
///
/// The snapshot is the only state: each call reads it, optionally
/// transforms it, and writes it back. `update` serializes writers through
/// an in-process mutex so two overlapping reducers cannot silently drop
/// each other's effect; `load` stays lock-free.
pub struct MockRuntime {
    kv: Arc<dyn KvStore>,
    write_lock: Mutex<()>,
}

impl MockRuntime {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv, write_lock: Mutex::new(()) }
    }

    /// Read the snapshot. Never fails: malformed or missing persisted data
    /// normalizes field-by-field into defaults.
    pub async fn load(&self) -> IsolatedMockState {
        let raw = self.kv.get(MOCK_STATE_KEY).await;
        IsolatedMockState::from_persisted(raw.as_deref())
    }

    /// Apply a pure reducer to the snapshot and persist the result.
    ///
    /// Returns the freshly reloaded, persisted copy rather than the
    /// reducer's in-memory value, so a reducer returning a shape that only
    /// appears valid in memory cannot leak out.
    pub async fn update<F>(&self, reducer: F) -> IsolatedMockState
    where
        F: FnOnce(IsolatedMockState) -> IsolatedMockState,
    {
        let _guard = self.write_lock.lock().await;

        let state = self.load().await;
        let mut next = reducer(state).sanitized();
        next.updated_at = Utc::now();

        match serde_json::to_string(&next) {
            Ok(serialized) => {
                self.kv.set(MOCK_STATE_KEY, &serialized).await;
                debug!(bytes = serialized.len(), "mock snapshot persisted");
            }
            // Persistence is best-effort by design; the reloaded state
            // simply won't carry this update.
            Err(e) => warn!(error = %e, "mock snapshot serialization failed"),
        }

        self.load().await
    }

    /// Drop the persisted snapshot, returning the runtime to first-run
    /// defaults.
    pub async fn reset(&self) {
        self.kv.remove(MOCK_STATE_KEY).await;
        debug!("mock snapshot cleared");
    }
}
