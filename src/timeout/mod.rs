//! Deadline enforcement for in-flight operations.
//!
//! The supervisor keeps one watcher per registered operation. If the
//! deadline elapses first the operation is aborted; the bookkeeping entry
//! is only removed once the abort surfaces as the operation's own
//! completion, which the transport contract delivers exactly once. If the
//! operation finishes or is dropped first, the watcher simply cancels the
//! timer. Removal is a no-op when the entry is already gone, so a
//! transport that misbehaves and completes twice cannot corrupt the map.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::transport::{Operation, OperationId};

/// Bookkeeping for one watched operation.
#[derive(Debug)]
struct TrackedOperation {
    _watcher: JoinHandle<()>,
}

/// Aborts any registered operation that exceeds a fixed deadline.
///
/// The timeout duration is set at construction and applies uniformly to
/// every registered operation.
#[derive(Debug)]
pub struct TimeoutSupervisor {
    timeout: Duration,
    entries: Mutex<HashMap<OperationId, TrackedOperation>>,
}

impl TimeoutSupervisor {
    /// Create a supervisor enforcing `timeout` on registered operations.
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The deadline applied to every registered operation.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of operations currently being watched.
    pub fn watched(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Start watching `operation`. Idempotent: registering an operation
    /// that is already watched is a no-op.
    pub fn register(self: &Arc<Self>, operation: &Operation) {
        let id = operation.id();
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if entries.contains_key(&id) {
            return;
        }

        let abort = operation.abort_handle();
        let done = operation.completion();
        let timeout = self.timeout;
        let supervisor = Arc::clone(self);

        let watcher = tokio::spawn(async move {
            tokio::select! {
                () = tokio::time::sleep(timeout) => {
                    tracing::debug!(
                        target: "reqguard::timeout",
                        operation = %id,
                        timeout_ms = timeout.as_millis() as u64,
                        "deadline exceeded, aborting operation"
                    );
                    abort.abort();
                    // The entry stays until the abort comes back around as
                    // the operation's finished/destroyed notification.
                    done.wait().await;
                }
                () = done.wait() => {}
            }
            supervisor.remove(id);
        });

        entries.insert(id, TrackedOperation { _watcher: watcher });
    }

    fn remove(&self, id: OperationId) {
        // No-op if the entry is already gone.
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}
