//! # Request Discipline
//!
//! Two small tools that keep network results from landing where they no
//! longer belong.
//!
//! ## ActionGuard
//! ```text
//! click "Place order" ──► try_begin("place_order") ──► permit ──► request
//! click again         ──► try_begin("place_order") ──► RequestInFlight
//! response arrives    ──► permit dropped ──► next click allowed
//! ```
//!
//! ## RequestScope
//! ```text
//! view opens   ──► RequestScope::new()
//! scope.run(fetch_order(42)) ─┐
//! view closes  ──► cancel() ──┼──► run() returns Cancelled, the late
//!                             │    response is dropped unread
//! ```

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::debug;

use crate::error::{ClientError, ClientResult};

// =============================================================================
// Action Guard
// =============================================================================

/// Tracks which user actions are waiting for a response.
#[derive(Debug, Clone, Default)]
pub struct ActionGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl ActionGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Marks `action` as in flight. Fails if it already is.
    pub fn try_begin(&self, action: impl Into<String>) -> ClientResult<ActionPermit> {
        let action = action.into();
        if !self.lock().insert(action.clone()) {
            debug!(action = %action, "Duplicate action suppressed");
            return Err(ClientError::RequestInFlight(action));
        }
        Ok(ActionPermit {
            guard: self.clone(),
            action,
        })
    }

    pub fn is_in_flight(&self, action: &str) -> bool {
        self.lock().contains(action)
    }
}

/// Held for the duration of one action. Dropping it ends the action.
#[derive(Debug)]
pub struct ActionPermit {
    guard: ActionGuard,
    action: String,
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        self.guard.lock().remove(&self.action);
    }
}

// =============================================================================
// Request Scope
// =============================================================================

/// Cancellation signal tied to the lifetime of a view.
///
/// Clones share the signal: cancelling any clone cancels them all.
#[derive(Debug, Clone)]
pub struct RequestScope {
    cancel_tx: Arc<watch::Sender<bool>>,
    cancel_rx: watch::Receiver<bool>,
}

impl Default for RequestScope {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestScope {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        RequestScope {
            cancel_tx: Arc::new(tx),
            cancel_rx: rx,
        }
    }

    /// Cancels every request running in this scope, now and later.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_rx.borrow()
    }

    /// Runs `request` unless the scope is cancelled first.
    ///
    /// A result that arrives after cancellation is discarded and
    /// `ClientError::Cancelled` is returned instead.
    pub async fn run<F, T>(&self, request: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        if self.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let mut cancel_rx = self.cancel_rx.clone();
        tokio::select! {
            biased;
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => {
                debug!("Request dropped after scope cancellation");
                Err(ClientError::Cancelled)
            }
            result = request => {
                if self.is_cancelled() {
                    Err(ClientError::Cancelled)
                } else {
                    result
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_guard_blocks_duplicate_until_dropped() {
        let guard = ActionGuard::new();

        let permit = guard.try_begin("place_order").unwrap();
        assert!(guard.is_in_flight("place_order"));
        assert!(matches!(
            guard.try_begin("place_order"),
            Err(ClientError::RequestInFlight(action)) if action == "place_order"
        ));

        // Different actions are independent
        let other = guard.try_begin("pay:42").unwrap();

        drop(permit);
        assert!(!guard.is_in_flight("place_order"));
        assert!(guard.try_begin("place_order").is_ok());
        drop(other);
    }

    #[test]
    fn test_guard_clones_share_state() {
        let guard = ActionGuard::new();
        let clone = guard.clone();
        let _permit = guard.try_begin("update_status:7").unwrap();
        assert!(clone.try_begin("update_status:7").is_err());
    }

    #[tokio::test]
    async fn test_scope_passes_result_through() {
        let scope = RequestScope::new();
        let value = scope.run(async { Ok::<_, ClientError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_scope_never_runs() {
        let scope = RequestScope::new();
        scope.cancel();
        let result = scope.run(async { Ok::<_, ClientError>(7) }).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancel_during_request_discards_result() {
        let scope = RequestScope::new();
        let canceller = scope.clone();

        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, ClientError>("late response")
        };

        let (result, ()) = tokio::join!(scope.run(slow), async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        assert!(matches!(result, Err(ClientError::Cancelled)));
    }
}
