//! One-shot completion gate
//!
//! Bridges the capture engine's finalization callback to the future returned
//! by `stop()`. The engine's notification is not awaitable by construction,
//! and it may fire before or after the session starts waiting; this gate
//! tolerates both orders and completes at most once.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// A complete-once signal.
///
/// `complete` is idempotent; `wait` returns promptly whether it is called
/// before or after completion.
#[derive(Debug, Default)]
pub struct CompletionGate {
    done: AtomicBool,
    notify: Notify,
}

impl CompletionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Open the gate. Only the first call wakes waiters.
    pub fn complete(&self) {
        if !self.done.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
        }
    }

    /// Wait until the gate is open.
    pub async fn wait(&self) {
        loop {
            // Register interest before re-checking the flag, so a completion
            // landing in between cannot be missed.
            let notified = self.notify.notified();
            if self.is_complete() {
                return;
            }
            notified.await;
        }
    }
}
