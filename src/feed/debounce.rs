//! Single-slot cancellable timer for debounced search.
//!
//! At most one timer is live at a time. Cancellation is unconditional and
//! happens before every reschedule and on teardown, so a timer can never fire
//! after the consumer stopped listening — the only entity in the core with an
//! explicit cancellation handle.

use crate::feed::controller::FeedEvent;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Owns the pending search timer and the quiet period.
#[derive(Debug)]
pub struct DebouncedSearch {
    quiet_period: Duration,
    timer: Option<JoinHandle<()>>,
    event_tx: mpsc::Sender<FeedEvent>,
}

impl DebouncedSearch {
    pub fn new(event_tx: mpsc::Sender<FeedEvent>, quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            timer: None,
            event_tx,
        }
    }

    /// Schedule a search for `text` after the quiet period.
    ///
    /// Any pending timer is cancelled first; only the most recently scheduled
    /// timer may ever fire. When it does, it emits
    /// [`FeedEvent::SearchReady`] on the controller's event channel.
    pub fn schedule(&mut self, text: String) {
        self.cancel();

        let tx = self.event_tx.clone();
        let quiet_period = self.quiet_period;
        let quiet_ms = quiet_period.as_millis() as u64;
        tracing::debug!(query = %text, quiet_ms, "Scheduling debounced search");

        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;
            if let Err(e) = tx.send(FeedEvent::SearchReady { text }).await {
                // Receiver dropped during teardown; nothing left to notify
                tracing::debug!(error = %e, "Debounce fired after consumer detached");
            }
        }));
    }

    /// Cancel any pending timer. Safe to call when none is pending.
    pub fn cancel(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
            tracing::debug!("Cancelled pending search timer");
        }
    }

    /// Whether a timer is currently scheduled (it may have already fired).
    #[cfg(test)]
    fn is_scheduled(&self) -> bool {
        self.timer.is_some()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel();
    }
}
