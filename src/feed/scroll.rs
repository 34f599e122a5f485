//! Scroll-triggered fetching, abstracted away from any display surface.
//!
//! The presentation layer owns a sentinel boundary (an off-screen marker
//! whose visibility signals "load more"). The core only needs the capability
//! "notify me when the boundary becomes visible", expressed as
//! [`SentinelObserver`], so the trigger logic is testable without a real
//! display surface.

use crate::feed::controller::FeedEvent;
use tokio::sync::mpsc;

/// Callback invoked on each visibility crossing of the sentinel.
pub type VisibilityHandler = Box<dyn FnMut() + Send>;

/// Capability interface for observing a sentinel boundary.
///
/// Implementations wrap whatever the display surface provides (an
/// IntersectionObserver binding, a scroll-offset watcher, a test fake). The
/// signal is edge-triggered: `on_visible` fires when the boundary *becomes*
/// visible, not continuously while it stays visible.
pub trait SentinelObserver: Send {
    /// Start observing; replaces any previously attached handler.
    fn attach(&mut self, on_visible: VisibilityHandler);

    /// Stop observing and drop the handler. Must be idempotent.
    fn detach(&mut self);
}

/// Binds a sentinel observer to the feed controller's event channel.
///
/// Each visibility crossing emits [`FeedEvent::LoadMoreRequested`]; the
/// controller's own in-flight/`has_more` guards make repeated signals safe.
/// Detaches the observer on drop so a torn-down consumer is never invoked.
pub struct ScrollTrigger<O: SentinelObserver> {
    observer: O,
    event_tx: mpsc::Sender<FeedEvent>,
}

impl<O: SentinelObserver> ScrollTrigger<O> {
    pub fn new(observer: O, event_tx: mpsc::Sender<FeedEvent>) -> Self {
        let mut trigger = Self { observer, event_tx };
        trigger.bind();
        trigger
    }

    /// Re-attach the observation against a new event channel.
    ///
    /// Required whenever the sentinel or the consumer's channel identity
    /// changes; the stale handler is dropped first.
    pub fn rebind(&mut self, event_tx: mpsc::Sender<FeedEvent>) {
        self.observer.detach();
        self.event_tx = event_tx;
        self.bind();
    }

    fn bind(&mut self) {
        let tx = self.event_tx.clone();
        self.observer.attach(Box::new(move || {
            // try_send: the handler is synchronous, and a full channel means
            // a burst of signals the pagination guard would drop anyway
            match tx.try_send(FeedEvent::LoadMoreRequested) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    tracing::debug!("Load-more signal dropped (event channel full)");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    tracing::debug!("Load-more signal dropped (consumer detached)");
                }
            }
        }));
    }
}

impl<O: SentinelObserver> Drop for ScrollTrigger<O> {
    fn drop(&mut self) {
        self.observer.detach();
    }
}
