//! Fan-out event bus with one unbounded queue per subscriber.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tracing::trace;

/// Receiving end of a bus subscription. Dropping it unsubscribes.
pub type Subscription<E> = mpsc::UnboundedReceiver<E>;

/// Multi-producer, multi-consumer bus for a single event type.
///
/// Cloning the bus yields another handle to the same subscriber list. Every
/// subscriber receives every event emitted after it subscribed, in order.
/// Queues are unbounded so a slow subscriber never loses a signal.
pub struct EventBus<E> {
    subscribers: Arc<Mutex<Vec<mpsc::UnboundedSender<E>>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            subscribers: Arc::clone(&self.subscribers),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl<E> fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.slots().len())
            .finish()
    }
}

impl<E> EventBus<E>
where
    E: Clone + fmt::Debug + Send + 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new subscriber.
    pub fn subscribe(&self) -> Subscription<E> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.slots().push(tx);
        rx
    }

    /// Publishes an event. Returns the number of subscribers it reached.
    ///
    /// Subscribers whose receiver was dropped are pruned here.
    pub fn emit(&self, event: E) -> usize {
        let mut subscribers = self.slots();
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
        let reached = subscribers.len();
        if reached == 0 {
            trace!(?event, "no subscribers for bus event");
        }
        reached
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.slots();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

impl<E> EventBus<E> {
    fn slots(&self) -> MutexGuard<'_, Vec<mpsc::UnboundedSender<E>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
