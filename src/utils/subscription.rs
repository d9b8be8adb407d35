//! Capability-scoped subscriptions.
//!
//! A [`Publisher`] hands out [`Subscription`]s. Values are delivered to a subscription for as
//! long as it is alive; dropping it or calling [`Subscription::unsubscribe`] removes it from the
//! publisher so nothing is delivered afterwards.
//!
//! Publishing never blocks. When a subscriber has not consumed its previous value yet the new
//! value is dropped for that subscriber, which coalesces bursts into a single notification.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// Default number of undelivered values a subscription can hold
pub const DEFAULT_CAPACITY: usize = 1;

struct Registry<T> {
    next_id: u64,
    subscribers: HashMap<u64, mpsc::Sender<T>>,
}

/// Sending side of a subscription registry
pub struct Publisher<T> {
    registry: Arc<Mutex<Registry<T>>>,
}

impl<T> Clone for Publisher<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for Publisher<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Publisher<T> {
    /// Create a publisher with no subscribers
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                subscribers: HashMap::new(),
            })),
        }
    }

    /// Register a new subscriber holding at most `capacity` undelivered values
    pub fn subscribe_with_capacity(&self, capacity: usize) -> Subscription<T> {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.subscribers.insert(id, tx);

        Subscription {
            id,
            rx,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Register a new subscriber with the default capacity
    pub fn subscribe(&self) -> Subscription<T> {
        self.subscribe_with_capacity(DEFAULT_CAPACITY)
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        lock(&self.registry).subscribers.len()
    }
}

impl<T: Clone> Publisher<T> {
    /// Deliver `value` to every subscriber with room for it. Returns how many received it.
    pub fn publish(&self, value: T) -> usize {
        let mut registry = lock(&self.registry);
        let mut delivered = 0;
        let mut closed = Vec::new();

        for (id, tx) in &registry.subscribers {
            match tx.try_send(value.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {}
                Err(TrySendError::Closed(_)) => closed.push(*id),
            }
        }

        for id in closed {
            registry.subscribers.remove(&id);
        }

        delivered
    }
}

/// Receiving side of a subscription. Delivery stops when this is dropped.
pub struct Subscription<T> {
    id: u64,
    rx: mpsc::Receiver<T>,
    registry: Weak<Mutex<Registry<T>>>,
}

impl<T> Subscription<T> {
    /// Wait for the next value. `None` once the publisher is gone.
    pub async fn recv(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    /// Take a pending value without waiting
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }

    /// Discard every pending value
    pub fn drain(&mut self) -> usize {
        let mut discarded = 0;
        while self.rx.try_recv().is_ok() {
            discarded += 1;
        }
        discarded
    }

    /// Stop delivery explicitly
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry).subscribers.remove(&self.id);
        }
    }
}

fn lock<T>(registry: &Mutex<Registry<T>>) -> std::sync::MutexGuard<'_, Registry<T>> {
    // A panic while holding the lock cannot leave the map half-updated
    registry.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_every_subscriber() {
        let publisher = Publisher::new();
        let mut first = publisher.subscribe();
        let mut second = publisher.subscribe();

        assert_eq!(publisher.publish(7u32), 2);
        assert_eq!(first.recv().await, Some(7));
        assert_eq!(second.recv().await, Some(7));
    }

    #[tokio::test]
    async fn test_unsubscribe_stops_delivery() {
        let publisher = Publisher::new();
        let kept = publisher.subscribe();
        let dropped = publisher.subscribe();
        assert_eq!(publisher.subscriber_count(), 2);

        dropped.unsubscribe();
        assert_eq!(publisher.subscriber_count(), 1);
        assert_eq!(publisher.publish(()), 1);

        drop(kept);
        assert_eq!(publisher.subscriber_count(), 0);
        assert_eq!(publisher.publish(()), 0);
    }

    #[tokio::test]
    async fn test_bursts_are_coalesced() {
        let publisher = Publisher::new();
        let mut subscription = publisher.subscribe();

        assert_eq!(publisher.publish("a"), 1);
        assert_eq!(publisher.publish("b"), 0);
        assert_eq!(publisher.publish("c"), 0);

        assert_eq!(subscription.recv().await, Some("a"));
        assert_eq!(subscription.try_recv(), None);
    }

    #[tokio::test]
    async fn test_recv_ends_when_publisher_dropped() {
        let publisher = Publisher::<u8>::new();
        let mut subscription = publisher.subscribe_with_capacity(4);
        publisher.publish(1);
        publisher.publish(2);
        drop(publisher);

        assert_eq!(subscription.drain(), 2);
        assert_eq!(subscription.recv().await, None);
    }
}
