use super::state::StoreEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Listener = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

#[derive(Default)]
struct FeedInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

/// Publish/subscribe hub for committed state changes.
///
/// Listeners run on the main queue, after the mutation that produced the
/// event has been applied, in subscription order.
#[derive(Default, Clone)]
pub struct ChangeFeed {
    inner: Arc<FeedInner>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `listener`. It stays registered until the returned
    /// [`Subscription`] is unsubscribed or dropped.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            id,
            feed: Arc::downgrade(&self.inner),
        }
    }

    pub fn publish(&self, event: &StoreEvent) {
        // Snapshot first so a listener may subscribe or unsubscribe re-entrantly.
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Handle returned by [`ChangeFeed::subscribe`].
pub struct Subscription {
    id: u64,
    feed: Weak<FeedInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(feed) = self.feed.upgrade() {
            feed.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::PaymentId;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_publish_reaches_subscribers() {
        let feed = ChangeFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let _sub = feed.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        feed.publish(&StoreEvent::PaymentAdded(PaymentId::new()));
        feed.publish(&StoreEvent::PaymentAdded(PaymentId::new()));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let feed = ChangeFeed::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&hits);
        let sub = feed.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(feed.subscriber_count(), 1);

        sub.unsubscribe();
        assert_eq!(feed.subscriber_count(), 0);

        feed.publish(&StoreEvent::PaymentAdded(PaymentId::new()));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_subscription_outliving_feed() {
        let feed = ChangeFeed::new();
        let sub = feed.subscribe(|_| {});
        drop(feed);
        sub.unsubscribe();
    }
}
