//! Synchronous fan-out bus

use crate::event::{BusEvent, Topic};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

type Handler = dyn Fn(&BusEvent) -> anyhow::Result<()> + Send + Sync;

struct Entry {
    id: u64,
    handler: Arc<Handler>,
}

#[derive(Default)]
struct Registry {
    by_topic: HashMap<Topic, Vec<Entry>>,
}

/// In-process notification bus
///
/// # Delivery contract
/// - Synchronous: `publish` returns after every handler has run
/// - Subscription order within a topic
/// - Best-effort: a handler returning `Err` is logged and skipped, later
///   handlers still run
/// - Reentrant: handlers may publish and subscribe; the handler list is
///   snapshotted before invocation
#[derive(Default)]
pub struct NotificationBus {
    registry: Mutex<Registry>,
    next_id: AtomicU64,
}

impl NotificationBus {
    /// Create an empty bus
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for events on `topic`
    ///
    /// The returned [`Subscription`] unsubscribes on drop; keep it alive for
    /// as long as the handler should receive events.
    #[must_use]
    pub fn subscribe(
        self: &Arc<Self>,
        topic: Topic,
        handler: impl Fn(&BusEvent) -> anyhow::Result<()> + Send + Sync + 'static,
    ) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.registry
            .lock()
            .by_topic
            .entry(topic)
            .or_default()
            .push(Entry {
                id,
                handler: Arc::new(handler),
            });
        Subscription {
            bus: Arc::downgrade(self),
            topic,
            id,
        }
    }

    /// Deliver `event` to every subscriber of its topic, in subscription order
    pub fn publish(&self, event: &BusEvent) {
        let handlers: Vec<Arc<Handler>> = {
            let registry = self.registry.lock();
            registry
                .by_topic
                .get(&event.topic())
                .map(|entries| entries.iter().map(|e| Arc::clone(&e.handler)).collect())
                .unwrap_or_default()
        };

        tracing::trace!(topic = ?event.topic(), subscribers = handlers.len(), "publishing");
        for handler in handlers {
            if let Err(e) = handler(event) {
                tracing::warn!(topic = ?event.topic(), error = %e, "bus handler failed");
            }
        }
    }

    /// Number of live subscriptions on `topic`
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.registry
            .lock()
            .by_topic
            .get(&topic)
            .map_or(0, Vec::len)
    }

    fn unsubscribe(&self, topic: Topic, id: u64) {
        if let Some(entries) = self.registry.lock().by_topic.get_mut(&topic) {
            entries.retain(|e| e.id != id);
        }
    }
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus").finish_non_exhaustive()
    }
}

/// RAII handle for one subscription; dropping it unsubscribes
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    bus: Weak<NotificationBus>,
    topic: Topic,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(self.topic, self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.id)
            .finish()
    }
}
