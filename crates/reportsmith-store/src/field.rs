//! Debounced write-behind field
//!
//! A [`PersistentField`] keeps its authoritative value in memory. `set`
//! updates that value synchronously and wakes a background flusher which
//! writes the value to the durable store once the field has been quiet for
//! one quiescence window. A burst of sets therefore produces at most one
//! durable write per window, always containing the last value set.

use crate::durable::DurableStore;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Tuning for a [`PersistentField`]
#[derive(Debug, Clone, Copy)]
pub struct FieldConfig {
    /// How long the field must stay quiet before a durable write is issued
    pub quiescence: Duration,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            quiescence: Duration::from_millis(300),
        }
    }
}

struct Shared<T> {
    key: String,
    value: RwLock<T>,
    /// Bumped on every set; the flusher compares it across the window
    generation: AtomicU64,
    /// Generation last written durably
    flushed: AtomicU64,
    store: Arc<dyn DurableStore>,
    notify: Notify,
    quiescence: Duration,
}

impl<T: Serialize + Clone> Shared<T> {
    fn flush(&self) {
        let generation = self.generation.load(Ordering::Acquire);
        let value = self.value.read().clone();
        match serde_json::to_value(&value) {
            Ok(json) => match self.store.store(&self.key, json) {
                Ok(()) => {
                    self.flushed.store(generation, Ordering::Release);
                    tracing::debug!(key = %self.key, generation, "field flushed");
                }
                Err(e) => {
                    tracing::warn!(key = %self.key, error = %e, "durable write failed, will retry on next flush");
                }
            },
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "field value not serializable");
            }
        }
    }
}

/// A named slot with an authoritative in-memory value and a lagging durable copy
///
/// # Invariants
/// - The value returned by [`get`](Self::get) is always the most recent
///   value passed to [`set`](Self::set); durable writes never gate visibility
/// - At most one durable write is issued per quiescence window
///
/// Must be constructed inside a tokio runtime; the flusher task is aborted
/// when the field is dropped.
pub struct PersistentField<T> {
    shared: Arc<Shared<T>>,
    flusher: tokio::task::JoinHandle<()>,
}

impl<T> PersistentField<T>
where
    T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Open the field, rehydrating from the durable store
    ///
    /// A missing or malformed stored value falls back to `default` — logged,
    /// never an error to the caller.
    pub fn open(store: Arc<dyn DurableStore>, key: impl Into<String>, default: T, config: FieldConfig) -> Self {
        let key = key.into();
        let initial = match store.load(&key) {
            Ok(Some(json)) => match serde_json::from_value::<T>(json) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "stored value malformed, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "stored value unreadable, using default");
                default
            }
        };

        let shared = Arc::new(Shared {
            key,
            value: RwLock::new(initial),
            generation: AtomicU64::new(0),
            flushed: AtomicU64::new(0),
            store,
            notify: Notify::new(),
            quiescence: config.quiescence,
        });

        let flusher = tokio::spawn(Self::run_flusher(Arc::clone(&shared)));
        Self { shared, flusher }
    }

    async fn run_flusher(shared: Arc<Shared<T>>) {
        loop {
            shared.notify.notified().await;
            // Trailing-edge debounce: keep restarting the window until the
            // field has been quiet for a full quiescence period.
            loop {
                let generation = shared.generation.load(Ordering::Acquire);
                if generation == shared.flushed.load(Ordering::Acquire) {
                    break;
                }
                tokio::time::sleep(shared.quiescence).await;
                if shared.generation.load(Ordering::Acquire) == generation {
                    shared.flush();
                    break;
                }
            }
        }
    }

    /// Storage key of this field
    #[must_use]
    pub fn key(&self) -> &str {
        &self.shared.key
    }

    /// Current value (clone of the authoritative in-memory copy)
    #[must_use]
    pub fn get(&self) -> T {
        self.shared.value.read().clone()
    }

    /// Replace the value; visible to readers before this returns
    pub fn set(&self, value: T) {
        *self.shared.value.write() = value;
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.notify.notify_one();
    }

    /// Mutate the value in place; visible to readers before this returns
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        f(&mut self.shared.value.write());
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        self.shared.notify.notify_one();
    }

    /// True while the durable copy lags the in-memory value
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.shared.generation.load(Ordering::Acquire) != self.shared.flushed.load(Ordering::Acquire)
    }

    /// Write the current value durably right now, bypassing the window
    ///
    /// Used at shutdown; routine persistence goes through the debounced
    /// flusher.
    pub fn flush_now(&self) {
        if self.is_dirty() {
            self.shared.flush();
        }
    }
}

impl<T> Drop for PersistentField<T> {
    fn drop(&mut self) {
        self.flusher.abort();
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for PersistentField<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistentField")
            .field("key", &self.shared.key)
            .field("value", &*self.shared.value.read())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::durable::MemoryStore;
    use crate::error::StoreError;
    use serde_json::{json, Value};
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    /// Store wrapper counting durable writes
    struct CountingStore {
        inner: MemoryStore,
        writes: AtomicUsize,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                inner: MemoryStore::new(),
                writes: AtomicUsize::new(0),
            }
        }

        fn write_count(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl DurableStore for CountingStore {
        fn load(&self, key: &str) -> Result<Option<Value>, StoreError> {
            self.inner.load(key)
        }

        fn store(&self, key: &str, value: Value) -> Result<(), StoreError> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.store(key, value)
        }

        fn remove(&self, key: &str) -> Result<(), StoreError> {
            self.inner.remove(key)
        }
    }

    fn config() -> FieldConfig {
        FieldConfig {
            quiescence: Duration::from_millis(300),
        }
    }

    #[tokio::test]
    async fn set_is_visible_to_next_get_immediately() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let field = PersistentField::open(store, "k", 0u32, config());
        field.set(41);
        field.set(42);
        assert_eq!(field.get(), 42);
    }

    #[tokio::test(start_paused = true)]
    async fn burst_of_sets_issues_one_write_with_last_value() {
        let counting = Arc::new(CountingStore::new());
        let store: Arc<dyn DurableStore> = Arc::clone(&counting) as _;
        let field = PersistentField::open(store, "k", 0u32, config());

        for i in 1..=25u32 {
            field.set(i);
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        // Quiescence period elapses once the burst stops.
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(counting.write_count(), 1);
        assert_eq!(counting.load("k").unwrap(), Some(json!(25)));
        assert!(!field.is_dirty());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_bursts_issue_separate_writes() {
        let counting = Arc::new(CountingStore::new());
        let store: Arc<dyn DurableStore> = Arc::clone(&counting) as _;
        let field = PersistentField::open(store, "k", 0u32, config());

        field.set(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        field.set(2);
        tokio::time::sleep(Duration::from_millis(400)).await;

        assert_eq!(counting.write_count(), 2);
        assert_eq!(counting.load("k").unwrap(), Some(json!(2)));
    }

    #[tokio::test]
    async fn rehydrates_from_stored_value() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        store.store("k", json!("restored")).unwrap();
        let field = PersistentField::open(store, "k", String::from("default"), config());
        assert_eq!(field.get(), "restored");
    }

    #[tokio::test]
    async fn malformed_stored_value_falls_back_to_default() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        store.store("k", json!({"not": "a number"})).unwrap();
        let field = PersistentField::open(store, "k", 7u32, config());
        assert_eq!(field.get(), 7);
    }

    #[tokio::test]
    async fn flush_now_writes_immediately() {
        let counting = Arc::new(CountingStore::new());
        let store: Arc<dyn DurableStore> = Arc::clone(&counting) as _;
        let field = PersistentField::open(store, "k", 0u32, config());

        field.set(9);
        field.flush_now();
        assert_eq!(counting.write_count(), 1);
        assert_eq!(counting.load("k").unwrap(), Some(json!(9)));
    }

    #[tokio::test]
    async fn update_mutates_in_place() {
        let store: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
        let field = PersistentField::open(store, "k", vec![1u32], config());
        field.update(|v| v.push(2));
        assert_eq!(field.get(), vec![1, 2]);
    }
}
