//! Process-local governance stores.
//!
//! Used directly when no shared store is configured and as the fallback
//! when the shared store is unreachable. Expired counters and empty windows
//! are dropped on access, so memory follows the set of active keys.

use crate::ports::clock::Clock;
use crate::ports::counter_store::{CounterStore, StoreError};
use crate::ports::window_store::WindowStore;
use async_trait::async_trait;
use conclave_domain::{SlidingWindow, WindowEntry, WindowKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock leaves plain counters behind; keep going.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Copy)]
struct Counter {
    value: i64,
    expires_at_ms: Option<i64>,
}

/// In-memory [`CounterStore`] honoring key expiry against a [`Clock`].
pub struct InMemoryCounterStore {
    counters: Mutex<HashMap<String, Counter>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryCounterStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: Mutex::new(HashMap::new()),
            clock,
        }
    }

    fn add(&self, key: &str, delta: i64) -> i64 {
        let now = self.clock.now_millis();
        let mut counters = lock(&self.counters);
        counters.retain(|_, c| c.expires_at_ms.is_none_or(|at| now < at));
        let counter = counters.entry(key.to_string()).or_insert(Counter {
            value: 0,
            expires_at_ms: None,
        });
        if counter.expires_at_ms.is_some_and(|at| now >= at) {
            *counter = Counter {
                value: 0,
                expires_at_ms: None,
            };
        }
        counter.value += delta;
        counter.value
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn increment(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.add(key, 1))
    }

    async fn decrement(&self, key: &str) -> Result<i64, StoreError> {
        Ok(self.add(key, -1))
    }

    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError> {
        let now = self.clock.now_millis();
        let mut counters = lock(&self.counters);
        counters.retain(|_, c| c.expires_at_ms.is_none_or(|at| now < at));
        Ok(counters.get(key).map(|c| c.value))
    }

    async fn expire_at(&self, key: &str, epoch_secs: i64) -> Result<(), StoreError> {
        let mut counters = lock(&self.counters);
        if let Some(counter) = counters.get_mut(key) {
            counter.expires_at_ms = Some(epoch_secs * 1000);
        }
        Ok(())
    }
}

/// In-memory [`WindowStore`].
#[derive(Default)]
pub struct InMemoryWindowStore {
    windows: Mutex<HashMap<WindowKey, SlidingWindow>>,
}

impl InMemoryWindowStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WindowStore for InMemoryWindowStore {
    async fn append(&self, key: &WindowKey, entry: WindowEntry) -> Result<(), StoreError> {
        let mut windows = lock(&self.windows);
        windows
            .entry(key.clone())
            .or_insert_with(|| SlidingWindow::new(key.span.millis()))
            .push(entry, entry.timestamp_ms);
        drop_idle(&mut windows, entry.timestamp_ms);
        Ok(())
    }

    async fn live_entries(
        &self,
        key: &WindowKey,
        now_ms: i64,
    ) -> Result<Vec<WindowEntry>, StoreError> {
        let mut windows = lock(&self.windows);
        let entries = windows
            .get_mut(key)
            .map(|window| window.entries(now_ms))
            .unwrap_or_default();
        drop_idle(&mut windows, now_ms);
        Ok(entries)
    }
}

fn drop_idle(windows: &mut HashMap<WindowKey, SlidingWindow>, now_ms: i64) {
    windows.retain(|_, window| window.count(now_ms) > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::clock::ManualClock;
    use conclave_domain::{UserId, WindowScope, WindowSpan};

    #[tokio::test]
    async fn test_counter_increment_and_decrement() {
        let store = InMemoryCounterStore::new(Arc::new(ManualClock::new(0)));
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.increment("k").await.unwrap(), 1);
        assert_eq!(store.increment("k").await.unwrap(), 2);
        assert_eq!(store.decrement("k").await.unwrap(), 1);
        assert_eq!(store.get("k").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn test_counter_expires() {
        let clock = Arc::new(ManualClock::new(0));
        let store = InMemoryCounterStore::new(clock.clone());
        store.increment("k").await.unwrap();
        store.expire_at("k", 10).await.unwrap();

        clock.set(9_999);
        assert_eq!(store.get("k").await.unwrap(), Some(1));

        clock.set(10_000);
        assert_eq!(store.get("k").await.unwrap(), None);
        assert_eq!(store.increment("k").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_expired_counters_are_dropped() {
        let clock = Arc::new(ManualClock::new(0));
        let store = InMemoryCounterStore::new(clock.clone());
        store.increment("quota:u:basic:2024-05").await.unwrap();
        store.expire_at("quota:u:basic:2024-05", 10).await.unwrap();

        clock.set(10_000);
        store.increment("quota:u:basic:2024-06").await.unwrap();

        let counters = lock(&store.counters);
        assert_eq!(counters.len(), 1);
        assert!(counters.contains_key("quota:u:basic:2024-06"));
    }

    #[tokio::test]
    async fn test_window_entries_expire() {
        let store = InMemoryWindowStore::new();
        let key = WindowKey::requests(WindowScope::User(UserId::new("u")), WindowSpan::Minute);

        store.append(&key, WindowEntry::hit(0)).await.unwrap();
        store.append(&key, WindowEntry::hit(30_000)).await.unwrap();

        assert_eq!(store.live_entries(&key, 59_999).await.unwrap().len(), 2);
        assert_eq!(store.live_entries(&key, 60_000).await.unwrap().len(), 1);
        assert_eq!(store.live_entries(&key, 90_000).await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_idle_windows_are_dropped() {
        let store = InMemoryWindowStore::new();
        let alice = WindowKey::requests(WindowScope::User(UserId::new("alice")), WindowSpan::Minute);
        let bob = WindowKey::requests(WindowScope::User(UserId::new("bob")), WindowSpan::Minute);

        store.append(&alice, WindowEntry::hit(0)).await.unwrap();
        store.append(&bob, WindowEntry::hit(70_000)).await.unwrap();

        let windows = lock(&store.windows);
        assert_eq!(windows.len(), 1);
        assert!(windows.contains_key(&bob));
    }
}
