//! In-memory expiring counter store.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use tally_core::ports::CounterStore;

struct CounterEntry {
    count: u64,
    expires_at: Instant,
}

impl CounterEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-memory counter store using a HashMap behind an async RwLock.
///
/// Expired entries read as zero immediately and are removed lazily on read,
/// or in bulk by [`InMemoryCounterStore::purge_expired`].
/// Note: Counters are per-process and lost on restart.
pub struct InMemoryCounterStore {
    store: RwLock<HashMap<String, CounterEntry>>,
}

impl InMemoryCounterStore {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Remove every expired entry and return how many were dropped.
    ///
    /// Holds the write lock for a single pass over the map.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut store = self.store.write().await;
        let before = store.len();
        store.retain(|_, entry| !entry.is_expired(now));
        let purged = before - store.len();

        if purged > 0 {
            tracing::debug!(purged, remaining = store.len(), "Purged expired counters");
        }
        purged
    }

    /// Number of entries held, including expired ones not yet purged.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryCounterStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CounterStore for InMemoryCounterStore {
    async fn get(&self, key: &str) -> u64 {
        let now = Instant::now();
        let store = self.store.read().await;
        let Some(entry) = store.get(key) else {
            return 0;
        };

        if !entry.is_expired(now) {
            return entry.count;
        }

        drop(store);
        // Another writer may have refreshed the entry in between.
        let mut store = self.store.write().await;
        if store.get(key).is_some_and(|entry| entry.is_expired(now)) {
            store.remove(key);
        }
        0
    }

    async fn set(&self, key: &str, value: u64, ttl: Duration) {
        let mut store = self.store.write().await;
        store.insert(
            key.to_string(),
            CounterEntry {
                count: value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    async fn increment(&self, key: &str, ttl: Duration) -> u64 {
        let now = Instant::now();
        let mut store = self.store.write().await;

        let entry = store.entry(key.to_string()).or_insert(CounterEntry {
            count: 0,
            expires_at: now,
        });
        if entry.is_expired(now) {
            entry.count = 0;
        }
        entry.count += 1;
        entry.expires_at = now + ttl;

        entry.count
    }

    async fn clear(&self) {
        self.store.write().await.clear();
    }
}
