//! Keyed query cache.
//!
//! Entries are fresh for `stale_time`; a stale or missing entry is refetched
//! on the next [`QueryCache::fetch`]. Concurrent fetches of one key share a
//! single request. Errors are never cached. [`QueryCache::invalidate`] bumps
//! a generation counter so a fetch already in flight cannot write its
//! pre-mutation result back. Idle slots that hold nothing fresh are evicted
//! whenever a new key is added.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use crate::error::ApiResult;

struct Cached<V> {
    value: Arc<V>,
    fetched_at: Instant,
    generation: u64,
}

type Slot<V> = Arc<tokio::sync::Mutex<Option<Cached<V>>>>;

pub struct QueryCache<K, V> {
    slots: Mutex<HashMap<K, Slot<V>>>,
    stale_time: Duration,
    generation: AtomicU64,
}

impl<K, V> QueryCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(stale_time: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            stale_time,
            generation: AtomicU64::new(0),
        }
    }

    pub fn stale_time(&self) -> Duration {
        self.stale_time
    }

    /// Cached value for `key`, or the result of `fetcher` when missing or stale
    pub async fn fetch<F, Fut>(&self, key: K, fetcher: F) -> ApiResult<Arc<V>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ApiResult<V>>,
    {
        let slot = self.slot(key);
        let mut entry = slot.lock().await;

        let generation = self.generation.load(Ordering::SeqCst);
        if let Some(cached) = entry.as_ref() {
            if cached.generation == generation && cached.fetched_at.elapsed() < self.stale_time {
                return Ok(cached.value.clone());
            }
        }

        let value = Arc::new(fetcher().await?);
        if self.generation.load(Ordering::SeqCst) == generation {
            *entry = Some(Cached {
                value: value.clone(),
                fetched_at: Instant::now(),
                generation,
            });
        } else {
            *entry = None;
        }
        Ok(value)
    }

    /// Fresh cached value without fetching; `None` while a fetch holds the slot
    pub fn get_cached(&self, key: &K) -> Option<Arc<V>> {
        let slot = self.lock_slots().get(key).cloned()?;
        let entry = slot.try_lock().ok()?;
        let generation = self.generation.load(Ordering::SeqCst);
        entry
            .as_ref()
            .filter(|c| c.generation == generation && c.fetched_at.elapsed() < self.stale_time)
            .map(|c| c.value.clone())
    }

    /// Mark every entry stale
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.lock_slots().clear();
        tracing::debug!("query cache invalidated");
    }

    pub fn remove(&self, key: &K) {
        self.lock_slots().remove(key);
    }

    /// Slot for `key`. Adding a new key first evicts idle slots whose entry
    /// is missing or stale.
    fn slot(&self, key: K) -> Slot<V> {
        let mut slots = self.lock_slots();
        if let Some(slot) = slots.get(&key) {
            return slot.clone();
        }

        let generation = self.generation.load(Ordering::SeqCst);
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            let keep = match slot.try_lock() {
                Ok(entry) => entry
                    .as_ref()
                    .is_some_and(|c| c.generation == generation && c.fetched_at.elapsed() < self.stale_time),
                Err(_) => true,
            };
            keep
        });
        if slots.len() < before {
            tracing::trace!(evicted = before - slots.len(), "evicted idle cache slots");
        }

        slots.entry(key).or_default().clone()
    }

    /// Number of keys currently holding a slot
    pub fn len(&self) -> usize {
        self.lock_slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_slots().is_empty()
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<K, Slot<V>>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<K, V> std::fmt::Debug for QueryCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("stale_time", &self.stale_time)
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}
