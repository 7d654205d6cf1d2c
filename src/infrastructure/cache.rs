use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use log::debug;
use tokio::{sync::Mutex, time::Instant};

use crate::{CacheKey, FetcherError};

/// A fetched result and its freshness.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    value: Result<T, FetcherError>,
    fetched_at: Instant,
    staleness_window: Duration,
}

impl<T: Clone> CacheEntry<T> {
    /// Creates a new `CacheEntry` fetched now.
    pub fn new(value: Result<T, FetcherError>, staleness_window: Duration) -> Self {
        Self {
            value,
            fetched_at: Instant::now(),
            staleness_window,
        }
    }

    /// Whether the entry can be served at `now`: a success younger than the staleness window.
    pub fn is_valid(&self, now: Instant) -> bool {
        self.value.is_ok() && now.saturating_duration_since(self.fetched_at) < self.staleness_window
    }

    /// Whether the entry is a failure completed after `requested_at`, i.e. by the flight the
    /// requester was queued behind.
    fn is_failure_since(&self, requested_at: Instant) -> bool {
        self.value.is_err() && self.fetched_at >= requested_at
    }

    /// Retrieves the cached result.
    pub fn value(&self) -> Result<T, FetcherError> {
        self.value.clone()
    }
}

type Slot<T> = Arc<Mutex<Option<CacheEntry<T>>>>;

/// A time-bounded cache with single-flight fetches per key.
///
/// Each key owns a slot guarded by an async mutex. The fetch of a missing or stale entry runs in
/// a spawned task holding the slot lock: concurrent requesters of the key wait on the lock and then
/// read the entry it stored, and a requester dropping its future does not cancel the fetch.
///
/// Idle slots with a stale or failed entry are evicted whenever a new key is inserted, so the map
/// only grows with the keys still fresh or in flight.
pub struct KeyedCache<T> {
    slots: Mutex<HashMap<CacheKey, Slot<T>>>,
    staleness_window: Duration,
}

impl<T: Clone + Send + 'static> KeyedCache<T> {
    /// Creates a new `KeyedCache` instance with the given staleness window.
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            staleness_window,
        }
    }

    async fn slot(&self, key: &CacheKey) -> Slot<T> {
        let mut slots = self.slots.lock().await;
        if !slots.contains_key(key) {
            Self::evict_unusable(&mut slots);
        }

        Arc::clone(slots.entry(key.to_owned()).or_default())
    }

    /// Drops the idle slots holding nothing servable: stale or failed entries.
    ///
    /// A slot referenced outside the map has a flight or requesters in progress and is kept. Slots
    /// are only cloned under the map lock, so a reference count of one cannot grow meanwhile.
    fn evict_unusable(slots: &mut HashMap<CacheKey, Slot<T>>) {
        let now = Instant::now();
        let before = slots.len();
        slots.retain(|_, slot| {
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Ok(entry) => entry.as_ref().is_some_and(|entry| entry.is_valid(now)),
                Err(_) => true,
            }
        });
        let evicted = before - slots.len();
        if evicted > 0 {
            debug!("Evicted {evicted} stale or failed cache entries");
        }
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.slots.lock().await.len()
    }

    /// Returns the cached value of `key`, fetching it with `fetch` when missing or stale.
    pub async fn get_or_fetch<F, Fut>(&self, key: CacheKey, fetch: F) -> Result<T, FetcherError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetcherError>> + Send + 'static,
    {
        let requested_at = Instant::now();
        let mut entry = self.slot(&key).await.lock_owned().await;
        if let Some(cached) = entry.as_ref() {
            if cached.is_valid(Instant::now()) {
                debug!("Cache hit for {key}");
                return cached.value();
            }
            if cached.is_failure_since(requested_at) {
                debug!("Sharing failed fetch of {key}");
                return cached.value();
            }
        }

        debug!("Cache miss for {key}, fetching");
        let staleness_window = self.staleness_window;
        let flight = fetch();
        let task = tokio::spawn(async move {
            let value = flight.await;
            *entry = Some(CacheEntry::new(value.clone(), staleness_window));
            value
        });

        match task.await {
            Ok(value) => value,
            Err(e) => Err(FetcherError::Network(format!("Fetch of {key} aborted: {e}"))),
        }
    }

    /// Drops the entry of `key`; the next request fetches it again.
    pub async fn invalidate(&self, key: &CacheKey) {
        let mut slots = self.slots.lock().await;
        slots.remove(key);
    }

    /// Drops every entry.
    pub async fn clear(&self) {
        let mut slots = self.slots.lock().await;
        slots.clear();
    }
}
