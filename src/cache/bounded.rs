//! Least-recently-used cache with a pluggable cost function

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use lru::LruCache;
use tracing::debug;

use super::{CachedValue, ReadCache};
use crate::observability::Event;

/// Cost of one entry. The default charges 1 per entry, making the capacity a
/// maximum entry count.
pub type CostFn = dyn Fn(&str, &CachedValue) -> usize + Send + Sync;

struct LruState {
    entries: LruCache<String, (CachedValue, usize)>,
    total_cost: usize,
}

/// Bounded cache evicting least-recently-used entries once the summed cost
/// of its entries exceeds `capacity`.
///
/// A capacity of 0 retains nothing. An entry whose own cost exceeds the
/// capacity is not retained either, rather than flushing everything else.
pub struct LruReadCache {
    capacity: usize,
    cost: Box<CostFn>,
    state: Mutex<LruState>,
}

impl LruReadCache {
    /// Create a cache holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self::with_cost(capacity, |_, _| 1)
    }

    /// Create a cache whose entries are charged by `cost`
    pub fn with_cost<F>(capacity: usize, cost: F) -> Self
    where
        F: Fn(&str, &CachedValue) -> usize + Send + Sync + 'static,
    {
        Self {
            capacity,
            cost: Box::new(cost),
            state: Mutex::new(LruState {
                entries: LruCache::unbounded(),
                total_cost: 0,
            }),
        }
    }

    /// Returns the configured capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the summed cost of the held entries
    pub fn total_cost(&self) -> usize {
        self.lock().total_cost
    }

    fn lock(&self) -> MutexGuard<'_, LruState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for LruReadCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("LruReadCache")
            .field("capacity", &self.capacity)
            .field("entries", &state.entries.len())
            .field("total_cost", &state.total_cost)
            .finish()
    }
}

impl ReadCache for LruReadCache {
    fn put(&self, key: &str, value: CachedValue) {
        let cost = (self.cost)(key, &value);
        let mut state = self.lock();

        if let Some((_, old_cost)) = state.entries.pop(key) {
            state.total_cost -= old_cost;
        }
        if cost > self.capacity {
            debug!(event = %Event::CacheSkipOversized, key, cost, capacity = self.capacity, "entry not cached");
            return;
        }

        state.entries.put(key.to_string(), (value, cost));
        state.total_cost += cost;

        while state.total_cost > self.capacity {
            match state.entries.pop_lru() {
                Some((evicted, (_, evicted_cost))) => {
                    state.total_cost -= evicted_cost;
                    debug!(event = %Event::CacheEvict, key = %evicted, cost = evicted_cost, "entry evicted");
                }
                None => break,
            }
        }
    }

    fn get(&self, key: &str) -> Option<CachedValue> {
        self.lock().entries.get(key).map(|(value, _)| CachedValue::clone(value))
    }

    fn remove(&self, key: &str) {
        let mut state = self.lock();
        if let Some((_, cost)) = state.entries.pop(key) {
            state.total_cost -= cost;
        }
    }

    fn remove_all(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.total_cost = 0;
    }

    fn len(&self) -> usize {
        self.lock().entries.len()
    }
}
