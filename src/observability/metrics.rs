//! Operation counters for a [`Stowage`](crate::Stowage) instance
//!
//! - Counters only, monotonic
//! - Reset only when the instance is created
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one orchestrator instance
///
/// Uses Relaxed ordering; the counters are diagnostics, not synchronization.
#[derive(Debug, Default)]
pub struct StowageMetrics {
    /// Reads answered from the read cache
    cache_hits: AtomicU64,
    /// Reads that had to go to the durable store
    cache_misses: AtomicU64,
    /// Durable store reads
    store_reads: AtomicU64,
    /// Durable store writes
    store_writes: AtomicU64,
    /// Deleted keys (including those removed by delete_all)
    deletes: AtomicU64,
    /// Change events published
    events_published: AtomicU64,
    /// Entries skipped by bulk reads and entry streams because they failed to decode
    bulk_entries_skipped: AtomicU64,
}

impl StowageMetrics {
    /// Create a registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_cache_hits(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_cache_misses(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_reads(&self) {
        self.store_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_store_writes(&self) {
        self.store_writes.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_deletes(&self, count: u64) {
        self.deletes.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_events_published(&self) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_bulk_entries_skipped(&self) {
        self.bulk_entries_skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get all counters as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            cache_misses: self.cache_misses.load(Ordering::Relaxed),
            store_reads: self.store_reads.load(Ordering::Relaxed),
            store_writes: self.store_writes.load(Ordering::Relaxed),
            deletes: self.deletes.load(Ordering::Relaxed),
            events_published: self.events_published.load(Ordering::Relaxed),
            bulk_entries_skipped: self.bulk_entries_skipped.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time copy of all counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub store_reads: u64,
    pub store_writes: u64,
    pub deletes: u64,
    pub events_published: u64,
    pub bulk_entries_skipped: u64,
}

impl MetricsSnapshot {
    /// Fraction of reads served from the cache (0.0 when nothing was read)
    pub fn cache_hit_rate(&self) -> f64 {
        let total = self.cache_hits + self.cache_misses;
        if total == 0 {
            0.0
        } else {
            self.cache_hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_is_zeroed() {
        let metrics = StowageMetrics::new();
        assert_eq!(metrics.snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment() {
        let metrics = StowageMetrics::new();
        metrics.increment_cache_hits();
        metrics.increment_cache_hits();
        metrics.increment_cache_misses();
        metrics.increment_store_reads();
        metrics.increment_store_writes();
        metrics.add_deletes(3);
        metrics.increment_events_published();
        metrics.increment_bulk_entries_skipped();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.cache_hits, 2);
        assert_eq!(snapshot.cache_misses, 1);
        assert_eq!(snapshot.store_reads, 1);
        assert_eq!(snapshot.store_writes, 1);
        assert_eq!(snapshot.deletes, 3);
        assert_eq!(snapshot.events_published, 1);
        assert_eq!(snapshot.bulk_entries_skipped, 1);
    }

    #[test]
    fn test_cache_hit_rate() {
        let snapshot = MetricsSnapshot {
            cache_hits: 3,
            cache_misses: 1,
            ..Default::default()
        };
        assert!((snapshot.cache_hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(MetricsSnapshot::default().cache_hit_rate(), 0.0);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let metrics = StowageMetrics::new();
        metrics.increment_store_writes();
        let json = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(json["store_writes"], 1);
        assert_eq!(json["cache_hits"], 0);
    }
}
