//! Cache statistics and metrics tracking
//!
//! Counters are plain relaxed atomics: they are bumped while the cache lock
//! is already held, so they only need to be individually consistent.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time statistics for a `CacheMap`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Current number of entries
    pub size: usize,

    /// Reads served from a fresh entry
    pub hits: u64,

    /// Reads that found no entry and invoked the loader
    pub misses: u64,

    /// Stale entries reloaded in place (on access or explicit refresh)
    pub refreshes: u64,

    /// Entries evicted for staleness by a sweep pass
    pub expirations: u64,

    /// Entries erased through `remove_key`
    pub removals: u64,

    /// Loader invocations that returned an error
    pub load_failures: u64,

    /// Completed sweep passes (background or `purge_stale`)
    pub sweeps: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / total accesses)
    pub fn hit_rate(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate miss rate, counting stale reloads as misses
    pub fn miss_rate(&self) -> f64 {
        if self.total_accesses() == 0 {
            0.0
        } else {
            1.0 - self.hit_rate()
        }
    }

    /// Reads that went through `get`: hits, misses and stale reloads
    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses + self.refreshes
    }

    /// Loader invocations that produced a value
    pub fn loads(&self) -> u64 {
        self.misses + self.refreshes
    }
}

/// Thread-safe metrics collector for cache operations
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    enabled: bool,
    hits: AtomicU64,
    misses: AtomicU64,
    refreshes: AtomicU64,
    expirations: AtomicU64,
    removals: AtomicU64,
    load_failures: AtomicU64,
    sweeps: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    ///
    /// When `enabled` is false every recorder except [`Self::record_sweep`]
    /// is a no-op.
    pub(crate) fn new(enabled: bool) -> Self {
        Self { enabled, ..Self::default() }
    }

    fn bump(&self, counter: &AtomicU64, by: u64) {
        if self.enabled {
            counter.fetch_add(by, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_hit(&self) {
        self.bump(&self.hits, 1);
    }

    pub(crate) fn record_miss(&self) {
        self.bump(&self.misses, 1);
    }

    pub(crate) fn record_refresh(&self) {
        self.bump(&self.refreshes, 1);
    }

    pub(crate) fn record_expirations(&self, count: usize) {
        self.bump(&self.expirations, count as u64);
    }

    pub(crate) fn record_removal(&self) {
        self.bump(&self.removals, 1);
    }

    pub(crate) fn record_load_failure(&self) {
        self.bump(&self.load_failures, 1);
    }

    /// Sweeps are counted even with metrics off so sweeper liveness stays
    /// observable
    pub(crate) fn record_sweep(&self) {
        self.sweeps.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current statistics snapshot
    pub(crate) fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats {
            size,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            removals: self.removals.load(Ordering::Relaxed),
            load_failures: self.load_failures.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
        }
    }

    /// Reset every counter except `sweeps` to zero
    pub(crate) fn reset(&self) {
        for counter in [
            &self.hits,
            &self.misses,
            &self.refreshes,
            &self.expirations,
            &self.removals,
            &self.load_failures,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
