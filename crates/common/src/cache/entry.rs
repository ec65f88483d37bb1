//! Cached value plus its freshness timer

use std::time::{Duration, Instant};

/// One cached value and the instant it was last created, refreshed or
/// touched.
///
/// Entries are owned by their slot in a `CacheMap` and mutated only under
/// the map's lock. The `*_at` methods take the current instant explicitly so
/// the owning map can drive them from its [`Clock`](crate::time::Clock);
/// the plain variants read the system clock.
#[derive(Debug, Clone)]
pub struct Entry<V> {
    value: V,
    touched_at: Instant,
}

impl<V> Entry<V> {
    /// Create an entry whose timer starts now
    pub fn new(value: V) -> Self {
        Self::new_at(value, Instant::now())
    }

    /// Create an entry whose timer starts at `now`
    pub fn new_at(value: V, now: Instant) -> Self {
        Self { value, touched_at: now }
    }

    /// The stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Overwrite the stored value without touching the timer
    pub fn set_value(&mut self, value: V) {
        self.value = value;
    }

    /// Reset elapsed time to zero
    pub fn bump(&mut self) {
        self.bump_at(Instant::now());
    }

    /// Reset elapsed time to zero as of `now`
    pub fn bump_at(&mut self, now: Instant) {
        self.touched_at = now;
    }

    /// Time since creation or the last bump
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    /// Time between the last bump and `now`, zero if `now` is earlier
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.touched_at)
    }

    /// Whether the entry has gone `expiration_time` or longer without a bump
    pub fn is_stale_at(&self, now: Instant, expiration_time: Duration) -> bool {
        self.elapsed_at(now) >= expiration_time
    }

    /// Consume the entry, returning the value
    pub fn into_value(self) -> V {
        self.value
    }
}
