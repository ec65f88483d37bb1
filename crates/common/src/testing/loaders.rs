//! Instrumented loaders for cache tests
//!
//! Both loaders are cheap handles over shared atomics: clone one, move the
//! clone into the cache, and keep the original to inspect or steer it.

use std::convert::Infallible;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use thiserror::Error;

/// Loader returning an incrementing counter
///
/// The first call yields `1`, the next `2`, and so on, regardless of key.
///
/// # Examples
///
/// ```
/// use sundry_common::cache::CacheMap;
/// use sundry_common::testing::CountingLoader;
///
/// let counter = CountingLoader::new();
/// let cache = CacheMap::on_access(counter.loader::<String>());
///
/// assert_eq!(cache.get(&"a".to_string()), 1);
/// assert_eq!(cache.get(&"b".to_string()), 2);
/// assert_eq!(counter.calls(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CountingLoader {
    calls: Arc<AtomicU64>,
}

impl CountingLoader {
    /// Create a counter that has not been called yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the counter and return the new value
    pub fn next_value(&self) -> u64 {
        self.calls.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Number of values handed out so far
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Plain loader closure sharing this counter
    pub fn loader<K: 'static>(&self) -> impl Fn(&K) -> u64 + Send + Sync + 'static {
        let counter = self.clone();
        move |_key: &K| counter.next_value()
    }

    /// Same as [`Self::loader`] in the `Result` shape `with_clock` expects
    pub fn fallible_loader<K: 'static>(
        &self,
    ) -> impl Fn(&K) -> Result<u64, Infallible> + Send + Sync + 'static {
        let counter = self.clone();
        move |_key: &K| Ok(counter.next_value())
    }
}

/// Error returned by a [`FlakyLoader`] while it is failing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("loader failure on attempt {attempt}")]
pub struct LoadFailure {
    /// 1-based attempt number that failed
    pub attempt: u64,
}

/// Loader that can be switched between succeeding and failing
///
/// Successful calls yield an incrementing counter starting at `1`. Failed
/// attempts are counted but do not advance the value sequence.
#[derive(Debug, Clone, Default)]
pub struct FlakyLoader {
    failing: Arc<AtomicBool>,
    attempts: Arc<AtomicU64>,
    successes: Arc<AtomicU64>,
}

impl FlakyLoader {
    /// Create a loader that starts out succeeding
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a loader that starts out failing
    pub fn failing() -> Self {
        let loader = Self::default();
        loader.set_failing(true);
        loader
    }

    /// Switch failure mode on or off
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Total attempts, failed or not
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Attempts that produced a value
    pub fn successes(&self) -> u64 {
        self.successes.load(Ordering::SeqCst)
    }

    /// Run one attempt
    pub fn attempt(&self) -> Result<u64, LoadFailure> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(LoadFailure { attempt });
        }
        Ok(self.successes.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Loader closure sharing this loader's state
    pub fn loader<K: 'static>(
        &self,
    ) -> impl Fn(&K) -> Result<u64, LoadFailure> + Send + Sync + 'static {
        let flaky = self.clone();
        move |_key: &K| flaky.attempt()
    }
}
