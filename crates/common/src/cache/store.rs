//! Shared state behind a `CacheMap`
//!
//! One [`Mutex`] guards the entry map, every entry's timer and the sweeper's
//! running flag. The [`Condvar`] is bound to that same mutex so the sweeper
//! can park on it and be released by shutdown without a lost wakeup.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use super::entry::Entry;
use super::stats::MetricsCollector;
use crate::time::Clock;

/// Type-erased loader callback
pub(crate) type Loader<K, V, E> = Box<dyn Fn(&K) -> Result<V, E> + Send + Sync>;

/// Wait outcome: (guard, timed_out)
pub(crate) type WaitOutcome<'a, K, V> = (MutexGuard<'a, State<K, V>>, bool);

/// Everything guarded by the cache lock
pub(crate) struct State<K, V> {
    pub(crate) entries: HashMap<K, Entry<V>>,
    /// Cleared by shutdown; only meaningful for the live policy
    pub(crate) running: bool,
}

pub(crate) struct Store<K, V, E, C> {
    state: Mutex<State<K, V>>,
    wake: Condvar,
    pub(crate) loader: Loader<K, V, E>,
    pub(crate) clock: C,
    pub(crate) expiration_time: Duration,
    pub(crate) metrics: MetricsCollector,
}

impl<K, V, E, C> Store<K, V, E, C>
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    pub(crate) fn new(
        loader: Loader<K, V, E>,
        clock: C,
        expiration_time: Duration,
        metrics: MetricsCollector,
        running: bool,
    ) -> Self {
        Self {
            state: Mutex::new(State { entries: HashMap::new(), running }),
            wake: Condvar::new(),
            loader,
            clock,
            expiration_time,
            metrics,
        }
    }

    /// Acquire the cache lock
    ///
    /// A loader that panicked while the lock was held poisons it; the map
    /// itself is never left half-updated (values are only written after the
    /// loader returns), so the poison is cleared and work continues.
    pub(crate) fn lock(&self) -> MutexGuard<'_, State<K, V>> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                self.state.clear_poison();
                poisoned.into_inner()
            }
        }
    }

    /// Park on the condvar for at most `timeout`
    pub(crate) fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, State<K, V>>,
        timeout: Duration,
    ) -> WaitOutcome<'a, K, V> {
        match self.wake.wait_timeout(guard, timeout) {
            Ok((guard, result)) => (guard, result.timed_out()),
            Err(poisoned) => {
                let (guard, result) = poisoned.into_inner();
                (guard, result.timed_out())
            }
        }
    }

    /// Wake the sweeper, if one is parked
    pub(crate) fn notify(&self) {
        self.wake.notify_all();
    }

    /// Evict every entry that has gone `expiration_time` without a bump
    ///
    /// Must be called with the lock held. Returns the number of entries
    /// removed.
    pub(crate) fn sweep_locked(&self, state: &mut State<K, V>) -> usize {
        let now = self.clock.now();
        let stale: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_stale_at(now, self.expiration_time))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &stale {
            state.entries.remove(key);
        }

        self.metrics.record_sweep();
        self.metrics.record_expirations(stale.len());
        stale.len()
    }
}
