//! Core cache map implementation
//!
//! [`CacheMap`] lazily populates entries through a loader and expires them
//! under the policy chosen at construction: inline on access, or through a
//! background sweeper thread.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::trace;

use super::config::{CacheMapConfig, ExpirationPolicy};
use super::entry::Entry;
use super::error::CacheResult;
use super::stats::{CacheStats, MetricsCollector};
use super::store::{Loader, Store};
use super::sweeper::Sweeper;
use crate::time::{Clock, SystemClock};

/// Loader-backed cache whose entries expire after a period without access
///
/// Every operation holds one coarse lock for its whole critical section,
/// **including the loader call**. A slow loader therefore serializes every
/// caller of the same cache; keep loaders fast and free of calls back into
/// the cache (re-entering would deadlock).
///
/// Reads are sliding: serving a fresh entry resets its timer. What happens
/// to entries that go stale depends on [`ExpirationPolicy`]:
///
/// - `OnAccess`: `get` reloads a stale entry in place before returning it.
///   Nothing is evicted in the background.
/// - `Live`: a sweeper thread evicts stale entries every sweep interval.
///   `get` never checks staleness. Dropping the cache stops and joins the
///   sweeper before `drop` returns.
///
/// # Type Parameters
/// - `K`: Key type (must be `Eq + Hash + Clone`)
/// - `V`: Value type (must be `Clone`; wrap large values in `Arc`)
/// - `E`: Loader error type (`Infallible` for plain loaders)
/// - `C`: Clock type for freshness decisions (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicU64, Ordering};
///
/// use sundry_common::cache::CacheMap;
///
/// let counter = AtomicU64::new(0);
/// let cache = CacheMap::on_access(move |_key: &String| {
///     counter.fetch_add(1, Ordering::SeqCst) + 1
/// });
///
/// assert_eq!(cache.get(&"X".to_string()), 1);
/// assert_eq!(cache.get(&"X".to_string()), 1);
/// assert!(cache.remove_key(&"X".to_string()));
/// assert_eq!(cache.get(&"X".to_string()), 2);
/// ```
pub struct CacheMap<K, V, E = Infallible, C = SystemClock>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: 'static,
    C: Clock,
{
    store: Arc<Store<K, V, E, C>>,
    policy: ExpirationPolicy,
    sweeper: Option<Sweeper>,
}

impl<K, V> CacheMap<K, V, Infallible, SystemClock>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    /// Create a cache for an infallible loader
    pub fn new<F>(config: CacheMapConfig, loader: F) -> CacheResult<Self>
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        Self::with_clock(config, SystemClock, infallible(loader))
    }

    /// On-access cache with the default expiration time
    ///
    /// Cannot fail: no thread is spawned and the default config is valid.
    pub fn on_access<F>(loader: F) -> Self
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        let config = CacheMapConfig::default();
        let store = Store::new(
            Box::new(infallible(loader)) as Loader<K, V, Infallible>,
            SystemClock,
            config.expiration_time,
            MetricsCollector::new(config.track_metrics),
            false,
        );
        Self { store: Arc::new(store), policy: ExpirationPolicy::OnAccess, sweeper: None }
    }

    /// Live cache with the default expiration time and sweep interval
    pub fn live<F>(loader: F) -> CacheResult<Self>
    where
        F: Fn(&K) -> V + Send + Sync + 'static,
    {
        let config = CacheMapConfig::builder().policy(ExpirationPolicy::live()).build();
        Self::new(config, loader)
    }
}

impl<K, V, E> CacheMap<K, V, E, SystemClock>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: 'static,
{
    /// Create a cache for a loader that can fail
    ///
    /// Loader errors surface unchanged from [`CacheMap::try_get`].
    pub fn fallible<F>(config: CacheMapConfig, loader: F) -> CacheResult<Self>
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self::with_clock(config, SystemClock, loader)
    }
}

impl<K, V, E, C> CacheMap<K, V, E, C>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: 'static,
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing)
    ///
    /// Validates `config` and, for the live policy, spawns the sweeper.
    pub fn with_clock<F>(config: CacheMapConfig, clock: C, loader: F) -> CacheResult<Self>
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        config.validate()?;

        let live_interval = config.policy.sweep_interval();
        let store = Arc::new(Store::new(
            Box::new(loader) as Loader<K, V, E>,
            clock,
            config.expiration_time,
            MetricsCollector::new(config.track_metrics),
            live_interval.is_some(),
        ));

        let sweeper = match live_interval {
            Some(interval) => {
                Some(Sweeper::spawn(Arc::clone(&store), interval, &config.sweeper_thread_name)?)
            }
            None => None,
        };

        Ok(Self { store, policy: config.policy, sweeper })
    }

    /// Get the value for `key`, loading it if needed
    ///
    /// - Absent: the loader runs, the value is inserted and returned.
    /// - Present and stale (on-access policy only): the loader runs and the
    ///   existing entry is overwritten in place.
    /// - Present otherwise: the timer is reset and the stored value returned.
    ///
    /// A loader error is returned as-is and leaves any existing entry
    /// untouched. At most one loader call happens per `try_get`.
    pub fn try_get(&self, key: &K) -> Result<V, E> {
        let mut state = self.store.lock();
        let now = self.store.clock.now();

        if let Some(entry) = state.entries.get_mut(key) {
            if self.checks_on_access() && entry.is_stale_at(now, self.store.expiration_time) {
                let value = self.load(key)?;
                entry.set_value(value.clone());
                entry.bump_at(self.store.clock.now());
                self.store.metrics.record_refresh();
                return Ok(value);
            }

            entry.bump_at(now);
            self.store.metrics.record_hit();
            return Ok(entry.value().clone());
        }

        let value = self.load(key)?;
        state.entries.insert(key.clone(), Entry::new_at(value.clone(), self.store.clock.now()));
        self.store.metrics.record_miss();
        Ok(value)
    }

    /// Reload `key` through the loader regardless of freshness
    ///
    /// Overwrites an existing entry in place and resets its timer, or
    /// inserts a new entry. On error nothing changes.
    pub fn try_refresh(&self, key: &K) -> Result<V, E> {
        let mut state = self.store.lock();
        let value = self.load(key)?;
        let now = self.store.clock.now();

        match state.entries.get_mut(key) {
            Some(entry) => {
                entry.set_value(value.clone());
                entry.bump_at(now);
                self.store.metrics.record_refresh();
            }
            None => {
                state.entries.insert(key.clone(), Entry::new_at(value.clone(), now));
                self.store.metrics.record_miss();
            }
        }
        Ok(value)
    }

    /// Erase `key`, returning whether it was present
    pub fn remove_key(&self, key: &K) -> bool {
        let removed = self.store.lock().entries.remove(key).is_some();
        if removed {
            self.store.metrics.record_removal();
        }
        removed
    }

    /// Whether `key` currently has an entry, stale or not
    ///
    /// Does not touch the entry's timer.
    pub fn contains_key(&self, key: &K) -> bool {
        self.store.lock().entries.contains_key(key)
    }

    /// Number of entries, including stale ones not yet reloaded or swept
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every entry and reset statistics
    ///
    /// The sweep count survives so a live sweeper's progress stays visible.
    pub fn clear(&self) {
        let mut state = self.store.lock();
        state.entries.clear();
        self.store.metrics.reset();
    }

    /// Run one sweep pass on the calling thread
    ///
    /// Evicts every stale entry under either policy and returns how many
    /// were removed. Live caches also do this on their own.
    pub fn purge_stale(&self) -> usize {
        let mut state = self.store.lock();
        let evicted = self.store.sweep_locked(&mut state);
        trace!(evicted, remaining = state.entries.len(), "manual cache sweep");
        evicted
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        self.store.metrics.snapshot(self.len())
    }

    /// Expiration policy fixed at construction
    pub fn policy(&self) -> ExpirationPolicy {
        self.policy
    }

    /// Expiration time fixed at construction
    pub fn expiration_time(&self) -> Duration {
        self.store.expiration_time
    }

    /// Whether a background sweeper is attached
    pub fn is_live(&self) -> bool {
        self.sweeper.is_some()
    }

    fn checks_on_access(&self) -> bool {
        matches!(self.policy, ExpirationPolicy::OnAccess)
    }

    fn load(&self, key: &K) -> Result<V, E> {
        (self.store.loader)(key).map_err(|err| {
            self.store.metrics.record_load_failure();
            err
        })
    }
}

impl<K, V, C> CacheMap<K, V, Infallible, C>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    C: Clock,
{
    /// Get the value for `key`, loading it if needed
    ///
    /// See [`CacheMap::try_get`] for the exact semantics.
    pub fn get(&self, key: &K) -> V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Reload `key` through the loader regardless of freshness
    pub fn refresh(&self, key: &K) -> V {
        match self.try_refresh(key) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }
}

impl<K, V, E, C> Drop for CacheMap<K, V, E, C>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: 'static,
    C: Clock,
{
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.shutdown(&self.store);
        }
    }
}

impl<K, V, E, C> fmt::Debug for CacheMap<K, V, E, C>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    E: 'static,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheMap")
            .field("policy", &self.policy)
            .field("expiration_time", &self.store.expiration_time)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

fn infallible<K, V, F>(loader: F) -> impl Fn(&K) -> Result<V, Infallible> + Send + Sync + 'static
where
    F: Fn(&K) -> V + Send + Sync + 'static,
{
    move |key: &K| Ok(loader(key))
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::core.
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;

    use super::*;
    use crate::time::MockClock;

    fn counting_loader() -> (Arc<AtomicU64>, impl Fn(&String) -> u64 + Send + Sync + 'static) {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&calls);
        (calls, move |_key: &String| counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn mock_cache(
        config: CacheMapConfig,
    ) -> (MockClock, Arc<AtomicU64>, CacheMap<String, u64, Infallible, MockClock>) {
        let clock = MockClock::new();
        let (calls, loader) = counting_loader();
        let cache = CacheMap::with_clock(config, clock.clone(), infallible(loader)).unwrap();
        (clock, calls, cache)
    }

    /// Validates `CacheMap::get` behavior for the first access scenario.
    ///
    /// Assertions:
    /// - Confirms the loader ran exactly once and its value was returned.
    /// - Confirms `cache.len()` equals `1`.
    #[test]
    fn test_get_miss_loads_once() {
        let (_clock, calls, cache) = mock_cache(CacheMapConfig::default());

        assert_eq!(cache.get(&"a".to_string()), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    /// Validates sliding expiration under the on-access policy.
    ///
    /// Assertions:
    /// - Confirms reads every 6s keep a 10s entry alive across 18s.
    /// - Confirms the loader ran once.
    #[test]
    fn test_get_fresh_hit_slides_expiration() {
        let config = CacheMapConfig::on_access(Duration::from_secs(10));
        let (clock, calls, cache) = mock_cache(config);
        let key = "slide".to_string();

        assert_eq!(cache.get(&key), 1);
        for _ in 0..3 {
            clock.advance(Duration::from_secs(6));
            assert_eq!(cache.get(&key), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    /// Validates refresh-on-stale under the on-access policy.
    ///
    /// Assertions:
    /// - Confirms the access at exactly the expiration boundary reloads.
    /// - Confirms the entry count is unchanged (updated in place).
    #[test]
    fn test_get_stale_reloads_in_place() {
        let config = CacheMapConfig::builder()
            .expiration_time(Duration::from_secs(10))
            .track_metrics(true)
            .build();
        let (clock, calls, cache) = mock_cache(config);
        let key = "stale".to_string();

        assert_eq!(cache.get(&key), 1);
        clock.advance(Duration::from_secs(10));
        assert_eq!(cache.get(&key), 2);
        assert_eq!(cache.get(&key), 2);

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!((stats.misses, stats.refreshes, stats.hits), (1, 1, 1));
    }

    /// Validates that the on-access policy never evicts on its own.
    ///
    /// Assertions:
    /// - Ensures a stale entry is still present until it is read.
    #[test]
    fn test_on_access_keeps_stale_entries() {
        let (clock, _calls, cache) = mock_cache(CacheMapConfig::on_access(Duration::from_secs(1)));
        let key = "idle".to_string();

        cache.get(&key);
        clock.advance(Duration::from_secs(60));

        assert!(cache.contains_key(&key));
        assert_eq!(cache.len(), 1);
    }

    /// Validates `CacheMap::remove_key` idempotence.
    ///
    /// Assertions:
    /// - Ensures the first removal returns true and the second false.
    /// - Ensures removing a never-inserted key returns false.
    #[test]
    fn test_remove_key_idempotent() {
        let (_clock, _calls, cache) = mock_cache(CacheMapConfig::default());
        let key = "gone".to_string();
        cache.get(&key);

        assert!(cache.remove_key(&key));
        assert!(!cache.remove_key(&key));
        assert!(!cache.remove_key(&"never".to_string()));
    }

    /// Validates `CacheMap::try_get` error propagation.
    ///
    /// Assertions:
    /// - Ensures a failing reload returns the loader error.
    /// - Confirms the previous value survives the failure.
    /// - Ensures a failing miss inserts nothing.
    #[test]
    fn test_try_get_loader_error_leaves_entry() {
        let clock = MockClock::new();
        let fail = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let switch = Arc::clone(&fail);
        let config = CacheMapConfig::builder()
            .expiration_time(Duration::from_secs(5))
            .track_metrics(true)
            .build();
        let cache: CacheMap<u32, String, String, MockClock> =
            CacheMap::with_clock(config, clock.clone(), move |key: &u32| {
                if switch.load(Ordering::SeqCst) {
                    Err(format!("backend down for {key}"))
                } else {
                    Ok(format!("value-{key}"))
                }
            })
            .unwrap();

        assert_eq!(cache.try_get(&1), Ok("value-1".to_string()));

        fail.store(true, Ordering::SeqCst);
        clock.advance(Duration::from_secs(5));
        assert_eq!(cache.try_get(&1), Err("backend down for 1".to_string()));
        assert_eq!(cache.try_get(&2), Err("backend down for 2".to_string()));
        assert!(!cache.contains_key(&2));

        fail.store(false, Ordering::SeqCst);
        assert_eq!(cache.try_get(&1), Ok("value-1".to_string()));
        assert_eq!(cache.stats().load_failures, 2);
    }

    /// Validates that a panicking loader does not wedge the cache.
    ///
    /// Assertions:
    /// - Ensures the panic reaches the caller.
    /// - Ensures later calls still work and the earlier entry survives.
    #[test]
    fn test_loader_panic_releases_lock() {
        let cache = Arc::new(CacheMap::on_access(|key: &u32| {
            if *key == 13 {
                panic!("unlucky key");
            }
            key * 2
        }));
        assert_eq!(cache.get(&4), 8);

        let unlucky = Arc::clone(&cache);
        let outcome = thread::spawn(move || unlucky.get(&13)).join();
        assert!(outcome.is_err());

        assert_eq!(cache.get(&4), 8);
        assert_eq!(cache.get(&5), 10);
        assert!(!cache.contains_key(&13));
    }

    /// Validates `CacheMap::refresh` for present and absent keys.
    ///
    /// Assertions:
    /// - Confirms a refresh replaces a fresh value and resets its timer.
    /// - Confirms a refresh of an absent key inserts it.
    #[test]
    fn test_refresh_forces_reload() {
        let (clock, calls, cache) = mock_cache(CacheMapConfig::on_access(Duration::from_secs(10)));
        let key = "r".to_string();

        assert_eq!(cache.get(&key), 1);
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.refresh(&key), 2);
        clock.advance(Duration::from_secs(8));
        assert_eq!(cache.get(&key), 2);

        assert_eq!(cache.refresh(&"new".to_string()), 3);
        assert_eq!(cache.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Validates `CacheMap::purge_stale` under the on-access policy.
    ///
    /// Assertions:
    /// - Confirms only stale entries are evicted and counted.
    #[test]
    fn test_purge_stale() {
        let config = CacheMapConfig::builder()
            .expiration_time(Duration::from_secs(10))
            .track_metrics(true)
            .build();
        let (clock, _calls, cache) = mock_cache(config);

        cache.get(&"old".to_string());
        clock.advance(Duration::from_secs(7));
        cache.get(&"new".to_string());
        clock.advance(Duration::from_secs(3));

        assert_eq!(cache.purge_stale(), 1);
        assert!(!cache.contains_key(&"old".to_string()));
        assert!(cache.contains_key(&"new".to_string()));

        let stats = cache.stats();
        assert_eq!(stats.expirations, 1);
        assert_eq!(stats.sweeps, 1);
    }

    /// Validates that a live cache does not check staleness on `get`.
    ///
    /// Assertions:
    /// - Confirms a stale entry is served until the sweeper removes it.
    #[test]
    fn test_live_get_skips_inline_check() {
        let config = CacheMapConfig::live(Duration::from_secs(10), Duration::from_secs(3600));
        let (clock, calls, cache) = mock_cache(config);
        let key = "live".to_string();

        assert!(cache.is_live());
        assert_eq!(cache.get(&key), 1);
        clock.advance(Duration::from_secs(30));
        assert_eq!(cache.get(&key), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::from_secs(30));
        assert_eq!(cache.purge_stale(), 1);
        assert_eq!(cache.get(&key), 2);
    }

    /// Validates `CacheMap::clear` and accessor methods.
    ///
    /// Assertions:
    /// - Ensures the cache is empty and statistics reset after `clear`.
    /// - Confirms the sweep count survives `clear`.
    /// - Confirms policy and expiration accessors reflect the config.
    #[test]
    fn test_clear_and_accessors() {
        let config = CacheMapConfig::builder()
            .expiration_time(Duration::from_secs(42))
            .track_metrics(true)
            .build();
        let (_clock, _calls, cache) = mock_cache(config);

        cache.get(&"a".to_string());
        cache.get(&"b".to_string());
        cache.purge_stale();
        cache.clear();

        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats { sweeps: 1, ..CacheStats::default() });
        assert_eq!(cache.policy(), ExpirationPolicy::OnAccess);
        assert_eq!(cache.expiration_time(), Duration::from_secs(42));
        assert!(!cache.is_live());
    }

    /// Validates construction failures.
    ///
    /// Assertions:
    /// - Ensures a zero sweep interval is rejected before any thread starts.
    #[test]
    fn test_new_rejects_invalid_config() {
        let config = CacheMapConfig::live(Duration::from_secs(1), Duration::ZERO);
        let result = CacheMap::new(config, |key: &u32| *key);

        assert!(matches!(result, Err(crate::cache::CacheError::InvalidConfig(_))));
    }

    /// Validates the `Debug` rendering.
    ///
    /// Assertions:
    /// - Ensures policy and length are shown without values.
    #[test]
    fn test_debug_output() {
        let cache = CacheMap::on_access(|key: &u32| format!("secret-{key}"));
        cache.get(&1);

        let rendered = format!("{cache:?}");
        assert!(rendered.contains("OnAccess"));
        assert!(rendered.contains("len: 1"));
        assert!(!rendered.contains("secret"));
    }

    /// Validates concurrent population of distinct keys.
    ///
    /// Assertions:
    /// - Confirms every key is loaded exactly once across 8 threads.
    #[test]
    fn test_concurrent_gets_load_each_key_once() {
        let loads = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&loads);
        let cache = Arc::new(CacheMap::on_access(move |key: &u64| {
            counter.fetch_add(1, Ordering::SeqCst);
            key * 10
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for key in 0..50u64 {
                        assert_eq!(cache.get(&key), key * 10);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(cache.len(), 50);
        assert_eq!(loads.load(Ordering::SeqCst), 50);
    }
}
