//! Loader-backed key/value cache with inactivity expiration
//!
//! [`CacheMap`] fills itself on demand: a read of an absent key runs the
//! loader supplied at construction, stores the result and hands back a
//! clone. Every entry carries a timer that is reset whenever the entry is
//! created, refreshed or read; an entry whose timer has run for the
//! configured expiration time is stale.
//!
//! # Features
//!
//! - **Thread-safe**: one `Mutex` guards the map, share the cache via `Arc`
//! - **Generic**: works with any `K: Eq + Hash + Clone` and `V: Clone`
//! - **Two expiration policies**: inline reload on access, or background
//!   eviction by a sweeper thread
//! - **Fallible loaders**: loader errors surface unchanged from `try_get`
//! - **Metrics tracking**: optional hit/miss/refresh/expiration statistics
//! - **Testable**: clock abstraction for deterministic time-based testing
//!
//! # Examples
//!
//! ## On-access Expiration
//! ```
//! use std::time::Duration;
//!
//! use sundry_common::cache::{CacheMap, CacheMapConfig};
//!
//! let cache = CacheMap::new(CacheMapConfig::on_access(Duration::from_secs(60)), |key: &u32| {
//!     key * 2
//! })
//! .unwrap();
//!
//! assert_eq!(cache.get(&21), 42);
//! assert!(cache.contains_key(&21));
//! ```
//!
//! ## Live Expiration
//! ```
//! use std::time::Duration;
//!
//! use sundry_common::cache::{CacheMap, CacheMapConfig};
//!
//! let config = CacheMapConfig::live(Duration::from_secs(30), Duration::from_secs(5));
//! let cache = CacheMap::new(config, |key: &String| key.len()).unwrap();
//!
//! assert_eq!(cache.get(&"session".to_string()), 7);
//! assert!(cache.is_live());
//! // Dropping the cache stops and joins the sweeper thread.
//! drop(cache);
//! ```
//!
//! ## Fallible Loader
//! ```
//! use sundry_common::cache::{CacheMap, CacheMapConfig};
//!
//! let cache = CacheMap::fallible(CacheMapConfig::default(), |key: &String| {
//!     key.parse::<i64>().map_err(|e| e.to_string())
//! })
//! .unwrap();
//!
//! assert_eq!(cache.try_get(&"7".to_string()), Ok(7));
//! assert!(cache.try_get(&"seven".to_string()).is_err());
//! assert!(!cache.contains_key(&"seven".to_string()));
//! ```
//!
//! ## Cache Statistics
//! ```
//! use sundry_common::cache::{CacheMap, CacheMapConfig};
//!
//! let config = CacheMapConfig::builder().track_metrics(true).build();
//! let cache = CacheMap::new(config, |key: &u8| *key).unwrap();
//!
//! cache.get(&1);
//! cache.get(&1);
//!
//! let stats = cache.stats();
//! assert_eq!(stats.hits, 1);
//! assert_eq!(stats.misses, 1);
//! println!("Hit rate: {:.2}%", stats.hit_rate() * 100.0);
//! ```
//!
//! # Expiration Policies
//!
//! - **OnAccess**: `get` checks the entry's timer and reloads a stale entry
//!   in place. Stale entries nobody reads stay in the map until removed,
//!   cleared or purged with [`CacheMap::purge_stale`].
//! - **Live**: a named sweeper thread evicts stale entries once per sweep
//!   interval. `get` trusts the sweeper and never checks staleness, so an
//!   entry may be served for up to one interval past its expiration.
//!
//! # Thread Safety
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use sundry_common::cache::CacheMap;
//!
//! let cache = Arc::new(CacheMap::on_access(|key: &u64| key + 1));
//!
//! let handles: Vec<_> = (0..8)
//!     .map(|i| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || cache.get(&i))
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(cache.len(), 8);
//! ```

mod config;
mod core;
mod entry;
mod error;
mod stats;
mod store;
mod sweeper;
pub mod utils;

// Re-export public API
pub use core::CacheMap;

pub use config::{
    CacheMapConfig, CacheMapConfigBuilder, ExpirationPolicy, DEFAULT_EXPIRATION_TIME,
    DEFAULT_SWEEPER_THREAD_NAME, DEFAULT_SWEEP_INTERVAL,
};
pub use entry::Entry;
pub use error::{CacheError, CacheResult};
pub use stats::CacheStats;
