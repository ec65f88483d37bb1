//! Background sweeper for the live expiration policy
//!
//! The sweeper owns one named OS thread. Each pass takes the cache lock,
//! parks on the condvar for one sweep interval (the loop's only suspension
//! point), evicts every stale entry and releases the lock. Shutdown clears
//! the running flag under the same lock, notifies, and joins, so the wait is
//! cut short instead of running out a full interval.

use std::hash::Hash;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace, warn};

use super::error::{CacheError, CacheResult};
use super::store::Store;
use crate::time::Clock;

/// Handle to a running sweeper thread
#[derive(Debug)]
pub(crate) struct Sweeper {
    handle: JoinHandle<()>,
}

impl Sweeper {
    /// Start the sweep loop on a new thread named `thread_name`
    ///
    /// The store's running flag must already be set.
    pub(crate) fn spawn<K, V, E, C>(
        store: Arc<Store<K, V, E, C>>,
        interval: Duration,
        thread_name: &str,
    ) -> CacheResult<Self>
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Send + 'static,
        E: 'static,
        C: Clock,
    {
        let handle = thread::Builder::new()
            .name(thread_name.to_string())
            .spawn(move || run(&store, interval))
            .map_err(CacheError::SweeperSpawn)?;

        debug!(thread = thread_name, ?interval, "cache sweeper started");
        Ok(Self { handle })
    }

    /// Stop the loop and wait for the thread to exit
    ///
    /// Returns `false` if the thread panicked. Never blocks longer than the
    /// current sweep pass: a parked sweeper is woken immediately.
    pub(crate) fn shutdown<K, V, E, C>(self, store: &Store<K, V, E, C>) -> bool
    where
        K: Eq + Hash + Clone,
        C: Clock,
    {
        {
            let mut state = store.lock();
            state.running = false;
        }
        store.notify();

        let name = self.handle.thread().name().unwrap_or("cache-sweeper").to_string();
        match self.handle.join() {
            Ok(()) => {
                debug!(thread = %name, "cache sweeper stopped");
                true
            }
            Err(_) => {
                warn!(thread = %name, "cache sweeper panicked; entries stopped expiring");
                false
            }
        }
    }
}

fn run<K, V, E, C>(store: &Store<K, V, E, C>, interval: Duration)
where
    K: Eq + Hash + Clone,
    C: Clock,
{
    loop {
        let guard = store.lock();
        if !guard.running {
            break;
        }

        let (mut guard, _timed_out) = store.wait_timeout(guard, interval);
        if !guard.running {
            break;
        }

        let evicted = store.sweep_locked(&mut guard);
        let remaining = guard.entries.len();
        drop(guard);

        if evicted > 0 {
            trace!(evicted, remaining, "cache sweep evicted stale entries");
        }
    }
}
