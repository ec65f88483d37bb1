//! Monotonic clock abstraction for testability
//!
//! [`SystemClock`] reads [`Instant::now`]; [`MockClock`] only moves when a
//! test advances it. Clones of a `MockClock` share one offset, so a clock
//! handed to a cache can still be driven from the test body.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Source of monotonic time
///
/// Implementations must be cheap to call: the cache reads the clock on
/// every access while holding its lock.
pub trait Clock: Send + Sync + 'static {
    /// Get current instant (monotonic time)
    fn now(&self) -> Instant;
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient sharing
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Mock clock for deterministic testing
///
/// Starts at the real instant it was created and then stands still until
/// [`MockClock::advance`] or [`MockClock::set_elapsed`] is called.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use sundry_common::time::{Clock, MockClock};
///
/// let clock = MockClock::new();
/// let handle = clock.clone();
///
/// handle.advance(Duration::from_secs(11));
/// assert_eq!(clock.elapsed(), Duration::from_secs(11));
/// ```
#[derive(Debug, Clone)]
pub struct MockClock {
    start: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current instant
    pub fn new() -> Self {
        Self::with_start(Instant::now())
    }

    /// Create a new mock clock with a specific start instant
    pub fn with_start(start: Instant) -> Self {
        Self { start, elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
    }

    /// Advance the mock clock by a duration
    pub fn advance(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed += duration;
        }
    }

    /// Advance the mock clock by milliseconds (convenience method)
    pub fn advance_millis(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Set the mock clock to a specific elapsed time
    pub fn set_elapsed(&self, duration: Duration) {
        if let Ok(mut elapsed) = self.elapsed.lock() {
            *elapsed = duration;
        }
    }

    /// Get the simulated time since the clock was created
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO)
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> Instant {
        self.start + self.elapsed()
    }
}
