//! Blocking wait helpers
//!
//! Background sweeps run on their own schedule, so tests observe them by
//! polling instead of sleeping a fixed amount.

use std::thread;
use std::time::{Duration, Instant};

/// Poll `condition` every `interval` until it holds or `timeout` passes
///
/// Returns `true` as soon as the condition holds. The condition is checked
/// once more at the deadline, so a slow final interval is not lost.
///
/// # Example
/// ```
/// use std::sync::atomic::{AtomicBool, Ordering};
/// use std::sync::Arc;
/// use std::thread;
/// use std::time::Duration;
///
/// use sundry_common::testing::poll_until;
///
/// let flag = Arc::new(AtomicBool::new(false));
/// let setter = Arc::clone(&flag);
/// thread::spawn(move || {
///     thread::sleep(Duration::from_millis(20));
///     setter.store(true, Ordering::SeqCst);
/// });
///
/// assert!(poll_until(Duration::from_secs(5), Duration::from_millis(5), || {
///     flag.load(Ordering::SeqCst)
/// }));
/// ```
pub fn poll_until<F>(timeout: Duration, interval: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;

    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(interval);
    }

    condition()
}
