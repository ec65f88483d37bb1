//! Testing utilities and helpers
//!
//! This module provides helpers for exercising caches in tests:
//! - **[`loaders`]**: Instrumented loaders that count or fail on demand
//! - **[`wait`]**: Blocking poll helpers for background-timing assertions
//! - Time mocking utilities (re-exported from [`crate::time`])
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use sundry_common::cache::{CacheMap, CacheMapConfig};
//! use sundry_common::testing::{CountingLoader, MockClock};
//!
//! let clock = MockClock::new();
//! let counter = CountingLoader::new();
//! let cache = CacheMap::with_clock(
//!     CacheMapConfig::on_access(Duration::from_secs(10)),
//!     clock.clone(),
//!     counter.fallible_loader::<&str>(),
//! )
//! .unwrap();
//!
//! assert_eq!(cache.get(&"X"), 1);
//! clock.advance(Duration::from_secs(11));
//! assert_eq!(cache.get(&"X"), 2);
//! assert_eq!(counter.calls(), 2);
//! ```

pub mod loaders;
pub mod wait;

// Re-export commonly used items
pub use loaders::{CountingLoader, FlakyLoader, LoadFailure};
pub use wait::poll_until;

pub use crate::time::{Clock, MockClock, SystemClock};
