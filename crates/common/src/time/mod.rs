//! Time abstractions
//!
//! Every freshness decision in the cache goes through a [`Clock`], so tests
//! can swap real time for a [`MockClock`] and step over expiration windows
//! without sleeping.
//!
//! ## Usage
//!
//! ```rust
//! use std::time::Duration;
//!
//! use sundry_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.now().duration_since(start), Duration::from_secs(5));
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
