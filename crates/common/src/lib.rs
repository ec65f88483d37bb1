//! Modular common utilities shared across Sundry crates.
//!
//! The centerpiece is [`cache::CacheMap`], a loader-backed key/value cache
//! whose entries expire after a fixed period of inactivity, either checked
//! inline on every read or swept by a background thread.
//!
//! # Feature Tiers
//!
//! Enable cargo features to opt into the tiers you need:
//! - `foundation`: clock abstraction and serde helpers
//! - `runtime`: the expiring cache map (enabled by default)
//! - `observability`: tracing (pulled in by `runtime`)
//! - `test-utils`: loaders and polling helpers for downstream tests

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Foundation tier
// -----------------------------------------------------------------
#[cfg(feature = "foundation")]
pub mod time;
#[cfg(feature = "foundation")]
pub mod utils;

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;

// Testing utilities
// ---------------------------------------------------------------
#[cfg(any(feature = "runtime", feature = "test-utils"))]
pub mod testing;

// Re-export commonly used types and traits for convenience
// ------------------------
#[cfg(feature = "runtime")]
pub use cache::{
    CacheError, CacheMap, CacheMapConfig, CacheMapConfigBuilder, CacheResult, CacheStats,
    ExpirationPolicy,
};
#[cfg(feature = "foundation")]
pub use time::{Clock, MockClock, SystemClock};
#[cfg(feature = "foundation")]
pub use utils::serde::duration_millis;
