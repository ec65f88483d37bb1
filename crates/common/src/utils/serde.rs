//! Serialization utilities for configuration types
//!
//! Configuration files express durations as integer milliseconds
//! (`expiration_time_ms = 10000`), which keeps them readable in both TOML
//! and JSON without a custom duration grammar.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde adaptor storing a [`Duration`] as whole milliseconds (`u64`)
///
/// Sub-millisecond precision is truncated on serialization. Durations longer
/// than `u64::MAX` milliseconds saturate.
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use serde::{Deserialize, Serialize};
/// use sundry_common::duration_millis;
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     sweep_interval: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::{Deserialize, Deserializer, Duration, Serializer};

    /// Serde serialization result type
    type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

    /// Serialize a Duration as milliseconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
