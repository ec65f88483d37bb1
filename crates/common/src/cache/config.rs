//! Cache configuration types and builder patterns
//!
//! This module provides the expiration policy selector and the
//! configuration consumed by `CacheMap` constructors, including TOML
//! loading for services that keep cache tuning in a config file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{CacheError, CacheResult};
use crate::utils::serde::duration_millis;

/// Default time an entry may go untouched before it is stale
pub const DEFAULT_EXPIRATION_TIME: Duration = Duration::from_secs(10);

/// Default period between background sweeps under [`ExpirationPolicy::Live`]
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(10);

/// Default name given to the background sweeper thread
pub const DEFAULT_SWEEPER_THREAD_NAME: &str = "cache-sweeper";

/// How stale entries are found, fixed when the cache is built
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ExpirationPolicy {
    /// Staleness is checked inline by `get`; stale entries are reloaded in
    /// place, nothing is evicted proactively
    #[default]
    OnAccess,
    /// A background thread wakes every `sweep_interval` and evicts stale
    /// entries; `get` never checks staleness
    Live {
        /// Period between sweeps
        #[serde(
            rename = "sweep_interval_ms",
            with = "duration_millis",
            default = "default_sweep_interval"
        )]
        sweep_interval: Duration,
    },
}

const fn default_sweep_interval() -> Duration {
    DEFAULT_SWEEP_INTERVAL
}

impl ExpirationPolicy {
    /// Live policy with the default sweep interval
    pub const fn live() -> Self {
        Self::Live { sweep_interval: DEFAULT_SWEEP_INTERVAL }
    }

    /// Sweep interval, if this is the live policy
    pub const fn sweep_interval(&self) -> Option<Duration> {
        match self {
            Self::OnAccess => None,
            Self::Live { sweep_interval } => Some(*sweep_interval),
        }
    }

    /// Whether this policy runs a background sweeper
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live { .. })
    }
}

/// Configuration for cache behavior
///
/// # Example
/// ```
/// use sundry_common::cache::{CacheMapConfig, ExpirationPolicy};
///
/// let config = CacheMapConfig::from_toml_str(
///     r#"
///     expiration_time_ms = 30000
///
///     [policy]
///     mode = "live"
///     sweep_interval_ms = 5000
///     "#,
/// )
/// .unwrap();
///
/// assert!(config.policy.is_live());
/// assert_eq!(config.expiration_time.as_secs(), 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheMapConfig {
    /// Time an entry may go without a create, refresh or touch before it is
    /// stale
    #[serde(rename = "expiration_time_ms", with = "duration_millis")]
    pub expiration_time: Duration,

    /// Whether to collect hit/miss/refresh counters
    pub track_metrics: bool,

    /// Name of the sweeper thread (live policy only)
    pub sweeper_thread_name: String,

    /// Expiration policy
    pub policy: ExpirationPolicy,
}

impl Default for CacheMapConfig {
    fn default() -> Self {
        Self {
            expiration_time: DEFAULT_EXPIRATION_TIME,
            track_metrics: false,
            sweeper_thread_name: DEFAULT_SWEEPER_THREAD_NAME.to_string(),
            policy: ExpirationPolicy::OnAccess,
        }
    }
}

impl CacheMapConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheMapConfigBuilder {
        CacheMapConfigBuilder::default()
    }

    /// Quick preset for an on-access cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use sundry_common::cache::CacheMapConfig;
    ///
    /// let config = CacheMapConfig::on_access(Duration::from_secs(60));
    /// assert!(!config.policy.is_live());
    /// ```
    pub fn on_access(expiration_time: Duration) -> Self {
        Self { expiration_time, policy: ExpirationPolicy::OnAccess, ..Self::default() }
    }

    /// Quick preset for a live (background sweep) cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use sundry_common::cache::CacheMapConfig;
    ///
    /// let config = CacheMapConfig::live(Duration::from_secs(60), Duration::from_secs(5));
    /// assert_eq!(config.policy.sweep_interval(), Some(Duration::from_secs(5)));
    /// ```
    pub fn live(expiration_time: Duration, sweep_interval: Duration) -> Self {
        Self {
            expiration_time,
            policy: ExpirationPolicy::Live { sweep_interval },
            ..Self::default()
        }
    }

    /// Check invariants the cache relies on
    ///
    /// A zero expiration time is accepted and makes every access stale. A
    /// zero sweep interval would spin the sweeper and is rejected.
    pub fn validate(&self) -> CacheResult<()> {
        if let ExpirationPolicy::Live { sweep_interval } = self.policy {
            if sweep_interval.is_zero() {
                return Err(CacheError::invalid_config("sweep interval must be non-zero"));
            }
            if self.sweeper_thread_name.trim().is_empty() {
                return Err(CacheError::invalid_config("sweeper thread name must not be empty"));
            }
            if self.sweeper_thread_name.contains('\0') {
                return Err(CacheError::invalid_config(
                    "sweeper thread name must not contain NUL bytes",
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(source: &str) -> CacheResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> CacheResult<Self> {
        let source = std::fs::read_to_string(path.as_ref()).map_err(CacheError::ConfigIo)?;
        Self::from_toml_str(&source)
    }
}

/// Builder for CacheMapConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheMapConfigBuilder {
    config: CacheMapConfig,
}

impl CacheMapConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the expiration time
    pub fn expiration_time(mut self, duration: Duration) -> Self {
        self.config.expiration_time = duration;
        self
    }

    /// Select the on-access policy
    pub fn on_access(mut self) -> Self {
        self.config.policy = ExpirationPolicy::OnAccess;
        self
    }

    /// Select the live policy with the given sweep interval
    pub fn live(mut self, sweep_interval: Duration) -> Self {
        self.config.policy = ExpirationPolicy::Live { sweep_interval };
        self
    }

    /// Set the policy directly
    pub fn policy(mut self, policy: ExpirationPolicy) -> Self {
        self.config.policy = policy;
        self
    }

    /// Enable or disable metrics tracking
    pub fn track_metrics(mut self, enabled: bool) -> Self {
        self.config.track_metrics = enabled;
        self
    }

    /// Name the sweeper thread
    pub fn sweeper_thread_name(mut self, name: impl Into<String>) -> Self {
        self.config.sweeper_thread_name = name.into();
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheMapConfig {
        self.config
    }
}
