//! Cache utilities for monitoring and diagnostics
//!
//! Health checks built on [`CacheStats`] snapshots. They are only useful on
//! caches built with `track_metrics(true)`; otherwise every counter except
//! `sweeps` reads zero and the report is trivially healthy.

use std::fmt;
use std::hash::Hash;

use tracing::{info, warn};

use super::{CacheMap, CacheStats};
use crate::time::Clock;

/// Minimum accesses before the hit rate is judged
const MIN_ACCESSES_FOR_RATES: u64 = 100;

/// Cache health status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheHealth {
    /// Cache is operating normally
    Healthy,
    /// Most reads miss or reload, the loader is doing the work
    LowHitRate,
    /// Entries go stale faster than they are reused
    HighChurn,
    /// Both low hit rate and high churn
    Critical,
}

impl fmt::Display for CacheHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Healthy => write!(f, "Healthy"),
            Self::LowHitRate => write!(f, "Low Hit Rate"),
            Self::HighChurn => write!(f, "High Churn"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// Cache health report with diagnostics
#[derive(Debug, Clone)]
pub struct CacheHealthReport {
    /// Overall health status
    pub health: CacheHealth,
    /// Statistics the report was computed from
    pub stats: CacheStats,
    /// Recommendations for tuning
    pub recommendations: Vec<String>,
}

impl CacheHealthReport {
    /// Generate a health report for a cache
    ///
    /// # Thresholds
    /// - Low hit rate: < 50% over more than 100 accesses
    /// - High churn: stale reloads plus expirations above 30% of accesses
    ///
    /// # Example
    /// ```
    /// use sundry_common::cache::utils::CacheHealthReport;
    /// use sundry_common::cache::{CacheMap, CacheMapConfig};
    ///
    /// let config = CacheMapConfig::builder().track_metrics(true).build();
    /// let cache = CacheMap::new(config, |key: &u32| *key).unwrap();
    /// cache.get(&1);
    ///
    /// let report = CacheHealthReport::new(&cache);
    /// println!("{}", report);
    /// ```
    pub fn new<K, V, E, C>(cache: &CacheMap<K, V, E, C>) -> Self
    where
        K: Eq + Hash + Clone + Send + 'static,
        V: Clone + Send + 'static,
        E: 'static,
        C: Clock,
    {
        Self::from_stats(cache.stats())
    }

    /// Generate a report from a stats snapshot
    pub fn from_stats(stats: CacheStats) -> Self {
        let mut recommendations = Vec::new();
        let accesses = stats.total_accesses();

        let low_hit_rate = accesses > MIN_ACCESSES_FOR_RATES && stats.hit_rate() < 0.5;
        if low_hit_rate {
            recommendations.push(format!(
                "Hit rate is {:.2}%. Consider a longer expiration time.",
                stats.hit_rate() * 100.0
            ));
        }

        let churn_rate = if accesses == 0 {
            0.0
        } else {
            (stats.refreshes + stats.expirations) as f64 / accesses as f64
        };
        let high_churn = churn_rate > 0.3;
        if high_churn {
            recommendations.push(format!(
                "High churn: {:.2}% of accesses reloaded or expired. Entries go stale before \
                 they are reused.",
                churn_rate * 100.0
            ));
        }

        if stats.load_failures > 0 {
            recommendations.push(format!(
                "Loader failed {} time(s). Failed keys are reloaded on every read.",
                stats.load_failures
            ));
        }

        let health = match (low_hit_rate, high_churn) {
            (true, true) => CacheHealth::Critical,
            (true, false) => CacheHealth::LowHitRate,
            (false, true) => CacheHealth::HighChurn,
            (false, false) => CacheHealth::Healthy,
        };

        Self { health, stats, recommendations }
    }

    /// Log the health report using tracing
    pub fn log_summary(&self) {
        match self.health {
            CacheHealth::Healthy => {
                info!(
                    health = %self.health,
                    hit_rate = self.stats.hit_rate(),
                    size = self.stats.size,
                    "Cache health check: Healthy"
                );
            }
            CacheHealth::LowHitRate | CacheHealth::HighChurn | CacheHealth::Critical => {
                warn!(
                    health = %self.health,
                    hit_rate = self.stats.hit_rate(),
                    size = self.stats.size,
                    refreshes = self.stats.refreshes,
                    expirations = self.stats.expirations,
                    "Cache health check: Issues detected"
                );
                for rec in &self.recommendations {
                    warn!(recommendation = %rec, "Cache tuning recommendation");
                }
            }
        }
    }
}

impl fmt::Display for CacheHealthReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cache Health Report")?;
        writeln!(f, "===================")?;
        writeln!(f, "Status: {}", self.health)?;
        writeln!(f)?;
        writeln!(f, "Statistics:")?;
        writeln!(f, "  Size: {}", self.stats.size)?;
        writeln!(f, "  Hits: {}", self.stats.hits)?;
        writeln!(f, "  Misses: {}", self.stats.misses)?;
        writeln!(f, "  Refreshes: {}", self.stats.refreshes)?;
        writeln!(f, "  Hit Rate: {:.2}%", self.stats.hit_rate() * 100.0)?;
        writeln!(f, "  Expirations: {}", self.stats.expirations)?;
        writeln!(f, "  Sweeps: {}", self.stats.sweeps)?;

        if !self.recommendations.is_empty() {
            writeln!(f)?;
            writeln!(f, "Recommendations:")?;
            for (i, rec) in self.recommendations.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, rec)?;
            }
        }

        Ok(())
    }
}
