//! Store Configuration
//!
//! All limits and background-task timings live in [`StoreConfig`]. The
//! defaults are the values the store was tuned with: a one million entry
//! ceiling, two hour maximum TTL, and a recycle pass every five seconds.

use crate::error::{Result, StoreError};
use std::time::Duration;

/// Hard ceiling on the number of entries.
pub const MAX_RECORDS: usize = 1_000_000;

/// Floor for [`Store::set_max_records`](crate::Store::set_max_records).
pub const MIN_RECORDS: usize = 10_000;

/// Longest TTL a single entry can have.
pub const MAX_TTL_SECS: i64 = 7200;

/// TTL applied when `set` is called with `0` on a missing or expired key.
pub const DEFAULT_TTL_SECS: i64 = 30;

/// Seconds between recycle passes.
pub const RECYCLE_INTERVAL_SECS: u64 = 5;

/// Fraction of the limit evicted on top of the overflow.
pub const RECYCLE_OVER_LIMIT_RATIO: f64 = 0.5;

/// Seconds a faulted recycler waits before restarting.
pub const RECYCLE_RECOVERY_DELAY_SECS: u64 = 60;

/// Configuration for a [`Store`](crate::Store).
///
/// # Example
///
/// ```
/// use refstore::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_min_records(10)
///     .with_max_records(1_000)
///     .with_recycle_interval(Duration::from_millis(250));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Initial limit and hard ceiling for the number of entries
    pub max_records: usize,

    /// Smallest limit `set_max_records` will accept
    pub min_records: usize,

    /// Per-entry TTL ceiling in seconds
    pub max_ttl_secs: i64,

    /// TTL used by `set(key, value, 0)` when no live entry exists
    pub default_ttl_secs: i64,

    /// Time between recycle passes (default: 5s)
    pub recycle_interval: Duration,

    /// Extra fraction of the limit evicted when over capacity (default: 0.5)
    pub recycle_over_limit_ratio: f64,

    /// Delay before a panicked recycler is restarted (default: 60s)
    pub recycle_recovery_delay: Duration,

    /// Time between clock refreshes (default: 1s)
    pub clock_refresh_interval: Duration,

    /// Delay before a panicked clock refresher is restarted (default: 1s)
    pub clock_recovery_delay: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_records: MAX_RECORDS,
            min_records: MIN_RECORDS,
            max_ttl_secs: MAX_TTL_SECS,
            default_ttl_secs: DEFAULT_TTL_SECS,
            recycle_interval: Duration::from_secs(RECYCLE_INTERVAL_SECS),
            recycle_over_limit_ratio: RECYCLE_OVER_LIMIT_RATIO,
            recycle_recovery_delay: Duration::from_secs(RECYCLE_RECOVERY_DELAY_SECS),
            clock_refresh_interval: Duration::from_secs(1),
            clock_recovery_delay: Duration::from_secs(1),
        }
    }
}

impl StoreConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_records(mut self, max_records: usize) -> Self {
        self.max_records = max_records;
        self
    }

    pub fn with_min_records(mut self, min_records: usize) -> Self {
        self.min_records = min_records;
        self
    }

    pub fn with_max_ttl_secs(mut self, secs: i64) -> Self {
        self.max_ttl_secs = secs;
        self
    }

    pub fn with_default_ttl_secs(mut self, secs: i64) -> Self {
        self.default_ttl_secs = secs;
        self
    }

    pub fn with_recycle_interval(mut self, interval: Duration) -> Self {
        self.recycle_interval = interval;
        self
    }

    pub fn with_recycle_over_limit_ratio(mut self, ratio: f64) -> Self {
        self.recycle_over_limit_ratio = ratio;
        self
    }

    pub fn with_recycle_recovery_delay(mut self, delay: Duration) -> Self {
        self.recycle_recovery_delay = delay;
        self
    }

    pub fn with_clock_refresh_interval(mut self, interval: Duration) -> Self {
        self.clock_refresh_interval = interval;
        self
    }

    pub fn with_clock_recovery_delay(mut self, delay: Duration) -> Self {
        self.clock_recovery_delay = delay;
        self
    }

    /// Checks that the values are usable together.
    pub fn validate(&self) -> Result<()> {
        if self.min_records == 0 {
            return Err(invalid("min_records must be at least 1"));
        }
        if self.min_records > self.max_records {
            return Err(invalid(format!(
                "min_records ({}) exceeds max_records ({})",
                self.min_records, self.max_records
            )));
        }
        if self.max_ttl_secs <= 0 {
            return Err(invalid("max_ttl_secs must be positive"));
        }
        if self.default_ttl_secs <= 0 {
            return Err(invalid("default_ttl_secs must be positive"));
        }
        if !self.recycle_over_limit_ratio.is_finite()
            || !(0.0..=1.0).contains(&self.recycle_over_limit_ratio)
        {
            return Err(invalid(format!(
                "recycle_over_limit_ratio must be within [0, 1], got {}",
                self.recycle_over_limit_ratio
            )));
        }
        if self.recycle_interval.is_zero() || self.clock_refresh_interval.is_zero() {
            return Err(invalid("background intervals must be non-zero"));
        }
        Ok(())
    }
}

fn invalid(msg: impl Into<String>) -> StoreError {
    StoreError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = StoreConfig::default();
        assert_eq!(config.max_records, 1_000_000);
        assert_eq!(config.min_records, 10_000);
        assert_eq!(config.max_ttl_secs, 7200);
        assert_eq!(config.default_ttl_secs, 30);
        assert_eq!(config.recycle_interval, Duration::from_secs(5));
        assert_eq!(config.recycle_recovery_delay, Duration::from_secs(60));
        assert_eq!(config.recycle_over_limit_ratio, 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_chaining() {
        let config = StoreConfig::new()
            .with_max_records(500)
            .with_min_records(5)
            .with_max_ttl_secs(60)
            .with_default_ttl_secs(10)
            .with_recycle_over_limit_ratio(0.25);

        assert_eq!(config.max_records, 500);
        assert_eq!(config.min_records, 5);
        assert_eq!(config.max_ttl_secs, 60);
        assert_eq!(config.default_ttl_secs, 10);
        assert_eq!(config.recycle_over_limit_ratio, 0.25);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let bad = [
            StoreConfig::default().with_min_records(0),
            StoreConfig::default().with_max_records(10).with_min_records(20),
            StoreConfig::default().with_max_ttl_secs(0),
            StoreConfig::default().with_default_ttl_secs(-1),
            StoreConfig::default().with_recycle_over_limit_ratio(1.5),
            StoreConfig::default().with_recycle_over_limit_ratio(f64::NAN),
            StoreConfig::default().with_recycle_interval(Duration::ZERO),
        ];

        for config in bad {
            assert!(
                matches!(config.validate(), Err(StoreError::InvalidConfig(_))),
                "expected {:?} to be rejected",
                config
            );
        }
    }
}
