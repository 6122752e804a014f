//! Clock Sources
//!
//! Expiry times are whole unix seconds. Rather than asking the OS for the
//! time on every `get` and `set`, the store reads a [`CachedClock`] that a
//! supervised task refreshes once per second. Readings can be up to one
//! refresh interval stale.
//!
//! Tests inject a [`ManualClock`] and move time forward explicitly.

use crate::supervisor::{FaultObserver, Schedule, SupervisedTask};
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the current time in unix seconds.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> i64;
}

/// Reads the system clock on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> i64 {
        unix_now()
    }
}

/// Returns the current system time in unix seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// A clock reading shared through an atomic and refreshed in the background.
///
/// Clones share the same reading.
#[derive(Debug, Clone)]
pub struct CachedClock {
    now: Arc<AtomicI64>,
}

impl Default for CachedClock {
    fn default() -> Self {
        Self::new()
    }
}

impl CachedClock {
    /// Creates a clock seeded with the current system time.
    pub fn new() -> Self {
        Self {
            now: Arc::new(AtomicI64::new(unix_now())),
        }
    }

    /// Re-reads the system clock.
    pub fn refresh(&self) {
        self.now.store(unix_now(), Ordering::Relaxed);
    }

    /// Starts the supervised refresh task.
    ///
    /// The task stops when the returned handle is dropped.
    pub fn start(&self, schedule: Schedule, observer: Option<FaultObserver>) -> SupervisedTask {
        let clock = self.clone();
        SupervisedTask::spawn("clock", schedule, observer, move || clock.refresh())
    }
}

impl Clock for CachedClock {
    #[inline]
    fn now(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Moves the clock forward by `secs` and returns the new reading.
    pub fn advance(&self, secs: i64) -> i64 {
        self.now.fetch_add(secs, Ordering::SeqCst) + secs
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
