//! Background Recycler
//!
//! Lazy expiry (checking `expire_at` on `get`) keeps expired entries
//! invisible, but an entry that is written and never read again would sit in
//! memory forever. The recycler fixes that and also enforces the capacity
//! limit.
//!
//! ## Each pass
//!
//! 1. **Expiry sweep**: remove every entry with `expire_at <= now`.
//! 2. **Capacity eviction**: if `len >= limit`, remove
//!    `(len - limit) + floor(limit * ratio)` entries with the lowest
//!    `expire_at`.
//!
//! Eviction removes a whole batch rather than just the overflow so that a
//! store sitting at its limit does not evict on every pass. Entries closest
//! to their natural expiry go first; access recency plays no part.
//!
//! The pass runs inside a [`SupervisedTask`]: if it panics, the task is
//! restarted after the recovery delay and callers of the store never see it.

use crate::clock::Clock;
use crate::storage::index::ScoreIndex;
use crate::storage::stats::Counters;
use crate::supervisor::{FaultObserver, Schedule, SupervisedTask};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// Outcome of one recycle pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecycleReport {
    /// Entries removed because they had expired
    pub expired: usize,
    /// Entries removed to get back under the limit
    pub evicted: usize,
    /// Entries left after the pass
    pub remaining: usize,
}

/// Number of entries to evict when `len` has reached `limit`.
///
/// Returns 0 below the limit.
pub fn eviction_count(len: usize, limit: usize, over_limit_ratio: f64) -> usize {
    if len < limit {
        return 0;
    }
    let batch = (limit as f64 * over_limit_ratio).floor() as usize;
    (len - limit) + batch
}

/// Sweeps expired entries and enforces the capacity limit.
pub struct Recycler {
    index: Arc<dyn ScoreIndex>,
    clock: Arc<dyn Clock>,
    limit: Arc<AtomicUsize>,
    over_limit_ratio: f64,
    counters: Arc<Counters>,
}

impl std::fmt::Debug for Recycler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Recycler")
            .field("limit", &self.limit.load(Ordering::Relaxed))
            .field("over_limit_ratio", &self.over_limit_ratio)
            .finish()
    }
}

impl Recycler {
    pub(crate) fn new(
        index: Arc<dyn ScoreIndex>,
        clock: Arc<dyn Clock>,
        limit: Arc<AtomicUsize>,
        over_limit_ratio: f64,
        counters: Arc<Counters>,
    ) -> Self {
        Self {
            index,
            clock,
            limit,
            over_limit_ratio,
            counters,
        }
    }

    /// Runs one pass synchronously.
    pub fn run_cycle(&self) -> RecycleReport {
        let now = self.clock.now();
        let expired = self.index.remove_by_score_at_most(now);

        let limit = self.limit.load(Ordering::Relaxed);
        let len = self.index.len();
        let to_evict = eviction_count(len, limit, self.over_limit_ratio);
        let evicted = if to_evict > 0 {
            self.index.remove_lowest_by_rank(to_evict)
        } else {
            0
        };

        Counters::bump(&self.counters.expired, expired as u64);
        Counters::bump(&self.counters.evicted, evicted as u64);
        Counters::bump(&self.counters.recycles, 1);

        let report = RecycleReport {
            expired,
            evicted,
            remaining: self.index.len(),
        };

        if expired > 0 || evicted > 0 {
            debug!(
                expired = report.expired,
                evicted = report.evicted,
                remaining = report.remaining,
                limit = limit,
                "Recycled entries"
            );
        } else {
            trace!(
                remaining = report.remaining,
                "Recycle pass found nothing to remove"
            );
        }

        report
    }

    /// Starts the supervised background task running [`run_cycle`](Self::run_cycle).
    pub fn start(
        self: &Arc<Self>,
        schedule: Schedule,
        observer: Option<FaultObserver>,
    ) -> SupervisedTask {
        let recycler = Arc::clone(self);
        SupervisedTask::spawn("recycler", schedule, observer, move || {
            recycler.run_cycle();
        })
    }
}
