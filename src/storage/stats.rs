//! Operation counters shared by the store and its recycler.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub(crate) struct Counters {
    pub(crate) gets: AtomicU64,
    pub(crate) hits: AtomicU64,
    pub(crate) sets: AtomicU64,
    pub(crate) deletes: AtomicU64,
    pub(crate) expired: AtomicU64,
    pub(crate) evicted: AtomicU64,
    pub(crate) recycles: AtomicU64,
}

impl Counters {
    #[inline]
    pub(crate) fn bump(counter: &AtomicU64, by: u64) {
        counter.fetch_add(by, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, entries: usize, limit: usize) -> StoreStats {
        let gets = self.gets.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed);
        StoreStats {
            entries,
            limit,
            get_ops: gets,
            hits,
            misses: gets.saturating_sub(hits),
            set_ops: self.sets.load(Ordering::Relaxed),
            del_ops: self.deletes.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            evicted: self.evicted.load(Ordering::Relaxed),
            recycles: self.recycles.load(Ordering::Relaxed),
        }
    }
}

/// Store statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreStats {
    /// Entries physically held, including expired ones not yet swept
    pub entries: usize,
    /// Current capacity limit
    pub limit: usize,
    /// Total GET operations
    pub get_ops: u64,
    /// GETs that found a live entry
    pub hits: u64,
    /// GETs that found nothing or an expired entry
    pub misses: u64,
    /// Successful SET operations
    pub set_ops: u64,
    /// Total DELETE operations
    pub del_ops: u64,
    /// Entries removed by expiry sweeps
    pub expired: u64,
    /// Entries removed by capacity eviction
    pub evicted: u64,
    /// Completed recycle passes
    pub recycles: u64,
}
