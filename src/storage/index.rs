//! Ordered Score Index
//!
//! The store keeps every entry in a single index that is both a keyed map and
//! a min-ordered sequence by score. The score is the entry's expiry time, so
//! "remove everything with score <= now" is the expiry sweep and "remove the
//! N lowest scores" is capacity eviction.
//!
//! Implementations must be safe to call from many threads at once; the store
//! adds no locking of its own.

use crate::value::Value;

/// Expiry timestamp in unix seconds.
pub type Score = i64;

/// Keyed, score-ordered storage consumed by the store and the recycler.
pub trait ScoreIndex: Send + Sync {
    /// Returns the score and value stored under `key`.
    fn get(&self, key: &str) -> Option<(Score, Value)>;

    /// Inserts or replaces the entry for `key`.
    fn add(&self, key: String, score: Score, value: Value);

    /// Removes `key`. Returns `true` if it was present.
    fn remove(&self, key: &str) -> bool;

    /// Removes every entry whose score is `<= threshold`.
    ///
    /// Returns the number of removed entries.
    fn remove_by_score_at_most(&self, threshold: Score) -> usize;

    /// Removes the `n` entries with the lowest scores.
    ///
    /// Returns the number of removed entries, which is less than `n` only if
    /// the index held fewer entries.
    fn remove_lowest_by_rank(&self, n: usize) -> usize;

    /// Number of entries, expired or not.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
