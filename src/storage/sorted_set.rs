//! Default [`ScoreIndex`] implementation.
//!
//! A `HashMap` gives point lookups and a `BTreeSet` of `(score, key)` pairs
//! keeps entries in score order. Both live behind one `RwLock` so they never
//! disagree. Ties on score are broken by key, which keeps eviction
//! deterministic.

use crate::storage::index::{Score, ScoreIndex};
use crate::value::Value;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Default)]
struct Inner {
    entries: HashMap<String, (Score, Value)>,
    order: BTreeSet<(Score, String)>,
}

impl Inner {
    fn remove(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some((score, _)) => {
                self.order.remove(&(score, key.to_string()));
                true
            }
            None => false,
        }
    }

    /// Pops the lowest entry if `keep_going` accepts its score.
    fn pop_lowest_if(&mut self, keep_going: impl Fn(Score) -> bool) -> bool {
        match self.order.first() {
            Some((score, _)) if keep_going(*score) => {}
            _ => return false,
        }
        if let Some((_, key)) = self.order.pop_first() {
            self.entries.remove(&key);
            return true;
        }
        false
    }
}

/// Thread-safe map from key to `(score, value)`, ordered by score.
#[derive(Default)]
pub struct SortedSet {
    inner: RwLock<Inner>,
}

impl fmt::Debug for SortedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortedSet").field("len", &self.len()).finish()
    }
}

impl SortedSet {
    pub fn new() -> Self {
        Self::default()
    }

    // A panic elsewhere while holding the lock must not take the index down
    // with it, so poisoning is ignored. Every mutation keeps both
    // structures consistent before it can panic.
    fn read(&self) -> RwLockReadGuard<'_, Inner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the lowest score in the set.
    pub fn min_score(&self) -> Option<Score> {
        self.read().order.first().map(|(score, _)| *score)
    }

    /// Returns up to `n` keys in ascending score order.
    pub fn lowest_keys(&self, n: usize) -> Vec<String> {
        self.read()
            .order
            .iter()
            .take(n)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

impl ScoreIndex for SortedSet {
    fn get(&self, key: &str) -> Option<(Score, Value)> {
        self.read().entries.get(key).cloned()
    }

    fn add(&self, key: String, score: Score, value: Value) {
        let mut inner = self.write();
        let old_score = inner.entries.get(&key).map(|(score, _)| *score);
        if let Some(old_score) = old_score {
            inner.order.remove(&(old_score, key.clone()));
        }
        inner.order.insert((score, key.clone()));
        inner.entries.insert(key, (score, value));
    }

    fn remove(&self, key: &str) -> bool {
        self.write().remove(key)
    }

    fn remove_by_score_at_most(&self, threshold: Score) -> usize {
        let mut inner = self.write();
        let mut removed = 0;
        while inner.pop_lowest_if(|score| score <= threshold) {
            removed += 1;
        }
        removed
    }

    fn remove_lowest_by_rank(&self, n: usize) -> usize {
        let mut inner = self.write();
        let mut removed = 0;
        while removed < n && inner.pop_lowest_if(|_| true) {
            removed += 1;
        }
        removed
    }

    fn len(&self) -> usize {
        self.read().entries.len()
    }
}
