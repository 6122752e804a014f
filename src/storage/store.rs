//! TTL Reference Store
//!
//! The public face of the crate. Every entry lives in one [`ScoreIndex`]
//! keyed by string and scored by its expiry time in unix seconds.
//!
//! ## Expiry
//!
//! An entry is live while `expire_at > now`. Liveness is never stored, it is
//! worked out on every read, so an expired entry disappears from `get` the
//! moment the clock passes it even though the recycler may not have removed
//! it yet. [`Store::len`] counts physical entries and can include those.
//!
//! ## Concurrency
//!
//! `Store` is `Send + Sync` and is meant to be shared behind an `Arc`. It
//! holds no locks itself; each operation is a single call into the index,
//! and concurrent writers to the same key resolve last-writer-wins.
//!
//! ```text
//!   callers ──get/set/delete──┐
//!                             ▼
//!                    ┌─────────────────┐      ┌──────────────┐
//!                    │   ScoreIndex    │◄─────│   Recycler   │ every 5s
//!                    └─────────────────┘      └──────────────┘
//!                             ▲                      │
//!                             └───── now() ──── CachedClock ◄── every 1s
//! ```

use crate::clock::{CachedClock, Clock, SystemClock};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::storage::index::ScoreIndex;
use crate::storage::recycler::{RecycleReport, Recycler};
use crate::storage::sorted_set::SortedSet;
use crate::storage::stats::{Counters, StoreStats};
use crate::supervisor::{FaultObserver, Schedule, SupervisedTask};
use crate::value::Value;
use std::any::Any;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::warn;

/// An in-process key/value store for short-lived shared handles.
///
/// # Example
///
/// ```
/// use refstore::{Store, Value};
/// use std::sync::Arc;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = Store::new();
///
/// let token = Arc::new(String::from("a1b2c3"));
/// store.set("session:42", Value::pointer(token), 300).unwrap();
///
/// let (value, ttl) = store.get("session:42").unwrap();
/// assert_eq!(*value.downcast::<String>().unwrap(), "a1b2c3");
/// assert!(ttl > 0 && ttl <= 300);
///
/// // Bare scalars are rejected.
/// assert!(store.set("count", 10i64, 60).is_err());
/// # }
/// ```
pub struct Store {
    index: Arc<dyn ScoreIndex>,
    clock: Arc<dyn Clock>,
    limit: Arc<AtomicUsize>,
    config: StoreConfig,
    counters: Arc<Counters>,
    recycler: Arc<Recycler>,
    tasks: Vec<SupervisedTask>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("len", &self.index.len())
            .field("limit", &self.limit.load(Ordering::Relaxed))
            .field("clock", &self.clock)
            .field("tasks", &self.tasks)
            .finish()
    }
}

impl Store {
    /// Creates a store with the default configuration and starts its
    /// background tasks.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime context. The store needs
    /// a runtime to spawn the recycler and clock tasks; use
    /// [`StoreBuilder::background_tasks`] to build one without.
    pub fn new() -> Self {
        StoreBuilder::new().assemble()
    }

    /// Creates a store with the default configuration and an initial limit.
    ///
    /// The limit is clamped the same way as [`Store::set_max_records`].
    pub fn with_limit(limit: usize) -> Self {
        let store = Self::new();
        store.set_max_records(limit);
        store
    }

    /// Creates a store from a validated configuration.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        StoreBuilder::new().config(config).build()
    }

    pub fn builder() -> StoreBuilder {
        StoreBuilder::new()
    }

    /// Sets the capacity limit the recycler enforces.
    ///
    /// Values below `min_records` are raised to it and values above
    /// `max_records` are lowered to it, so eviction can never be switched
    /// off by passing a tiny limit.
    pub fn set_max_records(&self, limit: usize) {
        let clamped = limit.clamp(self.config.min_records, self.config.max_records);
        if clamped != limit {
            warn!(
                requested = limit,
                applied = clamped,
                "Record limit clamped to configured bounds"
            );
        }
        self.limit.store(clamped, Ordering::Relaxed);
    }

    /// Current capacity limit.
    pub fn max_records(&self) -> usize {
        self.limit.load(Ordering::Relaxed)
    }

    /// Looks up a live entry.
    ///
    /// Returns the value and the remaining TTL in seconds, or `None` if the
    /// key is absent or has expired.
    pub fn get(&self, key: &str) -> Option<(Value, i64)> {
        Counters::bump(&self.counters.gets, 1);

        let now = self.clock.now();
        match self.index.get(key) {
            Some((expire_at, value)) if expire_at > now => {
                Counters::bump(&self.counters.hits, 1);
                Some((value, expire_at - now))
            }
            _ => None,
        }
    }

    /// Looks up a live pointer entry and downcasts it to `T`.
    ///
    /// Returns `None` if the key is absent, expired, or holds another type.
    pub fn get_as<T: Any + Send + Sync>(&self, key: &str) -> Option<(Arc<T>, i64)> {
        let (value, ttl) = self.get(key)?;
        value.downcast::<T>().map(|v| (v, ttl))
    }

    /// Stores `value` under `key` for `ttl_secs` seconds.
    ///
    /// - `ttl_secs` above `max_ttl_secs` is lowered to it.
    /// - `ttl_secs == 0` keeps the remaining TTL of a live entry (the value is
    ///   still replaced), or applies `default_ttl_secs` if there is none.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidValue`] for [`Value::Nil`]
    /// - [`StoreError::InvalidTtl`] for a negative TTL
    /// - [`StoreError::UnsupportedType`] for a scalar value
    ///
    /// On error the store is not modified.
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<Value>,
        ttl_secs: i64,
    ) -> Result<()> {
        let value = value.into();
        if matches!(value, Value::Nil) {
            return Err(StoreError::InvalidValue);
        }
        if ttl_secs < 0 {
            return Err(StoreError::InvalidTtl(ttl_secs));
        }
        if !value.is_reference() {
            return Err(StoreError::UnsupportedType(value.kind_name()));
        }

        let key = key.into();
        let ttl_secs = ttl_secs.min(self.config.max_ttl_secs);
        let now = self.clock.now();

        let expire_at = if ttl_secs == 0 {
            self.index
                .get(&key)
                .map(|(expire_at, _)| expire_at)
                .filter(|expire_at| *expire_at > now)
                .unwrap_or(now + self.config.default_ttl_secs)
        } else {
            now + ttl_secs
        };

        self.index.add(key, expire_at, value);
        Counters::bump(&self.counters.sets, 1);
        Ok(())
    }

    /// Removes `key`. Removing a missing key is not an error.
    pub fn delete(&self, key: &str) {
        Counters::bump(&self.counters.deletes, 1);
        self.index.remove(key);
    }

    /// Number of physical entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Runs one recycle pass now, in the calling thread.
    pub fn recycle_now(&self) -> RecycleReport {
        self.recycler.run_cycle()
    }

    pub fn stats(&self) -> StoreStats {
        self.counters.snapshot(self.len(), self.max_records())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Handles of the running background tasks.
    pub fn tasks(&self) -> &[SupervisedTask] {
        &self.tasks
    }

    /// Stops the background tasks. Dropping the store does the same.
    ///
    /// The store stays usable; expired entries are then only removed by
    /// [`Store::recycle_now`].
    pub fn shutdown(&self) {
        for task in &self.tasks {
            task.stop();
        }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}

/// Assembles a [`Store`] from its parts.
///
/// ```
/// use refstore::{ManualClock, Store, StoreConfig};
/// use std::sync::Arc;
///
/// let clock = Arc::new(ManualClock::new(1_000));
/// let store = Store::builder()
///     .config(StoreConfig::default().with_min_records(10))
///     .clock(clock.clone())
///     .background_tasks(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(store.len(), 0);
/// ```
pub struct StoreBuilder {
    config: StoreConfig,
    clock: Option<Arc<dyn Clock>>,
    index: Option<Arc<dyn ScoreIndex>>,
    observer: Option<FaultObserver>,
    background_tasks: bool,
}

impl Default for StoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StoreBuilder {
    pub fn new() -> Self {
        Self {
            config: StoreConfig::default(),
            clock: None,
            index: None,
            observer: None,
            background_tasks: true,
        }
    }

    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Uses `clock` instead of the background-refreshed [`CachedClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Uses `index` instead of a fresh [`SortedSet`].
    pub fn index(mut self, index: Arc<dyn ScoreIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Called whenever a background task panics.
    pub fn on_fault(mut self, observer: FaultObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Whether to spawn the recycler and clock tasks (default: `true`).
    ///
    /// Without them no Tokio runtime is needed, time is read from the system
    /// clock unless one is injected, and sweeping only happens through
    /// [`Store::recycle_now`].
    pub fn background_tasks(mut self, enabled: bool) -> Self {
        self.background_tasks = enabled;
        self
    }

    /// Validates the configuration and builds the store.
    pub fn build(self) -> Result<Store> {
        self.config.validate()?;
        Ok(self.assemble())
    }

    fn assemble(self) -> Store {
        let config = self.config;
        let mut tasks = Vec::new();

        let clock: Arc<dyn Clock> = match (self.clock, self.background_tasks) {
            (Some(clock), _) => clock,
            (None, true) => {
                let clock = CachedClock::new();
                let schedule = Schedule {
                    every: config.clock_refresh_interval,
                    recovery_delay: config.clock_recovery_delay,
                };
                tasks.push(clock.start(schedule, self.observer.clone()));
                Arc::new(clock)
            }
            (None, false) => Arc::new(SystemClock),
        };

        let index = self
            .index
            .unwrap_or_else(|| Arc::new(SortedSet::new()) as Arc<dyn ScoreIndex>);
        let limit = Arc::new(AtomicUsize::new(config.max_records));
        let counters = Arc::new(Counters::default());

        let recycler = Arc::new(Recycler::new(
            Arc::clone(&index),
            Arc::clone(&clock),
            Arc::clone(&limit),
            config.recycle_over_limit_ratio,
            Arc::clone(&counters),
        ));

        if self.background_tasks {
            let schedule = Schedule {
                every: config.recycle_interval,
                recovery_delay: config.recycle_recovery_delay,
            };
            tasks.push(recycler.start(schedule, self.observer));
        }

        Store {
            index,
            clock,
            limit,
            config,
            counters,
            recycler,
            tasks,
        }
    }
}
