//! # refstore - An In-Process Reference Store with Expiry
//!
//! refstore holds short-lived shared handles (session tokens, pending
//! verification codes, transient computation results) under string keys.
//! Every entry has a TTL, and the total number of entries is capped so
//! memory stays bounded under sustained load.
//!
//! It is not a general-purpose cache: there is no persistence, no sharing
//! between processes, and no eviction policy other than expiry order.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                               Store                                 │
//! │                                                                     │
//! │   get / set / delete ──────────> ┌──────────────────────────────┐   │
//! │                                  │  ScoreIndex                  │   │
//! │                                  │  key -> (expire_at, value)   │   │
//! │                                  │  ordered by expire_at        │   │
//! │                                  └──────────────────────────────┘   │
//! │                                          ▲                          │
//! │                                          │ sweep + evict            │
//! │   ┌─────────────────────┐      ┌─────────┴──────────┐               │
//! │   │ CachedClock         │ now  │ Recycler           │               │
//! │   │ (Supervised, 1s)    │─────>│ (Supervised, 5s)   │               │
//! │   └─────────────────────┘      └────────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use refstore::{Store, Value};
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Session {
//!     user_id: u64,
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let store = Store::new();
//! store.set_max_records(50_000);
//!
//! store.set("sess:abc", Arc::new(Session { user_id: 7 }), 600).unwrap();
//!
//! let (session, ttl) = store.get_as::<Session>("sess:abc").unwrap();
//! assert_eq!(session.user_id, 7);
//! assert!(ttl <= 600);
//!
//! store.delete("sess:abc");
//! assert!(store.get("sess:abc").is_none());
//! # }
//! ```
//!
//! ## Design Highlights
//!
//! ### Reference Values Only
//!
//! Values are [`Value`]s wrapping an `Arc`: a pointer, a slice or a map. The
//! store hands back the same allocation it was given, so mutation through
//! the handle is visible to later readers. Scalars are rejected with
//! [`StoreError::UnsupportedType`].
//!
//! ### Lazy + Active Expiry
//!
//! 1. **Lazy**: `get` compares the entry's expiry with the clock and treats
//!    an expired entry as absent.
//! 2. **Active**: the [`Recycler`](storage::Recycler) removes expired entries
//!    every few seconds, then evicts the soonest-to-expire entries if the
//!    store is over its limit.
//!
//! ### Amortized Clock
//!
//! The store reads a [`CachedClock`] refreshed once per second instead of the
//! system clock, trading up to a second of staleness for one clock read per
//! second regardless of load.
//!
//! ### Self-Healing Background Work
//!
//! The recycler and the clock refresher are [`SupervisedTask`]s: a panic in
//! one pass is logged, reported to an optional observer, and the task is
//! restarted after a delay. Both stop when the store is dropped.
//!
//! ## Module Overview
//!
//! - [`storage`]: the store, its score index and the recycler
//! - [`clock`]: clock sources
//! - [`supervisor`]: supervised periodic tasks
//! - [`value`]: the reference value wrapper
//! - [`config`]: limits and timings
//! - [`error`]: error types

pub mod clock;
pub mod config;
pub mod error;
pub mod storage;
pub mod supervisor;
pub mod value;

// Re-export commonly used types for convenience
pub use clock::{CachedClock, Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use storage::{RecycleReport, ScoreIndex, SortedSet, Store, StoreBuilder, StoreStats};
pub use supervisor::{FaultObserver, SupervisedTask, TaskFault, TaskState};
pub use value::{Scalar, Value};

/// Version of refstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
