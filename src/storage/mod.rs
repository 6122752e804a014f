//! Storage Module
//!
//! The TTL store, the ordered index it keeps entries in, and the recycler
//! that sweeps expired entries and enforces the capacity limit.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          Store                              │
//! │   get / set / delete / set_max_records / len                │
//! │                                                             │
//! │   ┌─────────────────────────────────────────────────────┐   │
//! │   │        ScoreIndex (SortedSet by default)            │   │
//! │   │   key ──> (expire_at, value)   ordered by expire_at │   │
//! │   └─────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                            │
//!              ┌─────────────┴─────────────┐
//!              │         Recycler          │
//!              │  (Supervised Tokio Task)  │
//!              └───────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use refstore::storage::{SortedSet, ScoreIndex};
//! use refstore::Value;
//! use std::sync::Arc;
//!
//! let index = SortedSet::new();
//! index.add("soon".into(), 100, Value::pointer(Arc::new(1)));
//! index.add("later".into(), 200, Value::pointer(Arc::new(2)));
//!
//! assert_eq!(index.remove_by_score_at_most(150), 1);
//! assert!(index.get("later").is_some());
//! ```

pub mod index;
pub mod recycler;
pub mod sorted_set;
pub mod stats;
pub mod store;

// Re-export commonly used types
pub use index::{Score, ScoreIndex};
pub use recycler::{eviction_count, RecycleReport, Recycler};
pub use sorted_set::SortedSet;
pub use stats::StoreStats;
pub use store::{Store, StoreBuilder};
