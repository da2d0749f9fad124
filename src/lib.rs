//! # `PavlTree`
//!
//! A concurrent ordered set backed by an AVL tree.
//!
//! Reads and removals run without locks. Insertion descends without locks,
//! then links the new node and rebalances under a single writer lock:
//! - Lock-free `contains` and `remove` (removal leaves a tombstone)
//! - Optimistic `add`: unlocked descent, locked re-validation and attach
//! - AVL rebalancing with single and double rotations
//! - Elements are identified by an `i32` key derived from each value
//!
//! ## Status
//!
//! | Feature | Status |
//! |---------|--------|
//! | Concurrent contains | Works (lock-free) |
//! | Concurrent remove | Works (lock-free, tombstone) |
//! | Concurrent add | Works (optimistic descent + writer lock) |
//! | Ordered queries | Works (min/max, successor/predecessor, iteration) |
//! | Memory reclamation | None (tombstones and nodes live until drop) |
//! | Linearizable reads | No (see below) |
//!
//! ## Thread Safety
//!
//! `AvlSet<T>` is `Send + Sync` regardless of `T`: values are never stored,
//! only their keys. Share it behind an `Arc` or a scoped borrow:
//!
//! ```rust
//! use pavltree::AvlSet;
//! use std::thread;
//!
//! let set: AvlSet<i32> = AvlSet::new();
//!
//! thread::scope(|s| {
//!     for t in 0..4 {
//!         let set = &set;
//!         s.spawn(move || {
//!             for v in (t * 100)..((t + 1) * 100) {
//!                 set.add(&v);
//!             }
//!         });
//!     }
//! });
//!
//! assert_eq!(set.len(), 400);
//! assert_eq!(set.min_key(), Some(0));
//! ```
//!
//! A reader racing a rotation can transiently miss a present key. It never
//! reports a key that was not added.
//!
//! ## Key Constraints
//!
//! - Every value maps to an `i32` key through a [`KeyFn`]. The default,
//!   [`NaturalKey`], uses [`OrderKey`], implemented for the 32-bit-or-smaller
//!   integers, `char` and `bool`.
//! - Values with the same key are the same element. There is no collision
//!   resolution.
//!
//! ## Consistency Checking
//!
//! [`AvlSet::check`] and [`AvlSet::verify`] walk the whole tree and validate
//! ordering, parent links, cached heights and balance factors. They take
//! `&mut self`, so they only run once concurrent users are gone.

#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
// Hot-path accessors on atomics; inlining is forced on purpose.
#![allow(clippy::inline_always)]

pub mod key;
pub mod lock;
mod node;
pub mod ordering;
pub mod spinlock;
mod tracing_helpers;
pub mod tree;

// Re-export main types for convenience
pub use key::{KeyFn, NaturalKey, OrderKey};
pub use lock::WriterLock;
pub use node::Side;
pub use spinlock::{SpinGuard, SpinMutex};
pub use tree::{AvlSet, InvariantViolation, Keys, ParkingAvlSet};
