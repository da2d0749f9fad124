//! Filepath: src/tree.rs
//! `AvlSet` - a concurrent AVL ordered set.
//!
//! This module provides the main [`AvlSet`] type and the
//! [`InvariantViolation`] error reported by its consistency checker.

use std::fmt as StdFmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use crate::key::{KeyFn, NaturalKey};
use crate::lock::WriterLock;
use crate::node::{Node, Side};
use crate::spinlock::SpinMutex;

mod insert;
mod ordered;
mod traverse;
mod verify;



pub use ordered::Keys;

// ============================================================================
//  InvariantViolation
// ============================================================================

/// A structural defect found by [`AvlSet::check`].
///
/// Keys identify the nodes involved. `None` stands for a null link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvariantViolation {
    /// The root holder has a parent.
    SentinelHasParent,

    /// The root holder's two links point at different nodes.
    SentinelLinksDiverge {
        /// Key behind the left link.
        left: Option<i32>,
        /// Key behind the right link.
        right: Option<i32>,
    },

    /// A node's parent does not link back to it.
    ParentLinkBroken {
        /// The orphaned node.
        key: i32,
        /// The node its parent link names.
        parent: Option<i32>,
    },

    /// A child is on the wrong side of its parent.
    ChildOutOfOrder {
        /// The parent.
        parent: i32,
        /// The misplaced child.
        child: i32,
        /// Which link holds the child.
        side: Side,
    },

    /// A node's key falls outside the range its ancestors allow.
    KeyOutOfRange {
        /// The misplaced node.
        key: i32,
        /// Exclusive lower bound from ancestors.
        lower: Option<i32>,
        /// Exclusive upper bound from ancestors.
        upper: Option<i32>,
    },

    /// Balance factor outside `-1..=1`.
    Unbalanced {
        /// The node.
        key: i32,
        /// Left height minus right height.
        balance: i32,
    },

    /// Cached height disagrees with the children's heights.
    HeightMismatch {
        /// The node.
        key: i32,
        /// Stored value.
        cached: i32,
        /// Value recomputed from the children.
        actual: i32,
    },
}

impl StdFmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        match self {
            Self::SentinelHasParent => write!(f, "root holder has a parent"),

            Self::SentinelLinksDiverge { left, right } => {
                write!(f, "root holder links diverge: left={left:?} right={right:?}")
            }

            Self::ParentLinkBroken { key, parent } => {
                write!(f, "node {key}: parent {parent:?} does not link back")
            }

            Self::ChildOutOfOrder {
                parent,
                child,
                side,
            } => {
                write!(f, "node {parent}: {side:?} child {child} is out of order")
            }

            Self::KeyOutOfRange { key, lower, upper } => {
                write!(f, "node {key}: outside ancestor range ({lower:?}, {upper:?})")
            }

            Self::Unbalanced { key, balance } => {
                write!(f, "node {key}: balance factor {balance}")
            }

            Self::HeightMismatch {
                key,
                cached,
                actual,
            } => {
                write!(f, "node {key}: cached height {cached}, actual {actual}")
            }
        }
    }
}

impl std::error::Error for InvariantViolation {}

// ============================================================================
//  AvlSet
// ============================================================================

/// A concurrent AVL-balanced ordered set.
///
/// Values are mapped to `i32` keys by `K` (see [`key`](crate::key)); only the
/// key is stored.
///
/// # Type Parameters
///
/// - `T` - The value type accepted by [`add`](Self::add) and friends
/// - `K` - Key function (defaults to [`NaturalKey`])
/// - `L` - Writer lock (defaults to [`SpinMutex`])
///
/// # Concurrency
///
/// - [`contains`](Self::contains) and [`remove`](Self::remove) never lock.
/// - [`add`](Self::add) descends without locking; only linking a new node
///   and rebalancing run under `L`, which serializes all structural changes.
/// - Reads are not linearizable against a concurrent rotation: a reader can
///   transiently miss a present key that is being moved. It can never report
///   an absent key as present.
///
/// # Memory
///
/// [`remove`](Self::remove) leaves a tombstone; nodes are freed only when the
/// set drops. Workloads that remove and add many distinct keys grow without
/// bound.
///
/// # Example
///
/// ```rust
/// use pavltree::AvlSet;
///
/// let set: AvlSet<i32> = AvlSet::new();
/// assert!(set.add(&3));
/// assert!(!set.add(&3));
/// assert!(set.contains(&3));
/// assert!(set.remove(&3));
/// assert!(!set.contains(&3));
/// ```
pub struct AvlSet<T: ?Sized, K = NaturalKey, L = SpinMutex>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    /// Root holder. Both links reference the true root.
    sentinel: NonNull<Node>,

    /// Serializes attach and retrace.
    lock: L,

    key_fn: K,

    _marker: PhantomData<fn(&T) -> i32>,
}

// SAFETY: nodes are only reached through atomics, links change only under
// `lock`, and nodes are never freed before `Drop`. Values are never stored,
// so `T` does not constrain thread safety.
unsafe impl<T: ?Sized, K, L> Send for AvlSet<T, K, L>
where
    K: KeyFn<T> + Send,
    L: WriterLock,
{
}

// SAFETY: see `Send`; shared access only performs atomic operations.
unsafe impl<T: ?Sized, K, L> Sync for AvlSet<T, K, L>
where
    K: KeyFn<T> + Sync,
    L: WriterLock,
{
}

impl<T: ?Sized> AvlSet<T>
where
    NaturalKey: KeyFn<T>,
{
    /// Create an empty set keyed by the values' own [`OrderKey`](crate::key::OrderKey).
    #[must_use]
    pub fn new() -> Self {
        Self::with_key_fn(NaturalKey)
    }
}

impl<T: ?Sized, K, L> Default for AvlSet<T, K, L>
where
    K: KeyFn<T> + Default,
    L: WriterLock,
{
    fn default() -> Self {
        Self::with_key_fn(K::default())
    }
}

impl<T: ?Sized, K, L> AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    /// Create an empty set with a custom key function.
    ///
    /// ```rust
    /// use pavltree::AvlSet;
    ///
    /// let set: AvlSet<&str, _> = AvlSet::with_key_fn(|s: &&str| s.len() as i32);
    /// assert!(set.add(&"abc"));
    /// // Same length, same key: treated as the same element.
    /// assert!(!set.add(&"xyz"));
    /// ```
    #[must_use]
    pub fn with_key_fn(key_fn: K) -> Self {
        let sentinel = Box::new(Node::sentinel());

        Self {
            sentinel: NonNull::from(Box::leak(sentinel)),
            lock: L::default(),
            key_fn,
            _marker: PhantomData,
        }
    }

    /// The key function.
    #[inline]
    pub const fn key_fn(&self) -> &K {
        &self.key_fn
    }

    /// The writer lock. Exposed for contention diagnostics.
    #[inline]
    pub const fn writer_lock(&self) -> &L {
        &self.lock
    }

    #[inline(always)]
    pub(crate) const fn sentinel_ptr(&self) -> *mut Node {
        self.sentinel.as_ptr()
    }

    #[inline(always)]
    pub(crate) const fn sentinel(&self) -> &Node {
        // SAFETY: allocated in the constructor, freed only in Drop.
        unsafe { self.sentinel.as_ref() }
    }

    /// The true root, or null when empty.
    #[inline(always)]
    pub(crate) fn root_ptr(&self) -> *mut Node {
        self.sentinel().left()
    }
}

impl<T: ?Sized, K, L> Drop for AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    fn drop(&mut self) {
        // No concurrent access is possible here (Drop requires unique access).
        // Walk with an explicit stack so a tall tree can't overflow the call stack.
        let mut pending: Vec<*mut Node> = Vec::new();
        let root: *mut Node = self.root_ptr();
        if !root.is_null() {
            pending.push(root);
        }

        while let Some(ptr) = pending.pop() {
            // SAFETY: every non-null child link was produced by
            // `Box::into_raw` and is owned by exactly one parent.
            let node: Box<Node> = unsafe { Box::from_raw(ptr) };
            for child in [node.left(), node.right()] {
                if !child.is_null() {
                    pending.push(child);
                }
            }
        }

        // SAFETY: leaked in the constructor, never shared past this point.
        drop(unsafe { Box::from_raw(self.sentinel.as_ptr()) });
    }
}

impl<T: ?Sized, K, L> StdFmt::Debug for AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    fn fmt(&self, f: &mut StdFmt::Formatter<'_>) -> StdFmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// [`AvlSet`] with a parking writer lock instead of the spin mutex.
pub type ParkingAvlSet<T, K = NaturalKey> = AvlSet<T, K, parking_lot::Mutex<()>>;
