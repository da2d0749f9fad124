//! Filepath: src/node.rs
//!
//! Tree vertex and AVL rotation primitives.
//!
//! Every field a concurrent reader can see is atomic. `key` is immutable,
//! `present` and `height` are the only fields written outside a rotation, and
//! the three links are written only while the writer lock is held.
//!
//! # Ownership
//! `left` and `right` own their targets (allocated with `Box::into_raw`);
//! `parent` is a borrowed back-reference. Nodes are never unlinked, so a
//! pointer loaded from any link stays valid until the owning set drops.

use std::ptr;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicPtr};

use crate::ordering::{CAS_FAILURE, CAS_SUCCESS, READ_ORD, RELAXED, WRITE_ORD};
use crate::tracing_helpers::trace_log;

/// Which child link of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Keys smaller than the node's.
    Left,
    /// Keys greater than the node's.
    Right,
}

impl Side {
    /// The side a key belongs on relative to `node_key`. Equal keys have no side.
    #[inline]
    #[must_use]
    pub const fn toward(key: i32, node_key: i32) -> Option<Self> {
        if key < node_key {
            Some(Self::Left)
        } else if key > node_key {
            Some(Self::Right)
        } else {
            None
        }
    }
}

#[derive(Debug)]
pub(crate) struct Node {
    key: i32,
    present: AtomicBool,
    height: AtomicI32,
    parent: AtomicPtr<Self>,
    left: AtomicPtr<Self>,
    right: AtomicPtr<Self>,
}

impl Node {
    /// A present leaf hanging off `parent`.
    pub(crate) const fn new(key: i32, parent: *mut Self) -> Self {
        Self {
            key,
            present: AtomicBool::new(true),
            height: AtomicI32::new(0),
            parent: AtomicPtr::new(parent),
            left: AtomicPtr::new(ptr::null_mut()),
            right: AtomicPtr::new(ptr::null_mut()),
        }
    }

    /// The root holder. Never present, never has a parent.
    pub(crate) const fn sentinel() -> Self {
        Self {
            key: 0,
            present: AtomicBool::new(false),
            height: AtomicI32::new(0),
            parent: AtomicPtr::new(ptr::null_mut()),
            left: AtomicPtr::new(ptr::null_mut()),
            right: AtomicPtr::new(ptr::null_mut()),
        }
    }

    // ========================================================================
    //  Accessors
    // ========================================================================

    #[inline(always)]
    pub(crate) const fn key(&self) -> i32 {
        self.key
    }

    #[inline(always)]
    pub(crate) fn is_present(&self) -> bool {
        self.present.load(READ_ORD)
    }

    #[inline(always)]
    pub(crate) fn height(&self) -> i32 {
        self.height.load(READ_ORD)
    }

    #[inline(always)]
    pub(crate) fn parent(&self) -> *mut Self {
        self.parent.load(READ_ORD)
    }

    #[inline(always)]
    pub(crate) fn left(&self) -> *mut Self {
        self.left.load(READ_ORD)
    }

    #[inline(always)]
    pub(crate) fn right(&self) -> *mut Self {
        self.right.load(READ_ORD)
    }

    #[inline(always)]
    pub(crate) fn child(&self, side: Side) -> *mut Self {
        self.link(side).load(READ_ORD)
    }

    #[inline(always)]
    pub(crate) const fn link(&self, side: Side) -> &AtomicPtr<Self> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    /// Re-home a node that has not been linked into the tree yet.
    #[inline]
    pub(crate) fn set_parent(&self, parent: *mut Self) {
        self.parent.store(parent, WRITE_ORD);
    }

    /// Only the root holder has no parent.
    #[inline(always)]
    pub(crate) fn is_sentinel(&self) -> bool {
        self.parent.load(RELAXED).is_null()
    }

    // ========================================================================
    //  Presence
    // ========================================================================

    /// Flip a tombstone back to present.
    ///
    /// Returns `false` if the node was already present, so of two racing
    /// resurrections exactly one reports success.
    pub(crate) fn mark_present(&self) -> bool {
        let flipped = self
            .present
            .compare_exchange(false, true, CAS_SUCCESS, CAS_FAILURE)
            .is_ok();

        if flipped {
            trace_log!(key = self.key, "tombstone resurrected");
        }

        flipped
    }

    /// Turn a present node into a tombstone.
    ///
    /// Returns `false` if the node was already a tombstone.
    pub(crate) fn mark_absent(&self) -> bool {
        self.present
            .compare_exchange(true, false, CAS_SUCCESS, CAS_FAILURE)
            .is_ok()
    }

    // ========================================================================
    //  Height and Balance
    // ========================================================================

    /// Height contributed by a child link: 0 when absent, else one more than
    /// the child's cached height.
    #[inline]
    pub(crate) fn link_height(child: *mut Self) -> i32 {
        if child.is_null() {
            0
        } else {
            // SAFETY: non-null links point at live nodes owned by the set.
            1 + unsafe { (*child).height() }
        }
    }

    /// Height recomputed from the children's cached heights.
    #[inline]
    pub(crate) fn computed_height(&self) -> i32 {
        Self::link_height(self.left()).max(Self::link_height(self.right()))
    }

    pub(crate) fn fix_height(&self) {
        self.height.store(self.computed_height(), WRITE_ORD);
    }

    #[cfg(test)]
    pub(crate) fn set_height(&self, height: i32) {
        self.height.store(height, WRITE_ORD);
    }

    /// Left height minus right height.
    #[inline]
    pub(crate) fn balance(&self) -> i32 {
        Self::link_height(self.left()) - Self::link_height(self.right())
    }

    // ========================================================================
    //  Rotations
    // ========================================================================

    /// Repoint whichever link of `parent` referenced `from` to `to`.
    ///
    /// The root holder keeps both links on the true root, so both move.
    unsafe fn replace_child(parent: *mut Self, from: *mut Self, to: *mut Self) {
        // SAFETY: caller guarantees `parent` is live.
        let p = unsafe { &*parent };

        if p.is_sentinel() {
            p.left.store(to, WRITE_ORD);
            p.right.store(to, WRITE_ORD);
        } else if p.left.load(RELAXED) == from {
            p.left.store(to, WRITE_ORD);
        } else {
            p.right.store(to, WRITE_ORD);
        }
    }

    /// Single left rotation: `node.right` becomes the subtree root.
    ///
    /// The store order never links a node below itself, so a concurrent
    /// reader that races the rotation may miss a key but always terminates.
    ///
    /// # Safety
    ///
    /// - The writer lock must be held.
    /// - `node` must be a live, non-sentinel node with a right child.
    pub(crate) unsafe fn rotate_left(node: *mut Self) {
        // SAFETY: caller guarantees `node` is live.
        let n = unsafe { &*node };
        let pivot: *mut Self = n.right.load(RELAXED);
        debug_assert!(!pivot.is_null(), "rotate_left without a right child");

        // SAFETY: checked above; children of live nodes are live.
        let r = unsafe { &*pivot };
        let parent: *mut Self = n.parent.load(RELAXED);
        let inner: *mut Self = r.left.load(RELAXED);

        n.right.store(inner, WRITE_ORD);
        r.left.store(node, WRITE_ORD);
        // SAFETY: non-sentinel nodes always have a live parent.
        unsafe { Self::replace_child(parent, node, pivot) };

        r.parent.store(parent, WRITE_ORD);
        n.parent.store(pivot, WRITE_ORD);
        if !inner.is_null() {
            // SAFETY: non-null link.
            unsafe { (*inner).parent.store(node, WRITE_ORD) };
        }

        // `r` sits above `n` now; its height depends on the new one of `n`.
        n.fix_height();
        r.fix_height();

        trace_log!(node = n.key, pivot = r.key, "rotate_left");
    }

    /// Single right rotation: `node.left` becomes the subtree root.
    ///
    /// # Safety
    ///
    /// - The writer lock must be held.
    /// - `node` must be a live, non-sentinel node with a left child.
    pub(crate) unsafe fn rotate_right(node: *mut Self) {
        // SAFETY: caller guarantees `node` is live.
        let n = unsafe { &*node };
        let pivot: *mut Self = n.left.load(RELAXED);
        debug_assert!(!pivot.is_null(), "rotate_right without a left child");

        // SAFETY: checked above.
        let l = unsafe { &*pivot };
        let parent: *mut Self = n.parent.load(RELAXED);
        let inner: *mut Self = l.right.load(RELAXED);

        n.left.store(inner, WRITE_ORD);
        l.right.store(node, WRITE_ORD);
        // SAFETY: non-sentinel nodes always have a live parent.
        unsafe { Self::replace_child(parent, node, pivot) };

        l.parent.store(parent, WRITE_ORD);
        n.parent.store(pivot, WRITE_ORD);
        if !inner.is_null() {
            // SAFETY: non-null link.
            unsafe { (*inner).parent.store(node, WRITE_ORD) };
        }

        n.fix_height();
        l.fix_height();

        trace_log!(node = n.key, pivot = l.key, "rotate_right");
    }

    /// Right-left rotation. Skips the inner step when `node.right` has no
    /// left child.
    ///
    /// # Safety
    ///
    /// Same as [`rotate_left`](Self::rotate_left).
    pub(crate) unsafe fn double_rotate_left(node: *mut Self) {
        // SAFETY: caller guarantees `node` is live with a right child.
        let right: *mut Self = unsafe { (*node).right.load(RELAXED) };

        // SAFETY: `right` is non-null per the caller contract.
        if unsafe { !(*right).left.load(RELAXED).is_null() } {
            // SAFETY: `right` is live, non-sentinel, and has a left child.
            unsafe { Self::rotate_right(right) };
        }

        // SAFETY: `node` still has a right child after the inner rotation.
        unsafe { Self::rotate_left(node) };
    }

    /// Left-right rotation. Mirror of [`double_rotate_left`](Self::double_rotate_left).
    ///
    /// # Safety
    ///
    /// Same as [`rotate_right`](Self::rotate_right).
    pub(crate) unsafe fn double_rotate_right(node: *mut Self) {
        // SAFETY: caller guarantees `node` is live with a left child.
        let left: *mut Self = unsafe { (*node).left.load(RELAXED) };

        // SAFETY: `left` is non-null per the caller contract.
        if unsafe { !(*left).right.load(RELAXED).is_null() } {
            // SAFETY: `left` is live, non-sentinel, and has a right child.
            unsafe { Self::rotate_left(left) };
        }

        // SAFETY: `node` still has a left child after the inner rotation.
        unsafe { Self::rotate_right(node) };
    }
}
