//! Insertion: optimistic attach followed by an AVL retrace.
//!
//! ## Protocol
//!
//! 1. Descend without locking (see [`traverse`](super::traverse)).
//! 2. Key found: flip the presence flag if it is a tombstone. No structural
//!    change, no lock.
//! 3. Null slot found: take the writer lock, re-validate that the slot is
//!    still the key's null slot, link the new node, and retrace up to the
//!    root holder fixing heights and rotating. Both steps share one critical
//!    section, so every attach sees a fully rebalanced tree.
//! 4. Re-validation failed (another writer filled the slot or rotated the
//!    neighbourhood): drop the lock and start over from the root. The retry
//!    is unbounded and has no backoff.

use crate::key::KeyFn;
use crate::lock::WriterLock;
use crate::node::{Node, Side};
use crate::ordering::WRITE_ORD;
use crate::tracing_helpers::{debug_log, trace_log, warn_log};

use super::AvlSet;
use super::traverse::Descent;

/// Consecutive lost attach races after which a single warning is logged.
const RETRY_WARN_THRESHOLD: u32 = 64;

impl<T: ?Sized, K, L> AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    /// Add `value` to the set.
    ///
    /// # Returns
    /// `true` if the value was not present before this call, `false` if it
    /// already was (including when a concurrent `add` of the same key won).
    pub fn add(&self, value: &T) -> bool {
        self.add_key(self.key_fn.key_of(value))
    }

    /// [`add`](Self::add) by raw key.
    pub fn add_key(&self, key: i32) -> bool {
        // Allocated on the first vacant descent and reused across retries.
        let mut spare: Option<Box<Node>> = None;
        let mut retries: u32 = 0;

        loop {
            match self.descend(key) {
                Descent::Found(node) => {
                    // SAFETY: found nodes live as long as the set.
                    let node: &Node = unsafe { &*node };
                    return !node.is_present() && node.mark_present();
                }

                Descent::Vacant { parent, side } => {
                    let node = spare.take().unwrap_or_else(|| Box::new(Node::new(key, parent)));

                    match self.attach_and_rebalance(key, parent, side, node) {
                        Ok(()) => return true,
                        Err(node) => {
                            retries = retries.saturating_add(1);
                            debug_log!(key, retries, "attach race lost, retrying descent");
                            if retries == RETRY_WARN_THRESHOLD {
                                warn_log!(key, retries, "add keeps losing attach races");
                            }
                            spare = Some(node);
                        }
                    }
                }
            }
        }
    }

    /// Link `node` into `parent.side` and retrace, all under the writer lock.
    ///
    /// Hands the node back if the slot is no longer where `key` belongs.
    fn attach_and_rebalance(
        &self,
        key: i32,
        parent: *mut Node,
        side: Side,
        node: Box<Node>,
    ) -> Result<(), Box<Node>> {
        let _guard = self.lock.acquire();

        // Under the lock the shape is frozen, so a fresh descent is exact.
        // It fails if the key arrived meanwhile, if the slot was filled, or if
        // a rotation moved the gap the optimistic descent ended in.
        if self.descend(key) != (Descent::Vacant { parent, side }) {
            return Err(node);
        }

        node.set_parent(parent);
        let node: *mut Node = Box::into_raw(node);

        // SAFETY: `parent` is live; the writer lock is held.
        let parent_ref: &Node = unsafe { &*parent };
        if parent_ref.is_sentinel() {
            parent_ref.link(Side::Left).store(node, WRITE_ORD);
            parent_ref.link(Side::Right).store(node, WRITE_ORD);
        } else {
            parent_ref.link(side).store(node, WRITE_ORD);
        }

        trace_log!(key, parent = parent_ref.key(), ?side, "node attached");

        // SAFETY: `node` was just linked below `parent`; the lock is held.
        unsafe { self.retrace(node) };

        Ok(())
    }

    /// Walk from `node` up to the root holder, fixing cached heights and
    /// rotating any ancestor whose balance factor reached ±2.
    ///
    /// `node`'s key picks single vs double rotation: a key on the outer side
    /// of the heavy child needs one rotation, an inner key needs two.
    ///
    /// # Safety
    ///
    /// - The writer lock must be held.
    /// - `node` must be a live node reachable from the root holder.
    unsafe fn retrace(&self, node: *mut Node) {
        let sentinel: *mut Node = self.sentinel_ptr();
        // SAFETY: caller guarantees `node` is live.
        let key: i32 = unsafe { (*node).key() };
        let mut current: *mut Node = node;

        while current != sentinel {
            // SAFETY: every ancestor of a live node is live.
            let n: &Node = unsafe { &*current };
            n.fix_height();

            let balance = n.balance();
            if balance <= -2 {
                // SAFETY: right-heavy by two means a right child exists.
                let right_key = unsafe { (*n.right()).key() };
                if key > right_key {
                    // SAFETY: lock held, `current` is live with a right child.
                    unsafe { Node::rotate_left(current) };
                } else {
                    // SAFETY: as above.
                    unsafe { Node::double_rotate_left(current) };
                }
            } else if balance >= 2 {
                // SAFETY: left-heavy by two means a left child exists.
                let left_key = unsafe { (*n.left()).key() };
                if key < left_key {
                    // SAFETY: lock held, `current` is live with a left child.
                    unsafe { Node::rotate_right(current) };
                } else {
                    // SAFETY: as above.
                    unsafe { Node::double_rotate_right(current) };
                }
            }

            // After a rotation this is the new subtree root, whose height
            // the next iteration refreshes.
            current = n.parent();
        }

        let sentinel: &Node = self.sentinel();
        sentinel.link(Side::Right).store(sentinel.left(), WRITE_ORD);
    }
}
