//! Lock-free descent from the root holder to a key's position.
//!
//! This is the whole read path: [`AvlSet::contains`] and [`AvlSet::remove`]
//! are one descent plus a flag access, and [`AvlSet::add`] starts with one.

use crate::key::KeyFn;
use crate::lock::WriterLock;
use crate::node::{Node, Side};

use super::AvlSet;

/// Where a key was found, or where it would be attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Descent {
    /// A node (present or tombstone) carries the key.
    Found(*mut Node),

    /// The key is absent; `parent.side` is the null slot it belongs in.
    /// `parent` is the root holder when the set is empty.
    Vacant { parent: *mut Node, side: Side },
}

impl<T: ?Sized, K, L> AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    /// Walk from the true root toward `key` using only atomic loads.
    ///
    /// Safe to run concurrently with anything: nodes are never freed while
    /// the set lives, and rotations never make a node its own descendant.
    /// Under concurrent rotation the result may be stale; callers that act
    /// on a [`Descent::Vacant`] must re-validate under the writer lock.
    pub(super) fn descend(&self, key: i32) -> Descent {
        let mut parent: *mut Node = self.sentinel_ptr();
        let mut side: Side = Side::Left;
        let mut current: *mut Node = self.root_ptr();

        while !current.is_null() {
            // SAFETY: non-null links point at live nodes owned by the set.
            let node: &Node = unsafe { &*current };

            match Side::toward(key, node.key()) {
                None => return Descent::Found(current),
                Some(next) => {
                    parent = current;
                    side = next;
                    current = node.child(next);
                }
            }
        }

        Descent::Vacant { parent, side }
    }

    /// The node carrying `key`, present or not.
    #[inline]
    pub(super) fn find(&self, key: i32) -> Option<&Node> {
        match self.descend(key) {
            // SAFETY: found nodes are live for the lifetime of `&self`.
            Descent::Found(node) => Some(unsafe { &*node }),
            Descent::Vacant { .. } => None,
        }
    }

    /// Check whether `value` is in the set.
    ///
    /// Never locks and never waits for writers. O(height).
    ///
    /// # Returns
    /// `true` iff a present node with `value`'s key exists.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.contains_key(self.key_fn.key_of(value))
    }

    /// [`contains`](Self::contains) by raw key.
    #[must_use]
    pub fn contains_key(&self, key: i32) -> bool {
        self.find(key).is_some_and(Node::is_present)
    }

    /// Remove `value` from the set.
    ///
    /// Marks the node as a tombstone; the tree never changes shape and the
    /// writer lock is not taken.
    ///
    /// # Returns
    /// `true` iff the value was present and this call removed it.
    pub fn remove(&self, value: &T) -> bool {
        self.remove_key(self.key_fn.key_of(value))
    }

    /// [`remove`](Self::remove) by raw key.
    pub fn remove_key(&self, key: i32) -> bool {
        self.find(key).is_some_and(Node::mark_absent)
    }
}
