//! Ordered queries: in-order iteration, extremes, neighbours, sizes.
//!
//! Everything here is lock-free like [`contains`](AvlSet::contains) and shares
//! its caveat: run concurrently with `add`, a walk can skip keys that a
//! rotation is moving. Tombstones are skipped unless stated otherwise.

use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::key::KeyFn;
use crate::lock::WriterLock;
use crate::node::Node;

use super::AvlSet;

/// Stack-based in-order walk over every node, tombstones included.
pub(super) struct InOrder<'a> {
    stack: Vec<*mut Node>,
    descending: bool,
    _marker: PhantomData<&'a Node>,
}

impl InOrder<'_> {
    /// Start at the first node strictly past `bound` in walk direction
    /// (the first node overall when `bound` is `None`).
    fn seek(root: *mut Node, bound: Option<i32>, descending: bool) -> Self {
        let mut walk = Self {
            stack: Vec::new(),
            descending,
            _marker: PhantomData,
        };

        let mut current = root;
        while !current.is_null() {
            // SAFETY: non-null links point at live nodes owned by the set.
            let node: &Node = unsafe { &*current };
            let past_bound = bound.is_none_or(|b| {
                if descending {
                    node.key() < b
                } else {
                    node.key() > b
                }
            });

            if past_bound {
                walk.stack.push(current);
                current = walk.toward_first(node);
            } else {
                current = walk.toward_last(node);
            }
        }

        walk
    }

    fn toward_first(&self, node: &Node) -> *mut Node {
        if self.descending { node.right() } else { node.left() }
    }

    fn toward_last(&self, node: &Node) -> *mut Node {
        if self.descending { node.left() } else { node.right() }
    }

    fn push_spine(&mut self, mut current: *mut Node) {
        while !current.is_null() {
            self.stack.push(current);
            // SAFETY: non-null link.
            current = self.toward_first(unsafe { &*current });
        }
    }
}

impl<'a> Iterator for InOrder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<&'a Node> {
        let ptr = self.stack.pop()?;
        // SAFETY: nodes live as long as the set borrowed for `'a`.
        let node: &'a Node = unsafe { &*ptr };
        self.push_spine(self.toward_last(node));
        Some(node)
    }
}

/// Ascending iterator over the keys of present elements.
///
/// Created by [`AvlSet::iter`].
pub struct Keys<'a> {
    walk: InOrder<'a>,
}

impl Iterator for Keys<'_> {
    type Item = i32;

    fn next(&mut self) -> Option<i32> {
        self.walk.find(|n| n.is_present()).map(Node::key)
    }
}

impl FusedIterator for Keys<'_> {}

impl<T: ?Sized, K, L> AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    fn walk(&self, bound: Option<i32>, descending: bool) -> InOrder<'_> {
        InOrder::seek(self.root_ptr(), bound, descending)
    }

    /// Iterate present keys in ascending order.
    pub fn iter(&self) -> Keys<'_> {
        Keys {
            walk: self.walk(None, false),
        }
    }

    /// Snapshot of present keys, ascending.
    #[must_use]
    pub fn keys(&self) -> Vec<i32> {
        self.iter().collect()
    }

    /// Snapshot of every node as `(key, present)`, ascending, tombstones
    /// included.
    #[must_use]
    pub fn node_keys(&self) -> Vec<(i32, bool)> {
        self.walk(None, false)
            .map(|n| (n.key(), n.is_present()))
            .collect()
    }

    /// Smallest present key.
    #[must_use]
    pub fn min_key(&self) -> Option<i32> {
        self.first_present(None, false)
    }

    /// Largest present key.
    #[must_use]
    pub fn max_key(&self) -> Option<i32> {
        self.first_present(None, true)
    }

    /// Smallest present key strictly greater than `key`.
    #[must_use]
    pub fn successor_key(&self, key: i32) -> Option<i32> {
        self.first_present(Some(key), false)
    }

    /// Largest present key strictly less than `key`.
    #[must_use]
    pub fn predecessor_key(&self, key: i32) -> Option<i32> {
        self.first_present(Some(key), true)
    }

    fn first_present(&self, bound: Option<i32>, descending: bool) -> Option<i32> {
        self.walk(bound, descending)
            .find(|n| n.is_present())
            .map(Node::key)
    }

    /// Number of present elements. O(n): walks every node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether no element is present. Tombstones don't count.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Number of nodes, tombstones included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.walk(None, false).count()
    }

    /// Cached height of the root (a lone root is 0), `None` when no node
    /// exists.
    #[must_use]
    pub fn height(&self) -> Option<i32> {
        let root = self.root_ptr();
        // SAFETY: non-null root link points at a live node.
        (!root.is_null()).then(|| unsafe { (*root).height() })
    }
}

impl<'a, T: ?Sized, K, L> IntoIterator for &'a AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    type Item = i32;
    type IntoIter = Keys<'a>;

    fn into_iter(self) -> Keys<'a> {
        self.iter()
    }
}
