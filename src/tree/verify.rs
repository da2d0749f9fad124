//! Consistency checker.
//!
//! Debug-only. Both entry points take `&mut self`, so the borrow checker
//! rules out concurrent mutation while the check runs.

use crate::key::KeyFn;
use crate::lock::WriterLock;
use crate::node::{Node, Side};
use crate::tracing_helpers::error_log;

use super::{AvlSet, InvariantViolation};

/// A node still to be checked, with the exclusive key range its ancestors allow.
struct Pending {
    node: *mut Node,
    lower: Option<i32>,
    upper: Option<i32>,
}

fn key_at(ptr: *mut Node) -> Option<i32> {
    // SAFETY: non-null links point at live nodes owned by the set.
    (!ptr.is_null()).then(|| unsafe { (*ptr).key() })
}

impl<T: ?Sized, K, L> AvlSet<T, K, L>
where
    K: KeyFn<T>,
    L: WriterLock,
{
    /// Check every structural invariant, stopping at the first violation.
    ///
    /// Checks the root holder (no parent, both links equal) and, for every
    /// node: its parent links back to it, each child is on the correct side
    /// and links back, the key lies inside the range its ancestors allow, the
    /// cached height is exact, and the balance factor is within `-1..=1`.
    ///
    /// # Errors
    /// The first [`InvariantViolation`] found, in pre-order.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn check(&mut self) -> Result<(), InvariantViolation> {
        let result = self.check_tree();

        if let Err(ref violation) = result {
            error_log!(%violation, "invariant violation");
        }

        result
    }

    /// Run [`check`](Self::check) and panic on the first violation.
    ///
    /// # Panics
    /// If any structural invariant is broken.
    pub fn verify(&mut self) {
        if let Err(violation) = self.check() {
            panic!("AvlSet invariant violated: {violation}");
        }
    }

    fn check_tree(&self) -> Result<(), InvariantViolation> {
        let sentinel: &Node = self.sentinel();
        if !sentinel.parent().is_null() {
            return Err(InvariantViolation::SentinelHasParent);
        }
        if sentinel.left() != sentinel.right() {
            return Err(InvariantViolation::SentinelLinksDiverge {
                left: key_at(sentinel.left()),
                right: key_at(sentinel.right()),
            });
        }

        let mut stack: Vec<Pending> = Vec::new();
        let root = sentinel.left();
        if !root.is_null() {
            stack.push(Pending {
                node: root,
                lower: None,
                upper: None,
            });
        }

        while let Some(Pending { node, lower, upper }) = stack.pop() {
            // SAFETY: only non-null links are pushed.
            let n: &Node = unsafe { &*node };
            let key = n.key();

            Self::check_parent_link(node, n)?;

            if lower.is_some_and(|lo| key <= lo) || upper.is_some_and(|hi| key >= hi) {
                return Err(InvariantViolation::KeyOutOfRange { key, lower, upper });
            }

            for side in [Side::Left, Side::Right] {
                let child = n.child(side);
                if child.is_null() {
                    continue;
                }
                // SAFETY: non-null link.
                let c: &Node = unsafe { &*child };
                if Side::toward(c.key(), key) != Some(side) {
                    return Err(InvariantViolation::ChildOutOfOrder {
                        parent: key,
                        child: c.key(),
                        side,
                    });
                }
            }

            let actual = n.computed_height();
            if n.height() != actual {
                return Err(InvariantViolation::HeightMismatch {
                    key,
                    cached: n.height(),
                    actual,
                });
            }

            let balance = n.balance();
            if !(-1..=1).contains(&balance) {
                return Err(InvariantViolation::Unbalanced { key, balance });
            }

            // Right first so the left subtree is reported first.
            let right = n.right();
            if !right.is_null() {
                stack.push(Pending {
                    node: right,
                    lower: Some(key),
                    upper,
                });
            }
            let left = n.left();
            if !left.is_null() {
                stack.push(Pending {
                    node: left,
                    lower,
                    upper: Some(key),
                });
            }
        }

        Ok(())
    }

    /// The parent must hold `node` in one of its links. Covers the child's
    /// parent link too, since every child is visited as a node.
    fn check_parent_link(node: *mut Node, n: &Node) -> Result<(), InvariantViolation> {
        let parent = n.parent();
        // SAFETY: non-null parent links point at live nodes.
        let links_back =
            !parent.is_null() && unsafe { (*parent).left() == node || (*parent).right() == node };

        if links_back {
            Ok(())
        } else {
            Err(InvariantViolation::ParentLinkBroken {
                key: n.key(),
                parent: key_at(parent),
            })
        }
    }
}
