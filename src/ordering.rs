//! Standard memory orderings for concurrent node access.
//!
//! These constants keep ordering usage consistent across the crate and make
//! the intent clear at each access point.

use std::sync::atomic::Ordering;

/// Ordering for reading node links and flags during lock-free descent.
/// Pairs with writer's Release stores.
pub const READ_ORD: Ordering = Ordering::Acquire;

/// Ordering for publishing node links and flags.
/// Pairs with reader's Acquire loads.
pub const WRITE_ORD: Ordering = Ordering::Release;

/// Ordering for CAS success (lock claim, presence flag flips).
pub const CAS_SUCCESS: Ordering = Ordering::AcqRel;

/// Ordering for CAS failure.
/// Only need to see the current value.
pub const CAS_FAILURE: Ordering = Ordering::Acquire;

/// Ordering for relaxed loads (spin re-reads, reads under the writer lock).
pub const RELAXED: Ordering = Ordering::Relaxed;

/// Ordering for acquiring the writer lock.
pub const LOCK_ORD: Ordering = Ordering::Acquire;

/// Ordering for releasing the writer lock.
/// Must make every structural store in the critical section visible.
pub const UNLOCK_ORD: Ordering = Ordering::Release;
