//! Writer lock abstraction for the tree.
//!
//! This module defines [`WriterLock`], the single whole-tree lock that
//! serializes attachment of new nodes and the rebalancing retrace. Readers
//! never touch it.
//!
//! # Implementors
//!
//! - [`SpinMutex`] (default): busy-wait, best for the short O(log n) critical
//!   sections the tree uses.
//! - `parking_lot::Mutex<()>`: parks waiting threads instead of spinning.
//!   Useful when writers heavily outnumber cores.
//!
//! Both provide the same contract; the choice only changes how waiting
//! writers burn CPU.

use parking_lot::{Mutex, MutexGuard};

use crate::spinlock::{SpinGuard, SpinMutex};

/// Trait for the lock guarding structural mutation.
///
/// The guard returned by [`acquire`](Self::acquire) is the proof that
/// structural operations take. Dropping it releases the lock.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the owning set can be shared
/// across threads.
pub trait WriterLock: Default + Send + Sync {
    /// Proof that the lock is held. Releases on drop.
    type Guard<'a>
    where
        Self: 'a;

    /// Block until the lock is held by the caller.
    fn acquire(&self) -> Self::Guard<'_>;

    /// Claim the lock only if it is free right now.
    fn try_acquire(&self) -> Option<Self::Guard<'_>>;

    /// Advisory check whether some thread holds the lock.
    fn is_held(&self) -> bool;
}

impl WriterLock for SpinMutex {
    type Guard<'a> = SpinGuard<'a>;

    #[inline]
    fn acquire(&self) -> SpinGuard<'_> {
        self.lock()
    }

    #[inline]
    fn try_acquire(&self) -> Option<SpinGuard<'_>> {
        self.try_lock()
    }

    #[inline]
    fn is_held(&self) -> bool {
        self.is_locked()
    }
}

impl WriterLock for Mutex<()> {
    type Guard<'a> = MutexGuard<'a, ()>;

    #[inline]
    fn acquire(&self) -> MutexGuard<'_, ()> {
        self.lock()
    }

    #[inline]
    fn try_acquire(&self) -> Option<MutexGuard<'_, ()>> {
        self.try_lock()
    }

    #[inline]
    fn is_held(&self) -> bool {
        self.is_locked()
    }
}
