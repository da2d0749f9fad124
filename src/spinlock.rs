//! Filepath: src/spinlock.rs
//!
//! Busy-wait mutual exclusion for the tree's writer critical section.
//!
//! [`SpinMutex`] is a single `AtomicBool`. Writers call [`SpinMutex::lock`] to
//! get a [`SpinGuard`]; the lock is released when the guard drops.
//!
//! # Guard
//! The set holds the guard (through the [`WriterLock`](crate::lock::WriterLock)
//! seam) for the whole attach-and-retrace step. The guard releases on drop,
//! even during unwinding.
//!
//! ```rust
//! use pavltree::SpinMutex;
//!
//! let mutex = SpinMutex::new();
//! {
//!     let _guard = mutex.lock();
//!     assert!(mutex.is_locked());
//! }
//! assert!(!mutex.is_locked());
//! ```
//!
//! Critical sections must stay short: there is no fairness, no re-entrancy
//! and no timeout. A thread that locks twice without dropping the first
//! guard spins forever.

use std::hint;
use std::marker::PhantomData;
use std::sync::atomic::AtomicBool;

use crate::ordering::{LOCK_ORD, RELAXED, UNLOCK_ORD};

// ============================================================================
//  SpinMutex
// ============================================================================

/// A test-and-test-and-set spin lock.
#[derive(Debug, Default)]
pub struct SpinMutex {
    locked: AtomicBool,
}

// ============================================================================
//  SpinGuard (Type-State Pattern)
// ============================================================================

/// Proof that a [`SpinMutex`] is held.
///
/// Cannot be constructed except through [`SpinMutex::lock`] or a successful
/// [`SpinMutex::try_lock`].
///
/// # Thread Safety
/// `PhantomData<*mut ()>` makes the guard `!Send + !Sync`, so the thread that
/// claimed the lock is the one that releases it.
#[derive(Debug)]
#[must_use = "dropping the guard immediately releases the lock"]
pub struct SpinGuard<'a> {
    mutex: &'a SpinMutex,
    _marker: PhantomData<*mut ()>,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.mutex.locked.store(false, UNLOCK_ORD);
    }
}

impl SpinGuard<'_> {
    /// The mutex this guard holds.
    #[inline]
    #[must_use]
    pub const fn mutex(&self) -> &SpinMutex {
        self.mutex
    }
}

impl SpinMutex {
    /// Create an unlocked mutex.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            locked: AtomicBool::new(false),
        }
    }

    /// Acquire the lock, spinning until it is free.
    ///
    /// Spins on relaxed loads while the lock is held and only retries the
    /// claim once it has been observed free, keeping the cache line shared
    /// between waiters.
    pub fn lock(&self) -> SpinGuard<'_> {
        loop {
            if self
                .locked
                .compare_exchange_weak(false, true, LOCK_ORD, RELAXED)
                .is_ok()
            {
                return self.guard();
            }

            while self.locked.load(RELAXED) {
                hint::spin_loop();
            }
        }
    }

    /// Try to acquire the lock without spinning.
    ///
    /// # Returns
    /// `Some(guard)` if this call claimed the lock, `None` if it was held.
    ///
    /// # Note
    /// The claim is a single strong compare-exchange, so a `Some` result
    /// always means the caller owns the lock. A plain "is it free?" peek is
    /// available as [`is_locked`](Self::is_locked) and is advisory only.
    pub fn try_lock(&self) -> Option<SpinGuard<'_>> {
        self.locked
            .compare_exchange(false, true, LOCK_ORD, RELAXED)
            .ok()
            .map(|_| self.guard())
    }

    /// Check whether the lock is currently held.
    ///
    /// The answer may be stale by the time the caller looks at it.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked.load(RELAXED)
    }

    const fn guard(&self) -> SpinGuard<'_> {
        SpinGuard {
            mutex: self,
            _marker: PhantomData,
        }
    }
}
