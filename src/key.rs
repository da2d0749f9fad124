//! Filepath: src/key.rs
//!
//! Key derivation for [`AvlSet`](crate::AvlSet).
//!
//! The set never stores values. Each value is mapped to an `i32` ordering key
//! by a [`KeyFn`], and the key alone decides the value's position and
//! identity in the tree.
//!
//! # Collisions
//!
//! There is no collision resolution. Two distinct values that map to the same
//! key are treated as the same element: adding the second reports "already
//! present", removing either removes both. A key function must be
//! deterministic and must map equal values to equal keys; it should be
//! injective over the values the caller actually stores.
//!
//! ```rust
//! use pavltree::key::{KeyFn, NaturalKey};
//!
//! assert_eq!(NaturalKey.key_of(&-7i32), -7);
//! assert_eq!(NaturalKey.key_of(&'a'), 97);
//!
//! let by_len = |s: &String| i32::try_from(s.len()).unwrap_or(i32::MAX);
//! assert_eq!(by_len.key_of(&String::from("abc")), 3);
//! ```

/// A type with a built-in collision-free `i32` key.
///
/// Implemented only where the mapping is injective: every integer type that
/// fits in 32 bits, `char` and `bool`.
pub trait OrderKey {
    /// The ordering key of this value.
    fn order_key(&self) -> i32;
}

macro_rules! impl_order_key_lossless {
    ($($ty:ty),* $(,)?) => {
        $(
            impl OrderKey for $ty {
                #[inline(always)]
                fn order_key(&self) -> i32 {
                    i32::from(*self)
                }
            }
        )*
    };
}

impl_order_key_lossless!(i8, i16, i32, u8, u16, bool);

impl OrderKey for u32 {
    /// Bit-reinterpreting cast. Injective, but values above `i32::MAX` order
    /// before small values.
    #[inline(always)]
    #[expect(clippy::cast_possible_wrap, reason = "bijective reinterpretation")]
    fn order_key(&self) -> i32 {
        *self as i32
    }
}

impl OrderKey for char {
    /// Unicode scalar values stop at `0x10FFFF`, well inside `i32`.
    #[inline(always)]
    #[expect(clippy::cast_possible_wrap, reason = "scalar values fit in 21 bits")]
    fn order_key(&self) -> i32 {
        u32::from(*self) as i32
    }
}

impl<T: OrderKey + ?Sized> OrderKey for &T {
    #[inline(always)]
    fn order_key(&self) -> i32 {
        (**self).order_key()
    }
}

/// Maps a value to its ordering key.
///
/// Implemented by [`NaturalKey`] for every [`OrderKey`] type, and by any
/// `Fn(&T) -> i32` closure or function.
pub trait KeyFn<T: ?Sized> {
    /// The ordering key for `value`.
    fn key_of(&self, value: &T) -> i32;
}

/// Key function that uses the value's own [`OrderKey`] impl.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NaturalKey;

impl<T: OrderKey + ?Sized> KeyFn<T> for NaturalKey {
    #[inline(always)]
    fn key_of(&self, value: &T) -> i32 {
        value.order_key()
    }
}

impl<T: ?Sized, F> KeyFn<T> for F
where
    F: Fn(&T) -> i32,
{
    #[inline(always)]
    fn key_of(&self, value: &T) -> i32 {
        self(value)
    }
}
