//! Feature-gated logging macros for the set's writer path.
//!
//! With the `tracing` feature the macros forward to `tracing`; without it they
//! expand to nothing, so `contains`, `remove` and the writer critical section
//! pay no logging cost. Reads never log.
//!
//! # Events
//!
//! | Macro | Emitted from | Event |
//! |-------|--------------|-------|
//! | `debug_log!` | `tree::insert` | attach race lost, descent retried (`key`, `retries`) |
//! | `warn_log!` | `tree::insert` | one `add` lost 64 attach races in a row |
//! | `trace_log!` | `tree::insert` | node linked under its parent (`key`, `parent`, `side`) |
//! | `trace_log!` | `node` | `rotate_left` / `rotate_right` (`node`, `pivot`), tombstone resurrected |
//! | `error_log!` | `tree::verify` | first invariant violation found by `check` |
//!
//! ```bash
//! RUST_LOG=pavltree::tree::insert=debug cargo test --features tracing --test stress_tests
//! ```

#![allow(unused_macros, unused_imports)]

/// Trace-level logging (most verbose). Compiles to no-op without `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level logging. Compiles to no-op without `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

/// Warn-level logging. Compiles to no-op without `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_log {
    ($($arg:tt)*) => {};
}

/// Error-level logging. Compiles to no-op without `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! error_log {
    ($($arg:tt)*) => {
        tracing::error!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! error_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use error_log;
pub(crate) use trace_log;
pub(crate) use warn_log;
