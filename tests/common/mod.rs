//! Shared helpers for the integration tests: log capture and set assertions.
//!
//! # Logging
//!
//! Every stress test calls [`init_tracing`] first. The crate only emits events
//! when built with `--features tracing`; without it the subscriber is installed
//! but stays silent.
//!
//! | Target | Level | Events |
//! |--------|-------|--------|
//! | `pavltree::tree::insert` | debug / warn / trace | attach race lost, retry storm, node attached |
//! | `pavltree::node` | trace | `rotate_left`, `rotate_right`, tombstone resurrected |
//! | `pavltree::tree::verify` | error | invariant violation |
//!
//! `RUST_LOG` replaces the default directives. `PAVLTREE_LOG_DIR` moves the
//! NDJSON file (default `logs/`), `PAVLTREE_LOG_CONSOLE=0` mutes stderr.
//!
//! ```bash
//! RUST_LOG=pavltree::node=trace cargo test --features tracing --test stress_tests
//! jq 'select(.fields.message == "rotate_left")' logs/pavltree.jsonl
//! ```

#![allow(dead_code)]

use std::collections::BTreeSet;
use std::env;
use std::fs::{self, File, OpenOptions};
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use pavltree::AvlSet;

/// Filter used when `RUST_LOG` is unset: the insert path at debug, so lost
/// attach races show up, and everything else at warn.
pub const DEFAULT_DIRECTIVES: &str =
    "warn,pavltree::tree::insert=debug,pavltree::node=info,pavltree::tree::verify=error";

const LOG_FILE: &str = "pavltree.jsonl";

static INIT: Once = Once::new();

/// Install the test subscriber. Only the first call has an effect.
pub fn init_tracing() {
    INIT.call_once(install);
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// Append mode: nextest runs every test in its own process.
fn open_log_file() -> Option<File> {
    let dir = env::var_os("PAVLTREE_LOG_DIR").map_or_else(|| PathBuf::from("logs"), PathBuf::from);
    fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE))
        .ok()
}

fn install() {
    let console = !env::var("PAVLTREE_LOG_CONSOLE").is_ok_and(|v| v == "0");

    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_thread_ids(true)
            .with_target(true)
            .compact()
            .with_filter(filter())
    });

    // A missing log directory only loses the file copy, not the test.
    let file_layer = open_log_file().map(|file| {
        tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_thread_ids(true)
            .with_target(true)
            .json()
            .with_filter(filter())
    });

    let _ = Registry::default()
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

// ============================================================================
//  Set Helpers
// ============================================================================

/// Assert that `set` holds exactly `expected`, checking membership key by key
/// before comparing the ordered snapshot so a failure names the culprit.
pub fn assert_same_keys(set: &AvlSet<i32>, expected: &BTreeSet<i32>, test_name: &str) {
    let missing: Vec<i32> = expected.iter().copied().filter(|k| !set.contains(k)).collect();
    assert!(
        missing.is_empty(),
        "{test_name}: {} expected keys missing (first 20: {:?})",
        missing.len(),
        &missing[..missing.len().min(20)],
    );

    let actual: Vec<i32> = set.keys();
    let expected: Vec<i32> = expected.iter().copied().collect();
    assert_eq!(actual, expected, "{test_name}: ordered snapshot differs");
}

/// Build a set from a slice, single-threaded.
pub fn set_of(keys: &[i32]) -> AvlSet<i32> {
    let set = AvlSet::new();
    for k in keys {
        set.add(k);
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_name_crate_targets() {
        assert!(EnvFilter::try_new(DEFAULT_DIRECTIVES).is_ok());
        for target in ["pavltree::tree::insert", "pavltree::node", "pavltree::tree::verify"] {
            assert!(
                DEFAULT_DIRECTIVES.split(',').any(|d| d.starts_with(target)),
                "{target} has no directive"
            );
        }
    }

    #[test]
    fn test_init_tracing_twice() {
        init_tracing();
        init_tracing();
        tracing::debug!(target: "pavltree::tree::insert", key = 16, "attach race lost, retrying descent");
    }
}
