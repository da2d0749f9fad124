//! Property-based tests for `AvlSet`.
//!
//! These tests verify invariants and properties that should hold for all inputs.
//! Uses differential testing against `BTreeSet` as an oracle.

#![expect(clippy::unwrap_used, reason = "fail fast in tests")]

mod common;

use pavltree::{AvlSet, ParkingAvlSet};
use proptest::prelude::*;
use std::collections::BTreeSet;
use std::ops::Bound;

// ============================================================================
//  Strategies
// ============================================================================

/// Keys from a narrow range, so adds and removes collide often.
fn dense_key() -> impl Strategy<Value = i32> {
    -64..64i32
}

/// Keys from the whole domain, extremes included.
fn any_key() -> impl Strategy<Value = i32> {
    prop_oneof![
        8 => any::<i32>(),
        1 => Just(i32::MIN),
        1 => Just(i32::MAX),
    ]
}

/// Operations for random testing.
#[derive(Debug, Clone)]
enum Op {
    Add(i32),
    Remove(i32),
    Contains(i32),
}

/// Strategy for generating random operations on dense keys.
fn operations(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            4 => dense_key().prop_map(Op::Add),
            2 => dense_key().prop_map(Op::Remove),
            1 => dense_key().prop_map(Op::Contains),
        ],
        0..=max_ops,
    )
}

fn build(keys: &[i32]) -> AvlSet<i32> {
    let set = AvlSet::new();
    for k in keys {
        set.add(k);
    }
    set
}

// ============================================================================
//  Basic Add/Contains Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every added key is found.
    #[test]
    fn add_then_contains(keys in prop::collection::vec(any_key(), 0..200)) {
        let set = build(&keys);
        for k in &keys {
            prop_assert!(set.contains(k), "{} missing after add", k);
        }
    }

    /// `add` reports true exactly for the first occurrence of each key.
    #[test]
    fn add_reports_first_occurrence(keys in prop::collection::vec(dense_key(), 0..200)) {
        let set: AvlSet<i32> = AvlSet::new();
        let mut oracle = BTreeSet::new();

        for k in &keys {
            prop_assert_eq!(set.add(k), oracle.insert(*k));
        }
    }

    /// Whatever the insertion order, iteration yields sorted unique keys.
    #[test]
    fn iteration_is_sorted_and_unique(keys in prop::collection::vec(any_key(), 0..300)) {
        let set = build(&keys);
        let expected: Vec<i32> = keys.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        prop_assert_eq!(set.keys(), expected);
    }
}

// ============================================================================
//  Structural Invariants
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Ordering, parent links, heights and balance hold after any sequence
    /// of adds and removes.
    #[test]
    fn invariants_hold_after_ops(ops in operations(300)) {
        common::init_tracing();
        let mut set: AvlSet<i32> = AvlSet::new();
        for op in &ops {
            match *op {
                Op::Add(k) => { set.add(&k); }
                Op::Remove(k) => { set.remove(&k); }
                Op::Contains(k) => { set.contains(&k); }
            }
        }
        prop_assert_eq!(set.check(), Ok(()));
    }

    /// AVL height bound: height < 1.45 * log2(n + 2).
    #[test]
    fn height_is_logarithmic(keys in prop::collection::hash_set(any_key(), 1..500)) {
        let keys: Vec<i32> = keys.into_iter().collect();
        let set = build(&keys);
        let n = set.node_count() as f64;
        let levels = f64::from(set.height().unwrap() + 1);
        prop_assert!(levels < 1.45 * (n + 2.0).log2(), "{} levels for {} nodes", levels, n);
    }

    /// Removing never changes the tree's shape: node count and root height
    /// are unchanged, only presence flips.
    #[test]
    fn remove_keeps_shape(
        keys in prop::collection::vec(dense_key(), 1..100),
        removals in prop::collection::vec(dense_key(), 0..100),
    ) {
        let set = build(&keys);
        let nodes = set.node_count();
        let height = set.height();

        for k in &removals {
            set.remove(k);
        }

        prop_assert_eq!(set.node_count(), nodes);
        prop_assert_eq!(set.height(), height);
    }
}

// ============================================================================
//  Differential Testing
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Every operation returns what `BTreeSet` returns.
    #[test]
    fn differential_against_btreeset(ops in operations(400)) {
        common::init_tracing();
        let set: AvlSet<i32> = AvlSet::new();
        let mut oracle = BTreeSet::new();

        for op in &ops {
            match *op {
                Op::Add(k) => prop_assert_eq!(set.add(&k), oracle.insert(k), "add {}", k),
                Op::Remove(k) => prop_assert_eq!(set.remove(&k), oracle.remove(&k), "remove {}", k),
                Op::Contains(k) => prop_assert_eq!(set.contains(&k), oracle.contains(&k), "contains {}", k),
            }
        }

        prop_assert_eq!(set.len(), oracle.len());
        prop_assert_eq!(set.is_empty(), oracle.is_empty());
        prop_assert_eq!(set.keys(), oracle.iter().copied().collect::<Vec<_>>());
    }

    /// Ordered queries agree with the oracle, tombstones skipped.
    #[test]
    fn ordered_queries_match(ops in operations(200), queries in prop::collection::vec(-80..80i32, 1..20)) {
        let set: AvlSet<i32> = AvlSet::new();
        let mut oracle = BTreeSet::new();

        for op in &ops {
            match *op {
                Op::Add(k) => { set.add(&k); oracle.insert(k); }
                Op::Remove(k) => { set.remove(&k); oracle.remove(&k); }
                Op::Contains(_) => {}
            }
        }

        prop_assert_eq!(set.min_key(), oracle.first().copied());
        prop_assert_eq!(set.max_key(), oracle.last().copied());

        for p in queries {
            let succ = oracle.range((Bound::Excluded(p), Bound::Unbounded)).next().copied();
            let pred = oracle.range(..p).next_back().copied();
            prop_assert_eq!(set.successor_key(p), succ, "successor of {}", p);
            prop_assert_eq!(set.predecessor_key(p), pred, "predecessor of {}", p);
        }
    }

    /// The parking lock variant behaves identically.
    #[test]
    fn parking_variant_matches(ops in operations(200)) {
        let mut set: ParkingAvlSet<i32> = ParkingAvlSet::default();
        let mut oracle = BTreeSet::new();

        for op in &ops {
            match *op {
                Op::Add(k) => prop_assert_eq!(set.add(&k), oracle.insert(k)),
                Op::Remove(k) => prop_assert_eq!(set.remove(&k), oracle.remove(&k)),
                Op::Contains(k) => prop_assert_eq!(set.contains(&k), oracle.contains(&k)),
            }
        }

        set.verify();
        prop_assert_eq!(set.keys(), oracle.into_iter().collect::<Vec<_>>());
    }
}

// ============================================================================
//  Key Functions
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// With a custom key function, values sharing a key are one element.
    #[test]
    fn colliding_values_are_one_element(words in prop::collection::vec("[a-z]{0,12}", 0..50)) {
        let set: AvlSet<String, _> =
            AvlSet::with_key_fn(|s: &String| i32::try_from(s.len()).unwrap());
        let lengths: BTreeSet<usize> = words.iter().map(String::len).collect();

        for w in &words {
            set.add(w);
        }

        prop_assert_eq!(set.len(), lengths.len());
        for w in &words {
            prop_assert!(set.contains(w));
        }
    }
}
