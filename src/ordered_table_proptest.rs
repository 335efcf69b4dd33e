#![cfg(test)]

// Property tests for OrderedTable kept inside the crate so they can reach
// the internal module.

use crate::ordered_table::OrderedTable;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    GetOrInsert(usize, i32),
    Remove(usize),
    Contains(String),
    Mutate(usize, i32),
    RetainOdd,
    Clear,
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,4}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::GetOrInsert(i, v)),
            3 => idx.clone().prop_map(Op::Remove),
            1 => prop_oneof![contains_pool, "[a-z]{0,4}"].prop_map(Op::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::RetainOdd),
            1 => Just(Op::Clear),
            2 => Just(Op::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn position(model: &[(Key, i32)], k: &Key) -> Option<usize> {
    model.iter().position(|(mk, _)| mk == k)
}

// State-machine equivalence against an insertion-ordered Vec model:
// - upserts keep the original position, new keys go to the back;
// - `get_or_insert_with` inserts only when absent;
// - removal and retention keep the relative order of survivors;
// - iteration order, `len` and the link structure match after every op.
fn run_against_model<S: BuildHasher>(
    mut sut: OrderedTable<Key, i32, S>,
    pool: Vec<String>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: Vec<(Key, i32)> = Vec::new();
    for op in ops {
        match op {
            Op::Insert(i, v) => {
                let k = Key(pool[i].clone());
                let prev = sut.insert(k.clone(), v);
                match position(&model, &k) {
                    Some(p) => {
                        prop_assert_eq!(prev, Some(model[p].1));
                        model[p].1 = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.push((k, v));
                    }
                }
            }
            Op::GetOrInsert(i, v) => {
                let k = Key(pool[i].clone());
                let got = *sut.get_or_insert_with(k.clone(), || v);
                match position(&model, &k) {
                    Some(p) => prop_assert_eq!(got, model[p].1),
                    None => {
                        prop_assert_eq!(got, v);
                        model.push((k, v));
                    }
                }
            }
            Op::Remove(i) => {
                let k = Key(pool[i].clone());
                let removed = sut.remove(k.0.as_str());
                match position(&model, &k) {
                    Some(p) => {
                        let expected = model.remove(p);
                        prop_assert_eq!(removed, Some(expected));
                    }
                    None => prop_assert!(removed.is_none()),
                }
            }
            Op::Contains(s) => {
                let has_model = model.iter().any(|(k, _)| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
                prop_assert_eq!(sut.get(s.as_str()).is_some(), has_model);
            }
            Op::Mutate(i, d) => {
                let k = Key(pool[i].clone());
                if let Some(v) = sut.get_mut(k.0.as_str()) {
                    *v = v.wrapping_add(d);
                }
                if let Some(p) = position(&model, &k) {
                    model[p].1 = model[p].1.wrapping_add(d);
                }
            }
            Op::RetainOdd => {
                let before = model.len();
                model.retain(|(_, v)| v % 2 != 0);
                let removed = sut.retain(|_, v| *v % 2 != 0);
                prop_assert_eq!(removed, before - model.len());
            }
            Op::Clear => {
                sut.clear();
                model.clear();
            }
            Op::Iterate => {
                let seen: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(&seen, &model);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        sut.assert_linked();
    }
    let seen: Vec<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
    prop_assert_eq!(seen, model);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_ordered_table_matches_model((pool, ops) in arb_scenario()) {
        run_against_model(OrderedTable::new(), pool, ops)?;
    }
}

// Collision variant: a constant hasher sends every key to one bucket so
// probing relies entirely on `Eq`.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_ordered_table_matches_model_with_collisions((pool, ops) in arb_scenario()) {
        run_against_model(OrderedTable::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}

// Keys hash through the Borrow<str> view identically to their owned form.
#[test]
fn borrowed_and_owned_hash_agree() {
    let state = std::collections::hash_map::RandomState::new();
    let owned = Key("abc".to_string());
    let mut a = state.build_hasher();
    owned.hash(&mut a);
    let mut b = state.build_hasher();
    "abc".to_string().hash(&mut b);
    assert_eq!(a.finish(), b.finish());
}
