#![cfg(test)]

// Property tests for CompositeKeyMap kept inside the crate so the two-table
// pairing can be checked after every step.

use crate::composite_key_map::CompositeKeyMap;
use crate::surrogate::{Blake3Structural, StructuralHasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

#[derive(Clone, Debug)]
enum Op {
    Set(Vec<u8>, i32),
    Delete(Vec<u8>),
    DeleteKeys(Vec<Vec<u8>>),
    DeleteValue(i32),
    DeleteValues(Vec<i32>),
    Bump(Vec<u8>),
    Clear,
}

// Short sequences over a tiny alphabet so keys repeat often; empty
// sequences are part of the input space.
fn arb_parts() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(0u8..3, 0..=3)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (arb_parts(), 0i32..4).prop_map(|(p, v)| Op::Set(p, v)),
        3 => arb_parts().prop_map(Op::Delete),
        1 => proptest::collection::vec(arb_parts(), 0..3).prop_map(Op::DeleteKeys),
        1 => (0i32..4).prop_map(Op::DeleteValue),
        1 => proptest::collection::vec(0i32..4, 0..3).prop_map(Op::DeleteValues),
        2 => arb_parts().prop_map(Op::Bump),
        1 => Just(Op::Clear),
    ]
}

fn position(model: &[(Vec<u8>, i32)], parts: &[u8]) -> Option<usize> {
    model.iter().position(|(k, _)| k == parts)
}

// State-machine equivalence against an insertion-ordered Vec model:
// - both tables hold the same surrogates in the same order after every op;
// - replacing a value keeps the key's position, new keys go to the back;
// - empty key-part sequences never reach either table;
// - deleting a key twice yields true then false;
// - every model key reads back its value through a rebuilt key.
fn run_against_model<H: StructuralHasher>(
    mut m: CompositeKeyMap<u8, i32, H>,
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: Vec<(Vec<u8>, i32)> = Vec::new();
    for op in ops {
        match op {
            Op::Set(parts, v) => {
                let prev = m.set(parts.clone(), v);
                if parts.is_empty() {
                    prop_assert_eq!(prev, None);
                } else {
                    match position(&model, &parts) {
                        Some(p) => {
                            prop_assert_eq!(prev, Some(model[p].1));
                            model[p].1 = v;
                        }
                        None => {
                            prop_assert_eq!(prev, None);
                            model.push((parts, v));
                        }
                    }
                }
            }
            Op::Delete(parts) => {
                let present = position(&model, &parts).is_some();
                prop_assert_eq!(m.delete_by_key(&parts), present);
                prop_assert!(!m.delete_by_key(&parts));
                model.retain(|(k, _)| *k != parts);
            }
            Op::DeleteKeys(keys) => {
                let any = keys.iter().any(|parts| position(&model, parts).is_some());
                prop_assert_eq!(m.delete_by_keys(&keys), any);
                model.retain(|(k, _)| !keys.contains(k));
            }
            Op::DeleteValue(v) => {
                let present = model.iter().any(|(_, mv)| *mv == v);
                prop_assert_eq!(m.delete_by_value(&v), present);
                model.retain(|(_, mv)| *mv != v);
            }
            Op::DeleteValues(vs) => {
                let any = model.iter().any(|(_, mv)| vs.contains(mv));
                prop_assert_eq!(m.delete_by_values(&vs), any);
                model.retain(|(_, mv)| !vs.contains(mv));
            }
            Op::Bump(parts) => {
                let got = m.get_mut(&parts).map(|v| {
                    *v = v.wrapping_add(1);
                    *v
                });
                let expected = position(&model, &parts).map(|p| {
                    model[p].1 = model[p].1.wrapping_add(1);
                    model[p].1
                });
                prop_assert_eq!(got, expected);
            }
            Op::Clear => {
                m.clear();
                model.clear();
            }
        }

        m.assert_paired();
        prop_assert_eq!(m.len(), model.len());
        prop_assert_eq!(m.entries(), model.clone());
        for (parts, v) in &model {
            let rebuilt: Vec<u8> = parts.iter().copied().collect();
            prop_assert_eq!(m.get(&rebuilt), Some(v));
            prop_assert!(m.has_key(parts));
            prop_assert!(m.has_key_value(parts, v));
        }
    }
    Ok(())
}

proptest! {
    #[test]
    fn prop_tables_stay_paired_default_hasher(ops in proptest::collection::vec(arb_op(), 1..80)) {
        run_against_model(CompositeKeyMap::new(), ops)?;
    }
}

proptest! {
    #[test]
    fn prop_tables_stay_paired_keyed_hasher(ops in proptest::collection::vec(arb_op(), 1..80)) {
        let keyed = Blake3Structural::keyed([0x5a; blake3::KEY_LEN]);
        run_against_model(CompositeKeyMap::with_structural_hasher(keyed), ops)?;
    }
}
