// CompositeKeyMap integration suite.
//
// Invariants exercised:
// - Round-trip: after set(k, v), get(k') == v for every k' structurally
//   equal to k, including a freshly built sequence of another type.
// - Empty key-part sequences are no-ops for mutators and absent for reads.
// - Deletion by key is idempotent; deletion by value removes every match.
// - Iteration, snapshots and rendering follow insertion order.
use multi_maps::{CompositeKeyMap, KeyPartsError};

fn seats() -> CompositeKeyMap<&'static str, &'static str> {
    CompositeKeyMap::of([(["row1", "col1"], "LiLei"), (["row2", "col2"], "HanMeimei")])
}

// Test: basic set/get.
// Verifies: a stored key is found again and counted once.
#[test]
fn set_then_get() {
    let mut m = CompositeKeyMap::new();
    m.set(["row1", "col1"], "LiLei");
    assert_eq!(m.get(&["row1", "col1"]), Some(&"LiLei"));
    assert_eq!(m.len(), 1);
}

// Test: structurally equal, separately built keys address the same entry.
#[test]
fn structurally_equal_keys_share_an_entry() {
    let mut m: CompositeKeyMap<String, i32> = CompositeKeyMap::new();
    let stored = vec!["x".to_string(), "y".to_string()];
    m.set(stored.clone(), 1);
    let rebuilt: Vec<String> = "x y".split(' ').map(str::to_string).collect();
    assert_eq!(m.get(&rebuilt), Some(&1));
    assert_eq!(m.get(&["x", "y"]), Some(&1));
    assert_eq!(m.set(rebuilt, 2), Some(1));
    assert_eq!(m.len(), 1);
    assert_eq!(m.keys(), [stored]);
}

// Test: unsuffixed literals take the key type, so narrow integer keys are
// found, counted and deleted through plain literals.
#[test]
fn literal_parts_infer_the_key_type() {
    let mut m: CompositeKeyMap<u8, &str> = CompositeKeyMap::new();
    m.set([1, 2], "x");
    assert_eq!(m.get(&[1, 2]), Some(&"x"));
    assert!(m.has_key(&[1, 2]));
    assert!(m.has_any_keys([[2, 1], [1, 2]]));
    assert_eq!(m.surrogate_of(&[1, 2]), m.surrogate_of(&[1u8, 2]));
    assert!(m.delete_by_key(&[1, 2]));
    assert!(m.is_empty());
}

// Test: borrowed stand-ins reach owned parts, wider ones never collide.
#[test]
fn stand_in_parts_hash_like_the_key() {
    let mut m: CompositeKeyMap<Vec<u8>, i32> = CompositeKeyMap::new();
    m.set([vec![1, 2], vec![3]], 1);
    assert_eq!(m.get(&[&[1u8, 2][..], &[3][..]]), Some(&1));
    assert_eq!(m.get(&[vec![1, 2], vec![3]]), Some(&1));

    let mut neg: CompositeKeyMap<i32, &str> = CompositeKeyMap::new();
    neg.set([-1], "neg");
    assert_eq!(neg.get(&[-1]), Some(&"neg"));
    let max = i32::MAX;
    assert_eq!(neg.get(&[&max]), None);
    assert_eq!(neg.get(&[&-1]), Some(&"neg"));
}

// Test: the absent sentinel is an ordinary key part and value.
#[test]
fn absent_parts_and_values() {
    let mut m: CompositeKeyMap<Option<&str>, Option<&str>> = CompositeKeyMap::of([([None], None)]);
    assert_eq!(m.len(), 1);
    assert!(m.has_key(&[None::<&str>]));
    assert!(!m.has_key(&[Some("")]));
    assert!(m.delete_by_values([&None]));
    assert_eq!(m.len(), 0);
}

// Test: empty keys never reach the tables.
#[test]
fn empty_keys_are_ignored() {
    let mut m = seats();
    let empty: Vec<&str> = Vec::new();
    assert_eq!(m.set(empty.clone(), "nobody"), None);
    assert_eq!(m.try_set(empty.clone(), "nobody"), Err(KeyPartsError::Empty));
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&empty), None);
    assert!(!m.delete_by_key(&empty));
    assert!(!m.has_key(&empty));
    assert_eq!(
        KeyPartsError::Empty.to_string(),
        "composite key must have at least one part"
    );
}

// Test: delete_by_key is idempotent.
#[test]
fn delete_by_key_twice() {
    let mut m = seats();
    assert!(m.delete_by_key(&["row1", "col1"]));
    assert!(!m.delete_by_key(&["row1", "col1"]));
    assert_eq!(m.len(), 1);
    assert!(!m.delete_by_key(&["nope"]));
    assert_eq!(m.len(), 1);
}

// Test: delete_by_keys tries every key and reports any success.
#[test]
fn delete_by_keys_reports_any_removal() {
    let mut m = seats();
    assert!(m.delete_by_keys([vec!["zzz"], vec!["row2", "col2"]]));
    assert!(!m.delete_by_keys([vec!["zzz"], vec!["row2", "col2"]]));
    assert_eq!(m.keys(), [vec!["row1", "col1"]]);
}

// Test: delete_by_value removes every entry holding that value.
#[test]
fn delete_by_value_removes_all_matches() {
    let mut m = seats();
    m.set(["row3", "col3"], "LiLei");
    assert!(m.delete_by_value(&"LiLei"));
    assert_eq!(m.values(), ["HanMeimei"]);
    assert!(!m.delete_by_value(&"LiLei"));
    assert!(!m.has_key(&["row3", "col3"]));
}

#[test]
fn predicates() {
    let m = seats();
    assert!(m.has_key_value(&["row1", "col1"], &"LiLei"));
    assert!(!m.has_key_value(&["row1", "col1"], &"HanMeimei"));
    assert!(m.has_any_keys([["x", "y"], ["row2", "col2"]]));
    assert!(!m.has_all_keys([["x", "y"], ["row2", "col2"]]));
    assert!(m.has_all_keys([["row1", "col1"], ["row2", "col2"]]));
    assert!(m.has_value(&"HanMeimei"));
    assert!(m.has_any_values([&"Jim", &"LiLei"]));
    assert!(!m.has_all_values([&"Jim", &"LiLei"]));
    assert!(m.has_all_values([&"HanMeimei", &"LiLei"]));
    assert!(m.is_not_empty());
}

#[test]
fn display_renders_in_insertion_order() {
    let m = seats();
    assert_eq!(m.to_string(), "[row1,col1]:LiLei;[row2,col2]:HanMeimei");
    assert_eq!(CompositeKeyMap::<i32, i32>::new().to_string(), "");
}

// Test: iteration is restartable and ordered.
#[test]
fn iteration_is_ordered_and_restartable() {
    let m = seats();
    let first: Vec<_> = m.iter().collect();
    let second: Vec<_> = (&m).into_iter().collect();
    assert_eq!(first, second);
    assert_eq!(first[0], (&["row1", "col1"][..], &"LiLei"));
    assert_eq!(m.iter().len(), 2);

    let mut indexed = Vec::new();
    m.for_each_indexed(|i, parts, v| indexed.push((i, parts.join("/"), *v)));
    assert_eq!(
        indexed,
        [
            (0, "row1/col1".to_string(), "LiLei"),
            (1, "row2/col2".to_string(), "HanMeimei")
        ]
    );
}

// Test: breakable iteration stops at the first `false`.
#[test]
fn for_each_breakable_halts() {
    let m = seats();
    let mut visited = 0;
    let completed = m.for_each_breakable(|_, v| {
        visited += 1;
        *v != "LiLei"
    });
    assert!(!completed);
    assert_eq!(visited, 1);

    let mut all = 0;
    assert!(m.for_each_breakable(|_, _| {
        all += 1;
        true
    }));
    assert_eq!(all, 2);
}

#[test]
fn snapshots_are_owned() {
    let mut m = seats();
    let entries = m.entries();
    m.clear();
    assert!(m.is_empty());
    assert_eq!(
        entries,
        [
            (vec!["row1", "col1"], "LiLei"),
            (vec!["row2", "col2"], "HanMeimei")
        ]
    );
}

#[test]
fn get_mut_updates_in_place() {
    let mut m: CompositeKeyMap<u32, Vec<u32>> = CompositeKeyMap::new();
    m.set([1, 2], vec![]);
    m.get_mut(&[1u32, 2]).unwrap().push(3);
    assert_eq!(m.get(&[1u32, 2]), Some(&vec![3]));
    assert!(m.get_mut(&[2u32, 1]).is_none());
}

#[test]
fn extend_and_collect() {
    let mut m: CompositeKeyMap<i32, char> = vec![(vec![1], 'a'), (vec![1, 2], 'b')]
        .into_iter()
        .collect();
    m.extend([(vec![1], 'c'), (vec![], 'x')]);
    assert_eq!(m.entries(), [(vec![1], 'c'), (vec![1, 2], 'b')]);
}

#[test]
fn keyed_capacity_constructor_keeps_keyed_surrogates() {
    use multi_maps::Blake3Structural;
    let keyed = Blake3Structural::keyed([7; 32]);
    let mut m = CompositeKeyMap::with_capacity_and_structural_hasher(16, keyed);
    m.set(["a", "b"], 1);
    let plain: CompositeKeyMap<&str, i32> = CompositeKeyMap::with_capacity(16);
    assert_eq!(m.get(&["a", "b"]), Some(&1));
    assert_ne!(m.surrogate_of(&["a", "b"]), plain.surrogate_of(&["a", "b"]));
}
