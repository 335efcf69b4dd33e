//! OrderedTable: hash table that iterates in insertion order.
//!
//! Storage is a `SlotMap` of entries; a `hashbrown::HashTable` indexes the
//! slot keys by the entry's cached hash. Entries are additionally threaded
//! on a doubly-linked list (`prev`/`next` slot keys) so that iteration and
//! retention walk them in the order they were first inserted. Replacing the
//! value of an existing key keeps its position.

use crate::reentrancy::ReentrancyFlag;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table::Entry as IndexEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Slot<K, V> {
    key: K,
    value: V,
    hash: u64,
    prev: Option<DefaultKey>,
    next: Option<DefaultKey>,
}

#[derive(Clone)]
pub(crate) struct OrderedTable<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Slot<K, V>>,
    head: Option<DefaultKey>,
    tail: Option<DefaultKey>,
    reentrancy: ReentrancyFlag,
}

impl<K, V> OrderedTable<K, V>
where
    K: Eq + Hash,
{
    pub(crate) fn new() -> Self {
        Self::with_hasher(RandomState::new())
    }
}

impl<K, V, S> Default for OrderedTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Iterator over entries in insertion order.
pub(crate) struct Iter<'a, K, V> {
    slots: &'a SlotMap<DefaultKey, Slot<K, V>>,
    cursor: Option<DefaultKey>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.get(self.cursor?)?;
        self.cursor = slot.next;
        self.remaining -= 1;
        Some((&slot.key, &slot.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots,
            cursor: self.cursor,
            remaining: self.remaining,
        }
    }
}

impl<K, V, S> OrderedTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn with_hasher(hasher: S) -> Self {
        Self::with_capacity_and_hasher(0, hasher)
    }

    pub(crate) fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
            head: None,
            tail: None,
            reentrancy: ReentrancyFlag::new(),
        }
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find_slot<Q>(&self, hash: u64, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .is_some_and(|slot| slot.key.borrow() == q)
            })
            .copied()
    }

    pub(crate) fn find<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        self.find_slot(hash, q)
    }

    pub(crate) fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.find(q).is_some()
    }

    pub(crate) fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        self.slots.get(k).map(|slot| &slot.value)
    }

    pub(crate) fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let k = self.find(q)?;
        self.slots.get_mut(k).map(|slot| &mut slot.value)
    }

    /// Inserts or replaces the value under `key`.
    ///
    /// A replaced entry keeps its original key and position; the previous
    /// value is returned.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        let g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let fresh = match self.index.entry(
            hash,
            |&k| self.slots.get(k).is_some_and(|slot| slot.key == key),
            |&k| self.slots.get(k).map_or(0, |slot| slot.hash),
        ) {
            IndexEntry::Occupied(o) => {
                let k = *o.get();
                return self
                    .slots
                    .get_mut(k)
                    .map(|slot| core::mem::replace(&mut slot.value, value));
            }
            IndexEntry::Vacant(v) => {
                let k = self.slots.insert(Slot {
                    key,
                    value,
                    hash,
                    prev: self.tail,
                    next: None,
                });
                let _ = v.insert(k);
                k
            }
        };
        drop(g);
        self.link_back(fresh);
        None
    }

    /// Returns the value under `key`, inserting `default()` at the back
    /// first when the key is absent. `default` only runs on insertion.
    pub(crate) fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let g = self.reentrancy.enter();
        let hash = self.make_hash(&key);
        let (k, fresh) = match self.index.entry(
            hash,
            |&k| self.slots.get(k).is_some_and(|slot| slot.key == key),
            |&k| self.slots.get(k).map_or(0, |slot| slot.hash),
        ) {
            IndexEntry::Occupied(o) => (*o.get(), false),
            IndexEntry::Vacant(v) => {
                let k = self.slots.insert(Slot {
                    key,
                    value: default(),
                    hash,
                    prev: self.tail,
                    next: None,
                });
                let _ = v.insert(k);
                (k, true)
            }
        };
        drop(g);
        if fresh {
            self.link_back(k);
        }
        &mut self.slots[k].value
    }

    pub(crate) fn remove<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let g = self.reentrancy.enter();
        let hash = self.make_hash(q);
        let k = match self.index.find_entry(hash, |&k| {
            self.slots
                .get(k)
                .is_some_and(|slot| slot.key.borrow() == q)
        }) {
            Ok(o) => o.remove().0,
            Err(_) => return None,
        };
        drop(g);
        self.unlink(k)
    }

    /// Keeps only the entries for which `keep` returns true, visiting them
    /// in insertion order. Returns how many entries were removed.
    pub(crate) fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut removed = 0;
        let mut cursor = self.head;
        while let Some(k) = cursor {
            let Some(slot) = self.slots.get_mut(k) else {
                break;
            };
            cursor = slot.next;
            if keep(&slot.key, &mut slot.value) {
                continue;
            }
            let hash = slot.hash;
            if let Ok(o) = self.index.find_entry(hash, |&kk| kk == k) {
                let _ = o.remove();
            }
            self.unlink(k);
            removed += 1;
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.head = None;
        self.tail = None;
    }

    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: &self.slots,
            cursor: self.head,
            remaining: self.slots.len(),
        }
    }

    fn link_back(&mut self, k: DefaultKey) {
        match self.tail {
            Some(t) => {
                if let Some(last) = self.slots.get_mut(t) {
                    last.next = Some(k);
                }
            }
            None => self.head = Some(k),
        }
        self.tail = Some(k);
    }

    // Caller has already dropped `k` from the index.
    fn unlink(&mut self, k: DefaultKey) -> Option<(K, V)> {
        let slot = self.slots.remove(k)?;
        match slot.prev {
            Some(p) => {
                if let Some(before) = self.slots.get_mut(p) {
                    before.next = slot.next;
                }
            }
            None => self.head = slot.next,
        }
        match slot.next {
            Some(n) => {
                if let Some(after) = self.slots.get_mut(n) {
                    after.prev = slot.prev;
                }
            }
            None => self.tail = slot.prev,
        }
        Some((slot.key, slot.value))
    }

    /// Walks the links both ways and checks them against the slot and
    /// index counts.
    #[cfg(test)]
    pub(crate) fn assert_linked(&self) {
        assert_eq!(self.index.len(), self.slots.len());
        let mut forward = Vec::new();
        let mut cursor = self.head;
        while let Some(k) = cursor {
            forward.push(k);
            cursor = self.slots[k].next;
        }
        let mut backward = Vec::new();
        let mut cursor = self.tail;
        while let Some(k) = cursor {
            backward.push(k);
            cursor = self.slots[k].prev;
        }
        backward.reverse();
        assert_eq!(forward.len(), self.slots.len());
        assert_eq!(forward, backward);
    }
}

impl<K, V, S> fmt::Debug for OrderedTable<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::hash::Hasher;

    fn keys_in_order<V>(t: &OrderedTable<String, V>) -> Vec<&str> {
        t.iter().map(|(k, _)| k.as_str()).collect()
    }

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

    /// Invariant: iteration follows first-insertion order.
    #[test]
    fn iteration_follows_insertion_order() {
        let mut t = OrderedTable::new();
        for k in ["c", "a", "b", "z"] {
            t.insert(k.to_string(), k.len());
        }
        assert_eq!(keys_in_order(&t), ["c", "a", "b", "z"]);
        assert_eq!(t.iter().len(), 4);
        t.assert_linked();
    }

    /// Invariant: replacing a value returns the old one and keeps position.
    #[test]
    fn replace_keeps_position() {
        let mut t = OrderedTable::new();
        t.insert("a".to_string(), 1);
        t.insert("b".to_string(), 2);
        assert_eq!(t.insert("a".to_string(), 10), Some(1));
        assert_eq!(keys_in_order(&t), ["a", "b"]);
        assert_eq!(t.get("a"), Some(&10));
        assert_eq!(t.len(), 2);
    }

    /// Invariant: removal from the head, middle and tail relinks neighbours.
    #[test]
    fn remove_relinks_neighbours() {
        let mut t = OrderedTable::new();
        for (i, k) in ["a", "b", "c", "d", "e"].into_iter().enumerate() {
            t.insert(k.to_string(), i);
        }
        assert_eq!(t.remove("c"), Some(("c".to_string(), 2)));
        t.assert_linked();
        assert_eq!(t.remove("a").map(|(_, v)| v), Some(0));
        t.assert_linked();
        assert_eq!(t.remove("e").map(|(_, v)| v), Some(4));
        t.assert_linked();
        assert_eq!(keys_in_order(&t), ["b", "d"]);
        assert!(t.remove("a").is_none());

        // Reinsertion goes to the back.
        t.insert("a".to_string(), 9);
        assert_eq!(keys_in_order(&t), ["b", "d", "a"]);
        t.assert_linked();
    }

    /// Invariant: `find(k).is_some() == contains_key(k)`, with borrowed lookup.
    #[test]
    fn find_contains_parity_with_str() {
        let mut t: OrderedTable<String, i32> = OrderedTable::new();
        t.insert("hello".to_string(), 1);
        assert!(t.contains_key("hello"));
        assert!(t.find("hello").is_some());
        assert!(!t.contains_key("world"));
        assert!(t.find("world").is_none());
    }

    /// Invariant: `get_or_insert_with` is lazy and appends new keys.
    #[test]
    fn get_or_insert_with_is_lazy() {
        let mut t: OrderedTable<String, Vec<i32>> = OrderedTable::new();
        let calls = Cell::new(0);
        t.get_or_insert_with("k".to_string(), || {
            calls.set(calls.get() + 1);
            Vec::new()
        })
        .push(1);
        t.get_or_insert_with("k".to_string(), || {
            calls.set(calls.get() + 1);
            Vec::new()
        })
        .push(2);
        assert_eq!(calls.get(), 1);
        assert_eq!(t.get("k").map(Vec::as_slice), Some(&[1, 2][..]));
        t.assert_linked();
    }

    /// Invariant: `retain` removes exactly the rejected entries and keeps
    /// the order of the survivors.
    #[test]
    fn retain_drops_rejected_entries() {
        let mut t = OrderedTable::new();
        for i in 0..10 {
            t.insert(format!("k{i}"), i);
        }
        let removed = t.retain(|_, v| *v % 3 != 0);
        assert_eq!(removed, 4);
        assert_eq!(
            keys_in_order(&t),
            ["k1", "k2", "k4", "k5", "k7", "k8"]
        );
        assert!(!t.contains_key("k0"));
        assert!(!t.contains_key("k9"));
        t.assert_linked();
    }

    /// Invariant: `clear` empties storage, index and links.
    #[test]
    fn clear_resets_everything() {
        let mut t = OrderedTable::new();
        t.insert("a".to_string(), 1);
        t.insert("b".to_string(), 2);
        t.clear();
        assert!(t.is_empty());
        assert_eq!(t.iter().count(), 0);
        t.insert("c".to_string(), 3);
        assert_eq!(keys_in_order(&t), ["c"]);
        t.assert_linked();
    }

    /// Invariant: lookups and removals stay correct when every key shares
    /// one hash bucket.
    #[test]
    fn collision_handling_with_const_hasher() {
        let mut t: OrderedTable<String, i32, ConstBuildHasher> =
            OrderedTable::with_hasher(ConstBuildHasher);
        t.insert("a".to_string(), 1);
        t.insert("b".to_string(), 2);
        t.insert("c".to_string(), 3);
        assert_eq!(t.get("b"), Some(&2));
        assert_eq!(t.remove("b").map(|(_, v)| v), Some(2));
        assert_eq!(t.get("a"), Some(&1));
        assert_eq!(t.get("c"), Some(&3));
        assert!(t.get("b").is_none());
        t.assert_linked();
    }

    /// Invariant (debug-only): re-entering the table from `K: Eq` while it
    /// probes panics.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_find() {
        struct ReentryKey {
            id: &'static str,
            table: *const OrderedTable<ReentryKey, i32, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    unsafe {
                        let t = &*other.table;
                        let _ = t.contains_key(self.id);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
        impl Borrow<str> for ReentryKey {
            fn borrow(&self) -> &str {
                self.id
            }
        }

        let mut t: OrderedTable<ReentryKey, i32, ConstBuildHasher> =
            OrderedTable::with_hasher(ConstBuildHasher);
        let table = &t as *const _;
        t.insert(
            ReentryKey {
                id: "a",
                table,
                trigger: false,
            },
            1,
        );
        let query = ReentryKey {
            id: "b",
            table: &t as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = t.find(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }

    #[test]
    fn debug_renders_in_order() {
        let mut t = OrderedTable::new();
        t.insert("b".to_string(), 2);
        t.insert("a".to_string(), 1);
        assert_eq!(format!("{t:?}"), r#"{"b": 2, "a": 1}"#);
    }
}
