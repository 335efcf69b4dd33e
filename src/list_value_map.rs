//! ListValueMap: one key, an ordered list of values.
//!
//! Keys compare structurally (`K: Hash + Eq`); values compare with
//! `V: PartialEq`. A present key always owns a list, possibly empty;
//! absence of the key is the only "no entry" state.

use crate::ordered_table::{self, OrderedTable};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use log::trace;
use std::collections::hash_map::RandomState;

#[derive(Clone)]
pub struct ListValueMap<K, V, S = RandomState> {
    table: OrderedTable<K, Vec<V>, S>,
}

impl<K, V> ListValueMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self {
            table: OrderedTable::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, RandomState::new())
    }

    /// Builds a map from `(key, values)` pairs; a repeated key keeps its
    /// first position and its last list.
    pub fn of<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        L: IntoIterator<Item = V>,
    {
        entries.into_iter().collect()
    }
}

impl<K, V, S> Default for ListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> ListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            table: OrderedTable::with_hasher(hasher),
        }
    }

    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            table: OrderedTable::with_capacity_and_hasher(capacity, hasher),
        }
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get(key).map(Vec::as_slice)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut Vec<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.get_mut(key)
    }

    /// Replaces the whole list under `key` with a fresh copy of `values`,
    /// returning the previous list.
    pub fn set<I>(&mut self, key: K, values: I) -> Option<Vec<V>>
    where
        I: IntoIterator<Item = V>,
    {
        self.table.insert(key, values.into_iter().collect())
    }

    /// Appends `values` to the list under `key`, creating an empty list
    /// first when the key is absent. Duplicates are kept.
    pub fn push<I>(&mut self, key: K, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        self.table.get_or_insert_with(key, Vec::new).extend(values);
    }

    pub fn delete_by_key<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.remove(key).is_some()
    }

    /// Removes every listed key; true if at least one was present.
    pub fn delete_by_keys<'q, Q, I>(&mut self, keys: I) -> bool
    where
        K: Borrow<Q>,
        Q: 'q + ?Sized + Hash + Eq,
        I: IntoIterator<Item = &'q Q>,
    {
        let mut removed = false;
        for key in keys {
            removed |= self.delete_by_key(key);
        }
        removed
    }

    pub fn clear(&mut self) {
        trace!("clearing list map of {} entries", self.len());
        self.table.clear();
    }

    pub fn has_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.table.contains_key(key)
    }

    pub fn has_any_keys<'q, Q, I>(&self, keys: I) -> bool
    where
        K: Borrow<Q>,
        Q: 'q + ?Sized + Hash + Eq,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().any(|key| self.has_key(key))
    }

    pub fn has_all_keys<'q, Q, I>(&self, keys: I) -> bool
    where
        K: Borrow<Q>,
        Q: 'q + ?Sized + Hash + Eq,
        I: IntoIterator<Item = &'q Q>,
    {
        keys.into_iter().all(|key| self.has_key(key))
    }

    /// Borrowing iterator over `(key, values)` in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Calls `f` for each entry of a snapshot taken before the first call.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&K, &[V]),
    {
        let snapshot: Vec<_> = self.iter().collect();
        for (key, values) in snapshot {
            f(key, values);
        }
    }

    /// Like [`for_each`](Self::for_each), also passing the zero-based
    /// insertion-order position.
    pub fn for_each_indexed<F>(&self, mut f: F)
    where
        F: FnMut(usize, &K, &[V]),
    {
        let snapshot: Vec<_> = self.iter().collect();
        for (i, (key, values)) in snapshot.into_iter().enumerate() {
            f(i, key, values);
        }
    }

    /// Calls `f` until it returns `false`; no further entries are visited
    /// after that. Returns true when every entry was visited.
    pub fn for_each_breakable<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&K, &[V]) -> bool,
    {
        let snapshot: Vec<_> = self.iter().collect();
        snapshot.into_iter().all(|(key, values)| f(key, values))
    }
}

impl<K, V, S> ListValueMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    /// Removes every entry whose list contains `value`.
    pub fn delete_by_value(&mut self, value: &V) -> bool {
        let removed = self.table.retain(|_, values| !values.contains(value));
        trace!("list map: dropped {removed} entries holding a value");
        removed > 0
    }

    pub fn delete_by_values<'v, I>(&mut self, values: I) -> bool
    where
        V: 'v,
        I: IntoIterator<Item = &'v V>,
    {
        let mut removed = false;
        for value in values {
            removed |= self.delete_by_value(value);
        }
        removed
    }

    /// Removes all occurrences of `value` from the list under `key`. The
    /// entry stays even when its list becomes empty.
    pub fn delete_value_of_key<Q>(&mut self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let Some(values) = self.table.get_mut(key) else {
            return false;
        };
        let before = values.len();
        values.retain(|v| v != value);
        before != values.len()
    }

    pub fn has_key_value<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).is_some_and(|values| values.contains(value))
    }

    /// True if some stored list matches `candidate`.
    ///
    /// With `exact`, the stored list must equal `candidate` as a multiset.
    /// Without it, every candidate element must appear in the stored list.
    /// An empty candidate never matches.
    pub fn has_value(&self, candidate: &[V], exact: bool) -> bool {
        if candidate.is_empty() {
            return false;
        }
        self.table
            .iter()
            .any(|(_, stored)| list_matches(stored, candidate, exact))
    }

    /// Exact [`has_value`](Self::has_value) over several candidates,
    /// stopping at the first match.
    pub fn has_any_values<I>(&self, candidates: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<[V]>,
    {
        candidates
            .into_iter()
            .any(|candidate| self.has_value(candidate.as_ref(), true))
    }

    /// Exact [`has_value`](Self::has_value) over several candidates,
    /// stopping at the first miss.
    pub fn has_all_values<I>(&self, candidates: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<[V]>,
    {
        candidates
            .into_iter()
            .all(|candidate| self.has_value(candidate.as_ref(), true))
    }
}

impl<K, V, S> ListValueMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    pub fn keys(&self) -> Vec<K> {
        self.table.iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<Vec<V>> {
        self.table.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(K, Vec<V>)> {
        self.table
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

fn occurrences<V: PartialEq>(haystack: &[V], needle: &V) -> usize {
    haystack.iter().filter(|v| *v == needle).count()
}

fn list_matches<V: PartialEq>(stored: &[V], candidate: &[V], exact: bool) -> bool {
    if !exact {
        return candidate.iter().all(|c| stored.contains(c));
    }
    stored.len() == candidate.len()
        && candidate
            .iter()
            .all(|c| occurrences(stored, c) == occurrences(candidate, c))
}

/// Iterator over `(key, values)` in insertion order.
pub struct Iter<'a, K, V> {
    inner: ordered_table::Iter<'a, K, Vec<V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a [V]);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v.as_slice()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, S> IntoIterator for &'a ListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a [V]);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S, L> FromIterator<(K, L)> for ListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
    L: IntoIterator<Item = V>,
{
    fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S, L> Extend<(K, L)> for ListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
    L: IntoIterator<Item = V>,
{
    fn extend<I: IntoIterator<Item = (K, L)>>(&mut self, iter: I) {
        for (key, values) in iter {
            self.set(key, values);
        }
    }
}

/// Renders `key:[v1,v2];key2:[v3]` in insertion order.
impl<K, V, S> fmt::Display for ListValueMap<K, V, S>
where
    K: Eq + Hash + fmt::Display,
    V: fmt::Display,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, values)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{key}:[")?;
            write_joined(f, values)?;
            f.write_str("]")?;
        }
        Ok(())
    }
}

pub(crate) fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl<K, V, S> fmt::Debug for ListValueMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
