//! CompositeKeyMap: an ordered sequence of key parts maps to one value.
//!
//! Every key-part sequence is reduced to a [`Surrogate`] by the map's
//! [`StructuralHasher`]. Two tables share that surrogate:
//!
//! - `key_parts`: surrogate -> the original parts, so keys can be listed;
//! - `values`: surrogate -> value.
//!
//! Only `insert_pair` and `remove_pair` write to the tables, and they
//! always write both, so the tables hold the same surrogates in the same
//! order at every public boundary. Iteration order is the insertion order
//! of `values`.
//!
//! Equality is split: key parts match structurally through the surrogate,
//! values match with `V: PartialEq`. Sequences with no parts are rejected:
//! mutators ignore them and lookups report absence.

use crate::error::KeyPartsError;
use crate::list_value_map::{write_joined, ListValueMap};
use crate::ordered_table::{self, OrderedTable};
use crate::surrogate::{Blake3Structural, KeyPart, PartSeq, StructuralHasher, Surrogate, SurrogateState};
use core::fmt;
use core::hash::Hash;
use log::{debug, trace};

#[derive(Clone)]
pub struct CompositeKeyMap<K, V, H = Blake3Structural> {
    structural: H,
    key_parts: ListValueMap<Surrogate, K, SurrogateState>,
    values: OrderedTable<Surrogate, V, SurrogateState>,
}

impl<K, V> CompositeKeyMap<K, V> {
    pub fn new() -> Self {
        Self::with_structural_hasher(Blake3Structural::new())
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_structural_hasher(capacity, Blake3Structural::new())
    }
}

impl<K, V> CompositeKeyMap<K, V>
where
    K: Hash,
{
    /// Builds a map from `(parts, value)` pairs, as repeated `set` calls.
    pub fn of<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, V)>,
        P: IntoIterator<Item = K>,
    {
        entries.into_iter().collect()
    }
}

impl<K, V, H> Default for CompositeKeyMap<K, V, H>
where
    H: StructuralHasher + Default,
{
    fn default() -> Self {
        Self::with_structural_hasher(H::default())
    }
}

impl<K, V, H> CompositeKeyMap<K, V, H>
where
    H: StructuralHasher,
{
    pub fn with_structural_hasher(structural: H) -> Self {
        Self::with_capacity_and_structural_hasher(0, structural)
    }

    pub fn with_capacity_and_structural_hasher(capacity: usize, structural: H) -> Self {
        Self {
            structural,
            key_parts: ListValueMap::with_capacity_and_hasher(capacity, SurrogateState),
            values: OrderedTable::with_capacity_and_hasher(capacity, SurrogateState),
        }
    }

    /// The surrogate `parts` would be stored under, or `None` when `parts`
    /// is empty. Does not consult the tables.
    pub fn surrogate_of<Q>(&self, parts: &[Q]) -> Option<Surrogate>
    where
        Q: KeyPart<K>,
    {
        self.digest(parts)
    }

    // Stored parts and lookup parts both go through here, so a `KeyPart`
    // stand-in and the key it stands for produce the same surrogate.
    fn digest<T: Hash>(&self, parts: &[T]) -> Option<Surrogate> {
        if parts.is_empty() {
            return None;
        }
        Some(self.structural.surrogate(&PartSeq(parts)))
    }

    fn insert_pair(&mut self, id: Surrogate, parts: Vec<K>, value: V) -> Option<V> {
        self.key_parts.set(id, parts);
        let previous = self.values.insert(id, value);
        debug_assert_eq!(self.key_parts.len(), self.values.len());
        trace!("composite map: stored {id}");
        previous
    }

    fn remove_pair(&mut self, id: &Surrogate) -> Option<V> {
        let value = self.values.remove(id).map(|(_, v)| v);
        let had_parts = self.key_parts.delete_by_key(id);
        debug_assert_eq!(value.is_some(), had_parts);
        debug_assert_eq!(self.key_parts.len(), self.values.len());
        if value.is_some() {
            trace!("composite map: removed {id}");
        }
        value
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn get<Q>(&self, parts: &[Q]) -> Option<&V>
    where
        Q: KeyPart<K>,
    {
        let id = self.surrogate_of(parts)?;
        self.values.get(&id)
    }

    /// Like [`get`](Self::get), but reports an empty key instead of
    /// folding it into absence.
    pub fn try_get<Q>(&self, parts: &[Q]) -> Result<Option<&V>, KeyPartsError>
    where
        Q: KeyPart<K>,
    {
        let id = self.surrogate_of(parts).ok_or(KeyPartsError::Empty)?;
        Ok(self.values.get(&id))
    }

    pub fn get_mut<Q>(&mut self, parts: &[Q]) -> Option<&mut V>
    where
        Q: KeyPart<K>,
    {
        let id = self.surrogate_of(parts)?;
        self.values.get_mut(&id)
    }

    /// Stores `value` under `parts`, returning the value it replaced.
    /// An empty `parts` is ignored.
    pub fn set<P>(&mut self, parts: P, value: V) -> Option<V>
    where
        P: IntoIterator<Item = K>,
        K: Hash,
    {
        match self.try_set(parts, value) {
            Ok(previous) => previous,
            Err(err) => {
                debug!("composite map: ignoring set: {err}");
                None
            }
        }
    }

    pub fn try_set<P>(&mut self, parts: P, value: V) -> Result<Option<V>, KeyPartsError>
    where
        P: IntoIterator<Item = K>,
        K: Hash,
    {
        let parts: Vec<K> = parts.into_iter().collect();
        let id = self.digest(parts.as_slice()).ok_or(KeyPartsError::Empty)?;
        Ok(self.insert_pair(id, parts, value))
    }

    pub fn clear(&mut self) {
        trace!("clearing composite map of {} entries", self.len());
        self.key_parts.clear();
        self.values.clear();
    }

    pub fn delete_by_key<Q>(&mut self, parts: &[Q]) -> bool
    where
        Q: KeyPart<K>,
    {
        match self.surrogate_of(parts) {
            Some(id) => self.remove_pair(&id).is_some(),
            None => false,
        }
    }

    /// Removes every listed key; true if at least one was present.
    pub fn delete_by_keys<Q, P, I>(&mut self, keys: I) -> bool
    where
        Q: KeyPart<K>,
        P: AsRef<[Q]>,
        I: IntoIterator<Item = P>,
    {
        let mut removed = false;
        for parts in keys {
            removed |= self.delete_by_key(parts.as_ref());
        }
        removed
    }

    /// True when a structurally equal key is stored. Looks the surrogate
    /// up in the key-part table rather than scanning.
    pub fn has_key<Q>(&self, parts: &[Q]) -> bool
    where
        Q: KeyPart<K>,
    {
        self.surrogate_of(parts)
            .is_some_and(|id| self.key_parts.has_key(&id))
    }

    pub fn has_any_keys<Q, P, I>(&self, keys: I) -> bool
    where
        Q: KeyPart<K>,
        P: AsRef<[Q]>,
        I: IntoIterator<Item = P>,
    {
        keys.into_iter().any(|parts| self.has_key(parts.as_ref()))
    }

    pub fn has_all_keys<Q, P, I>(&self, keys: I) -> bool
    where
        Q: KeyPart<K>,
        P: AsRef<[Q]>,
        I: IntoIterator<Item = P>,
    {
        keys.into_iter().all(|parts| self.has_key(parts.as_ref()))
    }

    /// Borrowing iterator over `(parts, value)` in insertion order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            values: self.values.iter(),
            key_parts: &self.key_parts,
        }
    }

    /// Calls `f` for each entry of a snapshot taken before the first call.
    pub fn for_each<F>(&self, mut f: F)
    where
        F: FnMut(&[K], &V),
    {
        let snapshot: Vec<_> = self.iter().collect();
        for (parts, value) in snapshot {
            f(parts, value);
        }
    }

    pub fn for_each_indexed<F>(&self, mut f: F)
    where
        F: FnMut(usize, &[K], &V),
    {
        let snapshot: Vec<_> = self.iter().collect();
        for (i, (parts, value)) in snapshot.into_iter().enumerate() {
            f(i, parts, value);
        }
    }

    /// Calls `f` until it returns `false`; no further entries are visited
    /// after that. Returns true when every entry was visited.
    pub fn for_each_breakable<F>(&self, mut f: F) -> bool
    where
        F: FnMut(&[K], &V) -> bool,
    {
        let snapshot: Vec<_> = self.iter().collect();
        snapshot.into_iter().all(|(parts, value)| f(parts, value))
    }

    /// Checks that both tables hold the same surrogates in the same order.
    #[cfg(test)]
    pub(crate) fn assert_paired(&self) {
        let ids: Vec<&Surrogate> = self.values.iter().map(|(id, _)| id).collect();
        let part_ids: Vec<&Surrogate> = self.key_parts.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, part_ids);
        for (id, parts) in self.key_parts.iter() {
            assert!(!parts.is_empty(), "stored key for {id} has no parts");
        }
    }
}

impl<K, V, H> CompositeKeyMap<K, V, H>
where
    V: PartialEq,
    H: StructuralHasher,
{
    /// Removes every entry whose value equals `value`.
    pub fn delete_by_value(&mut self, value: &V) -> bool {
        let doomed: Vec<Surrogate> = self
            .values
            .iter()
            .filter(|(_, v)| *v == value)
            .map(|(id, _)| *id)
            .collect();
        for id in &doomed {
            self.remove_pair(id);
        }
        !doomed.is_empty()
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

    pub fn has_key_value<Q>(&self, parts: &[Q], value: &V) -> bool
    where
        Q: KeyPart<K>,
    {
        self.get(parts).is_some_and(|stored| stored == value)
    }

    pub fn has_value(&self, value: &V) -> bool {
        self.values.iter().any(|(_, v)| v == value)
    }

    pub fn has_any_values<'v, I>(&self, values: I) -> bool
    where
        V: 'v,
        I: IntoIterator<Item = &'v V>,
    {
        values.into_iter().any(|value| self.has_value(value))
    }

    pub fn has_all_values<'v, I>(&self, values: I) -> bool
    where
        V: 'v,
        I: IntoIterator<Item = &'v V>,
    {
        values.into_iter().all(|value| self.has_value(value))
    }
}

impl<K, V, H> CompositeKeyMap<K, V, H>
where
    K: Clone,
    V: Clone,
    H: StructuralHasher,
{
    pub fn keys(&self) -> Vec<Vec<K>> {
        self.iter().map(|(parts, _)| parts.to_vec()).collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.values.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(Vec<K>, V)> {
        self.iter()
            .map(|(parts, value)| (parts.to_vec(), value.clone()))
            .collect()
    }
}

/// Iterator over `(parts, value)` in insertion order.
pub struct Iter<'a, K, V> {
    values: ordered_table::Iter<'a, Surrogate, V>,
    key_parts: &'a ListValueMap<Surrogate, K, SurrogateState>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a [K], &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, value) = self.values.next()?;
        // A missing key-part entry yields an empty slice rather than ending
        // the iteration.
        let parts = self.key_parts.get(id).unwrap_or(&[]);
        Some((parts, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.values.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<'a, K, V, H> IntoIterator for &'a CompositeKeyMap<K, V, H>
where
    H: StructuralHasher,
{
    type Item = (&'a [K], &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H, P> FromIterator<(P, V)> for CompositeKeyMap<K, V, H>
where
    K: Hash,
    H: StructuralHasher + Default,
    P: IntoIterator<Item = K>,
{
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, H, P> Extend<(P, V)> for CompositeKeyMap<K, V, H>
where
    K: Hash,
    H: StructuralHasher,
    P: IntoIterator<Item = K>,
{
    fn extend<I: IntoIterator<Item = (P, V)>>(&mut self, iter: I) {
        for (parts, value) in iter {
            self.set(parts, value);
        }
    }
}

/// Renders `[k1,k2]:value;[k3,k4]:value2` in insertion order.
impl<K, V, H> fmt::Display for CompositeKeyMap<K, V, H>
where
    K: fmt::Display,
    V: fmt::Display,
    H: StructuralHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (parts, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            f.write_str("[")?;
            write_joined(f, parts)?;
            write!(f, "]:{value}")?;
        }
        Ok(())
    }
}

impl<K, V, H> fmt::Debug for CompositeKeyMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
    H: StructuralHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
