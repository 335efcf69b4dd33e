//! Read-only facades.
//!
//! Each facade owns its mutable map privately and forwards only the read
//! operations. There is no way back to the mutable map: no `into_inner`,
//! no `&mut` accessor, no `Deref`.

use crate::composite_key_map::{self, CompositeKeyMap};
use crate::error::KeyPartsError;
use crate::list_value_map::{self, ListValueMap};
use crate::surrogate::{Blake3Structural, KeyPart, StructuralHasher, Surrogate};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use std::collections::hash_map::RandomState;

/// A frozen [`ListValueMap`].
#[derive(Clone)]
pub struct ReadOnlyListValueMap<K, V, S = RandomState> {
    inner: ListValueMap<K, V, S>,
}

impl<K, V, S> From<ListValueMap<K, V, S>> for ReadOnlyListValueMap<K, V, S> {
    fn from(inner: ListValueMap<K, V, S>) -> Self {
        Self { inner }
    }
}

impl<K, V> ReadOnlyListValueMap<K, V>
where
    K: Eq + Hash,
{
    pub fn of<I, L>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, L)>,
        L: IntoIterator<Item = V>,
    {
        ListValueMap::of(entries).into()
    }
}

impl<K, V, S> ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        self.inner.is_not_empty()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.get(key)
    }

    pub fn has_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.has_key(key)
    }

    pub fn has_any_keys<'q, Q, I>(&self, keys: I) -> bool
    where
        K: Borrow<Q>,
        Q: 'q + ?Sized + Hash + Eq,
        I: IntoIterator<Item = &'q Q>,
    {
        self.inner.has_any_keys(keys)
    }

    pub fn has_all_keys<'q, Q, I>(&self, keys: I) -> bool
    where
        K: Borrow<Q>,
        Q: 'q + ?Sized + Hash + Eq,
        I: IntoIterator<Item = &'q Q>,
    {
        self.inner.has_all_keys(keys)
    }

    pub fn iter(&self) -> list_value_map::Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&K, &[V]),
    {
        self.inner.for_each(f)
    }

    pub fn for_each_indexed<F>(&self, f: F)
    where
        F: FnMut(usize, &K, &[V]),
    {
        self.inner.for_each_indexed(f)
    }

    pub fn for_each_breakable<F>(&self, f: F) -> bool
    where
        F: FnMut(&K, &[V]) -> bool,
    {
        self.inner.for_each_breakable(f)
    }
}

impl<K, V, S> ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash,
    V: PartialEq,
    S: BuildHasher,
{
    pub fn has_key_value<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.inner.has_key_value(key, value)
    }

    pub fn has_value(&self, candidate: &[V], exact: bool) -> bool {
        self.inner.has_value(candidate, exact)
    }

    pub fn has_any_values<I>(&self, candidates: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<[V]>,
    {
        self.inner.has_any_values(candidates)
    }

    pub fn has_all_values<I>(&self, candidates: I) -> bool
    where
        I: IntoIterator,
        I::Item: AsRef<[V]>,
    {
        self.inner.has_all_values(candidates)
    }
}

impl<K, V, S> ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash + Clone,
    V: Clone,
    S: BuildHasher,
{
    pub fn keys(&self) -> Vec<K> {
        self.inner.keys()
    }

    pub fn values(&self) -> Vec<Vec<V>> {
        self.inner.values()
    }

    pub fn entries(&self) -> Vec<(K, Vec<V>)> {
        self.inner.entries()
    }
}

impl<'a, K, V, S> IntoIterator for &'a ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a [V]);
    type IntoIter = list_value_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S, L> FromIterator<(K, L)> for ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
    L: IntoIterator<Item = V>,
{
    fn from_iter<I: IntoIterator<Item = (K, L)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<K, V, S> fmt::Display for ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash + fmt::Display,
    V: fmt::Display,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<K, V, S> fmt::Debug for ReadOnlyListValueMap<K, V, S>
where
    K: Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}

/// A frozen [`CompositeKeyMap`].
#[derive(Clone)]
pub struct ReadOnlyCompositeKeyMap<K, V, H = Blake3Structural> {
    inner: CompositeKeyMap<K, V, H>,
}

impl<K, V, H> From<CompositeKeyMap<K, V, H>> for ReadOnlyCompositeKeyMap<K, V, H> {
    fn from(inner: CompositeKeyMap<K, V, H>) -> Self {
        Self { inner }
    }
}

impl<K, V> ReadOnlyCompositeKeyMap<K, V>
where
    K: Hash,
{
    pub fn of<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, V)>,
        P: IntoIterator<Item = K>,
    {
        CompositeKeyMap::of(entries).into()
    }
}

impl<K, V, H> ReadOnlyCompositeKeyMap<K, V, H>
where
    H: StructuralHasher,
{
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_not_empty(&self) -> bool {
        self.inner.is_not_empty()
    }

    pub fn surrogate_of<Q>(&self, parts: &[Q]) -> Option<Surrogate>
    where
        Q: KeyPart<K>,
    {
        self.inner.surrogate_of(parts)
    }

    pub fn get<Q>(&self, parts: &[Q]) -> Option<&V>
    where
        Q: KeyPart<K>,
    {
        self.inner.get(parts)
    }

    pub fn try_get<Q>(&self, parts: &[Q]) -> Result<Option<&V>, KeyPartsError>
    where
        Q: KeyPart<K>,
    {
        self.inner.try_get(parts)
    }

    pub fn has_key<Q>(&self, parts: &[Q]) -> bool
    where
        Q: KeyPart<K>,
    {
        self.inner.has_key(parts)
    }

    pub fn has_any_keys<Q, P, I>(&self, keys: I) -> bool
    where
        Q: KeyPart<K>,
        P: AsRef<[Q]>,
        I: IntoIterator<Item = P>,
    {
        self.inner.has_any_keys(keys)
    }

    pub fn has_all_keys<Q, P, I>(&self, keys: I) -> bool
    where
        Q: KeyPart<K>,
        P: AsRef<[Q]>,
        I: IntoIterator<Item = P>,
    {
        self.inner.has_all_keys(keys)
    }

    pub fn iter(&self) -> composite_key_map::Iter<'_, K, V> {
        self.inner.iter()
    }

    pub fn for_each<F>(&self, f: F)
    where
        F: FnMut(&[K], &V),
    {
        self.inner.for_each(f)
    }

    pub fn for_each_indexed<F>(&self, f: F)
    where
        F: FnMut(usize, &[K], &V),
    {
        self.inner.for_each_indexed(f)
    }

    pub fn for_each_breakable<F>(&self, f: F) -> bool
    where
        F: FnMut(&[K], &V) -> bool,
    {
        self.inner.for_each_breakable(f)
    }
}

impl<K, V, H> ReadOnlyCompositeKeyMap<K, V, H>
where
    V: PartialEq,
    H: StructuralHasher,
{
    pub fn has_key_value<Q>(&self, parts: &[Q], value: &V) -> bool
    where
        Q: KeyPart<K>,
    {
        self.inner.has_key_value(parts, value)
    }

    pub fn has_value(&self, value: &V) -> bool {
        self.inner.has_value(value)
    }

    pub fn has_any_values<'v, I>(&self, values: I) -> bool
    where
        V: 'v,
        I: IntoIterator<Item = &'v V>,
    {
        self.inner.has_any_values(values)
    }

    pub fn has_all_values<'v, I>(&self, values: I) -> bool
    where
        V: 'v,
        I: IntoIterator<Item = &'v V>,
    {
        self.inner.has_all_values(values)
    }
}

impl<K, V, H> ReadOnlyCompositeKeyMap<K, V, H>
where
    K: Clone,
    V: Clone,
    H: StructuralHasher,
{
    pub fn keys(&self) -> Vec<Vec<K>> {
        self.inner.keys()
    }

    pub fn values(&self) -> Vec<V> {
        self.inner.values()
    }

    pub fn entries(&self) -> Vec<(Vec<K>, V)> {
        self.inner.entries()
    }
}

impl<'a, K, V, H> IntoIterator for &'a ReadOnlyCompositeKeyMap<K, V, H>
where
    H: StructuralHasher,
{
    type Item = (&'a [K], &'a V);
    type IntoIter = composite_key_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, H, P> FromIterator<(P, V)> for ReadOnlyCompositeKeyMap<K, V, H>
where
    K: Hash,
    H: StructuralHasher + Default,
    P: IntoIterator<Item = K>,
{
    fn from_iter<I: IntoIterator<Item = (P, V)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl<K, V, H> fmt::Display for ReadOnlyCompositeKeyMap<K, V, H>
where
    K: fmt::Display,
    V: fmt::Display,
    H: StructuralHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<K, V, H> fmt::Debug for ReadOnlyCompositeKeyMap<K, V, H>
where
    K: fmt::Debug,
    V: fmt::Debug,
    H: StructuralHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.inner, f)
    }
}
