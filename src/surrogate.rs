//! Surrogate identifiers for key-part sequences.
//!
//! A native table can only index by one hashable value, so a composite key
//! is reduced to a [`Surrogate`]: a 256-bit digest of the `Hash` stream of
//! the whole sequence. Two sequences whose elements feed identical `Hash`
//! streams (element-wise structural equality, e.g. `String` and `&str`)
//! produce the same surrogate. Distinct sequences collide only if the
//! digest does; no further resolution is attempted.

use core::fmt;
use core::hash::{BuildHasher, Hash, Hasher};

/// Opaque 256-bit identifier derived from a sequence of key parts.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Surrogate([u8; blake3::OUT_LEN]);

impl Surrogate {
    pub const fn from_bytes(bytes: [u8; blake3::OUT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; blake3::OUT_LEN] {
        &self.0
    }

    /// Lowercase hex rendering, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    fn prefix(&self) -> u64 {
        let mut head = [0u8; 8];
        head.copy_from_slice(&self.0[..8]);
        u64::from_le_bytes(head)
    }
}

// The digest is already uniform; feeding its prefix to `SurrogateState`
// avoids hashing it a second time.
impl Hash for Surrogate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.prefix());
    }
}

impl fmt::Display for Surrogate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Surrogate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Surrogate({})", self.to_hex())
    }
}

/// Maps an ordered sequence of values to a [`Surrogate`].
///
/// Implementations must be deterministic for the lifetime of a map and
/// must give equal surrogates to sequences with equal `Hash` streams.
pub trait StructuralHasher {
    fn surrogate<T>(&self, parts: &T) -> Surrogate
    where
        T: Hash + ?Sized;
}

/// A lookup stand-in for a stored key part of type `K`.
///
/// Implementors must feed the same `Hash` stream as the `K` they stand for.
/// The key type itself and references to it qualify, as do `&str` for
/// owned string parts and `&[T]` for `Vec<T>` parts. Unrelated types do
/// not, so `&[u32::MAX]` cannot be used to look up `i32` parts, and an
/// unsuffixed literal takes the map's key type.
///
/// ```
/// use multi_maps::CompositeKeyMap;
///
/// let mut m: CompositeKeyMap<String, u8> = CompositeKeyMap::new();
/// m.set(["row1".to_string(), "col1".to_string()], 1);
/// assert_eq!(m.get(&["row1", "col1"]), Some(&1));
/// ```
///
/// ```compile_fail
/// use multi_maps::CompositeKeyMap;
///
/// let mut m: CompositeKeyMap<i32, &str> = CompositeKeyMap::new();
/// m.set([-1], "neg");
/// m.get(&[u32::MAX]);
/// ```
pub trait KeyPart<K: ?Sized>: Hash {}

impl<K: ?Sized + Hash> KeyPart<K> for K {}

impl<K: ?Sized + Hash> KeyPart<K> for &K {}

impl KeyPart<String> for &str {}

impl KeyPart<Box<str>> for &str {}

impl<T: Hash> KeyPart<Vec<T>> for &[T] {}

/// Hashes a part sequence as its length followed by each part in order.
pub(crate) struct PartSeq<'a, T>(pub(crate) &'a [T]);

impl<T: Hash> Hash for PartSeq<'_, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0.len() as u64);
        for part in self.0 {
            part.hash(state);
        }
    }
}

/// Default [`StructuralHasher`] backed by BLAKE3.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Blake3Structural {
    key: Option<[u8; blake3::KEY_LEN]>,
}

impl Blake3Structural {
    pub const fn new() -> Self {
        Self { key: None }
    }

    /// Uses BLAKE3's keyed mode, so surrogates are only reproducible by
    /// holders of `key`.
    pub const fn keyed(key: [u8; blake3::KEY_LEN]) -> Self {
        Self { key: Some(key) }
    }
}

impl StructuralHasher for Blake3Structural {
    fn surrogate<T>(&self, parts: &T) -> Surrogate
    where
        T: Hash + ?Sized,
    {
        let inner = match &self.key {
            Some(key) => blake3::Hasher::new_keyed(key),
            None => blake3::Hasher::new(),
        };
        let mut sink = DigestSink(inner);
        parts.hash(&mut sink);
        Surrogate(*sink.0.finalize().as_bytes())
    }
}

/// Adapts a BLAKE3 hasher to `core::hash::Hasher` so any `Hash` type can
/// stream into it.
struct DigestSink(blake3::Hasher);

impl Hasher for DigestSink {
    fn write(&mut self, bytes: &[u8]) {
        self.0.update(bytes);
    }

    fn finish(&self) -> u64 {
        Surrogate(*self.0.finalize().as_bytes()).prefix()
    }
}

/// `BuildHasher` for tables keyed by [`Surrogate`]: passes the digest
/// prefix through unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SurrogateState;

pub(crate) struct PassThrough(u64);

impl Hasher for PassThrough {
    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.0 = self.0.rotate_left(8) ^ u64::from(byte);
        }
    }

    fn write_u64(&mut self, i: u64) {
        self.0 = i;
    }

    fn finish(&self) -> u64 {
        self.0
    }
}

impl BuildHasher for SurrogateState {
    type Hasher = PassThrough;

    fn build_hasher(&self) -> Self::Hasher {
        PassThrough(0)
    }
}
