//! multi-maps: insertion-ordered maps that relax the one-key/one-value
//! shape of a plain map.
//!
//! - [`CompositeKeyMap`]: an ordered sequence of key parts maps to one value.
//! - [`ListValueMap`]: one key maps to an ordered list of values.
//! - [`ReadOnlyCompositeKeyMap`] / [`ReadOnlyListValueMap`]: frozen forms
//!   that own their map and expose only reads.
//!
//! Internal Design:
//!
//! Layers
//! - `OrderedTable<K, V, S>`: hashbrown index over a slotmap of entries,
//!   linked in insertion order; a debug-only reentrancy guard protects each
//!   entry point while user `Hash`/`Eq` code runs mid-probe.
//! - `ListValueMap<K, V, S>`: `OrderedTable<K, Vec<V>, S>` plus list-level
//!   mutation and exact/subset list matching.
//! - `CompositeKeyMap<K, V, H>`: a `ListValueMap<Surrogate, K>` holding the
//!   original key parts and an `OrderedTable<Surrogate, V>` holding values.
//!   The [`Surrogate`] is a digest of the key parts computed by the map's
//!   [`StructuralHasher`] ([`Blake3Structural`] by default).
//!
//! Invariants
//! - Both composite tables hold the same surrogates in the same order.
//!   Only one private insert helper and one private remove helper touch
//!   them, and each touches both.
//! - Key-part sequences of length zero never reach the tables.
//! - A present list key always has a list (possibly empty).
//!
//! Equality
//! - Keys and key parts: structural, through `Hash`/`Eq`. Composite lookups
//!   take parts of any [`KeyPart<K>`] type, which hashes like `K`, so
//!   `["a", "b"]` finds a key stored as `[String::from("a"), String::from("b")]`
//!   while a `u32` part cannot address `i32` keys.
//! - Values: `V: PartialEq`.
//!
//! Iteration
//! - `iter()` borrows and walks insertion order; it is restartable.
//! - `for_each*` callbacks run over a snapshot collected before the first
//!   call. `for_each_breakable` stops as soon as the callback returns
//!   `false`.
//! - `keys()`, `values()`, `entries()` return owned copies.
//!
//! Notes and non-goals
//! - Single-threaded; no interior mutability, so `&mut self` is the only
//!   synchronisation.
//! - Surrogate collisions are not detected; distinct keys with one digest
//!   would share an entry. With a 256-bit digest this is not a practical
//!   concern, but it is an assumption.

mod composite_key_map;
mod composite_key_map_proptest;
mod error;
mod list_value_map;
mod ordered_table;
mod ordered_table_proptest;
mod read_only;
mod reentrancy;
mod surrogate;

// Public surface
pub use composite_key_map::{CompositeKeyMap, Iter as CompositeIter};
pub use error::KeyPartsError;
pub use list_value_map::{Iter as ListIter, ListValueMap};
pub use read_only::{ReadOnlyCompositeKeyMap, ReadOnlyListValueMap};
pub use surrogate::{Blake3Structural, KeyPart, StructuralHasher, Surrogate};
