use thiserror::Error;

/// Reasons a key-part sequence cannot address a [`CompositeKeyMap`](crate::CompositeKeyMap).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyPartsError {
    #[error("composite key must have at least one part")]
    Empty,
}
