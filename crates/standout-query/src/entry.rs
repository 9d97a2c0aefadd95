//! The keyed element flowing through a pipeline.

/// A single `(key, value)` pair.
///
/// Entries are produced by a [`Source`](crate::Source) and passed from stage
/// to stage in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry<K, V> {
    /// The element's key.
    pub key: K,
    /// The element's value.
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Creates a new entry.
    pub fn new(key: K, value: V) -> Self {
        Entry { key, value }
    }

    /// Splits the entry into its key and value.
    pub fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

impl<K, V> From<(K, V)> for Entry<K, V> {
    fn from((key, value): (K, V)) -> Self {
        Entry { key, value }
    }
}
