//! Cache Entry Module
//!
//! Defines the linked node that holds one key-value pair of a [`LinkedMap`].
//!
//! [`LinkedMap`]: crate::cache::LinkedMap

/// Sentinel index for a missing neighbour.
pub(crate) const NIL: usize = usize::MAX;

// == Cache Entry ==
/// Represents a single entry with its position links.
#[derive(Debug, Clone)]
pub struct CacheEntry<K, V> {
    /// The entry key
    pub key: K,
    /// The stored value
    pub value: V,
    /// Slot of the previous (older) entry, `NIL` at the front
    pub(crate) prev: usize,
    /// Slot of the next (newer) entry, `NIL` at the back
    pub(crate) next: usize,
}

impl<K, V> CacheEntry<K, V> {
    // == Constructor ==
    /// Creates a detached entry.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            prev: NIL,
            next: NIL,
        }
    }

    // == Is Detached ==
    /// Returns true when the entry has no neighbours.
    pub fn is_detached(&self) -> bool {
        self.prev == NIL && self.next == NIL
    }
}
