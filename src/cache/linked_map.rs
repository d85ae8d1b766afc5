//! Linked Map Module
//!
//! Ordered key-value container used for LRU recency and insertion-ordered buckets.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::cache::entry::{CacheEntry, NIL};

// == Linked Map ==
/// Hash-indexed doubly-linked list of entries.
///
/// Entries live in an arena of slots linked by index:
/// - Front = oldest / least recently used
/// - Back = newest / most recently used
///
/// Insert, move-to-back, remove and pop-front are all O(1).
#[derive(Debug, Clone)]
pub struct LinkedMap<K, V> {
    /// Key to slot index
    index: HashMap<K, usize>,
    /// Arena of entries, `None` marks a free slot
    slots: Vec<Option<CacheEntry<K, V>>>,
    /// Recycled slot indices
    free: Vec<usize>,
    /// Oldest entry
    head: usize,
    /// Newest entry
    tail: usize,
}

impl<K, V> Default for LinkedMap<K, V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            slots: Vec::new(),
            free: Vec::new(),
            head: NIL,
            tail: NIL,
        }
    }
}

impl<K: Hash + Eq + Clone, V> LinkedMap<K, V> {
    // == Constructor ==
    /// Creates a new empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty map with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            ..Self::default()
        }
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    // == Contains ==
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    // == Get ==
    /// Returns the value for `key` without changing its position.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        Some(&self.entry(idx).value)
    }

    /// Mutable access to the value for `key` without changing its position.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = *self.index.get(key)?;
        Some(&mut self.entry_mut(idx).value)
    }

    // == Insert ==
    /// Inserts a key-value pair.
    ///
    /// A new key is appended at the back. An existing key keeps its position
    /// and the previous value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&idx) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entry_mut(idx).value, value));
        }

        let entry = CacheEntry::new(key.clone(), value);
        let idx = match self.free.pop() {
            Some(idx) => {
                self.slots[idx] = Some(entry);
                idx
            }
            None => {
                self.slots.push(Some(entry));
                self.slots.len() - 1
            }
        };
        self.link_back(idx);
        self.index.insert(key, idx);
        None
    }

    // == Move To Back ==
    /// Marks `key` as newest. Returns false if the key is absent.
    pub fn move_to_back<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(&idx) = self.index.get(key) else {
            return false;
        };
        if self.tail != idx {
            self.unlink(idx);
            self.link_back(idx);
        }
        true
    }

    // == Remove ==
    /// Removes `key` and returns its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let idx = self.index.remove(key)?;
        Some(self.release(idx).1)
    }

    // == Pop Front ==
    /// Removes and returns the oldest entry.
    pub fn pop_front(&mut self) -> Option<(K, V)> {
        if self.head == NIL {
            return None;
        }
        let idx = self.head;
        let (key, value) = self.release(idx);
        self.index.remove(&key);
        Some((key, value))
    }

    // == Front ==
    /// Returns the oldest entry without removing it.
    pub fn front(&self) -> Option<(&K, &V)> {
        if self.head == NIL {
            return None;
        }
        let entry = self.entry(self.head);
        Some((&entry.key, &entry.value))
    }

    /// Returns the newest entry without removing it.
    pub fn back(&self) -> Option<(&K, &V)> {
        if self.tail == NIL {
            return None;
        }
        let entry = self.entry(self.tail);
        Some((&entry.key, &entry.value))
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    // == Iteration ==
    /// Iterates entries from front (oldest) to back (newest).
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            map: self,
            cursor: self.head,
            remaining: self.len(),
        }
    }

    /// Iterates keys from front to back.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(k, _)| k)
    }

    // == Internals ==
    fn entry(&self, idx: usize) -> &CacheEntry<K, V> {
        self.slots[idx]
            .as_ref()
            .expect("linked slot must be occupied")
    }

    fn entry_mut(&mut self, idx: usize) -> &mut CacheEntry<K, V> {
        self.slots[idx]
            .as_mut()
            .expect("linked slot must be occupied")
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = {
            let entry = self.entry(idx);
            (entry.prev, entry.next)
        };
        if prev == NIL {
            self.head = next;
        } else {
            self.entry_mut(prev).next = next;
        }
        if next == NIL {
            self.tail = prev;
        } else {
            self.entry_mut(next).prev = prev;
        }
        let entry = self.entry_mut(idx);
        entry.prev = NIL;
        entry.next = NIL;
    }

    fn link_back(&mut self, idx: usize) {
        let tail = self.tail;
        {
            let entry = self.entry_mut(idx);
            entry.prev = tail;
            entry.next = NIL;
        }
        if tail == NIL {
            self.head = idx;
        } else {
            self.entry_mut(tail).next = idx;
        }
        self.tail = idx;
    }

    /// Unlinks the slot and frees it. The index map is left to the caller.
    fn release(&mut self, idx: usize) -> (K, V) {
        self.unlink(idx);
        let entry = self.slots[idx]
            .take()
            .expect("linked slot must be occupied");
        self.free.push(idx);
        (entry.key, entry.value)
    }
}

// == Iterator ==
/// Front-to-back iterator over a [`LinkedMap`].
pub struct Iter<'a, K, V> {
    map: &'a LinkedMap<K, V>,
    cursor: usize,
    remaining: usize,
}

impl<'a, K: Hash + Eq + Clone, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == NIL {
            return None;
        }
        let entry = self.map.entry(self.cursor);
        self.cursor = entry.next;
        self.remaining -= 1;
        Some((&entry.key, &entry.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}
