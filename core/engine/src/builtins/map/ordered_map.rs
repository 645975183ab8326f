//! The insertion-ordered backing store of `Map`.

use crate::{object::JsObject, value::JsValue};
use indexmap::{Equivalent, IndexMap};
use rustc_hash::FxHasher;
use std::{
    fmt::Debug,
    hash::{BuildHasherDefault, Hash, Hasher},
};

#[derive(PartialEq, Eq, Clone, Debug)]
enum MapKey {
    Key(JsValue),
    // Tombstone left behind when an entry is removed under a live iterator;
    // the payload keeps tombstones unique.
    Empty(usize),
}

impl Hash for MapKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            MapKey::Key(v) => v.hash(state),
            MapKey::Empty(e) => e.hash(state),
        }
    }
}

impl Equivalent<MapKey> for JsValue {
    fn equivalent(&self, key: &MapKey) -> bool {
        match key {
            MapKey::Key(v) => v == self,
            MapKey::Empty(_) => false,
        }
    }
}

/// An insertion-ordered map keyed by `SameValueZero` equality.
///
/// While a lock is held, removals leave tombstones in place so that live
/// iterators keep observing a stable entry order; dropping the last lock
/// sweeps the tombstones.
#[derive(Clone)]
pub struct OrderedMap<V> {
    map: IndexMap<MapKey, Option<V>, BuildHasherDefault<FxHasher>>,
    lock: u32,
    empty_count: usize,
}

impl<V: Debug> Debug for OrderedMap<V> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        self.map.fmt(formatter)
    }
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedMap<V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            map: IndexMap::default(),
            lock: 0,
            empty_count: 0,
        }
    }

    /// The number of entries including tombstones; the bound live iterators
    /// walk over.
    #[must_use]
    pub fn full_len(&self) -> usize {
        self.map.len()
    }

    /// The number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len() - self.empty_count
    }

    /// Checks if the map has no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts a key-value pair, keeping the original position when the key
    /// already exists.
    pub fn insert(&mut self, key: JsValue, value: V) -> Option<V> {
        self.map.insert(MapKey::Key(key), Some(value)).flatten()
    }

    /// Removes the entry under `key` and returns its value.
    pub fn remove(&mut self, key: &JsValue) -> Option<V> {
        if self.lock == 0 {
            self.map.shift_remove(key).flatten()
        } else if self.map.contains_key(key) {
            self.map.insert(MapKey::Empty(self.empty_count), None);
            self.empty_count += 1;
            self.map.swap_remove(key).flatten()
        } else {
            None
        }
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.map.clear();
        self.map.shrink_to_fit();
        self.empty_count = 0;
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &JsValue) -> Option<&V> {
        self.map.get(key).and_then(Option::as_ref)
    }

    /// Gets the entry at `index`, skipping tombstones by returning `None`.
    ///
    /// Valid indices are `0 <= index < self.full_len()`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<(&JsValue, &V)> {
        if let (MapKey::Key(key), Some(value)) = self.map.get_index(index)? {
            Some((key, value))
        } else {
            None
        }
    }

    /// Iterates the live entries in insertion order.
    pub fn iter(&self) -> impl std::iter::Iterator<Item = (&JsValue, &V)> {
        self.map.iter().filter_map(|entry| {
            if let (MapKey::Key(key), Some(value)) = entry {
                Some((key, value))
            } else {
                None
            }
        })
    }

    /// Checks if `key` has a live entry.
    #[must_use]
    pub fn contains_key(&self, key: &JsValue) -> bool {
        self.map.contains_key(key)
    }

    /// Increments the lock counter and returns a guard that decrements it
    /// when dropped.
    pub(crate) fn lock(&mut self, map: JsObject) -> MapLock {
        self.begin_lock();
        MapLock(map)
    }

    /// Increments the lock counter without creating a guard; the caller is
    /// responsible for the matching [`Self::end_lock`].
    pub(crate) fn begin_lock(&mut self) {
        self.lock += 1;
    }

    /// Decrements the lock counter, sweeping tombstones when it reaches
    /// zero.
    pub(crate) fn end_lock(&mut self) {
        self.lock -= 1;
        if self.lock == 0 {
            self.map.retain(|k, _| matches!(k, MapKey::Key(_)));
            self.empty_count = 0;
        }
    }
}

/// Keeps the map's tombstones alive for the lifetime of an iteration.
#[derive(Debug)]
pub(crate) struct MapLock(JsObject);

impl Clone for MapLock {
    fn clone(&self) -> Self {
        let mut map = self.0.borrow_mut();
        let map = map.as_map_mut().expect("MapLock does not point to a map");
        map.lock(self.0.clone())
    }
}

impl Drop for MapLock {
    fn drop(&mut self) {
        // The iterator holding this lock is dropped while its map may
        // already be borrowed; skip the sweep in that case.
        let Ok(mut map) = self.0.try_borrow_mut() else {
            return;
        };
        if let Some(map) = map.as_map_mut() {
            map.end_lock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedMap;
    use crate::value::JsValue;

    #[test]
    fn same_value_zero_keys() {
        let mut map = OrderedMap::new();
        map.insert(JsValue::nan(), 1);
        map.insert(JsValue::nan(), 2);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&JsValue::nan()), Some(&2));

        map.insert(JsValue::Integer(0), 3);
        assert_eq!(map.get(&JsValue::Rational(-0.0)), Some(&3));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mut map = OrderedMap::new();
        map.insert(JsValue::from("b"), 1);
        map.insert(JsValue::from("a"), 2);
        map.insert(JsValue::from("b"), 3);
        let keys: Vec<_> = map.iter().map(|(k, _)| k.clone()).collect();
        assert_eq!(keys, vec![JsValue::from("b"), JsValue::from("a")]);
    }
}
