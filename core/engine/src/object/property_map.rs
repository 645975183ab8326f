//! The ordered property table of an object.
//!
//! Indexed keys get dense `Vec` storage while they stay contiguous with
//! default attributes, spilling into a sparse table otherwise. Named keys
//! (strings and symbols) live in an insertion-ordered map. Own-key iteration
//! yields indices in ascending order, then string keys, then symbol keys,
//! both in insertion order.

use crate::{
    property::{PropertyDescriptor, PropertyKey},
    value::JsValue,
};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHasher};
use std::hash::BuildHasherDefault;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

fn dense_descriptor(value: JsValue) -> PropertyDescriptor {
    PropertyDescriptor::builder()
        .value(value)
        .writable(true)
        .enumerable(true)
        .configurable(true)
        .build()
}

fn is_dense_descriptor(desc: &PropertyDescriptor) -> bool {
    desc.is_data_descriptor()
        && desc.expect_writable()
        && desc.expect_enumerable()
        && desc.expect_configurable()
}

/// An ordered property table with dense element storage.
#[derive(Debug, Default)]
pub(crate) struct PropertyMap {
    dense: Vec<JsValue>,
    sparse: FxHashMap<u32, PropertyDescriptor>,
    named: FxIndexMap<PropertyKey, PropertyDescriptor>,
}

impl PropertyMap {
    /// Gets the descriptor stored under `key`.
    pub(crate) fn get(&self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => {
                if let Some(value) = self.dense.get(*index as usize) {
                    return Some(dense_descriptor(value.clone()));
                }
                self.sparse.get(index).cloned()
            }
            _ => self.named.get(key).cloned(),
        }
    }

    /// Checks for the presence of `key`.
    pub(crate) fn contains_key(&self, key: &PropertyKey) -> bool {
        match key {
            PropertyKey::Index(index) => {
                (*index as usize) < self.dense.len() || self.sparse.contains_key(index)
            }
            _ => self.named.contains_key(key),
        }
    }

    /// Inserts a descriptor, returning the previous one if present.
    pub(crate) fn insert(
        &mut self,
        key: &PropertyKey,
        desc: PropertyDescriptor,
    ) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => {
                let index = *index;
                let dense_len = self.dense.len() as u32;
                if is_dense_descriptor(&desc) && !self.sparse.contains_key(&index) {
                    if index < dense_len {
                        let old = std::mem::replace(
                            &mut self.dense[index as usize],
                            desc.expect_value(),
                        );
                        return Some(dense_descriptor(old));
                    }
                    if index == dense_len {
                        self.dense.push(desc.expect_value());
                        return None;
                    }
                }
                // Non-default attributes or a hole; fall back to the sparse
                // table, demoting any dense element at this index.
                if index < dense_len {
                    self.spill_dense();
                }
                self.sparse.insert(index, desc)
            }
            _ => self.named.insert(key.clone(), desc),
        }
    }

    /// Removes the property under `key`, preserving the relative order of
    /// the remaining properties.
    pub(crate) fn remove(&mut self, key: &PropertyKey) -> Option<PropertyDescriptor> {
        match key {
            PropertyKey::Index(index) => {
                let index = *index;
                if (index as usize) < self.dense.len() {
                    if index as usize == self.dense.len() - 1 {
                        return self.dense.pop().map(dense_descriptor);
                    }
                    self.spill_dense();
                }
                self.sparse.remove(&index)
            }
            _ => self.named.shift_remove(key),
        }
    }

    fn spill_dense(&mut self) {
        for (i, value) in self.dense.drain(..).enumerate() {
            self.sparse.insert(i as u32, dense_descriptor(value));
        }
    }

    /// The dense element storage, if every indexed property still lives
    /// there.
    pub(crate) fn dense_indexed_properties(&self) -> Option<&Vec<JsValue>> {
        self.sparse.is_empty().then_some(&self.dense)
    }

    /// Mutable dense element storage; see [`Self::dense_indexed_properties`].
    pub(crate) fn dense_indexed_properties_mut(&mut self) -> Option<&mut Vec<JsValue>> {
        self.sparse.is_empty().then_some(&mut self.dense)
    }

    /// All indexed keys, ascending.
    pub(crate) fn index_property_keys(&self) -> Vec<u32> {
        let mut keys: Vec<u32> = (0..self.dense.len() as u32).collect();
        keys.extend(self.sparse.keys().copied());
        keys.sort_unstable();
        keys
    }

    /// The largest indexed key plus one, i.e. the implied array length.
    pub(crate) fn index_property_len(&self) -> u32 {
        let sparse_len = self
            .sparse
            .keys()
            .copied()
            .max()
            .map_or(0, |max| max.saturating_add(1));
        (self.dense.len() as u32).max(sparse_len)
    }

    /// Removes every indexed property at or above `limit`.
    pub(crate) fn truncate_indexed(&mut self, limit: u32) {
        self.dense.truncate(limit as usize);
        self.sparse.retain(|index, _| *index < limit);
    }

    /// Named keys in insertion order: strings first, then symbols.
    pub(crate) fn named_property_keys(&self) -> Vec<PropertyKey> {
        let mut keys: Vec<PropertyKey> = self
            .named
            .keys()
            .filter(|key| matches!(key, PropertyKey::String(_)))
            .cloned()
            .collect();
        keys.extend(
            self.named
                .keys()
                .filter(|key| matches!(key, PropertyKey::Symbol(_)))
                .cloned(),
        );
        keys
    }

    /// All own keys in specification order.
    pub(crate) fn own_keys(&self) -> Vec<PropertyKey> {
        let mut keys: Vec<PropertyKey> = self
            .index_property_keys()
            .into_iter()
            .map(PropertyKey::Index)
            .collect();
        keys.extend(self.named_property_keys());
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data(value: i32) -> PropertyDescriptor {
        PropertyDescriptor::builder()
            .value(value)
            .writable(true)
            .enumerable(true)
            .configurable(true)
            .build()
    }

    #[test]
    fn dense_storage_stays_dense() {
        let mut map = PropertyMap::default();
        map.insert(&PropertyKey::Index(0), data(1));
        map.insert(&PropertyKey::Index(1), data(2));
        assert_eq!(map.dense_indexed_properties().map(Vec::len), Some(2));
    }

    #[test]
    fn holes_spill_to_sparse() {
        let mut map = PropertyMap::default();
        map.insert(&PropertyKey::Index(0), data(1));
        map.insert(&PropertyKey::Index(5), data(2));
        assert!(map.dense_indexed_properties().is_none());
        assert_eq!(map.index_property_len(), 6);
    }

    #[test]
    fn deletion_preserves_named_order() {
        let mut map = PropertyMap::default();
        map.insert(&"a".into(), data(1));
        map.insert(&"b".into(), data(2));
        map.insert(&"c".into(), data(3));
        map.remove(&"b".into());
        let keys: Vec<_> = map
            .named_property_keys()
            .into_iter()
            .filter_map(|k| k.as_string())
            .collect();
        assert_eq!(keys, vec!["a", "c"]);
    }
}
