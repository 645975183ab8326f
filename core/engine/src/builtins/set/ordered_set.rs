//! The insertion-ordered backing store of `Set`, sharing the tombstone
//! machinery of the map store.

use crate::builtins::map::ordered_map::OrderedMap;
use crate::object::JsObject;
use crate::value::JsValue;
use std::fmt::Debug;

/// An insertion-ordered set keyed by `SameValueZero` equality.
#[derive(Clone, Default)]
pub struct OrderedSet {
    inner: OrderedMap<()>,
}

impl Debug for OrderedSet {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.inner.fmt(formatter)
    }
}

impl OrderedSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of entries including tombstones.
    #[must_use]
    pub fn full_len(&self) -> usize {
        self.inner.full_len()
    }

    /// The number of live entries.
    #[must_use]
    pub fn size(&self) -> usize {
        self.inner.len()
    }

    /// Checks if the set has no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Adds a value, keeping its original position when it already exists.
    pub fn add(&mut self, value: JsValue) {
        self.inner.insert(value, ());
    }

    /// Removes `value`, returning whether it was present.
    pub fn delete(&mut self, value: &JsValue) -> bool {
        self.inner.remove(value).is_some()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Checks if `value` is in the set.
    #[must_use]
    pub fn contains(&self, value: &JsValue) -> bool {
        self.inner.contains_key(value)
    }

    /// Gets the value at `index`, skipping tombstones by returning `None`.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&JsValue> {
        self.inner.get_index(index).map(|(value, ())| value)
    }

    /// Iterates the live values in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &JsValue> {
        self.inner.iter().map(|(value, ())| value)
    }

    /// Increments the lock counter and returns a guard that decrements it
    /// when dropped.
    pub(crate) fn lock(&mut self, set: JsObject) -> SetLock {
        self.inner.begin_lock();
        SetLock(set)
    }
}

/// Keeps the set's tombstones alive for the lifetime of an iteration.
#[derive(Debug)]
pub(crate) struct SetLock(JsObject);

impl Drop for SetLock {
    fn drop(&mut self) {
        let Ok(mut set) = self.0.try_borrow_mut() else {
            return;
        };
        if let Some(set) = set.as_set_mut() {
            set.inner.end_lock();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::OrderedSet;
    use crate::value::JsValue;

    #[test]
    fn zero_canonicalization_is_observable() {
        let mut set = OrderedSet::new();
        set.add(JsValue::Rational(0.0));
        assert!(set.contains(&JsValue::Rational(-0.0)));
        assert_eq!(set.size(), 1);
    }
}
