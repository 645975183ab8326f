//! Property attributes, keys and descriptors.
//!
//! A property descriptor is either a *data* descriptor (`value`, `writable`)
//! or an *accessor* descriptor (`get`, `set`); both carry `enumerable` and
//! `configurable`. Every flag is optional so that redefinitions can inherit
//! the attributes that they leave unset.

use crate::{string::JsString, symbol::JsSymbol, value::JsValue};
use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// The flag bits of a fully-populated data descriptor.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Attribute: u8 {
        /// The `[[Writable]]` attribute.
        const WRITABLE = 0b0000_0001;

        /// The `[[Enumerable]]` attribute.
        const ENUMERABLE = 0b0000_0010;

        /// The `[[Configurable]]` attribute.
        const CONFIGURABLE = 0b0000_0100;
    }
}

impl Attribute {
    /// The property is read-only.
    pub const READONLY: Self = Self::empty();

    /// The property is hidden from `for-in` and `Object.keys`.
    pub const NON_ENUMERABLE: Self = Self::empty();

    /// The property cannot be deleted or reshaped.
    pub const PERMANENT: Self = Self::empty();

    /// Checks if the `WRITABLE` bit is set.
    #[must_use]
    pub const fn writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    /// Checks if the `ENUMERABLE` bit is set.
    #[must_use]
    pub const fn enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    /// Checks if the `CONFIGURABLE` bit is set.
    #[must_use]
    pub const fn configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }
}

impl Default for Attribute {
    fn default() -> Self {
        Self::WRITABLE | Self::ENUMERABLE | Self::CONFIGURABLE
    }
}

/// The key of an own property: an interned string, an array index or a
/// symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// A string property key.
    String(JsString),
    /// A canonical numeric index below `2^32 - 1`.
    Index(u32),
    /// A symbol property key.
    Symbol(JsSymbol),
}

impl PropertyKey {
    /// Returns the string representation of this key, or `None` for symbols.
    #[must_use]
    pub fn as_string(&self) -> Option<JsString> {
        match self {
            Self::String(string) => Some(string.clone()),
            Self::Index(index) => Some(JsString::from(index.to_string())),
            Self::Symbol(_) => None,
        }
    }

    /// Returns the symbol of this key, if it is one.
    #[must_use]
    pub const fn as_symbol(&self) -> Option<&JsSymbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            _ => None,
        }
    }

    /// Returns the canonical array index of this key, if it is one.
    #[must_use]
    pub const fn as_index(&self) -> Option<u32> {
        match self {
            Self::Index(index) => Some(*index),
            _ => None,
        }
    }

    /// Converts the key into the value domain, as used by proxy traps and
    /// `ownKeys` results.
    #[must_use]
    pub fn to_value(&self) -> JsValue {
        match self {
            Self::String(string) => string.clone().into(),
            Self::Index(index) => JsString::from(index.to_string()).into(),
            Self::Symbol(symbol) => symbol.clone().into(),
        }
    }
}

impl From<JsString> for PropertyKey {
    fn from(string: JsString) -> Self {
        match string.as_array_index() {
            Some(index) => Self::Index(index),
            None => Self::String(string),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(string: &str) -> Self {
        JsString::from(string).into()
    }
}

impl From<JsSymbol> for PropertyKey {
    fn from(symbol: JsSymbol) -> Self {
        Self::Symbol(symbol)
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        Self::Index(index)
    }
}

impl From<usize> for PropertyKey {
    fn from(index: usize) -> Self {
        match u32::try_from(index) {
            Ok(index) if index < u32::MAX => Self::Index(index),
            _ => Self::String(JsString::from(index.to_string())),
        }
    }
}

impl From<u64> for PropertyKey {
    fn from(index: u64) -> Self {
        match u32::try_from(index) {
            Ok(index) if index < u32::MAX => Self::Index(index),
            _ => Self::String(JsString::from(index.to_string())),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(string) => string.fmt(f),
            Self::Index(index) => index.fmt(f),
            Self::Symbol(symbol) => symbol.fmt(f),
        }
    }
}

/// Which part of an entry a collection iterator yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyNameKind {
    /// Yield the key.
    Key,
    /// Yield the value.
    Value,
    /// Yield a `[key, value]` pair.
    KeyAndValue,
}

#[derive(Debug, Clone, PartialEq)]
enum DescriptorKind {
    Data {
        value: Option<JsValue>,
        writable: Option<bool>,
    },
    Accessor {
        get: Option<JsValue>,
        set: Option<JsValue>,
    },
    Generic,
}

impl Default for DescriptorKind {
    fn default() -> Self {
        Self::Generic
    }
}

/// A property descriptor with optional fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyDescriptor {
    enumerable: Option<bool>,
    configurable: Option<bool>,
    kind: DescriptorKind,
}

impl PropertyDescriptor {
    /// Creates a new [`PropertyDescriptorBuilder`].
    #[must_use]
    pub fn builder() -> PropertyDescriptorBuilder {
        PropertyDescriptorBuilder::new()
    }

    /// Checks if the descriptor is a data descriptor.
    #[must_use]
    pub const fn is_data_descriptor(&self) -> bool {
        matches!(self.kind, DescriptorKind::Data { .. })
    }

    /// Checks if the descriptor is an accessor descriptor.
    #[must_use]
    pub const fn is_accessor_descriptor(&self) -> bool {
        matches!(self.kind, DescriptorKind::Accessor { .. })
    }

    /// Checks if the descriptor is neither a data nor an accessor descriptor.
    #[must_use]
    pub const fn is_generic_descriptor(&self) -> bool {
        matches!(self.kind, DescriptorKind::Generic)
    }

    /// Checks if the descriptor is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.enumerable.is_none() && self.configurable.is_none() && self.is_generic_descriptor()
    }

    /// Returns the `[[Enumerable]]` field.
    #[must_use]
    pub const fn enumerable(&self) -> Option<bool> {
        self.enumerable
    }

    /// Returns the `[[Configurable]]` field.
    #[must_use]
    pub const fn configurable(&self) -> Option<bool> {
        self.configurable
    }

    /// Returns the `[[Writable]]` field of a data descriptor.
    #[must_use]
    pub const fn writable(&self) -> Option<bool> {
        match self.kind {
            DescriptorKind::Data { writable, .. } => writable,
            _ => None,
        }
    }

    /// Returns the `[[Value]]` field of a data descriptor.
    #[must_use]
    pub fn value(&self) -> Option<&JsValue> {
        match &self.kind {
            DescriptorKind::Data { value, .. } => value.as_ref(),
            _ => None,
        }
    }

    /// Returns the `[[Get]]` field of an accessor descriptor.
    #[must_use]
    pub fn get(&self) -> Option<&JsValue> {
        match &self.kind {
            DescriptorKind::Accessor { get, .. } => get.as_ref(),
            _ => None,
        }
    }

    /// Returns the `[[Set]]` field of an accessor descriptor.
    #[must_use]
    pub fn set(&self) -> Option<&JsValue> {
        match &self.kind {
            DescriptorKind::Accessor { set, .. } => set.as_ref(),
            _ => None,
        }
    }

    /// Returns the `[[Value]]` field, defaulting to `undefined`.
    #[must_use]
    pub fn expect_value(&self) -> JsValue {
        self.value().cloned().unwrap_or_default()
    }

    /// `true` when `enumerable` is set and `true`.
    #[must_use]
    pub fn expect_enumerable(&self) -> bool {
        self.enumerable.unwrap_or(false)
    }

    /// `true` when `writable` is set and `true`.
    #[must_use]
    pub fn expect_writable(&self) -> bool {
        self.writable().unwrap_or(false)
    }

    /// `true` when `configurable` is set and `true`.
    #[must_use]
    pub fn expect_configurable(&self) -> bool {
        self.configurable.unwrap_or(false)
    }

    /// `CompletePropertyDescriptor ( Desc )`
    ///
    /// Fills every unset field with its default.
    #[must_use]
    pub fn complete(mut self) -> Self {
        if self.is_generic_descriptor() || self.is_data_descriptor() {
            let (value, writable) = match self.kind {
                DescriptorKind::Data { value, writable } => (value, writable),
                _ => (None, None),
            };
            self.kind = DescriptorKind::Data {
                value: value.or_else(|| Some(JsValue::undefined())),
                writable: writable.or(Some(false)),
            };
        } else if let DescriptorKind::Accessor { get, set } = self.kind {
            self.kind = DescriptorKind::Accessor {
                get: get.or_else(|| Some(JsValue::undefined())),
                set: set.or_else(|| Some(JsValue::undefined())),
            };
        }
        self.enumerable = self.enumerable.or(Some(false));
        self.configurable = self.configurable.or(Some(false));
        self
    }

    /// Fills unset fields of `self` from `current`, as done when redefining
    /// an existing property.
    pub(crate) fn fill_from(&mut self, current: &Self) {
        match (&mut self.kind, &current.kind) {
            (
                DescriptorKind::Data { value, writable },
                DescriptorKind::Data {
                    value: cur_value,
                    writable: cur_writable,
                },
            ) => {
                if value.is_none() {
                    *value = cur_value.clone();
                }
                if writable.is_none() {
                    *writable = *cur_writable;
                }
            }
            (
                DescriptorKind::Accessor { get, set },
                DescriptorKind::Accessor {
                    get: cur_get,
                    set: cur_set,
                },
            ) => {
                if get.is_none() {
                    *get = cur_get.clone();
                }
                if set.is_none() {
                    *set = cur_set.clone();
                }
            }
            (DescriptorKind::Generic, _) => self.kind = current.kind.clone(),
            _ => {}
        }
        if self.enumerable.is_none() {
            self.enumerable = current.enumerable;
        }
        if self.configurable.is_none() {
            self.configurable = current.configurable;
        }
    }
}

/// Builder for [`PropertyDescriptor`].
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptorBuilder {
    inner: PropertyDescriptor,
}

impl PropertyDescriptorBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `[[Value]]` field.
    #[must_use]
    pub fn value<V: Into<JsValue>>(mut self, value: V) -> Self {
        match self.inner.kind {
            DescriptorKind::Data {
                value: ref mut v, ..
            } => *v = Some(value.into()),
            _ => {
                self.inner.kind = DescriptorKind::Data {
                    value: Some(value.into()),
                    writable: None,
                }
            }
        }
        self
    }

    /// Sets the `[[Writable]]` field.
    #[must_use]
    pub fn writable(mut self, writable: bool) -> Self {
        match self.inner.kind {
            DescriptorKind::Data {
                writable: ref mut w,
                ..
            } => *w = Some(writable),
            _ => {
                self.inner.kind = DescriptorKind::Data {
                    value: None,
                    writable: Some(writable),
                }
            }
        }
        self
    }

    /// Sets the `[[Get]]` field.
    #[must_use]
    pub fn get<V: Into<JsValue>>(mut self, get: V) -> Self {
        match self.inner.kind {
            DescriptorKind::Accessor { get: ref mut g, .. } => *g = Some(get.into()),
            _ => {
                self.inner.kind = DescriptorKind::Accessor {
                    get: Some(get.into()),
                    set: None,
                }
            }
        }
        self
    }

    /// Sets the `[[Set]]` field.
    #[must_use]
    pub fn set<V: Into<JsValue>>(mut self, set: V) -> Self {
        match self.inner.kind {
            DescriptorKind::Accessor { set: ref mut s, .. } => *s = Some(set.into()),
            _ => {
                self.inner.kind = DescriptorKind::Accessor {
                    get: None,
                    set: Some(set.into()),
                }
            }
        }
        self
    }

    /// Sets the `[[Enumerable]]` field.
    #[must_use]
    pub fn enumerable(mut self, enumerable: bool) -> Self {
        self.inner.enumerable = Some(enumerable);
        self
    }

    /// Sets the `[[Configurable]]` field.
    #[must_use]
    pub fn configurable(mut self, configurable: bool) -> Self {
        self.inner.configurable = Some(configurable);
        self
    }

    /// Finishes the descriptor.
    #[must_use]
    pub fn build(self) -> PropertyDescriptor {
        self.inner
    }
}

impl From<PropertyDescriptorBuilder> for PropertyDescriptor {
    fn from(builder: PropertyDescriptorBuilder) -> Self {
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_kinds() {
        let data = PropertyDescriptor::builder()
            .value(1)
            .writable(true)
            .enumerable(false)
            .configurable(true)
            .build();
        assert!(data.is_data_descriptor());
        assert!(!data.is_accessor_descriptor());
        assert_eq!(data.writable(), Some(true));

        let accessor = PropertyDescriptor::builder()
            .get(JsValue::undefined())
            .build();
        assert!(accessor.is_accessor_descriptor());
    }

    #[test]
    fn string_keys_canonicalize_indices() {
        assert_eq!(PropertyKey::from("10"), PropertyKey::Index(10));
        assert_eq!(
            PropertyKey::from("length"),
            PropertyKey::String("length".into())
        );
        assert_eq!(
            PropertyKey::from("010"),
            PropertyKey::String("010".into())
        );
    }

    #[test]
    fn complete_fills_defaults() {
        let desc = PropertyDescriptor::builder().value(3).build().complete();
        assert_eq!(desc.writable(), Some(false));
        assert_eq!(desc.enumerable(), Some(false));
        assert_eq!(desc.configurable(), Some(false));
    }
}
