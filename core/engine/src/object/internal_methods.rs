//! The essential internal methods of objects.
//!
//! All higher-level behavior lowers to the operations in this module:
//! define-own, get-own, get, set, has, delete, own-key iteration and the
//! prototype accessors. Array exotic objects virtualize `length`, string
//! wrappers expose their characters, typed arrays route indices to their
//! buffer, and proxies consult their handler traps with the target as
//! fallback.

use super::{JsObject, ObjectData};
use crate::{
    error::JsNativeError,
    property::{PropertyDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
    Context, JsResult,
};

impl JsObject {
    /// `[[GetOwnProperty]] ( P )`
    pub(crate) fn __get_own_property__(
        &self,
        key: &PropertyKey,
        context: &mut Context,
    ) -> JsResult<Option<PropertyDescriptor>> {
        enum Exotic {
            None,
            Proxy(JsObject, JsObject),
            StringChar(Option<JsString>),
            TypedArrayElement(crate::builtins::typed_array::IntegerIndexed, u64),
        }

        let exotic = {
            let object = self.borrow();
            match (&object.data, key) {
                (ObjectData::Proxy(proxy), _) => {
                    let (target, handler) = proxy.try_data()?;
                    Exotic::Proxy(target, handler)
                }
                (ObjectData::String(s), PropertyKey::Index(index)) => Exotic::StringChar(
                    s.chars().nth(*index as usize).map(JsString::from),
                ),
                (ObjectData::TypedArray(inner), PropertyKey::Index(index)) => {
                    Exotic::TypedArrayElement(inner.clone(), u64::from(*index))
                }
                _ => Exotic::None,
            }
        };

        match exotic {
            Exotic::Proxy(target, handler) => {
                let Some(trap) = handler.get_method("getOwnPropertyDescriptor", context)? else {
                    return target.__get_own_property__(key, context);
                };
                let result = trap.call(
                    &handler.into(),
                    &[target.into(), key.to_value()],
                    context,
                )?;
                if result.is_undefined() {
                    return Ok(None);
                }
                result.to_property_descriptor(context).map(Some)
            }
            Exotic::StringChar(Some(c)) => Ok(Some(
                PropertyDescriptor::builder()
                    .value(c)
                    .writable(false)
                    .enumerable(true)
                    .configurable(false)
                    .build(),
            )),
            Exotic::StringChar(None) => Ok(None),
            Exotic::TypedArrayElement(inner, index) => {
                Ok(inner.get_element(index, context)?.map(|value| {
                    PropertyDescriptor::builder()
                        .value(value)
                        .writable(true)
                        .enumerable(true)
                        .configurable(true)
                        .build()
                }))
            }
            Exotic::None => Ok(self.borrow().properties().get(key)),
        }
    }

    /// `[[DefineOwnProperty]] ( P, Desc )`
    pub(crate) fn __define_own_property__(
        &self,
        key: &PropertyKey,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<bool> {
        enum Kind {
            Ordinary,
            Array,
            TypedArray(crate::builtins::typed_array::IntegerIndexed),
            Proxy(JsObject, JsObject),
        }

        let kind = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => {
                    let (target, handler) = proxy.try_data()?;
                    Kind::Proxy(target, handler)
                }
                ObjectData::Array => Kind::Array,
                ObjectData::TypedArray(inner) => Kind::TypedArray(inner.clone()),
                _ => Kind::Ordinary,
            }
        };

        match kind {
            Kind::Proxy(target, handler) => {
                let Some(trap) = handler.get_method("defineProperty", context)? else {
                    return target.__define_own_property__(key, desc, context);
                };
                let desc_obj = super::from_property_descriptor(Some(desc), context);
                let result = trap.call(
                    &handler.into(),
                    &[target.into(), key.to_value(), desc_obj],
                    context,
                )?;
                Ok(result.to_boolean())
            }
            Kind::Array => self.array_define_own_property(key, desc, context),
            Kind::TypedArray(inner) => {
                let PropertyKey::Index(index) = key else {
                    return self.ordinary_define_own_property(key, desc, context);
                };
                let Some(value) = desc.value() else {
                    return Ok(false);
                };
                inner.set_element(u64::from(*index), value.clone(), context)
            }
            Kind::Ordinary => self.ordinary_define_own_property(key, desc, context),
        }
    }

    /// `OrdinaryDefineOwnProperty ( O, P, Desc )`
    pub(crate) fn ordinary_define_own_property(
        &self,
        key: &PropertyKey,
        desc: PropertyDescriptor,
        _context: &mut Context,
    ) -> JsResult<bool> {
        let mut object = self.borrow_mut();
        let current = object.properties().get(key);
        let extensible = object.extensible();

        let Some(current) = current else {
            // 10.1.6.3, step 2: the property does not exist yet.
            if !extensible {
                return Ok(false);
            }
            object.properties_mut().insert(key, desc.complete());
            return Ok(true);
        };

        // Step 3: every field of desc is absent.
        if desc.is_empty() {
            return Ok(true);
        }

        // Step 4: a non-configurable property can only be reshaped from
        // writable to non-writable.
        if !current.expect_configurable() {
            if desc.configurable() == Some(true) {
                return Ok(false);
            }
            if desc
                .enumerable()
                .map_or(false, |e| e != current.expect_enumerable())
            {
                return Ok(false);
            }
            if !desc.is_generic_descriptor() {
                if current.is_data_descriptor() != desc.is_data_descriptor() {
                    return Ok(false);
                }
                if current.is_data_descriptor() {
                    if !current.expect_writable() {
                        if desc.writable() == Some(true) {
                            return Ok(false);
                        }
                        if let Some(value) = desc.value() {
                            if !JsValue::same_value(value, &current.expect_value()) {
                                return Ok(false);
                            }
                        }
                    }
                } else {
                    let same = |a: Option<&JsValue>, b: Option<&JsValue>| match (a, b) {
                        (Some(a), Some(b)) => JsValue::same_value(a, b),
                        (None, _) => true,
                        (Some(_), None) => false,
                    };
                    if !same(desc.get(), current.get()) || !same(desc.set(), current.set()) {
                        return Ok(false);
                    }
                }
            }
        }

        let mut new_desc = desc;
        new_desc.fill_from(&current);
        object.properties_mut().insert(key, new_desc.complete());
        Ok(true)
    }

    /// `[[DefineOwnProperty]]` for array exotic objects.
    fn array_define_own_property(
        &self,
        key: &PropertyKey,
        desc: PropertyDescriptor,
        context: &mut Context,
    ) -> JsResult<bool> {
        match key {
            PropertyKey::String(s) if s == "length" => self.array_set_length(desc, context),
            PropertyKey::Index(index) => {
                let length_key = PropertyKey::from("length");
                let old_len_desc = self
                    .borrow()
                    .properties()
                    .get(&length_key)
                    .unwrap_or_else(|| {
                        PropertyDescriptor::builder()
                            .value(0)
                            .writable(true)
                            .enumerable(false)
                            .configurable(false)
                            .build()
                    });
                let old_len = old_len_desc
                    .expect_value()
                    .as_number()
                    .map_or(0, |n| n as u32);

                if u64::from(*index) >= u64::from(old_len) && !old_len_desc.expect_writable() {
                    return Ok(false);
                }
                if !self.ordinary_define_own_property(key, desc, context)? {
                    return Ok(false);
                }
                if u64::from(*index) >= u64::from(old_len) {
                    let new_len_desc = PropertyDescriptor::builder()
                        .value(index + 1)
                        .writable(old_len_desc.expect_writable())
                        .enumerable(false)
                        .configurable(false)
                        .build();
                    self.borrow_mut()
                        .properties_mut()
                        .insert(&length_key, new_len_desc);
                }
                Ok(true)
            }
            _ => self.ordinary_define_own_property(key, desc, context),
        }
    }

    /// `ArraySetLength ( A, Desc )`
    fn array_set_length(&self, desc: PropertyDescriptor, context: &mut Context) -> JsResult<bool> {
        let length_key = PropertyKey::from("length");
        let old_desc = self
            .borrow()
            .properties()
            .get(&length_key)
            .unwrap_or_else(|| {
                PropertyDescriptor::builder()
                    .value(0)
                    .writable(true)
                    .enumerable(false)
                    .configurable(false)
                    .build()
            });

        let Some(new_len_value) = desc.value().cloned() else {
            // Only the attributes change; `length` can go from writable to
            // non-writable but never back.
            if desc.writable() == Some(true) && !old_desc.expect_writable() {
                return Ok(false);
            }
            if let Some(writable) = desc.writable() {
                let new_desc = PropertyDescriptor::builder()
                    .value(old_desc.expect_value())
                    .writable(writable)
                    .enumerable(false)
                    .configurable(false)
                    .build();
                self.borrow_mut()
                    .properties_mut()
                    .insert(&length_key, new_desc);
            }
            return Ok(true);
        };

        let number_len = new_len_value.to_number(context)?;
        let new_len = new_len_value.to_u32(context)?;
        if f64::from(new_len) != number_len {
            return Err(JsNativeError::range()
                .with_message("invalid array length")
                .into());
        }

        let old_len = old_desc.expect_value().as_number().map_or(0, |n| n as u32);
        if new_len != old_len && !old_desc.expect_writable() {
            return Ok(false);
        }

        if new_len < old_len {
            self.borrow_mut()
                .properties_mut()
                .truncate_indexed(new_len);
        }

        let new_desc = PropertyDescriptor::builder()
            .value(new_len)
            .writable(desc.writable().unwrap_or_else(|| old_desc.expect_writable()))
            .enumerable(false)
            .configurable(false)
            .build();
        self.borrow_mut()
            .properties_mut()
            .insert(&length_key, new_desc);
        Ok(true)
    }

    /// `[[Get]] ( P, Receiver )`
    pub(crate) fn __get__(
        &self,
        key: &PropertyKey,
        receiver: JsValue,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("get", context)? else {
                return target.__get__(key, receiver, context);
            };
            return trap.call(
                &handler.into(),
                &[target.into(), key.to_value(), receiver],
                context,
            );
        }

        match self.__get_own_property__(key, context)? {
            None => {
                let parent = self.__get_prototype_of__(context)?;
                match parent {
                    Some(parent) => parent.__get__(key, receiver, context),
                    None => Ok(JsValue::undefined()),
                }
            }
            Some(desc) => {
                if desc.is_data_descriptor() {
                    return Ok(desc.expect_value());
                }
                // Accessor getters run with the original receiver as `this`,
                // not the prototype the accessor was found on.
                match desc.get() {
                    Some(get) if !get.is_undefined() => get.call(&receiver, &[], context),
                    _ => Ok(JsValue::undefined()),
                }
            }
        }
    }

    /// `[[Set]] ( P, V, Receiver )`
    pub(crate) fn __set__(
        &self,
        key: &PropertyKey,
        value: JsValue,
        receiver: JsValue,
        context: &mut Context,
    ) -> JsResult<bool> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("set", context)? else {
                return target.__set__(key, value, receiver, context);
            };
            let result = trap.call(
                &handler.into(),
                &[target.into(), key.to_value(), value, receiver],
                context,
            )?;
            return Ok(result.to_boolean());
        }

        let own_desc = match self.__get_own_property__(key, context)? {
            Some(desc) => desc,
            None => match self.__get_prototype_of__(context)? {
                Some(parent) => return parent.__set__(key, value, receiver, context),
                None => PropertyDescriptor::builder()
                    .value(JsValue::undefined())
                    .writable(true)
                    .enumerable(true)
                    .configurable(true)
                    .build(),
            },
        };

        if own_desc.is_data_descriptor() {
            if !own_desc.expect_writable() {
                return Ok(false);
            }
            let Some(receiver_obj) = receiver.as_object().cloned() else {
                return Ok(false);
            };
            return match receiver_obj.__get_own_property__(key, context)? {
                Some(existing) => {
                    if existing.is_accessor_descriptor() || !existing.expect_writable() {
                        return Ok(false);
                    }
                    receiver_obj.__define_own_property__(
                        key,
                        PropertyDescriptor::builder().value(value).build(),
                        context,
                    )
                }
                None => receiver_obj.create_data_property(key.clone(), value, context),
            };
        }

        match own_desc.set() {
            Some(set) if !set.is_undefined() => {
                set.call(&receiver, &[value], context)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// `[[HasProperty]] ( P )`
    pub(crate) fn __has_property__(
        &self,
        key: &PropertyKey,
        context: &mut Context,
    ) -> JsResult<bool> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("has", context)? else {
                return target.__has_property__(key, context);
            };
            let result = trap.call(&handler.into(), &[target.into(), key.to_value()], context)?;
            return Ok(result.to_boolean());
        }

        if self.__get_own_property__(key, context)?.is_some() {
            return Ok(true);
        }
        match self.__get_prototype_of__(context)? {
            Some(parent) => parent.__has_property__(key, context),
            None => Ok(false),
        }
    }

    /// `[[Delete]] ( P )`
    pub(crate) fn __delete__(&self, key: &PropertyKey, context: &mut Context) -> JsResult<bool> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("deleteProperty", context)? else {
                return target.__delete__(key, context);
            };
            let result = trap.call(&handler.into(), &[target.into(), key.to_value()], context)?;
            return Ok(result.to_boolean());
        }

        let mut object = self.borrow_mut();
        match object.properties().get(key) {
            None => Ok(true),
            Some(desc) if desc.expect_configurable() => {
                object.properties_mut().remove(key);
                Ok(true)
            }
            Some(_) => Ok(false),
        }
    }

    /// `[[OwnPropertyKeys]] ( )`
    pub(crate) fn __own_property_keys__(
        &self,
        context: &mut Context,
    ) -> JsResult<Vec<PropertyKey>> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("ownKeys", context)? else {
                return target.__own_property_keys__(context);
            };
            let result = trap.call(&handler.into(), &[target.into()], context)?;
            let result = result.as_object().cloned().ok_or_else(|| {
                JsNativeError::typ().with_message("proxy ownKeys trap did not return an object")
            })?;
            let len = result.get("length", context)?.to_length(context)?;
            let mut keys = Vec::with_capacity(len as usize);
            for i in 0..len {
                let key = result.get(i, context)?;
                keys.push(key.to_property_key(context)?);
            }
            return Ok(keys);
        }

        Ok(self.borrow().properties().own_keys())
    }

    /// `[[GetPrototypeOf]] ( )`
    pub(crate) fn __get_prototype_of__(
        &self,
        context: &mut Context,
    ) -> JsResult<super::JsPrototype> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("getPrototypeOf", context)? else {
                return target.__get_prototype_of__(context);
            };
            let result = trap.call(&handler.into(), &[target.into()], context)?;
            if result.is_null() {
                return Ok(None);
            }
            return result
                .as_object()
                .cloned()
                .map(Some)
                .ok_or_else(|| {
                    JsNativeError::typ()
                        .with_message("proxy getPrototypeOf trap returned a primitive")
                        .into()
                });
        }
        Ok(self.prototype())
    }

    /// `[[SetPrototypeOf]] ( V )`
    pub(crate) fn __set_prototype_of__(
        &self,
        prototype: super::JsPrototype,
        context: &mut Context,
    ) -> JsResult<bool> {
        let proxy = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Proxy(proxy) => Some(proxy.try_data()?),
                _ => None,
            }
        };
        if let Some((target, handler)) = proxy {
            let Some(trap) = handler.get_method("setPrototypeOf", context)? else {
                return target.__set_prototype_of__(prototype, context);
            };
            let proto_value = prototype.map_or(JsValue::null(), JsValue::from);
            let result = trap.call(&handler.into(), &[target.into(), proto_value], context)?;
            return Ok(result.to_boolean());
        }

        let current = self.prototype();
        match (&current, &prototype) {
            (Some(a), Some(b)) if JsObject::equals(a, b) => return Ok(true),
            (None, None) => return Ok(true),
            _ => {}
        }

        if !self.borrow().extensible() {
            return Ok(false);
        }

        // Walk the new chain to reject prototype cycles.
        let mut p = prototype.clone();
        while let Some(proto) = p {
            if JsObject::equals(&proto, self) {
                return Ok(false);
            }
            if proto.borrow().is_proxy() {
                break;
            }
            p = proto.prototype();
        }

        self.set_prototype(prototype);
        Ok(true)
    }
}
