//! A shared, reference-counted handle to an [`Object`].

use super::{Object, ObjectData, PROTOTYPE};
use crate::{
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    native_function::NativeFunction,
    property::{PropertyDescriptor, PropertyKey},
    value::JsValue,
    Context, JsResult,
};
use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    ops::Deref,
    rc::{Rc, Weak},
};

/// A shared handle to an object record.
///
/// Handles are cheap to clone and share ownership of the record; the record
/// lives until the last strong handle is dropped. Cycles through the
/// property graph keep each other alive until an external root drops.
#[derive(Clone)]
pub struct JsObject {
    inner: Rc<RefCell<Object>>,
}

/// A non-owning handle to an object record, used by the weak collections.
#[derive(Debug, Clone)]
pub struct WeakJsObject {
    inner: Weak<RefCell<Object>>,
}

impl WeakJsObject {
    /// Upgrades to a [`JsObject`] if the record is still alive.
    #[must_use]
    pub fn upgrade(&self) -> Option<JsObject> {
        self.inner.upgrade().map(|inner| JsObject { inner })
    }
}

impl fmt::Debug for JsObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsObject")
            .field("addr", &Rc::as_ptr(&self.inner))
            .finish_non_exhaustive()
    }
}

impl JsObject {
    /// Creates an object with the given prototype and internal data.
    #[must_use]
    pub fn from_proto_and_data(prototype: super::JsPrototype, data: ObjectData) -> Self {
        let mut object = Object::default();
        object.data = data;
        object.set_prototype(prototype);
        Self {
            inner: Rc::new(RefCell::new(object)),
        }
    }

    /// Creates an ordinary object with `%Object.prototype%` as prototype.
    #[must_use]
    pub fn with_object_proto(intrinsics: &Intrinsics) -> Self {
        Self::from_proto_and_data(
            Some(intrinsics.constructors().object().prototype()),
            ObjectData::ordinary(),
        )
    }

    /// Creates an ordinary object with a `null` prototype.
    #[must_use]
    pub fn with_null_proto() -> Self {
        Self::from_proto_and_data(None, ObjectData::ordinary())
    }

    /// Immutably borrows the object record.
    ///
    /// # Panics
    ///
    /// Panics if the record is currently mutably borrowed.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, Object> {
        self.inner.borrow()
    }

    /// Mutably borrows the object record.
    ///
    /// # Panics
    ///
    /// Panics if the record is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, Object> {
        self.inner.borrow_mut()
    }

    /// Mutably borrows the object record, failing instead of panicking when
    /// it is already borrowed.
    pub fn try_borrow_mut(
        &self,
    ) -> Result<RefMut<'_, Object>, std::cell::BorrowMutError> {
        self.inner.try_borrow_mut()
    }

    /// Checks if two handles point to the same record.
    #[must_use]
    pub fn equals(lhs: &Self, rhs: &Self) -> bool {
        Rc::ptr_eq(&lhs.inner, &rhs.inner)
    }

    /// The address of the record, used as its identity in side tables.
    #[must_use]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// Creates a non-owning handle to this object.
    #[must_use]
    pub fn downgrade(&self) -> WeakJsObject {
        WeakJsObject {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Returns the prototype slot of the object.
    #[must_use]
    pub fn prototype(&self) -> super::JsPrototype {
        self.borrow().prototype().clone()
    }

    /// Overwrites the prototype slot without any checks.
    pub fn set_prototype(&self, prototype: super::JsPrototype) {
        self.borrow_mut().set_prototype(prototype);
    }

    /// Inserts a property without descriptor validation.
    pub fn insert_property<K, P>(&self, key: K, property: P) -> Option<PropertyDescriptor>
    where
        K: Into<PropertyKey>,
        P: Into<PropertyDescriptor>,
    {
        self.borrow_mut().insert(key, property)
    }

    /// `Get ( O, P )`
    pub fn get<K: Into<PropertyKey>>(&self, key: K, context: &mut Context) -> JsResult<JsValue> {
        self.__get__(&key.into(), self.clone().into(), context)
    }

    /// `Set ( O, P, V, Throw )`
    pub fn set<K, V>(&self, key: K, value: V, throw: bool, context: &mut Context) -> JsResult<bool>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        let key = key.into();
        let success = self.__set__(&key, value.into(), self.clone().into(), context)?;
        if !success && throw {
            return Err(JsNativeError::typ()
                .with_message(format!("cannot set non-writable property: {key}"))
                .into());
        }
        Ok(success)
    }

    /// `CreateDataProperty ( O, P, V )`
    pub fn create_data_property<K, V>(
        &self,
        key: K,
        value: V,
        context: &mut Context,
    ) -> JsResult<bool>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.__define_own_property__(
            &key.into(),
            PropertyDescriptor::builder()
                .value(value)
                .writable(true)
                .enumerable(true)
                .configurable(true)
                .build(),
            context,
        )
    }

    /// `CreateDataPropertyOrThrow ( O, P, V )`
    pub fn create_data_property_or_throw<K, V>(
        &self,
        key: K,
        value: V,
        context: &mut Context,
    ) -> JsResult<()>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        let key = key.into();
        if !self.create_data_property(key.clone(), value, context)? {
            return Err(JsNativeError::typ()
                .with_message(format!("cannot define property: {key}"))
                .into());
        }
        Ok(())
    }

    /// `CreateNonEnumerableDataPropertyOrThrow ( O, P, V )`
    pub fn create_non_enumerable_data_property_or_throw<K, V>(
        &self,
        key: K,
        value: V,
        context: &mut Context,
    ) -> JsResult<()>
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.define_property_or_throw(
            key,
            PropertyDescriptor::builder()
                .value(value)
                .writable(true)
                .enumerable(false)
                .configurable(true)
                .build(),
            context,
        )
    }

    /// `DefinePropertyOrThrow ( O, P, desc )`
    pub fn define_property_or_throw<K, P>(
        &self,
        key: K,
        desc: P,
        context: &mut Context,
    ) -> JsResult<()>
    where
        K: Into<PropertyKey>,
        P: Into<PropertyDescriptor>,
    {
        let key = key.into();
        if !self.__define_own_property__(&key, desc.into(), context)? {
            return Err(JsNativeError::typ()
                .with_message(format!("cannot define property: {key}"))
                .into());
        }
        Ok(())
    }

    /// `DeletePropertyOrThrow ( O, P )`
    pub fn delete_property_or_throw<K: Into<PropertyKey>>(
        &self,
        key: K,
        context: &mut Context,
    ) -> JsResult<()> {
        let key = key.into();
        if !self.__delete__(&key, context)? {
            return Err(JsNativeError::typ()
                .with_message(format!("cannot delete property: {key}"))
                .into());
        }
        Ok(())
    }

    /// `HasProperty ( O, P )`
    pub fn has_property<K: Into<PropertyKey>>(
        &self,
        key: K,
        context: &mut Context,
    ) -> JsResult<bool> {
        self.__has_property__(&key.into(), context)
    }

    /// `HasOwnProperty ( O, P )`
    pub fn has_own_property<K: Into<PropertyKey>>(
        &self,
        key: K,
        context: &mut Context,
    ) -> JsResult<bool> {
        Ok(self.__get_own_property__(&key.into(), context)?.is_some())
    }

    /// `GetMethod ( V, P )`
    pub fn get_method<K: Into<PropertyKey>>(
        &self,
        key: K,
        context: &mut Context,
    ) -> JsResult<Option<JsObject>> {
        JsValue::from(self.clone()).get_method(key, context)
    }

    /// Checks if the object is callable.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        let object = self.borrow();
        match &object.data {
            ObjectData::Function(_) | ObjectData::BoundFunction(_) => true,
            ObjectData::Proxy(proxy) => proxy
                .data()
                .map_or(false, |(target, _)| target.is_callable()),
            _ => false,
        }
    }

    /// Checks if the object is a constructor.
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        let object = self.borrow();
        match &object.data {
            ObjectData::Function(function) => function.is_constructor(),
            ObjectData::BoundFunction(bound) => bound.target().is_constructor(),
            ObjectData::Proxy(proxy) => proxy
                .data()
                .map_or(false, |(target, _)| target.is_constructor()),
            _ => false,
        }
    }

    /// `IsArray ( argument )`, unwrapping proxies.
    #[must_use]
    pub fn is_array_abstract(&self) -> bool {
        let object = self.borrow();
        match &object.data {
            ObjectData::Array => true,
            ObjectData::Proxy(proxy) => proxy
                .data()
                .map_or(false, |(target, _)| target.is_array_abstract()),
            _ => false,
        }
    }

    /// `Call ( F, V, argumentsList )`
    pub fn call(
        &self,
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        enum Callable {
            Native {
                function: NativeFunction,
                constructor: bool,
            },
            Bound {
                target: JsObject,
                this: JsValue,
                args: Vec<JsValue>,
            },
            Proxy {
                target: JsObject,
                handler: JsObject,
            },
            NotCallable,
        }

        let callable = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Function(function) => Callable::Native {
                    function: function.function().clone(),
                    constructor: function.is_constructor(),
                },
                ObjectData::BoundFunction(bound) => Callable::Bound {
                    target: bound.target().clone(),
                    this: bound.this().clone(),
                    args: bound.args().to_vec(),
                },
                ObjectData::Proxy(proxy) => {
                    let (target, handler) = proxy.try_data()?;
                    Callable::Proxy { target, handler }
                }
                _ => Callable::NotCallable,
            }
        };

        match callable {
            Callable::Native {
                function,
                constructor,
            } => {
                // Constructor-marked natives receive `new.target` in the
                // first slot; an ordinary call leaves it undefined.
                if constructor {
                    function.call(&JsValue::undefined(), args, context)
                } else {
                    function.call(this, args, context)
                }
            }
            Callable::Bound {
                target,
                this: bound_this,
                args: mut bound_args,
            } => {
                bound_args.extend_from_slice(args);
                target.call(&bound_this, &bound_args, context)
            }
            Callable::Proxy { target, handler } => {
                let Some(trap) = handler.get_method("apply", context)? else {
                    return target.call(this, args, context);
                };
                let args_array =
                    crate::builtins::array::Array::create_array_from_list(args.iter().cloned(), context);
                trap.call(
                    &handler.into(),
                    &[target.into(), this.clone(), args_array.into()],
                    context,
                )
            }
            Callable::NotCallable => Err(JsNativeError::typ()
                .with_message("value is not callable")
                .into()),
        }
    }

    /// `Construct ( F, argumentsList, newTarget )`
    pub fn construct(
        &self,
        args: &[JsValue],
        new_target: Option<&JsObject>,
        context: &mut Context,
    ) -> JsResult<JsObject> {
        let new_target = new_target.cloned().unwrap_or_else(|| self.clone());

        enum Constructable {
            Native(NativeFunction),
            Bound { target: JsObject, args: Vec<JsValue> },
            Proxy { target: JsObject, handler: JsObject },
            NotConstructor,
        }

        let constructable = {
            let object = self.borrow();
            match &object.data {
                ObjectData::Function(function) if function.is_constructor() => {
                    Constructable::Native(function.function().clone())
                }
                ObjectData::BoundFunction(bound) => Constructable::Bound {
                    target: bound.target().clone(),
                    args: bound.args().to_vec(),
                },
                ObjectData::Proxy(proxy) => {
                    let (target, handler) = proxy.try_data()?;
                    Constructable::Proxy { target, handler }
                }
                _ => Constructable::NotConstructor,
            }
        };

        match constructable {
            Constructable::Native(function) => {
                let result = function.call(&new_target.into(), args, context)?;
                result.as_object().cloned().ok_or_else(|| {
                    JsNativeError::typ()
                        .with_message("constructor did not return an object")
                        .into()
                })
            }
            Constructable::Bound {
                target,
                args: mut bound_args,
            } => {
                bound_args.extend_from_slice(args);
                let new_target = if JsObject::equals(self, &new_target) {
                    target.clone()
                } else {
                    new_target
                };
                target.construct(&bound_args, Some(&new_target), context)
            }
            Constructable::Proxy { target, handler } => {
                let Some(trap) = handler.get_method("construct", context)? else {
                    return target.construct(args, Some(&new_target), context);
                };
                let args_array =
                    crate::builtins::array::Array::create_array_from_list(args.iter().cloned(), context);
                let result = trap.call(
                    &handler.into(),
                    &[target.into(), args_array.into(), new_target.into()],
                    context,
                )?;
                result.as_object().cloned().ok_or_else(|| {
                    JsNativeError::typ()
                        .with_message("proxy construct trap did not return an object")
                        .into()
                })
            }
            Constructable::NotConstructor => Err(JsNativeError::typ()
                .with_message("value is not a constructor")
                .into()),
        }
    }

    /// `SpeciesConstructor ( O, defaultConstructor )`
    pub fn species_constructor(
        &self,
        default: fn(&StandardConstructors) -> &StandardConstructor,
        context: &mut Context,
    ) -> JsResult<JsObject> {
        // 1. Let C be ? Get(O, "constructor").
        let c = self.get("constructor", context)?;

        // 2. If C is undefined, return defaultConstructor.
        if c.is_undefined() {
            return Ok(default(context.intrinsics().constructors()).constructor());
        }

        // 3. If Type(C) is not Object, throw a TypeError exception.
        let c = c.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("property 'constructor' is not an object")
        })?;

        // 4. Let S be ? Get(C, @@species).
        let s = c.get(crate::symbol::JsSymbol::species(), context)?;

        // 5. If S is either undefined or null, return defaultConstructor.
        if s.is_null_or_undefined() {
            return Ok(default(context.intrinsics().constructors()).constructor());
        }

        // 6. If IsConstructor(S) is true, return S.
        let s = s
            .as_object()
            .filter(|obj| obj.is_constructor())
            .cloned()
            .ok_or_else(|| {
                JsNativeError::typ().with_message("property '@@species' is not a constructor")
            })?;
        Ok(s)
    }
}

/// `GetPrototypeFromConstructor ( constructor, intrinsicDefaultProto )`
pub(crate) fn get_prototype_from_constructor(
    new_target: &JsValue,
    default: fn(&StandardConstructors) -> &StandardConstructor,
    context: &mut Context,
) -> JsResult<JsObject> {
    if let Some(constructor) = new_target.as_object() {
        let proto = constructor.get(PROTOTYPE, context)?;
        if let Some(proto) = proto.as_object() {
            return Ok(proto.clone());
        }
    }
    Ok(default(context.intrinsics().constructors()).prototype())
}

/// A handle that is statically known to be callable.
#[derive(Debug, Clone)]
pub struct JsFunction {
    inner: JsObject,
}

impl JsFunction {
    /// Wraps an object known to be callable.
    pub(crate) fn from_object_unchecked(object: JsObject) -> Self {
        Self { inner: object }
    }

    /// Wraps an object, returning `None` if it is not callable.
    #[must_use]
    pub fn from_object(object: JsObject) -> Option<Self> {
        object.is_callable().then(|| Self::from_object_unchecked(object))
    }
}

impl Deref for JsFunction {
    type Target = JsObject;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<JsFunction> for JsObject {
    fn from(function: JsFunction) -> Self {
        function.inner
    }
}

impl From<JsFunction> for JsValue {
    fn from(function: JsFunction) -> Self {
        function.inner.into()
    }
}

impl PartialEq for JsFunction {
    fn eq(&self, other: &Self) -> bool {
        JsObject::equals(&self.inner, &other.inner)
    }
}

impl JsValue {
    /// Converts a callable value into a [`JsFunction`].
    #[must_use]
    pub fn as_function(&self) -> Option<JsFunction> {
        self.as_object()
            .cloned()
            .and_then(JsFunction::from_object)
    }
}

impl JsObject {
    /// `EnumerableOwnPropertyNames ( O, kind )`, restricted to string keys.
    pub fn enumerable_own_string_keys(
        &self,
        context: &mut Context,
    ) -> JsResult<Vec<(PropertyKey, JsValue)>> {
        let keys = self.__own_property_keys__(context)?;
        let mut result = Vec::new();
        for key in keys {
            if matches!(key, PropertyKey::Symbol(_)) {
                continue;
            }
            let Some(desc) = self.__get_own_property__(&key, context)? else {
                continue;
            };
            if !desc.expect_enumerable() {
                continue;
            }
            let value = self.get(key.clone(), context)?;
            result.push((key, value));
        }
        Ok(result)
    }

    /// `OrdinaryHasInstance ( C, O )` restricted to the prototype-chain walk.
    pub(crate) fn is_prototype_of_value(&self, value: &JsValue) -> bool {
        let mut proto = match value.as_object() {
            Some(obj) => obj.prototype(),
            None => return false,
        };
        while let Some(p) = proto {
            if JsObject::equals(&p, self) {
                return true;
            }
            proto = p.prototype();
        }
        false
    }
}
