//! The global `Set` object: an insertion-ordered collection of unique
//! values with `SameValueZero` equality.

pub mod ordered_set;
pub(crate) mod set_iterator;

pub(crate) use set_iterator::SetIterator;

use ordered_set::OrderedSet;

#[cfg(test)]
mod tests;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::{Attribute, PropertyNameKind},
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The global `Set` builtin.
#[derive(Debug, Clone)]
pub(crate) struct Set;

impl IntrinsicObject for Set {
    fn init(realm: &Realm) {
        let get_species = BuiltInBuilder::callable(realm, Self::get_species)
            .name("get [Symbol.species]")
            .build();

        let get_size = BuiltInBuilder::callable(realm, Self::get_size)
            .name("get size")
            .build();

        let values_function = BuiltInBuilder::callable(realm, Self::values)
            .name("values")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_accessor(
                JsSymbol::species(),
                Some(get_species),
                None,
                Attribute::CONFIGURABLE,
            )
            .method(Self::add, "add", 1)
            .method(Self::clear, "clear", 0)
            .method(Self::delete, "delete", 1)
            .method(Self::entries, "entries", 0)
            .method(Self::for_each, "forEach", 1)
            .method(Self::has, "has", 1)
            // `Set.prototype.keys`, `Set.prototype.values` and
            // `Set.prototype[@@iterator]` share object identity.
            .property(
                "keys",
                values_function.clone(),
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .property(
                "values",
                values_function.clone(),
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .property(
                JsSymbol::iterator(),
                values_function,
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .accessor("size", Some(get_size), None, Attribute::CONFIGURABLE)
            .build();

        SetIterator::init(realm);
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Set {
    const NAME: &'static str = "Set";
}

impl BuiltInConstructor for Set {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::set;

    /// `Set ( [ iterable ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("calling a builtin Set constructor without new is forbidden")
                .into());
        }

        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::set, context)?;
        let set = JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::set(OrderedSet::new()),
        );

        let iterable = args.get_or_undefined(0);
        if iterable.is_null_or_undefined() {
            return Ok(set.into());
        }

        let adder = set.get("add", context)?;
        let adder = adder.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("property `add` of `NewTarget` is not callable")
        })?;

        let mut iterator_record = iterable.get_iterator(context)?;
        loop {
            if iterator_record.step(context)? {
                return Ok(set.into());
            }
            let next = iterator_record.value(context)?;
            let status = adder.call(&set.clone().into(), &[next], context);
            if status.is_err() {
                return iterator_record.close(status, context);
            }
        }
    }
}

impl BuiltIn for Set {
    const PRIORITY: u32 = 110;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Set", Type::named("SetConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

/// Canonicalizes `-0` values to `+0` before insertion.
fn canonicalize_value(value: &JsValue) -> JsValue {
    match value.as_number() {
        Some(n) if n == 0.0 => JsValue::Integer(0),
        _ => value.clone(),
    }
}

impl Set {
    /// `get Set [ @@species ]`
    #[allow(clippy::unnecessary_wraps)]
    fn get_species(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(this.clone())
    }

    /// `Set.prototype.add ( value )`
    ///
    /// Returns the set, for chaining.
    pub(crate) fn add(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let value = canonicalize_value(args.get_or_undefined(0));
        if let Some(object) = this.as_object() {
            if let Some(set) = object.borrow_mut().as_set_mut() {
                set.add(value);
                return Ok(this.clone());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Set")
            .into())
    }

    /// `Set.prototype.clear ( )`
    pub(crate) fn clear(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        if let Some(object) = this.as_object() {
            if let Some(set) = object.borrow_mut().as_set_mut() {
                set.clear();
                return Ok(JsValue::undefined());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Set")
            .into())
    }

    /// `Set.prototype.delete ( value )`
    pub(crate) fn delete(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let value = canonicalize_value(args.get_or_undefined(0));
        if let Some(object) = this.as_object() {
            if let Some(set) = object.borrow_mut().as_set_mut() {
                return Ok(set.delete(&value).into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Set")
            .into())
    }

    /// `Set.prototype.has ( value )`
    pub(crate) fn has(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let value = canonicalize_value(args.get_or_undefined(0));
        if let Some(object) = this.as_object() {
            if let Some(set) = object.borrow().as_set() {
                return Ok(set.contains(&value).into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Set")
            .into())
    }

    /// `get Set.prototype.size`
    pub(crate) fn get_size(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        if let Some(object) = this.as_object() {
            if let Some(set) = object.borrow().as_set() {
                return Ok(set.size().into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Set")
            .into())
    }

    /// `Set.prototype.values ( )`
    pub(crate) fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = this
            .as_object()
            .filter(|obj| obj.borrow().is_set())
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("'this' is not a Set"))?;
        SetIterator::create_set_iterator(set, PropertyNameKind::Value, context)
    }

    /// `Set.prototype.entries ( )`
    pub(crate) fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let set = this
            .as_object()
            .filter(|obj| obj.borrow().is_set())
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("'this' is not a Set"))?;
        SetIterator::create_set_iterator(set, PropertyNameKind::KeyAndValue, context)
    }

    /// `Set.prototype.forEach ( callbackfn [ , thisArg ] )`
    pub(crate) fn for_each(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let set = this
            .as_object()
            .filter(|obj| obj.borrow().is_set())
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("'this' is not a Set"))?;

        let callback = args.get_or_undefined(0);
        let callback = callback.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message(format!("{} is not a function", callback.display()))
        })?;
        let this_arg = args.get_or_undefined(1);

        let _lock = set
            .borrow_mut()
            .as_set_mut()
            .expect("checked that `this` was a set")
            .lock(set.clone());

        let mut index = 0;
        loop {
            let argument = {
                let borrowed = set.borrow();
                let entries = borrowed.as_set().expect("checked that `this` was a set");
                if index < entries.full_len() {
                    entries.get_index(index).cloned()
                } else {
                    return Ok(JsValue::undefined());
                }
            };

            if let Some(value) = argument {
                callback.call(this_arg, &[value.clone(), value, this.clone()], context)?;
            }

            index += 1;
        }
    }
}
