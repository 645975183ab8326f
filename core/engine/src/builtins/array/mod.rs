//! The global `Array` object.
//!
//! Arrays store their elements in the property table's dense indexed
//! storage; `length` is virtualized by the array-exotic
//! `[[DefineOwnProperty]]`. The prototype methods below are generic: they
//! read `length` and the elements through the ordinary property protocol, so
//! they also work on array-likes.

pub(crate) mod array_iterator;

pub(crate) use array_iterator::ArrayIterator;

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        iterable::iterable_to_list, BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject,
        IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::{Attribute, PropertyDescriptor, PropertyKey, PropertyNameKind},
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};

/// The global `Array` builtin.
#[derive(Debug, Clone, Copy)]
pub struct Array;

impl IntrinsicObject for Array {
    fn init(realm: &Realm) {
        let values_function = BuiltInBuilder::callable(realm, Self::values)
            .name("values")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::from, "from", 1)
            .static_method(Self::is_array, "isArray", 1)
            .static_method(Self::of, "of", 0)
            .method(Self::at, "at", 1)
            .method(Self::concat, "concat", 1)
            .method(Self::entries, "entries", 0)
            .method(Self::every, "every", 1)
            .method(Self::fill, "fill", 1)
            .method(Self::filter, "filter", 1)
            .method(Self::find, "find", 1)
            .method(Self::find_index, "findIndex", 1)
            .method(Self::for_each, "forEach", 1)
            .method(Self::includes, "includes", 1)
            .method(Self::index_of, "indexOf", 1)
            .method(Self::join, "join", 1)
            .method(Self::keys, "keys", 0)
            .method(Self::map, "map", 1)
            .method(Self::pop, "pop", 0)
            .method(Self::push, "push", 1)
            .method(Self::reduce, "reduce", 1)
            .method(Self::reverse, "reverse", 0)
            .method(Self::shift, "shift", 0)
            .method(Self::slice, "slice", 2)
            .method(Self::some, "some", 1)
            .method(Self::splice, "splice", 2)
            .method(Self::to_string, "toString", 0)
            .method(Self::unshift, "unshift", 1)
            // `Array.prototype.values` and `Array.prototype[@@iterator]`
            // share object identity.
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
            .build();

        ArrayIterator::init(realm);

        // `%Array.prototype%` is itself an array.
        let prototype = realm.intrinsics().constructors().array().prototype();
        let mut prototype_obj = prototype.borrow_mut();
        prototype_obj.data = ObjectData::array();
        prototype_obj.insert(
            "length",
            PropertyDescriptor::builder()
                .value(0)
                .writable(true)
                .enumerable(false)
                .configurable(false),
        );
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Array {
    const NAME: &'static str = "Array";
}

impl BuiltInConstructor for Array {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::array;

    /// `Array ( ...values )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let prototype = if new_target.is_undefined() {
            context.intrinsics().constructors().array().prototype()
        } else {
            get_prototype_from_constructor(new_target, StandardConstructors::array, context)?
        };

        match args {
            [] => Ok(Self::array_create_with_proto(0, prototype).into()),
            [JsValue::Integer(len)] if *len >= 0 => {
                Ok(Self::array_create_with_proto(*len as u64, prototype).into())
            }
            [len] if len.is_number() => {
                let number = len.to_number(context)?;
                let int_len = number as u64;
                if f64::from(crate::value::f64_to_uint32(number)) != number {
                    return Err(JsNativeError::range()
                        .with_message("invalid array length")
                        .into());
                }
                Ok(Self::array_create_with_proto(int_len, prototype).into())
            }
            elements => {
                let array = Self::array_create_with_proto(0, prototype);
                for (i, element) in elements.iter().enumerate() {
                    array.create_data_property_or_throw(i, element.clone(), context)?;
                }
                Ok(array.into())
            }
        }
    }
}

impl BuiltIn for Array {
    const PRIORITY: u32 = 30;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global(
            "Array",
            Type::Constructor(crate::types::FunctionSignature {
                params: Vec::new(),
                rest: Some(Box::new(Type::Unknown)),
                returns: Box::new(Type::Array(Box::new(Type::Unknown))),
            }),
        );
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Array {
    fn array_create_with_proto(length: u64, prototype: JsObject) -> JsObject {
        let array = JsObject::from_proto_and_data(Some(prototype), ObjectData::array());
        array.insert_property(
            "length",
            PropertyDescriptor::builder()
                .value(length)
                .writable(true)
                .enumerable(false)
                .configurable(false),
        );
        array
    }

    /// `ArrayCreate ( length )`
    pub fn array_create(length: u64, context: &mut Context) -> JsObject {
        Self::array_create_with_proto(
            length,
            context.intrinsics().constructors().array().prototype(),
        )
    }

    /// `CreateArrayFromList ( elements )`
    pub fn create_array_from_list<I>(elements: I, context: &mut Context) -> JsObject
    where
        I: IntoIterator<Item = JsValue>,
    {
        let array = JsObject::from_proto_and_data(
            Some(context.intrinsics().constructors().array().prototype()),
            ObjectData::array(),
        );
        let mut length: u64 = 0;
        {
            let mut borrowed = array.borrow_mut();
            let properties = borrowed.properties_mut();
            for (index, element) in elements.into_iter().enumerate() {
                properties.insert(
                    &PropertyKey::from(index),
                    PropertyDescriptor::builder()
                        .value(element)
                        .writable(true)
                        .enumerable(true)
                        .configurable(true)
                        .build(),
                );
                length += 1;
            }
            properties.insert(
                &"length".into(),
                PropertyDescriptor::builder()
                    .value(length)
                    .writable(true)
                    .enumerable(false)
                    .configurable(false)
                    .build(),
            );
        }
        array
    }

    fn this_array_like(this: &JsValue, context: &mut Context) -> JsResult<(JsObject, u64)> {
        let obj = this.to_object(context)?;
        let len = obj.get("length", context)?.to_length(context)?;
        Ok((obj, len))
    }

    fn callback(value: &JsValue, method: &str) -> JsResult<JsObject> {
        value.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ()
                .with_message(format!("Array.prototype.{method}: callback is not callable"))
                .into()
        })
    }

    fn relative_index(index: IntegerOrInfinity, len: u64) -> u64 {
        match index {
            IntegerOrInfinity::PositiveInfinity => len,
            IntegerOrInfinity::NegativeInfinity => 0,
            IntegerOrInfinity::Integer(i) if i < 0 => len.saturating_sub(i.unsigned_abs()),
            IntegerOrInfinity::Integer(i) => (i as u64).min(len),
        }
    }

    /// `Array.isArray ( arg )`
    fn is_array(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(args
            .get_or_undefined(0)
            .as_object()
            .map_or(false, JsObject::is_array_abstract)
            .into())
    }

    /// `Array.of ( ...items )`
    fn of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let array = match this.as_constructor() {
            Some(constructor) => constructor
                .clone()
                .construct(&[args.len().into()], None, context)?,
            None => Self::array_create(args.len() as u64, context),
        };
        for (i, value) in args.iter().enumerate() {
            array.create_data_property_or_throw(i, value.clone(), context)?;
        }
        array.set("length", args.len(), true, context)?;
        Ok(array.into())
    }

    /// `Array.from ( items [ , mapfn [ , thisArg ] ] )`
    fn from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let items = args.get_or_undefined(0);
        let mapfn = args.get_or_undefined(1);
        let this_arg = args.get_or_undefined(2);

        let mapping = match mapfn {
            JsValue::Undefined => None,
            value => Some(Self::callback(value, "from (mapFn)")?),
        };

        let uses_iterator = items
            .get_method(JsSymbol::iterator(), context)?
            .is_some();
        let values = if uses_iterator {
            iterable_to_list(context, items, None)?
        } else {
            // Array-like fallback.
            let (obj, len) = Self::this_array_like(items, context)?;
            let mut values = Vec::with_capacity(len as usize);
            for i in 0..len {
                values.push(obj.get(i, context)?);
            }
            values
        };

        let array = Self::array_create(values.len() as u64, context);
        for (i, value) in values.into_iter().enumerate() {
            let value = match &mapping {
                Some(mapfn) => mapfn.call(this_arg, &[value, i.into()], context)?,
                None => value,
            };
            array.create_data_property_or_throw(i, value, context)?;
        }
        Ok(array.into())
    }

    /// `Array.prototype.at ( index )`
    fn at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let relative = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let index = match relative {
            IntegerOrInfinity::Integer(i) if i >= 0 && (i as u64) < len => i as u64,
            IntegerOrInfinity::Integer(i) if i < 0 && i.unsigned_abs() <= len => {
                len - i.unsigned_abs()
            }
            _ => return Ok(JsValue::undefined()),
        };
        obj.get(index, context)
    }

    /// `Array.prototype.concat ( ...items )`
    fn concat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = this.to_object(context)?;
        let result = Self::array_create(0, context);
        let mut n: u64 = 0;

        let mut append = |item: &JsValue, n: &mut u64, context: &mut Context| -> JsResult<()> {
            let spreadable = item
                .as_object()
                .map_or(false, JsObject::is_array_abstract);
            if spreadable {
                let (item_obj, len) = Self::this_array_like(item, context)?;
                for i in 0..len {
                    if item_obj.has_property(i, context)? {
                        let sub = item_obj.get(i, context)?;
                        result.create_data_property_or_throw(*n, sub, context)?;
                    }
                    *n += 1;
                }
            } else {
                result.create_data_property_or_throw(*n, item.clone(), context)?;
                *n += 1;
            }
            Ok(())
        };

        append(&obj.clone().into(), &mut n, context)?;
        for item in args {
            append(item, &mut n, context)?;
        }
        result.set("length", n, true, context)?;
        Ok(result.into())
    }

    /// `Array.prototype.push ( ...items )`
    fn push(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, mut len) = Self::this_array_like(this, context)?;
        for item in args {
            obj.set(len, item.clone(), true, context)?;
            len += 1;
        }
        obj.set("length", len, true, context)?;
        Ok(len.into())
    }

    /// `Array.prototype.pop ( )`
    fn pop(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        if len == 0 {
            obj.set("length", 0, true, context)?;
            return Ok(JsValue::undefined());
        }
        let new_len = len - 1;
        let element = obj.get(new_len, context)?;
        obj.delete_property_or_throw(new_len, context)?;
        obj.set("length", new_len, true, context)?;
        Ok(element)
    }

    /// `Array.prototype.shift ( )`
    fn shift(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        if len == 0 {
            obj.set("length", 0, true, context)?;
            return Ok(JsValue::undefined());
        }
        let first = obj.get(0u64, context)?;
        for i in 1..len {
            if obj.has_property(i, context)? {
                let value = obj.get(i, context)?;
                obj.set(i - 1, value, true, context)?;
            } else {
                obj.delete_property_or_throw(i - 1, context)?;
            }
        }
        obj.delete_property_or_throw(len - 1, context)?;
        obj.set("length", len - 1, true, context)?;
        Ok(first)
    }

    /// `Array.prototype.unshift ( ...items )`
    fn unshift(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let count = args.len() as u64;
        if count > 0 {
            for i in (0..len).rev() {
                if obj.has_property(i, context)? {
                    let value = obj.get(i, context)?;
                    obj.set(i + count, value, true, context)?;
                } else {
                    obj.delete_property_or_throw(i + count, context)?;
                }
            }
            for (i, item) in args.iter().enumerate() {
                obj.set(i, item.clone(), true, context)?;
            }
        }
        obj.set("length", len + count, true, context)?;
        Ok((len + count).into())
    }

    /// `Array.prototype.indexOf ( searchElement [ , fromIndex ] )`
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let search = args.get_or_undefined(0);
        let from = args.get_or_undefined(1).to_integer_or_infinity(context)?;
        let start = Self::relative_index(from, len);
        for i in start..len {
            if obj.has_property(i, context)? {
                let element = obj.get(i, context)?;
                if element.strict_equals(search) {
                    return Ok(i.into());
                }
            }
        }
        Ok((-1).into())
    }

    /// `Array.prototype.includes ( searchElement [ , fromIndex ] )`
    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let search = args.get_or_undefined(0);
        let from = args.get_or_undefined(1).to_integer_or_infinity(context)?;
        let start = Self::relative_index(from, len);
        for i in start..len {
            let element = obj.get(i, context)?;
            // `includes` uses SameValueZero, so a NaN search element is
            // found.
            if JsValue::same_value_zero(&element, search) {
                return Ok(true.into());
            }
        }
        Ok(false.into())
    }

    /// `Array.prototype.join ( separator )`
    pub(crate) fn join(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let separator = args.get_or_undefined(0);
        let separator = if separator.is_undefined() {
            js_string!(",")
        } else {
            separator.to_string(context)?
        };

        let mut result = String::new();
        for i in 0..len {
            if i > 0 {
                result.push_str(&separator);
            }
            let element = obj.get(i, context)?;
            if !element.is_null_or_undefined() {
                result.push_str(&element.to_string(context)?);
            }
        }
        Ok(JsString::from(result).into())
    }

    /// `Array.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = this.to_object(context)?;
        let join = obj.get("join", context)?;
        match join.as_callable() {
            Some(join) => join.clone().call(&obj.into(), &[], context),
            None => super::object::Object::to_string(&obj.into(), &[], context),
        }
    }

    /// `Array.prototype.fill ( value [ , start [ , end ] ] )`
    fn fill(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let value = args.get_or_undefined(0);
        let start = Self::relative_index(
            args.get_or_undefined(1).to_integer_or_infinity(context)?,
            len,
        );
        let end = if args.get_or_undefined(2).is_undefined() {
            len
        } else {
            Self::relative_index(
                args.get_or_undefined(2).to_integer_or_infinity(context)?,
                len,
            )
        };
        for i in start..end {
            obj.set(i, value.clone(), true, context)?;
        }
        Ok(obj.into())
    }

    /// `Array.prototype.reverse ( )`
    fn reverse(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let middle = len / 2;
        let mut lower = 0;
        while lower != middle {
            let upper = len - lower - 1;
            let lower_value = obj.get(lower, context)?;
            let upper_value = obj.get(upper, context)?;
            obj.set(lower, upper_value, true, context)?;
            obj.set(upper, lower_value, true, context)?;
            lower += 1;
        }
        Ok(obj.into())
    }

    /// `Array.prototype.slice ( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let start = Self::relative_index(
            args.get_or_undefined(0).to_integer_or_infinity(context)?,
            len,
        );
        let end = if args.get_or_undefined(1).is_undefined() {
            len
        } else {
            Self::relative_index(
                args.get_or_undefined(1).to_integer_or_infinity(context)?,
                len,
            )
        };

        let result = Self::array_create(0, context);
        let mut n: u64 = 0;
        for i in start..end {
            if obj.has_property(i, context)? {
                let value = obj.get(i, context)?;
                result.create_data_property_or_throw(n, value, context)?;
            }
            n += 1;
        }
        result.set("length", n, true, context)?;
        Ok(result.into())
    }

    /// `Array.prototype.splice ( start, deleteCount, ...items )`
    fn splice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let start = Self::relative_index(
            args.get_or_undefined(0).to_integer_or_infinity(context)?,
            len,
        );
        let insert_count = args.len().saturating_sub(2) as u64;
        let delete_count = match args.len() {
            0 => 0,
            1 => len - start,
            _ => {
                let dc = args.get_or_undefined(1).to_integer_or_infinity(context)?;
                dc.clamp_finite(0, (len - start) as i64) as u64
            }
        };

        // Collect removed elements first.
        let removed = Self::array_create(0, context);
        for i in 0..delete_count {
            if obj.has_property(start + i, context)? {
                let value = obj.get(start + i, context)?;
                removed.create_data_property_or_throw(i, value, context)?;
            }
        }
        removed.set("length", delete_count, true, context)?;

        // Shift the tail.
        if insert_count < delete_count {
            for i in start..(len - delete_count) {
                let from = i + delete_count;
                let to = i + insert_count;
                if obj.has_property(from, context)? {
                    let value = obj.get(from, context)?;
                    obj.set(to, value, true, context)?;
                } else {
                    obj.delete_property_or_throw(to, context)?;
                }
            }
            for i in ((len - delete_count + insert_count)..len).rev() {
                obj.delete_property_or_throw(i, context)?;
            }
        } else if insert_count > delete_count {
            for i in (start..(len - delete_count)).rev() {
                let from = i + delete_count;
                let to = i + insert_count;
                if obj.has_property(from, context)? {
                    let value = obj.get(from, context)?;
                    obj.set(to, value, true, context)?;
                } else {
                    obj.delete_property_or_throw(to, context)?;
                }
            }
        }

        for (i, item) in args.iter().skip(2).enumerate() {
            obj.set(start + i as u64, item.clone(), true, context)?;
        }
        obj.set("length", len - delete_count + insert_count, true, context)?;
        Ok(removed.into())
    }

    /// `Array.prototype.forEach ( callbackfn [ , thisArg ] )`
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let callback = Self::callback(args.get_or_undefined(0), "forEach")?;
        let this_arg = args.get_or_undefined(1);
        for i in 0..len {
            if obj.has_property(i, context)? {
                let element = obj.get(i, context)?;
                callback.call(
                    this_arg,
                    &[element, i.into(), obj.clone().into()],
                    context,
                )?;
            }
        }
        Ok(JsValue::undefined())
    }

    /// `Array.prototype.map ( callbackfn [ , thisArg ] )`
    fn map(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let callback = Self::callback(args.get_or_undefined(0), "map")?;
        let this_arg = args.get_or_undefined(1);
        let result = Self::array_create(len, context);
        for i in 0..len {
            if obj.has_property(i, context)? {
                let element = obj.get(i, context)?;
                let mapped = callback.call(
                    this_arg,
                    &[element, i.into(), obj.clone().into()],
                    context,
                )?;
                result.create_data_property_or_throw(i, mapped, context)?;
            }
        }
        Ok(result.into())
    }

    /// `Array.prototype.filter ( callbackfn [ , thisArg ] )`
    fn filter(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let callback = Self::callback(args.get_or_undefined(0), "filter")?;
        let this_arg = args.get_or_undefined(1);
        let result = Self::array_create(0, context);
        let mut n: u64 = 0;
        for i in 0..len {
            if obj.has_property(i, context)? {
                let element = obj.get(i, context)?;
                let selected = callback.call(
                    this_arg,
                    &[element.clone(), i.into(), obj.clone().into()],
                    context,
                )?;
                if selected.to_boolean() {
                    result.create_data_property_or_throw(n, element, context)?;
                    n += 1;
                }
            }
        }
        result.set("length", n, true, context)?;
        Ok(result.into())
    }

    /// `Array.prototype.reduce ( callbackfn [ , initialValue ] )`
    fn reduce(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let callback = Self::callback(args.get_or_undefined(0), "reduce")?;

        let mut k: u64 = 0;
        let mut accumulator = match args.get(1) {
            Some(initial) => initial.clone(),
            None => loop {
                if k >= len {
                    return Err(JsNativeError::typ()
                        .with_message("Array.prototype.reduce: reduce of empty array with no initial value")
                        .into());
                }
                let present = obj.has_property(k, context)?;
                k += 1;
                if present {
                    break obj.get(k - 1, context)?;
                }
            },
        };

        while k < len {
            if obj.has_property(k, context)? {
                let element = obj.get(k, context)?;
                accumulator = callback.call(
                    &JsValue::undefined(),
                    &[accumulator, element, k.into(), obj.clone().into()],
                    context,
                )?;
            }
            k += 1;
        }
        Ok(accumulator)
    }

    /// `Array.prototype.some ( callbackfn [ , thisArg ] )`
    fn some(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let callback = Self::callback(args.get_or_undefined(0), "some")?;
        let this_arg = args.get_or_undefined(1);
        for i in 0..len {
            if obj.has_property(i, context)? {
                let element = obj.get(i, context)?;
                let selected = callback.call(
                    this_arg,
                    &[element, i.into(), obj.clone().into()],
                    context,
                )?;
                if selected.to_boolean() {
                    return Ok(true.into());
                }
            }
        }
        Ok(false.into())
    }

    /// `Array.prototype.every ( callbackfn [ , thisArg ] )`
    fn every(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let callback = Self::callback(args.get_or_undefined(0), "every")?;
        let this_arg = args.get_or_undefined(1);
        for i in 0..len {
            if obj.has_property(i, context)? {
                let element = obj.get(i, context)?;
                let selected = callback.call(
                    this_arg,
                    &[element, i.into(), obj.clone().into()],
                    context,
                )?;
                if !selected.to_boolean() {
                    return Ok(false.into());
                }
            }
        }
        Ok(true.into())
    }

    /// `Array.prototype.find ( predicate [ , thisArg ] )`
    fn find(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let predicate = Self::callback(args.get_or_undefined(0), "find")?;
        let this_arg = args.get_or_undefined(1);
        for i in 0..len {
            let element = obj.get(i, context)?;
            let selected = predicate.call(
                this_arg,
                &[element.clone(), i.into(), obj.clone().into()],
                context,
            )?;
            if selected.to_boolean() {
                return Ok(element);
            }
        }
        Ok(JsValue::undefined())
    }

    /// `Array.prototype.findIndex ( predicate [ , thisArg ] )`
    fn find_index(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, len) = Self::this_array_like(this, context)?;
        let predicate = Self::callback(args.get_or_undefined(0), "findIndex")?;
        let this_arg = args.get_or_undefined(1);
        for i in 0..len {
            let element = obj.get(i, context)?;
            let selected = predicate.call(
                this_arg,
                &[element, i.into(), obj.clone().into()],
                context,
            )?;
            if selected.to_boolean() {
                return Ok(i.into());
            }
        }
        Ok((-1).into())
    }

    /// `Array.prototype.keys ( )`
    fn keys(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = this.to_object(context)?;
        Ok(ArrayIterator::create_array_iterator(
            obj,
            PropertyNameKind::Key,
            context,
        ))
    }

    /// `Array.prototype.values ( )`
    pub(crate) fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = this.to_object(context)?;
        Ok(ArrayIterator::create_array_iterator(
            obj,
            PropertyNameKind::Value,
            context,
        ))
    }

    /// `Array.prototype.entries ( )`
    fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = this.to_object(context)?;
        Ok(ArrayIterator::create_array_iterator(
            obj,
            PropertyNameKind::KeyAndValue,
            context,
        ))
    }
}
