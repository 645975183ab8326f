//! The global `String` object.
//!
//! Methods count positions in Unicode scalar values, matching the engine's
//! UTF-8 string representation.

pub(crate) mod string_iterator;

pub(crate) use string_iterator::StringIterator;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::PropertyDescriptor,
    realm::Realm,
    string::{is_trimmable_whitespace, JsString},
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};

/// The global `String` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct String;

impl IntrinsicObject for String {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::from_char_code, "fromCharCode", 1)
            .method(Self::at, "at", 1)
            .method(Self::char_at, "charAt", 1)
            .method(Self::char_code_at, "charCodeAt", 1)
            .method(Self::ends_with, "endsWith", 1)
            .method(Self::includes, "includes", 1)
            .method(Self::index_of, "indexOf", 1)
            .method(Self::repeat, "repeat", 1)
            .method(Self::slice, "slice", 2)
            .method(Self::split, "split", 2)
            .method(Self::starts_with, "startsWith", 1)
            .method(Self::substring, "substring", 2)
            .method(Self::to_lower_case, "toLowerCase", 0)
            .method(Self::to_string, "toString", 0)
            .method(Self::to_upper_case, "toUpperCase", 0)
            .method(Self::trim, "trim", 0)
            .method(Self::value_of, "valueOf", 0)
            .method(Self::iterator, (JsSymbol::iterator(), "[Symbol.iterator]"), 0)
            .build();

        StringIterator::init(realm);

        // `%String.prototype%` is a wrapper around the empty string.
        let prototype = realm.intrinsics().constructors().string().prototype();
        let mut prototype_obj = prototype.borrow_mut();
        prototype_obj.data = ObjectData::String(js_string!());
        prototype_obj.insert(
            "length",
            PropertyDescriptor::builder()
                .value(0)
                .writable(false)
                .enumerable(false)
                .configurable(false),
        );
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for String {
    const NAME: &'static str = "String";
}

impl BuiltInConstructor for String {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::string;

    /// `String ( value )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let string = match args.get(0) {
            // `String(symbol)` is the one place a symbol stringifies.
            Some(JsValue::Symbol(symbol)) if new_target.is_undefined() => {
                return Ok(symbol.descriptive_string().into())
            }
            Some(value) => value.to_string(context)?,
            None => js_string!(),
        };

        if new_target.is_undefined() {
            return Ok(string.into());
        }

        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::string, context)?;
        let length = string.chars().count();
        let wrapper =
            JsObject::from_proto_and_data(Some(prototype), ObjectData::String(string));
        wrapper.insert_property(
            "length",
            PropertyDescriptor::builder()
                .value(length)
                .writable(false)
                .enumerable(false)
                .configurable(false),
        );
        Ok(wrapper.into())
    }
}

impl BuiltIn for String {
    const PRIORITY: u32 = 40;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global(
            "String",
            Type::Constructor(crate::types::FunctionSignature {
                params: vec![Type::Unknown],
                rest: None,
                returns: Box::new(Type::String),
            }),
        );
        types.set_primitive_prototype(crate::types::Primitive::String, Type::named("String"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

/// `thisStringValue ( value )` relaxed to full `ToString` coercion for
/// generic methods.
fn this_string_value(this: &JsValue, context: &mut Context) -> JsResult<JsString> {
    if this.is_null_or_undefined() {
        return Err(JsNativeError::typ()
            .with_message("String.prototype method called on null or undefined")
            .into());
    }
    if let Some(obj) = this.as_object() {
        if let Some(string) = obj.borrow().as_string() {
            return Ok(string);
        }
    }
    this.to_string(context)
}

fn clamp_position(position: IntegerOrInfinity, len: usize) -> usize {
    match position {
        IntegerOrInfinity::NegativeInfinity => 0,
        IntegerOrInfinity::PositiveInfinity => len,
        IntegerOrInfinity::Integer(i) if i < 0 => len.saturating_sub(i.unsigned_abs() as usize),
        IntegerOrInfinity::Integer(i) => (i as usize).min(len),
    }
}

impl String {
    /// `String.fromCharCode ( ...codeUnits )`
    fn from_char_code(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut result = std::string::String::with_capacity(args.len());
        for arg in args {
            let code = arg.to_u32(context)? & 0xFFFF;
            result.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        }
        Ok(JsString::from(result).into())
    }

    /// `String.prototype.toString ( )` and `String.prototype.valueOf ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_string_value(this, context)?.into())
    }

    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this_string_value(this, context)?.into())
    }

    /// `String.prototype.at ( index )`
    fn at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let len = string.chars().count();
        let relative = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let index = match relative {
            IntegerOrInfinity::Integer(i) if i >= 0 && (i as usize) < len => i as usize,
            IntegerOrInfinity::Integer(i) if i < 0 && (i.unsigned_abs() as usize) <= len => {
                len - i.unsigned_abs() as usize
            }
            _ => return Ok(JsValue::undefined()),
        };
        Ok(string
            .chars()
            .nth(index)
            .map_or(JsValue::undefined(), JsValue::from))
    }

    /// `String.prototype.charAt ( pos )`
    fn char_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let position = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        match position {
            IntegerOrInfinity::Integer(i) if i >= 0 => Ok(string
                .chars()
                .nth(i as usize)
                .map_or_else(|| js_string!().into(), JsValue::from)),
            _ => Ok(js_string!().into()),
        }
    }

    /// `String.prototype.charCodeAt ( pos )`
    fn char_code_at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let position = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        match position {
            IntegerOrInfinity::Integer(i) if i >= 0 => Ok(string
                .chars()
                .nth(i as usize)
                .map_or(JsValue::nan(), |c| JsValue::from(c as u32))),
            _ => Ok(JsValue::nan()),
        }
    }

    /// `String.prototype.indexOf ( searchString [ , position ] )`
    fn index_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let len = string.chars().count();
        let start = clamp_position(
            args.get_or_undefined(1).to_integer_or_infinity(context)?,
            len,
        );
        let byte_start: usize = string.chars().take(start).map(char::len_utf8).sum();
        match string.as_str()[byte_start..].find(search.as_str()) {
            Some(byte_index) => {
                let char_index = string.as_str()[..byte_start + byte_index].chars().count();
                Ok(JsValue::from(char_index))
            }
            None => Ok((-1).into()),
        }
    }

    /// `String.prototype.includes ( searchString [ , position ] )`
    fn includes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let len = string.chars().count();
        let start = clamp_position(
            args.get_or_undefined(1).to_integer_or_infinity(context)?,
            len,
        );
        let byte_start: usize = string.chars().take(start).map(char::len_utf8).sum();
        Ok(string.as_str()[byte_start..]
            .contains(search.as_str())
            .into())
    }

    /// `String.prototype.startsWith ( searchString [ , position ] )`
    fn starts_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let len = string.chars().count();
        let start = clamp_position(
            args.get_or_undefined(1).to_integer_or_infinity(context)?,
            len,
        );
        let byte_start: usize = string.chars().take(start).map(char::len_utf8).sum();
        Ok(string.as_str()[byte_start..]
            .starts_with(search.as_str())
            .into())
    }

    /// `String.prototype.endsWith ( searchString [ , endPosition ] )`
    fn ends_with(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let search = args.get_or_undefined(0).to_string(context)?;
        let len = string.chars().count();
        let end = if args.get_or_undefined(1).is_undefined() {
            len
        } else {
            clamp_position(
                args.get_or_undefined(1).to_integer_or_infinity(context)?,
                len,
            )
        };
        let byte_end: usize = string.chars().take(end).map(char::len_utf8).sum();
        Ok(string.as_str()[..byte_end].ends_with(search.as_str()).into())
    }

    /// `String.prototype.slice ( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let len = string.chars().count();
        let start = clamp_position(
            args.get_or_undefined(0).to_integer_or_infinity(context)?,
            len,
        );
        let end = if args.get_or_undefined(1).is_undefined() {
            len
        } else {
            clamp_position(
                args.get_or_undefined(1).to_integer_or_infinity(context)?,
                len,
            )
        };
        if start >= end {
            return Ok(js_string!().into());
        }
        let sliced: std::string::String =
            string.chars().skip(start).take(end - start).collect();
        Ok(JsString::from(sliced).into())
    }

    /// `String.prototype.substring ( start, end )`
    fn substring(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let len = string.chars().count();
        let int_start = args
            .get_or_undefined(0)
            .to_integer_or_infinity(context)?
            .clamp_finite(0, len as i64) as usize;
        let int_end = if args.get_or_undefined(1).is_undefined() {
            len
        } else {
            args.get_or_undefined(1)
                .to_integer_or_infinity(context)?
                .clamp_finite(0, len as i64) as usize
        };
        let (from, to) = (int_start.min(int_end), int_start.max(int_end));
        let substring: std::string::String = string.chars().skip(from).take(to - from).collect();
        Ok(JsString::from(substring).into())
    }

    /// `String.prototype.repeat ( count )`
    fn repeat(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let count = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        match count {
            IntegerOrInfinity::Integer(n) if n >= 0 => {
                Ok(JsString::from(string.as_str().repeat(n as usize)).into())
            }
            _ => Err(JsNativeError::range()
                .with_message("repeat count must be a positive finite number")
                .into()),
        }
    }

    /// `String.prototype.split ( separator, limit )`
    ///
    /// String separators only; the `@@split` protocol belongs to the host's
    /// regexp implementation.
    fn split(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        let separator = args.get_or_undefined(0);
        let limit = args.get_or_undefined(1);

        let limit = if limit.is_undefined() {
            u32::MAX
        } else {
            limit.to_u32(context)?
        };
        if limit == 0 {
            return Ok(crate::builtins::Array::create_array_from_list([], context).into());
        }
        if separator.is_undefined() {
            return Ok(crate::builtins::Array::create_array_from_list(
                [string.into()],
                context,
            )
            .into());
        }

        let separator = separator.to_string(context)?;
        let parts: Vec<JsValue> = if separator.is_empty() {
            string
                .chars()
                .take(limit as usize)
                .map(JsValue::from)
                .collect()
        } else {
            string
                .as_str()
                .split(separator.as_str())
                .take(limit as usize)
                .map(|part| JsValue::from(JsString::from(part)))
                .collect()
        };
        Ok(crate::builtins::Array::create_array_from_list(parts, context).into())
    }

    /// `String.prototype.toLowerCase ( )`
    fn to_lower_case(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsString::from(string.as_str().to_lowercase()).into())
    }

    /// `String.prototype.toUpperCase ( )`
    fn to_upper_case(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsString::from(string.as_str().to_uppercase()).into())
    }

    /// `String.prototype.trim ( )`
    fn trim(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(JsString::from(string.trim_matches(is_trimmable_whitespace)).into())
    }

    /// `String.prototype [ @@iterator ] ( )`
    fn iterator(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = this_string_value(this, context)?;
        Ok(StringIterator::create_string_iterator(string, context))
    }
}
