//! The `%TypedArray%` abstract class and the eleven concrete view
//! constructors.
//!
//! A typed array is a view over a buffer: a byte offset, a byte length and
//! an element kind. Element reads and writes go through the buffer in the
//! platform's byte order; `DataView` is the endian-explicit access path.

pub(crate) mod integer_indexed_object;

pub(crate) use integer_indexed_object::IntegerIndexed;

use crate::{
    builtins::{
        array::ArrayIterator,
        array_buffer::{buffer_byte_length, is_buffer_object},
        iterable::iterable_to_list,
        Array, BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::{Attribute, PropertyNameKind},
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};

/// The element kind of a typed-array view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypedArrayKind {
    /// `Int8Array`
    Int8,
    /// `Uint8Array`
    Uint8,
    /// `Uint8ClampedArray`
    Uint8Clamped,
    /// `Int16Array`
    Int16,
    /// `Uint16Array`
    Uint16,
    /// `Int32Array`
    Int32,
    /// `Uint32Array`
    Uint32,
    /// `BigInt64Array`
    BigInt64,
    /// `BigUint64Array`
    BigUint64,
    /// `Float32Array`
    Float32,
    /// `Float64Array`
    Float64,
}

impl TypedArrayKind {
    /// The element size in bytes.
    #[must_use]
    pub const fn element_size(self) -> u64 {
        match self {
            Self::Int8 | Self::Uint8 | Self::Uint8Clamped => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::BigInt64 | Self::BigUint64 | Self::Float64 => 8,
        }
    }

    /// The `[[TypedArrayName]]` of views of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "Int8Array",
            Self::Uint8 => "Uint8Array",
            Self::Uint8Clamped => "Uint8ClampedArray",
            Self::Int16 => "Int16Array",
            Self::Uint16 => "Uint16Array",
            Self::Int32 => "Int32Array",
            Self::Uint32 => "Uint32Array",
            Self::BigInt64 => "BigInt64Array",
            Self::BigUint64 => "BigUint64Array",
            Self::Float32 => "Float32Array",
            Self::Float64 => "Float64Array",
        }
    }

    /// Checks if elements are bigints rather than numbers.
    #[must_use]
    pub const fn is_bigint(self) -> bool {
        matches!(self, Self::BigInt64 | Self::BigUint64)
    }
}

/// The abstract `%TypedArray%` intrinsic; the concrete constructors inherit
/// from it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TypedArray;

impl IntrinsicObject for TypedArray {
    fn init(realm: &Realm) {
        let get_buffer = BuiltInBuilder::callable(realm, Self::get_buffer)
            .name("get buffer")
            .build();
        let get_byte_length = BuiltInBuilder::callable(realm, Self::get_byte_length)
            .name("get byteLength")
            .build();
        let get_byte_offset = BuiltInBuilder::callable(realm, Self::get_byte_offset)
            .name("get byteOffset")
            .build();
        let get_length = BuiltInBuilder::callable(realm, Self::get_length)
            .name("get length")
            .build();
        let get_to_string_tag = BuiltInBuilder::callable(realm, Self::get_to_string_tag)
            .name("get [Symbol.toStringTag]")
            .build();

        let values_function = BuiltInBuilder::callable(realm, Self::values)
            .name("values")
            .build();

        let flag_attributes = Attribute::CONFIGURABLE | Attribute::NON_ENUMERABLE;

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .accessor("buffer", Some(get_buffer), None, flag_attributes)
            .accessor("byteLength", Some(get_byte_length), None, flag_attributes)
            .accessor("byteOffset", Some(get_byte_offset), None, flag_attributes)
            .accessor("length", Some(get_length), None, flag_attributes)
            .accessor(
                JsSymbol::to_string_tag(),
                Some(get_to_string_tag),
                None,
                flag_attributes,
            )
            .method(Self::at, "at", 1)
            .method(Self::entries, "entries", 0)
            .method(Self::fill, "fill", 1)
            .method(Self::join, "join", 1)
            .method(Self::keys, "keys", 0)
            .method(Self::set, "set", 1)
            .method(Self::slice, "slice", 2)
            .method(Self::subarray, "subarray", 2)
            .method(Self::to_string, "toString", 0)
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
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for TypedArray {
    const NAME: &'static str = "TypedArray";
}

impl BuiltInConstructor for TypedArray {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::typed_array;

    /// `%TypedArray% ( )`
    fn constructor(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Err(JsNativeError::typ()
            .with_message("the TypedArray constructor should never be called directly")
            .into())
    }
}

impl BuiltIn for TypedArray {
    const PRIORITY: u32 = 230;

    fn init_types(_types: &mut TypeContext<'_>) {
        // `%TypedArray%` is not a global; only the concrete views are.
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
    }
}

fn this_typed_array(this: &JsValue) -> JsResult<(JsObject, IntegerIndexed)> {
    let obj = this.as_object().cloned().ok_or_else(|| {
        JsNativeError::typ().with_message("`this` is not a typed array")
    })?;
    let inner = obj
        .borrow()
        .as_typed_array()
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a typed array"))?;
    Ok((obj, inner))
}

impl TypedArray {
    /// `get %TypedArray%.prototype.buffer`
    fn get_buffer(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        Ok(inner.viewed_array_buffer().clone().into())
    }

    /// `get %TypedArray%.prototype.byteLength`
    fn get_byte_length(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        Ok(inner.byte_length().into())
    }

    /// `get %TypedArray%.prototype.byteOffset`
    fn get_byte_offset(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        Ok(inner.byte_offset().into())
    }

    /// `get %TypedArray%.prototype.length`
    fn get_length(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        Ok(inner.array_length().into())
    }

    /// `get %TypedArray%.prototype [ @@toStringTag ]`
    #[allow(clippy::unnecessary_wraps)]
    fn get_to_string_tag(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(this
            .as_object()
            .and_then(|obj| obj.borrow().as_typed_array().map(|inner| inner.kind()))
            .map_or(JsValue::undefined(), |kind| {
                js_string!(kind.name()).into()
            }))
    }

    /// `%TypedArray%.prototype.at ( index )`
    fn at(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        let len = inner.array_length() as i64;
        let relative = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let index = match relative {
            IntegerOrInfinity::Integer(i) if i >= 0 && i < len => i as u64,
            IntegerOrInfinity::Integer(i) if i < 0 && -i <= len => (len + i) as u64,
            _ => return Ok(JsValue::undefined()),
        };
        Ok(inner
            .get_element(index, context)?
            .unwrap_or_default())
    }

    /// `%TypedArray%.prototype.fill ( value [ , start [ , end ] ] )`
    fn fill(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, inner) = this_typed_array(this)?;
        let len = inner.array_length() as i64;
        let value = args.get_or_undefined(0).clone();

        let start = match args.get_or_undefined(1).to_integer_or_infinity(context)? {
            IntegerOrInfinity::Integer(i) if i < 0 => (len + i).max(0),
            other => other.clamp_finite(0, len),
        };
        let end = if args.get_or_undefined(2).is_undefined() {
            len
        } else {
            match args.get_or_undefined(2).to_integer_or_infinity(context)? {
                IntegerOrInfinity::Integer(i) if i < 0 => (len + i).max(0),
                other => other.clamp_finite(0, len),
            }
        };

        for i in start..end {
            inner.set_element(i as u64, value.clone(), context)?;
        }
        Ok(obj.into())
    }

    /// `%TypedArray%.prototype.set ( source [ , offset ] )`
    ///
    /// Copies element by element; no aliasing shortcut.
    fn set(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        let offset = args.get_or_undefined(1).to_index(context)?;

        let source = args.get_or_undefined(0);
        let source_obj = source.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("typed array set source must be an object")
        })?;
        let source_len = source_obj.get("length", context)?.to_length(context)?;

        if offset + source_len > inner.array_length() {
            return Err(JsNativeError::range()
                .with_message("typed array set source is too large")
                .into());
        }

        for i in 0..source_len {
            let value = source_obj.get(i, context)?;
            inner.set_element(offset + i, value, context)?;
        }
        Ok(JsValue::undefined())
    }

    /// `%TypedArray%.prototype.subarray ( begin, end )`
    ///
    /// Returns a new view on the same buffer.
    fn subarray(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        let len = inner.array_length() as i64;

        let begin = match args.get_or_undefined(0).to_integer_or_infinity(context)? {
            IntegerOrInfinity::Integer(i) if i < 0 => (len + i).max(0),
            other => other.clamp_finite(0, len),
        };
        let end = if args.get_or_undefined(1).is_undefined() {
            len
        } else {
            match args.get_or_undefined(1).to_integer_or_infinity(context)? {
                IntegerOrInfinity::Integer(i) if i < 0 => (len + i).max(0),
                other => other.clamp_finite(0, len),
            }
        };
        let new_len = (end - begin).max(0) as u64;

        let element_size = inner.kind().element_size();
        let view = IntegerIndexed::new(
            inner.viewed_array_buffer().clone(),
            inner.kind(),
            inner.byte_offset() + begin as u64 * element_size,
            new_len * element_size,
            new_len,
        );
        Ok(create_typed_array_object(view, context).into())
    }

    /// `%TypedArray%.prototype.slice ( start, end )`
    ///
    /// Copies the selected elements into a fresh typed array.
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (_, inner) = this_typed_array(this)?;
        let len = inner.array_length() as i64;

        let start = match args.get_or_undefined(0).to_integer_or_infinity(context)? {
            IntegerOrInfinity::Integer(i) if i < 0 => (len + i).max(0),
            other => other.clamp_finite(0, len),
        };
        let end = if args.get_or_undefined(1).is_undefined() {
            len
        } else {
            match args.get_or_undefined(1).to_integer_or_infinity(context)? {
                IntegerOrInfinity::Integer(i) if i < 0 => (len + i).max(0),
                other => other.clamp_finite(0, len),
            }
        };
        let new_len = (end - start).max(0) as u64;

        let target = allocate_typed_array(inner.kind(), new_len, context)?;
        let target_inner = target
            .borrow()
            .as_typed_array()
            .cloned()
            .expect("freshly allocated typed array");
        for i in 0..new_len {
            let value = inner
                .get_element(start as u64 + i, context)?
                .unwrap_or_default();
            target_inner.set_element(i, value, context)?;
        }
        Ok(target.into())
    }

    /// `%TypedArray%.prototype.join ( separator )`
    fn join(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, _) = this_typed_array(this)?;
        Array::join(&obj.into(), args, context)
    }

    /// `%TypedArray%.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, _) = this_typed_array(this)?;
        Array::join(&obj.into(), &[], context)
    }

    /// `%TypedArray%.prototype.keys ( )`
    fn keys(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, _) = this_typed_array(this)?;
        Ok(ArrayIterator::create_array_iterator(
            obj,
            PropertyNameKind::Key,
            context,
        ))
    }

    /// `%TypedArray%.prototype.values ( )`
    fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, _) = this_typed_array(this)?;
        Ok(ArrayIterator::create_array_iterator(
            obj,
            PropertyNameKind::Value,
            context,
        ))
    }

    /// `%TypedArray%.prototype.entries ( )`
    fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (obj, _) = this_typed_array(this)?;
        Ok(ArrayIterator::create_array_iterator(
            obj,
            PropertyNameKind::KeyAndValue,
            context,
        ))
    }
}

/// Wraps an [`IntegerIndexed`] record in an object with the right
/// per-kind prototype.
fn create_typed_array_object(inner: IntegerIndexed, context: &mut Context) -> JsObject {
    let constructors = context.intrinsics().constructors();
    let prototype = match inner.kind() {
        TypedArrayKind::Int8 => constructors.int8_array().prototype(),
        TypedArrayKind::Uint8 => constructors.uint8_array().prototype(),
        TypedArrayKind::Uint8Clamped => constructors.uint8_clamped_array().prototype(),
        TypedArrayKind::Int16 => constructors.int16_array().prototype(),
        TypedArrayKind::Uint16 => constructors.uint16_array().prototype(),
        TypedArrayKind::Int32 => constructors.int32_array().prototype(),
        TypedArrayKind::Uint32 => constructors.uint32_array().prototype(),
        TypedArrayKind::BigInt64 => constructors.big_int64_array().prototype(),
        TypedArrayKind::BigUint64 => constructors.big_uint64_array().prototype(),
        TypedArrayKind::Float32 => constructors.float32_array().prototype(),
        TypedArrayKind::Float64 => constructors.float64_array().prototype(),
    };
    JsObject::from_proto_and_data(Some(prototype), ObjectData::TypedArray(inner))
}

/// `AllocateTypedArray ( kind, length )`: a zero-filled view over a fresh
/// buffer.
pub(crate) fn allocate_typed_array(
    kind: TypedArrayKind,
    length: u64,
    context: &mut Context,
) -> JsResult<JsObject> {
    let byte_length = length
        .checked_mul(kind.element_size())
        .filter(|len| *len <= isize::MAX as u64)
        .ok_or_else(|| {
            JsNativeError::range().with_message("typed array length exceeds the allocation limit")
        })?;
    let buffer = JsObject::from_proto_and_data(
        Some(context.intrinsics().constructors().array_buffer().prototype()),
        ObjectData::ArrayBuffer(crate::builtins::array_buffer::ArrayBuffer::new(
            byte_length as usize,
        )),
    );
    let inner = IntegerIndexed::new(buffer, kind, 0, byte_length, length);
    Ok(create_typed_array_object(inner, context))
}

/// The shared constructor behavior of the concrete views.
fn construct_typed_array(
    kind: TypedArrayKind,
    default: fn(&StandardConstructors) -> &StandardConstructor,
    new_target: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    if new_target.is_undefined() {
        return Err(JsNativeError::typ()
            .with_message(format!("{} constructor called without `new`", kind.name()))
            .into());
    }
    let prototype = get_prototype_from_constructor(new_target, default, context)?;
    let element_size = kind.element_size();

    let result = match args.get_or_undefined(0) {
        // new T(length)
        JsValue::Undefined => allocate_typed_array(kind, 0, context)?,
        value if value.is_number() => {
            let length = value.to_index(context)?;
            allocate_typed_array(kind, length, context)?
        }
        // new T(buffer [, byteOffset [, length ]])
        JsValue::Object(obj) if is_buffer_object(obj) => {
            let byte_offset = args.get_or_undefined(1).to_index(context)?;
            if byte_offset % element_size != 0 {
                return Err(JsNativeError::range()
                    .with_message("typed array byteOffset must be aligned to the element size")
                    .into());
            }
            let buffer_len = buffer_byte_length(obj)?;
            let byte_length = if args.get_or_undefined(2).is_undefined() {
                let rest = buffer_len
                    .checked_sub(byte_offset)
                    .ok_or_else(|| {
                        JsNativeError::range()
                            .with_message("typed array byteOffset is outside the buffer")
                    })?;
                if rest % element_size != 0 {
                    return Err(JsNativeError::range()
                        .with_message("buffer length is not a multiple of the element size")
                        .into());
                }
                rest
            } else {
                let length = args.get_or_undefined(2).to_index(context)?;
                let byte_length = length * element_size;
                if byte_offset + byte_length > buffer_len {
                    return Err(JsNativeError::range()
                        .with_message("typed array view is outside the bounds of the buffer")
                        .into());
                }
                byte_length
            };
            let inner = IntegerIndexed::new(
                obj.clone(),
                kind,
                byte_offset,
                byte_length,
                byte_length / element_size,
            );
            create_typed_array_object(inner, context)
        }
        // new T(arrayLike | iterable)
        value => {
            let values = match value.get_method(JsSymbol::iterator(), context)? {
                Some(_) => iterable_to_list(context, value, None)?,
                None => {
                    let obj = value.to_object(context)?;
                    let len = obj.get("length", context)?.to_length(context)?;
                    let mut values = Vec::with_capacity(len as usize);
                    for i in 0..len {
                        values.push(obj.get(i, context)?);
                    }
                    values
                }
            };
            let array = allocate_typed_array(kind, values.len() as u64, context)?;
            let inner = array
                .borrow()
                .as_typed_array()
                .cloned()
                .expect("freshly allocated typed array");
            for (i, value) in values.into_iter().enumerate() {
                inner.set_element(i as u64, value, context)?;
            }
            array
        }
    };

    // Subclass prototypes override the per-kind default.
    result.set_prototype(Some(prototype));
    Ok(result.into())
}

macro_rules! typed_array_constructor {
    ($( $(#[$attr:meta])* $name:ident, $kind:expr, $slot:ident, $priority:expr );* $(;)?) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Clone, Copy)]
            pub(crate) struct $name;

            impl IntrinsicObject for $name {
                fn init(realm: &Realm) {
                    let size_attribute =
                        Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
                    BuiltInBuilder::from_standard_constructor::<Self>(realm)
                        // Both the constructor and its prototype chain into
                        // the abstract `%TypedArray%`.
                        .prototype(realm.intrinsics().constructors().typed_array().constructor())
                        .inherits(Some(
                            realm.intrinsics().constructors().typed_array().prototype(),
                        ))
                        .static_property(
                            "BYTES_PER_ELEMENT",
                            $kind.element_size(),
                            size_attribute,
                        )
                        .property("BYTES_PER_ELEMENT", $kind.element_size(), size_attribute)
                        .build();
                }

                fn get(intrinsics: &Intrinsics) -> JsObject {
                    Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
                }
            }

            impl BuiltInObject for $name {
                const NAME: &'static str = $kind.name();
            }

            impl BuiltInConstructor for $name {
                const LENGTH: usize = 3;

                const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
                    StandardConstructors::$slot;

                fn constructor(
                    new_target: &JsValue,
                    args: &[JsValue],
                    context: &mut Context,
                ) -> JsResult<JsValue> {
                    construct_typed_array(
                        $kind,
                        StandardConstructors::$slot,
                        new_target,
                        args,
                        context,
                    )
                }
            }

            impl BuiltIn for $name {
                const PRIORITY: u32 = $priority;

                fn init_types(types: &mut TypeContext<'_>) {
                    types.define_global($kind.name(), Type::named($kind.name()));
                }

                fn init_runtime(realm: &Realm) {
                    <Self as IntrinsicObject>::init(realm);
                    super::global_binding::<Self>(realm);
                }
            }
        )*
    };
}

typed_array_constructor! {
    /// The `Int8Array` view constructor.
    Int8Array, TypedArrayKind::Int8, int8_array, 231;
    /// The `Uint8Array` view constructor.
    Uint8Array, TypedArrayKind::Uint8, uint8_array, 232;
    /// The `Uint8ClampedArray` view constructor.
    Uint8ClampedArray, TypedArrayKind::Uint8Clamped, uint8_clamped_array, 233;
    /// The `Int16Array` view constructor.
    Int16Array, TypedArrayKind::Int16, int16_array, 234;
    /// The `Uint16Array` view constructor.
    Uint16Array, TypedArrayKind::Uint16, uint16_array, 235;
    /// The `Int32Array` view constructor.
    Int32Array, TypedArrayKind::Int32, int32_array, 236;
    /// The `Uint32Array` view constructor.
    Uint32Array, TypedArrayKind::Uint32, uint32_array, 237;
    /// The `BigInt64Array` view constructor.
    BigInt64Array, TypedArrayKind::BigInt64, big_int64_array, 238;
    /// The `BigUint64Array` view constructor.
    BigUint64Array, TypedArrayKind::BigUint64, big_uint64_array, 239;
    /// The `Float32Array` view constructor.
    Float32Array, TypedArrayKind::Float32, float32_array, 240;
    /// The `Float64Array` view constructor.
    Float64Array, TypedArrayKind::Float64, float64_array, 241;
}
