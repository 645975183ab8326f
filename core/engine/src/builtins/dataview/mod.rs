//! The global `DataView` object.
//!
//! Every multibyte access takes `(byteOffset, [littleEndian])`; the default
//! is big-endian when the flag is absent. Out-of-bounds accesses raise
//! `RangeError`; accesses through a detached buffer raise `TypeError`.

use crate::{
    bigint::JsBigInt,
    builtins::{
        array_buffer::{
            buffer_byte_length, is_buffer_object, is_detached_buffer, with_buffer_bytes,
            with_buffer_bytes_mut,
        },
        typed_array::TypedArrayKind,
        BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The internal representation of a `DataView`: `[[ViewedArrayBuffer]]`,
/// `[[ByteLength]]` and `[[ByteOffset]]`.
#[derive(Debug, Clone)]
pub struct DataView {
    viewed_array_buffer: JsObject,
    byte_length: u64,
    byte_offset: u64,
}

impl IntrinsicObject for DataView {
    fn init(realm: &Realm) {
        let flag_attributes = Attribute::CONFIGURABLE | Attribute::NON_ENUMERABLE;

        let get_buffer = BuiltInBuilder::callable(realm, Self::get_buffer)
            .name("get buffer")
            .build();
        let get_byte_length = BuiltInBuilder::callable(realm, Self::get_byte_length)
            .name("get byteLength")
            .build();
        let get_byte_offset = BuiltInBuilder::callable(realm, Self::get_byte_offset)
            .name("get byteOffset")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .accessor("buffer", Some(get_buffer), None, flag_attributes)
            .accessor("byteLength", Some(get_byte_length), None, flag_attributes)
            .accessor("byteOffset", Some(get_byte_offset), None, flag_attributes)
            .method(Self::get_big_int64, "getBigInt64", 1)
            .method(Self::get_big_uint64, "getBigUint64", 1)
            .method(Self::get_float32, "getFloat32", 1)
            .method(Self::get_float64, "getFloat64", 1)
            .method(Self::get_int8, "getInt8", 1)
            .method(Self::get_int16, "getInt16", 1)
            .method(Self::get_int32, "getInt32", 1)
            .method(Self::get_uint8, "getUint8", 1)
            .method(Self::get_uint16, "getUint16", 1)
            .method(Self::get_uint32, "getUint32", 1)
            .method(Self::set_big_int64, "setBigInt64", 2)
            .method(Self::set_big_uint64, "setBigUint64", 2)
            .method(Self::set_float32, "setFloat32", 2)
            .method(Self::set_float64, "setFloat64", 2)
            .method(Self::set_int8, "setInt8", 2)
            .method(Self::set_int16, "setInt16", 2)
            .method(Self::set_int32, "setInt32", 2)
            .method(Self::set_uint8, "setUint8", 2)
            .method(Self::set_uint16, "setUint16", 2)
            .method(Self::set_uint32, "setUint32", 2)
            .property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for DataView {
    const NAME: &'static str = "DataView";
}

impl BuiltInConstructor for DataView {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::data_view;

    /// `DataView ( buffer [ , byteOffset [ , byteLength ] ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("DataView constructor called without `new`")
                .into());
        }

        // 2. Perform ? RequireInternalSlot(buffer, [[ArrayBufferData]]).
        let buffer_obj = args
            .get_or_undefined(0)
            .as_object()
            .filter(|obj| is_buffer_object(obj))
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("buffer must be an ArrayBuffer"))?;

        // 3. Let offset be ? ToIndex(byteOffset).
        let offset = args.get_or_undefined(1).to_index(context)?;

        // 4-6. Bounds-check the offset against the attached buffer.
        let buffer_byte_length = buffer_byte_length(&buffer_obj)?;
        if offset > buffer_byte_length {
            return Err(JsNativeError::range()
                .with_message("start offset is outside the bounds of the buffer")
                .into());
        }

        // 7-8. Compute the view length.
        let byte_length = args.get_or_undefined(2);
        let view_byte_length = if byte_length.is_undefined() {
            buffer_byte_length - offset
        } else {
            let view_byte_length = byte_length.to_index(context)?;
            if offset + view_byte_length > buffer_byte_length {
                return Err(JsNativeError::range()
                    .with_message("invalid DataView length")
                    .into());
            }
            view_byte_length
        };

        // 9-10. The `ToIndex` coercions can detach the buffer.
        if is_detached_buffer(&buffer_obj) {
            return Err(JsNativeError::typ()
                .with_message("ArrayBuffer is detached")
                .into());
        }

        // 11-14. Create and return the view.
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::data_view, context)?;
        let obj = JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::DataView(Self {
                viewed_array_buffer: buffer_obj,
                byte_length: view_byte_length,
                byte_offset: offset,
            }),
        );
        Ok(obj.into())
    }
}

impl BuiltIn for DataView {
    const PRIORITY: u32 = 250;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("DataView", Type::named("DataViewConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

fn this_data_view(this: &JsValue) -> JsResult<DataView> {
    this.as_object()
        .and_then(|obj| obj.borrow().as_data_view().cloned())
        .ok_or_else(|| {
            JsNativeError::typ()
                .with_message("`this` is not a DataView")
                .into()
        })
}

/// `GetViewValue ( view, requestIndex, isLittleEndian, type )`
fn get_view_value(
    this: &JsValue,
    request_index: &JsValue,
    is_little_endian: &JsValue,
    kind: TypedArrayKind,
    context: &mut Context,
) -> JsResult<JsValue> {
    let view = this_data_view(this)?;

    // 3. Let getIndex be ? ToIndex(requestIndex).
    let get_index = request_index.to_index(context)?;

    // 4. Set isLittleEndian to ! ToBoolean(isLittleEndian); absent means
    // big-endian.
    let is_little_endian = is_little_endian.to_boolean();

    // 9-10. If getIndex + elementSize > viewSize, throw a RangeError.
    let element_size = kind.element_size();
    if get_index + element_size > view.byte_length {
        return Err(JsNativeError::range()
            .with_message("offset is outside the bounds of the DataView")
            .into());
    }

    // 11-12. Read from the (attached) buffer.
    let buffer_index = (view.byte_offset + get_index) as usize;
    with_buffer_bytes(&view.viewed_array_buffer, move |bytes| {
        let raw = &bytes[buffer_index..buffer_index + element_size as usize];
        decode_view_element(kind, raw, is_little_endian)
    })
}

/// `SetViewValue ( view, requestIndex, isLittleEndian, type, value )`
fn set_view_value(
    this: &JsValue,
    request_index: &JsValue,
    is_little_endian: &JsValue,
    kind: TypedArrayKind,
    value: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let view = this_data_view(this)?;

    let get_index = request_index.to_index(context)?;
    let is_little_endian = is_little_endian.to_boolean();

    // The numeric coercion may run user code, so it precedes the bounds
    // check and the buffer borrow.
    let raw = encode_view_element(kind, value, is_little_endian, context)?;

    let element_size = kind.element_size();
    if get_index + element_size > view.byte_length {
        return Err(JsNativeError::range()
            .with_message("offset is outside the bounds of the DataView")
            .into());
    }

    let buffer_index = (view.byte_offset + get_index) as usize;
    with_buffer_bytes_mut(&view.viewed_array_buffer, move |bytes| {
        bytes[buffer_index..buffer_index + element_size as usize]
            .copy_from_slice(&raw[..element_size as usize]);
    })?;
    Ok(JsValue::undefined())
}

fn decode_view_element(kind: TypedArrayKind, raw: &[u8], little_endian: bool) -> JsValue {
    macro_rules! decode {
        ($ty:ty) => {{
            let mut bytes = [0u8; std::mem::size_of::<$ty>()];
            bytes.copy_from_slice(raw);
            if little_endian {
                <$ty>::from_le_bytes(bytes)
            } else {
                <$ty>::from_be_bytes(bytes)
            }
        }};
    }

    match kind {
        TypedArrayKind::Int8 => JsValue::from(i32::from(raw[0] as i8)),
        TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => {
            JsValue::from(i32::from(raw[0]))
        }
        TypedArrayKind::Int16 => JsValue::from(i32::from(decode!(i16))),
        TypedArrayKind::Uint16 => JsValue::from(i32::from(decode!(u16))),
        TypedArrayKind::Int32 => JsValue::from(decode!(i32)),
        TypedArrayKind::Uint32 => JsValue::from(decode!(u32)),
        TypedArrayKind::BigInt64 => JsValue::from(JsBigInt::from(decode!(i64))),
        TypedArrayKind::BigUint64 => JsValue::from(JsBigInt::from(decode!(u64))),
        TypedArrayKind::Float32 => JsValue::from(f64::from(decode!(f32))),
        TypedArrayKind::Float64 => JsValue::from(decode!(f64)),
    }
}

fn encode_view_element(
    kind: TypedArrayKind,
    value: &JsValue,
    little_endian: bool,
    context: &mut Context,
) -> JsResult<[u8; 8]> {
    macro_rules! encode {
        ($value:expr) => {{
            let mut raw = [0u8; 8];
            let bytes = if little_endian {
                $value.to_le_bytes()
            } else {
                $value.to_be_bytes()
            };
            raw[..bytes.len()].copy_from_slice(&bytes);
            raw
        }};
    }

    if kind.is_bigint() {
        let bigint = value.as_bigint().ok_or_else(|| {
            JsNativeError::typ().with_message("cannot convert value to a BigInt")
        })?;
        return Ok(match kind {
            TypedArrayKind::BigInt64 => encode!(bigint.to_big_int64()),
            TypedArrayKind::BigUint64 => encode!(bigint.to_big_uint64()),
            _ => unreachable!("checked bigint kinds above"),
        });
    }

    let number = value.to_number(context)?;
    Ok(match kind {
        TypedArrayKind::Int8 | TypedArrayKind::Uint8 | TypedArrayKind::Uint8Clamped => {
            let mut raw = [0u8; 8];
            raw[0] = number.trunc().rem_euclid(256.0) as u8;
            raw
        }
        TypedArrayKind::Int16 | TypedArrayKind::Uint16 => {
            encode!((number.trunc().rem_euclid(65_536.0) as u16))
        }
        TypedArrayKind::Int32 | TypedArrayKind::Uint32 => {
            encode!(crate::value::f64_to_uint32(number))
        }
        TypedArrayKind::Float32 => encode!((number as f32)),
        TypedArrayKind::Float64 => encode!(number),
        TypedArrayKind::BigInt64 | TypedArrayKind::BigUint64 => {
            unreachable!("handled bigint kinds above")
        }
    })
}

macro_rules! data_view_accessors {
    ($( $(#[$get_attr:meta])* $get:ident, $(#[$set_attr:meta])* $set:ident, $kind:expr );* $(;)?) => {
        impl DataView {
            $(
                $(#[$get_attr])*
                fn $get(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                    get_view_value(
                        this,
                        args.get_or_undefined(0),
                        args.get_or_undefined(1),
                        $kind,
                        context,
                    )
                }

                $(#[$set_attr])*
                fn $set(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                    set_view_value(
                        this,
                        args.get_or_undefined(0),
                        args.get_or_undefined(2),
                        $kind,
                        args.get_or_undefined(1),
                        context,
                    )
                }
            )*
        }
    };
}

data_view_accessors! {
    /// `DataView.prototype.getInt8 ( byteOffset )`
    get_int8,
    /// `DataView.prototype.setInt8 ( byteOffset, value )`
    set_int8, TypedArrayKind::Int8;
    /// `DataView.prototype.getUint8 ( byteOffset )`
    get_uint8,
    /// `DataView.prototype.setUint8 ( byteOffset, value )`
    set_uint8, TypedArrayKind::Uint8;
    /// `DataView.prototype.getInt16 ( byteOffset [ , littleEndian ] )`
    get_int16,
    /// `DataView.prototype.setInt16 ( byteOffset, value [ , littleEndian ] )`
    set_int16, TypedArrayKind::Int16;
    /// `DataView.prototype.getUint16 ( byteOffset [ , littleEndian ] )`
    get_uint16,
    /// `DataView.prototype.setUint16 ( byteOffset, value [ , littleEndian ] )`
    set_uint16, TypedArrayKind::Uint16;
    /// `DataView.prototype.getInt32 ( byteOffset [ , littleEndian ] )`
    get_int32,
    /// `DataView.prototype.setInt32 ( byteOffset, value [ , littleEndian ] )`
    set_int32, TypedArrayKind::Int32;
    /// `DataView.prototype.getUint32 ( byteOffset [ , littleEndian ] )`
    get_uint32,
    /// `DataView.prototype.setUint32 ( byteOffset, value [ , littleEndian ] )`
    set_uint32, TypedArrayKind::Uint32;
    /// `DataView.prototype.getBigInt64 ( byteOffset [ , littleEndian ] )`
    get_big_int64,
    /// `DataView.prototype.setBigInt64 ( byteOffset, value [ , littleEndian ] )`
    set_big_int64, TypedArrayKind::BigInt64;
    /// `DataView.prototype.getBigUint64 ( byteOffset [ , littleEndian ] )`
    get_big_uint64,
    /// `DataView.prototype.setBigUint64 ( byteOffset, value [ , littleEndian ] )`
    set_big_uint64, TypedArrayKind::BigUint64;
    /// `DataView.prototype.getFloat32 ( byteOffset [ , littleEndian ] )`
    get_float32,
    /// `DataView.prototype.setFloat32 ( byteOffset, value [ , littleEndian ] )`
    set_float32, TypedArrayKind::Float32;
    /// `DataView.prototype.getFloat64 ( byteOffset [ , littleEndian ] )`
    get_float64,
    /// `DataView.prototype.setFloat64 ( byteOffset, value [ , littleEndian ] )`
    set_float64, TypedArrayKind::Float64;
}

impl DataView {
    /// `get DataView.prototype.buffer`
    fn get_buffer(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let view = this_data_view(this)?;
        Ok(view.viewed_array_buffer.into())
    }

    /// `get DataView.prototype.byteLength`
    fn get_byte_length(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let view = this_data_view(this)?;
        if is_detached_buffer(&view.viewed_array_buffer) {
            return Err(JsNativeError::typ()
                .with_message("ArrayBuffer is detached")
                .into());
        }
        Ok(view.byte_length.into())
    }

    /// `get DataView.prototype.byteOffset`
    fn get_byte_offset(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let view = this_data_view(this)?;
        if is_detached_buffer(&view.viewed_array_buffer) {
            return Err(JsNativeError::typ()
                .with_message("ArrayBuffer is detached")
                .into());
        }
        Ok(view.byte_offset.into())
    }
}
