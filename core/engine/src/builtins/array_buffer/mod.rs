//! The global `ArrayBuffer` object.

pub(crate) mod shared;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};

/// The internal representation of an `ArrayBuffer`: its byte block, or
/// `None` once detached.
#[derive(Debug, Default)]
pub struct ArrayBuffer {
    data: Option<Vec<u8>>,
}

impl ArrayBuffer {
    /// Creates a zero-filled buffer of `len` bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            data: Some(vec![0; len]),
        }
    }

    /// The byte block, or `None` if the buffer is detached.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// The mutable byte block, or `None` if the buffer is detached.
    pub fn data_mut(&mut self) -> Option<&mut [u8]> {
        self.data.as_deref_mut()
    }

    /// Checks if the buffer storage was transferred away.
    #[must_use]
    pub fn is_detached(&self) -> bool {
        self.data.is_none()
    }

    /// `DetachArrayBuffer ( arrayBuffer )`: takes the storage out.
    pub fn detach(&mut self) -> Option<Vec<u8>> {
        self.data.take()
    }
}

/// Runs `f` over the bytes of `buffer` (array buffer or shared array
/// buffer); `TypeError` on detached buffers and non-buffers. `f` must not
/// call back into user code.
pub(crate) fn with_buffer_bytes<R>(
    buffer: &JsObject,
    f: impl FnOnce(&[u8]) -> R,
) -> JsResult<R> {
    let borrowed = buffer.borrow();
    if let Some(array_buffer) = borrowed.as_array_buffer() {
        let data = array_buffer.data().ok_or_else(|| {
            JsNativeError::typ().with_message("ArrayBuffer is detached")
        })?;
        return Ok(f(data));
    }
    if let Some(shared) = borrowed.as_shared_array_buffer() {
        let bytes = shared.bytes();
        return Ok(f(bytes.as_slice()));
    }
    Err(JsNativeError::typ()
        .with_message("expected an ArrayBuffer")
        .into())
}

/// Mutable variant of [`with_buffer_bytes`].
pub(crate) fn with_buffer_bytes_mut<R>(
    buffer: &JsObject,
    f: impl FnOnce(&mut [u8]) -> R,
) -> JsResult<R> {
    let mut borrowed = buffer.borrow_mut();
    if let Some(array_buffer) = borrowed.as_array_buffer_mut() {
        let data = array_buffer.data_mut().ok_or_else(|| {
            JsNativeError::typ().with_message("ArrayBuffer is detached")
        })?;
        return Ok(f(data));
    }
    if let Some(shared) = borrowed.as_shared_array_buffer_mut() {
        let mut bytes = shared.bytes_mut();
        return Ok(f(bytes.as_mut_slice()));
    }
    Err(JsNativeError::typ()
        .with_message("expected an ArrayBuffer")
        .into())
}

/// The byte length of a buffer object, `TypeError` when detached.
pub(crate) fn buffer_byte_length(buffer: &JsObject) -> JsResult<u64> {
    with_buffer_bytes(buffer, |bytes| bytes.len() as u64)
}

/// Checks if `obj` is an (attached or detached) buffer object.
pub(crate) fn is_buffer_object(obj: &JsObject) -> bool {
    let borrowed = obj.borrow();
    borrowed.is_array_buffer() || borrowed.is_shared_array_buffer()
}

/// Checks if `obj` is a detached array buffer.
pub(crate) fn is_detached_buffer(obj: &JsObject) -> bool {
    obj.borrow()
        .as_array_buffer()
        .map_or(false, ArrayBuffer::is_detached)
}

impl IntrinsicObject for ArrayBuffer {
    fn init(realm: &Realm) {
        let get_byte_length = BuiltInBuilder::callable(realm, Self::get_byte_length)
            .name("get byteLength")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::is_view, "isView", 1)
            .accessor(
                "byteLength",
                Some(get_byte_length),
                None,
                Attribute::CONFIGURABLE | Attribute::NON_ENUMERABLE,
            )
            .method(Self::slice, "slice", 2)
            .method(Self::transfer, "transfer", 0)
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

impl BuiltInObject for ArrayBuffer {
    const NAME: &'static str = "ArrayBuffer";
}

impl BuiltInConstructor for ArrayBuffer {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::array_buffer;

    /// `ArrayBuffer ( length )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("ArrayBuffer constructor called without `new`")
                .into());
        }

        // 2. Let byteLength be ? ToIndex(length).
        let byte_length = args.get_or_undefined(0).to_index(context)?;

        // 3. Return ? AllocateArrayBuffer(NewTarget, byteLength).
        let prototype = get_prototype_from_constructor(
            new_target,
            StandardConstructors::array_buffer,
            context,
        )?;
        Ok(JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::ArrayBuffer(Self::new(byte_length as usize)),
        )
        .into())
    }
}

impl BuiltIn for ArrayBuffer {
    const PRIORITY: u32 = 210;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("ArrayBuffer", Type::named("ArrayBufferConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl ArrayBuffer {
    fn this_array_buffer(this: &JsValue) -> JsResult<JsObject> {
        this.as_object()
            .filter(|obj| obj.borrow().is_array_buffer())
            .cloned()
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("`this` is not an ArrayBuffer")
                    .into()
            })
    }

    /// `ArrayBuffer.isView ( arg )`
    fn is_view(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(args
            .get_or_undefined(0)
            .as_object()
            .map_or(false, |obj| {
                let borrowed = obj.borrow();
                borrowed.is_typed_array() || borrowed.is_data_view()
            })
            .into())
    }

    /// `get ArrayBuffer.prototype.byteLength`
    fn get_byte_length(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = Self::this_array_buffer(this)?;
        let borrowed = obj.borrow();
        let buffer = borrowed.as_array_buffer().expect("checked above");
        // A detached buffer reports zero.
        Ok(buffer.data().map_or(0, <[u8]>::len).into())
    }

    /// `ArrayBuffer.prototype.slice ( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = Self::this_array_buffer(this)?;

        let len = {
            let borrowed = obj.borrow();
            let buffer = borrowed.as_array_buffer().expect("checked above");
            buffer
                .data()
                .ok_or_else(|| JsNativeError::typ().with_message("ArrayBuffer is detached"))?
                .len() as i64
        };

        let start = args.get_or_undefined(0).to_integer_or_infinity(context)?;
        let first = match start {
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
        let new_len = (end - first).max(0) as usize;

        let mut new_buffer = Self::new(new_len);
        {
            let borrowed = obj.borrow();
            let buffer = borrowed.as_array_buffer().expect("checked above");
            let data = buffer
                .data()
                .ok_or_else(|| JsNativeError::typ().with_message("ArrayBuffer is detached"))?;
            new_buffer
                .data_mut()
                .expect("freshly created")
                .copy_from_slice(&data[first as usize..first as usize + new_len]);
        }

        Ok(JsObject::from_proto_and_data(
            Some(context.intrinsics().constructors().array_buffer().prototype()),
            ObjectData::ArrayBuffer(new_buffer),
        )
        .into())
    }

    /// `ArrayBuffer.prototype.transfer ( )`
    ///
    /// Moves the storage into a fresh buffer and detaches this one; views
    /// over the old buffer raise `TypeError` from then on.
    fn transfer(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = Self::this_array_buffer(this)?;
        let data = obj
            .borrow_mut()
            .as_array_buffer_mut()
            .expect("checked above")
            .detach()
            .ok_or_else(|| JsNativeError::typ().with_message("ArrayBuffer is detached"))?;
        Ok(JsObject::from_proto_and_data(
            Some(context.intrinsics().constructors().array_buffer().prototype()),
            ObjectData::ArrayBuffer(Self { data: Some(data) }),
        )
        .into())
    }
}
