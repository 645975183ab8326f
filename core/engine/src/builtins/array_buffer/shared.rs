//! The global `SharedArrayBuffer` object.
//!
//! The byte block is shared between every view and clone of the buffer.
//! There are no atomics in this core; a future extension would add
//! `Atomics` over the same storage.

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
use std::{
    cell::{Ref, RefCell, RefMut},
    rc::Rc,
};

/// The internal representation of a `SharedArrayBuffer`: a shared byte
/// block that is never detached.
#[derive(Debug, Clone, Default)]
pub struct SharedArrayBuffer {
    data: Rc<RefCell<Vec<u8>>>,
}

impl SharedArrayBuffer {
    /// Creates a zero-filled shared buffer of `len` bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            data: Rc::new(RefCell::new(vec![0; len])),
        }
    }

    /// Borrows the shared byte block.
    #[must_use]
    pub fn bytes(&self) -> Ref<'_, Vec<u8>> {
        self.data.borrow()
    }

    /// Mutably borrows the shared byte block.
    #[must_use]
    pub fn bytes_mut(&self) -> RefMut<'_, Vec<u8>> {
        self.data.borrow_mut()
    }

    /// The byte length of the block.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    /// Checks if the block is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl IntrinsicObject for SharedArrayBuffer {
    fn init(realm: &Realm) {
        let get_byte_length = BuiltInBuilder::callable(realm, Self::get_byte_length)
            .name("get byteLength")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .accessor(
                "byteLength",
                Some(get_byte_length),
                None,
                Attribute::CONFIGURABLE | Attribute::NON_ENUMERABLE,
            )
            .method(Self::slice, "slice", 2)
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

impl BuiltInObject for SharedArrayBuffer {
    const NAME: &'static str = "SharedArrayBuffer";
}

impl BuiltInConstructor for SharedArrayBuffer {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::shared_array_buffer;

    /// `SharedArrayBuffer ( length )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("SharedArrayBuffer constructor called without `new`")
                .into());
        }

        let byte_length = args.get_or_undefined(0).to_index(context)?;
        let prototype = get_prototype_from_constructor(
            new_target,
            StandardConstructors::shared_array_buffer,
            context,
        )?;
        Ok(JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::SharedArrayBuffer(Self::new(byte_length as usize)),
        )
        .into())
    }
}

impl BuiltIn for SharedArrayBuffer {
    const PRIORITY: u32 = 220;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global(
            "SharedArrayBuffer",
            Type::named("SharedArrayBufferConstructor"),
        );
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::super::global_binding::<Self>(realm);
    }
}

impl SharedArrayBuffer {
    fn this_shared_buffer(this: &JsValue) -> JsResult<SharedArrayBuffer> {
        this.as_object()
            .and_then(|obj| obj.borrow().as_shared_array_buffer().cloned())
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("`this` is not a SharedArrayBuffer")
                    .into()
            })
    }

    /// `get SharedArrayBuffer.prototype.byteLength`
    fn get_byte_length(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(Self::this_shared_buffer(this)?.len().into())
    }

    /// `SharedArrayBuffer.prototype.slice ( start, end )`
    fn slice(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let shared = Self::this_shared_buffer(this)?;
        let len = shared.len() as i64;

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
        let new_len = (end - start).max(0) as usize;

        let new_buffer = Self::new(new_len);
        new_buffer
            .bytes_mut()
            .copy_from_slice(&shared.bytes()[start as usize..start as usize + new_len]);

        Ok(JsObject::from_proto_and_data(
            Some(
                context
                    .intrinsics()
                    .constructors()
                    .shared_array_buffer()
                    .prototype(),
            ),
            ObjectData::SharedArrayBuffer(new_buffer),
        )
        .into())
    }
}
