//! The array iterator object, shared by arrays and typed arrays.

use crate::{
    builtins::{iterable::create_iter_result_object, BuiltInBuilder, IntrinsicObject},
    context::intrinsics::Intrinsics,
    error::JsNativeError,
    object::{JsObject, ObjectData},
    property::{Attribute, PropertyNameKind},
    realm::Realm,
    symbol::JsSymbol,
    value::JsValue,
    Context, JsResult,
};

/// An iteration over an array-like object: `[[IteratedArrayLike]]`,
/// `[[ArrayLikeNextIndex]]` and `[[ArrayLikeIterationKind]]`.
#[derive(Debug)]
pub struct ArrayIterator {
    array: Option<JsObject>,
    next_index: u64,
    kind: PropertyNameKind,
}

impl IntrinsicObject for ArrayIterator {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 0)
            .static_property(
                JsSymbol::to_string_tag(),
                "Array Iterator",
                Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().iterator_prototypes().array()
    }
}

impl ArrayIterator {
    /// `CreateArrayIterator ( array, kind )`
    pub(crate) fn create_array_iterator(
        array: JsObject,
        kind: PropertyNameKind,
        context: &mut Context,
    ) -> JsValue {
        let iter = Self {
            array: Some(array),
            next_index: 0,
            kind,
        };
        JsObject::from_proto_and_data(
            Some(context.intrinsics().objects().iterator_prototypes().array()),
            ObjectData::ArrayIterator(iter),
        )
        .into()
    }

    /// `%ArrayIteratorPrototype%.next ( )`
    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (array, index, kind) = {
            let mut iterator = this.as_object().map(JsObject::borrow_mut);
            let iterator = iterator
                .as_mut()
                .and_then(|obj| obj.as_array_iterator_mut())
                .ok_or_else(|| {
                    JsNativeError::typ().with_message("`this` is not an Array Iterator")
                })?;
            let Some(array) = iterator.array.clone() else {
                return Ok(create_iter_result_object(JsValue::undefined(), true, context));
            };
            (array, iterator.next_index, iterator.kind)
        };

        let len = array.get("length", context)?.to_length(context)?;
        if index >= len {
            if let Some(obj) = this.as_object() {
                if let Some(iterator) = obj.borrow_mut().as_array_iterator_mut() {
                    iterator.array = None;
                }
            }
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        }

        if let Some(obj) = this.as_object() {
            if let Some(iterator) = obj.borrow_mut().as_array_iterator_mut() {
                iterator.next_index = index + 1;
            }
        }

        match kind {
            PropertyNameKind::Key => Ok(create_iter_result_object(
                JsValue::from(index),
                false,
                context,
            )),
            PropertyNameKind::Value => {
                let value = array.get(index, context)?;
                Ok(create_iter_result_object(value, false, context))
            }
            PropertyNameKind::KeyAndValue => {
                let value = array.get(index, context)?;
                let entry = crate::builtins::Array::create_array_from_list(
                    [JsValue::from(index), value],
                    context,
                );
                Ok(create_iter_result_object(entry.into(), false, context))
            }
        }
    }
}
