//! The string iterator object, yielding Unicode scalar values.

use crate::{
    builtins::{iterable::create_iter_result_object, BuiltInBuilder, IntrinsicObject},
    context::intrinsics::Intrinsics,
    error::JsNativeError,
    object::{JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
    Context, JsResult,
};

/// An iteration over a string: `[[IteratedString]]` and
/// `[[StringNextIndex]]`.
#[derive(Debug)]
pub struct StringIterator {
    string: Option<JsString>,
    next_index: usize,
}

impl IntrinsicObject for StringIterator {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 0)
            .static_property(
                JsSymbol::to_string_tag(),
                "String Iterator",
                Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().iterator_prototypes().string()
    }
}

impl StringIterator {
    /// `CreateStringIterator ( string )`
    pub(crate) fn create_string_iterator(string: JsString, context: &mut Context) -> JsValue {
        JsObject::from_proto_and_data(
            Some(context.intrinsics().objects().iterator_prototypes().string()),
            ObjectData::StringIterator(Self {
                string: Some(string),
                next_index: 0,
            }),
        )
        .into()
    }

    /// `%StringIteratorPrototype%.next ( )`
    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut iterator = this.as_object().map(JsObject::borrow_mut);
        let iterator = iterator
            .as_mut()
            .and_then(|obj| obj.as_string_iterator_mut())
            .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a String Iterator"))?;

        let Some(string) = iterator.string.clone() else {
            drop(iterator);
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        };

        let Some(c) = string.as_str()[iterator.next_index..].chars().next() else {
            iterator.string = None;
            drop(iterator);
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        };

        iterator.next_index += c.len_utf8();
        drop(iterator);
        Ok(create_iter_result_object(JsValue::from(c), false, context))
    }
}
