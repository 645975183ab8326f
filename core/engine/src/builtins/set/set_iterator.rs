//! The set iterator object.

use crate::{
    builtins::{iterable::create_iter_result_object, Array, BuiltInBuilder, IntrinsicObject},
    context::intrinsics::Intrinsics,
    error::JsNativeError,
    object::{JsObject, ObjectData},
    property::{Attribute, PropertyNameKind},
    realm::Realm,
    symbol::JsSymbol,
    value::JsValue,
    Context, JsResult,
};

use super::ordered_set::SetLock;

/// An iteration over a set: `[[IteratedSet]]`, `[[SetNextIndex]]` and
/// `[[SetIterationKind]]`. An exhausted iterator drops its set reference and
/// stays done.
#[derive(Debug)]
pub struct SetIterator {
    iterated_set: Option<JsObject>,
    next_index: usize,
    iteration_kind: PropertyNameKind,
    #[allow(dead_code)]
    lock: SetLock,
}

impl IntrinsicObject for SetIterator {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 0)
            .static_property(
                JsSymbol::to_string_tag(),
                "Set Iterator",
                Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().iterator_prototypes().set()
    }
}

impl SetIterator {
    /// `CreateSetIterator ( set, kind )`
    pub(crate) fn create_set_iterator(
        set: JsObject,
        kind: PropertyNameKind,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let lock = set
            .borrow_mut()
            .as_set_mut()
            .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a Set"))?
            .lock(set.clone());
        let set_iterator = JsObject::from_proto_and_data(
            Some(context.intrinsics().objects().iterator_prototypes().set()),
            ObjectData::SetIterator(Self {
                iterated_set: Some(set),
                next_index: 0,
                iteration_kind: kind,
                lock,
            }),
        );
        Ok(set_iterator.into())
    }

    /// `%SetIteratorPrototype%.next ( )`
    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut set_iterator = this.as_object().map(JsObject::borrow_mut);
        let set_iterator = set_iterator
            .as_mut()
            .and_then(|obj| obj.as_set_iterator_mut())
            .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a Set Iterator"))?;

        let item_kind = set_iterator.iteration_kind;

        if let Some(obj) = set_iterator.iterated_set.take() {
            let entry = {
                let set = obj.borrow();
                let entries = set
                    .as_set()
                    .ok_or_else(|| JsNativeError::typ().with_message("'this' is not a Set"))?;
                let len = entries.full_len();
                loop {
                    let element = entries.get_index(set_iterator.next_index).cloned();
                    set_iterator.next_index += 1;
                    if element.is_some() || set_iterator.next_index >= len {
                        break element;
                    }
                }
            };
            if let Some(value) = entry {
                set_iterator.iterated_set = Some(obj);
                drop(set_iterator);
                let item = match item_kind {
                    PropertyNameKind::Value | PropertyNameKind::Key => {
                        create_iter_result_object(value, false, context)
                    }
                    PropertyNameKind::KeyAndValue => {
                        let result =
                            Array::create_array_from_list([value.clone(), value], context);
                        create_iter_result_object(result.into(), false, context)
                    }
                };
                return Ok(item);
            }
        }

        drop(set_iterator);
        Ok(create_iter_result_object(JsValue::undefined(), true, context))
    }
}
