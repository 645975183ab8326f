//! The map iterator object.

use super::ordered_map::MapLock;
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

/// An iteration over a map: `[[IteratedMap]]`, `[[MapNextIndex]]` and
/// `[[MapIterationKind]]`. A consumed iterator drops its map reference and
/// stays exhausted.
#[derive(Debug)]
pub struct MapIterator {
    iterated_map: Option<JsObject>,
    map_next_index: usize,
    map_iteration_kind: PropertyNameKind,
    #[allow(dead_code)]
    lock: MapLock,
}

impl IntrinsicObject for MapIterator {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 0)
            .static_property(
                JsSymbol::to_string_tag(),
                "Map Iterator",
                Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().iterator_prototypes().map()
    }
}

impl MapIterator {
    /// `CreateMapIterator ( map, kind )`
    pub(crate) fn create_map_iterator(
        map: &JsValue,
        kind: PropertyNameKind,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        if let Some(map_obj) = map.as_object() {
            if let Some(map_data) = map_obj.borrow_mut().as_map_mut() {
                let lock = map_data.lock(map_obj.clone());
                let iter = Self {
                    iterated_map: Some(map_obj.clone()),
                    map_next_index: 0,
                    map_iteration_kind: kind,
                    lock,
                };
                let map_iterator = JsObject::from_proto_and_data(
                    Some(context.intrinsics().objects().iterator_prototypes().map()),
                    ObjectData::MapIterator(iter),
                );
                return Ok(map_iterator.into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("`this` is not a Map")
            .into())
    }

    /// `%MapIteratorPrototype%.next ( )`
    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut map_iterator = this.as_object().map(JsObject::borrow_mut);
        let map_iterator = map_iterator
            .as_mut()
            .and_then(|obj| obj.as_map_iterator_mut())
            .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a Map Iterator"))?;

        let item_kind = map_iterator.map_iteration_kind;

        if let Some(obj) = map_iterator.iterated_map.take() {
            let entry = {
                let map = obj.borrow();
                let entries = map.as_map().expect("iterator should only iterate maps");
                let len = entries.full_len();
                loop {
                    // Tombstones left by deletions are skipped, so removals
                    // during iteration are observed live.
                    let element = entries
                        .get_index(map_iterator.map_next_index)
                        .map(|(k, v)| (k.clone(), v.clone()));
                    map_iterator.map_next_index += 1;
                    if element.is_some() || map_iterator.map_next_index >= len {
                        break element;
                    }
                }
            };
            if let Some((key, value)) = entry {
                map_iterator.iterated_map = Some(obj);
                drop(map_iterator);
                let item = match item_kind {
                    PropertyNameKind::Key => create_iter_result_object(key, false, context),
                    PropertyNameKind::Value => create_iter_result_object(value, false, context),
                    PropertyNameKind::KeyAndValue => {
                        let result = Array::create_array_from_list([key, value], context);
                        create_iter_result_object(result.into(), false, context)
                    }
                };
                return Ok(item);
            }
        }

        drop(map_iterator);
        Ok(create_iter_result_object(JsValue::undefined(), true, context))
    }
}
