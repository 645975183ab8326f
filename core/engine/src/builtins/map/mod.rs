//! The global `Map` object: an insertion-ordered key-value store with
//! `SameValueZero` key equality.

pub(crate) mod map_iterator;
pub mod ordered_map;

pub(crate) use map_iterator::MapIterator;

use ordered_map::OrderedMap;

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        iterable::{if_abrupt_close_iterator, IteratorRecord},
        BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::{Attribute, PropertyNameKind},
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The global `Map` builtin.
#[derive(Debug, Clone)]
pub(crate) struct Map;

impl IntrinsicObject for Map {
    fn init(realm: &Realm) {
        let get_species = BuiltInBuilder::callable(realm, Self::get_species)
            .name("get [Symbol.species]")
            .build();

        let get_size = BuiltInBuilder::callable(realm, Self::get_size)
            .name("get size")
            .build();

        let entries_function = BuiltInBuilder::callable(realm, Self::entries)
            .name("entries")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::group_by, "groupBy", 2)
            .static_accessor(
                JsSymbol::species(),
                Some(get_species),
                None,
                Attribute::CONFIGURABLE,
            )
            // `Map.prototype.entries` and `Map.prototype[@@iterator]` share
            // object identity.
            .property(
                "entries",
                entries_function.clone(),
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .property(
                JsSymbol::iterator(),
                entries_function,
                Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .method(Self::clear, "clear", 0)
            .method(Self::delete, "delete", 1)
            .method(Self::for_each, "forEach", 1)
            .method(Self::get, "get", 1)
            .method(Self::has, "has", 1)
            .method(Self::keys, "keys", 0)
            .method(Self::set, "set", 2)
            .method(Self::values, "values", 0)
            .accessor("size", Some(get_size), None, Attribute::CONFIGURABLE)
            .build();

        MapIterator::init(realm);
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Map {
    const NAME: &'static str = "Map";
}

impl BuiltInConstructor for Map {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::map;

    /// `Map ( [ iterable ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("calling a builtin Map constructor without new is forbidden")
                .into());
        }

        // 2. Let map be ? OrdinaryCreateFromConstructor(NewTarget, "%Map.prototype%", « [[MapData]] »).
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::map, context)?;
        let map = JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::map(OrderedMap::new()),
        );

        // 3. If iterable is either undefined or null, return map.
        let iterable = match args.get_or_undefined(0) {
            val if !val.is_null_or_undefined() => val,
            _ => return Ok(map.into()),
        };

        // 4. Let adder be ? Get(map, "set").
        let adder = map.get("set", context)?;

        // 5. Return ? AddEntriesFromIterable(map, iterable, adder).
        add_entries_from_iterable(&map, iterable, &adder, context)
    }
}

impl BuiltIn for Map {
    const PRIORITY: u32 = 100;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Map", Type::named("MapConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

/// Canonicalizes `-0` keys to `+0` before insertion.
fn canonicalize_key(key: &JsValue) -> JsValue {
    match key.as_number() {
        Some(n) if n == 0.0 => JsValue::Integer(0),
        _ => key.clone(),
    }
}

impl Map {
    /// `get Map [ @@species ]`
    #[allow(clippy::unnecessary_wraps)]
    fn get_species(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(this.clone())
    }

    /// `Map.groupBy ( items, callbackfn )`
    ///
    /// Groups the values of `items` into arrays keyed by the callback's
    /// return value, with `SameValueZero` key coalescing.
    fn group_by(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let callback = args.get_or_undefined(1).as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Map.groupBy: callback is not callable")
        })?;

        let map = JsObject::from_proto_and_data(
            Some(context.intrinsics().constructors().map().prototype()),
            ObjectData::map(OrderedMap::new()),
        );

        let mut iterator = args.get_or_undefined(0).get_iterator(context)?;
        let mut k: u64 = 0;
        while !iterator.step(context)? {
            let value = iterator.value(context)?;
            let key = callback.call(
                &JsValue::undefined(),
                &[value.clone(), JsValue::from(k)],
                context,
            );
            let key = if_abrupt_close_iterator!(key, iterator, context);
            let key = canonicalize_key(&key);

            let group = {
                let borrowed = map.borrow();
                let entries = borrowed.as_map().expect("just created a map");
                entries.get(&key).cloned()
            };
            match group {
                Some(JsValue::Object(group)) => {
                    let len = group.get("length", context)?.to_length(context)?;
                    group.create_data_property_or_throw(len, value, context)?;
                }
                _ => {
                    let group = crate::builtins::Array::create_array_from_list([value], context);
                    map.borrow_mut()
                        .as_map_mut()
                        .expect("just created a map")
                        .insert(key, group.into());
                }
            }
            k += 1;
        }
        Ok(map.into())
    }

    /// `Map.prototype.entries ( )`
    pub(crate) fn entries(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        MapIterator::create_map_iterator(this, PropertyNameKind::KeyAndValue, context)
    }

    /// `Map.prototype.keys ( )`
    pub(crate) fn keys(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        MapIterator::create_map_iterator(this, PropertyNameKind::Key, context)
    }

    /// `Map.prototype.values ( )`
    pub(crate) fn values(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        MapIterator::create_map_iterator(this, PropertyNameKind::Value, context)
    }

    /// `Map.prototype.set ( key, value )`
    ///
    /// Returns the map, for chaining.
    pub(crate) fn set(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let key = canonicalize_key(args.get_or_undefined(0));
        let value = args.get_or_undefined(1);

        if let Some(object) = this.as_object() {
            if let Some(map) = object.borrow_mut().as_map_mut() {
                map.insert(key, value.clone());
                return Ok(this.clone());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Map")
            .into())
    }

    /// `get Map.prototype.size`
    pub(crate) fn get_size(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        if let Some(object) = this.as_object() {
            if let Some(map) = object.borrow().as_map() {
                return Ok(map.len().into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Map")
            .into())
    }

    /// `Map.prototype.delete ( key )`
    pub(crate) fn delete(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let key = canonicalize_key(args.get_or_undefined(0));
        if let Some(object) = this.as_object() {
            if let Some(map) = object.borrow_mut().as_map_mut() {
                return Ok(map.remove(&key).is_some().into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Map")
            .into())
    }

    /// `Map.prototype.get ( key )`
    pub(crate) fn get(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let key = canonicalize_key(args.get_or_undefined(0));
        if let Some(object) = this.as_object() {
            if let Some(map) = object.borrow().as_map() {
                return Ok(map.get(&key).cloned().unwrap_or_default());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Map")
            .into())
    }

    /// `Map.prototype.clear ( )`
    pub(crate) fn clear(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        if let Some(object) = this.as_object() {
            if let Some(map) = object.borrow_mut().as_map_mut() {
                map.clear();
                return Ok(JsValue::undefined());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Map")
            .into())
    }

    /// `Map.prototype.has ( key )`
    pub(crate) fn has(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let key = canonicalize_key(args.get_or_undefined(0));
        if let Some(object) = this.as_object() {
            if let Some(map) = object.borrow().as_map() {
                return Ok(map.contains_key(&key).into());
            }
        }
        Err(JsNativeError::typ()
            .with_message("'this' is not a Map")
            .into())
    }

    /// `Map.prototype.forEach ( callbackfn [ , thisArg ] )`
    ///
    /// Entries are visited once each; entries added during the walk are
    /// visited, entries deleted before being visited are not.
    pub(crate) fn for_each(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let map = this
            .as_object()
            .filter(|obj| obj.borrow().is_map())
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a Map"))?;

        let callback = args.get_or_undefined(0);
        let callback = callback.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message(format!("{} is not a function", callback.display()))
        })?;

        let this_arg = args.get_or_undefined(1);

        let _lock = map
            .borrow_mut()
            .as_map_mut()
            .expect("checked that `this` was a map")
            .lock(map.clone());

        let mut index = 0;
        loop {
            let arguments = {
                let borrowed = map.borrow();
                let entries = borrowed.as_map().expect("checked that `this` was a map");
                if index < entries.full_len() {
                    entries
                        .get_index(index)
                        .map(|(k, v)| [v.clone(), k.clone(), this.clone()])
                } else {
                    return Ok(JsValue::undefined());
                }
            };

            if let Some(arguments) = arguments {
                callback.call(this_arg, &arguments, context)?;
            }

            index += 1;
        }
    }
}

/// `AddEntriesFromIterable ( target, iterable, adder )`
pub(crate) fn add_entries_from_iterable(
    target: &JsObject,
    iterable: &JsValue,
    adder: &JsValue,
    context: &mut Context,
) -> JsResult<JsValue> {
    let adder = adder.as_callable().cloned().ok_or_else(|| {
        JsNativeError::typ().with_message("property `set` of `NewTarget` is not callable")
    })?;

    let mut iterator_record: IteratorRecord = iterable.get_iterator(context)?;

    loop {
        if iterator_record.step(context)? {
            return Ok(target.clone().into());
        }

        let next_item = iterator_record.value(context)?;

        let Some(next_item) = next_item.as_object().cloned() else {
            let err = Err(JsNativeError::typ()
                .with_message("cannot get key and value from primitive item of `iterable`")
                .into());
            return iterator_record.close(err, context);
        };

        let key = match next_item.get(0u32, context) {
            Ok(val) => val,
            err => return iterator_record.close(err, context),
        };

        let value = match next_item.get(1u32, context) {
            Ok(val) => val,
            err => return iterator_record.close(err, context),
        };

        let status = adder.call(&target.clone().into(), &[key, value], context);
        if status.is_err() {
            return iterator_record.close(status, context);
        }
    }
}
