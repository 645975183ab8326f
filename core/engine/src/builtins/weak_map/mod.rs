//! The global `WeakMap` object.
//!
//! Entries live in a side table keyed by target identity; they vanish once
//! the key's last strong referent is dropped. Dead entries are pruned
//! opportunistically on every operation. There is no iteration, size or
//! `forEach` on weak collections.

use crate::{
    builtins::{
        map::add_entries_from_iterable,
        weak::{weak_target_error, WeakSlot},
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
use rustc_hash::FxHashMap;

/// The internal representation of a `WeakMap`.
#[derive(Debug, Default)]
pub struct WeakMap {
    entries: FxHashMap<usize, (WeakSlot, JsValue)>,
}

impl WeakMap {
    fn prune(&mut self) {
        self.entries.retain(|_, (slot, _)| slot.upgrade().is_some());
    }
}

impl IntrinsicObject for WeakMap {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .method(Self::delete, "delete", 1)
            .method(Self::get, "get", 1)
            .method(Self::has, "has", 1)
            .method(Self::set, "set", 2)
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

impl BuiltInObject for WeakMap {
    const NAME: &'static str = "WeakMap";
}

impl BuiltInConstructor for WeakMap {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::weak_map;

    /// `WeakMap ( [ iterable ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("WeakMap constructor called without `new`")
                .into());
        }

        // 2-3. Create the empty weak map.
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::weak_map, context)?;
        let map = JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::WeakMap(Self::default()),
        );

        // 4-6. Populate from the iterable through `set`.
        let iterable = args.get_or_undefined(0);
        if iterable.is_null_or_undefined() {
            return Ok(map.into());
        }
        let adder = map.get("set", context)?;
        add_entries_from_iterable(&map, iterable, &adder, context)
    }
}

impl BuiltIn for WeakMap {
    const PRIORITY: u32 = 120;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("WeakMap", Type::named("WeakMapConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

fn this_weak_map(this: &JsValue) -> JsResult<JsObject> {
    this.as_object()
        .filter(|obj| obj.borrow().is_weak_map())
        .cloned()
        .ok_or_else(|| {
            JsNativeError::typ()
                .with_message("`this` is not a WeakMap")
                .into()
        })
}

impl WeakMap {
    /// `WeakMap.prototype.set ( key, value )`
    fn set(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_map(this)?;
        let key = args.get_or_undefined(0);
        let slot = WeakSlot::downgrade(key).ok_or_else(|| weak_target_error("WeakMap.set"))?;
        let identity = WeakSlot::identity(key).expect("downgrade succeeded");

        let mut borrowed = obj.borrow_mut();
        let map = borrowed.as_weak_map_mut().expect("checked above");
        map.prune();
        map.entries
            .insert(identity, (slot, args.get_or_undefined(1).clone()));
        drop(borrowed);
        Ok(this.clone())
    }

    /// `WeakMap.prototype.get ( key )`
    fn get(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_map(this)?;
        let Some(identity) = WeakSlot::identity(args.get_or_undefined(0)) else {
            return Ok(JsValue::undefined());
        };
        let mut borrowed = obj.borrow_mut();
        let map = borrowed.as_weak_map_mut().expect("checked above");
        map.prune();
        Ok(map
            .entries
            .get(&identity)
            .map(|(_, value)| value.clone())
            .unwrap_or_default())
    }

    /// `WeakMap.prototype.has ( key )`
    fn has(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_map(this)?;
        let Some(identity) = WeakSlot::identity(args.get_or_undefined(0)) else {
            return Ok(false.into());
        };
        let mut borrowed = obj.borrow_mut();
        let map = borrowed.as_weak_map_mut().expect("checked above");
        map.prune();
        Ok(map.entries.contains_key(&identity).into())
    }

    /// `WeakMap.prototype.delete ( key )`
    fn delete(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_map(this)?;
        let Some(identity) = WeakSlot::identity(args.get_or_undefined(0)) else {
            return Ok(false.into());
        };
        let mut borrowed = obj.borrow_mut();
        let map = borrowed.as_weak_map_mut().expect("checked above");
        map.prune();
        Ok(map.entries.remove(&identity).is_some().into())
    }
}
