//! The global `WeakSet` object.

use crate::{
    builtins::{
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

/// The internal representation of a `WeakSet`: an identity-keyed side table
/// of weak entries, pruned opportunistically.
#[derive(Debug, Default)]
pub struct WeakSet {
    entries: FxHashMap<usize, WeakSlot>,
}

impl WeakSet {
    fn prune(&mut self) {
        self.entries.retain(|_, slot| slot.upgrade().is_some());
    }
}

impl IntrinsicObject for WeakSet {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .method(Self::add, "add", 1)
            .method(Self::delete, "delete", 1)
            .method(Self::has, "has", 1)
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

impl BuiltInObject for WeakSet {
    const NAME: &'static str = "WeakSet";
}

impl BuiltInConstructor for WeakSet {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::weak_set;

    /// `WeakSet ( [ iterable ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("WeakSet constructor called without `new`")
                .into());
        }

        // 2-3. Create the empty weak set.
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::weak_set, context)?;
        let set = JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::WeakSet(Self::default()),
        );

        // 4-6. Populate from the iterable through `add`.
        let iterable = args.get_or_undefined(0);
        if iterable.is_null_or_undefined() {
            return Ok(set.into());
        }
        let adder = set.get("add", context)?;
        let adder = adder.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("property `add` of `NewTarget` is not callable")
        })?;

        let mut iterator_record = iterable.get_iterator(context)?;
        loop {
            if iterator_record.step(context)? {
                return Ok(set.into());
            }
            let next = iterator_record.value(context)?;
            let status = adder.call(&set.clone().into(), &[next], context);
            if status.is_err() {
                return iterator_record.close(status, context);
            }
        }
    }
}

impl BuiltIn for WeakSet {
    const PRIORITY: u32 = 130;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("WeakSet", Type::named("WeakSetConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

fn this_weak_set(this: &JsValue) -> JsResult<JsObject> {
    this.as_object()
        .filter(|obj| obj.borrow().is_weak_set())
        .cloned()
        .ok_or_else(|| {
            JsNativeError::typ()
                .with_message("`this` is not a WeakSet")
                .into()
        })
}

impl WeakSet {
    /// `WeakSet.prototype.add ( value )`
    fn add(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_set(this)?;
        let value = args.get_or_undefined(0);
        let slot = WeakSlot::downgrade(value).ok_or_else(|| weak_target_error("WeakSet.add"))?;
        let identity = WeakSlot::identity(value).expect("downgrade succeeded");

        let mut borrowed = obj.borrow_mut();
        let set = borrowed.as_weak_set_mut().expect("checked above");
        set.prune();
        set.entries.insert(identity, slot);
        drop(borrowed);
        Ok(this.clone())
    }

    /// `WeakSet.prototype.has ( value )`
    fn has(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_set(this)?;
        let Some(identity) = WeakSlot::identity(args.get_or_undefined(0)) else {
            return Ok(false.into());
        };
        let mut borrowed = obj.borrow_mut();
        let set = borrowed.as_weak_set_mut().expect("checked above");
        set.prune();
        Ok(set.entries.contains_key(&identity).into())
    }

    /// `WeakSet.prototype.delete ( value )`
    fn delete(this: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this_weak_set(this)?;
        let Some(identity) = WeakSlot::identity(args.get_or_undefined(0)) else {
            return Ok(false.into());
        };
        let mut borrowed = obj.borrow_mut();
        let set = borrowed.as_weak_set_mut().expect("checked above");
        set.prune();
        Ok(set.entries.remove(&identity).is_some().into())
    }
}
