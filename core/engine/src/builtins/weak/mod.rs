//! The global `WeakRef` object and the weak-target plumbing shared by the
//! weak collections.
//!
//! Weak entries hold a non-owning pointer to their target; once the last
//! strong referent is dropped, upgrading fails and the entry is treated as
//! gone. Values that can be held weakly are objects and non-registered
//! symbols.

use crate::{
    builtins::{
        symbol::is_registered_symbol, BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject,
        IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    object::{get_prototype_from_constructor, JsObject, ObjectData, WeakJsObject},
    property::Attribute,
    realm::Realm,
    symbol::{JsSymbol, WeakJsSymbol},
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// A non-owning handle to a weakly-holdable value.
#[derive(Debug, Clone)]
pub(crate) enum WeakSlot {
    /// A weak object reference.
    Object(WeakJsObject),
    /// A weak reference to a non-registered symbol.
    Symbol(WeakJsSymbol),
}

impl WeakSlot {
    /// `CanBeHeldWeakly ( v )`: downgrades `value`, or `None` for values
    /// that cannot be held weakly.
    pub(crate) fn downgrade(value: &JsValue) -> Option<Self> {
        match value {
            JsValue::Object(obj) => Some(Self::Object(obj.downgrade())),
            JsValue::Symbol(sym) if !is_registered_symbol(sym) => {
                Some(Self::Symbol(sym.downgrade()))
            }
            _ => None,
        }
    }

    /// Upgrades back to a strong value while the target is alive.
    pub(crate) fn upgrade(&self) -> Option<JsValue> {
        match self {
            Self::Object(weak) => weak.upgrade().map(JsValue::from),
            Self::Symbol(weak) => weak.upgrade().map(JsValue::from),
        }
    }

    /// The identity of the target, used as the key of weak side tables.
    pub(crate) fn identity(value: &JsValue) -> Option<usize> {
        match value {
            JsValue::Object(obj) => Some(obj.addr()),
            JsValue::Symbol(sym) if !is_registered_symbol(sym) => Some(sym.addr()),
            _ => None,
        }
    }
}

/// The `TypeError` raised when a value cannot be held weakly.
pub(crate) fn weak_target_error(method: &str) -> JsNativeError {
    JsNativeError::typ().with_message(format!(
        "{method}: value cannot be held weakly; only objects and non-registered symbols can"
    ))
}

/// The internal representation of a `WeakRef`.
#[derive(Debug)]
pub struct WeakRef {
    target: WeakSlot,
}

impl IntrinsicObject for WeakRef {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .method(Self::deref, "deref", 0)
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

impl BuiltInObject for WeakRef {
    const NAME: &'static str = "WeakRef";
}

impl BuiltInConstructor for WeakRef {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::weak_ref;

    /// `WeakRef ( target )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("WeakRef constructor called without `new`")
                .into());
        }

        // 2. If CanBeHeldWeakly(target) is false, throw a TypeError exception.
        let target = WeakSlot::downgrade(args.get_or_undefined(0))
            .ok_or_else(|| weak_target_error("WeakRef"))?;

        // 3-5. Create the reference.
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::weak_ref, context)?;
        Ok(JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::WeakRef(Self { target }),
        )
        .into())
    }
}

impl BuiltIn for WeakRef {
    const PRIORITY: u32 = 140;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("WeakRef", Type::named("WeakRefConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl WeakRef {
    /// `WeakRef.prototype.deref ( )`
    ///
    /// Returns the target while it is alive, else undefined.
    fn deref(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let obj = this
            .as_object()
            .filter(|obj| obj.borrow().is_weak_ref())
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a WeakRef"))?;
        let borrowed = obj.borrow();
        let weak_ref = borrowed.as_weak_ref().expect("checked above");
        Ok(weak_ref.target.upgrade().unwrap_or_default())
    }
}
