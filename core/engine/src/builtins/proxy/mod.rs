//! The global `Proxy` object.
//!
//! Every fundamental operation on a proxy consults the corresponding
//! handler trap (see the internal methods of
//! [`JsObject`][crate::object::JsObject]) and falls through to the target
//! when the trap is absent. A revoked proxy raises `TypeError` on every
//! operation.

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    native_function::NativeFunction,
    object::{FunctionObjectBuilder, JsObject, ObjectData},
    realm::Realm,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The internal representation of a proxy: target and handler, or nothing
/// once revoked.
#[derive(Debug, Clone)]
pub struct Proxy {
    data: Option<(JsObject, JsObject)>,
}

impl Proxy {
    fn new(target: JsObject, handler: JsObject) -> Self {
        Self {
            data: Some((target, handler)),
        }
    }

    /// The target/handler pair, if the proxy has not been revoked.
    #[must_use]
    pub(crate) fn data(&self) -> Option<(JsObject, JsObject)> {
        self.data.clone()
    }

    /// The target/handler pair, raising `TypeError` on a revoked proxy.
    pub(crate) fn try_data(&self) -> JsResult<(JsObject, JsObject)> {
        self.data.clone().ok_or_else(|| {
            JsNativeError::typ()
                .with_message("proxy was revoked")
                .into()
        })
    }

    fn revoke(&mut self) {
        self.data = None;
    }
}

impl IntrinsicObject for Proxy {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::revocable, "revocable", 2)
            .no_prototype_property()
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Proxy {
    const NAME: &'static str = "Proxy";
}

impl BuiltInConstructor for Proxy {
    const LENGTH: usize = 2;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::proxy;

    /// `Proxy ( target, handler )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("Proxy constructor called without `new`")
                .into());
        }
        // 2. Return ? ProxyCreate(target, handler).
        Ok(Self::create(args, context)?.into())
    }
}

impl BuiltIn for Proxy {
    const PRIORITY: u32 = 200;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Proxy", Type::named("ProxyConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Proxy {
    /// `ProxyCreate ( target, handler )`
    fn create(args: &[JsValue], _context: &mut Context) -> JsResult<JsObject> {
        // 1. If Type(target) is not Object, throw a TypeError exception.
        let target = args.get_or_undefined(0).as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Proxy constructor called with non-object target")
        })?;

        // 2. If Type(handler) is not Object, throw a TypeError exception.
        let handler = args.get_or_undefined(1).as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Proxy constructor called with non-object handler")
        })?;

        // The proxy has no prototype of its own; every lookup routes to the
        // traps or the target.
        Ok(JsObject::from_proto_and_data(
            None,
            ObjectData::Proxy(Self::new(target, handler)),
        ))
    }

    /// `Proxy.revocable ( target, handler )`
    fn revocable(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        // 1. Let p be ? ProxyCreate(target, handler).
        let proxy = Self::create(args, context)?;

        // 2-4. The revoker idempotently clears the proxy's data.
        let revoker = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, _args, proxy: &JsObject, _context| {
                    if let Some(proxy_data) = proxy.borrow_mut().as_proxy_mut() {
                        proxy_data.revoke();
                    }
                    Ok(JsValue::undefined())
                },
                proxy.clone(),
            ),
        )
        .name("")
        .length(0)
        .build();

        // 5-8. Return { proxy, revoke }.
        let result = JsObject::with_object_proto(context.intrinsics());
        result.create_data_property_or_throw("proxy", proxy, context)?;
        result.create_data_property_or_throw("revoke", revoker, context)?;
        Ok(result.into())
    }
}
