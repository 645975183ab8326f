//! The global `Boolean` object.

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    realm::Realm,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The global `Boolean` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Boolean;

impl IntrinsicObject for Boolean {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .method(Self::to_string, "toString", 0)
            .method(Self::value_of, "valueOf", 0)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Boolean {
    const NAME: &'static str = "Boolean";
}

impl BuiltInConstructor for Boolean {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::boolean;

    /// `Boolean ( value )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let data = args.get_or_undefined(0).to_boolean();

        // An ordinary call coerces; a construct call creates a wrapper.
        if new_target.is_undefined() {
            return Ok(data.into());
        }
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::boolean, context)?;
        Ok(JsObject::from_proto_and_data(Some(prototype), ObjectData::Boolean(data)).into())
    }
}

impl BuiltIn for Boolean {
    const PRIORITY: u32 = 50;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global(
            "Boolean",
            Type::Constructor(crate::types::FunctionSignature {
                params: vec![Type::Unknown],
                rest: None,
                returns: Box::new(Type::Boolean),
            }),
        );
        types.set_primitive_prototype(crate::types::Primitive::Boolean, Type::named("Boolean"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Boolean {
    fn this_boolean_value(value: &JsValue) -> JsResult<bool> {
        value
            .as_boolean()
            .or_else(|| value.as_object().and_then(|obj| obj.borrow().as_boolean()))
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("'this' is not a Boolean")
                    .into()
            })
    }

    /// `Boolean.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let boolean = Self::this_boolean_value(this)?;
        Ok(if boolean {
            js_string!("true").into()
        } else {
            js_string!("false").into()
        })
    }

    /// `Boolean.prototype.valueOf ( )`
    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(Self::this_boolean_value(this)?.into())
    }
}
