//! The `RangeError` native error type: a value is outside its allowed
//! range.

use super::{error_constructor_type, finish_error_construction, ErrorKind};
use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    types::TypeContext,
    value::JsValue,
    Context, JsResult,
};

/// The `RangeError` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RangeError;

impl IntrinsicObject for RangeError {
    fn init(realm: &Realm) {
        let attribute = Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            // The native error constructors have `%Error%` as their own
            // prototype.
            .prototype(realm.intrinsics().constructors().error().constructor())
            .inherits(Some(realm.intrinsics().constructors().error().prototype()))
            .property("name", Self::NAME, attribute)
            .property("message", js_string!(), attribute)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for RangeError {
    const NAME: &'static str = "RangeError";
}

impl BuiltInConstructor for RangeError {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::range_error;

    /// `RangeError ( message [ , options ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let new_target = &if new_target.is_undefined() {
            context
                .intrinsics()
                .constructors()
                .range_error()
                .constructor()
                .into()
        } else {
            new_target.clone()
        };

        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::range_error, context)?;
        let o = JsObject::from_proto_and_data(Some(prototype), ObjectData::error(ErrorKind::Range));

        finish_error_construction(&o, args, context)?;
        Ok(o.into())
    }
}

impl BuiltIn for RangeError {
    const PRIORITY: u32 = 151;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("RangeError", error_constructor_type("RangeError"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::super::global_binding::<Self>(realm);
    }
}
