//! The `Paserati` namespace object and the compile-time-only type surface.
//!
//! `Paserati.reflect<T>()` is a compiler intrinsic: the checker lowers it to
//! a literal type descriptor, so the runtime implementation is a stub that
//! should never be reached. The utility types (`Partial`, `Pick`, ...) are
//! registered here as parameterized aliases with no runtime representation.

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInObject, IntrinsicObject},
    context::intrinsics::Intrinsics,
    error::JsNativeError,
    object::JsObject,
    property::Attribute,
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeAlias, TypeContext, UtilityKind},
    value::JsValue,
    Context, JsResult,
};

/// The `Paserati` namespace builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Paserati;

impl IntrinsicObject for Paserati {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .static_method(Self::reflect, "reflect", 0)
            .static_property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().paserati()
    }
}

impl BuiltInObject for Paserati {
    const NAME: &'static str = "Paserati";
}

impl BuiltIn for Paserati {
    const PRIORITY: u32 = 260;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Paserati", Type::named("Paserati"));

        let unary = |kind| TypeAlias {
            params: vec!["T".into()],
            body: Type::Utility {
                kind,
                args: vec![Type::param("T")],
            },
        };
        let binary = |kind| TypeAlias {
            params: vec!["T".into(), "K".into()],
            body: Type::Utility {
                kind,
                args: vec![Type::param("T"), Type::param("K")],
            },
        };

        types.define_type_alias("Partial", unary(UtilityKind::Partial));
        types.define_type_alias("Required", unary(UtilityKind::Required));
        types.define_type_alias("Readonly", unary(UtilityKind::Readonly));
        types.define_type_alias("Pick", binary(UtilityKind::Pick));
        types.define_type_alias("Omit", binary(UtilityKind::Omit));
        types.define_type_alias("Record", binary(UtilityKind::Record));
        types.define_type_alias("ReturnType", unary(UtilityKind::ReturnType));
        types.define_type_alias("Parameters", unary(UtilityKind::Parameters));
        types.define_type_alias(
            "ConstructorParameters",
            unary(UtilityKind::ConstructorParameters),
        );
        types.define_type_alias("InstanceType", unary(UtilityKind::InstanceType));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Paserati {
    /// `Paserati.reflect<T> ( )`
    ///
    /// The checker replaces every call site with a literal descriptor; a
    /// runtime call means the intrinsic was not lowered.
    fn reflect(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Err(JsNativeError::typ()
            .with_message("Paserati.reflect must be resolved at compile time")
            .into())
    }
}
