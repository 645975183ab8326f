//! `%WrapForValidIteratorPrototype%`: the thin adapter `Iterator.from`
//! places around iterators that do not inherit from `%IteratorPrototype%`.

use crate::{
    builtins::{
        iterable::create_iter_result_object, BuiltInBuilder, IntrinsicObject,
    },
    context::intrinsics::Intrinsics,
    error::JsNativeError,
    object::JsObject,
    realm::Realm,
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// `%WrapForValidIteratorPrototype%`
#[derive(Debug, Clone, Copy)]
pub(crate) struct WrapForValidIteratorPrototype;

impl IntrinsicObject for WrapForValidIteratorPrototype {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 0)
            .static_method(Self::r#return, "return", 0)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().iterator_prototypes().wrap_for_valid()
    }
}

impl WrapForValidIteratorPrototype {
    fn iterated(this: &JsValue) -> JsResult<(JsObject, JsValue)> {
        let obj = this.as_object().ok_or_else(|| {
            JsNativeError::typ().with_message("`this` is not a wrapped iterator")
        })?;
        let borrowed = obj.borrow();
        let record = borrowed.as_wrap_for_valid_iterator().ok_or_else(|| {
            JsNativeError::typ().with_message("`this` is not a wrapped iterator")
        })?;
        Ok((record.iterator().clone(), record.next_method_value()))
    }

    /// `%WrapForValidIteratorPrototype%.next ( )`
    pub(crate) fn next(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let (iterator, next_method) = Self::iterated(this)?;
        let step_args: &[JsValue] = if args.is_empty() {
            &[]
        } else {
            std::slice::from_ref(args.get_or_undefined(0))
        };
        next_method.call(&iterator.into(), step_args, context)
    }

    /// `%WrapForValidIteratorPrototype%.return ( )`
    pub(crate) fn r#return(
        this: &JsValue,
        _: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let (iterator, _) = Self::iterated(this)?;
        let Some(return_method) = iterator.get_method("return", context)? else {
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        };
        return_method.call(&iterator.into(), &[], context)
    }
}
