//! The global `Function` object and the function payloads.
//!
//! The engine only hosts *native* callables; compiled closures from the
//! bytecode VM reuse the same [`NativeFunction`] representation through a
//! closure that re-enters the interpreter. The dynamic
//! `Function("source")` form is rejected, since compilation lives outside
//! this subsystem.

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    native_function::NativeFunction,
    object::{JsObject, ObjectData},
    realm::Realm,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// Marks a callable as usable with `new`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorKind {
    /// An ordinary base constructor.
    Base,
}

/// The payload of a native callable, possibly a constructor.
#[derive(Debug)]
pub struct Function {
    function: NativeFunction,
    constructor: Option<ConstructorKind>,
}

impl Function {
    /// Creates a new function payload.
    #[must_use]
    pub fn new(function: NativeFunction, constructor: Option<ConstructorKind>) -> Self {
        Self {
            function,
            constructor,
        }
    }

    /// The native implementation.
    #[must_use]
    pub fn function(&self) -> &NativeFunction {
        &self.function
    }

    /// Checks if the function can be invoked with `new`.
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        self.constructor.is_some()
    }
}

/// The payload of a function produced by `Function.prototype.bind`.
#[derive(Debug)]
pub struct BoundFunction {
    target: JsObject,
    this: JsValue,
    args: Vec<JsValue>,
}

impl BoundFunction {
    /// The wrapped callable.
    #[must_use]
    pub fn target(&self) -> &JsObject {
        &self.target
    }

    /// The bound `this` value.
    #[must_use]
    pub fn this(&self) -> &JsValue {
        &self.this
    }

    /// The bound leading arguments.
    #[must_use]
    pub fn args(&self) -> &[JsValue] {
        &self.args
    }
}

/// `CreateListFromArrayLike ( obj )`
pub(crate) fn create_list_from_array_like(
    value: &JsValue,
    context: &mut Context,
) -> JsResult<Vec<JsValue>> {
    if value.is_null_or_undefined() {
        return Ok(Vec::new());
    }
    let obj = value.as_object().ok_or_else(|| {
        JsNativeError::typ().with_message("CreateListFromArrayLike called on non-object")
    })?;
    let len = obj.get("length", context)?.to_length(context)?;
    let mut list = Vec::with_capacity(len as usize);
    for i in 0..len {
        list.push(obj.get(i, context)?);
    }
    Ok(list)
}

/// The global `Function` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BuiltInFunctionObject;

impl IntrinsicObject for BuiltInFunctionObject {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .method(Self::apply, "apply", 2)
            .method(Self::bind, "bind", 1)
            .method(Self::call, "call", 1)
            .method(Self::to_string, "toString", 0)
            .build();

        // `%Function.prototype%` is itself callable: it accepts any
        // arguments and returns undefined.
        let prototype = realm.intrinsics().constructors().function().prototype();
        let mut prototype_obj = prototype.borrow_mut();
        prototype_obj.data = ObjectData::function(Function::new(
            NativeFunction::from_fn_ptr(|_, _, _| Ok(JsValue::undefined())),
            None,
        ));
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for BuiltInFunctionObject {
    const NAME: &'static str = "Function";
}

impl BuiltInConstructor for BuiltInFunctionObject {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::function;

    /// `Function ( ...parameterArgs, bodyArg )`
    ///
    /// Dynamic function compilation belongs to the compiler, which is not
    /// reachable from the runtime core.
    fn constructor(
        _new_target: &JsValue,
        _args: &[JsValue],
        _context: &mut Context,
    ) -> JsResult<JsValue> {
        Err(JsNativeError::typ()
            .with_message("dynamic function compilation is not supported by the runtime core")
            .into())
    }
}

impl BuiltIn for BuiltInFunctionObject {
    const PRIORITY: u32 = 20;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Function", Type::Constructor(crate::types::FunctionSignature {
            params: Vec::new(),
            rest: Some(Box::new(Type::String)),
            returns: Box::new(Type::named("Function")),
        }));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl BuiltInFunctionObject {
    /// `Function.prototype.apply ( thisArg, argArray )`
    fn apply(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let function = this.as_callable().ok_or_else(|| {
            JsNativeError::typ().with_message("Function.prototype.apply called on non-callable")
        })?;
        let this_arg = args.get_or_undefined(0);
        let arg_list = create_list_from_array_like(args.get_or_undefined(1), context)?;
        function.clone().call(this_arg, &arg_list, context)
    }

    /// `Function.prototype.call ( thisArg, ...args )`
    fn call(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let function = this.as_callable().ok_or_else(|| {
            JsNativeError::typ().with_message("Function.prototype.call called on non-callable")
        })?;
        let this_arg = args.get_or_undefined(0);
        let rest = args.get(1..).unwrap_or_default();
        function.clone().call(this_arg, rest, context)
    }

    /// `Function.prototype.bind ( thisArg, ...args )`
    fn bind(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = this.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Function.prototype.bind called on non-callable")
        })?;

        let this_arg = args.get_or_undefined(0).clone();
        let bound_args = args.get(1..).unwrap_or_default().to_vec();
        let bound_args_len = bound_args.len();

        let bound = JsObject::from_proto_and_data(
            target.prototype(),
            ObjectData::BoundFunction(BoundFunction {
                target: target.clone(),
                this: this_arg,
                args: bound_args,
            }),
        );

        // `length` is the target's length minus the bound arguments.
        let target_len = target
            .get("length", context)?
            .as_number()
            .map_or(0.0, |n| (n - bound_args_len as f64).max(0.0));
        bound.insert_property(
            "length",
            crate::property::PropertyDescriptor::builder()
                .value(target_len)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );

        let target_name = target.get("name", context)?;
        let target_name = target_name
            .as_string()
            .map_or_else(|| js_string!(), Clone::clone);
        bound.insert_property(
            "name",
            crate::property::PropertyDescriptor::builder()
                .value(js_string!("bound ", &target_name))
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );

        Ok(bound.into())
    }

    /// `Function.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let object = this.as_object().filter(|o| o.is_callable()).ok_or_else(|| {
            JsNativeError::typ().with_message("Function.prototype.toString called on non-callable")
        })?;
        let name = object.get("name", context)?;
        let name = name.as_string().map_or_else(|| js_string!(), Clone::clone);
        Ok(js_string!("function ", &name, "() { [native code] }").into())
    }
}
