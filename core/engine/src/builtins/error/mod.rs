//! The global `Error` object and the native error hierarchy.
//!
//! All error objects share a layout: a prototype carrying `name`, a default
//! empty `message` and `toString`; constructors install `message`, `cause`
//! and a captured `stack`, and mark the instance with `[[ErrorData]]`.

pub(crate) mod range;
pub(crate) mod reference;
pub(crate) mod syntax;
pub(crate) mod r#type;

pub(crate) use self::r#type::TypeError;
pub(crate) use range::RangeError;
pub(crate) use reference::ReferenceError;
pub(crate) use syntax::SyntaxError;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The kind of an error object; its presence on the object's data is the
/// `[[ErrorData]]` marker distinguishing real errors from arbitrary
/// `{name, message}` objects.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ErrorKind {
    /// A plain `Error`.
    Error,
    /// A `RangeError`.
    Range,
    /// A `ReferenceError`.
    Reference,
    /// A `SyntaxError`.
    Syntax,
    /// A `TypeError`.
    Type,
}

/// The global `Error` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Error;

impl IntrinsicObject for Error {
    fn init(realm: &Realm) {
        let attribute = Attribute::WRITABLE | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE;
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .property("name", Self::NAME, attribute)
            .property("message", js_string!(), attribute)
            .method(Self::to_string, "toString", 0)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Error {
    const NAME: &'static str = "Error";
}

impl BuiltInConstructor for Error {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::error;

    /// `Error ( message [ , options ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, let newTarget be the Error constructor.
        let new_target = &if new_target.is_undefined() {
            context
                .intrinsics()
                .constructors()
                .error()
                .constructor()
                .into()
        } else {
            new_target.clone()
        };

        // 2. Let O be ? OrdinaryCreateFromConstructor(newTarget, "%Error.prototype%", « [[ErrorData]] »).
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::error, context)?;
        let o = JsObject::from_proto_and_data(Some(prototype), ObjectData::error(ErrorKind::Error));

        finish_error_construction(&o, args, context)?;
        Ok(o.into())
    }
}

impl BuiltIn for Error {
    const PRIORITY: u32 = 150;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Error", error_constructor_type("Error"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

/// The declared type of a native error constructor.
pub(crate) fn error_constructor_type(name: &str) -> Type {
    Type::Constructor(crate::types::FunctionSignature {
        params: vec![Type::String, Type::Object],
        rest: None,
        returns: Box::new(Type::named(name)),
    })
}

/// Installs `message`, `cause` and `stack` on a freshly constructed error.
pub(crate) fn finish_error_construction(
    o: &JsObject,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<()> {
    // 3. If message is not undefined, install it as a non-enumerable data
    // property.
    let message = args.get_or_undefined(0);
    if !message.is_undefined() {
        let msg = message.to_string(context)?;
        o.create_non_enumerable_data_property_or_throw("message", msg, context)?;
    }

    // 4. Perform ? InstallErrorCause(O, options).
    Error::install_error_cause(o, args.get_or_undefined(1), context)?;

    let stack = context.host_hooks().capture_stack_trace();
    o.create_non_enumerable_data_property_or_throw(
        "stack",
        js_string!(stack.join("\n")),
        context,
    )?;
    Ok(())
}

impl Error {
    /// `InstallErrorCause ( O, options )`
    pub(crate) fn install_error_cause(
        o: &JsObject,
        options: &JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        // 1. If Type(options) is Object and ? HasProperty(options, "cause") is true, then
        if let Some(options) = options.as_object() {
            if options.has_property("cause", context)? {
                // a. Let cause be ? Get(options, "cause").
                let cause = options.get("cause", context)?;
                // b. Perform CreateNonEnumerableDataPropertyOrThrow(O, "cause", cause).
                o.create_non_enumerable_data_property_or_throw("cause", cause, context)?;
            }
        }
        Ok(())
    }

    /// `Error.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    pub(crate) fn to_string(
        this: &JsValue,
        _: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1-2. The receiver must be an object.
        let o = this
            .as_object()
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("'this' is not an Object"))?;

        // 3-4. Read `name`, defaulting to "Error".
        let name = o.get("name", context)?;
        let name = if name.is_undefined() {
            js_string!("Error")
        } else {
            name.to_string(context)?
        };

        // 5-6. Read `message`, defaulting to "".
        let msg = o.get("message", context)?;
        let msg = if msg.is_undefined() {
            js_string!()
        } else {
            msg.to_string(context)?
        };

        if name.is_empty() {
            return Ok(msg.into());
        }
        if msg.is_empty() {
            return Ok(name.into());
        }
        Ok(js_string!(&name, ": ", &msg).into())
    }
}
