//! The global `Number` object.

pub(crate) mod globals;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    string::JsString,
    types::{Type, TypeContext},
    value::{f64_to_js_string, IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};

/// The global `Number` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Number;

impl IntrinsicObject for Number {
    fn init(realm: &Realm) {
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_property("EPSILON", f64::EPSILON, attribute)
            .static_property("MAX_SAFE_INTEGER", Self::MAX_SAFE_INTEGER, attribute)
            .static_property("MIN_SAFE_INTEGER", Self::MIN_SAFE_INTEGER, attribute)
            .static_property("MAX_VALUE", f64::MAX, attribute)
            .static_property("MIN_VALUE", f64::MIN_POSITIVE, attribute)
            .static_property("NaN", f64::NAN, attribute)
            .static_property("NEGATIVE_INFINITY", f64::NEG_INFINITY, attribute)
            .static_property("POSITIVE_INFINITY", f64::INFINITY, attribute)
            .static_method(Self::number_is_finite, "isFinite", 1)
            .static_method(Self::number_is_integer, "isInteger", 1)
            .static_method(Self::number_is_nan, "isNaN", 1)
            .static_method(Self::number_is_safe_integer, "isSafeInteger", 1)
            .static_method(globals::parse_float, "parseFloat", 1)
            .static_method(globals::parse_int, "parseInt", 2)
            .method(Self::to_fixed, "toFixed", 1)
            .method(Self::to_string, "toString", 1)
            .method(Self::value_of, "valueOf", 0)
            .build();

        globals::init(realm);
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Number {
    const NAME: &'static str = "Number";
}

impl BuiltInConstructor for Number {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::number;

    /// `Number ( value )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let data = match args.get(0) {
            Some(value) => value.to_number(context)?,
            None => 0.0,
        };

        // An ordinary call coerces; a construct call creates a wrapper
        // carrying `[[NumberData]]`.
        if new_target.is_undefined() {
            return Ok(data.into());
        }
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::number, context)?;
        Ok(JsObject::from_proto_and_data(Some(prototype), ObjectData::Number(data)).into())
    }
}

impl BuiltIn for Number {
    const PRIORITY: u32 = 60;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global(
            "Number",
            Type::Constructor(crate::types::FunctionSignature {
                params: vec![Type::Unknown],
                rest: None,
                returns: Box::new(Type::Number),
            }),
        );
        types.set_primitive_prototype(crate::types::Primitive::Number, Type::named("Number"));
        types.define_global(
            "parseInt",
            Type::function(vec![Type::String, Type::Number], Type::Number),
        );
        types.define_global("parseFloat", Type::function(vec![Type::String], Type::Number));
        types.define_global("isNaN", Type::function(vec![Type::Number], Type::Boolean));
        types.define_global("isFinite", Type::function(vec![Type::Number], Type::Boolean));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Number {
    /// The largest integer exactly representable as an `f64`.
    pub(crate) const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991f64;

    /// The smallest integer exactly representable as an `f64`.
    pub(crate) const MIN_SAFE_INTEGER: f64 = -9_007_199_254_740_991f64;

    fn this_number_value(value: &JsValue) -> JsResult<f64> {
        value
            .as_number()
            .or_else(|| value.as_object().and_then(|obj| obj.borrow().as_number()))
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("'this' is not a Number")
                    .into()
            })
    }

    /// Renders a number the way the language does.
    pub(crate) fn to_js_string(value: f64) -> JsString {
        f64_to_js_string(value)
    }

    /// `Number.isFinite ( number )`
    fn number_is_finite(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(args
            .get_or_undefined(0)
            .as_number()
            .map_or(false, f64::is_finite)
            .into())
    }

    /// `Number.isInteger ( number )`
    fn number_is_integer(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(args
            .get_or_undefined(0)
            .as_number()
            .map_or(false, |n| n.is_finite() && n.trunc() == n)
            .into())
    }

    /// `Number.isNaN ( number )`
    fn number_is_nan(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(args
            .get_or_undefined(0)
            .as_number()
            .map_or(false, f64::is_nan)
            .into())
    }

    /// `Number.isSafeInteger ( number )`
    fn number_is_safe_integer(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(args
            .get_or_undefined(0)
            .as_number()
            .map_or(false, |n| {
                n.is_finite() && n.trunc() == n && n.abs() <= Self::MAX_SAFE_INTEGER
            })
            .into())
    }

    /// `Number.prototype.toFixed ( fractionDigits )`
    fn to_fixed(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let this_num = Self::this_number_value(this)?;
        let precision = match args.get_or_undefined(0).to_integer_or_infinity(context)? {
            IntegerOrInfinity::Integer(x) if (0..=100).contains(&x) => x as usize,
            _ => {
                return Err(JsNativeError::range()
                    .with_message("toFixed() digits argument must be between 0 and 100")
                    .into())
            }
        };
        if !this_num.is_finite() || this_num.abs() >= 1.0e21 {
            return Ok(Self::to_js_string(this_num).into());
        }
        Ok(JsString::from(format!("{this_num:.precision$}")).into())
    }

    /// `Number.prototype.toString ( [ radix ] )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = Self::this_number_value(this)?;

        let radix = args.get_or_undefined(0);
        let radix = if radix.is_undefined() {
            10
        } else {
            radix.to_integer_or_infinity(context)?.clamp_finite(0, 100)
        };
        if !(2..=36).contains(&radix) {
            return Err(JsNativeError::range()
                .with_message("radix must be an integer at least 2 and no greater than 36")
                .into());
        }

        if radix == 10 {
            return Ok(Self::to_js_string(value).into());
        }
        if !value.is_finite() {
            return Ok(Self::to_js_string(value).into());
        }

        // Non-decimal radixes only render the integer part exactly;
        // fractional digits are truncated, matching the common engine
        // shortcut for integral values.
        let negative = value.is_sign_negative();
        let mut integer = value.abs().trunc() as u64;
        let digits = b"0123456789abcdefghijklmnopqrstuvwxyz";
        let mut buffer = Vec::new();
        loop {
            buffer.push(digits[(integer % radix as u64) as usize]);
            integer /= radix as u64;
            if integer == 0 {
                break;
            }
        }
        if negative {
            buffer.push(b'-');
        }
        buffer.reverse();
        let rendered = std::string::String::from_utf8(buffer).expect("digits are ascii");
        Ok(JsString::from(rendered).into())
    }

    /// `Number.prototype.valueOf ( )`
    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(Self::this_number_value(this)?.into())
    }
}
