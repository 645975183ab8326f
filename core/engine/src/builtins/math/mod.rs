//! The `Math` namespace object: constants and stateless functions.

#[cfg(test)]
mod tests;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInObject, IntrinsicObject},
    context::intrinsics::Intrinsics,
    object::JsObject,
    property::Attribute,
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The `Math` namespace builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Math;

impl IntrinsicObject for Math {
    fn init(realm: &Realm) {
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .static_property("E", std::f64::consts::E, attribute)
            .static_property("LN10", std::f64::consts::LN_10, attribute)
            .static_property("LN2", std::f64::consts::LN_2, attribute)
            .static_property("LOG10E", std::f64::consts::LOG10_E, attribute)
            .static_property("LOG2E", std::f64::consts::LOG2_E, attribute)
            .static_property("PI", std::f64::consts::PI, attribute)
            .static_property("SQRT1_2", std::f64::consts::FRAC_1_SQRT_2, attribute)
            .static_property("SQRT2", std::f64::consts::SQRT_2, attribute)
            .static_method(Self::abs, "abs", 1)
            .static_method(Self::acos, "acos", 1)
            .static_method(Self::asin, "asin", 1)
            .static_method(Self::atan, "atan", 1)
            .static_method(Self::atan2, "atan2", 2)
            .static_method(Self::cbrt, "cbrt", 1)
            .static_method(Self::ceil, "ceil", 1)
            .static_method(Self::cos, "cos", 1)
            .static_method(Self::cosh, "cosh", 1)
            .static_method(Self::exp, "exp", 1)
            .static_method(Self::floor, "floor", 1)
            .static_method(Self::hypot, "hypot", 2)
            .static_method(Self::log, "log", 1)
            .static_method(Self::log10, "log10", 1)
            .static_method(Self::log2, "log2", 1)
            .static_method(Self::max, "max", 2)
            .static_method(Self::min, "min", 2)
            .static_method(Self::pow, "pow", 2)
            .static_method(Self::random, "random", 0)
            .static_method(Self::round, "round", 1)
            .static_method(Self::sign, "sign", 1)
            .static_method(Self::sin, "sin", 1)
            .static_method(Self::sinh, "sinh", 1)
            .static_method(Self::sqrt, "sqrt", 1)
            .static_method(Self::tan, "tan", 1)
            .static_method(Self::tanh, "tanh", 1)
            .static_method(Self::trunc, "trunc", 1)
            .static_property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().math()
    }
}

impl BuiltInObject for Math {
    const NAME: &'static str = "Math";
}

impl BuiltIn for Math {
    const PRIORITY: u32 = 160;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Math", Type::named("Math"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

macro_rules! unary_math {
    ($( $(#[$attr:meta])* $name:ident => $op:expr );* $(;)?) => {
        $(
            $(#[$attr])*
            fn $name(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
                let x = args.get_or_undefined(0).to_number(context)?;
                #[allow(clippy::redundant_closure_call)]
                Ok(JsValue::from(($op)(x)))
            }
        )*
    };
}

impl Math {
    unary_math! {
        /// `Math.abs ( x )`
        abs => f64::abs;
        /// `Math.acos ( x )`
        acos => f64::acos;
        /// `Math.asin ( x )`
        asin => f64::asin;
        /// `Math.atan ( x )`
        atan => f64::atan;
        /// `Math.cbrt ( x )`
        cbrt => f64::cbrt;
        /// `Math.ceil ( x )`
        ceil => f64::ceil;
        /// `Math.cos ( x )`
        cos => f64::cos;
        /// `Math.cosh ( x )`
        cosh => f64::cosh;
        /// `Math.exp ( x )`
        exp => f64::exp;
        /// `Math.floor ( x )`
        floor => f64::floor;
        /// `Math.log ( x )`
        log => f64::ln;
        /// `Math.log10 ( x )`
        log10 => f64::log10;
        /// `Math.log2 ( x )`
        log2 => f64::log2;
        /// `Math.sin ( x )`
        sin => f64::sin;
        /// `Math.sinh ( x )`
        sinh => f64::sinh;
        /// `Math.sqrt ( x )`
        sqrt => f64::sqrt;
        /// `Math.tan ( x )`
        tan => f64::tan;
        /// `Math.tanh ( x )`
        tanh => f64::tanh;
        /// `Math.trunc ( x )`
        trunc => f64::trunc;
        /// `Math.sign ( x )`
        sign => |x: f64| if x == 0.0 || x.is_nan() { x } else { x.signum() };
        /// `Math.round ( x )`
        ///
        /// Halfway values round towards positive infinity.
        round => |x: f64| if x.fract().abs() == 0.5 { (x + 0.5).floor() } else { x.round() };
    }

    /// `Math.atan2 ( y, x )`
    fn atan2(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let y = args.get_or_undefined(0).to_number(context)?;
        let x = args.get_or_undefined(1).to_number(context)?;
        Ok(y.atan2(x).into())
    }

    /// `Math.hypot ( ...args )`
    fn hypot(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut sum = 0f64;
        for arg in args {
            let x = arg.to_number(context)?;
            sum += x * x;
        }
        Ok(sum.sqrt().into())
    }

    /// Coerces every argument before any is inspected, so a NaN does not
    /// short-circuit a later side-effecting or throwing coercion.
    fn coerced_args(args: &[JsValue], context: &mut Context) -> JsResult<Vec<f64>> {
        let mut coerced = Vec::with_capacity(args.len());
        for arg in args {
            coerced.push(arg.to_number(context)?);
        }
        Ok(coerced)
    }

    /// `Math.max ( ...args )`
    fn max(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let coerced = Self::coerced_args(args, context)?;
        let mut highest = f64::NEG_INFINITY;
        for number in coerced {
            if number.is_nan() {
                return Ok(JsValue::nan());
            }
            // +0 beats -0.
            if number > highest || (number == 0.0 && highest == 0.0 && number.is_sign_positive()) {
                highest = number;
            }
        }
        Ok(highest.into())
    }

    /// `Math.min ( ...args )`
    fn min(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let coerced = Self::coerced_args(args, context)?;
        let mut lowest = f64::INFINITY;
        for number in coerced {
            if number.is_nan() {
                return Ok(JsValue::nan());
            }
            // -0 beats +0.
            if number < lowest || (number == 0.0 && lowest == 0.0 && number.is_sign_negative()) {
                lowest = number;
            }
        }
        Ok(lowest.into())
    }

    /// `Math.pow ( base, exponent )`
    fn pow(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let base = args.get_or_undefined(0).to_number(context)?;
        let exponent = args.get_or_undefined(1).to_number(context)?;
        Ok(base.powf(exponent).into())
    }

    /// `Math.random ( )`
    ///
    /// Uses the process-wide PRNG.
    #[allow(clippy::unnecessary_wraps)]
    fn random(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(rand::random::<f64>().into())
    }
}
