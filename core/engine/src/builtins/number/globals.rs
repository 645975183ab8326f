//! The numeric global functions: `isFinite`, `isNaN`, `parseInt` and
//! `parseFloat`.

use crate::{
    builtins::{global_binding, BuiltInBuilder, BuiltInObject, IntrinsicObject},
    context::intrinsics::Intrinsics,
    object::JsObject,
    realm::Realm,
    string::is_trimmable_whitespace,
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// `isFinite ( number )`
fn is_finite(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if let Some(value) = args.get(0) {
        let number = value.to_number(context)?;
        Ok(number.is_finite().into())
    } else {
        Ok(false.into())
    }
}

pub(crate) struct IsFinite;

impl IntrinsicObject for IsFinite {
    fn init(realm: &Realm) {
        BuiltInBuilder::callable_with_intrinsic::<Self>(realm, is_finite)
            .name(Self::NAME)
            .length(1)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().is_finite()
    }
}

impl BuiltInObject for IsFinite {
    const NAME: &'static str = "isFinite";
}

/// `isNaN ( number )`
fn is_nan(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    if let Some(value) = args.get(0) {
        let number = value.to_number(context)?;
        Ok(number.is_nan().into())
    } else {
        Ok(true.into())
    }
}

pub(crate) struct IsNaN;

impl IntrinsicObject for IsNaN {
    fn init(realm: &Realm) {
        BuiltInBuilder::callable_with_intrinsic::<Self>(realm, is_nan)
            .name(Self::NAME)
            .length(1)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().is_nan()
    }
}

impl BuiltInObject for IsNaN {
    const NAME: &'static str = "isNaN";
}

/// `parseInt ( string, radix )`
pub(crate) fn parse_int(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let (Some(string), radix) = (args.get(0), args.get_or_undefined(1)) else {
        // Not enough arguments to parseInt.
        return Ok(JsValue::nan());
    };

    let input_string = string.to_string(context)?;
    let mut input = input_string.trim_matches(is_trimmable_whitespace);

    let mut sign = 1i64;
    if let Some(rest) = input.strip_prefix('-') {
        sign = -1;
        input = rest;
    } else if let Some(rest) = input.strip_prefix('+') {
        input = rest;
    }

    let mut radix = radix.to_i32(context)?;
    let mut strip_prefix = true;
    if radix != 0 {
        if !(2..=36).contains(&radix) {
            return Ok(JsValue::nan());
        }
        strip_prefix = radix == 16;
    } else {
        radix = 10;
    }

    if strip_prefix
        && (input.starts_with("0x") || input.starts_with("0X"))
        && input.len() > 2
    {
        input = &input[2..];
        radix = 16;
    }

    // Parse the longest valid digit prefix.
    let end = input
        .find(|c: char| !c.is_digit(radix as u32))
        .unwrap_or(input.len());
    let digits = &input[..end];
    if digits.is_empty() {
        return Ok(JsValue::nan());
    }

    let mut result = 0f64;
    for c in digits.chars() {
        let digit = c.to_digit(radix as u32).expect("checked digit above");
        result = result * f64::from(radix) + f64::from(digit);
    }

    Ok(JsValue::from(sign as f64 * result))
}

pub(crate) struct ParseInt;

impl IntrinsicObject for ParseInt {
    fn init(realm: &Realm) {
        BuiltInBuilder::callable_with_intrinsic::<Self>(realm, parse_int)
            .name(Self::NAME)
            .length(2)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().parse_int()
    }
}

impl BuiltInObject for ParseInt {
    const NAME: &'static str = "parseInt";
}

/// `parseFloat ( string )`
pub(crate) fn parse_float(
    _: &JsValue,
    args: &[JsValue],
    context: &mut Context,
) -> JsResult<JsValue> {
    let Some(string) = args.get(0) else {
        // Not enough arguments to parseFloat.
        return Ok(JsValue::nan());
    };

    let input_string = string.to_string(context)?;
    let input = input_string.trim_matches(is_trimmable_whitespace);

    if input.starts_with("Infinity") || input.starts_with("+Infinity") {
        return Ok(JsValue::from(f64::INFINITY));
    }
    if input.starts_with("-Infinity") {
        return Ok(JsValue::from(f64::NEG_INFINITY));
    }

    // The longest numeric prefix parses; everything after it is ignored.
    match fast_float::parse_partial::<f64, _>(input) {
        Ok((value, consumed)) if consumed > 0 => Ok(JsValue::from(value)),
        _ => Ok(JsValue::nan()),
    }
}

pub(crate) struct ParseFloat;

impl IntrinsicObject for ParseFloat {
    fn init(realm: &Realm) {
        BuiltInBuilder::callable_with_intrinsic::<Self>(realm, parse_float)
            .name(Self::NAME)
            .length(1)
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().parse_float()
    }
}

impl BuiltInObject for ParseFloat {
    const NAME: &'static str = "parseFloat";
}

/// Initializes and binds the four numeric globals.
pub(crate) fn init(realm: &Realm) {
    IsFinite::init(realm);
    IsNaN::init(realm);
    ParseInt::init(realm);
    ParseFloat::init(realm);
    global_binding::<IsFinite>(realm);
    global_binding::<IsNaN>(realm);
    global_binding::<ParseInt>(realm);
    global_binding::<ParseFloat>(realm);
}
