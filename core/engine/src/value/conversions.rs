//! Conversions between value types, following the abstract operations of the
//! language.

use super::{IntegerOrInfinity, JsValue, Numeric};
use crate::{
    error::JsNativeError,
    js_string,
    property::{PropertyDescriptor, PropertyKey},
    string::{is_trimmable_whitespace, JsString},
    symbol::JsSymbol,
    Context, JsResult,
};

/// The hint passed to `ToPrimitive`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferredType {
    /// Prefer `valueOf`.
    Number,
    /// Prefer `toString`.
    String,
    /// No preference; numbers win.
    Default,
}

/// Renders an `f64` the way the language does.
pub(crate) fn f64_to_js_string(value: f64) -> JsString {
    if value.is_nan() {
        return js_string!("NaN");
    }
    if value.is_infinite() {
        return if value > 0.0 {
            js_string!("Infinity")
        } else {
            js_string!("-Infinity")
        };
    }
    let mut buffer = ryu_js::Buffer::new();
    JsString::from(buffer.format(value))
}

/// `StringToNumber ( str )`
pub(crate) fn string_to_number(string: &str) -> f64 {
    let string = string.trim_matches(is_trimmable_whitespace);
    match string {
        "" => return 0.0,
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    if let Some(hex) = string.strip_prefix("0x").or_else(|| string.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16).map_or(f64::NAN, |n| n as f64);
    }
    if let Some(oct) = string.strip_prefix("0o").or_else(|| string.strip_prefix("0O")) {
        return u64::from_str_radix(oct, 8).map_or(f64::NAN, |n| n as f64);
    }
    if let Some(bin) = string.strip_prefix("0b").or_else(|| string.strip_prefix("0B")) {
        return u64::from_str_radix(bin, 2).map_or(f64::NAN, |n| n as f64);
    }

    // `fast_float` accepts some inputs the language does not (e.g. `1.0e`),
    // so only accept a parse that consumed the whole string.
    match fast_float::parse_partial::<f64, _>(string) {
        Ok((value, consumed)) if consumed == string.len() => value,
        _ => f64::NAN,
    }
}

impl JsValue {
    /// `ToBoolean ( argument )`
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Boolean(boolean) => *boolean,
            Self::Integer(integer) => *integer != 0,
            Self::Rational(rational) => *rational != 0.0 && !rational.is_nan(),
            Self::String(string) => !string.is_empty(),
            Self::BigInt(bigint) => !bigint.is_zero(),
            Self::Symbol(_) | Self::Object(_) => true,
        }
    }

    /// `ToNumber ( argument )`
    pub fn to_number(&self, context: &mut Context) -> JsResult<f64> {
        match self {
            Self::Null => Ok(0.0),
            Self::Undefined => Ok(f64::NAN),
            Self::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Self::Integer(integer) => Ok(f64::from(*integer)),
            Self::Rational(rational) => Ok(*rational),
            Self::String(string) => Ok(string_to_number(string)),
            Self::Symbol(_) => Err(JsNativeError::typ()
                .with_message("cannot convert a Symbol to a number")
                .into()),
            Self::BigInt(_) => Err(JsNativeError::typ()
                .with_message("cannot convert a BigInt to a number")
                .into()),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::Number)?;
                primitive.to_number(context)
            }
        }
    }

    /// `ToNumeric ( value )`
    pub fn to_numeric(&self, context: &mut Context) -> JsResult<Numeric> {
        let primitive = self.to_primitive(context, PreferredType::Number)?;
        if let Some(bigint) = primitive.as_bigint() {
            return Ok(Numeric::BigInt(bigint.clone()));
        }
        Ok(Numeric::Number(primitive.to_number(context)?))
    }

    /// `ToString ( argument )`
    pub fn to_string(&self, context: &mut Context) -> JsResult<JsString> {
        match self {
            Self::Null => Ok(js_string!("null")),
            Self::Undefined => Ok(js_string!("undefined")),
            Self::Boolean(true) => Ok(js_string!("true")),
            Self::Boolean(false) => Ok(js_string!("false")),
            Self::Integer(integer) => Ok(JsString::from(integer.to_string())),
            Self::Rational(rational) => Ok(f64_to_js_string(*rational)),
            Self::String(string) => Ok(string.clone()),
            Self::Symbol(_) => Err(JsNativeError::typ()
                .with_message("cannot convert a Symbol to a string")
                .into()),
            Self::BigInt(bigint) => Ok(JsString::from(bigint.to_string_radix(10))),
            Self::Object(_) => {
                let primitive = self.to_primitive(context, PreferredType::String)?;
                primitive.to_string(context)
            }
        }
    }

    /// `ToPrimitive ( input [ , preferredType ] )`
    pub fn to_primitive(
        &self,
        context: &mut Context,
        preferred_type: PreferredType,
    ) -> JsResult<JsValue> {
        let Some(_) = self.as_object() else {
            return Ok(self.clone());
        };

        // Consult `@@toPrimitive` first.
        if let Some(exotic) = self.get_method(JsSymbol::to_primitive(), context)? {
            let hint = match preferred_type {
                PreferredType::Number => "number",
                PreferredType::String => "string",
                PreferredType::Default => "default",
            };
            let result = exotic.call(self, &[hint.into()], context)?;
            if !result.is_object() {
                return Ok(result);
            }
            return Err(JsNativeError::typ()
                .with_message("@@toPrimitive returned an object")
                .into());
        }

        // `OrdinaryToPrimitive ( O, hint )`
        let method_names: [&str; 2] = if preferred_type == PreferredType::String {
            ["toString", "valueOf"]
        } else {
            ["valueOf", "toString"]
        };
        for name in method_names {
            let method = self.get_v(name, context)?;
            if let Some(method) = method.as_callable() {
                let result = method.clone().call(self, &[], context)?;
                if !result.is_object() {
                    return Ok(result);
                }
            }
        }
        Err(JsNativeError::typ()
            .with_message("cannot convert object to primitive value")
            .into())
    }

    /// `ToIntegerOrInfinity ( argument )`
    pub fn to_integer_or_infinity(&self, context: &mut Context) -> JsResult<IntegerOrInfinity> {
        let number = self.to_number(context)?;
        Ok(IntegerOrInfinity::from(number))
    }

    /// `ToLength ( argument )`
    pub fn to_length(&self, context: &mut Context) -> JsResult<u64> {
        match self.to_integer_or_infinity(context)? {
            IntegerOrInfinity::NegativeInfinity => Ok(0),
            IntegerOrInfinity::Integer(i) if i < 0 => Ok(0),
            IntegerOrInfinity::Integer(i) => Ok((i as u64).min(2u64.pow(53) - 1)),
            IntegerOrInfinity::PositiveInfinity => Ok(2u64.pow(53) - 1),
        }
    }

    /// `ToIndex ( value )`
    pub fn to_index(&self, context: &mut Context) -> JsResult<u64> {
        if self.is_undefined() {
            return Ok(0);
        }
        let integer = self.to_integer_or_infinity(context)?;
        match integer {
            IntegerOrInfinity::Integer(i) if (0..=(2i64.pow(53) - 1)).contains(&i) => Ok(i as u64),
            _ => Err(JsNativeError::range()
                .with_message("argument is not a valid index")
                .into()),
        }
    }

    /// `ToUint32 ( argument )`
    pub fn to_u32(&self, context: &mut Context) -> JsResult<u32> {
        if let Self::Integer(integer) = self {
            if let Ok(value) = u32::try_from(*integer) {
                return Ok(value);
            }
        }
        let number = self.to_number(context)?;
        Ok(f64_to_uint32(number))
    }

    /// `ToInt32 ( argument )`
    pub fn to_i32(&self, context: &mut Context) -> JsResult<i32> {
        if let Self::Integer(integer) = self {
            return Ok(*integer);
        }
        let number = self.to_number(context)?;
        Ok(f64_to_int32(number))
    }

    /// `ToPropertyKey ( argument )`
    pub fn to_property_key(&self, context: &mut Context) -> JsResult<PropertyKey> {
        let key = self.to_primitive(context, PreferredType::String)?;
        match key {
            Self::Symbol(symbol) => Ok(symbol.into()),
            Self::String(string) => Ok(string.into()),
            primitive => Ok(primitive.to_string(context)?.into()),
        }
    }

    /// `ToPropertyDescriptor ( Obj )`
    pub fn to_property_descriptor(&self, context: &mut Context) -> JsResult<PropertyDescriptor> {
        let obj = self.as_object().ok_or_else(|| {
            JsNativeError::typ().with_message("property descriptor must be an object")
        })?;

        let mut builder = PropertyDescriptor::builder();
        if obj.has_property("enumerable", context)? {
            builder = builder.enumerable(obj.get("enumerable", context)?.to_boolean());
        }
        if obj.has_property("configurable", context)? {
            builder = builder.configurable(obj.get("configurable", context)?.to_boolean());
        }
        let mut has_data = false;
        let mut has_accessor = false;
        if obj.has_property("value", context)? {
            builder = builder.value(obj.get("value", context)?);
            has_data = true;
        }
        if obj.has_property("writable", context)? {
            builder = builder.writable(obj.get("writable", context)?.to_boolean());
            has_data = true;
        }
        if obj.has_property("get", context)? {
            let get = obj.get("get", context)?;
            if !get.is_undefined() && get.as_callable().is_none() {
                return Err(JsNativeError::typ()
                    .with_message("property descriptor getter must be callable")
                    .into());
            }
            builder = builder.get(get);
            has_accessor = true;
        }
        if obj.has_property("set", context)? {
            let set = obj.get("set", context)?;
            if !set.is_undefined() && set.as_callable().is_none() {
                return Err(JsNativeError::typ()
                    .with_message("property descriptor setter must be callable")
                    .into());
            }
            builder = builder.set(set);
            has_accessor = true;
        }
        if has_data && has_accessor {
            return Err(JsNativeError::typ()
                .with_message("property descriptors cannot be both data and accessor descriptors")
                .into());
        }
        Ok(builder.build())
    }
}

/// `ToUint32` on a raw `f64`.
pub(crate) fn f64_to_uint32(number: f64) -> u32 {
    if number.is_nan() || number.is_infinite() || number == 0.0 {
        return 0;
    }
    let number = number.trunc();
    let modulo = number.rem_euclid(4_294_967_296.0);
    modulo as u32
}

/// `ToInt32` on a raw `f64`.
pub(crate) fn f64_to_int32(number: f64) -> i32 {
    let u = f64_to_uint32(number);
    u as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_number_cases() {
        assert_eq!(string_to_number("42"), 42.0);
        assert_eq!(string_to_number("  3.5  "), 3.5);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("0x10"), 16.0);
        assert_eq!(string_to_number("Infinity"), f64::INFINITY);
        assert!(string_to_number("12abc").is_nan());
    }

    #[test]
    fn uint32_wrapping() {
        assert_eq!(f64_to_uint32(-1.0), 4_294_967_295);
        assert_eq!(f64_to_int32(4_294_967_295.0), -1);
        assert_eq!(f64_to_uint32(f64::NAN), 0);
    }

    #[test]
    fn f64_rendering() {
        assert_eq!(f64_to_js_string(1.0), "1");
        assert_eq!(f64_to_js_string(0.5), "0.5");
        assert_eq!(f64_to_js_string(f64::NAN), "NaN");
        assert_eq!(f64_to_js_string(-0.0), "0");
    }
}
