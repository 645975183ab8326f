//! The tagged value domain.
//!
//! Scalars are stored inline; strings, symbols, bigints and objects are
//! shared handles. The two number variants keep a canonical split between
//! 32-bit integers and doubles; integer results that overflow become
//! rationals, and `-0` is only representable as a rational.

mod conversions;
mod display;
mod equality;
mod hash;
mod integer;

pub use conversions::PreferredType;
pub use display::ValueDisplay;
pub use integer::{IntegerOrInfinity, IntegerOrNan};

pub use display::display_obj;

pub(crate) use conversions::{f64_to_int32, f64_to_js_string, f64_to_uint32, string_to_number};

use crate::{
    bigint::JsBigInt,
    error::JsNativeError,
    object::{JsObject, ObjectData},
    property::PropertyKey,
    string::JsString,
    symbol::JsSymbol,
    Context, JsResult,
};

/// A value in the engine's dynamic value domain.
#[derive(Debug, Clone, Default)]
pub enum JsValue {
    /// `null`
    Null,
    /// `undefined`
    #[default]
    Undefined,
    /// `true` and `false`
    Boolean(bool),
    /// A UTF-8 string
    String(JsString),
    /// A double-precision float
    Rational(f64),
    /// A 32-bit integer
    Integer(i32),
    /// An arbitrary-precision integer
    BigInt(JsBigInt),
    /// A symbol
    Symbol(JsSymbol),
    /// A heap object
    Object(JsObject),
}

/// A numeric value: a number or a bigint.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    /// A double-precision float.
    Number(f64),
    /// An arbitrary-precision integer.
    BigInt(JsBigInt),
}

impl JsValue {
    /// Creates a new value from anything convertible into one.
    #[must_use]
    pub fn new<T: Into<Self>>(value: T) -> Self {
        value.into()
    }

    /// The `undefined` value.
    #[must_use]
    pub const fn undefined() -> Self {
        Self::Undefined
    }

    /// The `null` value.
    #[must_use]
    pub const fn null() -> Self {
        Self::Null
    }

    /// The `NaN` value.
    #[must_use]
    pub const fn nan() -> Self {
        Self::Rational(f64::NAN)
    }

    /// Checks if the value is `undefined`.
    #[must_use]
    pub const fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Checks if the value is `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Checks if the value is `null` or `undefined`.
    #[must_use]
    pub const fn is_null_or_undefined(&self) -> bool {
        matches!(self, Self::Null | Self::Undefined)
    }

    /// Checks if the value is a boolean.
    #[must_use]
    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean(_))
    }

    /// Checks if the value is a string.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// Checks if the value is a number.
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Self::Rational(_) | Self::Integer(_))
    }

    /// Checks if the value is a bigint.
    #[must_use]
    pub const fn is_bigint(&self) -> bool {
        matches!(self, Self::BigInt(_))
    }

    /// Checks if the value is a symbol.
    #[must_use]
    pub const fn is_symbol(&self) -> bool {
        matches!(self, Self::Symbol(_))
    }

    /// Checks if the value is an object.
    #[must_use]
    pub const fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Checks if the value is a callable object.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Object(obj) if obj.is_callable())
    }

    /// Returns the object handle, if the value is an object.
    #[must_use]
    pub const fn as_object(&self) -> Option<&JsObject> {
        match self {
            Self::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Returns the object handle, if the value is a callable object.
    #[must_use]
    pub fn as_callable(&self) -> Option<&JsObject> {
        self.as_object().filter(|obj| obj.is_callable())
    }

    /// Returns the object handle, if the value is a constructor.
    #[must_use]
    pub fn as_constructor(&self) -> Option<&JsObject> {
        self.as_object().filter(|obj| obj.is_constructor())
    }

    /// Returns the numeric value as an `f64`, if the value is a number.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Integer(integer) => Some(*integer as f64),
            Self::Rational(rational) => Some(*rational),
            _ => None,
        }
    }

    /// Returns the string, if the value is one.
    #[must_use]
    pub const fn as_string(&self) -> Option<&JsString> {
        match self {
            Self::String(string) => Some(string),
            _ => None,
        }
    }

    /// Returns the symbol, if the value is one.
    #[must_use]
    pub fn as_symbol(&self) -> Option<JsSymbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol.clone()),
            _ => None,
        }
    }

    /// Returns the bigint, if the value is one.
    #[must_use]
    pub const fn as_bigint(&self) -> Option<&JsBigInt> {
        match self {
            Self::BigInt(bigint) => Some(bigint),
            _ => None,
        }
    }

    /// Returns the boolean, if the value is one.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(boolean) => Some(*boolean),
            _ => None,
        }
    }

    /// Returns the object handle, if the value is a promise object.
    #[must_use]
    pub fn as_promise(&self) -> Option<&JsObject> {
        self.as_object().filter(|obj| obj.borrow().is_promise())
    }

    /// The result of the `typeof` operator on this value.
    #[must_use]
    pub fn type_of(&self) -> &'static str {
        match self {
            Self::Null => "object",
            Self::Undefined => "undefined",
            Self::Boolean(_) => "boolean",
            Self::String(_) => "string",
            Self::Rational(_) | Self::Integer(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::Symbol(_) => "symbol",
            Self::Object(obj) => {
                if obj.is_callable() {
                    "function"
                } else {
                    "object"
                }
            }
        }
    }

    /// `Call ( F, V, argumentsList )`, raising `TypeError` if the value is
    /// not callable.
    pub fn call(
        &self,
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let callable = self.as_callable().ok_or_else(|| {
            JsNativeError::typ().with_message(format!("{} is not a function", self.type_of()))
        })?;
        callable.clone().call(this, args, context)
    }

    /// `GetV ( V, P )`: gets a property of the value, coercing primitives to
    /// their wrapper prototype first.
    pub fn get_v<K: Into<PropertyKey>>(&self, key: K, context: &mut Context) -> JsResult<JsValue> {
        let obj = self.to_object(context)?;
        obj.__get__(&key.into(), self.clone(), context)
    }

    /// `GetMethod ( V, P )`
    pub fn get_method<K: Into<PropertyKey>>(
        &self,
        key: K,
        context: &mut Context,
    ) -> JsResult<Option<JsObject>> {
        let method = self.get_v(key, context)?;
        if method.is_null_or_undefined() {
            return Ok(None);
        }
        method
            .as_callable()
            .cloned()
            .map(Some)
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("value returned for method is not callable")
                    .into()
            })
    }

    /// `Invoke ( V, P, argumentsList )`
    pub fn invoke<K: Into<PropertyKey>>(
        &self,
        key: K,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let method = self.get_v(key, context)?;
        method.call(self, args, context)
    }

    /// Returns a display wrapper for the value.
    #[must_use]
    pub const fn display(&self) -> ValueDisplay<'_> {
        ValueDisplay::new(self)
    }
}

impl From<bool> for JsValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for JsValue {
    fn from(value: i32) -> Self {
        Self::Integer(value)
    }
}

impl From<u32> for JsValue {
    fn from(value: u32) -> Self {
        i32::try_from(value).map_or(Self::Rational(f64::from(value)), Self::Integer)
    }
}

impl From<i64> for JsValue {
    fn from(value: i64) -> Self {
        i32::try_from(value).map_or(Self::Rational(value as f64), Self::Integer)
    }
}

impl From<u64> for JsValue {
    fn from(value: u64) -> Self {
        i32::try_from(value).map_or(Self::Rational(value as f64), Self::Integer)
    }
}

impl From<usize> for JsValue {
    fn from(value: usize) -> Self {
        i32::try_from(value).map_or(Self::Rational(value as f64), Self::Integer)
    }
}

impl From<f64> for JsValue {
    fn from(value: f64) -> Self {
        Self::Rational(value)
    }
}

impl From<JsString> for JsValue {
    fn from(value: JsString) -> Self {
        Self::String(value)
    }
}

impl From<&str> for JsValue {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<String> for JsValue {
    fn from(value: String) -> Self {
        Self::String(value.into())
    }
}

impl From<char> for JsValue {
    fn from(value: char) -> Self {
        Self::String(value.into())
    }
}

impl From<JsSymbol> for JsValue {
    fn from(value: JsSymbol) -> Self {
        Self::Symbol(value)
    }
}

impl From<JsBigInt> for JsValue {
    fn from(value: JsBigInt) -> Self {
        Self::BigInt(value)
    }
}

impl From<JsObject> for JsValue {
    fn from(value: JsObject) -> Self {
        Self::Object(value)
    }
}

impl From<Numeric> for JsValue {
    fn from(value: Numeric) -> Self {
        match value {
            Numeric::Number(number) => number.into(),
            Numeric::BigInt(bigint) => bigint.into(),
        }
    }
}

/// Utilities for slices of arguments.
pub trait JsArgs {
    /// Returns the argument at `index`, defaulting to `undefined`.
    fn get_or_undefined(&self, index: usize) -> &JsValue;
}

impl JsArgs for [JsValue] {
    fn get_or_undefined(&self, index: usize) -> &JsValue {
        const UNDEFINED: &JsValue = &JsValue::Undefined;
        self.get(index).unwrap_or(UNDEFINED)
    }
}

impl JsValue {
    /// Creates an object wrapper for this value if it is a primitive, per
    /// `ToObject`.
    pub fn to_object(&self, context: &mut Context) -> JsResult<JsObject> {
        let constructors = context.intrinsics().constructors();
        match self {
            Self::Undefined | Self::Null => Err(JsNativeError::typ()
                .with_message("cannot convert 'null' or 'undefined' to object")
                .into()),
            Self::Boolean(boolean) => Ok(JsObject::from_proto_and_data(
                Some(constructors.boolean().prototype()),
                ObjectData::Boolean(*boolean),
            )),
            Self::Integer(integer) => Ok(JsObject::from_proto_and_data(
                Some(constructors.number().prototype()),
                ObjectData::Number(f64::from(*integer)),
            )),
            Self::Rational(rational) => Ok(JsObject::from_proto_and_data(
                Some(constructors.number().prototype()),
                ObjectData::Number(*rational),
            )),
            Self::String(string) => {
                let obj = JsObject::from_proto_and_data(
                    Some(constructors.string().prototype()),
                    ObjectData::String(string.clone()),
                );
                obj.insert_property(
                    "length",
                    crate::property::PropertyDescriptor::builder()
                        .value(string.chars().count())
                        .writable(false)
                        .enumerable(false)
                        .configurable(false),
                );
                Ok(obj)
            }
            Self::Symbol(symbol) => Ok(JsObject::from_proto_and_data(
                Some(constructors.symbol().prototype()),
                ObjectData::Symbol(symbol.clone()),
            )),
            Self::BigInt(_) => Err(JsNativeError::typ()
                .with_message("cannot convert a BigInt to an object")
                .into()),
            Self::Object(obj) => Ok(obj.clone()),
        }
    }
}
