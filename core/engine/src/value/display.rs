//! Human-readable rendering of values, used by `console` and error
//! messages.

use super::JsValue;
use crate::object::ObjectData;
use std::fmt;

/// A [`fmt::Display`] wrapper over a value.
#[derive(Debug)]
pub struct ValueDisplay<'a> {
    value: &'a JsValue,
}

impl<'a> ValueDisplay<'a> {
    pub(crate) const fn new(value: &'a JsValue) -> Self {
        Self { value }
    }
}

const MAX_DEPTH: usize = 2;

fn display_value(value: &JsValue, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    match value {
        JsValue::Null => write!(f, "null"),
        JsValue::Undefined => write!(f, "undefined"),
        JsValue::Boolean(boolean) => write!(f, "{boolean}"),
        JsValue::Integer(integer) => write!(f, "{integer}"),
        JsValue::Rational(rational) => {
            write!(f, "{}", super::conversions::f64_to_js_string(*rational))
        }
        JsValue::String(string) => {
            if depth == 0 {
                write!(f, "{string}")
            } else {
                write!(f, "\"{string}\"")
            }
        }
        JsValue::BigInt(bigint) => write!(f, "{bigint}n"),
        JsValue::Symbol(symbol) => write!(f, "{symbol}"),
        JsValue::Object(_) => display_object(value, f, depth),
    }
}

fn display_object(value: &JsValue, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    let Some(obj) = value.as_object() else {
        return Ok(());
    };
    if depth > MAX_DEPTH {
        return write!(f, "[...]");
    }
    let borrowed = obj.borrow();
    match &borrowed.data {
        ObjectData::Array => {
            let elements: Vec<JsValue> = borrowed
                .properties()
                .dense_indexed_properties()
                .cloned()
                .unwrap_or_default();
            drop(borrowed);
            write!(f, "[ ")?;
            for (i, element) in elements.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                display_value(element, f, depth + 1)?;
            }
            write!(f, " ]")
        }
        ObjectData::Function(_) | ObjectData::BoundFunction(_) => {
            let name = borrowed
                .properties()
                .get(&"name".into())
                .and_then(|d| d.value().cloned());
            drop(borrowed);
            match name.and_then(|n| n.as_string().cloned()) {
                Some(name) if !name.is_empty() => write!(f, "[Function: {name}]"),
                _ => write!(f, "[Function (anonymous)]"),
            }
        }
        ObjectData::Error(_) => write!(f, "[Error]"),
        ObjectData::Date(_) | ObjectData::Map(_) | ObjectData::Set(_) | ObjectData::Promise(_) => {
            write!(f, "[object]")
        }
        _ => {
            let keys = borrowed.properties().own_keys();
            let mut entries = Vec::new();
            for key in keys {
                if let Some(desc) = borrowed.properties().get(&key) {
                    if desc.expect_enumerable() {
                        if let Some(value) = desc.value() {
                            entries.push((key, value.clone()));
                        }
                    }
                }
            }
            drop(borrowed);
            write!(f, "{{ ")?;
            for (i, (key, value)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: ")?;
                display_value(value, f, depth + 1)?;
            }
            write!(f, " }}")
        }
    }
}

impl fmt::Display for ValueDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        display_value(self.value, f, 0)
    }
}

/// Renders a value for `console.dir`-style inspection.
#[must_use]
pub fn display_obj(value: &JsValue, _internals: bool) -> String {
    format!("{}", value.display())
}
