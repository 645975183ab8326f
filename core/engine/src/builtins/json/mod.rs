//! The `JSON` namespace object: the bridge between the value domain and the
//! byte domain.

#[cfg(test)]
mod tests;

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInObject, IntrinsicObject},
    context::intrinsics::Intrinsics,
    error::JsNativeError,
    js_string,
    object::JsObject,
    property::{Attribute, PropertyKey},
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};

/// The `JSON` namespace builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Json;

impl IntrinsicObject for Json {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .static_method(Self::parse, "parse", 2)
            .static_method(Self::stringify, "stringify", 3)
            .static_property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().json()
    }
}

impl BuiltInObject for Json {
    const NAME: &'static str = "JSON";
}

impl BuiltIn for Json {
    const PRIORITY: u32 = 170;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("JSON", Type::named("JSON"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Json {
    /// `JSON.parse ( text [ , reviver ] )`
    ///
    /// Malformed input raises `SyntaxError`.
    pub(crate) fn parse(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let text = args.get_or_undefined(0).to_string(context)?;
        let parsed: serde_json::Value = serde_json::from_str(text.as_str()).map_err(|err| {
            JsNativeError::syntax().with_message(format!("invalid JSON: {err}"))
        })?;
        let unfiltered = json_to_value(&parsed, context);

        match args.get_or_undefined(1).as_callable() {
            Some(reviver) => {
                let reviver = reviver.clone();
                let root = JsObject::with_object_proto(context.intrinsics());
                root.create_data_property_or_throw(js_string!(), unfiltered, context)?;
                internalize_json_property(
                    &root,
                    &PropertyKey::from(""),
                    &reviver,
                    context,
                )
            }
            None => Ok(unfiltered),
        }
    }

    /// `JSON.stringify ( value [ , replacer [ , space ] ] )`
    pub(crate) fn stringify(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0);
        let replacer = args.get_or_undefined(1);
        let space = args.get_or_undefined(2);

        let replacer_function = replacer.as_callable().cloned();
        let property_list = match replacer.as_object() {
            Some(obj) if obj.is_array_abstract() && replacer_function.is_none() => {
                let len = obj.get("length", context)?.to_length(context)?;
                let mut list: Vec<JsString> = Vec::new();
                for i in 0..len {
                    let item = obj.get(i, context)?;
                    let key = match item {
                        JsValue::String(s) => Some(s),
                        JsValue::Integer(_) | JsValue::Rational(_) => {
                            Some(item.to_string(context)?)
                        }
                        _ => None,
                    };
                    if let Some(key) = key {
                        if !list.contains(&key) {
                            list.push(key);
                        }
                    }
                }
                Some(list)
            }
            _ => None,
        };

        let space = space.to_primitive(context, crate::value::PreferredType::Number)?;
        let gap = match &space {
            JsValue::Integer(_) | JsValue::Rational(_) => {
                let count = match space.to_integer_or_infinity(context)? {
                    IntegerOrInfinity::Integer(i) => i.clamp(0, 10) as usize,
                    IntegerOrInfinity::PositiveInfinity => 10,
                    IntegerOrInfinity::NegativeInfinity => 0,
                };
                " ".repeat(count)
            }
            JsValue::String(s) => s.as_str().chars().take(10).collect(),
            _ => String::new(),
        };

        let mut state = SerializeState {
            stack: Vec::new(),
            property_list,
            replacer_function,
            gap,
            indent: String::new(),
        };

        let holder = JsObject::with_object_proto(context.intrinsics());
        holder.create_data_property_or_throw(js_string!(), value.clone(), context)?;
        match serialize_json_property(&mut state, &PropertyKey::from(""), &holder, context)? {
            Some(rendered) => Ok(JsString::from(rendered).into()),
            None => Ok(JsValue::undefined()),
        }
    }
}

fn json_to_value(json: &serde_json::Value, context: &mut Context) -> JsValue {
    match json {
        serde_json::Value::Null => JsValue::null(),
        serde_json::Value::Bool(b) => (*b).into(),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                JsValue::from(i)
            } else {
                JsValue::from(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => JsString::from(s.as_str()).into(),
        serde_json::Value::Array(values) => {
            let elements: Vec<JsValue> = values
                .iter()
                .map(|value| json_to_value(value, context))
                .collect();
            crate::builtins::Array::create_array_from_list(elements, context).into()
        }
        serde_json::Value::Object(entries) => {
            let obj = JsObject::with_object_proto(context.intrinsics());
            for (key, value) in entries {
                let value = json_to_value(value, context);
                obj.insert_property(
                    key.as_str(),
                    crate::property::PropertyDescriptor::builder()
                        .value(value)
                        .writable(true)
                        .enumerable(true)
                        .configurable(true),
                );
            }
            obj.into()
        }
    }
}

/// `InternalizeJSONProperty ( holder, name, reviver )`
fn internalize_json_property(
    holder: &JsObject,
    name: &PropertyKey,
    reviver: &JsObject,
    context: &mut Context,
) -> JsResult<JsValue> {
    let value = holder.get(name.clone(), context)?;
    if let Some(obj) = value.as_object().cloned() {
        if obj.is_array_abstract() {
            let len = obj.get("length", context)?.to_length(context)?;
            for i in 0..len {
                let new_element =
                    internalize_json_property(&obj, &PropertyKey::from(i), reviver, context)?;
                if new_element.is_undefined() {
                    obj.__delete__(&PropertyKey::from(i), context)?;
                } else {
                    obj.create_data_property(PropertyKey::from(i), new_element, context)?;
                }
            }
        } else {
            let keys = obj.enumerable_own_string_keys(context)?;
            for (key, _) in keys {
                let new_element = internalize_json_property(&obj, &key, reviver, context)?;
                if new_element.is_undefined() {
                    obj.__delete__(&key, context)?;
                } else {
                    obj.create_data_property(key, new_element, context)?;
                }
            }
        }
    }
    let name_value = name.to_value();
    reviver.call(&holder.clone().into(), &[name_value, value], context)
}

struct SerializeState {
    stack: Vec<usize>,
    property_list: Option<Vec<JsString>>,
    replacer_function: Option<JsObject>,
    gap: String,
    indent: String,
}

/// `SerializeJSONProperty ( state, key, holder )`
fn serialize_json_property(
    state: &mut SerializeState,
    key: &PropertyKey,
    holder: &JsObject,
    context: &mut Context,
) -> JsResult<Option<String>> {
    let mut value = holder.get(key.clone(), context)?;

    // `toJSON` runs before the replacer.
    if value.is_object() {
        let to_json = value.get_v("toJSON", context)?;
        if let Some(to_json) = to_json.as_callable() {
            value = to_json
                .clone()
                .call(&value, &[key.to_value()], context)?;
        }
    }

    if let Some(replacer) = &state.replacer_function {
        value = replacer
            .clone()
            .call(&holder.clone().into(), &[key.to_value(), value], context)?;
    }

    // Wrappers unwrap before serialization.
    if let Some(obj) = value.as_object() {
        let borrowed = obj.borrow();
        if let Some(n) = borrowed.as_number() {
            drop(borrowed);
            value = JsValue::from(n);
        } else if let Some(s) = borrowed.as_string() {
            drop(borrowed);
            value = JsValue::from(s);
        } else if let Some(b) = borrowed.as_boolean() {
            drop(borrowed);
            value = JsValue::from(b);
        }
    }

    match &value {
        JsValue::Null => Ok(Some("null".to_owned())),
        JsValue::Boolean(b) => Ok(Some(b.to_string())),
        JsValue::String(s) => Ok(Some(quote_json_string(s))),
        JsValue::Integer(_) | JsValue::Rational(_) => {
            let number = value.as_number().expect("checked above");
            if number.is_finite() {
                Ok(Some(
                    crate::builtins::Number::to_js_string(number).to_std_string(),
                ))
            } else {
                Ok(Some("null".to_owned()))
            }
        }
        JsValue::BigInt(_) => Err(JsNativeError::typ()
            .with_message("cannot serialize a BigInt to JSON")
            .into()),
        JsValue::Object(obj) if !obj.is_callable() => {
            if obj.is_array_abstract() {
                serialize_json_array(state, obj.clone(), context).map(Some)
            } else {
                serialize_json_object(state, obj.clone(), context).map(Some)
            }
        }
        // Functions, symbols and undefined serialize as absent.
        _ => Ok(None),
    }
}

fn enter_cycle_check(
    state: &mut SerializeState,
    obj: &JsObject,
) -> JsResult<()> {
    if state.stack.contains(&obj.addr()) {
        return Err(JsNativeError::typ()
            .with_message("cyclic object value")
            .into());
    }
    state.stack.push(obj.addr());
    Ok(())
}

/// `SerializeJSONObject ( state, value )`
fn serialize_json_object(
    state: &mut SerializeState,
    obj: JsObject,
    context: &mut Context,
) -> JsResult<String> {
    enter_cycle_check(state, &obj)?;
    let step_back = state.indent.clone();
    state.indent.push_str(&state.gap);

    let keys: Vec<PropertyKey> = match &state.property_list {
        Some(list) => list.iter().cloned().map(PropertyKey::from).collect(),
        None => obj
            .enumerable_own_string_keys(context)?
            .into_iter()
            .map(|(key, _)| key)
            .collect(),
    };

    let mut partial = Vec::new();
    for key in keys {
        if let Some(rendered) = serialize_json_property(state, &key, &obj, context)? {
            let member = if state.gap.is_empty() {
                format!("{}:{}", quote_json_string(&key_to_string(&key)), rendered)
            } else {
                format!("{}: {}", quote_json_string(&key_to_string(&key)), rendered)
            };
            partial.push(member);
        }
    }

    let result = if partial.is_empty() {
        "{}".to_owned()
    } else if state.gap.is_empty() {
        format!("{{{}}}", partial.join(","))
    } else {
        let separator = format!(",\n{}", state.indent);
        format!(
            "{{\n{}{}\n{}}}",
            state.indent,
            partial.join(&separator),
            step_back
        )
    };

    state.stack.pop();
    state.indent = step_back;
    Ok(result)
}

/// `SerializeJSONArray ( state, value )`
fn serialize_json_array(
    state: &mut SerializeState,
    obj: JsObject,
    context: &mut Context,
) -> JsResult<String> {
    enter_cycle_check(state, &obj)?;
    let step_back = state.indent.clone();
    state.indent.push_str(&state.gap);

    let len = obj.get("length", context)?.to_length(context)?;
    let mut partial = Vec::with_capacity(len as usize);
    for i in 0..len {
        match serialize_json_property(state, &PropertyKey::from(i), &obj, context)? {
            Some(rendered) => partial.push(rendered),
            // Unserializable elements become null inside arrays.
            None => partial.push("null".to_owned()),
        }
    }

    let result = if partial.is_empty() {
        "[]".to_owned()
    } else if state.gap.is_empty() {
        format!("[{}]", partial.join(","))
    } else {
        let separator = format!(",\n{}", state.indent);
        format!(
            "[\n{}{}\n{}]",
            state.indent,
            partial.join(&separator),
            step_back
        )
    };

    state.stack.pop();
    state.indent = step_back;
    Ok(result)
}

fn key_to_string(key: &PropertyKey) -> JsString {
    key.as_string().unwrap_or_default()
}

/// `QuoteJSONString ( value )`
fn quote_json_string(string: &JsString) -> String {
    let mut product = String::with_capacity(string.len() + 2);
    product.push('"');
    for c in string.chars() {
        match c {
            '"' => product.push_str("\\\""),
            '\\' => product.push_str("\\\\"),
            '\u{0008}' => product.push_str("\\b"),
            '\u{000C}' => product.push_str("\\f"),
            '\n' => product.push_str("\\n"),
            '\r' => product.push_str("\\r"),
            '\t' => product.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                product.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => product.push(c),
        }
    }
    product.push('"');
    product
}
