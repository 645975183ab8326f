use super::Json;
use crate::{bigint::JsBigInt, builtins::Array, object::JsObject, Context, JsValue};

fn stringify(context: &mut Context, args: &[JsValue]) -> Result<JsValue, crate::JsError> {
    Json::stringify(&JsValue::undefined(), args, context)
}

#[test]
fn parse_round_trips_objects() {
    let mut context = Context::new();
    let parsed = Json::parse(
        &JsValue::undefined(),
        &[JsValue::new(r#"{"a": 1, "b": [true, null, "x"]}"#)],
        &mut context,
    )
    .unwrap();

    let obj = parsed.as_object().unwrap();
    assert_eq!(obj.get("a", &mut context).unwrap(), JsValue::new(1));
    let b = obj.get("b", &mut context).unwrap();
    let b = b.as_object().unwrap();
    assert_eq!(b.get("length", &mut context).unwrap(), JsValue::new(3));
    assert_eq!(b.get(1u32, &mut context).unwrap(), JsValue::null());

    let rendered = stringify(&mut context, &[parsed]).unwrap();
    assert_eq!(
        rendered,
        JsValue::new(r#"{"a":1,"b":[true,null,"x"]}"#)
    );
}

#[test]
fn parse_rejects_malformed_input_with_syntax_error() {
    let mut context = Context::new();
    let err = Json::parse(
        &JsValue::undefined(),
        &[JsValue::new("{not json}")],
        &mut context,
    )
    .unwrap_err();
    let native = err.as_native().unwrap();
    assert_eq!(native.kind, crate::error::JsNativeErrorKind::Syntax);
}

#[test]
fn unserializable_values_are_omitted_or_nulled() {
    let mut context = Context::new();

    // Undefined in an object disappears; in an array it becomes null.
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.create_data_property_or_throw("a", JsValue::undefined(), &mut context)
        .unwrap();
    obj.create_data_property_or_throw("b", 1, &mut context).unwrap();
    let rendered = stringify(&mut context, &[obj.into()]).unwrap();
    assert_eq!(rendered, JsValue::new(r#"{"b":1}"#));

    let array = Array::create_array_from_list(
        [JsValue::undefined(), JsValue::new(2)],
        &mut context,
    );
    let rendered = stringify(&mut context, &[array.into()]).unwrap();
    assert_eq!(rendered, JsValue::new("[null,2]"));
}

#[test]
fn stringify_detects_cycles() {
    let mut context = Context::new();
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.create_data_property_or_throw("self", obj.clone(), &mut context)
        .unwrap();
    let err = stringify(&mut context, &[obj.into()]).unwrap_err();
    let native = err.as_native().unwrap();
    assert_eq!(native.kind, crate::error::JsNativeErrorKind::Type);
}

#[test]
fn stringify_rejects_bigints() {
    let mut context = Context::new();
    let err = stringify(&mut context, &[JsValue::from(JsBigInt::from(1i64))]).unwrap_err();
    let native = err.as_native().unwrap();
    assert_eq!(native.kind, crate::error::JsNativeErrorKind::Type);
}

#[test]
fn stringify_applies_space() {
    let mut context = Context::new();
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.create_data_property_or_throw("a", 1, &mut context).unwrap();
    let rendered = stringify(
        &mut context,
        &[obj.into(), JsValue::undefined(), JsValue::new(2)],
    )
    .unwrap();
    assert_eq!(rendered, JsValue::new("{\n  \"a\": 1\n}"));
}

#[test]
fn stringify_returns_undefined_for_functions() {
    let mut context = Context::new();
    let function = crate::object::FunctionObjectBuilder::new(
        &mut context,
        crate::native_function::NativeFunction::from_fn_ptr(|_, _, _| Ok(JsValue::undefined())),
    )
    .build();
    let rendered = stringify(&mut context, &[function.into()]).unwrap();
    assert!(rendered.is_undefined());
}
