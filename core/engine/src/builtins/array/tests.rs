use crate::{builtins::Array, Context, JsValue};

fn array_of(context: &mut Context, values: &[i32]) -> JsValue {
    Array::create_array_from_list(values.iter().map(|v| JsValue::from(*v)), context).into()
}

#[test]
fn create_array_from_list_sets_length() {
    let mut context = Context::new();
    let array = array_of(&mut context, &[1, 2, 3]);
    let obj = array.as_object().unwrap();
    let len = obj.get("length", &mut context).unwrap();
    assert_eq!(len, JsValue::new(3));
    assert_eq!(obj.get(0u32, &mut context).unwrap(), JsValue::new(1));
    assert_eq!(obj.get(2u32, &mut context).unwrap(), JsValue::new(3));
}

#[test]
fn push_and_pop_update_length() {
    let mut context = Context::new();
    let array = array_of(&mut context, &[1, 2]);

    let push = array.get_v("push", &mut context).unwrap();
    let new_len = push
        .call(&array, &[JsValue::new(3)], &mut context)
        .unwrap();
    assert_eq!(new_len, JsValue::new(3));

    let pop = array.get_v("pop", &mut context).unwrap();
    let popped = pop.call(&array, &[], &mut context).unwrap();
    assert_eq!(popped, JsValue::new(3));

    let len = array.get_v("length", &mut context).unwrap();
    assert_eq!(len, JsValue::new(2));
}

#[test]
fn setting_length_truncates() {
    let mut context = Context::new();
    let array = array_of(&mut context, &[1, 2, 3, 4]);
    let obj = array.as_object().unwrap();

    obj.set("length", 2, true, &mut context).unwrap();
    assert_eq!(obj.get("length", &mut context).unwrap(), JsValue::new(2));
    assert!(obj.get(2u32, &mut context).unwrap().is_undefined());
}

#[test]
fn includes_uses_same_value_zero() {
    let mut context = Context::new();
    let array = Array::create_array_from_list([JsValue::nan()], &mut context);
    let includes = JsValue::from(array.clone())
        .get_v("includes", &mut context)
        .unwrap();
    let result = includes
        .call(&array.into(), &[JsValue::nan()], &mut context)
        .unwrap();
    assert_eq!(result, JsValue::new(true));
}

#[test]
fn map_and_filter_round_trip() {
    let mut context = Context::new();
    let array = array_of(&mut context, &[1, 2, 3]);

    let doubler = crate::object::FunctionObjectBuilder::new(
        &mut context,
        crate::native_function::NativeFunction::from_fn_ptr(|_, args, context| {
            let n = args[0].to_number(context)?;
            Ok(JsValue::from(n * 2.0))
        }),
    )
    .build();

    let map = array.get_v("map", &mut context).unwrap();
    let mapped = map.call(&array, &[doubler.into()], &mut context).unwrap();
    let mapped_obj = mapped.as_object().unwrap();
    assert_eq!(mapped_obj.get(0u32, &mut context).unwrap(), JsValue::new(2));
    assert_eq!(mapped_obj.get(2u32, &mut context).unwrap(), JsValue::new(6));
}

#[test]
fn values_and_iterator_share_identity() {
    let mut context = Context::new();
    let prototype = context.intrinsics().constructors().array().prototype();
    let values = prototype.get("values", &mut context).unwrap();
    let iterator = prototype
        .get(crate::symbol::JsSymbol::iterator(), &mut context)
        .unwrap();
    assert!(values.strict_equals(&iterator));
}

#[test]
fn splice_removes_and_inserts() {
    let mut context = Context::new();
    let array = array_of(&mut context, &[1, 2, 3, 4]);
    let splice = array.get_v("splice", &mut context).unwrap();
    let removed = splice
        .call(
            &array,
            &[JsValue::new(1), JsValue::new(2), JsValue::new(9)],
            &mut context,
        )
        .unwrap();

    let removed_obj = removed.as_object().unwrap();
    assert_eq!(
        removed_obj.get("length", &mut context).unwrap(),
        JsValue::new(2)
    );
    assert_eq!(removed_obj.get(0u32, &mut context).unwrap(), JsValue::new(2));

    let obj = array.as_object().unwrap();
    assert_eq!(obj.get("length", &mut context).unwrap(), JsValue::new(3));
    assert_eq!(obj.get(1u32, &mut context).unwrap(), JsValue::new(9));
    assert_eq!(obj.get(2u32, &mut context).unwrap(), JsValue::new(4));
}
