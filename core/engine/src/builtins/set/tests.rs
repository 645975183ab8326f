use crate::{
    builtins::Set,
    object::{JsObject, ObjectData},
    Context, JsValue,
};

use super::ordered_set::OrderedSet;

fn new_set(context: &mut Context) -> JsValue {
    JsObject::from_proto_and_data(
        Some(context.intrinsics().constructors().set().prototype()),
        ObjectData::set(OrderedSet::new()),
    )
    .into()
}

#[test]
fn add_returns_the_set_for_chaining() {
    let mut context = Context::new();
    let set = new_set(&mut context);
    let result = Set::add(&set, &[JsValue::new(1)], &mut context).unwrap();
    assert!(result.strict_equals(&set));
}

#[test]
fn negative_zero_canonicalizes() {
    let mut context = Context::new();
    let set = new_set(&mut context);
    Set::add(&set, &[JsValue::Rational(0.0)], &mut context).unwrap();
    let has = Set::has(&set, &[JsValue::Rational(-0.0)], &mut context).unwrap();
    assert_eq!(has, JsValue::new(true));
    assert_eq!(Set::get_size(&set, &[], &mut context).unwrap(), JsValue::new(1));
}

#[test]
fn duplicates_are_coalesced() {
    let mut context = Context::new();
    let set = new_set(&mut context);
    for _ in 0..3 {
        Set::add(&set, &[JsValue::new("x")], &mut context).unwrap();
    }
    assert_eq!(Set::get_size(&set, &[], &mut context).unwrap(), JsValue::new(1));
    let deleted = Set::delete(&set, &[JsValue::new("x")], &mut context).unwrap();
    assert_eq!(deleted, JsValue::new(true));
    assert_eq!(Set::get_size(&set, &[], &mut context).unwrap(), JsValue::new(0));
}

#[test]
fn values_iterates_in_insertion_order() {
    let mut context = Context::new();
    let set = new_set(&mut context);
    for value in ["b", "a", "c"] {
        Set::add(&set, &[JsValue::new(value)], &mut context).unwrap();
    }

    let iterator = Set::values(&set, &[], &mut context).unwrap();
    let next = iterator.get_v("next", &mut context).unwrap();
    let mut seen = Vec::new();
    loop {
        let result = next.call(&iterator, &[], &mut context).unwrap();
        if result.get_v("done", &mut context).unwrap().to_boolean() {
            break;
        }
        seen.push(result.get_v("value", &mut context).unwrap());
    }
    assert_eq!(
        seen,
        vec![JsValue::new("b"), JsValue::new("a"), JsValue::new("c")]
    );
}
