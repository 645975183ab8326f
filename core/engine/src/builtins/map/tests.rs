use crate::{
    builtins::{Array, Map},
    object::{JsObject, ObjectData},
    symbol::JsSymbol,
    Context, JsValue,
};

use super::ordered_map::OrderedMap;

fn new_map(context: &mut Context) -> JsValue {
    JsObject::from_proto_and_data(
        Some(context.intrinsics().constructors().map().prototype()),
        ObjectData::map(OrderedMap::new()),
    )
    .into()
}

#[test]
fn set_returns_the_map_for_chaining() {
    let mut context = Context::new();
    let map = new_map(&mut context);
    let result = Map::set(
        &map,
        &[JsValue::new("a"), JsValue::new(1)],
        &mut context,
    )
    .unwrap();
    assert!(result.strict_equals(&map));

    let got = Map::get(&map, &[JsValue::new("a")], &mut context).unwrap();
    assert_eq!(got, JsValue::new(1));
}

#[test]
fn same_value_zero_key_lookup() {
    let mut context = Context::new();
    let map = new_map(&mut context);

    Map::set(&map, &[JsValue::nan(), JsValue::new("nan")], &mut context).unwrap();
    let got = Map::get(&map, &[JsValue::nan()], &mut context).unwrap();
    assert_eq!(got, JsValue::new("nan"));

    Map::set(
        &map,
        &[JsValue::Rational(-0.0), JsValue::new("zero")],
        &mut context,
    )
    .unwrap();
    let got = Map::get(&map, &[JsValue::new(0)], &mut context).unwrap();
    assert_eq!(got, JsValue::new("zero"));

    let size = Map::get_size(&map, &[], &mut context).unwrap();
    assert_eq!(size, JsValue::new(2));
}

#[test]
fn entries_and_iterator_share_identity() {
    let mut context = Context::new();
    let prototype = context.intrinsics().constructors().map().prototype();
    let entries = prototype.get("entries", &mut context).unwrap();
    let iterator = prototype.get(JsSymbol::iterator(), &mut context).unwrap();
    assert!(entries.strict_equals(&iterator));
}

#[test]
fn constructor_accepts_entry_pairs() {
    let mut context = Context::new();
    let pair_a = Array::create_array_from_list(
        [JsValue::new("a"), JsValue::new(1)],
        &mut context,
    );
    let pair_b = Array::create_array_from_list(
        [JsValue::new("b"), JsValue::new(2)],
        &mut context,
    );
    let pairs = Array::create_array_from_list(
        [pair_a.into(), pair_b.into()],
        &mut context,
    );

    let map_constructor = context.intrinsics().constructors().map().constructor();
    let map = map_constructor
        .construct(&[pairs.into()], None, &mut context)
        .unwrap();

    let map_value: JsValue = map.into();
    let size = Map::get_size(&map_value, &[], &mut context).unwrap();
    assert_eq!(size, JsValue::new(2));
    let got = Map::get(&map_value, &[JsValue::new("b")], &mut context).unwrap();
    assert_eq!(got, JsValue::new(2));
}

#[test]
fn group_by_groups_in_insertion_order() {
    let mut context = Context::new();
    let items = Array::create_array_from_list(
        [1, 2, 3, 4].map(JsValue::new),
        &mut context,
    );
    let grouper = crate::object::FunctionObjectBuilder::new(
        &mut context,
        crate::native_function::NativeFunction::from_fn_ptr(|_, args, context| {
            let n = args[0].to_number(context)?;
            Ok(if n as i64 % 2 == 1 {
                JsValue::new("odd")
            } else {
                JsValue::new("even")
            })
        }),
    )
    .build();

    let map_constructor = context.intrinsics().constructors().map().constructor();
    let group_by = map_constructor.get("groupBy", &mut context).unwrap();
    let grouped = group_by
        .call(
            &map_constructor.into(),
            &[items.into(), grouper.into()],
            &mut context,
        )
        .unwrap();

    let odd = Map::get(&grouped, &[JsValue::new("odd")], &mut context).unwrap();
    let odd = odd.as_object().unwrap();
    assert_eq!(odd.get("length", &mut context).unwrap(), JsValue::new(2));
    assert_eq!(odd.get(0u32, &mut context).unwrap(), JsValue::new(1));
    assert_eq!(odd.get(1u32, &mut context).unwrap(), JsValue::new(3));

    let even = Map::get(&grouped, &[JsValue::new("even")], &mut context).unwrap();
    let even = even.as_object().unwrap();
    assert_eq!(even.get(0u32, &mut context).unwrap(), JsValue::new(2));
    assert_eq!(even.get(1u32, &mut context).unwrap(), JsValue::new(4));
}

#[test]
fn iterator_observes_deletions() {
    let mut context = Context::new();
    let map = new_map(&mut context);
    Map::set(&map, &[JsValue::new("a"), JsValue::new(1)], &mut context).unwrap();
    Map::set(&map, &[JsValue::new("b"), JsValue::new(2)], &mut context).unwrap();
    Map::set(&map, &[JsValue::new("c"), JsValue::new(3)], &mut context).unwrap();

    let iterator = Map::keys(&map, &[], &mut context).unwrap();
    let next = iterator.get_v("next", &mut context).unwrap();

    let first = next.call(&iterator, &[], &mut context).unwrap();
    assert_eq!(
        first.get_v("value", &mut context).unwrap(),
        JsValue::new("a")
    );

    // Deleting an unvisited entry skips it in the remaining iteration.
    Map::delete(&map, &[JsValue::new("b")], &mut context).unwrap();

    let second = next.call(&iterator, &[], &mut context).unwrap();
    assert_eq!(
        second.get_v("value", &mut context).unwrap(),
        JsValue::new("c")
    );

    let done = next.call(&iterator, &[], &mut context).unwrap();
    assert_eq!(done.get_v("done", &mut context).unwrap(), JsValue::new(true));
}
