//! Cross-cutting tests of the iteration protocol: helper laziness,
//! upstream close, and the static combinators.

use paserati_engine::{
    builtins::array::Array,
    object::{FunctionObjectBuilder, JsObject},
    Context, JsValue, NativeFunction,
};
use std::{cell::Cell, rc::Rc};

fn make_result(context: &mut Context, value: JsValue, done: bool) -> JsValue {
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.create_data_property_or_throw("value", value, context)
        .unwrap();
    obj.create_data_property_or_throw("done", done, context)
        .unwrap();
    obj.into()
}

/// Builds a plain iterator object over `values` that counts `next` and
/// `return` invocations.
fn counting_iterator(
    context: &mut Context,
    values: Vec<JsValue>,
    nexts: Rc<Cell<usize>>,
    returns: Rc<Cell<usize>>,
) -> JsValue {
    let obj = JsObject::with_object_proto(context.intrinsics());

    let index = Rc::new(Cell::new(0usize));
    let next = FunctionObjectBuilder::new(
        context,
        NativeFunction::from_closure_with_captures(
            move |_, _, (values, index, nexts), context| {
                nexts.set(nexts.get() + 1);
                let i = index.get();
                if i < values.len() {
                    index.set(i + 1);
                    Ok(make_result(context, values[i].clone(), false))
                } else {
                    Ok(make_result(context, JsValue::undefined(), true))
                }
            },
            (values, index, nexts),
        ),
    )
    .name("next")
    .build();

    let r#return = FunctionObjectBuilder::new(
        context,
        NativeFunction::from_closure_with_captures(
            move |_, _, returns: &Rc<Cell<usize>>, context| {
                returns.set(returns.get() + 1);
                Ok(make_result(context, JsValue::undefined(), true))
            },
            returns,
        ),
    )
    .name("return")
    .build();

    obj.create_data_property_or_throw("next", next, context)
        .unwrap();
    obj.create_data_property_or_throw("return", r#return, context)
        .unwrap();
    obj.into()
}

fn iterator_proto_method(context: &mut Context, name: &str) -> JsValue {
    let iterator = context
        .global_object()
        .get("Iterator", context)
        .unwrap();
    let prototype = iterator.get_v("prototype", context).unwrap();
    prototype.get_v(name, context).unwrap()
}

fn iterator_static(context: &mut Context, name: &str) -> (JsValue, JsValue) {
    let iterator = context
        .global_object()
        .get("Iterator", context)
        .unwrap();
    let method = iterator.get_v(name, context).unwrap();
    (iterator, method)
}

fn thrower(context: &mut Context) -> JsValue {
    FunctionObjectBuilder::new(
        context,
        NativeFunction::from_fn_ptr(|_, _, _| {
            Err(paserati_engine::JsNativeError::error()
                .with_message("callback exploded")
                .into())
        }),
    )
    .build()
    .into()
}

fn numbers(context: &mut Context, values: &[i32]) -> JsValue {
    Array::create_array_from_list(values.iter().map(|v| JsValue::from(*v)), context).into()
}

fn collect_iterator(context: &mut Context, iterator: &JsValue) -> Vec<JsValue> {
    let next = iterator.get_v("next", context).unwrap();
    let mut out = Vec::new();
    loop {
        let result = next.call(iterator, &[], context).unwrap();
        if result.get_v("done", context).unwrap().to_boolean() {
            return out;
        }
        out.push(result.get_v("value", context).unwrap());
    }
}

#[test]
fn from_to_array_preserves_the_sequence() {
    let mut context = Context::new();
    let nexts = Rc::new(Cell::new(0));
    let returns = Rc::new(Cell::new(0));
    let it = counting_iterator(
        &mut context,
        vec![JsValue::new(1), JsValue::new(2), JsValue::new(3)],
        nexts,
        returns,
    );

    let (iterator, from) = iterator_static(&mut context, "from");
    let wrapped = from.call(&iterator, &[it], &mut context).unwrap();
    let to_array = wrapped.get_v("toArray", &mut context).unwrap();
    let collected = to_array.call(&wrapped, &[], &mut context).unwrap();

    let collected = collected.as_object().unwrap();
    assert_eq!(
        collected.get("length", &mut context).unwrap(),
        JsValue::new(3)
    );
    assert_eq!(collected.get(0u32, &mut context).unwrap(), JsValue::new(1));
    assert_eq!(collected.get(2u32, &mut context).unwrap(), JsValue::new(3));
}

#[test]
fn helpers_are_lazy() {
    let mut context = Context::new();
    let calls = Rc::new(Cell::new(0usize));

    let mapper = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_closure_with_captures(
            |_, args, calls: &Rc<Cell<usize>>, _| {
                calls.set(calls.get() + 1);
                Ok(args[0].clone())
            },
            calls.clone(),
        ),
    )
    .build();

    let nexts = Rc::new(Cell::new(0));
    let returns = Rc::new(Cell::new(0));
    let it = counting_iterator(
        &mut context,
        (1..=10).map(JsValue::from).collect(),
        nexts,
        returns,
    );

    let map = iterator_proto_method(&mut context, "map");
    let mapped = map.call(&it, &[mapper.into()], &mut context).unwrap();
    let take = mapped.get_v("take", &mut context).unwrap();
    let taken = take.call(&mapped, &[JsValue::new(3)], &mut context).unwrap();
    let to_array = taken.get_v("toArray", &mut context).unwrap();
    let collected = to_array.call(&taken, &[], &mut context).unwrap();

    // The mapper ran exactly once per taken element.
    assert_eq!(calls.get(), 3);
    let collected = collected.as_object().unwrap();
    assert_eq!(
        collected.get("length", &mut context).unwrap(),
        JsValue::new(3)
    );
}

#[test]
fn short_circuits_close_the_upstream_exactly_once() {
    for method in ["some", "every", "find"] {
        let mut context = Context::new();
        let returns = Rc::new(Cell::new(0));
        let it = counting_iterator(
            &mut context,
            vec![JsValue::new(1), JsValue::new(2)],
            Rc::new(Cell::new(0)),
            returns.clone(),
        );

        let thrower = thrower(&mut context);
        let function = iterator_proto_method(&mut context, method);
        let result = function.call(&it, &[thrower], &mut context);

        assert!(result.is_err(), "{method} should propagate the throw");
        assert_eq!(returns.get(), 1, "{method} should close the upstream once");
    }
}

#[test]
fn mapper_errors_close_the_upstream() {
    let mut context = Context::new();
    let returns = Rc::new(Cell::new(0));
    let it = counting_iterator(
        &mut context,
        vec![JsValue::new(1), JsValue::new(2)],
        Rc::new(Cell::new(0)),
        returns.clone(),
    );

    let thrower = thrower(&mut context);
    let map = iterator_proto_method(&mut context, "map");
    let mapped = map.call(&it, &[thrower], &mut context).unwrap();
    let to_array = mapped.get_v("toArray", &mut context).unwrap();
    let result = to_array.call(&mapped, &[], &mut context);

    assert!(result.is_err());
    assert_eq!(returns.get(), 1);
}

#[test]
fn helper_return_closes_the_upstream() {
    let mut context = Context::new();
    let returns = Rc::new(Cell::new(0));
    let it = counting_iterator(
        &mut context,
        vec![JsValue::new(1), JsValue::new(2)],
        Rc::new(Cell::new(0)),
        returns.clone(),
    );

    let drop_method = iterator_proto_method(&mut context, "drop");
    let dropped = drop_method.call(&it, &[JsValue::new(1)], &mut context).unwrap();
    let r#return = dropped.get_v("return", &mut context).unwrap();
    r#return.call(&dropped, &[], &mut context).unwrap();
    assert_eq!(returns.get(), 1);

    // The helper stays exhausted afterwards.
    let next = dropped.get_v("next", &mut context).unwrap();
    let result = next.call(&dropped, &[], &mut context).unwrap();
    assert!(result.get_v("done", &mut context).unwrap().to_boolean());
}

#[test]
fn zip_shortest_matches_the_shorter_input() {
    let mut context = Context::new();
    let a = numbers(&mut context, &[1, 2, 3]);
    let b = Array::create_array_from_list(
        [JsValue::new("a"), JsValue::new("b")],
        &mut context,
    );
    let iterables = Array::create_array_from_list([a, b.into()], &mut context);

    let (iterator, zip) = iterator_static(&mut context, "zip");
    let zipped = zip
        .call(&iterator, &[iterables.into()], &mut context)
        .unwrap();
    let rows = collect_iterator(&mut context, &zipped);

    assert_eq!(rows.len(), 2);
    let first = rows[0].as_object().unwrap();
    assert_eq!(first.get(0u32, &mut context).unwrap(), JsValue::new(1));
    assert_eq!(first.get(1u32, &mut context).unwrap(), JsValue::new("a"));
    let second = rows[1].as_object().unwrap();
    assert_eq!(second.get(0u32, &mut context).unwrap(), JsValue::new(2));
    assert_eq!(second.get(1u32, &mut context).unwrap(), JsValue::new("b"));
}

fn zip_options(context: &mut Context, mode: &str, padding: Option<JsValue>) -> JsValue {
    let options = JsObject::with_object_proto(context.intrinsics());
    options
        .create_data_property_or_throw("mode", mode, context)
        .unwrap();
    if let Some(padding) = padding {
        options
            .create_data_property_or_throw("padding", padding, context)
            .unwrap();
    }
    options.into()
}

#[test]
fn zip_longest_pads_the_shorter_input() {
    let mut context = Context::new();
    let a = numbers(&mut context, &[1, 2, 3]);
    let b = Array::create_array_from_list(
        [JsValue::new("a"), JsValue::new("b")],
        &mut context,
    );
    let iterables = Array::create_array_from_list([a, b.into()], &mut context);
    let padding = Array::create_array_from_list(
        [JsValue::new(0), JsValue::new("z")],
        &mut context,
    );
    let options = zip_options(&mut context, "longest", Some(padding.into()));

    let (iterator, zip) = iterator_static(&mut context, "zip");
    let zipped = zip
        .call(&iterator, &[iterables.into(), options], &mut context)
        .unwrap();
    let rows = collect_iterator(&mut context, &zipped);

    assert_eq!(rows.len(), 3);
    let last = rows[2].as_object().unwrap();
    assert_eq!(last.get(0u32, &mut context).unwrap(), JsValue::new(3));
    assert_eq!(last.get(1u32, &mut context).unwrap(), JsValue::new("z"));
}

#[test]
fn zip_strict_raises_on_length_mismatch() {
    let mut context = Context::new();
    let a = numbers(&mut context, &[1, 2, 3]);
    let b = Array::create_array_from_list(
        [JsValue::new("a"), JsValue::new("b")],
        &mut context,
    );
    let iterables = Array::create_array_from_list([a, b.into()], &mut context);
    let options = zip_options(&mut context, "strict", None);

    let (iterator, zip) = iterator_static(&mut context, "zip");
    let zipped = zip
        .call(&iterator, &[iterables.into(), options], &mut context)
        .unwrap();

    let next = zipped.get_v("next", &mut context).unwrap();
    next.call(&zipped, &[], &mut context).unwrap();
    next.call(&zipped, &[], &mut context).unwrap();
    let err = next.call(&zipped, &[], &mut context).unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );
}

#[test]
fn zip_shortest_closes_the_longer_input() {
    let mut context = Context::new();
    let returns = Rc::new(Cell::new(0));
    let long = counting_iterator(
        &mut context,
        (1..=5).map(JsValue::from).collect(),
        Rc::new(Cell::new(0)),
        returns.clone(),
    );
    let short = Array::create_array_from_list([], &mut context);
    let iterables = Array::create_array_from_list([long, short.into()], &mut context);

    let (iterator, zip) = iterator_static(&mut context, "zip");
    let zipped = zip
        .call(&iterator, &[iterables.into()], &mut context)
        .unwrap();

    let next = zipped.get_v("next", &mut context).unwrap();
    let result = next.call(&zipped, &[], &mut context).unwrap();
    assert!(result.get_v("done", &mut context).unwrap().to_boolean());
    assert_eq!(returns.get(), 1);
}

#[test]
fn zip_keyed_builds_keyed_rows() {
    let mut context = Context::new();
    let sources = JsObject::with_object_proto(context.intrinsics());
    let xs = numbers(&mut context, &[1, 2]);
    let ys = numbers(&mut context, &[10, 20]);
    sources
        .create_data_property_or_throw("x", xs, &mut context)
        .unwrap();
    sources
        .create_data_property_or_throw("y", ys, &mut context)
        .unwrap();

    let (iterator, zip_keyed) = iterator_static(&mut context, "zipKeyed");
    let zipped = zip_keyed
        .call(&iterator, &[sources.into()], &mut context)
        .unwrap();
    let rows = collect_iterator(&mut context, &zipped);

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get_v("x", &mut context).unwrap(), JsValue::new(1));
    assert_eq!(rows[0].get_v("y", &mut context).unwrap(), JsValue::new(10));
    assert_eq!(rows[1].get_v("x", &mut context).unwrap(), JsValue::new(2));
    assert_eq!(rows[1].get_v("y", &mut context).unwrap(), JsValue::new(20));
}

#[test]
fn concat_chains_iterables_in_order() {
    let mut context = Context::new();
    let a = numbers(&mut context, &[1, 2]);
    let b = numbers(&mut context, &[3]);

    let (iterator, concat) = iterator_static(&mut context, "concat");
    let chained = concat.call(&iterator, &[a, b], &mut context).unwrap();
    let values = collect_iterator(&mut context, &chained);
    assert_eq!(
        values,
        vec![JsValue::new(1), JsValue::new(2), JsValue::new(3)]
    );
}

#[test]
fn concat_rejects_non_iterable_arguments() {
    let mut context = Context::new();
    let (iterator, concat) = iterator_static(&mut context, "concat");
    let err = concat
        .call(&iterator, &[JsValue::new(5)], &mut context)
        .unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );
}

#[test]
fn reduce_of_empty_iterator_without_initial_value_raises() {
    let mut context = Context::new();
    let it = counting_iterator(
        &mut context,
        Vec::new(),
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
    );

    let adder = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|_, args, context| {
            let a = args[0].to_number(context)?;
            let b = args[1].to_number(context)?;
            Ok(JsValue::from(a + b))
        }),
    )
    .build();

    let reduce = iterator_proto_method(&mut context, "reduce");
    let err = reduce.call(&it, &[adder.clone().into()], &mut context).unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );

    // With an initial value the empty iterator reduces to it.
    let it = counting_iterator(
        &mut context,
        Vec::new(),
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
    );
    let result = reduce
        .call(&it, &[adder.into(), JsValue::new(7)], &mut context)
        .unwrap();
    assert_eq!(result, JsValue::new(7));
}

#[test]
fn take_with_nan_or_negative_limit_raises_range_error() {
    let mut context = Context::new();
    for limit in [JsValue::nan(), JsValue::new(-1)] {
        let it = counting_iterator(
            &mut context,
            Vec::new(),
            Rc::new(Cell::new(0)),
            Rc::new(Cell::new(0)),
        );
        let take = iterator_proto_method(&mut context, "take");
        let err = take.call(&it, &[limit], &mut context).unwrap_err();
        assert_eq!(
            err.as_native().unwrap().kind,
            paserati_engine::error::JsNativeErrorKind::Range
        );
    }
}

#[test]
fn flat_map_flattens_inner_iterables() {
    let mut context = Context::new();
    let it = counting_iterator(
        &mut context,
        vec![JsValue::new(1), JsValue::new(2)],
        Rc::new(Cell::new(0)),
        Rc::new(Cell::new(0)),
    );

    let duplicate = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|_, args, context| {
            let value = args[0].clone();
            Ok(Array::create_array_from_list([value.clone(), value], context).into())
        }),
    )
    .build();

    let flat_map = iterator_proto_method(&mut context, "flatMap");
    let flattened = flat_map.call(&it, &[duplicate.into()], &mut context).unwrap();
    let values = collect_iterator(&mut context, &flattened);
    assert_eq!(
        values,
        vec![
            JsValue::new(1),
            JsValue::new(1),
            JsValue::new(2),
            JsValue::new(2)
        ]
    );
}

#[test]
fn dispose_invokes_return() {
    let mut context = Context::new();
    let returns = Rc::new(Cell::new(0));
    let it = counting_iterator(
        &mut context,
        vec![JsValue::new(1)],
        Rc::new(Cell::new(0)),
        returns.clone(),
    );

    let iterator = context
        .global_object()
        .get("Iterator", &mut context)
        .unwrap();
    let prototype = iterator.get_v("prototype", &mut context).unwrap();
    let symbol_constructor = context
        .global_object()
        .get("Symbol", &mut context)
        .unwrap();
    let dispose_symbol = symbol_constructor.get_v("dispose", &mut context).unwrap();
    let dispose = prototype
        .get_v(
            dispose_symbol.as_symbol().expect("dispose is a symbol"),
            &mut context,
        )
        .unwrap();

    dispose.call(&it, &[], &mut context).unwrap();
    assert_eq!(returns.get(), 1);
}
