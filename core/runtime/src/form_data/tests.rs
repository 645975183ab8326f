use super::FormData;
use paserati_engine::{Context, JsValue};

fn form_data_context() -> (Context, JsValue) {
    let mut context = Context::new();
    FormData::register(&mut context).unwrap();
    let constructor = context
        .global_object()
        .get("FormData", &mut context)
        .unwrap();
    let instance = constructor
        .as_object()
        .unwrap()
        .construct(&[], None, &mut context)
        .unwrap();
    (context, instance.into())
}

#[test]
fn append_accumulates_and_get_returns_the_first() {
    let (mut context, form) = form_data_context();

    form.invoke(
        "append",
        &[JsValue::new("tag"), JsValue::new("a")],
        &mut context,
    )
    .unwrap();
    form.invoke(
        "append",
        &[JsValue::new("tag"), JsValue::new("b")],
        &mut context,
    )
    .unwrap();

    let got = form
        .invoke("get", &[JsValue::new("tag")], &mut context)
        .unwrap();
    assert_eq!(got, JsValue::new("a"));

    let all = form
        .invoke("getAll", &[JsValue::new("tag")], &mut context)
        .unwrap();
    assert_eq!(all.get_v("length", &mut context).unwrap(), JsValue::new(2));

    // A missing entry answers null.
    let missing = form
        .invoke("get", &[JsValue::new("nope")], &mut context)
        .unwrap();
    assert!(missing.is_null());
}

#[test]
fn set_replaces_in_place() {
    let (mut context, form) = form_data_context();
    for value in ["a", "b"] {
        form.invoke(
            "append",
            &[JsValue::new("tag"), JsValue::new(value)],
            &mut context,
        )
        .unwrap();
    }
    form.invoke(
        "append",
        &[JsValue::new("other"), JsValue::new("x")],
        &mut context,
    )
    .unwrap();

    form.invoke(
        "set",
        &[JsValue::new("tag"), JsValue::new("z")],
        &mut context,
    )
    .unwrap();

    let all = form
        .invoke("getAll", &[JsValue::new("tag")], &mut context)
        .unwrap();
    assert_eq!(all.get_v("length", &mut context).unwrap(), JsValue::new(1));
    assert_eq!(all.get_v(0u32, &mut context).unwrap(), JsValue::new("z"));

    // Entry order is preserved: "tag" still precedes "other".
    let keys = form.invoke("keys", &[], &mut context).unwrap();
    let next = keys.get_v("next", &mut context).unwrap();
    let first = next.call(&keys, &[], &mut context).unwrap();
    assert_eq!(
        first.get_v("value", &mut context).unwrap(),
        JsValue::new("tag")
    );
}

#[test]
fn delete_and_has() {
    let (mut context, form) = form_data_context();
    form.invoke(
        "append",
        &[JsValue::new("tag"), JsValue::new("a")],
        &mut context,
    )
    .unwrap();

    let has = form
        .invoke("has", &[JsValue::new("tag")], &mut context)
        .unwrap();
    assert_eq!(has, JsValue::new(true));

    form.invoke("delete", &[JsValue::new("tag")], &mut context)
        .unwrap();
    let has = form
        .invoke("has", &[JsValue::new("tag")], &mut context)
        .unwrap();
    assert_eq!(has, JsValue::new(false));
}

#[test]
fn entries_iterate_in_insertion_order() {
    let (mut context, form) = form_data_context();
    for (name, value) in [("a", 1), ("b", 2)] {
        form.invoke(
            "append",
            &[JsValue::new(name), JsValue::new(value)],
            &mut context,
        )
        .unwrap();
    }

    let entries = form.invoke("entries", &[], &mut context).unwrap();
    let next = entries.get_v("next", &mut context).unwrap();

    let first = next.call(&entries, &[], &mut context).unwrap();
    let pair = first.get_v("value", &mut context).unwrap();
    assert_eq!(pair.get_v(0u32, &mut context).unwrap(), JsValue::new("a"));
    assert_eq!(pair.get_v(1u32, &mut context).unwrap(), JsValue::new(1));

    let second = next.call(&entries, &[], &mut context).unwrap();
    let pair = second.get_v("value", &mut context).unwrap();
    assert_eq!(pair.get_v(0u32, &mut context).unwrap(), JsValue::new("b"));

    let done = next.call(&entries, &[], &mut context).unwrap();
    assert!(done.get_v("done", &mut context).unwrap().to_boolean());
}
