use super::Performance;
use paserati_engine::{Context, JsValue};

fn performance_context() -> Context {
    let mut context = Context::new();
    Performance::register(&mut context).unwrap();
    context
}

fn performance_object(context: &mut Context) -> JsValue {
    context
        .global_object()
        .get("performance", context)
        .unwrap()
}

#[test]
fn now_is_monotonic() {
    let mut context = performance_context();
    let performance = performance_object(&mut context);
    let first = performance
        .invoke("now", &[], &mut context)
        .unwrap()
        .as_number()
        .unwrap();
    let second = performance
        .invoke("now", &[], &mut context)
        .unwrap()
        .as_number()
        .unwrap();
    assert!(second >= first);
    assert!(first >= 0.0);
}

#[test]
fn marks_and_measures_are_queryable() {
    let mut context = performance_context();
    let performance = performance_object(&mut context);

    performance
        .invoke("mark", &[JsValue::new("start")], &mut context)
        .unwrap();
    performance
        .invoke("mark", &[JsValue::new("end")], &mut context)
        .unwrap();
    let measure = performance
        .invoke(
            "measure",
            &[
                JsValue::new("span"),
                JsValue::new("start"),
                JsValue::new("end"),
            ],
            &mut context,
        )
        .unwrap();
    assert_eq!(
        measure.get_v("entryType", &mut context).unwrap(),
        JsValue::new("measure")
    );
    assert!(
        measure
            .get_v("duration", &mut context)
            .unwrap()
            .as_number()
            .unwrap()
            >= 0.0
    );

    let marks = performance
        .invoke("getEntriesByType", &[JsValue::new("mark")], &mut context)
        .unwrap();
    assert_eq!(
        marks.get_v("length", &mut context).unwrap(),
        JsValue::new(2)
    );

    let by_name = performance
        .invoke("getEntriesByName", &[JsValue::new("span")], &mut context)
        .unwrap();
    assert_eq!(
        by_name.get_v("length", &mut context).unwrap(),
        JsValue::new(1)
    );
}

#[test]
fn measuring_against_a_missing_mark_fails() {
    let mut context = performance_context();
    let performance = performance_object(&mut context);
    let err = performance
        .invoke(
            "measure",
            &[JsValue::new("span"), JsValue::new("nope")],
            &mut context,
        )
        .unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );
}

#[test]
fn clear_marks_removes_only_marks() {
    let mut context = performance_context();
    let performance = performance_object(&mut context);

    performance
        .invoke("mark", &[JsValue::new("a")], &mut context)
        .unwrap();
    performance
        .invoke("measure", &[JsValue::new("m")], &mut context)
        .unwrap();
    performance.invoke("clearMarks", &[], &mut context).unwrap();

    let entries = performance.invoke("getEntries", &[], &mut context).unwrap();
    assert_eq!(
        entries.get_v("length", &mut context).unwrap(),
        JsValue::new(1)
    );
    let entry = entries.get_v(0u32, &mut context).unwrap();
    assert_eq!(
        entry.get_v("entryType", &mut context).unwrap(),
        JsValue::new("measure")
    );
}
