use crate::{Context, JsValue};

fn construct_date(context: &mut Context, args: &[JsValue]) -> JsValue {
    let constructor = context.intrinsics().constructors().date().constructor();
    constructor
        .clone()
        .construct(args, None, context)
        .unwrap()
        .into()
}

#[test]
fn iso_string_round_trip() {
    let mut context = Context::new();
    let date = construct_date(&mut context, &[JsValue::new(1_136_214_245_123f64)]);

    let iso = date.invoke("toISOString", &[], &mut context).unwrap();
    assert_eq!(iso, JsValue::new("2006-01-02T15:04:05.123Z"));

    let reparsed = construct_date(&mut context, &[iso]);
    let time = reparsed.invoke("getTime", &[], &mut context).unwrap();
    assert_eq!(time, JsValue::new(1_136_214_245_123f64));
}

#[test]
fn to_string_format() {
    let mut context = Context::new();
    let date = construct_date(&mut context, &[JsValue::new(1_136_214_245_000f64)]);
    let rendered = date.invoke("toString", &[], &mut context).unwrap();
    assert_eq!(
        rendered,
        JsValue::new("Mon Jan 02 2006 15:04:05 GMT+0000 (UTC)")
    );
}

#[test]
fn invalid_parses_produce_nan() {
    let mut context = Context::new();
    let date = construct_date(&mut context, &[JsValue::new("definitely not a date")]);
    let time = date.invoke("getTime", &[], &mut context).unwrap();
    assert!(time.as_number().unwrap().is_nan());

    let month = date.invoke("getMonth", &[], &mut context).unwrap();
    assert!(month.as_number().unwrap().is_nan());

    let err = date.invoke("toISOString", &[], &mut context).unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        crate::error::JsNativeErrorKind::Range
    );
}

#[test]
fn field_constructor_and_getters() {
    let mut context = Context::new();
    let date = construct_date(
        &mut context,
        &[
            JsValue::new(2006),
            JsValue::new(0),
            JsValue::new(2),
            JsValue::new(15),
            JsValue::new(4),
            JsValue::new(5),
        ],
    );
    assert_eq!(
        date.invoke("getFullYear", &[], &mut context).unwrap(),
        JsValue::new(2006)
    );
    assert_eq!(
        date.invoke("getMonth", &[], &mut context).unwrap(),
        JsValue::new(0)
    );
    assert_eq!(
        date.invoke("getDate", &[], &mut context).unwrap(),
        JsValue::new(2)
    );
    assert_eq!(
        date.invoke("getDay", &[], &mut context).unwrap(),
        JsValue::new(1)
    );
    // UTC getters equal their local counterparts in the UTC-only core.
    assert_eq!(
        date.invoke("getUTCHours", &[], &mut context).unwrap(),
        JsValue::new(15)
    );
    assert_eq!(
        date.invoke("getTimezoneOffset", &[], &mut context).unwrap(),
        JsValue::new(0)
    );
}

#[test]
fn utc_setters_alias_the_local_setters() {
    let mut context = Context::new();
    let date = construct_date(&mut context, &[JsValue::new(0f64)]);

    date.invoke("setUTCFullYear", &[JsValue::new(2006)], &mut context)
        .unwrap();
    date.invoke("setUTCMonth", &[JsValue::new(0)], &mut context)
        .unwrap();
    date.invoke("setUTCDate", &[JsValue::new(2)], &mut context)
        .unwrap();
    date.invoke(
        "setUTCHours",
        &[JsValue::new(15), JsValue::new(4), JsValue::new(5)],
        &mut context,
    )
    .unwrap();

    assert_eq!(
        date.invoke("getTime", &[], &mut context).unwrap(),
        JsValue::new(1_136_214_245_000f64)
    );

    date.invoke("setUTCMilliseconds", &[JsValue::new(250)], &mut context)
        .unwrap();
    assert_eq!(
        date.invoke("getUTCMilliseconds", &[], &mut context).unwrap(),
        JsValue::new(250)
    );

    // Every local setter has its UTC counterpart installed.
    for (local, utc) in [
        ("setFullYear", "setUTCFullYear"),
        ("setMonth", "setUTCMonth"),
        ("setDate", "setUTCDate"),
        ("setHours", "setUTCHours"),
        ("setMinutes", "setUTCMinutes"),
        ("setSeconds", "setUTCSeconds"),
        ("setMilliseconds", "setUTCMilliseconds"),
    ] {
        let local = date.get_v(local, &mut context).unwrap();
        let utc = date.get_v(utc, &mut context).unwrap();
        assert!(local.is_callable() && utc.is_callable());
    }
}

#[test]
fn setters_rebuild_the_timestamp() {
    let mut context = Context::new();
    let date = construct_date(&mut context, &[JsValue::new(0f64)]);

    date.invoke("setFullYear", &[JsValue::new(2000)], &mut context)
        .unwrap();
    assert_eq!(
        date.invoke("getFullYear", &[], &mut context).unwrap(),
        JsValue::new(2000)
    );

    date.invoke("setMonth", &[JsValue::new(11)], &mut context)
        .unwrap();
    assert_eq!(
        date.invoke("getMonth", &[], &mut context).unwrap(),
        JsValue::new(11)
    );

    // Overflowing fields carry over.
    date.invoke("setDate", &[JsValue::new(32)], &mut context)
        .unwrap();
    assert_eq!(
        date.invoke("getFullYear", &[], &mut context).unwrap(),
        JsValue::new(2001)
    );
    assert_eq!(
        date.invoke("getMonth", &[], &mut context).unwrap(),
        JsValue::new(0)
    );
}
