//! Tests of `ArrayBuffer`, `DataView` endianness and typed-array views.

use paserati_engine::{bigint::JsBigInt, Context, JsValue};

fn new_buffer(context: &mut Context, len: i32) -> JsValue {
    let constructor = context
        .intrinsics()
        .constructors()
        .array_buffer()
        .constructor();
    constructor
        .construct(&[JsValue::new(len)], None, context)
        .unwrap()
        .into()
}

fn new_data_view(context: &mut Context, buffer: JsValue) -> JsValue {
    let constructor = context
        .intrinsics()
        .constructors()
        .data_view()
        .constructor();
    constructor
        .construct(&[buffer], None, context)
        .unwrap()
        .into()
}

#[test]
fn int32_round_trips_in_both_endiannesses() {
    let mut context = Context::new();
    let buffer = new_buffer(&mut context, 8);
    let view = new_data_view(&mut context, buffer);

    for little_endian in [true, false] {
        for offset in 0..4 {
            let n = JsValue::new(0x0102_0304);
            view.invoke(
                "setInt32",
                &[JsValue::new(offset), n.clone(), JsValue::new(little_endian)],
                &mut context,
            )
            .unwrap();
            let read = view
                .invoke(
                    "getInt32",
                    &[JsValue::new(offset), JsValue::new(little_endian)],
                    &mut context,
                )
                .unwrap();
            assert_eq!(read, n);
        }
    }
}

#[test]
fn big_endian_is_the_default() {
    let mut context = Context::new();
    let buffer = new_buffer(&mut context, 4);
    let view = new_data_view(&mut context, buffer);

    // Omitting the flag writes big-endian.
    view.invoke(
        "setInt32",
        &[JsValue::new(0), JsValue::new(0x0102_0304)],
        &mut context,
    )
    .unwrap();

    let first = view
        .invoke("getUint8", &[JsValue::new(0)], &mut context)
        .unwrap();
    assert_eq!(first, JsValue::new(1));

    // The same write little-endian puts the low byte first.
    view.invoke(
        "setInt32",
        &[JsValue::new(0), JsValue::new(0x0102_0304), JsValue::new(true)],
        &mut context,
    )
    .unwrap();
    let first = view
        .invoke("getUint8", &[JsValue::new(0)], &mut context)
        .unwrap();
    assert_eq!(first, JsValue::new(4));
}

#[test]
fn out_of_bounds_accesses_raise_range_errors() {
    let mut context = Context::new();
    let buffer = new_buffer(&mut context, 4);
    let view = new_data_view(&mut context, buffer);

    let err = view
        .invoke("getInt32", &[JsValue::new(1)], &mut context)
        .unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Range
    );
}

#[test]
fn detached_buffers_raise_type_errors() {
    let mut context = Context::new();
    let buffer = new_buffer(&mut context, 4);
    let view = new_data_view(&mut context, buffer.clone());

    // `transfer` moves the storage out and detaches the original.
    buffer.invoke("transfer", &[], &mut context).unwrap();

    let err = view
        .invoke("getInt8", &[JsValue::new(0)], &mut context)
        .unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );
}

#[test]
fn bigint_accessors_round_trip() {
    let mut context = Context::new();
    let buffer = new_buffer(&mut context, 8);
    let view = new_data_view(&mut context, buffer);

    let value = JsValue::from(JsBigInt::from(-123_456_789_012_345i64));
    view.invoke(
        "setBigInt64",
        &[JsValue::new(0), value.clone(), JsValue::new(true)],
        &mut context,
    )
    .unwrap();
    let read = view
        .invoke(
            "getBigInt64",
            &[JsValue::new(0), JsValue::new(true)],
            &mut context,
        )
        .unwrap();
    assert_eq!(read, value);

    // Number arguments to the BigInt accessors are rejected.
    let err = view
        .invoke(
            "setBigInt64",
            &[JsValue::new(0), JsValue::new(1)],
            &mut context,
        )
        .unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );
}

#[test]
fn typed_arrays_share_their_buffer_with_views() {
    let mut context = Context::new();
    let constructor = context
        .intrinsics()
        .constructors()
        .int32_array()
        .constructor();
    let array: JsValue = constructor
        .construct(&[JsValue::new(4)], None, &mut context)
        .unwrap()
        .into();

    assert_eq!(
        array.get_v("length", &mut context).unwrap(),
        JsValue::new(4)
    );
    assert_eq!(
        array.get_v("byteLength", &mut context).unwrap(),
        JsValue::new(16)
    );

    // Writes through the typed array are visible through a DataView on the
    // same buffer.
    let array_obj = array.as_object().unwrap();
    array_obj.set(0u32, 7, true, &mut context).unwrap();

    let buffer = array.get_v("buffer", &mut context).unwrap();
    let view = new_data_view(&mut context, buffer);
    let read = view
        .invoke(
            "getInt32",
            &[JsValue::new(0), JsValue::new(cfg!(target_endian = "little"))],
            &mut context,
        )
        .unwrap();
    assert_eq!(read, JsValue::new(7));
}

#[test]
fn typed_array_constructors_accept_iterables() {
    let mut context = Context::new();
    let source = paserati_engine::builtins::array::Array::create_array_from_list(
        [JsValue::new(1), JsValue::new(-1), JsValue::new(300)],
        &mut context,
    );
    let constructor = context
        .intrinsics()
        .constructors()
        .uint8_array()
        .constructor();
    let array: JsValue = constructor
        .construct(&[source.into()], None, &mut context)
        .unwrap()
        .into();

    let obj = array.as_object().unwrap();
    assert_eq!(obj.get(0u32, &mut context).unwrap(), JsValue::new(1));
    // -1 wraps, 300 truncates modulo 256.
    assert_eq!(obj.get(1u32, &mut context).unwrap(), JsValue::new(255));
    assert_eq!(obj.get(2u32, &mut context).unwrap(), JsValue::new(44));
}

#[test]
fn subarray_views_and_slice_copies() {
    let mut context = Context::new();
    let source = paserati_engine::builtins::array::Array::create_array_from_list(
        [1, 2, 3, 4].map(JsValue::new),
        &mut context,
    );
    let constructor = context
        .intrinsics()
        .constructors()
        .int32_array()
        .constructor();
    let array: JsValue = constructor
        .construct(&[source.into()], None, &mut context)
        .unwrap()
        .into();

    let sub = array
        .invoke("subarray", &[JsValue::new(1), JsValue::new(3)], &mut context)
        .unwrap();
    let copy = array
        .invoke("slice", &[JsValue::new(1), JsValue::new(3)], &mut context)
        .unwrap();

    // Mutating the source is visible through the subarray view, not the
    // copy.
    array
        .as_object()
        .unwrap()
        .set(1u32, 99, true, &mut context)
        .unwrap();

    let sub_obj = sub.as_object().unwrap();
    assert_eq!(sub_obj.get(0u32, &mut context).unwrap(), JsValue::new(99));
    let copy_obj = copy.as_object().unwrap();
    assert_eq!(copy_obj.get(0u32, &mut context).unwrap(), JsValue::new(2));
}
