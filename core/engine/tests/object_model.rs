//! Tests of the object model: descriptor invariants, accessor receivers,
//! prototype chains and proxy trap routing.

use paserati_engine::{
    object::{FunctionObjectBuilder, JsObject},
    property::PropertyDescriptor,
    Context, JsValue, NativeFunction,
};

#[test]
fn non_configurable_descriptors_cannot_be_reshaped() {
    let mut context = Context::new();
    let obj = JsObject::with_object_proto(context.intrinsics());

    obj.define_property_or_throw(
        "x",
        PropertyDescriptor::builder()
            .value(1)
            .writable(true)
            .enumerable(true)
            .configurable(false),
        &mut context,
    )
    .unwrap();

    // Flipping configurability back is rejected.
    let err = obj.define_property_or_throw(
        "x",
        PropertyDescriptor::builder().configurable(true),
        &mut context,
    );
    assert!(err.is_err());

    // writable: true -> false is the one permitted reshape.
    obj.define_property_or_throw(
        "x",
        PropertyDescriptor::builder().writable(false),
        &mut context,
    )
    .unwrap();

    // ...and it cannot be undone.
    let err = obj.define_property_or_throw(
        "x",
        PropertyDescriptor::builder().writable(true),
        &mut context,
    );
    assert!(err.is_err());
}

#[test]
fn delete_fails_on_non_configurable_properties() {
    let mut context = Context::new();
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.define_property_or_throw(
        "locked",
        PropertyDescriptor::builder()
            .value(1)
            .writable(true)
            .enumerable(true)
            .configurable(false),
        &mut context,
    )
    .unwrap();

    assert!(obj.delete_property_or_throw("locked", &mut context).is_err());
    assert_eq!(obj.get("locked", &mut context).unwrap(), JsValue::new(1));
}

#[test]
fn getters_run_with_the_original_receiver() {
    let mut context = Context::new();

    // The accessor lives on the prototype but reads `this.tag`.
    let prototype = JsObject::with_object_proto(context.intrinsics());
    let getter = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|this, _, context| this.get_v("tag", context)),
    )
    .build();
    prototype
        .define_property_or_throw(
            "described",
            PropertyDescriptor::builder()
                .get(getter)
                .enumerable(true)
                .configurable(true),
            &mut context,
        )
        .unwrap();

    let instance = JsObject::from_proto_and_data(
        Some(prototype),
        paserati_engine::object::ObjectData::ordinary(),
    );
    instance
        .create_data_property_or_throw("tag", "instance", &mut context)
        .unwrap();

    let described = instance.get("described", &mut context).unwrap();
    assert_eq!(described, JsValue::new("instance"));
}

#[test]
fn insertion_order_survives_deletion() {
    let mut context = Context::new();
    let obj = JsObject::with_object_proto(context.intrinsics());
    for key in ["a", "b", "c", "d"] {
        obj.create_data_property_or_throw(key, key, &mut context)
            .unwrap();
    }
    obj.delete_property_or_throw("b", &mut context).unwrap();
    obj.create_data_property_or_throw("e", "e", &mut context)
        .unwrap();

    let keys = obj.enumerable_own_string_keys(&mut context).unwrap();
    let keys: Vec<String> = keys
        .into_iter()
        .map(|(key, _)| key.as_string().unwrap().to_std_string())
        .collect();
    assert_eq!(keys, vec!["a", "c", "d", "e"]);
}

#[test]
fn proxy_get_trap_intercepts_and_falls_through() {
    let mut context = Context::new();

    let target = JsObject::with_object_proto(context.intrinsics());
    target
        .create_data_property_or_throw("present", 1, &mut context)
        .unwrap();

    let handler = JsObject::with_object_proto(context.intrinsics());
    let get_trap = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|_, args, context| {
            // (target, key, receiver)
            let key = args[1].clone();
            let target = args[0].as_object().unwrap().clone();
            if key == JsValue::new("intercepted") {
                return Ok(JsValue::new(42));
            }
            let key = key.to_property_key(context)?;
            target.get(key, context)
        }),
    )
    .build();
    handler
        .create_data_property_or_throw("get", get_trap, &mut context)
        .unwrap();

    let proxy_constructor = context
        .global_object()
        .get("Proxy", &mut context)
        .unwrap();
    let proxy = proxy_constructor
        .as_object()
        .unwrap()
        .construct(&[target.into(), handler.into()], None, &mut context)
        .unwrap();

    let proxy_value: JsValue = proxy.into();
    assert_eq!(
        proxy_value.get_v("intercepted", &mut context).unwrap(),
        JsValue::new(42)
    );
    assert_eq!(
        proxy_value.get_v("present", &mut context).unwrap(),
        JsValue::new(1)
    );
}

#[test]
fn revoked_proxies_raise_type_errors() {
    let mut context = Context::new();
    let target = JsObject::with_object_proto(context.intrinsics());
    let handler = JsObject::with_object_proto(context.intrinsics());

    let proxy_constructor = context
        .global_object()
        .get("Proxy", &mut context)
        .unwrap();
    let revocable = proxy_constructor
        .get_v("revocable", &mut context)
        .unwrap();
    let record = revocable
        .call(
            &proxy_constructor,
            &[target.into(), handler.into()],
            &mut context,
        )
        .unwrap();

    let proxy = record.get_v("proxy", &mut context).unwrap();
    let revoke = record.get_v("revoke", &mut context).unwrap();

    // Live proxies pass through to the target.
    assert!(proxy.get_v("missing", &mut context).unwrap().is_undefined());

    revoke.call(&JsValue::undefined(), &[], &mut context).unwrap();
    // Revocation is idempotent.
    revoke.call(&JsValue::undefined(), &[], &mut context).unwrap();

    let err = proxy.get_v("missing", &mut context).unwrap_err();
    assert_eq!(
        err.as_native().unwrap().kind,
        paserati_engine::error::JsNativeErrorKind::Type
    );
}

#[test]
fn frozen_objects_reject_writes() {
    let mut context = Context::new();
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.create_data_property_or_throw("x", 1, &mut context)
        .unwrap();

    let object_constructor = context
        .global_object()
        .get("Object", &mut context)
        .unwrap();
    let freeze = object_constructor.get_v("freeze", &mut context).unwrap();
    freeze
        .call(&object_constructor, &[obj.clone().into()], &mut context)
        .unwrap();

    let wrote = obj.set("x", 2, false, &mut context).unwrap();
    assert!(!wrote);
    assert_eq!(obj.get("x", &mut context).unwrap(), JsValue::new(1));

    let is_frozen = object_constructor.get_v("isFrozen", &mut context).unwrap();
    let frozen = is_frozen
        .call(&object_constructor, &[obj.into()], &mut context)
        .unwrap();
    assert_eq!(frozen, JsValue::new(true));
}

#[test]
fn set_prototype_of_rejects_cycles() {
    let mut context = Context::new();
    let a = JsObject::with_object_proto(context.intrinsics());
    let b = JsObject::from_proto_and_data(
        Some(a.clone()),
        paserati_engine::object::ObjectData::ordinary(),
    );

    let object_constructor = context
        .global_object()
        .get("Object", &mut context)
        .unwrap();
    let set_proto = object_constructor
        .get_v("setPrototypeOf", &mut context)
        .unwrap();
    let err = set_proto.call(
        &object_constructor,
        &[a.into(), b.into()],
        &mut context,
    );
    assert!(err.is_err());
}
