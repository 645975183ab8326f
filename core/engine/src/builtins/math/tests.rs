use crate::{Context, JsValue};
use float_cmp::assert_approx_eq;

fn call_math(context: &mut Context, name: &str, args: &[JsValue]) -> JsValue {
    let math = context
        .global_object()
        .get("Math", context)
        .unwrap();
    let function = math.get_v(name, context).unwrap();
    function.call(&math, args, context).unwrap()
}

#[test]
fn constants() {
    let mut context = Context::new();
    let math = context.global_object().get("Math", &mut context).unwrap();
    let pi = math.get_v("PI", &mut context).unwrap();
    assert_approx_eq!(f64, pi.as_number().unwrap(), std::f64::consts::PI);
}

#[test]
fn min_max() {
    let mut context = Context::new();
    assert_eq!(
        call_math(&mut context, "min", &[JsValue::new(3), JsValue::new(1)]),
        JsValue::new(1)
    );
    assert_eq!(
        call_math(&mut context, "max", &[JsValue::new(3), JsValue::new(1)]),
        JsValue::new(3)
    );
    // No arguments give the identity elements.
    assert_eq!(
        call_math(&mut context, "min", &[]),
        JsValue::new(f64::INFINITY)
    );
    assert!(call_math(&mut context, "max", &[JsValue::nan(), JsValue::new(1)])
        .as_number()
        .unwrap()
        .is_nan());
}

#[test]
fn rounding() {
    let mut context = Context::new();
    // Halfway cases round towards positive infinity.
    assert_eq!(
        call_math(&mut context, "round", &[JsValue::new(-0.5)]),
        JsValue::new(0.0)
    );
    assert_eq!(
        call_math(&mut context, "round", &[JsValue::new(2.5)]),
        JsValue::new(3)
    );
    assert_eq!(
        call_math(&mut context, "trunc", &[JsValue::new(-2.7)]),
        JsValue::new(-2)
    );
    assert_eq!(
        call_math(&mut context, "sign", &[JsValue::new(-3)]),
        JsValue::new(-1)
    );
}

#[test]
fn powers() {
    let mut context = Context::new();
    assert_eq!(
        call_math(&mut context, "pow", &[JsValue::new(2), JsValue::new(10)]),
        JsValue::new(1024)
    );
    assert_eq!(
        call_math(&mut context, "sqrt", &[JsValue::new(16)]),
        JsValue::new(4)
    );
    assert_approx_eq!(
        f64,
        call_math(
            &mut context,
            "hypot",
            &[JsValue::new(3), JsValue::new(4)]
        )
        .as_number()
        .unwrap(),
        5.0
    );
}

#[test]
fn min_max_coerce_every_argument() {
    use crate::{native_function::NativeFunction, object::FunctionObjectBuilder, JsObject};
    use std::{cell::Cell, rc::Rc};

    let mut context = Context::new();
    let called = Rc::new(Cell::new(0usize));

    // An argument after NaN still has its `valueOf` evaluated.
    let value_of = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_closure_with_captures(
            |_, _, called: &Rc<Cell<usize>>, _| {
                called.set(called.get() + 1);
                Ok(JsValue::new(7))
            },
            called.clone(),
        ),
    )
    .build();
    let numberish = JsObject::with_object_proto(context.intrinsics());
    numberish
        .create_data_property_or_throw("valueOf", value_of, &mut context)
        .unwrap();

    let result = call_math(
        &mut context,
        "max",
        &[JsValue::nan(), numberish.clone().into()],
    );
    assert!(result.as_number().unwrap().is_nan());
    assert_eq!(called.get(), 1);

    let result = call_math(&mut context, "min", &[JsValue::nan(), numberish.into()]);
    assert!(result.as_number().unwrap().is_nan());
    assert_eq!(called.get(), 2);
}

#[test]
fn random_is_in_unit_interval() {
    let mut context = Context::new();
    for _ in 0..16 {
        let value = call_math(&mut context, "random", &[])
            .as_number()
            .unwrap();
        assert!((0.0..1.0).contains(&value));
    }
}
