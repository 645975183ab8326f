use super::{Promise, PromiseState};
use crate::{
    builtins::Array,
    native_function::NativeFunction,
    object::{FunctionObjectBuilder, JsObject},
    Context, JsValue,
};
use std::{cell::RefCell, rc::Rc};

fn promise_constructor(context: &mut Context) -> JsValue {
    context
        .intrinsics()
        .constructors()
        .promise()
        .constructor()
        .into()
}

fn resolved(context: &mut Context, value: JsValue) -> JsValue {
    let constructor = promise_constructor(context);
    Promise::resolve(&constructor, &[value], context).unwrap()
}

fn rejected(context: &mut Context, reason: JsValue) -> JsValue {
    let constructor = promise_constructor(context);
    Promise::reject(&constructor, &[reason], context).unwrap()
}

fn state_of(promise: &JsValue) -> PromiseState {
    promise
        .as_promise()
        .expect("expected a promise")
        .borrow()
        .as_promise()
        .expect("expected promise data")
        .state()
        .clone()
}

fn recorder(context: &mut Context, log: Rc<RefCell<Vec<&'static str>>>, tag: &'static str) -> JsValue {
    FunctionObjectBuilder::new(
        context,
        NativeFunction::from_closure_with_captures(
            move |_, _, log, _| {
                log.borrow_mut().push(tag);
                Ok(JsValue::undefined())
            },
            log,
        ),
    )
    .build()
    .into()
}

#[test]
fn reactions_run_in_registration_order() {
    let mut context = Context::new();
    let promise = resolved(&mut context, JsValue::new(1));

    let log = Rc::new(RefCell::new(Vec::new()));
    for tag in ["A", "B", "C"] {
        let handler = recorder(&mut context, log.clone(), tag);
        promise.invoke("then", &[handler], &mut context).unwrap();
    }

    // Nothing runs until the host drains the microtask queue.
    assert!(log.borrow().is_empty());
    context.run_jobs();
    assert_eq!(*log.borrow(), vec!["A", "B", "C"]);
}

#[test]
fn then_chains_transform_values() {
    let mut context = Context::new();
    let promise = resolved(&mut context, JsValue::new(2));

    let doubler = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|_, args, context| {
            let n = args[0].to_number(context)?;
            Ok(JsValue::from(n * 2.0))
        }),
    )
    .build();

    let chained = promise.invoke("then", &[doubler.into()], &mut context).unwrap();
    context.run_jobs();
    assert_eq!(state_of(&chained), PromiseState::Fulfilled(JsValue::new(4)));
}

#[test]
fn all_resolves_in_input_order() {
    let mut context = Context::new();
    let a = resolved(&mut context, JsValue::new(1));
    let b = resolved(&mut context, JsValue::new(2));
    let values = Array::create_array_from_list([a, b], &mut context);

    let constructor = promise_constructor(&mut context);
    let combined = Promise::all(&constructor, &[values.into()], &mut context).unwrap();
    context.run_jobs();

    match state_of(&combined) {
        PromiseState::Fulfilled(array) => {
            let array = array.as_object().unwrap();
            assert_eq!(array.get(0u32, &mut context).unwrap(), JsValue::new(1));
            assert_eq!(array.get(1u32, &mut context).unwrap(), JsValue::new(2));
        }
        state => panic!("expected fulfilled promise, got {state:?}"),
    }
}

#[test]
fn all_rejects_with_the_first_rejection() {
    let mut context = Context::new();
    let a = resolved(&mut context, JsValue::new(1));
    let b = rejected(&mut context, JsValue::new("x"));
    let c = resolved(&mut context, JsValue::new(3));
    let values = Array::create_array_from_list([a, b, c], &mut context);

    let constructor = promise_constructor(&mut context);
    let combined = Promise::all(&constructor, &[values.into()], &mut context).unwrap();
    context.run_jobs();

    assert_eq!(state_of(&combined), PromiseState::Rejected(JsValue::new("x")));
}

#[test]
fn all_of_empty_iterable_resolves_immediately() {
    let mut context = Context::new();
    let values = Array::create_array_from_list([], &mut context);
    let constructor = promise_constructor(&mut context);
    let combined = Promise::all(&constructor, &[values.into()], &mut context).unwrap();
    context.run_jobs();

    match state_of(&combined) {
        PromiseState::Fulfilled(array) => {
            let array = array.as_object().unwrap();
            assert_eq!(array.get("length", &mut context).unwrap(), JsValue::new(0));
        }
        state => panic!("expected fulfilled promise, got {state:?}"),
    }
}

#[test]
fn all_settled_reports_both_outcomes() {
    let mut context = Context::new();
    let a = resolved(&mut context, JsValue::new(1));
    let b = rejected(&mut context, JsValue::new("x"));
    let values = Array::create_array_from_list([a, b], &mut context);

    let constructor = promise_constructor(&mut context);
    let combined = Promise::all_settled(&constructor, &[values.into()], &mut context).unwrap();
    context.run_jobs();

    match state_of(&combined) {
        PromiseState::Fulfilled(array) => {
            let array = array.as_object().unwrap();
            let first = array.get(0u32, &mut context).unwrap();
            assert_eq!(
                first.get_v("status", &mut context).unwrap(),
                JsValue::new("fulfilled")
            );
            assert_eq!(first.get_v("value", &mut context).unwrap(), JsValue::new(1));
            let second = array.get(1u32, &mut context).unwrap();
            assert_eq!(
                second.get_v("status", &mut context).unwrap(),
                JsValue::new("rejected")
            );
            assert_eq!(
                second.get_v("reason", &mut context).unwrap(),
                JsValue::new("x")
            );
        }
        state => panic!("expected fulfilled promise, got {state:?}"),
    }
}

#[test]
fn race_of_empty_iterable_never_settles() {
    let mut context = Context::new();
    let values = Array::create_array_from_list([], &mut context);
    let constructor = promise_constructor(&mut context);
    let combined = Promise::race(&constructor, &[values.into()], &mut context).unwrap();
    context.run_jobs();
    assert_eq!(state_of(&combined), PromiseState::Pending);
}

#[test]
fn race_settles_with_the_first_outcome() {
    let mut context = Context::new();
    let a = resolved(&mut context, JsValue::new("first"));
    let b = resolved(&mut context, JsValue::new("second"));
    let values = Array::create_array_from_list([a, b], &mut context);

    let constructor = promise_constructor(&mut context);
    let combined = Promise::race(&constructor, &[values.into()], &mut context).unwrap();
    context.run_jobs();
    assert_eq!(
        state_of(&combined),
        PromiseState::Fulfilled(JsValue::new("first"))
    );
}

#[test]
fn finally_passes_the_outcome_through() {
    let mut context = Context::new();
    let promise = resolved(&mut context, JsValue::new(7));

    let log = Rc::new(RefCell::new(Vec::new()));
    let on_finally = recorder(&mut context, log.clone(), "finally");
    let chained = promise
        .invoke("finally", &[on_finally], &mut context)
        .unwrap();
    context.run_jobs();

    assert_eq!(*log.borrow(), vec!["finally"]);
    assert_eq!(state_of(&chained), PromiseState::Fulfilled(JsValue::new(7)));
}

#[test]
fn thenable_assimilation_follows_the_chain() {
    let mut context = Context::new();

    // A plain object with a callable `then` resolves the outer promise.
    let thenable = JsObject::with_object_proto(context.intrinsics());
    let then = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|_, args, context| {
            let resolve = args[0].clone();
            resolve.call(&JsValue::undefined(), &[JsValue::new(42)], context)
        }),
    )
    .build();
    thenable
        .create_data_property_or_throw("then", then, &mut context)
        .unwrap();

    let constructor = promise_constructor(&mut context);
    let promise = Promise::resolve(&constructor, &[thenable.into()], &mut context).unwrap();
    context.run_jobs();
    assert_eq!(state_of(&promise), PromiseState::Fulfilled(JsValue::new(42)));
}

#[test]
fn resolving_a_promise_with_itself_rejects_it() {
    let mut context = Context::new();
    let constructor = promise_constructor(&mut context);

    // A no-op executor leaves the promise pending.
    let executor = FunctionObjectBuilder::new(
        &mut context,
        NativeFunction::from_fn_ptr(|_, _, _| Ok(JsValue::undefined())),
    )
    .build();
    let promise = constructor
        .as_object()
        .unwrap()
        .construct(&[executor.into()], None, &mut context)
        .unwrap();

    let resolving = Promise::create_resolving_functions(&promise, &mut context);
    resolving
        .resolve
        .call(&JsValue::undefined(), &[promise.clone().into()], &mut context)
        .unwrap();
    context.run_jobs();

    match state_of(&promise.into()) {
        PromiseState::Rejected(reason) => assert!(reason.is_object()),
        state => panic!("expected rejected promise, got {state:?}"),
    }
}
