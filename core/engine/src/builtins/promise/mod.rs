//! The global `Promise` object.
//!
//! Settling a promise never runs reactions synchronously: it only enqueues
//! reaction jobs on the context's microtask queue, which the host drains
//! once per turn. Within one promise, reactions fire in registration order.

#[cfg(test)]
mod tests;

use crate::{
    builtins::{
        iterable::iterable_to_array, Array, BuiltIn, BuiltInBuilder, BuiltInConstructor,
        BuiltInObject, IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::{JsError, JsNativeError},
    job::NativeJob,
    native_function::NativeFunction,
    object::{
        get_prototype_from_constructor, FunctionObjectBuilder, JsFunction, JsObject, ObjectData,
    },
    property::Attribute,
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};
use std::{cell::Cell, rc::Rc};

/// The current state of a promise.
#[derive(Debug, Clone, PartialEq)]
pub enum PromiseState {
    /// The promise hasn't been settled.
    Pending,
    /// The promise was fulfilled with a success value.
    Fulfilled(JsValue),
    /// The promise was rejected with a failure reason.
    Rejected(JsValue),
}

/// The internal representation of a promise: state, result and the two
/// reaction queues.
#[derive(Debug)]
pub struct Promise {
    state: PromiseState,
    fulfill_reactions: Vec<ReactionRecord>,
    reject_reactions: Vec<ReactionRecord>,
}

/// The `[[Type]]` field of a reaction record.
#[derive(Debug, Clone, Copy)]
enum ReactionType {
    Fulfill,
    Reject,
}

/// A `PromiseReaction` record.
#[derive(Debug)]
struct ReactionRecord {
    /// `[[Capability]]`
    promise_capability: Option<PromiseCapability>,
    /// `[[Type]]`
    reaction_type: ReactionType,
    /// `[[Handler]]`
    handler: Option<JsFunction>,
}

/// The resolving functions of a promise.
#[derive(Debug, Clone)]
pub struct ResolvingFunctions {
    /// Settles the associated promise as fulfilled (or chains a thenable).
    pub resolve: JsFunction,
    /// Settles the associated promise as rejected.
    pub reject: JsFunction,
}

/// A `PromiseCapability` record: a promise plus its resolving functions.
#[derive(Debug, Clone)]
pub struct PromiseCapability {
    promise: JsObject,
    resolve: JsFunction,
    reject: JsFunction,
}

/// `IfAbruptRejectPromise ( value, capability )`
macro_rules! if_abrupt_reject_promise {
    ($value:ident, $capability:expr, $context: expr) => {
        let $value = match $value {
            Err(err) => {
                let err = err.to_opaque($context);
                $capability
                    .reject()
                    .call(&JsValue::undefined(), &[err], $context)?;
                return Ok($capability.promise().clone().into());
            }
            Ok(value) => value,
        };
    };
}

impl PromiseCapability {
    /// `NewPromiseCapability ( C )`
    pub(crate) fn new(c: &JsObject, context: &mut Context) -> JsResult<Self> {
        #[derive(Debug, Default)]
        struct RejectResolve {
            reject: JsValue,
            resolve: JsValue,
        }

        // 1. If IsConstructor(C) is false, throw a TypeError exception.
        if !c.is_constructor() {
            return Err(JsNativeError::typ()
                .with_message("PromiseCapability: expected constructor")
                .into());
        }

        let promise_capability = Rc::new(std::cell::RefCell::new(RejectResolve::default()));

        // The executor closure captures the record and stores the resolving
        // functions the constructor hands it.
        let executor = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, args: &[JsValue], captures, _| {
                    let mut promise_capability = captures.borrow_mut();
                    if !promise_capability.resolve.is_undefined() {
                        return Err(JsNativeError::typ()
                            .with_message("promiseCapability.[[Resolve]] is not undefined")
                            .into());
                    }
                    if !promise_capability.reject.is_undefined() {
                        return Err(JsNativeError::typ()
                            .with_message("promiseCapability.[[Reject]] is not undefined")
                            .into());
                    }
                    promise_capability.resolve = args.get_or_undefined(0).clone();
                    promise_capability.reject = args.get_or_undefined(1).clone();
                    Ok(JsValue::undefined())
                },
                promise_capability.clone(),
            ),
        )
        .name("")
        .length(2)
        .build()
        .into();

        // 6. Let promise be ? Construct(C, « executor »).
        let promise = c.construct(&[executor], None, context)?;

        let promise_capability = promise_capability.borrow();
        let resolve = promise_capability
            .resolve
            .as_function()
            .ok_or_else(|| {
                JsNativeError::typ().with_message("promiseCapability.[[Resolve]] is not callable")
            })?;
        let reject = promise_capability
            .reject
            .as_function()
            .ok_or_else(|| {
                JsNativeError::typ().with_message("promiseCapability.[[Reject]] is not callable")
            })?;

        Ok(Self {
            promise,
            resolve,
            reject,
        })
    }

    /// The promise object.
    pub(crate) const fn promise(&self) -> &JsObject {
        &self.promise
    }

    /// The resolve function.
    pub(crate) const fn resolve(&self) -> &JsFunction {
        &self.resolve
    }

    /// The reject function.
    pub(crate) const fn reject(&self) -> &JsFunction {
        &self.reject
    }
}

impl IntrinsicObject for Promise {
    fn init(realm: &Realm) {
        let get_species = BuiltInBuilder::callable(realm, Self::get_species)
            .name("get [Symbol.species]")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::all, "all", 1)
            .static_method(Self::all_settled, "allSettled", 1)
            .static_method(Self::race, "race", 1)
            .static_method(Self::reject, "reject", 1)
            .static_method(Self::resolve, "resolve", 1)
            .static_accessor(
                JsSymbol::species(),
                Some(get_species),
                None,
                Attribute::CONFIGURABLE,
            )
            .method(Self::then, "then", 2)
            .method(Self::catch, "catch", 1)
            .method(Self::finally, "finally", 1)
            .property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Promise {
    const NAME: &'static str = "Promise";
}

impl BuiltInConstructor for Promise {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::promise;

    /// `Promise ( executor )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is undefined, throw a TypeError exception.
        if new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("Promise NewTarget cannot be undefined")
                .into());
        }

        // 2. If IsCallable(executor) is false, throw a TypeError exception.
        let executor = args
            .get_or_undefined(0)
            .as_callable()
            .cloned()
            .ok_or_else(|| JsNativeError::typ().with_message("Promise executor is not callable"))?;

        // 3-7. Create the pending promise.
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::promise, context)?;
        let promise =
            JsObject::from_proto_and_data(Some(prototype), ObjectData::promise(Self::new()));

        // 8. Let resolvingFunctions be CreateResolvingFunctions(promise).
        let resolving_functions = Self::create_resolving_functions(&promise, context);

        // 9-10. Run the executor, rejecting on an abrupt completion.
        let completion = executor.call(
            &JsValue::undefined(),
            &[
                resolving_functions.resolve.clone().into(),
                resolving_functions.reject.clone().into(),
            ],
            context,
        );
        if let Err(e) = completion {
            let e = e.to_opaque(context);
            resolving_functions
                .reject
                .call(&JsValue::undefined(), &[e], context)?;
        }

        // 11. Return promise.
        Ok(promise.into())
    }
}

impl BuiltIn for Promise {
    const PRIORITY: u32 = 190;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Promise", Type::named("PromiseConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Promise {
    /// Creates a new, pending promise record.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            state: PromiseState::Pending,
            fulfill_reactions: Vec::default(),
            reject_reactions: Vec::default(),
        }
    }

    /// The current state of the promise.
    #[must_use]
    pub fn state(&self) -> &PromiseState {
        &self.state
    }

    /// `get Promise [ @@species ]`
    #[allow(clippy::unnecessary_wraps)]
    fn get_species(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(this.clone())
    }

    /// `Promise.all ( iterable )`
    ///
    /// Resolves with the array of values in input order; rejects on the
    /// first rejection; the empty iterable resolves to `[]`.
    pub(crate) fn all(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        // 1. Let C be the this value.
        let c = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Promise.all() called on a non-object")
        })?;

        // 2. Let promiseCapability be ? NewPromiseCapability(C).
        let capability = PromiseCapability::new(&c, context)?;

        // 3-4. Let promiseResolve be Completion(GetPromiseResolve(C)).
        let promise_resolve = Self::get_promise_resolve(&c, context);
        if_abrupt_reject_promise!(promise_resolve, capability, context);

        // 5-6. Materialize the iterable.
        let values = iterable_to_array(context, args.get_or_undefined(0));
        if_abrupt_reject_promise!(values, capability, context);

        // 7. PerformPromiseAll.
        #[derive(Debug)]
        struct ResolveElementCaptures {
            already_called: Cell<bool>,
            index: usize,
            values: Rc<std::cell::RefCell<Vec<JsValue>>>,
            capability_resolve: JsFunction,
            remaining_elements_count: Rc<Cell<i64>>,
        }

        let result_values = Rc::new(std::cell::RefCell::new(vec![
            JsValue::undefined();
            values.len()
        ]));
        let remaining = Rc::new(Cell::new(1i64));

        for (index, value) in values.iter().enumerate() {
            let next_promise =
                promise_resolve
                    .clone()
                    .call(&c.clone().into(), &[value.clone()], context);
            if_abrupt_reject_promise!(next_promise, capability, context);

            let on_fulfilled = FunctionObjectBuilder::new(
                context,
                NativeFunction::from_closure_with_captures(
                    |_, args, captures: &ResolveElementCaptures, context| {
                        // Resolve-element functions are single-shot.
                        if captures.already_called.get() {
                            return Ok(JsValue::undefined());
                        }
                        captures.already_called.set(true);

                        captures.values.borrow_mut()[captures.index] =
                            args.get_or_undefined(0).clone();

                        captures
                            .remaining_elements_count
                            .set(captures.remaining_elements_count.get() - 1);
                        if captures.remaining_elements_count.get() == 0 {
                            let values_array = Array::create_array_from_list(
                                captures.values.borrow().iter().cloned(),
                                context,
                            );
                            return captures.capability_resolve.call(
                                &JsValue::undefined(),
                                &[values_array.into()],
                                context,
                            );
                        }
                        Ok(JsValue::undefined())
                    },
                    ResolveElementCaptures {
                        already_called: Cell::new(false),
                        index,
                        values: result_values.clone(),
                        capability_resolve: capability.resolve.clone(),
                        remaining_elements_count: remaining.clone(),
                    },
                ),
            )
            .name("")
            .length(1)
            .build();

            remaining.set(remaining.get() + 1);

            let then_result = next_promise.invoke(
                "then",
                &[on_fulfilled.into(), capability.reject.clone().into()],
                context,
            );
            if_abrupt_reject_promise!(then_result, capability, context);
            let _unused = then_result;
        }

        remaining.set(remaining.get() - 1);
        if remaining.get() == 0 {
            let values_array =
                Array::create_array_from_list(result_values.borrow().iter().cloned(), context);
            capability
                .resolve
                .call(&JsValue::undefined(), &[values_array.into()], context)?;
        }

        Ok(capability.promise.clone().into())
    }

    /// `Promise.allSettled ( iterable )`
    ///
    /// Resolves with `{status, value|reason}` records in input order; never
    /// rejects.
    pub(crate) fn all_settled(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let c = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Promise.allSettled() called on a non-object")
        })?;

        let capability = PromiseCapability::new(&c, context)?;

        let promise_resolve = Self::get_promise_resolve(&c, context);
        if_abrupt_reject_promise!(promise_resolve, capability, context);

        let values = iterable_to_array(context, args.get_or_undefined(0));
        if_abrupt_reject_promise!(values, capability, context);

        #[derive(Debug)]
        struct SettleCaptures {
            already_called: Rc<Cell<bool>>,
            index: usize,
            fulfilled: bool,
            values: Rc<std::cell::RefCell<Vec<JsValue>>>,
            capability_resolve: JsFunction,
            remaining_elements_count: Rc<Cell<i64>>,
        }

        fn settle_element(
            _: &JsValue,
            args: &[JsValue],
            captures: &SettleCaptures,
            context: &mut Context,
        ) -> JsResult<JsValue> {
            if captures.already_called.get() {
                return Ok(JsValue::undefined());
            }
            captures.already_called.set(true);

            let obj = JsObject::with_object_proto(context.intrinsics());
            if captures.fulfilled {
                obj.create_data_property_or_throw("status", "fulfilled", context)?;
                obj.create_data_property_or_throw(
                    "value",
                    args.get_or_undefined(0).clone(),
                    context,
                )?;
            } else {
                obj.create_data_property_or_throw("status", "rejected", context)?;
                obj.create_data_property_or_throw(
                    "reason",
                    args.get_or_undefined(0).clone(),
                    context,
                )?;
            }
            captures.values.borrow_mut()[captures.index] = obj.into();

            captures
                .remaining_elements_count
                .set(captures.remaining_elements_count.get() - 1);
            if captures.remaining_elements_count.get() == 0 {
                let values_array = Array::create_array_from_list(
                    captures.values.borrow().iter().cloned(),
                    context,
                );
                return captures.capability_resolve.call(
                    &JsValue::undefined(),
                    &[values_array.into()],
                    context,
                );
            }
            Ok(JsValue::undefined())
        }

        let result_values = Rc::new(std::cell::RefCell::new(vec![
            JsValue::undefined();
            values.len()
        ]));
        let remaining = Rc::new(Cell::new(1i64));

        for (index, value) in values.iter().enumerate() {
            let next_promise =
                promise_resolve
                    .clone()
                    .call(&c.clone().into(), &[value.clone()], context);
            if_abrupt_reject_promise!(next_promise, capability, context);

            let already_called = Rc::new(Cell::new(false));
            let on_fulfilled = FunctionObjectBuilder::new(
                context,
                NativeFunction::from_closure_with_captures(
                    settle_element,
                    SettleCaptures {
                        already_called: already_called.clone(),
                        index,
                        fulfilled: true,
                        values: result_values.clone(),
                        capability_resolve: capability.resolve.clone(),
                        remaining_elements_count: remaining.clone(),
                    },
                ),
            )
            .name("")
            .length(1)
            .build();

            let on_rejected = FunctionObjectBuilder::new(
                context,
                NativeFunction::from_closure_with_captures(
                    settle_element,
                    SettleCaptures {
                        already_called,
                        index,
                        fulfilled: false,
                        values: result_values.clone(),
                        capability_resolve: capability.resolve.clone(),
                        remaining_elements_count: remaining.clone(),
                    },
                ),
            )
            .name("")
            .length(1)
            .build();

            remaining.set(remaining.get() + 1);

            let then_result = next_promise.invoke(
                "then",
                &[on_fulfilled.into(), on_rejected.into()],
                context,
            );
            if_abrupt_reject_promise!(then_result, capability, context);
            let _unused = then_result;
        }

        remaining.set(remaining.get() - 1);
        if remaining.get() == 0 {
            let values_array =
                Array::create_array_from_list(result_values.borrow().iter().cloned(), context);
            capability
                .resolve
                .call(&JsValue::undefined(), &[values_array.into()], context)?;
        }

        Ok(capability.promise.clone().into())
    }

    /// `Promise.race ( iterable )`
    ///
    /// Settles with the first settled outcome; the empty iterable never
    /// settles.
    pub(crate) fn race(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let c = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Promise.race() called on a non-object")
        })?;

        let capability = PromiseCapability::new(&c, context)?;

        let promise_resolve = Self::get_promise_resolve(&c, context);
        if_abrupt_reject_promise!(promise_resolve, capability, context);

        let values = iterable_to_array(context, args.get_or_undefined(0));
        if_abrupt_reject_promise!(values, capability, context);

        for value in values {
            let next_promise =
                promise_resolve
                    .clone()
                    .call(&c.clone().into(), &[value], context);
            if_abrupt_reject_promise!(next_promise, capability, context);
            let then_result = next_promise.invoke(
                "then",
                &[
                    capability.resolve.clone().into(),
                    capability.reject.clone().into(),
                ],
                context,
            );
            if_abrupt_reject_promise!(then_result, capability, context);
            let _unused = then_result;
        }

        Ok(capability.promise.clone().into())
    }

    /// `Promise.reject ( r )`
    pub(crate) fn reject(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let c = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Promise.reject() called on a non-object")
        })?;
        let capability = PromiseCapability::new(&c, context)?;
        capability
            .reject
            .call(&JsValue::undefined(), &[args.get_or_undefined(0).clone()], context)?;
        Ok(capability.promise.clone().into())
    }

    /// `Promise.resolve ( x )`
    pub(crate) fn resolve(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let c = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Promise.resolve() called on a non-object")
        })?;
        Self::promise_resolve(&c, args.get_or_undefined(0).clone(), context).map(JsValue::from)
    }

    /// `PromiseResolve ( C, x )`
    ///
    /// Promises with a matching `constructor` pass through unchanged.
    pub(crate) fn promise_resolve(
        c: &JsObject,
        x: JsValue,
        context: &mut Context,
    ) -> JsResult<JsObject> {
        if let Some(x_obj) = x.as_promise() {
            let x_constructor = x_obj.get("constructor", context)?;
            if x_constructor
                .as_object()
                .map_or(false, |o| JsObject::equals(o, c))
            {
                return Ok(x_obj.clone());
            }
        }
        let capability = PromiseCapability::new(c, context)?;
        capability.resolve.call(&JsValue::undefined(), &[x], context)?;
        Ok(capability.promise.clone())
    }

    /// `GetPromiseResolve ( promiseConstructor )`
    fn get_promise_resolve(
        promise_constructor: &JsObject,
        context: &mut Context,
    ) -> JsResult<JsObject> {
        let promise_resolve = promise_constructor.get("resolve", context)?;
        promise_resolve.as_callable().cloned().ok_or_else(|| {
            JsNativeError::typ()
                .with_message("retrieving a non-callable promise resolver")
                .into()
        })
    }

    /// `Promise.prototype.catch ( onRejected )`
    pub(crate) fn catch(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let on_rejected = args.get_or_undefined(0);
        this.invoke("then", &[JsValue::undefined(), on_rejected.clone()], context)
    }

    /// `Promise.prototype.finally ( onFinally )`
    ///
    /// The wrapper passes the original outcome through unchanged; a throw
    /// inside `onFinally` overrides it.
    pub(crate) fn finally(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let promise = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("finally called with a non-object promise")
        })?;

        let c = promise.species_constructor(StandardConstructors::promise, context)?;

        let on_finally = args.get_or_undefined(0);
        let Some(on_finally) = on_finally.as_function() else {
            // A non-callable `onFinally` is passed through to `then`.
            return this.invoke("then", &[on_finally.clone(), on_finally.clone()], context);
        };

        let (then_finally, catch_finally) =
            Self::then_catch_finally_closures(c, on_finally, context);
        this.invoke("then", &[then_finally.into(), catch_finally.into()], context)
    }

    fn then_catch_finally_closures(
        c: JsObject,
        on_finally: JsFunction,
        context: &mut Context,
    ) -> (JsFunction, JsFunction) {
        #[derive(Debug)]
        struct FinallyCaptures {
            on_finally: JsFunction,
            c: JsObject,
        }

        let then_finally = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, args, captures: &FinallyCaptures, context| {
                    let value = args.get_or_undefined(0).clone();

                    // i. Let result be ? Call(onFinally, undefined).
                    let result = captures
                        .on_finally
                        .call(&JsValue::undefined(), &[], context)?;

                    // ii. Let promise be ? PromiseResolve(C, result).
                    let promise = Promise::promise_resolve(&captures.c, result, context)?;

                    // iii-v. Thunk the original value through.
                    let value_thunk = FunctionObjectBuilder::new(
                        context,
                        NativeFunction::from_closure_with_captures(
                            |_this, _args, value: &JsValue, _context| Ok(value.clone()),
                            value,
                        ),
                    )
                    .name("")
                    .length(0)
                    .build();
                    JsValue::from(promise).invoke("then", &[value_thunk.into()], context)
                },
                FinallyCaptures {
                    on_finally: on_finally.clone(),
                    c: c.clone(),
                },
            ),
        )
        .name("")
        .length(1)
        .build();

        let catch_finally = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, args, captures: &FinallyCaptures, context| {
                    let reason = args.get_or_undefined(0).clone();

                    let result = captures
                        .on_finally
                        .call(&JsValue::undefined(), &[], context)?;

                    let promise = Promise::promise_resolve(&captures.c, result, context)?;

                    let thrower = FunctionObjectBuilder::new(
                        context,
                        NativeFunction::from_closure_with_captures(
                            |_this, _args, reason: &JsValue, _context| {
                                Err(JsError::from_opaque(reason.clone()))
                            },
                            reason,
                        ),
                    )
                    .name("")
                    .length(0)
                    .build();
                    JsValue::from(promise).invoke("then", &[thrower.into()], context)
                },
                FinallyCaptures { on_finally, c },
            ),
        )
        .name("")
        .length(1)
        .build();

        (then_finally, catch_finally)
    }

    /// `Promise.prototype.then ( onFulfilled, onRejected )`
    pub(crate) fn then(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        // 2. If IsPromise(promise) is false, throw a TypeError exception.
        let promise = this.as_promise().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Promise.prototype.then: this is not a promise")
        })?;

        let on_fulfilled = args.get_or_undefined(0).as_function();
        let on_rejected = args.get_or_undefined(1).as_function();

        Self::inner_then(&promise, on_fulfilled, on_rejected, context).map(JsValue::from)
    }

    /// Schedules callbacks for the eventual settlement of `promise`.
    pub(crate) fn inner_then(
        promise: &JsObject,
        on_fulfilled: Option<JsFunction>,
        on_rejected: Option<JsFunction>,
        context: &mut Context,
    ) -> JsResult<JsObject> {
        let c = promise.species_constructor(StandardConstructors::promise, context)?;
        let result_capability = PromiseCapability::new(&c, context)?;
        let result_promise = result_capability.promise.clone();
        Self::perform_promise_then(
            promise,
            on_fulfilled,
            on_rejected,
            Some(result_capability),
            context,
        );
        Ok(result_promise)
    }

    /// `PerformPromiseThen ( promise, onFulfilled, onRejected [ , resultCapability ] )`
    pub(crate) fn perform_promise_then(
        promise: &JsObject,
        on_fulfilled: Option<JsFunction>,
        on_rejected: Option<JsFunction>,
        result_capability: Option<PromiseCapability>,
        context: &mut Context,
    ) {
        // 7. Let fulfillReaction be the PromiseReaction { [[Capability]]: resultCapability, [[Type]]: Fulfill, [[Handler]]: onFulfilled }.
        let fulfill_reaction = ReactionRecord {
            promise_capability: result_capability.clone(),
            reaction_type: ReactionType::Fulfill,
            handler: on_fulfilled,
        };

        // 8. Let rejectReaction be the PromiseReaction { [[Capability]]: resultCapability, [[Type]]: Reject, [[Handler]]: onRejected }.
        let reject_reaction = ReactionRecord {
            promise_capability: result_capability,
            reaction_type: ReactionType::Reject,
            handler: on_rejected,
        };

        let state = {
            let borrowed = promise.borrow();
            borrowed
                .as_promise()
                .expect("IsPromise(promise) is false")
                .state
                .clone()
        };

        match state {
            // 9. If promise.[[PromiseState]] is pending, append the reactions.
            PromiseState::Pending => {
                let mut borrowed = promise.borrow_mut();
                let promise_data = borrowed
                    .as_promise_mut()
                    .expect("IsPromise(promise) is false");
                promise_data.fulfill_reactions.push(fulfill_reaction);
                promise_data.reject_reactions.push(reject_reaction);
            }

            // 10. Else if fulfilled, enqueue the fulfill job.
            PromiseState::Fulfilled(ref value) => {
                let fulfill_job = new_promise_reaction_job(fulfill_reaction, value.clone());
                context.enqueue_job(fulfill_job);
            }

            // 11. Else, enqueue the reject job.
            PromiseState::Rejected(ref reason) => {
                let reject_job = new_promise_reaction_job(reject_reaction, reason.clone());
                context.enqueue_job(reject_job);
            }
        }
    }

    /// `CreateResolvingFunctions ( promise )`
    pub(crate) fn create_resolving_functions(
        promise: &JsObject,
        context: &mut Context,
    ) -> ResolvingFunctions {
        #[derive(Debug)]
        struct RejectResolveCaptures {
            promise: JsObject,
            already_resolved: Rc<Cell<bool>>,
        }

        // 1. Let alreadyResolved be the Record { [[Value]]: false }.
        let already_resolved = Rc::new(Cell::new(false));

        let resolve_captures = RejectResolveCaptures {
            already_resolved: already_resolved.clone(),
            promise: promise.clone(),
        };

        let resolve = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, args, captures: &RejectResolveCaptures, context| {
                    let RejectResolveCaptures {
                        promise,
                        already_resolved,
                    } = captures;

                    // Settlement is idempotent.
                    if already_resolved.get() {
                        return Ok(JsValue::undefined());
                    }
                    already_resolved.set(true);

                    let resolution = args.get_or_undefined(0);

                    // Resolving a promise with itself rejects it.
                    if JsValue::same_value(resolution, &promise.clone().into()) {
                        let self_resolution_error = JsNativeError::typ()
                            .with_message("cannot resolve a promise with itself")
                            .to_opaque(context);
                        reject_promise(promise, self_resolution_error.into(), context);
                        return Ok(JsValue::undefined());
                    }

                    let Some(then) = resolution.as_object() else {
                        fulfill_promise(promise, resolution.clone(), context);
                        return Ok(JsValue::undefined());
                    };

                    // Thenable assimilation: `then` lookups and calls are
                    // deferred to a job.
                    let then_action = match then.get("then", context) {
                        Err(e) => {
                            let e = e.to_opaque(context);
                            reject_promise(promise, e, context);
                            return Ok(JsValue::undefined());
                        }
                        Ok(then) => then,
                    };

                    let Some(then_action) = then_action.as_function() else {
                        fulfill_promise(promise, resolution.clone(), context);
                        return Ok(JsValue::undefined());
                    };

                    let job = new_promise_resolve_thenable_job(
                        promise.clone(),
                        resolution.clone(),
                        then_action,
                    );
                    context.enqueue_job(job);
                    Ok(JsValue::undefined())
                },
                resolve_captures,
            ),
        )
        .name("")
        .length(1)
        .build();

        let reject_captures = RejectResolveCaptures {
            promise: promise.clone(),
            already_resolved,
        };

        let reject = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, args, captures: &RejectResolveCaptures, context| {
                    let RejectResolveCaptures {
                        promise,
                        already_resolved,
                    } = captures;

                    if already_resolved.get() {
                        return Ok(JsValue::undefined());
                    }
                    already_resolved.set(true);

                    reject_promise(promise, args.get_or_undefined(0).clone(), context);
                    Ok(JsValue::undefined())
                },
                reject_captures,
            ),
        )
        .name("")
        .length(1)
        .build();

        ResolvingFunctions { resolve, reject }
    }
}

/// `TriggerPromiseReactions ( reactions, argument )`
fn trigger_promise_reactions(
    reactions: Vec<ReactionRecord>,
    argument: &JsValue,
    context: &mut Context,
) {
    for reaction in reactions {
        let job = new_promise_reaction_job(reaction, argument.clone());
        context.enqueue_job(job);
    }
}

/// `FulfillPromise ( promise, value )`
fn fulfill_promise(promise: &JsObject, value: JsValue, context: &mut Context) {
    let reactions = {
        let mut borrowed = promise.borrow_mut();
        let promise_data = borrowed
            .as_promise_mut()
            .expect("IsPromise(promise) is false");
        assert!(
            matches!(promise_data.state, PromiseState::Pending),
            "promise was not pending"
        );
        let reactions = std::mem::take(&mut promise_data.fulfill_reactions);
        promise_data.reject_reactions.clear();
        promise_data.state = PromiseState::Fulfilled(value.clone());
        reactions
    };
    trigger_promise_reactions(reactions, &value, context);
}

/// `RejectPromise ( promise, reason )`
fn reject_promise(promise: &JsObject, reason: JsValue, context: &mut Context) {
    let reactions = {
        let mut borrowed = promise.borrow_mut();
        let promise_data = borrowed
            .as_promise_mut()
            .expect("IsPromise(promise) is false");
        assert!(
            matches!(promise_data.state, PromiseState::Pending),
            "promise was not pending"
        );
        let reactions = std::mem::take(&mut promise_data.reject_reactions);
        promise_data.fulfill_reactions.clear();
        promise_data.state = PromiseState::Rejected(reason.clone());
        reactions
    };
    trigger_promise_reactions(reactions, &reason, context);
}

/// `NewPromiseReactionJob ( reaction, argument )`
fn new_promise_reaction_job(mut reaction: ReactionRecord, argument: JsValue) -> NativeJob {
    NativeJob::new(move |context| {
        let promise_capability = reaction.promise_capability.take();
        let reaction_type = reaction.reaction_type;
        let handler = reaction.handler.take();

        let handler_result = match handler {
            // Absent handlers pass the outcome through: identity fulfill,
            // thrower reject.
            None => match reaction_type {
                ReactionType::Fulfill => Ok(argument.clone()),
                ReactionType::Reject => Err(argument.clone()),
            },
            Some(handler) => handler
                .call(&JsValue::undefined(), &[argument.clone()], context)
                .map_err(|e| e.to_opaque(context)),
        };

        match promise_capability {
            None => {
                debug_assert!(
                    handler_result.is_ok(),
                    "a reaction without a capability must not fail"
                );
                Ok(JsValue::undefined())
            }
            Some(capability) => match handler_result {
                Err(value) => capability
                    .reject()
                    .call(&JsValue::undefined(), &[value], context),
                Ok(value) => capability
                    .resolve()
                    .call(&JsValue::undefined(), &[value], context),
            },
        }
    })
}

/// `NewPromiseResolveThenableJob ( promiseToResolve, thenable, then )`
fn new_promise_resolve_thenable_job(
    promise_to_resolve: JsObject,
    thenable: JsValue,
    then: JsFunction,
) -> NativeJob {
    NativeJob::new(move |context| {
        let resolving_functions =
            Promise::create_resolving_functions(&promise_to_resolve, context);

        let then_call_result = then.call(
            &thenable,
            &[
                resolving_functions.resolve.clone().into(),
                resolving_functions.reject.clone().into(),
            ],
            context,
        );

        if let Err(value) = then_call_result {
            let value = value.to_opaque(context);
            return resolving_functions
                .reject
                .call(&JsValue::undefined(), &[value], context);
        }
        then_call_result
    })
}
