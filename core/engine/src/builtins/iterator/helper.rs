//! Lazy iterator-helper pipeline stages and `%IteratorHelperPrototype%`.
//!
//! A helper owns its upstream iterator record. When an upstream `next`
//! raises, a user callback raises, or the helper's own `return` is invoked,
//! the helper closes the upstream (and, for `flatMap`/`zip`/`concat`, every
//! other iterator it still holds) before propagating.

use crate::{
    builtins::{
        iterable::{
            create_iter_result_object, get_iterator_flattenable, IteratorRecord,
        },
        BuiltInBuilder, IntrinsicObject,
    },
    context::intrinsics::Intrinsics,
    error::{JsError, JsNativeError},
    object::{JsFunction, JsObject, ObjectData},
    property::{Attribute, PropertyKey},
    realm::Realm,
    symbol::JsSymbol,
    value::{IntegerOrInfinity, JsValue},
    Context, JsResult,
};
use std::collections::VecDeque;

/// The combination mode of `Iterator.zip`/`Iterator.zipKeyed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ZipMode {
    /// Finish when the shortest input finishes.
    Shortest,
    /// Pad finished inputs until the longest finishes.
    Longest,
    /// Raise `TypeError` when the inputs have different lengths.
    Strict,
}

/// A lazy pipeline stage over one upstream iterator.
#[derive(Debug)]
pub(crate) enum PipelineStage {
    /// `Iterator.prototype.map`
    Map {
        /// `[[Mapper]]`
        mapper: JsFunction,
    },
    /// `Iterator.prototype.filter`
    Filter {
        /// `[[Predicate]]`
        predicate: JsFunction,
    },
    /// `Iterator.prototype.take`
    Take {
        /// `[[Remaining]]`
        remaining: IntegerOrInfinity,
    },
    /// `Iterator.prototype.drop`
    Drop {
        /// `[[ToSkip]]`; consumed lazily on the first `next`.
        to_skip: IntegerOrInfinity,
    },
    /// `Iterator.prototype.flatMap`
    FlatMap {
        /// `[[Mapper]]`
        mapper: JsFunction,
        /// `[[InnerIterator]]`
        inner: Option<IteratorRecord>,
    },
}

#[derive(Debug)]
enum HelperState {
    Pipeline {
        underlying: IteratorRecord,
        counter: u64,
        stage: PipelineStage,
    },
    Zip {
        iters: Vec<Option<IteratorRecord>>,
        mode: ZipMode,
        padding: Vec<JsValue>,
        keys: Option<Vec<PropertyKey>>,
    },
    Concat {
        pending: VecDeque<(JsValue, JsObject)>,
        inner: Option<IteratorRecord>,
    },
}

/// The internal slots of an iterator-helper object. `state` is `None` once
/// the helper completed, closed, or while a step is executing, so re-entrant
/// `next` calls observe a finished iterator.
#[derive(Debug)]
pub struct IteratorHelper {
    state: Option<HelperState>,
}

impl IteratorHelper {
    fn with_state(state: HelperState) -> Self {
        Self { state: Some(state) }
    }

    pub(crate) fn pipeline(underlying: IteratorRecord, stage: PipelineStage) -> Self {
        Self::with_state(HelperState::Pipeline {
            underlying,
            counter: 0,
            stage,
        })
    }

    pub(crate) fn zip(
        iters: Vec<Option<IteratorRecord>>,
        mode: ZipMode,
        padding: Vec<JsValue>,
        keys: Option<Vec<PropertyKey>>,
    ) -> Self {
        Self::with_state(HelperState::Zip {
            iters,
            mode,
            padding,
            keys,
        })
    }

    pub(crate) fn concat(pending: VecDeque<(JsValue, JsObject)>) -> Self {
        Self::with_state(HelperState::Concat {
            pending,
            inner: None,
        })
    }

    /// Wraps the helper into an object inheriting
    /// `%IteratorHelperPrototype%`.
    pub(crate) fn into_object(self, context: &mut Context) -> JsObject {
        JsObject::from_proto_and_data(
            Some(context.intrinsics().objects().iterator_prototypes().helper()),
            ObjectData::IteratorHelper(self),
        )
    }
}

/// Closes every live iterator of `iters`, returning the first close error.
fn close_all(iters: &[Option<IteratorRecord>], context: &mut Context) -> JsResult<()> {
    let mut first_error: Option<JsError> = None;
    for record in iters.iter().flatten() {
        if let Err(err) = record.close(Ok(JsValue::undefined()), context) {
            first_error.get_or_insert(err);
        }
    }
    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn take_state(this: &JsValue) -> JsResult<Option<HelperState>> {
    let obj = this.as_object().ok_or_else(|| {
        JsNativeError::typ().with_message("`this` is not an iterator helper")
    })?;
    let mut borrowed = obj.borrow_mut();
    let helper = borrowed.as_iterator_helper_mut().ok_or_else(|| {
        JsNativeError::typ().with_message("`this` is not an iterator helper")
    })?;
    Ok(helper.state.take())
}

fn restore_state(this: &JsValue, state: HelperState) {
    if let Some(obj) = this.as_object() {
        if let Some(helper) = obj.borrow_mut().as_iterator_helper_mut() {
            helper.state = Some(state);
        }
    }
}

/// `%IteratorHelperPrototype%`
#[derive(Debug, Clone, Copy)]
pub(crate) struct IteratorHelperPrototype;

impl IntrinsicObject for IteratorHelperPrototype {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_intrinsic::<Self>(realm)
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 0)
            .static_method(Self::r#return, "return", 0)
            .static_property(
                JsSymbol::to_string_tag(),
                "Iterator Helper",
                Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().iterator_prototypes().helper()
    }
}

impl IteratorHelperPrototype {
    /// `%IteratorHelperPrototype%.next ( )`
    pub(crate) fn next(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let Some(state) = take_state(this)? else {
            return Ok(create_iter_result_object(JsValue::undefined(), true, context));
        };

        match state {
            HelperState::Pipeline {
                underlying,
                counter,
                stage,
            } => Self::pipeline_next(this, underlying, counter, stage, context),
            HelperState::Zip {
                iters,
                mode,
                padding,
                keys,
            } => Self::zip_next(this, iters, mode, padding, keys, context),
            HelperState::Concat { pending, inner } => {
                Self::concat_next(this, pending, inner, context)
            }
        }
    }

    fn pipeline_next(
        this: &JsValue,
        mut underlying: IteratorRecord,
        mut counter: u64,
        mut stage: PipelineStage,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        macro_rules! step_upstream {
            () => {{
                // An upstream error leaves the helper finished; the record
                // flags itself done, so no close is attempted on it.
                match underlying.step(context) {
                    Err(err) => return Err(err),
                    Ok(done) => done,
                }
            }};
        }

        loop {
            match &mut stage {
                PipelineStage::Map { mapper } => {
                    if step_upstream!() {
                        return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                    }
                    let value = underlying.value(context)?;
                    let mapped = mapper.call(
                        &JsValue::undefined(),
                        &[value, JsValue::from(counter)],
                        context,
                    );
                    // A mapper error closes the upstream before propagating.
                    let mapped = match mapped {
                        Ok(mapped) => mapped,
                        Err(err) => return underlying.close(Err(err), context),
                    };
                    counter += 1;
                    restore_state(
                        this,
                        HelperState::Pipeline {
                            underlying,
                            counter,
                            stage,
                        },
                    );
                    return Ok(create_iter_result_object(mapped, false, context));
                }
                PipelineStage::Filter { predicate } => {
                    if step_upstream!() {
                        return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                    }
                    let value = underlying.value(context)?;
                    let selected = predicate.call(
                        &JsValue::undefined(),
                        &[value.clone(), JsValue::from(counter)],
                        context,
                    );
                    let selected = match selected {
                        Ok(selected) => selected.to_boolean(),
                        Err(err) => return underlying.close(Err(err), context),
                    };
                    counter += 1;
                    if selected {
                        restore_state(
                            this,
                            HelperState::Pipeline {
                                underlying,
                                counter,
                                stage,
                            },
                        );
                        return Ok(create_iter_result_object(value, false, context));
                    }
                }
                PipelineStage::Take { remaining } => {
                    if *remaining == 0 {
                        underlying.close(Ok(JsValue::undefined()), context)?;
                        return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                    }
                    if let IntegerOrInfinity::Integer(n) = remaining {
                        *n -= 1;
                    }
                    if step_upstream!() {
                        return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                    }
                    let value = underlying.value(context)?;
                    restore_state(
                        this,
                        HelperState::Pipeline {
                            underlying,
                            counter,
                            stage,
                        },
                    );
                    return Ok(create_iter_result_object(value, false, context));
                }
                PipelineStage::Drop { to_skip } => {
                    while *to_skip > 0 {
                        if let IntegerOrInfinity::Integer(n) = to_skip {
                            *n -= 1;
                        }
                        if step_upstream!() {
                            return Ok(create_iter_result_object(
                                JsValue::undefined(),
                                true,
                                context,
                            ));
                        }
                    }
                    if step_upstream!() {
                        return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                    }
                    let value = underlying.value(context)?;
                    restore_state(
                        this,
                        HelperState::Pipeline {
                            underlying,
                            counter,
                            stage,
                        },
                    );
                    return Ok(create_iter_result_object(value, false, context));
                }
                PipelineStage::FlatMap { mapper, inner } => {
                    if let Some(inner_record) = inner {
                        match inner_record.step(context) {
                            // An inner error closes the outer iterator too.
                            Err(err) => return underlying.close(Err(err), context),
                            Ok(true) => {
                                *inner = None;
                                continue;
                            }
                            Ok(false) => {
                                let value = match inner_record.value(context) {
                                    Ok(value) => value,
                                    Err(err) => return underlying.close(Err(err), context),
                                };
                                restore_state(
                                    this,
                                    HelperState::Pipeline {
                                        underlying,
                                        counter,
                                        stage,
                                    },
                                );
                                return Ok(create_iter_result_object(value, false, context));
                            }
                        }
                    }

                    if step_upstream!() {
                        return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                    }
                    let value = underlying.value(context)?;
                    let mapped = mapper.call(
                        &JsValue::undefined(),
                        &[value, JsValue::from(counter)],
                        context,
                    );
                    let mapped = match mapped {
                        Ok(mapped) => mapped,
                        Err(err) => return underlying.close(Err(err), context),
                    };
                    counter += 1;
                    match get_iterator_flattenable(&mapped, context) {
                        Ok(record) => *inner = Some(record),
                        Err(err) => return underlying.close(Err(err), context),
                    }
                }
            }
        }
    }

    fn zip_next(
        this: &JsValue,
        mut iters: Vec<Option<IteratorRecord>>,
        mode: ZipMode,
        padding: Vec<JsValue>,
        keys: Option<Vec<PropertyKey>>,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let mut results = Vec::with_capacity(iters.len());
        let mut finished = Vec::with_capacity(iters.len());

        for index in 0..iters.len() {
            // The record is taken out of its slot while it steps, so the
            // erroring iterator is never closed against itself.
            let stepped = match iters[index].take() {
                None => None,
                Some(mut record) => {
                    let done = match record.step(context) {
                        Ok(done) => done,
                        Err(err) => {
                            close_all(&iters, context).ok();
                            return Err(err);
                        }
                    };
                    if done {
                        None
                    } else {
                        match record.value(context) {
                            Ok(value) => {
                                iters[index] = Some(record);
                                Some(value)
                            }
                            Err(err) => {
                                close_all(&iters, context).ok();
                                return Err(err);
                            }
                        }
                    }
                }
            };
            finished.push(stepped.is_none());
            results.push(stepped.unwrap_or_else(|| {
                padding.get(index).cloned().unwrap_or_default()
            }));
        }

        let all_done = finished.iter().all(|done| *done);
        let any_done = finished.iter().any(|done| *done);

        match mode {
            ZipMode::Shortest if any_done => {
                close_all(&iters, context)?;
                return Ok(create_iter_result_object(JsValue::undefined(), true, context));
            }
            ZipMode::Longest if all_done => {
                return Ok(create_iter_result_object(JsValue::undefined(), true, context));
            }
            ZipMode::Strict if all_done => {
                return Ok(create_iter_result_object(JsValue::undefined(), true, context));
            }
            ZipMode::Strict if any_done => {
                close_all(&iters, context).ok();
                return Err(JsNativeError::typ()
                    .with_message("Iterator.zip: argument iterators are not of equal length")
                    .into());
            }
            _ => {}
        }

        let result = match &keys {
            None => {
                crate::builtins::Array::create_array_from_list(results, context).into()
            }
            Some(keys) => {
                let obj = JsObject::with_object_proto(context.intrinsics());
                for (key, value) in keys.iter().zip(results) {
                    obj.create_data_property_or_throw(key.clone(), value, context)?;
                }
                obj.into()
            }
        };

        restore_state(
            this,
            HelperState::Zip {
                iters,
                mode,
                padding,
                keys,
            },
        );
        Ok(create_iter_result_object(result, false, context))
    }

    fn concat_next(
        this: &JsValue,
        mut pending: VecDeque<(JsValue, JsObject)>,
        mut inner: Option<IteratorRecord>,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        loop {
            if let Some(mut record) = inner.take() {
                let done = record.step(context)?;
                if !done {
                    let value = record.value(context)?;
                    restore_state(
                        this,
                        HelperState::Concat {
                            pending,
                            inner: Some(record),
                        },
                    );
                    return Ok(create_iter_result_object(value, false, context));
                }
                // The current inner iterator is exhausted; move on to the
                // next pending iterable.
                continue;
            }

            let Some((item, method)) = pending.pop_front() else {
                return Ok(create_iter_result_object(JsValue::undefined(), true, context));
            };
            let iterator = method.call(&item, &[], context)?;
            let iterator_obj = iterator.as_object().cloned().ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("Iterator.concat: @@iterator did not return an object")
            })?;
            let next_method = iterator.get_v("next", context)?;
            inner = Some(IteratorRecord::new(iterator_obj, next_method));
        }
    }

    /// `%IteratorHelperPrototype%.return ( )`
    pub(crate) fn r#return(
        this: &JsValue,
        _: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let state = take_state(this)?;
        if let Some(state) = state {
            match state {
                HelperState::Pipeline {
                    underlying, stage, ..
                } => {
                    if let PipelineStage::FlatMap {
                        inner: Some(inner), ..
                    } = &stage
                    {
                        inner.close(Ok(JsValue::undefined()), context)?;
                    }
                    underlying.close(Ok(JsValue::undefined()), context)?;
                }
                HelperState::Zip { iters, .. } => {
                    close_all(&iters, context)?;
                }
                HelperState::Concat { inner, .. } => {
                    if let Some(inner) = inner {
                        inner.close(Ok(JsValue::undefined()), context)?;
                    }
                }
            }
        }
        Ok(create_iter_result_object(JsValue::undefined(), true, context))
    }
}
