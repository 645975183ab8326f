//! Iterator records and the iteration-protocol abstract operations.

use crate::{
    error::JsNativeError,
    object::JsObject,
    symbol::JsSymbol,
    value::JsValue,
    Context, JsResult,
};

/// `IfAbruptCloseIterator ( value, iteratorRecord )`
///
/// Shorthand for closing the iterator on an abrupt completion before
/// propagating it.
macro_rules! if_abrupt_close_iterator {
    ($value:expr, $iterator_record:expr, $context:expr) => {
        match $value {
            // 1. If value is an abrupt completion, return ? IteratorClose(iteratorRecord, value).
            Err(err) => return $iterator_record.close(Err(err), $context),
            // 2. Else if value is a Completion Record, set value to value.
            Ok(value) => value,
        }
    };
}

pub(crate) use if_abrupt_close_iterator;

/// `CreateIterResultObject ( value, done )`
///
/// Generates an object supporting the `IteratorResult` interface.
pub fn create_iter_result_object(value: JsValue, done: bool, context: &mut Context) -> JsValue {
    let obj = JsObject::with_object_proto(context.intrinsics());
    obj.insert_property(
        "value",
        crate::property::PropertyDescriptor::builder()
            .value(value)
            .writable(true)
            .enumerable(true)
            .configurable(true),
    );
    obj.insert_property(
        "done",
        crate::property::PropertyDescriptor::builder()
            .value(done)
            .writable(true)
            .enumerable(true)
            .configurable(true),
    );
    obj.into()
}

/// The result of one iteration step.
#[derive(Debug, Clone)]
pub struct IteratorResult {
    object: JsObject,
}

impl IteratorResult {
    /// Wraps a `next()` result, which must be an object.
    pub(crate) fn from_value(value: JsValue) -> JsResult<Self> {
        if let JsValue::Object(object) = value {
            Ok(Self { object })
        } else {
            Err(JsNativeError::typ()
                .with_message("next value should be an object")
                .into())
        }
    }

    /// `IteratorComplete ( iterResult )`
    pub fn complete(&self, context: &mut Context) -> JsResult<bool> {
        Ok(self.object.get("done", context)?.to_boolean())
    }

    /// `IteratorValue ( iterResult )`
    pub fn value(&self, context: &mut Context) -> JsResult<JsValue> {
        self.object.get("value", context)
    }
}

/// An `Iterator` Record: the iterator, its cached `next` method and the done
/// flag.
#[derive(Debug, Clone)]
pub struct IteratorRecord {
    /// `[[Iterator]]`
    iterator: JsObject,

    /// `[[NextMethod]]`
    next_method: JsValue,

    /// `[[Done]]`
    done: bool,

    /// The result of the last call to `next`.
    last_result: Option<IteratorResult>,
}

impl IteratorRecord {
    /// Creates a new `IteratorRecord`.
    #[must_use]
    pub fn new(iterator: JsObject, next_method: JsValue) -> Self {
        Self {
            iterator,
            next_method,
            done: false,
            last_result: None,
        }
    }

    /// `GetIteratorDirect ( obj )`
    pub(crate) fn from_object(iterator: JsObject, context: &mut Context) -> JsResult<Self> {
        let next_method = iterator.get("next", context)?;
        Ok(Self::new(iterator, next_method))
    }

    /// The `[[Iterator]]` field.
    pub(crate) const fn iterator(&self) -> &JsObject {
        &self.iterator
    }

    /// A clone of the `[[NextMethod]]` field.
    pub(crate) fn next_method_value(&self) -> JsValue {
        self.next_method.clone()
    }

    /// The `[[Done]]` field.
    pub(crate) const fn done(&self) -> bool {
        self.done
    }

    /// Overwrites the `[[Done]]` field.
    pub(crate) fn set_done(&mut self, done: bool) {
        self.done = done;
    }

    fn set_done_on_err<R, F>(&mut self, f: F) -> JsResult<R>
    where
        F: FnOnce(&mut Self) -> JsResult<R>,
    {
        let result = f(self);
        if result.is_err() {
            self.done = true;
        }
        result
    }

    /// `IteratorValue ( iterResult )` on the last stepped result.
    pub(crate) fn value(&mut self, context: &mut Context) -> JsResult<JsValue> {
        self.set_done_on_err(|iter| match &iter.last_result {
            Some(result) => result.value(context),
            None => Ok(JsValue::undefined()),
        })
    }

    /// `IteratorNext ( iteratorRecord [ , value ] )` combined with
    /// `IteratorStep`: advances the iterator and returns whether it is done.
    pub(crate) fn step_with(
        &mut self,
        value: Option<&JsValue>,
        context: &mut Context,
    ) -> JsResult<bool> {
        self.set_done_on_err(|iter| {
            let result = iter.next_method.call(
                &iter.iterator.clone().into(),
                value.map_or(&[], std::slice::from_ref),
                context,
            )?;
            let result = IteratorResult::from_value(result)?;
            iter.done = result.complete(context)?;
            iter.last_result = Some(result);
            Ok(iter.done)
        })
    }

    /// `IteratorStep ( iteratorRecord )`: advances and returns `true` when
    /// the iterator reported `done`.
    pub(crate) fn step(&mut self, context: &mut Context) -> JsResult<bool> {
        self.step_with(None, context)
    }

    /// `IteratorClose ( iteratorRecord, completion )`
    ///
    /// Notifies the iterator that the consumer is done with it, invoking its
    /// `return` method if present.
    pub(crate) fn close(
        &self,
        completion: JsResult<JsValue>,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let iterator = &self.iterator;

        let inner_result = iterator.get_method("return", context);
        let inner_result = match inner_result {
            Ok(Some(r#return)) => r#return.call(&iterator.clone().into(), &[], context),
            // If `return` is absent, forward the original completion.
            Ok(None) => return completion,
            Err(inner_err) => {
                // A throw completion takes precedence over the lookup error.
                completion?;
                return Err(inner_err);
            }
        };

        let completion = completion?;
        let inner_result = inner_result?;

        if inner_result.is_object() {
            Ok(completion)
        } else {
            Err(JsNativeError::typ()
                .with_message("iterator.return() returned a non-object")
                .into())
        }
    }
}

impl JsValue {
    /// `GetIterator ( obj )`
    ///
    /// Looks up `@@iterator` and opens an iterator record over the result.
    pub fn get_iterator(&self, context: &mut Context) -> JsResult<IteratorRecord> {
        let method = self.get_method(JsSymbol::iterator(), context)?.ok_or_else(|| {
            JsNativeError::typ().with_message(format!(
                "value with type `{}` is not iterable",
                self.type_of()
            ))
        })?;

        let iterator = method.call(self, &[], context)?;
        let iterator_obj = iterator.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("returned iterator is not an object")
        })?;

        let next_method = iterator.get_v("next", context)?;
        Ok(IteratorRecord::new(iterator_obj, next_method))
    }
}

/// `GetIteratorFlattenable ( obj )`
///
/// Rejects primitives; falls back to treating the object itself as an
/// iterator when it has no `@@iterator` method but a callable `next`.
pub(crate) fn get_iterator_flattenable(
    value: &JsValue,
    context: &mut Context,
) -> JsResult<IteratorRecord> {
    let obj = value.as_object().cloned().ok_or_else(|| {
        JsNativeError::typ().with_message(format!(
            "cannot convert value of type `{}` to an iterator",
            value.type_of()
        ))
    })?;

    match value.get_method(JsSymbol::iterator(), context)? {
        Some(method) => {
            let iterator = method.call(value, &[], context)?;
            let iterator_obj = iterator.as_object().cloned().ok_or_else(|| {
                JsNativeError::typ().with_message("returned iterator is not an object")
            })?;
            let next_method = iterator.get_v("next", context)?;
            Ok(IteratorRecord::new(iterator_obj, next_method))
        }
        None => {
            let next_method = obj.get("next", context)?;
            if next_method.as_callable().is_none() {
                return Err(JsNativeError::typ()
                    .with_message("object is not iterable and has no callable `next` method")
                    .into());
            }
            Ok(IteratorRecord::new(obj, next_method))
        }
    }
}

/// `IterableToList ( items [ , method ] )`
pub(crate) fn iterable_to_list(
    context: &mut Context,
    items: &JsValue,
    method: Option<JsObject>,
) -> JsResult<Vec<JsValue>> {
    let mut iterator_record = match method {
        Some(method) => {
            let iterator = method.call(items, &[], context)?;
            let iterator_obj = iterator.as_object().cloned().ok_or_else(|| {
                JsNativeError::typ().with_message("returned iterator is not an object")
            })?;
            let next_method = iterator.get_v("next", context)?;
            IteratorRecord::new(iterator_obj, next_method)
        }
        None => items.get_iterator(context)?,
    };

    let mut values = Vec::new();
    while !iterator_record.step(context)? {
        values.push(iterator_record.value(context)?);
    }
    Ok(values)
}

/// `IterableToArray ( items )`
///
/// Dense arrays take a fast path that copies their elements without
/// consulting the iterator protocol; everything else goes through
/// [`iterable_to_list`] with close-on-error.
pub(crate) fn iterable_to_array(
    context: &mut Context,
    items: &JsValue,
) -> JsResult<Vec<JsValue>> {
    if let Some(obj) = items.as_object() {
        let dense = {
            let borrowed = obj.borrow();
            if borrowed.is_array() {
                borrowed.properties().dense_indexed_properties().cloned()
            } else {
                None
            }
        };
        if let Some(elements) = dense {
            return Ok(elements);
        }
    }
    iterable_to_list(context, items, None)
}

/// Initializes the tag-only iterator prototypes that have no builtin of
/// their own.
pub(crate) fn init_tagged_prototypes(realm: &crate::realm::Realm) {
    use crate::builtins::BuiltInBuilder;
    use crate::property::Attribute;

    let iterator_prototype = realm
        .intrinsics()
        .objects()
        .iterator_prototypes()
        .iterator();

    // The host attaches the regexp string iterator implementation; the core
    // only reserves the tagged prototype slot.
    BuiltInBuilder::with_object(
        realm,
        realm
            .intrinsics()
            .objects()
            .iterator_prototypes()
            .regexp_string(),
    )
    .prototype(iterator_prototype)
    .static_property(
        JsSymbol::to_string_tag(),
        "RegExp String Iterator",
        Attribute::CONFIGURABLE,
    )
    .build();
}
