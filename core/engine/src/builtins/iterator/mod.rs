//! The global `Iterator` object: `%IteratorPrototype%`, the lazy helpers,
//! the eager reducers and the static combinators.

pub(crate) mod helper;
pub(crate) mod wrap;

pub(crate) use helper::IteratorHelper;

use self::helper::{IteratorHelperPrototype, PipelineStage, ZipMode};
use crate::{
    builtins::{
        iterable::{
            get_iterator_flattenable, if_abrupt_close_iterator, iterable_to_list, IteratorRecord,
        },
        BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject,
    },
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsFunction, JsObject, ObjectData},
    property::{Attribute, PropertyKey},
    realm::Realm,
    symbol::JsSymbol,
    types::{InterfaceType, Type, TypeAlias, TypeContext},
    value::{IntegerOrInfinity, JsArgs, JsValue},
    Context, JsResult,
};
use std::collections::VecDeque;

/// The global `Iterator` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Iterator;

impl IntrinsicObject for Iterator {
    fn init(realm: &Realm) {
        let get_to_string_tag = BuiltInBuilder::callable(realm, Self::get_to_string_tag)
            .name("get [Symbol.toStringTag]")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::from, "from", 1)
            .static_method(Self::concat, "concat", 0)
            .static_method(Self::zip, "zip", 1)
            .static_method(Self::zip_keyed, "zipKeyed", 1)
            .method(Self::map, "map", 1)
            .method(Self::filter, "filter", 1)
            .method(Self::take, "take", 1)
            .method(Self::drop, "drop", 1)
            .method(Self::flat_map, "flatMap", 1)
            .method(Self::reduce, "reduce", 1)
            .method(Self::to_array, "toArray", 0)
            .method(Self::for_each, "forEach", 1)
            .method(Self::some, "some", 1)
            .method(Self::every, "every", 1)
            .method(Self::find, "find", 1)
            .method(Self::identity, (JsSymbol::iterator(), "[Symbol.iterator]"), 0)
            .method(Self::dispose, (JsSymbol::dispose(), "[Symbol.dispose]"), 0)
            .accessor(
                JsSymbol::to_string_tag(),
                Some(get_to_string_tag),
                None,
                Attribute::CONFIGURABLE,
            )
            .build();

        IteratorHelperPrototype::init(realm);
        wrap::WrapForValidIteratorPrototype::init(realm);
        crate::builtins::iterable::init_tagged_prototypes(realm);
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Iterator {
    const NAME: &'static str = "Iterator";
}

impl BuiltInConstructor for Iterator {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::iterator;

    /// `Iterator ( )`
    ///
    /// `Iterator` is abstract: only subclass constructors may pass through.
    fn constructor(
        new_target: &JsValue,
        _args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let is_base = new_target.as_object().map_or(true, |nt| {
            JsObject::equals(
                nt,
                &context.intrinsics().constructors().iterator().constructor(),
            )
        });
        if new_target.is_undefined() || is_base {
            return Err(JsNativeError::typ()
                .with_message("Iterator is an abstract class and cannot be constructed directly")
                .into());
        }
        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::iterator, context)?;
        Ok(JsObject::from_proto_and_data(Some(prototype), ObjectData::ordinary()).into())
    }
}

impl BuiltIn for Iterator {
    const PRIORITY: u32 = 80;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Iterator", Type::named("IteratorConstructor"));
        // Interface-only globals: they have no runtime value.
        types.define_type_alias(
            "IteratorResult",
            TypeAlias {
                params: vec!["T".into()],
                body: Type::Interface(InterfaceType {
                    name: "IteratorResult".into(),
                    type_params: vec!["T".into()],
                    members: vec![
                        ("value".into(), Type::param("T")),
                        ("done".into(), Type::Boolean),
                    ],
                }),
            },
        );
        types.define_type_alias(
            "Iterable",
            TypeAlias {
                params: vec!["T".into()],
                body: Type::Interface(InterfaceType {
                    name: "Iterable".into(),
                    type_params: vec!["T".into()],
                    members: vec![(
                        "[Symbol.iterator]".into(),
                        Type::function(vec![], Type::generic("Iterator", vec![Type::param("T")])),
                    )],
                }),
            },
        );
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

/// Opens the receiver of an `Iterator.prototype` method as an iterator
/// record, reading `next` eagerly.
fn this_iterator_record(this: &JsValue, context: &mut Context) -> JsResult<IteratorRecord> {
    let obj = this.as_object().cloned().ok_or_else(|| {
        JsNativeError::typ().with_message("Iterator method called on a primitive")
    })?;
    IteratorRecord::from_object(obj, context)
}

/// Validates the numeric limit of `take`/`drop`.
fn limit_argument(value: &JsValue, method: &str, context: &mut Context) -> JsResult<IntegerOrInfinity> {
    let number = value.to_number(context)?;
    if number.is_nan() {
        return Err(JsNativeError::range()
            .with_message(format!("Iterator.prototype.{method}: limit must not be NaN"))
            .into());
    }
    let integer = IntegerOrInfinity::from(number);
    if integer < 0 {
        return Err(JsNativeError::range()
            .with_message(format!("Iterator.prototype.{method}: limit must not be negative"))
            .into());
    }
    Ok(integer)
}

fn callback_argument(value: &JsValue, method: &str) -> JsResult<JsFunction> {
    value.as_function().ok_or_else(|| {
        JsNativeError::typ()
            .with_message(format!("Iterator.prototype.{method}: callback is not callable"))
            .into()
    })
}

impl Iterator {
    /// `Iterator.prototype[@@iterator] ( )`
    #[allow(clippy::unnecessary_wraps)]
    fn identity(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(this.clone())
    }

    /// `get Iterator.prototype[@@toStringTag]`
    #[allow(clippy::unnecessary_wraps)]
    fn get_to_string_tag(_: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(js_string!("Iterator").into())
    }

    /// `Iterator.prototype[@@dispose] ( )`
    fn dispose(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = this.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Iterator disposal called on a primitive")
        })?;
        if let Some(return_method) = obj.get_method("return", context)? {
            return_method.call(this, &[], context)?;
        }
        Ok(JsValue::undefined())
    }

    /// `Iterator.prototype.map ( mapper )`
    fn map(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mapper = callback_argument(args.get_or_undefined(0), "map")?;
        let underlying = this_iterator_record(this, context)?;
        Ok(IteratorHelper::pipeline(underlying, PipelineStage::Map { mapper })
            .into_object(context)
            .into())
    }

    /// `Iterator.prototype.filter ( predicate )`
    fn filter(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let predicate = callback_argument(args.get_or_undefined(0), "filter")?;
        let underlying = this_iterator_record(this, context)?;
        Ok(
            IteratorHelper::pipeline(underlying, PipelineStage::Filter { predicate })
                .into_object(context)
                .into(),
        )
    }

    /// `Iterator.prototype.take ( limit )`
    fn take(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let remaining = limit_argument(args.get_or_undefined(0), "take", context)?;
        let underlying = this_iterator_record(this, context)?;
        Ok(
            IteratorHelper::pipeline(underlying, PipelineStage::Take { remaining })
                .into_object(context)
                .into(),
        )
    }

    /// `Iterator.prototype.drop ( limit )`
    fn drop(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let to_skip = limit_argument(args.get_or_undefined(0), "drop", context)?;
        let underlying = this_iterator_record(this, context)?;
        Ok(
            IteratorHelper::pipeline(underlying, PipelineStage::Drop { to_skip })
                .into_object(context)
                .into(),
        )
    }

    /// `Iterator.prototype.flatMap ( mapper )`
    fn flat_map(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mapper = callback_argument(args.get_or_undefined(0), "flatMap")?;
        let underlying = this_iterator_record(this, context)?;
        Ok(IteratorHelper::pipeline(
            underlying,
            PipelineStage::FlatMap {
                mapper,
                inner: None,
            },
        )
        .into_object(context)
        .into())
    }

    /// `Iterator.prototype.toArray ( )`
    fn to_array(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut record = this_iterator_record(this, context)?;
        let mut values = Vec::new();
        while !record.step(context)? {
            values.push(record.value(context)?);
        }
        Ok(crate::builtins::Array::create_array_from_list(values, context).into())
    }

    /// `Iterator.prototype.forEach ( procedure )`
    fn for_each(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let record = this_iterator_record(this, context)?;
        let procedure = match callback_argument(args.get_or_undefined(0), "forEach") {
            Ok(procedure) => procedure,
            Err(err) => return record.close(Err(err), context),
        };
        let mut record = record;
        let mut counter: u64 = 0;
        while !record.step(context)? {
            let value = record.value(context)?;
            let result =
                procedure.call(&JsValue::undefined(), &[value, JsValue::from(counter)], context);
            if_abrupt_close_iterator!(result, record, context);
            counter += 1;
        }
        Ok(JsValue::undefined())
    }

    /// `Iterator.prototype.reduce ( reducer [ , initialValue ] )`
    fn reduce(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let record = this_iterator_record(this, context)?;
        let reducer = match callback_argument(args.get_or_undefined(0), "reduce") {
            Ok(reducer) => reducer,
            Err(err) => return record.close(Err(err), context),
        };
        let mut record = record;
        let mut counter: u64 = 0;

        let mut accumulator = match args.get(1) {
            Some(initial) => initial.clone(),
            None => {
                if record.step(context)? {
                    return Err(JsNativeError::typ()
                        .with_message("Iterator.prototype.reduce: reduce of empty iterator with no initial value")
                        .into());
                }
                counter = 1;
                record.value(context)?
            }
        };

        while !record.step(context)? {
            let value = record.value(context)?;
            let result = reducer.call(
                &JsValue::undefined(),
                &[accumulator, value, JsValue::from(counter)],
                context,
            );
            accumulator = if_abrupt_close_iterator!(result, record, context);
            counter += 1;
        }
        Ok(accumulator)
    }

    /// `Iterator.prototype.some ( predicate )`
    fn some(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let record = this_iterator_record(this, context)?;
        let predicate = match callback_argument(args.get_or_undefined(0), "some") {
            Ok(predicate) => predicate,
            Err(err) => return record.close(Err(err), context),
        };
        let mut record = record;
        let mut counter: u64 = 0;
        while !record.step(context)? {
            let value = record.value(context)?;
            let result =
                predicate.call(&JsValue::undefined(), &[value, JsValue::from(counter)], context);
            let selected = if_abrupt_close_iterator!(result, record, context);
            counter += 1;
            if selected.to_boolean() {
                return record.close(Ok(true.into()), context);
            }
        }
        Ok(false.into())
    }

    /// `Iterator.prototype.every ( predicate )`
    fn every(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let record = this_iterator_record(this, context)?;
        let predicate = match callback_argument(args.get_or_undefined(0), "every") {
            Ok(predicate) => predicate,
            Err(err) => return record.close(Err(err), context),
        };
        let mut record = record;
        let mut counter: u64 = 0;
        while !record.step(context)? {
            let value = record.value(context)?;
            let result =
                predicate.call(&JsValue::undefined(), &[value, JsValue::from(counter)], context);
            let selected = if_abrupt_close_iterator!(result, record, context);
            counter += 1;
            if !selected.to_boolean() {
                return record.close(Ok(false.into()), context);
            }
        }
        Ok(true.into())
    }

    /// `Iterator.prototype.find ( predicate )`
    fn find(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let record = this_iterator_record(this, context)?;
        let predicate = match callback_argument(args.get_or_undefined(0), "find") {
            Ok(predicate) => predicate,
            Err(err) => return record.close(Err(err), context),
        };
        let mut record = record;
        let mut counter: u64 = 0;
        while !record.step(context)? {
            let value = record.value(context)?;
            let result = predicate.call(
                &JsValue::undefined(),
                &[value.clone(), JsValue::from(counter)],
                context,
            );
            let selected = if_abrupt_close_iterator!(result, record, context);
            counter += 1;
            if selected.to_boolean() {
                return record.close(Ok(value), context);
            }
        }
        Ok(JsValue::undefined())
    }

    /// `Iterator.from ( O )`
    fn from(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0);
        let record = get_iterator_flattenable(value, context)?;

        // An iterator that already inherits from `%IteratorPrototype%`
        // (generators included) passes through untouched.
        let iterator_prototype = context
            .intrinsics()
            .objects()
            .iterator_prototypes()
            .iterator();
        let iterator_value: JsValue = record.iterator().clone().into();
        if iterator_prototype.is_prototype_of_value(&iterator_value) {
            return Ok(iterator_value);
        }

        let wrapped = JsObject::from_proto_and_data(
            Some(
                context
                    .intrinsics()
                    .objects()
                    .iterator_prototypes()
                    .wrap_for_valid(),
            ),
            ObjectData::WrapForValidIterator(record),
        );
        Ok(wrapped.into())
    }

    /// `Iterator.concat ( ...items )`
    fn concat(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let mut pending = VecDeque::with_capacity(args.len());
        for item in args {
            let Some(_) = item.as_object() else {
                return Err(JsNativeError::typ()
                    .with_message("Iterator.concat: every argument must be an object")
                    .into());
            };
            let method = item
                .get_method(JsSymbol::iterator(), context)?
                .ok_or_else(|| {
                    JsNativeError::typ()
                        .with_message("Iterator.concat: every argument must be iterable")
                })?;
            pending.push_back((item.clone(), method));
        }
        Ok(IteratorHelper::concat(pending).into_object(context).into())
    }

    /// `Iterator.zip ( iterables [ , options ] )`
    fn zip(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let iterables = args.get_or_undefined(0);
        if !iterables.is_object() {
            return Err(JsNativeError::typ()
                .with_message("Iterator.zip: iterables must be an object")
                .into());
        }
        let (mode, padding_source) = Self::zip_options(args.get_or_undefined(1), context)?;

        let items = iterable_to_list(context, iterables, None)?;
        let iters = Self::open_zip_iterators(&items, context)?;

        let padding = match (&mode, padding_source) {
            (ZipMode::Longest, Some(source)) => {
                let padding = crate::builtins::iterable::iterable_to_array(context, &source)?;
                let mut padding = padding;
                padding.resize(iters.len(), JsValue::undefined());
                padding
            }
            _ => vec![JsValue::undefined(); iters.len()],
        };

        Ok(IteratorHelper::zip(iters, mode, padding, None)
            .into_object(context)
            .into())
    }

    /// `Iterator.zipKeyed ( iterables [ , options ] )`
    fn zip_keyed(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let source = args.get_or_undefined(0).as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Iterator.zipKeyed: iterables must be an object")
        })?;
        let (mode, padding_source) = Self::zip_options(args.get_or_undefined(1), context)?;

        let mut keys = Vec::new();
        let mut values = Vec::new();
        for key in source.__own_property_keys__(context)? {
            let Some(desc) = source.__get_own_property__(&key, context)? else {
                continue;
            };
            if !desc.expect_enumerable() {
                continue;
            }
            let value = source.get(key.clone(), context)?;
            if value.is_undefined() {
                continue;
            }
            keys.push(key);
            values.push(value);
        }
        let iters = Self::open_zip_iterators(&values, context)?;

        let padding = match (&mode, padding_source) {
            (ZipMode::Longest, Some(padding_obj)) => {
                let padding_obj = padding_obj.as_object().cloned().ok_or_else(|| {
                    JsNativeError::typ().with_message("Iterator.zipKeyed: padding must be an object")
                })?;
                let mut padding = Vec::with_capacity(keys.len());
                for key in &keys {
                    padding.push(padding_obj.get(key.clone(), context)?);
                }
                padding
            }
            _ => vec![JsValue::undefined(); iters.len()],
        };

        Ok(IteratorHelper::zip(iters, mode, padding, Some(keys))
            .into_object(context)
            .into())
    }

    /// Reads `mode` and `padding` from a zip options object.
    fn zip_options(
        options: &JsValue,
        context: &mut Context,
    ) -> JsResult<(ZipMode, Option<JsValue>)> {
        if options.is_undefined() {
            return Ok((ZipMode::Shortest, None));
        }
        let options = options.as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Iterator.zip: options must be an object")
        })?;

        let mode_value = options.get("mode", context)?;
        let mode = if mode_value.is_undefined() {
            ZipMode::Shortest
        } else {
            let mode_str = mode_value
                .as_string()
                .cloned()
                .ok_or_else(|| JsNativeError::typ().with_message("Iterator.zip: invalid mode"))?;
            match mode_str.as_str() {
                "shortest" => ZipMode::Shortest,
                "longest" => ZipMode::Longest,
                "strict" => ZipMode::Strict,
                _ => {
                    return Err(JsNativeError::typ()
                        .with_message("Iterator.zip: mode must be \"shortest\", \"longest\" or \"strict\"")
                        .into())
                }
            }
        };

        // `padding` is only consulted in longest mode.
        let padding = if mode == ZipMode::Longest {
            let padding = options.get("padding", context)?;
            (!padding.is_undefined()).then_some(padding)
        } else {
            None
        };
        Ok((mode, padding))
    }

    /// Opens every zipped input, closing the already-opened ones when one
    /// fails.
    fn open_zip_iterators(
        items: &[JsValue],
        context: &mut Context,
    ) -> JsResult<Vec<Option<IteratorRecord>>> {
        let mut iters: Vec<Option<IteratorRecord>> = Vec::with_capacity(items.len());
        for item in items {
            match get_iterator_flattenable(item, context) {
                Ok(record) => iters.push(Some(record)),
                Err(err) => {
                    for record in iters.iter().flatten() {
                        record.close(Ok(JsValue::undefined()), context).ok();
                    }
                    return Err(err);
                }
            }
        }
        Ok(iters)
    }
}
