//! The global `FormData` object: an insertion-ordered multimap of
//! string-keyed entries.

#[cfg(test)]
mod tests;

use paserati_engine::{
    builtins::array::Array,
    error::JsNativeError,
    object::{FunctionObjectBuilder, JsObject, NativeObject, ObjectData},
    property::{Attribute, PropertyDescriptor},
    Context, JsResult, JsString, JsSymbol, JsValue, NativeFunction,
};

/// The entry list of a `FormData` instance.
#[derive(Debug, Default)]
pub struct FormData {
    entries: Vec<(JsString, JsValue)>,
}

fn this_form_data<R>(
    this: &JsValue,
    f: impl FnOnce(&mut FormData) -> R,
) -> JsResult<R> {
    let obj = this.as_object().ok_or_else(|| {
        JsNativeError::typ().with_message("`this` is not a FormData")
    })?;
    let mut borrowed = obj.borrow_mut();
    let data = borrowed
        .downcast_native_mut::<FormData>()
        .ok_or_else(|| JsNativeError::typ().with_message("`this` is not a FormData"))?;
    Ok(f(data))
}

fn name_argument(args: &[JsValue], context: &mut Context) -> JsResult<JsString> {
    args.first()
        .cloned()
        .unwrap_or_default()
        .to_string(context)
}

impl FormData {
    /// Builds the `FormData` constructor and binds it as a global.
    pub fn register(context: &mut Context) -> JsResult<()> {
        let prototype = JsObject::with_object_proto(context.intrinsics());

        let method = |context: &mut Context,
                      prototype: &JsObject,
                      function: NativeFunction,
                      name: &str,
                      length: usize| {
            let function = FunctionObjectBuilder::new(context, function)
                .name(name)
                .length(length)
                .build();
            prototype.insert_property(
                name,
                PropertyDescriptor::builder()
                    .value(function)
                    .writable(true)
                    .enumerable(false)
                    .configurable(true),
            );
        };

        // `FormData.prototype.append ( name, value )`
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let name = name_argument(args, context)?;
                let value = args.get(1).cloned().unwrap_or_default();
                this_form_data(this, |data| data.entries.push((name, value)))?;
                Ok(JsValue::undefined())
            }),
            "append",
            2,
        );

        // `FormData.prototype.set ( name, value )`: replaces in place.
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let name = name_argument(args, context)?;
                let value = args.get(1).cloned().unwrap_or_default();
                this_form_data(this, |data| {
                    match data.entries.iter().position(|(n, _)| n == &name) {
                        Some(index) => {
                            data.entries[index].1 = value;
                            data.entries
                                .retain_mut_keep_first(&name, index);
                        }
                        None => data.entries.push((name, value)),
                    }
                })?;
                Ok(JsValue::undefined())
            }),
            "set",
            2,
        );

        // `FormData.prototype.get ( name )`
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let name = name_argument(args, context)?;
                this_form_data(this, |data| {
                    data.entries
                        .iter()
                        .find(|(n, _)| n == &name)
                        .map(|(_, v)| v.clone())
                        .unwrap_or(JsValue::null())
                })
            }),
            "get",
            1,
        );

        // `FormData.prototype.getAll ( name )`
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let name = name_argument(args, context)?;
                let values = this_form_data(this, |data| {
                    data.entries
                        .iter()
                        .filter(|(n, _)| n == &name)
                        .map(|(_, v)| v.clone())
                        .collect::<Vec<_>>()
                })?;
                Ok(Array::create_array_from_list(values, context).into())
            }),
            "getAll",
            1,
        );

        // `FormData.prototype.has ( name )`
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let name = name_argument(args, context)?;
                this_form_data(this, |data| {
                    data.entries.iter().any(|(n, _)| n == &name).into()
                })
            }),
            "has",
            1,
        );

        // `FormData.prototype.delete ( name )`
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let name = name_argument(args, context)?;
                this_form_data(this, |data| {
                    data.entries.retain(|(n, _)| n != &name);
                })?;
                Ok(JsValue::undefined())
            }),
            "delete",
            1,
        );

        // `FormData.prototype.forEach ( callback [ , thisArg ] )`
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, args, context| {
                let callback = args
                    .first()
                    .and_then(JsValue::as_callable)
                    .cloned()
                    .ok_or_else(|| {
                        JsNativeError::typ()
                            .with_message("FormData.forEach: callback is not callable")
                    })?;
                let this_arg = args.get(1).cloned().unwrap_or_default();
                let entries =
                    this_form_data(this, |data| data.entries.clone())?;
                for (name, value) in entries {
                    callback.call(
                        &this_arg,
                        &[value, name.into(), this.clone()],
                        context,
                    )?;
                }
                Ok(JsValue::undefined())
            }),
            "forEach",
            1,
        );

        // `entries`/`keys`/`values` answer with array iterators over a
        // snapshot of the entry list.
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, _args, context| {
                let entries = this_form_data(this, |data| data.entries.clone())?;
                let pairs: Vec<JsValue> = entries
                    .into_iter()
                    .map(|(name, value)| {
                        Array::create_array_from_list([name.into(), value], context).into()
                    })
                    .collect();
                let array: JsValue = Array::create_array_from_list(pairs, context).into();
                array.invoke("values", &[], context)
            }),
            "entries",
            0,
        );
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, _args, context| {
                let entries = this_form_data(this, |data| data.entries.clone())?;
                let keys: Vec<JsValue> =
                    entries.into_iter().map(|(name, _)| name.into()).collect();
                let array: JsValue = Array::create_array_from_list(keys, context).into();
                array.invoke("values", &[], context)
            }),
            "keys",
            0,
        );
        method(
            context,
            &prototype,
            NativeFunction::from_fn_ptr(|this, _args, context| {
                let entries = this_form_data(this, |data| data.entries.clone())?;
                let values: Vec<JsValue> =
                    entries.into_iter().map(|(_, value)| value).collect();
                let array: JsValue = Array::create_array_from_list(values, context).into();
                array.invoke("values", &[], context)
            }),
            "values",
            0,
        );

        prototype.insert_property(
            JsSymbol::to_string_tag(),
            PropertyDescriptor::builder()
                .value("FormData")
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );

        // The constructor allocates a fresh entry list per instance.
        let constructor_prototype = prototype.clone();
        let constructor = FunctionObjectBuilder::new(
            context,
            NativeFunction::from_closure_with_captures(
                |_this, _args, prototype: &JsObject, _context| {
                    Ok(JsObject::from_proto_and_data(
                        Some(prototype.clone()),
                        ObjectData::native_object(Box::new(FormData::default())
                            as Box<dyn NativeObject>),
                    )
                    .into())
                },
                constructor_prototype,
            ),
        )
        .name("FormData")
        .length(0)
        .constructor(true)
        .build();

        let constructor_obj: JsObject = constructor.into();
        constructor_obj.insert_property(
            "prototype",
            PropertyDescriptor::builder()
                .value(prototype.clone())
                .writable(false)
                .enumerable(false)
                .configurable(false),
        );
        prototype.insert_property(
            "constructor",
            PropertyDescriptor::builder()
                .value(constructor_obj.clone())
                .writable(true)
                .enumerable(false)
                .configurable(true),
        );

        context.register_global_property(
            "FormData",
            constructor_obj,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
        Ok(())
    }
}

trait RetainKeepFirst {
    fn retain_mut_keep_first(&mut self, name: &JsString, keep: usize);
}

impl RetainKeepFirst for Vec<(JsString, JsValue)> {
    /// Drops every entry named `name` except the one at `keep`.
    fn retain_mut_keep_first(&mut self, name: &JsString, keep: usize) {
        let mut index = 0;
        self.retain(|(n, _)| {
            let retain = n != name || index == keep;
            index += 1;
            retain
        });
    }
}
