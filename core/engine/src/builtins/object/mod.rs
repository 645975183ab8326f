//! The global `Object` object.

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{
        from_property_descriptor, get_prototype_from_constructor, JsObject, ObjectData,
    },
    property::{PropertyDescriptor, PropertyKey},
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// The global `Object` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Object;

impl IntrinsicObject for Object {
    fn init(realm: &Realm) {
        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::assign, "assign", 2)
            .static_method(Self::create, "create", 2)
            .static_method(Self::define_property, "defineProperty", 3)
            .static_method(Self::entries, "entries", 1)
            .static_method(Self::freeze, "freeze", 1)
            .static_method(Self::from_entries, "fromEntries", 1)
            .static_method(Self::get_own_property_descriptor, "getOwnPropertyDescriptor", 2)
            .static_method(Self::get_own_property_names, "getOwnPropertyNames", 1)
            .static_method(Self::get_prototype_of, "getPrototypeOf", 1)
            .static_method(Self::is, "is", 2)
            .static_method(Self::is_frozen, "isFrozen", 1)
            .static_method(Self::keys, "keys", 1)
            .static_method(Self::set_prototype_of, "setPrototypeOf", 2)
            .static_method(Self::values, "values", 1)
            .method(Self::has_own_property, "hasOwnProperty", 1)
            .method(Self::is_prototype_of, "isPrototypeOf", 1)
            .method(Self::property_is_enumerable, "propertyIsEnumerable", 1)
            .method(Self::to_string, "toString", 0)
            .method(Self::value_of, "valueOf", 0)
            .build();

        // `%Object.prototype%` terminates every default prototype chain.
        realm
            .intrinsics()
            .constructors()
            .object()
            .prototype()
            .set_prototype(None);
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Object {
    const NAME: &'static str = "Object";
}

impl BuiltInConstructor for Object {
    const LENGTH: usize = 1;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::object;

    /// `Object ( [ value ] )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0);

        if !new_target.is_undefined() {
            let is_self_target = new_target
                .as_object()
                .map_or(false, |nt| {
                    JsObject::equals(
                        nt,
                        &context.intrinsics().constructors().object().constructor(),
                    )
                });
            if !is_self_target {
                let prototype =
                    get_prototype_from_constructor(new_target, StandardConstructors::object, context)?;
                return Ok(JsObject::from_proto_and_data(
                    Some(prototype),
                    ObjectData::ordinary(),
                )
                .into());
            }
        }

        if value.is_null_or_undefined() {
            return Ok(JsObject::with_object_proto(context.intrinsics()).into());
        }
        Ok(value.to_object(context)?.into())
    }
}

impl BuiltIn for Object {
    const PRIORITY: u32 = 10;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global(
            "Object",
            Type::Constructor(crate::types::FunctionSignature {
                params: vec![Type::Unknown],
                rest: None,
                returns: Box::new(Type::Object),
            }),
        );
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Object {
    /// `Object.assign ( target, ...sources )`
    fn assign(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args.get_or_undefined(0).to_object(context)?;
        for source in args.iter().skip(1) {
            if source.is_null_or_undefined() {
                continue;
            }
            let from = source.to_object(context)?;
            let keys = from.__own_property_keys__(context)?;
            for key in keys {
                let Some(desc) = from.__get_own_property__(&key, context)? else {
                    continue;
                };
                if !desc.expect_enumerable() {
                    continue;
                }
                let value = from.get(key.clone(), context)?;
                target.set(key, value, true, context)?;
            }
        }
        Ok(target.into())
    }

    /// `Object.create ( O, Properties )`
    fn create(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let prototype = args.get_or_undefined(0);
        let prototype = match prototype {
            JsValue::Null => None,
            JsValue::Object(obj) => Some(obj.clone()),
            _ => {
                return Err(JsNativeError::typ()
                    .with_message("Object.create: prototype must be an object or null")
                    .into())
            }
        };
        let obj = JsObject::from_proto_and_data(prototype, ObjectData::ordinary());

        let properties = args.get_or_undefined(1);
        if !properties.is_undefined() {
            Self::define_properties_helper(&obj, properties, context)?;
        }
        Ok(obj.into())
    }

    fn define_properties_helper(
        obj: &JsObject,
        properties: &JsValue,
        context: &mut Context,
    ) -> JsResult<()> {
        let props = properties.to_object(context)?;
        let keys = props.__own_property_keys__(context)?;
        for key in keys {
            let Some(desc) = props.__get_own_property__(&key, context)? else {
                continue;
            };
            if !desc.expect_enumerable() {
                continue;
            }
            let descriptor = props.get(key.clone(), context)?.to_property_descriptor(context)?;
            obj.define_property_or_throw(key, descriptor, context)?;
        }
        Ok(())
    }

    /// `Object.defineProperty ( O, P, Attributes )`
    fn define_property(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).as_object().cloned().ok_or_else(|| {
            JsNativeError::typ().with_message("Object.defineProperty called on non-object")
        })?;
        let key = args.get_or_undefined(1).to_property_key(context)?;
        let desc = args.get_or_undefined(2).to_property_descriptor(context)?;
        obj.define_property_or_throw(key, desc, context)?;
        Ok(obj.into())
    }

    /// `Object.getOwnPropertyDescriptor ( O, P )`
    fn get_own_property_descriptor(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).to_object(context)?;
        let key = args.get_or_undefined(1).to_property_key(context)?;
        let desc = obj.__get_own_property__(&key, context)?;
        Ok(from_property_descriptor(desc, context))
    }

    /// `Object.getOwnPropertyNames ( O )`
    fn get_own_property_names(
        _: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).to_object(context)?;
        let keys = obj.__own_property_keys__(context)?;
        let names: Vec<JsValue> = keys
            .iter()
            .filter(|key| !matches!(key, PropertyKey::Symbol(_)))
            .map(PropertyKey::to_value)
            .collect();
        Ok(crate::builtins::Array::create_array_from_list(names, context).into())
    }

    /// `Object.getPrototypeOf ( O )`
    fn get_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).to_object(context)?;
        Ok(obj
            .__get_prototype_of__(context)?
            .map_or(JsValue::null(), JsValue::from))
    }

    /// `Object.setPrototypeOf ( O, proto )`
    fn set_prototype_of(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0);
        let proto = args.get_or_undefined(1);
        let proto = match proto {
            JsValue::Null => None,
            JsValue::Object(p) => Some(p.clone()),
            _ => {
                return Err(JsNativeError::typ()
                    .with_message("Object.setPrototypeOf: prototype must be an object or null")
                    .into())
            }
        };
        let Some(object) = obj.as_object() else {
            return Ok(obj.clone());
        };
        if !object.__set_prototype_of__(proto, context)? {
            return Err(JsNativeError::typ()
                .with_message("Object.setPrototypeOf: cannot change prototype")
                .into());
        }
        Ok(obj.clone())
    }

    /// `Object.is ( value1, value2 )`
    fn is(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::same_value(args.get_or_undefined(0), args.get_or_undefined(1)).into())
    }

    /// `Object.keys ( O )`
    fn keys(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).to_object(context)?;
        let entries = obj.enumerable_own_string_keys(context)?;
        let keys: Vec<JsValue> = entries.iter().map(|(key, _)| key.to_value()).collect();
        Ok(crate::builtins::Array::create_array_from_list(keys, context).into())
    }

    /// `Object.values ( O )`
    fn values(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).to_object(context)?;
        let entries = obj.enumerable_own_string_keys(context)?;
        let values: Vec<JsValue> = entries.into_iter().map(|(_, value)| value).collect();
        Ok(crate::builtins::Array::create_array_from_list(values, context).into())
    }

    /// `Object.entries ( O )`
    fn entries(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = args.get_or_undefined(0).to_object(context)?;
        let own = obj.enumerable_own_string_keys(context)?;
        let entries: Vec<JsValue> = own
            .into_iter()
            .map(|(key, value)| {
                crate::builtins::Array::create_array_from_list(
                    [key.to_value(), value],
                    context,
                )
                .into()
            })
            .collect();
        Ok(crate::builtins::Array::create_array_from_list(entries, context).into())
    }

    /// `Object.fromEntries ( iterable )`
    fn from_entries(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let obj = JsObject::with_object_proto(context.intrinsics());
        let pairs = crate::builtins::iterable::iterable_to_list(context, args.get_or_undefined(0), None)?;
        for pair in pairs {
            let pair_obj = pair.as_object().ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("Object.fromEntries: iterator yielded a non-object entry")
            })?;
            let key = pair_obj.get(0u32, context)?.to_property_key(context)?;
            let value = pair_obj.get(1u32, context)?;
            obj.create_data_property_or_throw(key, value, context)?;
        }
        Ok(obj.into())
    }

    /// `Object.freeze ( O )`
    fn freeze(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0);
        let Some(obj) = value.as_object() else {
            return Ok(value.clone());
        };
        obj.borrow_mut().prevent_extensions();
        let keys = obj.__own_property_keys__(context)?;
        for key in keys {
            let Some(current) = obj.__get_own_property__(&key, context)? else {
                continue;
            };
            let desc = if current.is_accessor_descriptor() {
                PropertyDescriptor::builder().configurable(false).build()
            } else {
                PropertyDescriptor::builder()
                    .configurable(false)
                    .writable(false)
                    .build()
            };
            obj.define_property_or_throw(key, desc, context)?;
        }
        Ok(value.clone())
    }

    /// `Object.isFrozen ( O )`
    fn is_frozen(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let value = args.get_or_undefined(0);
        let Some(obj) = value.as_object() else {
            return Ok(true.into());
        };
        if obj.borrow().extensible() {
            return Ok(false.into());
        }
        let keys = obj.__own_property_keys__(context)?;
        for key in keys {
            let Some(desc) = obj.__get_own_property__(&key, context)? else {
                continue;
            };
            if desc.expect_configurable() || (desc.is_data_descriptor() && desc.expect_writable()) {
                return Ok(false.into());
            }
        }
        Ok(true.into())
    }

    /// `Object.prototype.hasOwnProperty ( V )`
    fn has_own_property(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let key = args.get_or_undefined(0).to_property_key(context)?;
        let obj = this.to_object(context)?;
        Ok(obj.__get_own_property__(&key, context)?.is_some().into())
    }

    /// `Object.prototype.isPrototypeOf ( V )`
    fn is_prototype_of(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let target = args.get_or_undefined(0);
        if !target.is_object() {
            return Ok(false.into());
        }
        let this_obj = this.to_object(context)?;
        Ok(this_obj.is_prototype_of_value(target).into())
    }

    /// `Object.prototype.propertyIsEnumerable ( V )`
    fn property_is_enumerable(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let key = args.get_or_undefined(0).to_property_key(context)?;
        let obj = this.to_object(context)?;
        Ok(obj
            .__get_own_property__(&key, context)?
            .map_or(false, |desc| desc.expect_enumerable())
            .into())
    }

    /// `Object.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    pub(crate) fn to_string(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        if this.is_undefined() {
            return Ok(js_string!("[object Undefined]").into());
        }
        if this.is_null() {
            return Ok(js_string!("[object Null]").into());
        }
        let obj = this.to_object(context)?;
        let tag = obj.get(JsSymbol::to_string_tag(), context)?;
        let builtin_tag = {
            let borrowed = obj.borrow();
            match &borrowed.data {
                ObjectData::Array => "Array",
                ObjectData::Function(_) | ObjectData::BoundFunction(_) => "Function",
                ObjectData::Error(_) => "Error",
                ObjectData::Boolean(_) => "Boolean",
                ObjectData::Number(_) => "Number",
                ObjectData::String(_) => "String",
                ObjectData::Date(_) => "Date",
                _ => "Object",
            }
        };
        let tag = tag
            .as_string()
            .map_or_else(|| js_string!(builtin_tag), Clone::clone);
        Ok(js_string!("[object ", &tag, "]").into())
    }

    /// `Object.prototype.valueOf ( )`
    fn value_of(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(this.to_object(context)?.into())
    }
}
