//! Builders for function objects and plain object literals.

use super::{FunctionBinding, JsFunction, JsObject, ObjectData};
use crate::{
    builtins::function::{ConstructorKind, Function},
    js_string,
    native_function::NativeFunction,
    property::{Attribute, PropertyDescriptor, PropertyKey},
    string::JsString,
    value::JsValue,
    Context,
};

/// Builder for a native function object, with `name` and `length`
/// properties.
#[derive(Debug)]
pub struct FunctionObjectBuilder<'ctx> {
    context: &'ctx mut Context,
    function: NativeFunction,
    name: JsString,
    length: usize,
    constructor: bool,
}

impl<'ctx> FunctionObjectBuilder<'ctx> {
    /// Creates a new builder for the given native function.
    pub fn new(context: &'ctx mut Context, function: NativeFunction) -> Self {
        Self {
            context,
            function,
            name: js_string!(),
            length: 0,
            constructor: false,
        }
    }

    /// Specifies the `name` property of the function.
    #[must_use]
    pub fn name<N: Into<JsString>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Specifies the `length` property of the function.
    #[must_use]
    pub const fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    /// Specifies whether the function can be invoked with `new`.
    #[must_use]
    pub const fn constructor(mut self, constructor: bool) -> Self {
        self.constructor = constructor;
        self
    }

    /// Builds the function object.
    #[must_use]
    pub fn build(self) -> JsFunction {
        let function = Function::new(
            self.function,
            self.constructor.then_some(ConstructorKind::Base),
        );
        let prototype = self
            .context
            .intrinsics()
            .constructors()
            .function()
            .prototype();
        let object =
            JsObject::from_proto_and_data(Some(prototype), ObjectData::function(function));
        object.insert_property(
            "length",
            PropertyDescriptor::builder()
                .value(self.length)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );
        object.insert_property(
            "name",
            PropertyDescriptor::builder()
                .value(self.name)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );
        JsFunction::from_object_unchecked(object)
    }
}

/// Builder for namespace-like objects holding native methods and data
/// properties.
#[derive(Debug)]
pub struct ObjectInitializer<'ctx> {
    context: &'ctx mut Context,
    object: JsObject,
}

impl<'ctx> ObjectInitializer<'ctx> {
    /// Creates a new builder over an empty ordinary object.
    pub fn new(context: &'ctx mut Context) -> Self {
        let object = JsObject::with_object_proto(context.intrinsics());
        Self { context, object }
    }

    /// Creates a new builder over an existing object.
    pub fn from_object(context: &'ctx mut Context, object: JsObject) -> Self {
        Self { context, object }
    }

    /// Adds a native method to the object.
    pub fn function<B>(&mut self, function: NativeFunction, binding: B, length: usize) -> &mut Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = FunctionObjectBuilder::new(self.context, function)
            .name(binding.name)
            .length(length)
            .build();
        self.object.insert_property(
            binding.binding,
            PropertyDescriptor::builder()
                .value(function)
                .writable(true)
                .enumerable(false)
                .configurable(true),
        );
        self
    }

    /// Adds a data property to the object.
    pub fn property<K, V>(&mut self, key: K, value: V, attribute: Attribute) -> &mut Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.object.insert_property(
            key,
            PropertyDescriptor::builder()
                .value(value)
                .writable(attribute.writable())
                .enumerable(attribute.enumerable())
                .configurable(attribute.configurable()),
        );
        self
    }

    /// Adds an accessor property to the object.
    pub fn accessor<K>(
        &mut self,
        key: K,
        get: Option<JsFunction>,
        set: Option<JsFunction>,
        attribute: Attribute,
    ) -> &mut Self
    where
        K: Into<PropertyKey>,
    {
        self.object.insert_property(
            key,
            PropertyDescriptor::builder()
                .get(get.map(JsValue::from).unwrap_or_default())
                .set(set.map(JsValue::from).unwrap_or_default())
                .enumerable(attribute.enumerable())
                .configurable(attribute.configurable()),
        );
        self
    }

    /// Returns the built object.
    #[must_use]
    pub fn build(&mut self) -> JsObject {
        self.object.clone()
    }
}
