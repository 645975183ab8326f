//! The standard-object initializers and the builders used to assemble them.
//!
//! Each standard object implements [`BuiltIn`]: a stable numeric priority, a
//! type phase that publishes its compile-time surface to the checker, and a
//! runtime phase that fills in its intrinsic objects and global bindings.
//! [`initialize`] sorts the registry by ascending priority and runs all type
//! phases before all runtime phases. Priorities encode dependencies;
//! dependents read but never mutate earlier initializers' outputs.

pub mod array;
pub mod array_buffer;
pub mod boolean;
pub mod dataview;
pub mod date;
pub mod error;
pub mod function;
pub mod generator;
pub mod iterable;
pub mod iterator;
pub mod json;
pub mod map;
pub mod math;
pub mod number;
pub mod object;
pub mod paserati;
pub mod promise;
pub mod proxy;
pub mod set;
pub mod string;
pub mod symbol;
pub mod typed_array;
pub mod weak;
pub mod weak_map;
pub mod weak_set;

pub(crate) use self::{
    array::Array,
    boolean::Boolean,
    dataview::DataView,
    date::Date,
    error::{Error, RangeError, ReferenceError, SyntaxError, TypeError},
    function::BuiltInFunctionObject,
    generator::Generator,
    iterator::Iterator,
    json::Json,
    map::Map,
    math::Math,
    number::Number,
    object::Object as BuiltInObjectObject,
    paserati::Paserati,
    promise::Promise,
    proxy::Proxy,
    set::Set,
    string::String as BuiltInString,
    symbol::Symbol,
    weak::WeakRef,
    weak_map::WeakMap,
    weak_set::WeakSet,
};

use crate::{
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    js_string,
    native_function::{NativeFunction, NativeFunctionPointer},
    object::{
        FunctionBinding, JsFunction, JsObject, JsPrototype, ObjectData, CONSTRUCTOR, PROTOTYPE,
    },
    property::{Attribute, PropertyDescriptor, PropertyKey},
    realm::Realm,
    string::JsString,
    types::{TypeContext, TypeRegistry},
    value::JsValue,
    Context, JsResult,
};

/// A well-known intrinsic object: it can be retrieved from the intrinsics
/// and knows how to initialize itself.
pub(crate) trait IntrinsicObject {
    /// Initializes the intrinsic object.
    fn init(realm: &Realm);

    /// Gets the intrinsic object.
    fn get(intrinsics: &Intrinsics) -> JsObject;
}

/// A builtin that lives as a binding on the global object.
pub(crate) trait BuiltInObject: IntrinsicObject {
    /// Binding name of the builtin inside the global object.
    const NAME: &'static str;

    /// Property attributes of the global binding.
    const ATTRIBUTE: Attribute = Attribute::WRITABLE.union(Attribute::CONFIGURABLE);
}

/// A global builtin that can also be called with `new`.
pub(crate) trait BuiltInConstructor: BuiltInObject {
    /// The number of declared arguments of the constructor.
    const LENGTH: usize;

    /// The standard-constructor slot this builtin fills.
    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor;

    /// The native constructor function. Receives `new.target`, which is
    /// undefined when the callee was invoked without construct intent.
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue>;
}

/// A standard-object initializer: a stable priority and the two
/// initialization phases. The name of the initializer is its
/// [`BuiltInObject::NAME`].
pub(crate) trait BuiltIn: BuiltInObject {
    /// The priority of the initializer; lower runs earlier.
    const PRIORITY: u32;

    /// Publishes the compile-time surface to the checker.
    fn init_types(types: &mut TypeContext<'_>);

    /// Creates the runtime objects and global bindings.
    fn init_runtime(realm: &Realm);
}

struct Initializer {
    name: &'static str,
    priority: u32,
    init_types: fn(&mut TypeContext<'_>),
    init_runtime: fn(&Realm),
}

fn initializer<B: BuiltIn>() -> Initializer {
    Initializer {
        name: B::NAME,
        priority: B::PRIORITY,
        init_types: B::init_types,
        init_runtime: B::init_runtime,
    }
}

fn initializers() -> Vec<Initializer> {
    vec![
        initializer::<BuiltInObjectObject>(),
        initializer::<BuiltInFunctionObject>(),
        initializer::<Array>(),
        initializer::<BuiltInString>(),
        initializer::<Boolean>(),
        initializer::<Number>(),
        initializer::<Symbol>(),
        initializer::<Iterator>(),
        initializer::<Generator>(),
        initializer::<Map>(),
        initializer::<Set>(),
        initializer::<WeakMap>(),
        initializer::<WeakSet>(),
        initializer::<WeakRef>(),
        initializer::<Error>(),
        initializer::<RangeError>(),
        initializer::<ReferenceError>(),
        initializer::<SyntaxError>(),
        initializer::<TypeError>(),
        initializer::<Math>(),
        initializer::<Json>(),
        initializer::<Date>(),
        initializer::<Promise>(),
        initializer::<Proxy>(),
        initializer::<array_buffer::ArrayBuffer>(),
        initializer::<array_buffer::shared::SharedArrayBuffer>(),
        initializer::<typed_array::TypedArray>(),
        initializer::<typed_array::Int8Array>(),
        initializer::<typed_array::Uint8Array>(),
        initializer::<typed_array::Uint8ClampedArray>(),
        initializer::<typed_array::Int16Array>(),
        initializer::<typed_array::Uint16Array>(),
        initializer::<typed_array::Int32Array>(),
        initializer::<typed_array::Uint32Array>(),
        initializer::<typed_array::BigInt64Array>(),
        initializer::<typed_array::BigUint64Array>(),
        initializer::<typed_array::Float32Array>(),
        initializer::<typed_array::Float64Array>(),
        initializer::<DataView>(),
        initializer::<Paserati>(),
    ]
}

/// `CreateIntrinsics ( realmRec )` and `SetDefaultGlobalBindings`: sorts the
/// initializers by ascending priority, runs all type phases, then all
/// runtime phases, then defines the value-less globals.
pub(crate) fn initialize(realm: &Realm, types: &mut TypeRegistry) {
    let mut initializers = initializers();
    initializers.sort_by_key(|init| init.priority);
    debug_assert!(
        initializers.windows(2).all(|w| w[0].priority != w[1].priority),
        "duplicate initializer priority for {}",
        initializers
            .windows(2)
            .find(|w| w[0].priority == w[1].priority)
            .map_or("", |w| w[1].name),
    );

    {
        let mut type_context = TypeContext::new(types);
        for init in &initializers {
            (init.init_types)(&mut type_context);
        }
    }
    for init in &initializers {
        (init.init_runtime)(realm);
    }

    // The global object itself inherits from `%Object.prototype%`.
    realm
        .global_object()
        .set_prototype(Some(realm.intrinsics().constructors().object().prototype()));

    let restricted = Attribute::empty();
    realm.define_global("Infinity", f64::INFINITY, restricted);
    realm.define_global("NaN", f64::NAN, restricted);
    realm.define_global("undefined", JsValue::undefined(), restricted);
}

/// Defines the global binding of a builtin.
pub(crate) fn global_binding<B: BuiltInObject>(realm: &Realm) {
    let intrinsic = B::get(realm.intrinsics());
    realm.define_global(B::NAME, intrinsic, B::ATTRIBUTE);
}

// === Builders ===

/// Builder for the objects behind the standard builtins.
#[derive(Debug)]
pub(crate) struct BuiltInBuilder;

/// Builder for a fresh native function object.
pub(crate) struct BuiltInCallable<'ctx> {
    realm: &'ctx Realm,
    function: NativeFunction,
    name: JsString,
    length: usize,
}

impl BuiltInCallable<'_> {
    /// Specifies the `name` property of the function.
    pub(crate) fn name<N: Into<JsString>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    /// Specifies the `length` property of the function.
    pub(crate) const fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub(crate) fn build(self) -> JsFunction {
        let function = function::Function::new(self.function, None);
        let object = JsObject::from_proto_and_data(
            Some(self.realm.intrinsics().constructors().function().prototype()),
            ObjectData::function(function),
        );
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

/// Builder that fills an existing intrinsic object with static methods and
/// properties.
pub(crate) struct BuiltInBuilderIntrinsic<'ctx> {
    realm: &'ctx Realm,
    object: JsObject,
    prototype: JsPrototype,
}

impl BuiltInBuilderIntrinsic<'_> {
    /// Specifies the `[[Prototype]]` of the object; defaults to
    /// `%Object.prototype%`.
    pub(crate) fn prototype(mut self, prototype: JsObject) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Adds a method to the object.
    pub(crate) fn static_method<B>(
        self,
        function: NativeFunctionPointer,
        binding: B,
        length: usize,
    ) -> Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = BuiltInBuilder::callable(self.realm, function)
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
    pub(crate) fn static_property<K, V>(self, key: K, value: V, attribute: Attribute) -> Self
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
    pub(crate) fn static_accessor<K>(
        self,
        key: K,
        get: Option<JsFunction>,
        set: Option<JsFunction>,
        attribute: Attribute,
    ) -> Self
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

    pub(crate) fn build(self) {
        self.object.set_prototype(self.prototype);
    }
}

/// Builder that turns an intrinsic object into a native function.
pub(crate) struct BuiltInBuilderCallableIntrinsic<'ctx> {
    realm: &'ctx Realm,
    object: JsObject,
    function: NativeFunctionPointer,
    name: JsString,
    length: usize,
}

impl BuiltInBuilderCallableIntrinsic<'_> {
    pub(crate) fn name<N: Into<JsString>>(mut self, name: N) -> Self {
        self.name = name.into();
        self
    }

    pub(crate) const fn length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub(crate) fn build(self) {
        let function = function::Function::new(NativeFunction::from_fn_ptr(self.function), None);
        {
            let mut object = self.object.borrow_mut();
            object.data = ObjectData::function(function);
        }
        self.object
            .set_prototype(Some(self.realm.intrinsics().constructors().function().prototype()));
        self.object.insert_property(
            "length",
            PropertyDescriptor::builder()
                .value(self.length)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );
        self.object.insert_property(
            "name",
            PropertyDescriptor::builder()
                .value(self.name)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );
    }
}

/// Builder for a standard constructor and its prototype.
pub(crate) struct BuiltInConstructorWithPrototype<'ctx> {
    realm: &'ctx Realm,
    function: NativeFunctionPointer,
    name: JsString,
    length: usize,
    object: JsObject,
    prototype: JsObject,
    __proto__: JsPrototype,
    inherits: JsPrototype,
    has_prototype_property: bool,
}

impl BuiltInConstructorWithPrototype<'_> {
    /// Adds a static method to the constructor.
    pub(crate) fn static_method<B>(
        self,
        function: NativeFunctionPointer,
        binding: B,
        length: usize,
    ) -> Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = BuiltInBuilder::callable(self.realm, function)
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

    /// Adds a static data property to the constructor.
    pub(crate) fn static_property<K, V>(self, key: K, value: V, attribute: Attribute) -> Self
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

    /// Adds a static accessor property to the constructor.
    pub(crate) fn static_accessor<K>(
        self,
        key: K,
        get: Option<JsFunction>,
        set: Option<JsFunction>,
        attribute: Attribute,
    ) -> Self
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

    /// Adds a method to the constructor's prototype.
    pub(crate) fn method<B>(
        self,
        function: NativeFunctionPointer,
        binding: B,
        length: usize,
    ) -> Self
    where
        B: Into<FunctionBinding>,
    {
        let binding = binding.into();
        let function = BuiltInBuilder::callable(self.realm, function)
            .name(binding.name)
            .length(length)
            .build();
        self.prototype.insert_property(
            binding.binding,
            PropertyDescriptor::builder()
                .value(function)
                .writable(true)
                .enumerable(false)
                .configurable(true),
        );
        self
    }

    /// Adds a data property to the constructor's prototype.
    pub(crate) fn property<K, V>(self, key: K, value: V, attribute: Attribute) -> Self
    where
        K: Into<PropertyKey>,
        V: Into<JsValue>,
    {
        self.prototype.insert_property(
            key,
            PropertyDescriptor::builder()
                .value(value)
                .writable(attribute.writable())
                .enumerable(attribute.enumerable())
                .configurable(attribute.configurable()),
        );
        self
    }

    /// Adds an accessor property to the constructor's prototype.
    pub(crate) fn accessor<K>(
        self,
        key: K,
        get: Option<JsFunction>,
        set: Option<JsFunction>,
        attribute: Attribute,
    ) -> Self
    where
        K: Into<PropertyKey>,
    {
        self.prototype.insert_property(
            key,
            PropertyDescriptor::builder()
                .get(get.map(JsValue::from).unwrap_or_default())
                .set(set.map(JsValue::from).unwrap_or_default())
                .enumerable(attribute.enumerable())
                .configurable(attribute.configurable()),
        );
        self
    }

    /// Specifies the `[[Prototype]]` of the constructor function itself;
    /// defaults to `%Function.prototype%`.
    pub(crate) fn prototype(mut self, prototype: JsObject) -> Self {
        self.__proto__ = Some(prototype);
        self
    }

    /// Specifies the parent prototype which objects created by this
    /// constructor inherit from; defaults to `%Object.prototype%`.
    #[allow(clippy::missing_const_for_fn)]
    pub(crate) fn inherits(mut self, prototype: JsPrototype) -> Self {
        self.inherits = prototype;
        self
    }

    /// Omits the `prototype` property of the constructor (e.g. `Proxy`).
    pub(crate) const fn no_prototype_property(mut self) -> Self {
        self.has_prototype_property = false;
        self
    }

    pub(crate) fn build(self) {
        let function = function::Function::new(
            NativeFunction::from_fn_ptr(self.function),
            Some(function::ConstructorKind::Base),
        );
        {
            let mut object = self.object.borrow_mut();
            object.data = ObjectData::function(function);
        }
        self.object.insert_property(
            "length",
            PropertyDescriptor::builder()
                .value(self.length)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );
        self.object.insert_property(
            "name",
            PropertyDescriptor::builder()
                .value(self.name)
                .writable(false)
                .enumerable(false)
                .configurable(true),
        );
        self.object.set_prototype(self.__proto__.clone().or_else(|| {
            Some(self.realm.intrinsics().constructors().function().prototype())
        }));

        if self.has_prototype_property {
            self.object.insert_property(
                PROTOTYPE,
                PropertyDescriptor::builder()
                    .value(self.prototype.clone())
                    .writable(false)
                    .enumerable(false)
                    .configurable(false),
            );
            self.prototype.insert_property(
                CONSTRUCTOR,
                PropertyDescriptor::builder()
                    .value(self.object.clone())
                    .writable(true)
                    .enumerable(false)
                    .configurable(true),
            );
            self.prototype.set_prototype(self.inherits.clone());
        }
    }
}

impl<'ctx> BuiltInBuilder {
    /// Starts building a fresh native function.
    pub(crate) fn callable(
        realm: &'ctx Realm,
        function: NativeFunctionPointer,
    ) -> BuiltInCallable<'ctx> {
        BuiltInCallable {
            realm,
            function: NativeFunction::from_fn_ptr(function),
            name: js_string!(""),
            length: 0,
        }
    }

    /// Starts filling the intrinsic object of `I`.
    pub(crate) fn with_intrinsic<I: IntrinsicObject>(
        realm: &'ctx Realm,
    ) -> BuiltInBuilderIntrinsic<'ctx> {
        BuiltInBuilderIntrinsic {
            realm,
            object: I::get(realm.intrinsics()),
            prototype: Some(realm.intrinsics().constructors().object().prototype()),
        }
    }

    /// Starts filling an explicit intrinsic object.
    pub(crate) fn with_object(realm: &'ctx Realm, object: JsObject) -> BuiltInBuilderIntrinsic<'ctx> {
        BuiltInBuilderIntrinsic {
            realm,
            object,
            prototype: Some(realm.intrinsics().constructors().object().prototype()),
        }
    }

    /// Turns the intrinsic object of `I` into a native function.
    pub(crate) fn callable_with_intrinsic<I: IntrinsicObject>(
        realm: &'ctx Realm,
        function: NativeFunctionPointer,
    ) -> BuiltInBuilderCallableIntrinsic<'ctx> {
        BuiltInBuilderCallableIntrinsic {
            realm,
            object: I::get(realm.intrinsics()),
            function,
            name: js_string!(""),
            length: 0,
        }
    }

    /// Starts building a standard constructor and its prototype.
    pub(crate) fn from_standard_constructor<SC: BuiltInConstructor>(
        realm: &'ctx Realm,
    ) -> BuiltInConstructorWithPrototype<'ctx> {
        let constructor = SC::STANDARD_CONSTRUCTOR(realm.intrinsics().constructors());
        BuiltInConstructorWithPrototype {
            realm,
            function: SC::constructor,
            name: js_string!(SC::NAME),
            length: SC::LENGTH,
            object: constructor.constructor(),
            prototype: constructor.prototype(),
            __proto__: Some(realm.intrinsics().constructors().function().prototype()),
            inherits: Some(realm.intrinsics().constructors().object().prototype()),
            has_prototype_property: true,
        }
    }
}
