//! The object record and its internal-slot payloads.
//!
//! Every heap object is an [`Object`]: a prototype slot, an ordered property
//! table, an extensibility flag and an [`ObjectData`] payload holding the
//! internal slots of the standard object it implements (map entries, promise
//! state, a suspended generator frame, ...).

mod builders;
pub(crate) mod internal_methods;
mod jsobject;
mod property_map;

pub use builders::{FunctionObjectBuilder, ObjectInitializer};
pub use jsobject::{JsFunction, JsObject, WeakJsObject};
pub(crate) use jsobject::get_prototype_from_constructor;
pub(crate) use property_map::PropertyMap;

use crate::{
    builtins::{
        array::array_iterator::ArrayIterator,
        array_buffer::{shared::SharedArrayBuffer, ArrayBuffer},
        dataview::DataView,
        date::Date,
        error::ErrorKind,
        function::{BoundFunction, Function},
        generator::Generator,
        iterable::IteratorRecord,
        iterator::helper::IteratorHelper,
        map::{map_iterator::MapIterator, ordered_map::OrderedMap},
        promise::Promise,
        proxy::Proxy,
        set::{ordered_set::OrderedSet, set_iterator::SetIterator},
        string::string_iterator::StringIterator,
        typed_array::IntegerIndexed,
        weak::WeakRef,
        weak_map::WeakMap,
        weak_set::WeakSet,
    },
    property::{PropertyDescriptor, PropertyKey},
    string::JsString,
    symbol::JsSymbol,
    value::JsValue,
};
use std::any::Any;
use std::fmt;

/// The key of the `prototype` property of constructors.
pub const PROTOTYPE: &str = "prototype";

/// The key of the `constructor` property of prototypes.
pub const CONSTRUCTOR: &str = "constructor";

/// The prototype slot of an object: another object, or `None` for a
/// `null` prototype.
pub type JsPrototype = Option<JsObject>;

/// Host-defined internal data attached to an object, used by embedders to
/// implement their own builtins on top of the engine.
pub trait NativeObject: Any + fmt::Debug {
    /// Returns a `&dyn Any` view of the data.
    fn as_any(&self) -> &dyn Any;

    /// Returns a `&mut dyn Any` view of the data.
    fn as_mut_any(&mut self) -> &mut dyn Any;
}

impl<T: Any + fmt::Debug> NativeObject for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_mut_any(&mut self) -> &mut dyn Any {
        self
    }
}

/// The internal-slot payload of an object.
#[derive(Debug)]
pub enum ObjectData {
    /// A plain object with no internal slots.
    Ordinary,
    /// An array exotic object; its elements live in the property table's
    /// indexed storage.
    Array,
    /// An array iterator and its `[[IteratedObject]]`/`[[NextIndex]]` slots.
    ArrayIterator(ArrayIterator),
    /// A byte buffer, possibly detached.
    ArrayBuffer(ArrayBuffer),
    /// A `Boolean` wrapper with its `[[BooleanData]]`.
    Boolean(bool),
    /// A bound function and its `[[BoundThis]]`/`[[BoundArguments]]`.
    BoundFunction(BoundFunction),
    /// A view over a buffer with an endianness flag per access.
    DataView(DataView),
    /// A date holding its `[[DateValue]]` epoch-millisecond timestamp.
    Date(Date),
    /// An error object; the presence of this data is the `[[ErrorData]]`
    /// marker.
    Error(ErrorKind),
    /// A callable, possibly a constructor.
    Function(Function),
    /// A generator and its suspended execution frame.
    Generator(Generator),
    /// A lazy iterator-helper pipeline stage.
    IteratorHelper(IteratorHelper),
    /// A `Map` and its insertion-ordered entries.
    Map(OrderedMap<JsValue>),
    /// A map iterator.
    MapIterator(MapIterator),
    /// Host-defined internal data.
    NativeObject(Box<dyn NativeObject>),
    /// A `Number` wrapper with its `[[NumberData]]`.
    Number(f64),
    /// A promise: state, result and reaction queues.
    Promise(Promise),
    /// A proxy and its target/handler pair, until revoked.
    Proxy(Proxy),
    /// A `Set` and its insertion-ordered entries.
    Set(OrderedSet),
    /// A set iterator.
    SetIterator(SetIterator),
    /// A shared byte buffer.
    SharedArrayBuffer(SharedArrayBuffer),
    /// A `String` wrapper with its `[[StringData]]`.
    String(JsString),
    /// A string iterator.
    StringIterator(StringIterator),
    /// A `Symbol` wrapper with its `[[SymbolData]]`.
    Symbol(JsSymbol),
    /// A typed-array view over a buffer.
    TypedArray(IntegerIndexed),
    /// A `WeakMap` and its identity-keyed weak entries.
    WeakMap(WeakMap),
    /// A `WeakRef` and its weak target.
    WeakRef(WeakRef),
    /// A `WeakSet` and its identity-keyed weak entries.
    WeakSet(WeakSet),
    /// The `[[Iterated]]` record of a wrapped valid iterator.
    WrapForValidIterator(IteratorRecord),
}

impl ObjectData {
    /// Ordinary object data.
    #[must_use]
    pub fn ordinary() -> Self {
        Self::Ordinary
    }

    /// Array object data.
    #[must_use]
    pub fn array() -> Self {
        Self::Array
    }

    /// Error object data of the given kind.
    #[must_use]
    pub fn error(kind: ErrorKind) -> Self {
        Self::Error(kind)
    }

    /// Function object data.
    #[must_use]
    pub fn function(function: Function) -> Self {
        Self::Function(function)
    }

    /// Map object data.
    #[must_use]
    pub fn map(map: OrderedMap<JsValue>) -> Self {
        Self::Map(map)
    }

    /// Set object data.
    #[must_use]
    pub fn set(set: OrderedSet) -> Self {
        Self::Set(set)
    }

    /// Promise object data.
    #[must_use]
    pub fn promise(promise: Promise) -> Self {
        Self::Promise(promise)
    }

    /// Host-defined object data.
    #[must_use]
    pub fn native_object(data: Box<dyn NativeObject>) -> Self {
        Self::NativeObject(data)
    }
}

/// The heap record behind a [`JsObject`] handle.
#[derive(Debug)]
pub struct Object {
    /// The internal-slot payload.
    pub(crate) data: ObjectData,
    properties: PropertyMap,
    prototype: JsPrototype,
    extensible: bool,
}

impl Default for Object {
    fn default() -> Self {
        Self {
            data: ObjectData::Ordinary,
            properties: PropertyMap::default(),
            prototype: None,
            extensible: true,
        }
    }
}

macro_rules! data_accessors {
    ($( $is:ident, $as_ref:ident, $as_mut:ident, $variant:ident => $ty:ty );* $(;)?) => {
        $(
            /// Checks the payload kind of this object.
            #[must_use]
            pub fn $is(&self) -> bool {
                matches!(self.data, ObjectData::$variant(_))
            }

            /// Returns a reference to the payload, if it has this kind.
            #[must_use]
            pub fn $as_ref(&self) -> Option<&$ty> {
                match &self.data {
                    ObjectData::$variant(data) => Some(data),
                    _ => None,
                }
            }

            /// Returns a mutable reference to the payload, if it has this kind.
            #[must_use]
            pub fn $as_mut(&mut self) -> Option<&mut $ty> {
                match &mut self.data {
                    ObjectData::$variant(data) => Some(data),
                    _ => None,
                }
            }
        )*
    }
}

impl Object {
    /// Returns the property table of the object.
    #[must_use]
    pub(crate) fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Returns a mutable reference to the property table.
    pub(crate) fn properties_mut(&mut self) -> &mut PropertyMap {
        &mut self.properties
    }

    /// Returns the prototype slot.
    #[must_use]
    pub fn prototype(&self) -> &JsPrototype {
        &self.prototype
    }

    /// Overwrites the prototype slot without any checks.
    pub fn set_prototype(&mut self, prototype: JsPrototype) {
        self.prototype = prototype;
    }

    /// Checks if new properties may be added to the object.
    #[must_use]
    pub const fn extensible(&self) -> bool {
        self.extensible
    }

    /// Marks the object as non-extensible.
    pub fn prevent_extensions(&mut self) {
        self.extensible = false;
    }

    /// Inserts a property into the table without running descriptor
    /// validation; used by builders and initializers.
    pub fn insert<K, P>(&mut self, key: K, property: P) -> Option<PropertyDescriptor>
    where
        K: Into<PropertyKey>,
        P: Into<PropertyDescriptor>,
    {
        self.properties
            .insert(&key.into(), property.into().complete())
    }

    /// Checks if the object is an array exotic object.
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self.data, ObjectData::Array)
    }

    /// Checks if the object is an ordinary object.
    #[must_use]
    pub fn is_ordinary(&self) -> bool {
        matches!(self.data, ObjectData::Ordinary)
    }

    /// Returns the error kind if this is an error object.
    #[must_use]
    pub fn as_error(&self) -> Option<ErrorKind> {
        match self.data {
            ObjectData::Error(kind) => Some(kind),
            _ => None,
        }
    }

    /// Returns the wrapped boolean of a `Boolean` wrapper.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self.data {
            ObjectData::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the wrapped number of a `Number` wrapper.
    #[must_use]
    pub fn as_number(&self) -> Option<f64> {
        match self.data {
            ObjectData::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the wrapped string of a `String` wrapper.
    #[must_use]
    pub fn as_string(&self) -> Option<JsString> {
        match &self.data {
            ObjectData::String(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Returns the wrapped symbol of a `Symbol` wrapper.
    #[must_use]
    pub fn as_symbol(&self) -> Option<JsSymbol> {
        match &self.data {
            ObjectData::Symbol(s) => Some(s.clone()),
            _ => None,
        }
    }

    /// Returns the host-defined data of the object, downcast to `T`.
    #[must_use]
    pub fn downcast_native<T: Any>(&self) -> Option<&T> {
        match &self.data {
            ObjectData::NativeObject(data) => data.as_any().downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Returns the host-defined data of the object, downcast mutably to `T`.
    #[must_use]
    pub fn downcast_native_mut<T: Any>(&mut self) -> Option<&mut T> {
        match &mut self.data {
            ObjectData::NativeObject(data) => data.as_mut_any().downcast_mut::<T>(),
            _ => None,
        }
    }

    data_accessors! {
        is_array_buffer, as_array_buffer, as_array_buffer_mut, ArrayBuffer => ArrayBuffer;
        is_shared_array_buffer, as_shared_array_buffer, as_shared_array_buffer_mut, SharedArrayBuffer => SharedArrayBuffer;
        is_array_iterator, as_array_iterator, as_array_iterator_mut, ArrayIterator => ArrayIterator;
        is_bound_function, as_bound_function, as_bound_function_mut, BoundFunction => BoundFunction;
        is_data_view, as_data_view, as_data_view_mut, DataView => DataView;
        is_date, as_date, as_date_mut, Date => Date;
        is_function, as_function, as_function_mut, Function => Function;
        is_generator, as_generator, as_generator_mut, Generator => Generator;
        is_iterator_helper, as_iterator_helper, as_iterator_helper_mut, IteratorHelper => IteratorHelper;
        is_map, as_map, as_map_mut, Map => OrderedMap<JsValue>;
        is_map_iterator, as_map_iterator, as_map_iterator_mut, MapIterator => MapIterator;
        is_promise, as_promise, as_promise_mut, Promise => Promise;
        is_proxy, as_proxy, as_proxy_mut, Proxy => Proxy;
        is_set, as_set, as_set_mut, Set => OrderedSet;
        is_set_iterator, as_set_iterator, as_set_iterator_mut, SetIterator => SetIterator;
        is_string_iterator, as_string_iterator, as_string_iterator_mut, StringIterator => StringIterator;
        is_typed_array, as_typed_array, as_typed_array_mut, TypedArray => IntegerIndexed;
        is_weak_map, as_weak_map, as_weak_map_mut, WeakMap => WeakMap;
        is_weak_ref, as_weak_ref, as_weak_ref_mut, WeakRef => WeakRef;
        is_weak_set, as_weak_set, as_weak_set_mut, WeakSet => WeakSet;
        is_wrap_for_valid_iterator, as_wrap_for_valid_iterator, as_wrap_for_valid_iterator_mut, WrapForValidIterator => IteratorRecord;
    }
}

/// The binding of a builtin method: the property key it is stored under and
/// the `name` property of the function.
#[derive(Debug, Clone)]
pub struct FunctionBinding {
    pub(crate) binding: PropertyKey,
    pub(crate) name: JsString,
}

impl From<&str> for FunctionBinding {
    fn from(name: &str) -> Self {
        let name = JsString::from(name);
        Self {
            binding: name.clone().into(),
            name,
        }
    }
}

impl From<JsString> for FunctionBinding {
    fn from(name: JsString) -> Self {
        Self {
            binding: name.clone().into(),
            name,
        }
    }
}

impl From<JsSymbol> for FunctionBinding {
    fn from(symbol: JsSymbol) -> Self {
        let name = JsString::from(format!("[{}]", symbol.descriptive_string().as_str()));
        Self {
            binding: symbol.into(),
            name,
        }
    }
}

impl From<(JsSymbol, &str)> for FunctionBinding {
    fn from((symbol, name): (JsSymbol, &str)) -> Self {
        Self {
            binding: symbol.into(),
            name: name.into(),
        }
    }
}

/// `FromPropertyDescriptor ( Desc )`
///
/// Converts a descriptor into an ordinary object with `value`/`writable` or
/// `get`/`set` plus `enumerable`/`configurable` fields.
pub(crate) fn from_property_descriptor(
    desc: Option<PropertyDescriptor>,
    context: &mut crate::Context,
) -> JsValue {
    let Some(desc) = desc else {
        return JsValue::undefined();
    };

    fn data_property<V: Into<JsValue>>(value: V) -> PropertyDescriptor {
        PropertyDescriptor::builder()
            .value(value)
            .writable(true)
            .enumerable(true)
            .configurable(true)
            .build()
    }

    let obj = JsObject::with_object_proto(context.intrinsics());
    if desc.is_data_descriptor() {
        obj.insert_property("value", data_property(desc.expect_value()));
        obj.insert_property("writable", data_property(desc.expect_writable()));
    } else if desc.is_accessor_descriptor() {
        obj.insert_property("get", data_property(desc.get().cloned().unwrap_or_default()));
        obj.insert_property("set", data_property(desc.set().cloned().unwrap_or_default()));
    }
    obj.insert_property("enumerable", data_property(desc.expect_enumerable()));
    obj.insert_property("configurable", data_property(desc.expect_configurable()));
    obj.into()
}
