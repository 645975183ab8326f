//! The intrinsic objects of a realm.
//!
//! Every intrinsic is allocated empty when the realm is created, so that
//! initializers can wire cross-references (prototype chains, `constructor`
//! back-links) in any order, then filled in by its standard object's
//! initializer.

use crate::object::{JsObject, ObjectData};

fn bare_object() -> JsObject {
    JsObject::from_proto_and_data(None, ObjectData::ordinary())
}

/// A standard constructor and its prototype object.
#[derive(Debug, Clone)]
pub struct StandardConstructor {
    constructor: JsObject,
    prototype: JsObject,
}

impl Default for StandardConstructor {
    fn default() -> Self {
        Self {
            constructor: bare_object(),
            prototype: bare_object(),
        }
    }
}

impl StandardConstructor {
    fn with_prototype(prototype: JsObject) -> Self {
        Self {
            constructor: bare_object(),
            prototype,
        }
    }

    /// The constructor object.
    #[must_use]
    pub fn constructor(&self) -> JsObject {
        self.constructor.clone()
    }

    /// The prototype object.
    #[must_use]
    pub fn prototype(&self) -> JsObject {
        self.prototype.clone()
    }
}

macro_rules! standard_constructors {
    ($( $(#[$attr:meta])* $name:ident ),* $(,)?) => {
        /// The standard constructors of the realm.
        #[derive(Debug)]
        pub struct StandardConstructors {
            $( $name: StandardConstructor, )*
        }

        impl StandardConstructors {
            $(
                $(#[$attr])*
                #[must_use]
                pub fn $name(&self) -> &StandardConstructor {
                    &self.$name
                }
            )*
        }
    };
}

standard_constructors! {
    /// `%Object%`
    object,
    /// `%Function%`
    function,
    /// `%Array%`
    array,
    /// `%Boolean%`
    boolean,
    /// `%Number%`
    number,
    /// `%String%`
    string,
    /// `%Symbol%`
    symbol,
    /// `%Error%`
    error,
    /// `%TypeError%`
    type_error,
    /// `%RangeError%`
    range_error,
    /// `%SyntaxError%`
    syntax_error,
    /// `%ReferenceError%`
    reference_error,
    /// `%Map%`
    map,
    /// `%Set%`
    set,
    /// `%WeakMap%`
    weak_map,
    /// `%WeakSet%`
    weak_set,
    /// `%WeakRef%`
    weak_ref,
    /// `%Promise%`
    promise,
    /// `%Proxy%`
    proxy,
    /// `%Date%`
    date,
    /// `%DataView%`
    data_view,
    /// `%ArrayBuffer%`
    array_buffer,
    /// `%SharedArrayBuffer%`
    shared_array_buffer,
    /// `%TypedArray%`
    typed_array,
    /// `%Int8Array%`
    int8_array,
    /// `%Uint8Array%`
    uint8_array,
    /// `%Uint8ClampedArray%`
    uint8_clamped_array,
    /// `%Int16Array%`
    int16_array,
    /// `%Uint16Array%`
    uint16_array,
    /// `%Int32Array%`
    int32_array,
    /// `%Uint32Array%`
    uint32_array,
    /// `%BigInt64Array%`
    big_int64_array,
    /// `%BigUint64Array%`
    big_uint64_array,
    /// `%Float32Array%`
    float32_array,
    /// `%Float64Array%`
    float64_array,
    /// `%Iterator%`
    iterator,
}

/// The built-in iterator prototypes.
#[derive(Debug)]
pub struct IteratorPrototypes {
    iterator: JsObject,
    helper: JsObject,
    wrap_for_valid: JsObject,
    array: JsObject,
    string: JsObject,
    map: JsObject,
    set: JsObject,
    regexp_string: JsObject,
}

impl IteratorPrototypes {
    /// `%IteratorPrototype%`
    #[must_use]
    pub fn iterator(&self) -> JsObject {
        self.iterator.clone()
    }

    /// `%IteratorHelperPrototype%`
    #[must_use]
    pub fn helper(&self) -> JsObject {
        self.helper.clone()
    }

    /// `%WrapForValidIteratorPrototype%`
    #[must_use]
    pub fn wrap_for_valid(&self) -> JsObject {
        self.wrap_for_valid.clone()
    }

    /// `%ArrayIteratorPrototype%`
    #[must_use]
    pub fn array(&self) -> JsObject {
        self.array.clone()
    }

    /// `%StringIteratorPrototype%`
    #[must_use]
    pub fn string(&self) -> JsObject {
        self.string.clone()
    }

    /// `%MapIteratorPrototype%`
    #[must_use]
    pub fn map(&self) -> JsObject {
        self.map.clone()
    }

    /// `%SetIteratorPrototype%`
    #[must_use]
    pub fn set(&self) -> JsObject {
        self.set.clone()
    }

    /// `%RegExpStringIteratorPrototype%`
    #[must_use]
    pub fn regexp_string(&self) -> JsObject {
        self.regexp_string.clone()
    }
}

/// Intrinsic objects that are not constructors.
#[derive(Debug)]
pub struct IntrinsicObjects {
    iterator_prototypes: IteratorPrototypes,
    generator: JsObject,
    generator_namespace: JsObject,
    math: JsObject,
    json: JsObject,
    paserati: JsObject,
    is_nan: JsObject,
    is_finite: JsObject,
    parse_int: JsObject,
    parse_float: JsObject,
    clock: JsObject,
}

impl IntrinsicObjects {
    /// The iterator prototype objects.
    #[must_use]
    pub fn iterator_prototypes(&self) -> &IteratorPrototypes {
        &self.iterator_prototypes
    }

    /// `%GeneratorPrototype%`
    #[must_use]
    pub fn generator(&self) -> JsObject {
        self.generator.clone()
    }

    /// The `Generator` namespace object exposed as a global.
    #[must_use]
    pub fn generator_namespace(&self) -> JsObject {
        self.generator_namespace.clone()
    }

    /// The `Math` namespace object.
    #[must_use]
    pub fn math(&self) -> JsObject {
        self.math.clone()
    }

    /// The `JSON` namespace object.
    #[must_use]
    pub fn json(&self) -> JsObject {
        self.json.clone()
    }

    /// The `Paserati` namespace object.
    #[must_use]
    pub fn paserati(&self) -> JsObject {
        self.paserati.clone()
    }

    /// The global `isNaN` function object.
    #[must_use]
    pub fn is_nan(&self) -> JsObject {
        self.is_nan.clone()
    }

    /// The global `isFinite` function object.
    #[must_use]
    pub fn is_finite(&self) -> JsObject {
        self.is_finite.clone()
    }

    /// The global `parseInt` function object.
    #[must_use]
    pub fn parse_int(&self) -> JsObject {
        self.parse_int.clone()
    }

    /// The global `parseFloat` function object.
    #[must_use]
    pub fn parse_float(&self) -> JsObject {
        self.parse_float.clone()
    }

    /// The global `clock` function object.
    #[must_use]
    pub fn clock(&self) -> JsObject {
        self.clock.clone()
    }
}

/// The intrinsics of a realm: standard constructors plus the loose
/// intrinsic objects.
#[derive(Debug)]
pub struct Intrinsics {
    constructors: StandardConstructors,
    objects: IntrinsicObjects,
}

impl Default for Intrinsics {
    fn default() -> Self {
        // `%IteratorPrototype%` doubles as the prototype of the `Iterator`
        // constructor, so both slots must share one object.
        let iterator_prototype = bare_object();

        let constructors = StandardConstructors {
            object: StandardConstructor::default(),
            function: StandardConstructor::default(),
            array: StandardConstructor::default(),
            boolean: StandardConstructor::default(),
            number: StandardConstructor::default(),
            string: StandardConstructor::default(),
            symbol: StandardConstructor::default(),
            error: StandardConstructor::default(),
            type_error: StandardConstructor::default(),
            range_error: StandardConstructor::default(),
            syntax_error: StandardConstructor::default(),
            reference_error: StandardConstructor::default(),
            map: StandardConstructor::default(),
            set: StandardConstructor::default(),
            weak_map: StandardConstructor::default(),
            weak_set: StandardConstructor::default(),
            weak_ref: StandardConstructor::default(),
            promise: StandardConstructor::default(),
            proxy: StandardConstructor::default(),
            date: StandardConstructor::default(),
            data_view: StandardConstructor::default(),
            array_buffer: StandardConstructor::default(),
            shared_array_buffer: StandardConstructor::default(),
            typed_array: StandardConstructor::default(),
            int8_array: StandardConstructor::default(),
            uint8_array: StandardConstructor::default(),
            uint8_clamped_array: StandardConstructor::default(),
            int16_array: StandardConstructor::default(),
            uint16_array: StandardConstructor::default(),
            int32_array: StandardConstructor::default(),
            uint32_array: StandardConstructor::default(),
            big_int64_array: StandardConstructor::default(),
            big_uint64_array: StandardConstructor::default(),
            float32_array: StandardConstructor::default(),
            float64_array: StandardConstructor::default(),
            iterator: StandardConstructor::with_prototype(iterator_prototype.clone()),
        };

        let objects = IntrinsicObjects {
            iterator_prototypes: IteratorPrototypes {
                iterator: iterator_prototype,
                helper: bare_object(),
                wrap_for_valid: bare_object(),
                array: bare_object(),
                string: bare_object(),
                map: bare_object(),
                set: bare_object(),
                regexp_string: bare_object(),
            },
            generator: bare_object(),
            generator_namespace: bare_object(),
            math: bare_object(),
            json: bare_object(),
            paserati: bare_object(),
            is_nan: bare_object(),
            is_finite: bare_object(),
            parse_int: bare_object(),
            parse_float: bare_object(),
            clock: bare_object(),
        };

        Self {
            constructors,
            objects,
        }
    }
}

impl Intrinsics {
    /// The standard constructors.
    #[must_use]
    pub fn constructors(&self) -> &StandardConstructors {
        &self.constructors
    }

    /// The loose intrinsic objects.
    #[must_use]
    pub fn objects(&self) -> &IntrinsicObjects {
        &self.objects
    }
}
