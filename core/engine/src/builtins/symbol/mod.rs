//! The global `Symbol` object and the global symbol registry.
//!
//! `Symbol.for`/`Symbol.keyFor` consult a process-wide registry. Keys are
//! stored as plain `Box<str>` so the registry can live in a `static`
//! without tying it to any one realm's interner.

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::JsObject,
    property::Attribute,
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use rustc_hash::FxHasher;
use std::hash::BuildHasherDefault;

type FxDashMap<K, V> = DashMap<K, V, BuildHasherDefault<FxHasher>>;

static GLOBAL_SYMBOL_REGISTRY: Lazy<GlobalSymbolRegistry> = Lazy::new(GlobalSymbolRegistry::new);

struct GlobalSymbolRegistry {
    keys: FxDashMap<Box<str>, JsSymbol>,
    symbols: FxDashMap<JsSymbol, Box<str>>,
}

impl GlobalSymbolRegistry {
    fn new() -> Self {
        Self {
            keys: FxDashMap::default(),
            symbols: FxDashMap::default(),
        }
    }

    fn get_or_create_symbol(&self, key: &JsString) -> JsResult<JsSymbol> {
        let slice = key.as_str();
        if let Some(symbol) = self.keys.get(slice) {
            return Ok(symbol.clone());
        }

        let symbol = JsSymbol::new(Some(key.clone())).ok_or_else(|| {
            JsNativeError::range()
                .with_message("reached the maximum number of symbols that can be created")
        })?;
        self.keys.insert(Box::from(slice), symbol.clone());
        self.symbols.insert(symbol.clone(), Box::from(slice));
        Ok(symbol)
    }

    fn get_key(&self, sym: &JsSymbol) -> Option<JsString> {
        self.symbols.get(sym).map(|key| js_string!(&**key))
    }

    fn contains(&self, sym: &JsSymbol) -> bool {
        self.symbols.contains_key(sym)
    }
}

/// Checks if `sym` was created through `Symbol.for`. Registered symbols
/// cannot be held weakly.
pub(crate) fn is_registered_symbol(sym: &JsSymbol) -> bool {
    GLOBAL_SYMBOL_REGISTRY.contains(sym)
}

/// The global `Symbol` builtin.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Symbol;

impl IntrinsicObject for Symbol {
    fn init(realm: &Realm) {
        let attribute = Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT;

        let to_primitive = BuiltInBuilder::callable(realm, Self::to_primitive)
            .name("[Symbol.toPrimitive]")
            .length(1)
            .build();

        let get_description = BuiltInBuilder::callable(realm, Self::get_description)
            .name("get description")
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::for_, "for", 1)
            .static_method(Self::key_for, "keyFor", 1)
            .static_property("asyncIterator", JsSymbol::async_iterator(), attribute)
            .static_property("dispose", JsSymbol::dispose(), attribute)
            .static_property("hasInstance", JsSymbol::has_instance(), attribute)
            .static_property(
                "isConcatSpreadable",
                JsSymbol::is_concat_spreadable(),
                attribute,
            )
            .static_property("iterator", JsSymbol::iterator(), attribute)
            .static_property("match", JsSymbol::r#match(), attribute)
            .static_property("replace", JsSymbol::replace(), attribute)
            .static_property("search", JsSymbol::search(), attribute)
            .static_property("species", JsSymbol::species(), attribute)
            .static_property("split", JsSymbol::split(), attribute)
            .static_property("toPrimitive", JsSymbol::to_primitive(), attribute)
            .static_property("toStringTag", JsSymbol::to_string_tag(), attribute)
            .static_property("unscopables", JsSymbol::unscopables(), attribute)
            .method(Self::to_string, "toString", 0)
            .method(Self::value_of, "valueOf", 0)
            .accessor(
                "description",
                Some(get_description),
                None,
                Attribute::CONFIGURABLE | Attribute::NON_ENUMERABLE,
            )
            .property(
                JsSymbol::to_string_tag(),
                Self::NAME,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .property(
                JsSymbol::to_primitive(),
                to_primitive,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

impl BuiltInObject for Symbol {
    const NAME: &'static str = "Symbol";
}

impl BuiltInConstructor for Symbol {
    const LENGTH: usize = 0;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::symbol;

    /// `Symbol ( [ description ] )`
    ///
    /// `Symbol` is incomplete as a constructor: `new Symbol()` is rejected.
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. If NewTarget is not undefined, throw a TypeError exception.
        if !new_target.is_undefined() {
            return Err(JsNativeError::typ()
                .with_message("Symbol is not a constructor")
                .into());
        }

        // 2. If description is undefined, let descString be undefined.
        // 3. Else, let descString be ? ToString(description).
        let description = match args.get(0) {
            Some(value) if !value.is_undefined() => Some(value.to_string(context)?),
            _ => None,
        };

        // 4. Return a new unique Symbol value whose [[Description]] is descString.
        Ok(JsSymbol::new(description)
            .ok_or_else(|| {
                JsNativeError::range()
                    .with_message("reached the maximum number of symbols that can be created")
            })?
            .into())
    }
}

impl BuiltIn for Symbol {
    const PRIORITY: u32 = 70;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Symbol", Type::named("SymbolConstructor"));
        types.set_primitive_prototype(crate::types::Primitive::Symbol, Type::named("Symbol"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Symbol {
    fn this_symbol_value(value: &JsValue) -> JsResult<JsSymbol> {
        value
            .as_symbol()
            .or_else(|| value.as_object().and_then(|obj| obj.borrow().as_symbol()))
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("'this' is not a Symbol")
                    .into()
            })
    }

    /// `Symbol.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    pub(crate) fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let symbol = Self::this_symbol_value(this)?;
        Ok(symbol.descriptive_string().into())
    }

    /// `Symbol.prototype.valueOf ( )`
    pub(crate) fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let symbol = Self::this_symbol_value(this)?;
        Ok(JsValue::Symbol(symbol))
    }

    /// `get Symbol.prototype.description`
    pub(crate) fn get_description(
        this: &JsValue,
        _: &[JsValue],
        _: &mut Context,
    ) -> JsResult<JsValue> {
        let sym = Self::this_symbol_value(this)?;
        Ok(sym.description().map_or(JsValue::undefined(), JsValue::from))
    }

    /// `Symbol.for ( key )`
    pub(crate) fn for_(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string_key = args
            .get(0)
            .cloned()
            .unwrap_or_default()
            .to_string(context)?;
        GLOBAL_SYMBOL_REGISTRY
            .get_or_create_symbol(&string_key)
            .map(JsValue::from)
    }

    /// `Symbol.keyFor ( sym )`
    pub(crate) fn key_for(_: &JsValue, args: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let sym = args.get_or_undefined(0).as_symbol().ok_or_else(|| {
            JsNativeError::typ().with_message("Symbol.keyFor: sym is not a symbol")
        })?;
        Ok(GLOBAL_SYMBOL_REGISTRY
            .get_key(&sym)
            .map(JsValue::from)
            .unwrap_or_default())
    }

    /// `Symbol.prototype [ @@toPrimitive ] ( hint )`
    pub(crate) fn to_primitive(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let sym = Self::this_symbol_value(this)?;
        Ok(sym.into())
    }
}
