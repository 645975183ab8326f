//! The `JsSymbol` primitive and the well-known symbol singletons.
//!
//! Symbols have a stable identity independent of their description: two
//! symbols are equal iff they are the same allocation. Well-known symbols
//! are created once per process and used as protocol keys (`@@iterator`,
//! `@@toStringTag`, ...). The inner record is atomically reference counted
//! so that the global symbol registry can live in a `static`.

use crate::{js_string, string::JsString};
use once_cell::sync::Lazy;
use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Weak,
    },
};

/// Reserved number of well-known symbol hashes; runtime symbols start after.
const RESERVED_SYMBOL_HASHES: u64 = 16;

static SYMBOL_HASH_COUNT: AtomicU64 = AtomicU64::new(RESERVED_SYMBOL_HASHES);

#[derive(Debug)]
struct Inner {
    hash: u64,
    description: Option<Box<str>>,
}

/// A unique symbol value.
#[derive(Clone, Debug)]
pub struct JsSymbol {
    inner: Arc<Inner>,
}

/// A non-owning handle to a symbol, used by the weak collections.
#[derive(Clone, Debug)]
pub struct WeakJsSymbol {
    inner: Weak<Inner>,
}

impl WeakJsSymbol {
    /// Upgrades to a [`JsSymbol`] if the symbol is still alive.
    pub fn upgrade(&self) -> Option<JsSymbol> {
        self.inner.upgrade().map(|inner| JsSymbol { inner })
    }
}

impl JsSymbol {
    /// Creates a new unique symbol, returning `None` if the process ran out
    /// of symbol hashes.
    pub fn new(description: Option<JsString>) -> Option<Self> {
        let hash = SYMBOL_HASH_COUNT.fetch_add(1, Ordering::Relaxed);
        if hash == u64::MAX {
            return None;
        }
        Some(Self {
            inner: Arc::new(Inner {
                hash,
                description: description.map(|d| Box::from(d.as_str())),
            }),
        })
    }

    fn well_known(hash: u64, description: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                hash,
                description: Some(Box::from(description)),
            }),
        }
    }

    /// Returns the description of the symbol, if any.
    pub fn description(&self) -> Option<JsString> {
        self.inner.description.as_deref().map(JsString::new)
    }

    /// Returns the internal identity hash of the symbol.
    pub fn hash(&self) -> u64 {
        self.inner.hash
    }

    /// `SymbolDescriptiveString ( sym )`
    pub fn descriptive_string(&self) -> JsString {
        match self.inner.description.as_deref() {
            Some(desc) => js_string!("Symbol(", desc, ")"),
            None => js_string!("Symbol()"),
        }
    }

    /// Creates a non-owning handle to this symbol.
    pub fn downgrade(&self) -> WeakJsSymbol {
        WeakJsSymbol {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Pointer identity of the symbol allocation.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }
}

impl PartialEq for JsSymbol {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for JsSymbol {}

impl Hash for JsSymbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash.hash(state);
    }
}

impl fmt::Display for JsSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.descriptive_string())
    }
}

struct WellKnownSymbols {
    iterator: JsSymbol,
    async_iterator: JsSymbol,
    to_string_tag: JsSymbol,
    to_primitive: JsSymbol,
    has_instance: JsSymbol,
    is_concat_spreadable: JsSymbol,
    species: JsSymbol,
    r#match: JsSymbol,
    replace: JsSymbol,
    search: JsSymbol,
    split: JsSymbol,
    unscopables: JsSymbol,
    dispose: JsSymbol,
}

static WELL_KNOWN_SYMBOLS: Lazy<WellKnownSymbols> = Lazy::new(|| WellKnownSymbols {
    iterator: JsSymbol::well_known(0, "Symbol.iterator"),
    async_iterator: JsSymbol::well_known(1, "Symbol.asyncIterator"),
    to_string_tag: JsSymbol::well_known(2, "Symbol.toStringTag"),
    to_primitive: JsSymbol::well_known(3, "Symbol.toPrimitive"),
    has_instance: JsSymbol::well_known(4, "Symbol.hasInstance"),
    is_concat_spreadable: JsSymbol::well_known(5, "Symbol.isConcatSpreadable"),
    species: JsSymbol::well_known(6, "Symbol.species"),
    r#match: JsSymbol::well_known(7, "Symbol.match"),
    replace: JsSymbol::well_known(8, "Symbol.replace"),
    search: JsSymbol::well_known(9, "Symbol.search"),
    split: JsSymbol::well_known(10, "Symbol.split"),
    unscopables: JsSymbol::well_known(11, "Symbol.unscopables"),
    dispose: JsSymbol::well_known(12, "Symbol.dispose"),
});

impl JsSymbol {
    /// `@@iterator`
    pub fn iterator() -> Self {
        WELL_KNOWN_SYMBOLS.iterator.clone()
    }

    /// `@@asyncIterator`
    pub fn async_iterator() -> Self {
        WELL_KNOWN_SYMBOLS.async_iterator.clone()
    }

    /// `@@toStringTag`
    pub fn to_string_tag() -> Self {
        WELL_KNOWN_SYMBOLS.to_string_tag.clone()
    }

    /// `@@toPrimitive`
    pub fn to_primitive() -> Self {
        WELL_KNOWN_SYMBOLS.to_primitive.clone()
    }

    /// `@@hasInstance`
    pub fn has_instance() -> Self {
        WELL_KNOWN_SYMBOLS.has_instance.clone()
    }

    /// `@@isConcatSpreadable`
    pub fn is_concat_spreadable() -> Self {
        WELL_KNOWN_SYMBOLS.is_concat_spreadable.clone()
    }

    /// `@@species`
    pub fn species() -> Self {
        WELL_KNOWN_SYMBOLS.species.clone()
    }

    /// `@@match`
    pub fn r#match() -> Self {
        WELL_KNOWN_SYMBOLS.r#match.clone()
    }

    /// `@@replace`
    pub fn replace() -> Self {
        WELL_KNOWN_SYMBOLS.replace.clone()
    }

    /// `@@search`
    pub fn search() -> Self {
        WELL_KNOWN_SYMBOLS.search.clone()
    }

    /// `@@split`
    pub fn split() -> Self {
        WELL_KNOWN_SYMBOLS.split.clone()
    }

    /// `@@unscopables`
    pub fn unscopables() -> Self {
        WELL_KNOWN_SYMBOLS.unscopables.clone()
    }

    /// `@@dispose`
    pub fn dispose() -> Self {
        WELL_KNOWN_SYMBOLS.dispose.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::JsSymbol;

    #[test]
    fn identity_is_not_description() {
        let a = JsSymbol::new(Some("desc".into())).unwrap();
        let b = JsSymbol::new(Some("desc".into())).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn well_known_are_singletons() {
        assert_eq!(JsSymbol::iterator(), JsSymbol::iterator());
        assert_ne!(JsSymbol::iterator(), JsSymbol::async_iterator());
    }

    #[test]
    fn descriptive_string() {
        let sym = JsSymbol::new(Some("x".into())).unwrap();
        assert_eq!(sym.descriptive_string(), "Symbol(x)");
        let anon = JsSymbol::new(None).unwrap();
        assert_eq!(anon.descriptive_string(), "Symbol()");
    }
}
