//! Checker-facing type descriptors.
//!
//! Standard objects describe their compile-time surface with these
//! declarative descriptors during the type phase of initialization. The
//! external checker consumes the registry; nothing here has a runtime
//! footprint. Utility types (`Partial`, `Pick`, ...) are registered as
//! parameterized aliases over special forms that the checker lowers itself.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

/// A declarative type descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// The `any` type.
    Any,
    /// The `unknown` type.
    Unknown,
    /// The `never` type.
    Never,
    /// The `void` type.
    Void,
    /// The `undefined` type.
    Undefined,
    /// The `null` type.
    Null,
    /// The `boolean` primitive.
    Boolean,
    /// The `number` primitive.
    Number,
    /// The `string` primitive.
    String,
    /// The `symbol` primitive.
    Symbol,
    /// The `bigint` primitive.
    BigInt,
    /// The `object` keyword.
    Object,
    /// A nominal reference to a declared type, e.g. `Map`.
    Named(String),
    /// An instantiation of a generic type, e.g. `Map<string, number>`.
    Generic {
        /// The name of the generic type.
        name: String,
        /// The type arguments.
        args: Vec<Type>,
    },
    /// A reference to an in-scope type parameter.
    Param(String),
    /// A union of types.
    Union(Vec<Type>),
    /// An array type `T[]`.
    Array(Box<Type>),
    /// A function type.
    Function(FunctionSignature),
    /// A constructor type.
    Constructor(FunctionSignature),
    /// A structural interface.
    Interface(InterfaceType),
    /// A utility-type special form, lowered by the checker.
    Utility {
        /// Which utility type this is.
        kind: UtilityKind,
        /// The arguments of the special form.
        args: Vec<Type>,
    },
}

impl Type {
    /// Shorthand for a function type.
    #[must_use]
    pub fn function(params: Vec<Type>, returns: Type) -> Self {
        Self::Function(FunctionSignature {
            params,
            rest: None,
            returns: Box::new(returns),
        })
    }

    /// Shorthand for a variadic function type.
    #[must_use]
    pub fn variadic_function(params: Vec<Type>, rest: Type, returns: Type) -> Self {
        Self::Function(FunctionSignature {
            params,
            rest: Some(Box::new(rest)),
            returns: Box::new(returns),
        })
    }

    /// Shorthand for a generic instantiation.
    #[must_use]
    pub fn generic(name: &str, args: Vec<Type>) -> Self {
        Self::Generic {
            name: name.to_owned(),
            args,
        }
    }

    /// Shorthand for a nominal reference.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self::Named(name.to_owned())
    }

    /// Shorthand for a type-parameter reference.
    #[must_use]
    pub fn param(name: &str) -> Self {
        Self::Param(name.to_owned())
    }
}

/// The signature of a function or constructor type.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    /// The declared parameter types.
    pub params: Vec<Type>,
    /// The rest-parameter element type, if the function is variadic.
    pub rest: Option<Box<Type>>,
    /// The return type.
    pub returns: Box<Type>,
}

/// A structural interface descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceType {
    /// The interface name.
    pub name: String,
    /// Declared type parameters.
    pub type_params: Vec<String>,
    /// The members of the interface.
    pub members: Vec<(String, Type)>,
}

/// The utility-type special forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityKind {
    /// `Partial<T>`
    Partial,
    /// `Required<T>`
    Required,
    /// `Readonly<T>`
    Readonly,
    /// `Pick<T, K>`
    Pick,
    /// `Omit<T, K>`
    Omit,
    /// `Record<K, V>`
    Record,
    /// `ReturnType<T>`
    ReturnType,
    /// `Parameters<T>`
    Parameters,
    /// `ConstructorParameters<T>`
    ConstructorParameters,
    /// `InstanceType<T>`
    InstanceType,
}

/// A named, possibly parameterized type alias.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAlias {
    /// The declared type parameters.
    pub params: Vec<String>,
    /// The aliased type.
    pub body: Type,
}

/// The primitives whose property accesses resolve through a wrapper
/// prototype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `number`
    Number,
    /// `boolean`
    Boolean,
    /// `symbol`
    Symbol,
    /// `bigint`
    BigInt,
}

/// Everything the initializers declared for the checker.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    globals: IndexMap<String, Type>,
    aliases: IndexMap<String, TypeAlias>,
    primitive_prototypes: FxHashMap<Primitive, Type>,
}

impl TypeRegistry {
    /// Looks up the declared type of a global.
    #[must_use]
    pub fn global(&self, name: &str) -> Option<&Type> {
        self.globals.get(name)
    }

    /// Looks up a type alias.
    #[must_use]
    pub fn alias(&self, name: &str) -> Option<&TypeAlias> {
        self.aliases.get(name)
    }

    /// Looks up the prototype type of a primitive.
    #[must_use]
    pub fn primitive_prototype(&self, primitive: Primitive) -> Option<&Type> {
        self.primitive_prototypes.get(&primitive)
    }

    /// The declared globals, in initialization order.
    pub fn globals(&self) -> impl Iterator<Item = (&str, &Type)> {
        self.globals.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    /// The declared aliases, in initialization order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &TypeAlias)> {
        self.aliases.iter().map(|(name, ty)| (name.as_str(), ty))
    }
}

/// The interface initializers use to publish type information.
#[derive(Debug)]
pub struct TypeContext<'a> {
    registry: &'a mut TypeRegistry,
}

impl<'a> TypeContext<'a> {
    pub(crate) fn new(registry: &'a mut TypeRegistry) -> Self {
        Self { registry }
    }

    /// Declares the type of a global binding.
    pub fn define_global(&mut self, name: &str, ty: Type) {
        self.registry.globals.insert(name.to_owned(), ty);
    }

    /// Declares a type alias.
    pub fn define_type_alias(&mut self, name: &str, alias: TypeAlias) {
        self.registry.aliases.insert(name.to_owned(), alias);
    }

    /// Declares the prototype type used for property access on a primitive.
    pub fn set_primitive_prototype(&mut self, primitive: Primitive, ty: Type) {
        self.registry.primitive_prototypes.insert(primitive, ty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_round_trip() {
        let mut registry = TypeRegistry::default();
        let mut ctx = TypeContext::new(&mut registry);
        ctx.define_global("answer", Type::Number);
        ctx.define_type_alias(
            "Partial",
            TypeAlias {
                params: vec!["T".into()],
                body: Type::Utility {
                    kind: UtilityKind::Partial,
                    args: vec![Type::param("T")],
                },
            },
        );
        assert_eq!(registry.global("answer"), Some(&Type::Number));
        assert!(registry.alias("Partial").is_some());
        assert!(registry.global("missing").is_none());
    }
}
