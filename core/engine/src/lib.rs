//! The builtin-object subsystem of the Paserati runtime.
//!
//! This crate implements the dynamic value and object model (tagged values,
//! prototype-chained records, property descriptors, symbol keys), the
//! standard global objects, and the iterator/generator/promise protocols.
//! The lexer, checker, bytecode compiler and interpreter dispatch loop are
//! external; they consume the [`Context`] facade exposed here.
//!
//! # Example
//!
//! ```
//! use paserati_engine::{Context, JsValue};
//!
//! let mut context = Context::new();
//! let global = context.global_object();
//! let math = global.get("Math", &mut context).unwrap();
//! let min = math.get_v("min", &mut context).unwrap();
//! let result = min
//!     .call(&math, &[JsValue::new(3), JsValue::new(1)], &mut context)
//!     .unwrap();
//! assert_eq!(result, JsValue::new(1));
//! ```

pub mod bigint;
pub mod builtins;
pub mod context;
pub mod error;
pub mod job;
pub mod native_function;
pub mod object;
pub mod property;
pub mod realm;
pub mod string;
pub mod symbol;
pub mod types;
pub mod value;

pub use crate::{
    bigint::JsBigInt,
    context::Context,
    error::{JsError, JsNativeError},
    native_function::NativeFunction,
    object::{JsFunction, JsObject},
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    value::{JsArgs, JsValue},
};

/// The result type of every fallible engine operation.
pub type JsResult<T> = Result<T, JsError>;
