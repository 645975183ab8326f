//! Rust-implemented callables.
//!
//! A [`NativeFunction`] is either a plain function pointer or a closure with
//! captured state. The calling convention mirrors the bytecode VM's: the
//! first argument is the `this` value for ordinary calls, or `new.target`
//! when the callee is invoked with construct intent.

use crate::{value::JsValue, Context, JsResult};
use std::{fmt, rc::Rc};

/// The signature of a plain native function.
pub type NativeFunctionPointer = fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue>;

trait TraceableClosure {
    fn call(&self, this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue>;
}

struct Closure<F, T>
where
    F: Fn(&JsValue, &[JsValue], &T, &mut Context) -> JsResult<JsValue>,
{
    f: F,
    captures: T,
}

impl<F, T> TraceableClosure for Closure<F, T>
where
    F: Fn(&JsValue, &[JsValue], &T, &mut Context) -> JsResult<JsValue>,
{
    fn call(&self, this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        (self.f)(this, args, &self.captures, context)
    }
}

/// A callable implemented in Rust.
#[derive(Clone)]
pub struct NativeFunction {
    inner: Inner,
}

#[derive(Clone)]
enum Inner {
    PointerFn(NativeFunctionPointer),
    Closure(Rc<dyn TraceableClosure>),
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction").finish_non_exhaustive()
    }
}

impl NativeFunction {
    /// Creates a `NativeFunction` from a function pointer.
    #[must_use]
    pub fn from_fn_ptr(function: NativeFunctionPointer) -> Self {
        Self {
            inner: Inner::PointerFn(function),
        }
    }

    /// Creates a `NativeFunction` from a closure without captures.
    #[must_use]
    pub fn from_closure<F>(closure: F) -> Self
    where
        F: Fn(&JsValue, &[JsValue], &mut Context) -> JsResult<JsValue> + 'static,
    {
        Self::from_closure_with_captures(
            move |this, args, _captures: &(), context| closure(this, args, context),
            (),
        )
    }

    /// Creates a `NativeFunction` from a closure and a set of captured
    /// values.
    #[must_use]
    pub fn from_closure_with_captures<F, T>(closure: F, captures: T) -> Self
    where
        F: Fn(&JsValue, &[JsValue], &T, &mut Context) -> JsResult<JsValue> + 'static,
        T: 'static,
    {
        Self {
            inner: Inner::Closure(Rc::new(Closure {
                f: closure,
                captures,
            })),
        }
    }

    /// Calls the function with the given `this`, arguments and context.
    pub fn call(
        &self,
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        match &self.inner {
            Inner::PointerFn(f) => f(this, args, context),
            Inner::Closure(c) => c.call(this, args, context),
        }
    }
}
