//! Error types used by every fallible engine operation.
//!
//! A [`JsError`] is either *native* (a [`JsNativeError`] created by the
//! engine itself) or *opaque* (an arbitrary value thrown by user code). A
//! native error only becomes an error object when it crosses into the value
//! domain via [`JsError::to_opaque`], which assigns the right prototype,
//! installs `message`, `cause` and `stack`, and marks the object with
//! `[[ErrorData]]`.

use crate::{
    builtins::error::ErrorKind,
    js_string,
    object::{JsObject, ObjectData},
    property::PropertyDescriptor,
    value::JsValue,
    Context,
};
use thiserror::Error;

/// The error type returned by all engine operations.
#[derive(Debug, Clone, Error)]
#[error(transparent)]
pub struct JsError {
    inner: Repr,
}

#[derive(Debug, Clone, Error)]
enum Repr {
    #[error(transparent)]
    Native(JsNativeError),
    #[error("opaque error: {}", .0.display())]
    Opaque(JsValue),
}

impl JsError {
    /// Creates a new error from a native error.
    #[must_use]
    pub fn from_native(err: JsNativeError) -> Self {
        Self {
            inner: Repr::Native(err),
        }
    }

    /// Creates a new error from a thrown value.
    #[must_use]
    pub fn from_opaque(value: JsValue) -> Self {
        Self {
            inner: Repr::Opaque(value),
        }
    }

    /// Returns the native error, if this is one.
    #[must_use]
    pub fn as_native(&self) -> Option<&JsNativeError> {
        match &self.inner {
            Repr::Native(err) => Some(err),
            Repr::Opaque(_) => None,
        }
    }

    /// Returns the thrown value, if this is an opaque error.
    #[must_use]
    pub fn as_opaque(&self) -> Option<&JsValue> {
        match &self.inner {
            Repr::Native(_) => None,
            Repr::Opaque(value) => Some(value),
        }
    }

    /// Converts the error into a value, realizing native errors as error
    /// objects.
    pub fn to_opaque(&self, context: &mut Context) -> JsValue {
        match &self.inner {
            Repr::Native(err) => err.to_opaque(context).into(),
            Repr::Opaque(value) => value.clone(),
        }
    }
}

impl From<JsNativeError> for JsError {
    fn from(err: JsNativeError) -> Self {
        Self::from_native(err)
    }
}

/// The kind of a native error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JsNativeErrorKind {
    /// A plain `Error`.
    #[error("Error")]
    Error,
    /// A `RangeError`: a value is outside its allowed range.
    #[error("RangeError")]
    Range,
    /// A `ReferenceError`: reserved for the host; the engine's builtins
    /// never raise it.
    #[error("ReferenceError")]
    Reference,
    /// A `SyntaxError`: malformed input where a strict parse is required.
    #[error("SyntaxError")]
    Syntax,
    /// A `TypeError`: an operand has the wrong type.
    #[error("TypeError")]
    Type,
}

impl JsNativeErrorKind {
    pub(crate) const fn as_error_kind(self) -> ErrorKind {
        match self {
            Self::Error => ErrorKind::Error,
            Self::Range => ErrorKind::Range,
            Self::Reference => ErrorKind::Reference,
            Self::Syntax => ErrorKind::Syntax,
            Self::Type => ErrorKind::Type,
        }
    }
}

/// An error created by the engine, carrying a kind, a message and an
/// optional cause.
#[derive(Debug, Clone, Error)]
#[error("{kind}: {message}")]
pub struct JsNativeError {
    /// The kind of the error.
    pub kind: JsNativeErrorKind,
    message: Box<str>,
    #[source]
    cause: Option<Box<JsError>>,
}

impl JsNativeError {
    /// Creates a new `Error`.
    #[must_use]
    pub fn error() -> Self {
        Self {
            kind: JsNativeErrorKind::Error,
            message: Box::from(""),
            cause: None,
        }
    }

    /// Creates a new `TypeError`.
    #[must_use]
    pub fn typ() -> Self {
        Self {
            kind: JsNativeErrorKind::Type,
            message: Box::from(""),
            cause: None,
        }
    }

    /// Creates a new `RangeError`.
    #[must_use]
    pub fn range() -> Self {
        Self {
            kind: JsNativeErrorKind::Range,
            message: Box::from(""),
            cause: None,
        }
    }

    /// Creates a new `ReferenceError`.
    #[must_use]
    pub fn reference() -> Self {
        Self {
            kind: JsNativeErrorKind::Reference,
            message: Box::from(""),
            cause: None,
        }
    }

    /// Creates a new `SyntaxError`.
    #[must_use]
    pub fn syntax() -> Self {
        Self {
            kind: JsNativeErrorKind::Syntax,
            message: Box::from(""),
            cause: None,
        }
    }

    /// Sets the message of the error.
    #[must_use]
    pub fn with_message<S: Into<Box<str>>>(mut self, message: S) -> Self {
        self.message = message.into();
        self
    }

    /// Sets the cause of the error.
    #[must_use]
    pub fn with_cause<E: Into<JsError>>(mut self, cause: E) -> Self {
        self.cause = Some(Box::new(cause.into()));
        self
    }

    /// Returns the message of the error.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Realizes the error as an error object with the right prototype,
    /// `message`, `cause`, `stack` and `[[ErrorData]]`.
    pub fn to_opaque(&self, context: &mut Context) -> JsObject {
        let constructors = context.intrinsics().constructors();
        let prototype = match self.kind {
            JsNativeErrorKind::Error => constructors.error().prototype(),
            JsNativeErrorKind::Range => constructors.range_error().prototype(),
            JsNativeErrorKind::Reference => constructors.reference_error().prototype(),
            JsNativeErrorKind::Syntax => constructors.syntax_error().prototype(),
            JsNativeErrorKind::Type => constructors.type_error().prototype(),
        };

        let o = JsObject::from_proto_and_data(
            Some(prototype),
            ObjectData::error(self.kind.as_error_kind()),
        );

        o.insert_property(
            "message",
            PropertyDescriptor::builder()
                .value(js_string!(&*self.message))
                .writable(true)
                .enumerable(false)
                .configurable(true),
        );

        if let Some(cause) = &self.cause {
            let cause = cause.to_opaque(context);
            o.insert_property(
                "cause",
                PropertyDescriptor::builder()
                    .value(cause)
                    .writable(true)
                    .enumerable(false)
                    .configurable(true),
            );
        }

        let stack = context.host_hooks().capture_stack_trace();
        o.insert_property(
            "stack",
            PropertyDescriptor::builder()
                .value(js_string!(stack.join("\n")))
                .writable(true)
                .enumerable(false)
                .configurable(true),
        );

        o
    }
}
