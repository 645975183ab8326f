//! A realm: intrinsics plus the global object.

use crate::{
    context::intrinsics::Intrinsics,
    object::{JsObject, ObjectData},
    property::{Attribute, PropertyDescriptor},
    value::JsValue,
};
use std::rc::Rc;

#[derive(Debug)]
struct RealmInner {
    intrinsics: Intrinsics,
    global_object: JsObject,
}

/// A cheaply clonable handle to a realm.
#[derive(Clone, Debug)]
pub struct Realm {
    inner: Rc<RealmInner>,
}

impl Realm {
    /// Creates a realm with empty intrinsics; [`crate::builtins`]
    /// initializers fill them in.
    pub(crate) fn create() -> Self {
        Self {
            inner: Rc::new(RealmInner {
                intrinsics: Intrinsics::default(),
                global_object: JsObject::from_proto_and_data(None, ObjectData::ordinary()),
            }),
        }
    }

    /// The intrinsics of this realm.
    #[must_use]
    pub fn intrinsics(&self) -> &Intrinsics {
        &self.inner.intrinsics
    }

    /// The global object of this realm.
    #[must_use]
    pub fn global_object(&self) -> JsObject {
        self.inner.global_object.clone()
    }

    /// Defines a global binding on the global object.
    pub(crate) fn define_global<V: Into<JsValue>>(
        &self,
        name: &str,
        value: V,
        attribute: Attribute,
    ) {
        self.inner.global_object.insert_property(
            name,
            PropertyDescriptor::builder()
                .value(value)
                .writable(attribute.writable())
                .enumerable(attribute.enumerable())
                .configurable(attribute.configurable()),
        );
    }
}
