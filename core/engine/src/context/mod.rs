//! The execution context: the host-VM facade consumed by the builtins and
//! exposed to embedders.

pub mod hooks;
pub mod intrinsics;

pub use hooks::{DefaultHooks, HostHooks};

use crate::{
    builtins,
    job::{JobQueue, NativeJob, SimpleJobQueue},
    realm::Realm,
    types::TypeRegistry,
    value::JsValue,
    JsResult,
};
use intrinsics::Intrinsics;
use std::rc::Rc;

/// The engine context: realm, job queue, host hooks and the type registry
/// produced by initialization.
pub struct Context {
    realm: Realm,
    job_queue: Rc<dyn JobQueue>,
    hooks: Rc<dyn HostHooks>,
    types: TypeRegistry,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

impl Default for Context {
    fn default() -> Self {
        ContextBuilder::default().build()
    }
}

impl Context {
    /// Creates a context with the default job queue and host hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder to customize the context.
    #[must_use]
    pub fn builder() -> ContextBuilder {
        ContextBuilder::default()
    }

    /// The realm of this context.
    #[must_use]
    pub fn realm(&self) -> &Realm {
        &self.realm
    }

    /// The intrinsics of the active realm.
    #[must_use]
    pub fn intrinsics(&self) -> &Intrinsics {
        self.realm.intrinsics()
    }

    /// The global object of the active realm.
    #[must_use]
    pub fn global_object(&self) -> crate::object::JsObject {
        self.realm.global_object()
    }

    /// The microtask queue.
    #[must_use]
    pub fn job_queue(&self) -> Rc<dyn JobQueue> {
        self.job_queue.clone()
    }

    /// The host hooks.
    #[must_use]
    pub fn host_hooks(&self) -> Rc<dyn HostHooks> {
        self.hooks.clone()
    }

    /// The type registry produced by the initializers, consumed by the
    /// checker.
    #[must_use]
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Enqueues a microtask job.
    pub fn enqueue_job(&mut self, job: NativeJob) {
        let queue = self.job_queue.clone();
        queue.enqueue_promise_job(job, self);
    }

    /// Drains the microtask queue; the host calls this once per synchronous
    /// turn.
    pub fn run_jobs(&mut self) {
        let queue = self.job_queue.clone();
        queue.run_jobs(self);
    }

    /// Defines a global binding, as used by host-side extensions like
    /// `console`.
    pub fn register_global_property<V: Into<JsValue>>(
        &mut self,
        name: &str,
        value: V,
        attribute: crate::property::Attribute,
    ) {
        self.realm.define_global(name, value, attribute);
    }

    /// `Call ( F, V, argumentsList )`
    pub fn call(
        &mut self,
        function: &JsValue,
        this: &JsValue,
        args: &[JsValue],
    ) -> JsResult<JsValue> {
        function.call(this, args, self)
    }
}

/// Builder for [`Context`].
#[derive(Default)]
pub struct ContextBuilder {
    job_queue: Option<Rc<dyn JobQueue>>,
    hooks: Option<Rc<dyn HostHooks>>,
}

impl std::fmt::Debug for ContextBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextBuilder").finish_non_exhaustive()
    }
}

impl ContextBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the microtask queue.
    #[must_use]
    pub fn job_queue(mut self, queue: Rc<dyn JobQueue>) -> Self {
        self.job_queue = Some(queue);
        self
    }

    /// Overrides the host hooks.
    #[must_use]
    pub fn host_hooks(mut self, hooks: Rc<dyn HostHooks>) -> Self {
        self.hooks = Some(hooks);
        self
    }

    /// Creates the realm, runs the two initialization phases (types, then
    /// runtime) and returns the ready context.
    #[must_use]
    pub fn build(self) -> Context {
        let realm = Realm::create();
        let mut types = TypeRegistry::default();
        builtins::initialize(&realm, &mut types);

        Context {
            realm,
            job_queue: self
                .job_queue
                .unwrap_or_else(|| Rc::new(SimpleJobQueue::new())),
            hooks: self.hooks.unwrap_or_else(|| Rc::new(hooks::DefaultHooks)),
            types,
        }
    }
}
