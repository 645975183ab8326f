//! The microtask queue.
//!
//! Promise reactions are deferred: settling a promise only *enqueues* jobs
//! here, and the host drains the queue once per synchronous turn via
//! [`Context::run_jobs`]. Within a single promise, reactions run in
//! registration order; jobs enqueued by a job run after the currently
//! drained ones.

use crate::{value::JsValue, Context, JsResult};
use std::{cell::RefCell, collections::VecDeque, fmt};

/// A job enqueued on the microtask queue.
pub struct NativeJob {
    f: Box<dyn FnOnce(&mut Context) -> JsResult<JsValue>>,
}

impl fmt::Debug for NativeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeJob").finish_non_exhaustive()
    }
}

impl NativeJob {
    /// Creates a new job from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Context) -> JsResult<JsValue> + 'static,
    {
        Self { f: Box::new(f) }
    }

    /// Runs the job.
    pub fn call(self, context: &mut Context) -> JsResult<JsValue> {
        (self.f)(context)
    }
}

/// A queue of pending microtask jobs.
pub trait JobQueue {
    /// Enqueues a job.
    fn enqueue_promise_job(&self, job: NativeJob, context: &mut Context);

    /// Drains the queue until it is empty, including jobs enqueued while
    /// draining.
    fn run_jobs(&self, context: &mut Context);
}

/// A queue that discards every job; useful for hosts that drive their own
/// scheduling.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleJobQueue;

impl JobQueue for IdleJobQueue {
    fn enqueue_promise_job(&self, _job: NativeJob, _context: &mut Context) {}

    fn run_jobs(&self, _context: &mut Context) {}
}

/// A FIFO microtask queue.
#[derive(Debug, Default)]
pub struct SimpleJobQueue {
    jobs: RefCell<VecDeque<NativeJob>>,
}

impl SimpleJobQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobQueue for SimpleJobQueue {
    fn enqueue_promise_job(&self, job: NativeJob, _context: &mut Context) {
        self.jobs.borrow_mut().push_back(job);
    }

    fn run_jobs(&self, context: &mut Context) {
        // A job can enqueue further jobs, so pop one at a time instead of
        // draining the whole queue upfront.
        loop {
            let job = self.jobs.borrow_mut().pop_front();
            let Some(job) = job else {
                return;
            };
            // Errors from jobs are reported through rejected promises, not
            // through the queue.
            let _unhandled = job.call(context);
        }
    }
}
