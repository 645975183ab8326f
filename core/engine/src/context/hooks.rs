//! Host hooks: the few environment facilities the engine consumes.

use std::time::{SystemTime, UNIX_EPOCH};

/// Environment facilities provided by the host. Tests substitute
/// deterministic implementations.
pub trait HostHooks {
    /// Milliseconds since the Unix epoch.
    fn utc_now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as i64)
    }

    /// Captures the current call stack for error objects. The engine has no
    /// frame stack of its own, so the default is empty; the bytecode VM
    /// overrides this.
    fn capture_stack_trace(&self) -> Vec<String> {
        Vec::new()
    }
}

/// The default host hooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl HostHooks for DefaultHooks {}
