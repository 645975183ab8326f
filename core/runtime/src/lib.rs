//! Host-facing boundary adapters for the Paserati runtime: `console`,
//! `performance` and `FormData`.
//!
//! Embedders opt in with a single call:
//!
//! ```
//! use paserati_engine::Context;
//!
//! let mut context = Context::new();
//! paserati_runtime::register(&mut context).unwrap();
//! ```

pub mod console;
pub mod form_data;
pub mod logger;
pub mod performance;

pub use console::Console;
pub use form_data::FormData;
pub use logger::{DefaultLogger, LogMessage, Logger};
pub use performance::Performance;

use paserati_engine::{Context, JsResult};
use std::rc::Rc;

/// Registers every adapter of this crate onto `context` with the default
/// logger.
pub fn register(context: &mut Context) -> JsResult<()> {
    register_with_logger(context, Rc::new(DefaultLogger))
}

/// Registers every adapter of this crate, routing `console` output through
/// `logger`.
pub fn register_with_logger(context: &mut Context, logger: Rc<dyn Logger>) -> JsResult<()> {
    Console::register(context, logger)?;
    Performance::register(context)?;
    FormData::register(context)?;
    Ok(())
}
