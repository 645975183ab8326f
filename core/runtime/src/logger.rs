//! The pluggable sink behind `console`.

/// The severity classes `console` distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMessage {
    /// `console.log` and `console.debug`.
    Log,
    /// `console.info`.
    Info,
    /// `console.warn`.
    Warn,
    /// `console.error`, `console.trace` and failed assertions.
    Error,
}

/// Receives formatted console output. The indentation level reflects the
/// open `console.group` stack.
pub trait Logger {
    /// Writes one formatted message.
    fn log(&self, level: LogMessage, indent: usize, message: &str);
}

/// The default logger: stdout for log/info, stderr for warn/error, mirrored
/// to the `log` crate so embedders can reroute output.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, level: LogMessage, indent: usize, message: &str) {
        let padding = " ".repeat(indent);
        match level {
            LogMessage::Log => {
                log::debug!("{message}");
                println!("{padding}{message}");
            }
            LogMessage::Info => {
                log::info!("{message}");
                println!("{padding}{message}");
            }
            LogMessage::Warn => {
                log::warn!("{message}");
                eprintln!("{padding}{message}");
            }
            LogMessage::Error => {
                log::error!("{message}");
                eprintln!("{padding}{message}");
            }
        }
    }
}
