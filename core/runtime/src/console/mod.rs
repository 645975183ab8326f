//! The global `console` object.
//!
//! Implements the de facto console surface: leveled logging with `%s`-style
//! format specifiers, group indentation, counters and named timers. All
//! state lives in the closures registered on the object, so a `Context` can
//! host several consoles with separate sinks if it wants to.

#[cfg(test)]
mod tests;

use crate::logger::{LogMessage, Logger};
use paserati_engine::{
    object::ObjectInitializer,
    property::Attribute,
    value::{display_obj, Numeric},
    Context, JsResult, JsString, JsSymbol, JsValue, NativeFunction,
};
use rustc_hash::FxHashMap;
use std::{cell::RefCell, rc::Rc};

/// The state of a console: open groups, counters and timers.
#[derive(Debug, Default)]
pub struct Console {
    count_map: FxHashMap<JsString, u32>,
    timer_map: FxHashMap<JsString, i64>,
    groups: Vec<String>,
}

#[derive(Clone)]
struct ConsoleContext {
    state: Rc<RefCell<Console>>,
    logger: Rc<dyn Logger>,
}

impl ConsoleContext {
    fn log(&self, level: LogMessage, message: String) {
        let indent = 2 * self.state.borrow().groups.len();
        self.logger.log(level, indent, &message);
    }
}

/// Formats console arguments: `%s`, `%d`/`%i`, `%f`, `%o`/`%O` and `%%`
/// specifiers in the first argument consume the following arguments;
/// leftovers are appended space-separated.
pub fn formatter(data: &[JsValue], context: &mut Context) -> JsResult<String> {
    let Some(target) = data.first() else {
        return Ok(String::new());
    };
    let target = target.to_string(context)?;
    if data.len() == 1 {
        return Ok(target.to_std_string());
    }

    let mut formatted = String::new();
    let mut arg_index = 1;
    let mut chars = target.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            let fmt = chars.next().unwrap_or('%');
            match fmt {
                'd' | 'i' => {
                    let arg = match data
                        .get(arg_index)
                        .cloned()
                        .unwrap_or_default()
                        .to_numeric(context)?
                    {
                        Numeric::Number(r) => (r.floor() + 0.0).to_string(),
                        Numeric::BigInt(int) => int.to_string(),
                    };
                    formatted.push_str(&arg);
                    arg_index += 1;
                }
                'f' => {
                    let arg = data
                        .get(arg_index)
                        .cloned()
                        .unwrap_or_default()
                        .to_number(context)?;
                    formatted.push_str(&format!("{arg:.6}"));
                    arg_index += 1;
                }
                'o' | 'O' => {
                    let arg = data.get(arg_index).cloned().unwrap_or_default();
                    formatted.push_str(&arg.display().to_string());
                    arg_index += 1;
                }
                's' => {
                    let arg = data
                        .get(arg_index)
                        .cloned()
                        .unwrap_or_default()
                        .to_string(context)?;
                    formatted.push_str(&arg);
                    arg_index += 1;
                }
                '%' => formatted.push('%'),
                c => {
                    formatted.push('%');
                    formatted.push(c);
                }
            }
        } else {
            formatted.push(c);
        }
    }

    for rest in data.iter().skip(arg_index.max(1)) {
        formatted.push(' ');
        formatted.push_str(&rest.to_string(context)?);
    }

    Ok(formatted)
}

fn label_argument(args: &[JsValue], context: &mut Context) -> JsResult<JsString> {
    match args.first() {
        Some(value) => value.to_string(context),
        None => Ok("default".into()),
    }
}

impl Console {
    /// Builds the console object and binds it as the global `console`.
    pub fn register(context: &mut Context, logger: Rc<dyn Logger>) -> JsResult<()> {
        let console = ConsoleContext {
            state: Rc::new(RefCell::new(Console::default())),
            logger,
        };

        macro_rules! leveled {
            ($level:expr) => {{
                let console = console.clone();
                NativeFunction::from_closure(move |_this, args, context| {
                    console.log($level, formatter(args, context)?);
                    Ok(JsValue::undefined())
                })
            }};
        }

        let object = {
            let mut builder = ObjectInitializer::new(context);
            builder
                .function(leveled!(LogMessage::Log), "log", 0)
                .function(leveled!(LogMessage::Log), "debug", 0)
                .function(leveled!(LogMessage::Info), "info", 0)
                .function(leveled!(LogMessage::Warn), "warn", 0)
                .function(leveled!(LogMessage::Error), "error", 0)
                .function(leveled!(LogMessage::Error), "trace", 0);

            // `console.assert(condition, ...data)`
            let assert_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let assertion = args.first().map_or(false, JsValue::to_boolean);
                    if !assertion {
                        let mut args: Vec<JsValue> = args.iter().skip(1).cloned().collect();
                        let message = "Assertion failed".to_string();
                        if args.is_empty() {
                            args.push(JsValue::new(message));
                        } else if !args[0].is_string() {
                            args.insert(0, JsValue::new(message));
                        } else {
                            let concat = format!("{message}: {}", args[0].display());
                            args[0] = JsValue::new(concat);
                        }
                        assert_console.log(LogMessage::Error, formatter(&args, context)?);
                    }
                    Ok(JsValue::undefined())
                }),
                "assert",
                0,
            );

            // `console.count(label)` / `console.countReset(label)`
            let count_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let label = label_argument(args, context)?;
                    let mut state = count_console.state.borrow_mut();
                    let counter = state.count_map.entry(label.clone()).or_insert(0);
                    *counter += 1;
                    let message = format!("count {label}: {counter}");
                    drop(state);
                    count_console.log(LogMessage::Info, message);
                    Ok(JsValue::undefined())
                }),
                "count",
                0,
            );
            let count_reset_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let label = label_argument(args, context)?;
                    count_reset_console.state.borrow_mut().count_map.remove(&label);
                    count_reset_console
                        .log(LogMessage::Warn, format!("countReset {label}"));
                    Ok(JsValue::undefined())
                }),
                "countReset",
                0,
            );

            // `console.group(...data)` / `console.groupEnd()`
            let group_console = console.clone();
            let group = NativeFunction::from_closure(move |_this, args, context| {
                let group_label = formatter(args, context)?;
                group_console.log(LogMessage::Info, format!("group: {group_label}"));
                group_console.state.borrow_mut().groups.push(group_label);
                Ok(JsValue::undefined())
            });
            let group_collapsed_console = console.clone();
            let group_collapsed = NativeFunction::from_closure(move |_this, args, context| {
                let group_label = formatter(args, context)?;
                group_collapsed_console
                    .log(LogMessage::Info, format!("group: {group_label}"));
                group_collapsed_console
                    .state
                    .borrow_mut()
                    .groups
                    .push(group_label);
                Ok(JsValue::undefined())
            });
            let group_end_console = console.clone();
            builder
                .function(group, "group", 0)
                .function(group_collapsed, "groupCollapsed", 0)
                .function(
                    NativeFunction::from_closure(move |_this, _args, _context| {
                        group_end_console.state.borrow_mut().groups.pop();
                        Ok(JsValue::undefined())
                    }),
                    "groupEnd",
                    0,
                );

            // `console.time(label)` / `console.timeLog` / `console.timeEnd`
            let time_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let label = label_argument(args, context)?;
                    let now = context.host_hooks().utc_now_ms();
                    let mut state = time_console.state.borrow_mut();
                    if state.timer_map.contains_key(&label) {
                        drop(state);
                        time_console
                            .log(LogMessage::Warn, format!("Timer '{label}' already exists"));
                    } else {
                        state.timer_map.insert(label, now);
                    }
                    Ok(JsValue::undefined())
                }),
                "time",
                0,
            );
            let time_log_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let label = label_argument(args, context)?;
                    let started = time_log_console.state.borrow().timer_map.get(&label).copied();
                    match started {
                        Some(start) => {
                            let elapsed = context.host_hooks().utc_now_ms() - start;
                            let mut message = format!("{label}: {elapsed} ms");
                            for extra in args.iter().skip(1) {
                                message.push(' ');
                                message.push_str(&extra.display().to_string());
                            }
                            time_log_console.log(LogMessage::Log, message);
                        }
                        None => {
                            time_log_console
                                .log(LogMessage::Warn, format!("Timer '{label}' doesn't exist"));
                        }
                    }
                    Ok(JsValue::undefined())
                }),
                "timeLog",
                0,
            );
            let time_end_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let label = label_argument(args, context)?;
                    let started = time_end_console
                        .state
                        .borrow_mut()
                        .timer_map
                        .remove(&label);
                    match started {
                        Some(start) => {
                            let elapsed = context.host_hooks().utc_now_ms() - start;
                            time_end_console.log(
                                LogMessage::Info,
                                format!("{label}: {elapsed} ms - timer removed"),
                            );
                        }
                        None => {
                            time_end_console
                                .log(LogMessage::Warn, format!("Timer '{label}' doesn't exist"));
                        }
                    }
                    Ok(JsValue::undefined())
                }),
                "timeEnd",
                0,
            );

            // `console.dir(item)` and `console.clear()`
            let dir_console = console.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, _context| {
                    let item = args.first().cloned().unwrap_or_default();
                    dir_console.log(LogMessage::Info, display_obj(&item, true));
                    Ok(JsValue::undefined())
                }),
                "dir",
                0,
            );
            let clear_console = console;
            builder.function(
                NativeFunction::from_closure(move |_this, _args, _context| {
                    clear_console.state.borrow_mut().groups.clear();
                    Ok(JsValue::undefined())
                }),
                "clear",
                0,
            );

            builder.property(
                JsSymbol::to_string_tag(),
                "console",
                Attribute::CONFIGURABLE,
            );
            builder.build()
        };

        context.register_global_property(
            "console",
            object,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
        Ok(())
    }
}
