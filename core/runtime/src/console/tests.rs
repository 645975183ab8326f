use super::Console;
use crate::logger::{LogMessage, Logger};
use paserati_engine::{Context, JsValue};
use std::{cell::RefCell, rc::Rc};

#[derive(Default)]
struct RecordingLogger {
    messages: RefCell<Vec<(LogMessage, usize, String)>>,
}

impl Logger for RecordingLogger {
    fn log(&self, level: LogMessage, indent: usize, message: &str) {
        self.messages
            .borrow_mut()
            .push((level, indent, message.to_owned()));
    }
}

fn console_context() -> (Context, Rc<RecordingLogger>) {
    let mut context = Context::new();
    let logger = Rc::new(RecordingLogger::default());
    Console::register(&mut context, logger.clone()).unwrap();
    (context, logger)
}

fn console_method(context: &mut Context, name: &str) -> (JsValue, JsValue) {
    let console = context
        .global_object()
        .get("console", context)
        .unwrap();
    let method = console.get_v(name, context).unwrap();
    (console, method)
}

#[test]
fn log_formats_specifiers() {
    let (mut context, logger) = console_context();
    let (console, log) = console_method(&mut context, "log");
    log.call(
        &console,
        &[
            JsValue::new("%s scored %d points"),
            JsValue::new("player"),
            JsValue::new(3),
        ],
        &mut context,
    )
    .unwrap();

    let messages = logger.messages.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, LogMessage::Log);
    assert_eq!(messages[0].2, "player scored 3 points");
}

#[test]
fn extra_arguments_are_appended() {
    let (mut context, logger) = console_context();
    let (console, log) = console_method(&mut context, "log");
    log.call(
        &console,
        &[JsValue::new("status"), JsValue::new(1), JsValue::new(2)],
        &mut context,
    )
    .unwrap();
    assert_eq!(logger.messages.borrow()[0].2, "status 1 2");
}

#[test]
fn groups_indent_output() {
    let (mut context, logger) = console_context();
    let (console, group) = console_method(&mut context, "group");
    let (_, log) = console_method(&mut context, "log");
    let (_, group_end) = console_method(&mut context, "groupEnd");

    group
        .call(&console, &[JsValue::new("outer")], &mut context)
        .unwrap();
    log.call(&console, &[JsValue::new("inside")], &mut context)
        .unwrap();
    group_end.call(&console, &[], &mut context).unwrap();
    log.call(&console, &[JsValue::new("outside")], &mut context)
        .unwrap();

    let messages = logger.messages.borrow();
    // group announcement, indented message, outdented message
    assert_eq!(messages[1].1, 2);
    assert_eq!(messages[1].2, "inside");
    assert_eq!(messages[2].1, 0);
    assert_eq!(messages[2].2, "outside");
}

#[test]
fn counters_increment_per_label() {
    let (mut context, logger) = console_context();
    let (console, count) = console_method(&mut context, "count");

    count
        .call(&console, &[JsValue::new("hits")], &mut context)
        .unwrap();
    count
        .call(&console, &[JsValue::new("hits")], &mut context)
        .unwrap();
    count.call(&console, &[], &mut context).unwrap();

    let messages = logger.messages.borrow();
    assert_eq!(messages[0].2, "count hits: 1");
    assert_eq!(messages[1].2, "count hits: 2");
    assert_eq!(messages[2].2, "count default: 1");
}

#[test]
fn assert_only_logs_failures() {
    let (mut context, logger) = console_context();
    let (console, assert_fn) = console_method(&mut context, "assert");

    assert_fn
        .call(&console, &[JsValue::new(true)], &mut context)
        .unwrap();
    assert!(logger.messages.borrow().is_empty());

    assert_fn
        .call(
            &console,
            &[JsValue::new(false), JsValue::new("invariant broken")],
            &mut context,
        )
        .unwrap();
    let messages = logger.messages.borrow();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, LogMessage::Error);
    assert!(messages[0].2.starts_with("Assertion failed"));
}

#[test]
fn timers_warn_on_unknown_labels() {
    let (mut context, logger) = console_context();
    let (console, time_end) = console_method(&mut context, "timeEnd");
    time_end
        .call(&console, &[JsValue::new("missing")], &mut context)
        .unwrap();
    let messages = logger.messages.borrow();
    assert_eq!(messages[0].0, LogMessage::Warn);
    assert!(messages[0].2.contains("missing"));
}
