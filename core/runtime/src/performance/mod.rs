//! The global `performance` object.
//!
//! `now()` reads a monotonic clock whose origin is captured at
//! registration; marks and measures are kept in insertion order and
//! queried through `getEntries*`.

#[cfg(test)]
mod tests;

use paserati_engine::{
    builtins::array::Array,
    error::JsNativeError,
    object::ObjectInitializer,
    property::Attribute,
    Context, JsResult, JsString, JsSymbol, JsValue, NativeFunction,
};
use std::{cell::RefCell, rc::Rc, time::Instant};

#[derive(Debug, Clone)]
struct Entry {
    name: JsString,
    entry_type: &'static str,
    start_time: f64,
    duration: f64,
}

/// The state of the performance timeline.
#[derive(Debug)]
pub struct Performance {
    origin: Instant,
    time_origin_ms: f64,
    entries: Vec<Entry>,
}

impl Performance {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn find_mark(&self, name: &JsString) -> Option<&Entry> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.entry_type == "mark" && &entry.name == name)
    }
}

fn entry_to_object(entry: &Entry, context: &mut Context) -> JsResult<JsValue> {
    let obj = paserati_engine::JsObject::with_object_proto(context.intrinsics());
    obj.create_data_property_or_throw("name", entry.name.clone(), context)?;
    obj.create_data_property_or_throw("entryType", entry.entry_type, context)?;
    obj.create_data_property_or_throw("startTime", entry.start_time, context)?;
    obj.create_data_property_or_throw("duration", entry.duration, context)?;
    Ok(obj.into())
}

fn entries_to_array(entries: &[Entry], context: &mut Context) -> JsResult<JsValue> {
    let mut values = Vec::with_capacity(entries.len());
    for entry in entries {
        values.push(entry_to_object(entry, context)?);
    }
    Ok(Array::create_array_from_list(values, context).into())
}

impl Performance {
    /// Builds the performance object and binds it as the global
    /// `performance`.
    pub fn register(context: &mut Context) -> JsResult<()> {
        let state = Rc::new(RefCell::new(Performance {
            origin: Instant::now(),
            time_origin_ms: context.host_hooks().utc_now_ms() as f64,
            entries: Vec::new(),
        }));

        let time_origin = state.borrow().time_origin_ms;

        let object = {
            let mut builder = ObjectInitializer::new(context);

            let now_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, _args, _context| {
                    Ok(JsValue::from(now_state.borrow().now_ms()))
                }),
                "now",
                0,
            );

            // `performance.mark(name)`
            let mark_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let Some(name) = args.first() else {
                        return Err(JsNativeError::typ()
                            .with_message("performance.mark requires a name")
                            .into());
                    };
                    let name = name.to_string(context)?;
                    let mut state = mark_state.borrow_mut();
                    let entry = Entry {
                        name,
                        entry_type: "mark",
                        start_time: state.now_ms(),
                        duration: 0.0,
                    };
                    state.entries.push(entry.clone());
                    drop(state);
                    entry_to_object(&entry, context)
                }),
                "mark",
                1,
            );

            // `performance.measure(name [, startMark [, endMark ]])`
            let measure_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let Some(name) = args.first() else {
                        return Err(JsNativeError::typ()
                            .with_message("performance.measure requires a name")
                            .into());
                    };
                    let name = name.to_string(context)?;

                    let mut state = measure_state.borrow_mut();
                    let now = state.now_ms();
                    let resolve = |state: &Performance,
                                   arg: Option<&JsValue>,
                                   default: f64|
                     -> JsResult<f64> {
                        match arg {
                            None => Ok(default),
                            Some(value) => {
                                let mark_name = value
                                    .as_string()
                                    .cloned()
                                    .ok_or_else(|| {
                                        JsNativeError::typ()
                                            .with_message("mark name must be a string")
                                    })?;
                                state
                                    .find_mark(&mark_name)
                                    .map(|mark| mark.start_time)
                                    .ok_or_else(|| {
                                        JsNativeError::typ()
                                            .with_message(format!(
                                                "no mark named '{mark_name}' exists"
                                            ))
                                            .into()
                                    })
                            }
                        }
                    };
                    let start = resolve(&state, args.get(1), 0.0)?;
                    let end = resolve(&state, args.get(2), now)?;

                    let entry = Entry {
                        name,
                        entry_type: "measure",
                        start_time: start,
                        duration: end - start,
                    };
                    state.entries.push(entry.clone());
                    drop(state);
                    entry_to_object(&entry, context)
                }),
                "measure",
                1,
            );

            let get_entries_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, _args, context| {
                    entries_to_array(&get_entries_state.borrow().entries, context)
                }),
                "getEntries",
                0,
            );

            let by_name_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let name = args
                        .first()
                        .cloned()
                        .unwrap_or_default()
                        .to_string(context)?;
                    let entries: Vec<Entry> = by_name_state
                        .borrow()
                        .entries
                        .iter()
                        .filter(|entry| entry.name == name)
                        .cloned()
                        .collect();
                    entries_to_array(&entries, context)
                }),
                "getEntriesByName",
                1,
            );

            let by_type_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let ty = args
                        .first()
                        .cloned()
                        .unwrap_or_default()
                        .to_string(context)?;
                    let entries: Vec<Entry> = by_type_state
                        .borrow()
                        .entries
                        .iter()
                        .filter(|entry| entry.entry_type == ty.as_str())
                        .cloned()
                        .collect();
                    entries_to_array(&entries, context)
                }),
                "getEntriesByType",
                1,
            );

            // `clearMarks([name])` / `clearMeasures([name])`
            let clear_marks_state = state.clone();
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let name = match args.first() {
                        Some(value) if !value.is_undefined() => {
                            Some(value.to_string(context)?)
                        }
                        _ => None,
                    };
                    clear_marks_state.borrow_mut().entries.retain(|entry| {
                        entry.entry_type != "mark"
                            || name.as_ref().map_or(false, |name| &entry.name != name)
                    });
                    Ok(JsValue::undefined())
                }),
                "clearMarks",
                0,
            );
            let clear_measures_state = state;
            builder.function(
                NativeFunction::from_closure(move |_this, args, context| {
                    let name = match args.first() {
                        Some(value) if !value.is_undefined() => {
                            Some(value.to_string(context)?)
                        }
                        _ => None,
                    };
                    clear_measures_state.borrow_mut().entries.retain(|entry| {
                        entry.entry_type != "measure"
                            || name.as_ref().map_or(false, |name| &entry.name != name)
                    });
                    Ok(JsValue::undefined())
                }),
                "clearMeasures",
                0,
            );

            builder.property("timeOrigin", time_origin, Attribute::READONLY);
            builder.property(
                JsSymbol::to_string_tag(),
                "Performance",
                Attribute::CONFIGURABLE,
            );
            builder.build()
        };

        context.register_global_property(
            "performance",
            object,
            Attribute::WRITABLE | Attribute::CONFIGURABLE,
        );
        Ok(())
    }
}
