//! Tests of the generator bridge and its interplay with the iterator
//! helpers.

use paserati_engine::{
    builtins::generator::{
        CompletionRecord, Generator, GeneratorFrame, GeneratorResumeKind, ValuesFrame,
    },
    Context, JsValue,
};
use std::{cell::Cell, rc::Rc};

fn values_generator(context: &mut Context, values: &[i32]) -> JsValue {
    Generator::from_frame(
        Box::new(ValuesFrame::new(values.iter().map(|v| JsValue::from(*v)))),
        context,
    )
    .into()
}

#[test]
fn next_walks_the_sequence_then_stays_done() {
    let mut context = Context::new();
    let generator = values_generator(&mut context, &[1, 2]);

    let next = generator.get_v("next", &mut context).unwrap();
    let first = next.call(&generator, &[], &mut context).unwrap();
    assert_eq!(first.get_v("value", &mut context).unwrap(), JsValue::new(1));
    assert_eq!(
        first.get_v("done", &mut context).unwrap(),
        JsValue::new(false)
    );

    next.call(&generator, &[], &mut context).unwrap();
    let finished = next.call(&generator, &[], &mut context).unwrap();
    assert!(finished.get_v("done", &mut context).unwrap().to_boolean());

    // A completed generator keeps answering { undefined, true }.
    let after = next.call(&generator, &[], &mut context).unwrap();
    assert!(after.get_v("done", &mut context).unwrap().to_boolean());
    assert!(after.get_v("value", &mut context).unwrap().is_undefined());
}

#[test]
fn return_completes_early_with_the_given_value() {
    let mut context = Context::new();
    let generator = values_generator(&mut context, &[1, 2, 3]);

    let next = generator.get_v("next", &mut context).unwrap();
    next.call(&generator, &[], &mut context).unwrap();

    let r#return = generator.get_v("return", &mut context).unwrap();
    let result = r#return
        .call(&generator, &[JsValue::new("stop")], &mut context)
        .unwrap();
    assert_eq!(
        result.get_v("value", &mut context).unwrap(),
        JsValue::new("stop")
    );
    assert!(result.get_v("done", &mut context).unwrap().to_boolean());

    let after = next.call(&generator, &[], &mut context).unwrap();
    assert!(after.get_v("done", &mut context).unwrap().to_boolean());
}

#[test]
fn throw_on_a_fresh_generator_rethrows() {
    let mut context = Context::new();
    let generator = values_generator(&mut context, &[1]);

    let throw = generator.get_v("throw", &mut context).unwrap();
    let err = throw
        .call(&generator, &[JsValue::new("boom")], &mut context)
        .unwrap_err();
    assert_eq!(err.as_opaque(), Some(&JsValue::new("boom")));

    // The generator completed as a result.
    let next = generator.get_v("next", &mut context).unwrap();
    let after = next.call(&generator, &[], &mut context).unwrap();
    assert!(after.get_v("done", &mut context).unwrap().to_boolean());
}

#[test]
fn generators_are_their_own_iterators() {
    let mut context = Context::new();
    let generator = values_generator(&mut context, &[1]);

    let symbol_constructor = context
        .global_object()
        .get("Symbol", &mut context)
        .unwrap();
    let iterator_symbol = symbol_constructor
        .get_v("iterator", &mut context)
        .unwrap()
        .as_symbol()
        .unwrap();

    let identity = generator.get_v(iterator_symbol, &mut context).unwrap();
    let result = identity.call(&generator, &[], &mut context).unwrap();
    assert!(result.strict_equals(&generator));
}

#[test]
fn generators_compose_with_iterator_helpers() {
    let mut context = Context::new();
    let generator = values_generator(&mut context, &[1, 2]);

    let by_ten = paserati_engine::object::FunctionObjectBuilder::new(
        &mut context,
        paserati_engine::NativeFunction::from_fn_ptr(|_, args, context| {
            let n = args[0].to_number(context)?;
            Ok(JsValue::from(n * 10.0))
        }),
    )
    .build();

    // `map` is inherited through %GeneratorPrototype% -> %IteratorPrototype%.
    let mapped = generator
        .invoke("map", &[by_ten.into()], &mut context)
        .unwrap();
    let collected = mapped.invoke("toArray", &[], &mut context).unwrap();

    let collected = collected.as_object().unwrap();
    assert_eq!(
        collected.get("length", &mut context).unwrap(),
        JsValue::new(2)
    );
    assert_eq!(collected.get(0u32, &mut context).unwrap(), JsValue::new(10));
    assert_eq!(collected.get(1u32, &mut context).unwrap(), JsValue::new(20));
}

/// A frame that records how it was resumed, standing in for a bytecode
/// frame with `finally` blocks.
struct RecordingFrame {
    resumed_with: Rc<Cell<Option<GeneratorResumeKind>>>,
    yields_left: usize,
}

impl GeneratorFrame for RecordingFrame {
    fn resume(
        &mut self,
        resume_kind: GeneratorResumeKind,
        value: JsValue,
        _context: &mut Context,
    ) -> CompletionRecord {
        self.resumed_with.set(Some(resume_kind));
        match resume_kind {
            GeneratorResumeKind::Normal if self.yields_left > 0 => {
                self.yields_left -= 1;
                CompletionRecord::Return(JsValue::new(1))
            }
            GeneratorResumeKind::Normal => CompletionRecord::Normal(JsValue::undefined()),
            // Return mode runs cleanup before completing with the sent
            // value.
            GeneratorResumeKind::Return => CompletionRecord::Normal(value),
            GeneratorResumeKind::Throw => {
                CompletionRecord::Throw(paserati_engine::JsError::from_opaque(value))
            }
        }
    }
}

#[test]
fn abrupt_resumes_reach_the_suspended_frame() {
    let mut context = Context::new();
    let resumed_with = Rc::new(Cell::new(None));
    let generator: JsValue = Generator::from_frame(
        Box::new(RecordingFrame {
            resumed_with: resumed_with.clone(),
            yields_left: 2,
        }),
        &mut context,
    )
    .into();

    // Start the generator so it suspends at a yield.
    generator.invoke("next", &[], &mut context).unwrap();
    assert_eq!(resumed_with.get(), Some(GeneratorResumeKind::Normal));

    // `return` resumes the live frame in return mode.
    let result = generator
        .invoke("return", &[JsValue::new(9)], &mut context)
        .unwrap();
    assert_eq!(resumed_with.get(), Some(GeneratorResumeKind::Return));
    assert_eq!(result.get_v("value", &mut context).unwrap(), JsValue::new(9));
    assert!(result.get_v("done", &mut context).unwrap().to_boolean());
}
