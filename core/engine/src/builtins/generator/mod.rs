//! The generator bridge.
//!
//! Generators are created by the compiler's `function*` desugaring; the
//! bytecode VM owns each suspended frame. The bridge resumes frames in
//! normal, return or throw mode through the [`GeneratorFrame`] trait and
//! keeps the generator's state machine: suspended-start → suspended-yield ↔
//! executing → completed.

use crate::{
    builtins::{
        iterable::create_iter_result_object, BuiltIn, BuiltInBuilder, BuiltInObject,
        IntrinsicObject,
    },
    context::intrinsics::Intrinsics,
    error::{JsError, JsNativeError},
    object::{JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{JsArgs, JsValue},
    Context, JsResult,
};

/// How a suspended frame is resumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorResumeKind {
    /// Resume after `yield`, substituting the sent value.
    Normal,
    /// Resume in return mode, so `finally` blocks run before completion.
    Return,
    /// Resume in throw mode, so `catch`/`finally` observe the exception.
    Throw,
}

/// The completion of one resumption step.
#[derive(Debug)]
pub enum CompletionRecord {
    /// The frame ran to the end of the function body with this value.
    Normal(JsValue),
    /// The frame suspended at a `yield` with this value.
    Return(JsValue),
    /// The frame threw.
    Throw(JsError),
}

/// A suspended execution frame, owned by the host VM.
///
/// The engine never introspects the frame; it only resumes it and reads the
/// resulting completion.
pub trait GeneratorFrame {
    /// Resumes the frame with the given mode and value, running until the
    /// next `yield`, `return` or throw.
    fn resume(
        &mut self,
        resume_kind: GeneratorResumeKind,
        value: JsValue,
        context: &mut Context,
    ) -> CompletionRecord;
}

impl std::fmt::Debug for dyn GeneratorFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorFrame").finish_non_exhaustive()
    }
}

/// The `[[GeneratorState]]` internal slot.
#[derive(Debug)]
pub(crate) enum GeneratorState {
    SuspendedStart { frame: Box<dyn GeneratorFrame> },
    SuspendedYield { frame: Box<dyn GeneratorFrame> },
    Executing,
    Completed,
}

/// The internal representation of a generator object.
#[derive(Debug)]
pub struct Generator {
    pub(crate) state: GeneratorState,
}

impl Generator {
    /// Creates a generator object over a fresh suspended frame.
    pub fn from_frame(frame: Box<dyn GeneratorFrame>, context: &mut Context) -> JsObject {
        JsObject::from_proto_and_data(
            Some(context.intrinsics().objects().generator()),
            ObjectData::Generator(Self {
                state: GeneratorState::SuspendedStart { frame },
            }),
        )
    }
}

impl IntrinsicObject for Generator {
    fn init(realm: &Realm) {
        BuiltInBuilder::with_object(realm, realm.intrinsics().objects().generator())
            .prototype(realm.intrinsics().objects().iterator_prototypes().iterator())
            .static_method(Self::next, "next", 1)
            .static_method(Self::r#return, "return", 1)
            .static_method(Self::throw, "throw", 1)
            .static_property(
                JsSymbol::to_string_tag(),
                "Generator",
                Attribute::CONFIGURABLE,
            )
            .build();

        // The `Generator` global is a namespace object that exposes the
        // shared prototype; generator functions come from the compiler, not
        // from a runtime constructor.
        BuiltInBuilder::with_object(realm, realm.intrinsics().objects().generator_namespace())
            .static_property(
                "prototype",
                realm.intrinsics().objects().generator(),
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::PERMANENT,
            )
            .static_property(
                JsSymbol::to_string_tag(),
                "Generator",
                Attribute::CONFIGURABLE,
            )
            .build();
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().generator_namespace()
    }
}

impl BuiltInObject for Generator {
    const NAME: &'static str = "Generator";
}

impl BuiltIn for Generator {
    const PRIORITY: u32 = 90;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Generator", Type::named("GeneratorConstructor"));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

impl Generator {
    /// `Generator.prototype.next ( value )`
    pub(crate) fn next(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        // 1. Return ? GeneratorResume(this value, value, empty).
        Self::generator_resume(this, args.get_or_undefined(0).clone(), context)
    }

    /// `Generator.prototype.return ( value )`
    pub(crate) fn r#return(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. Let C be Completion { [[Type]]: return, [[Value]]: value }.
        // 2. Return ? GeneratorResumeAbrupt(g, C, empty).
        Self::generator_resume_abrupt(this, Ok(args.get_or_undefined(0).clone()), context)
    }

    /// `Generator.prototype.throw ( exception )`
    pub(crate) fn throw(
        this: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // 1. Let C be ThrowCompletion(exception).
        // 2. Return ? GeneratorResumeAbrupt(g, C, empty).
        Self::generator_resume_abrupt(
            this,
            Err(JsError::from_opaque(args.get_or_undefined(0).clone())),
            context,
        )
    }

    fn this_generator(this: &JsValue) -> JsResult<JsObject> {
        this.as_object()
            .filter(|obj| obj.borrow().is_generator())
            .cloned()
            .ok_or_else(|| {
                JsNativeError::typ()
                    .with_message("generator method called on a non-generator")
                    .into()
            })
    }

    /// `GeneratorResume ( generator, value, generatorBrand )`
    pub(crate) fn generator_resume(
        gen: &JsValue,
        value: JsValue,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let generator_obj = Self::this_generator(gen)?;

        // The state is swapped for `Executing` while the frame runs, so a
        // re-entrant resume from inside the generator is rejected.
        let (mut frame, first_execution) = {
            let mut borrowed = generator_obj.borrow_mut();
            let generator = borrowed
                .as_generator_mut()
                .expect("already checked this object type");
            match std::mem::replace(&mut generator.state, GeneratorState::Executing) {
                GeneratorState::Executing => {
                    return Err(JsNativeError::typ()
                        .with_message("generator already executing")
                        .into());
                }
                // 2. If state is completed, return CreateIterResultObject(undefined, true).
                GeneratorState::Completed => {
                    generator.state = GeneratorState::Completed;
                    drop(borrowed);
                    return Ok(create_iter_result_object(JsValue::undefined(), true, context));
                }
                GeneratorState::SuspendedStart { frame } => (frame, true),
                GeneratorState::SuspendedYield { frame } => (frame, false),
            }
        };

        // On the first resumption there is no pending `yield` expression to
        // substitute into.
        let sent = if first_execution {
            JsValue::undefined()
        } else {
            value
        };
        let record = frame.resume(GeneratorResumeKind::Normal, sent, context);

        let mut borrowed = generator_obj.borrow_mut();
        let generator = borrowed
            .as_generator_mut()
            .expect("already checked this object type");

        match record {
            CompletionRecord::Return(value) => {
                generator.state = GeneratorState::SuspendedYield { frame };
                drop(borrowed);
                Ok(create_iter_result_object(value, false, context))
            }
            CompletionRecord::Normal(value) => {
                generator.state = GeneratorState::Completed;
                drop(borrowed);
                Ok(create_iter_result_object(value, true, context))
            }
            CompletionRecord::Throw(err) => {
                generator.state = GeneratorState::Completed;
                Err(err)
            }
        }
    }

    /// `GeneratorResumeAbrupt ( generator, abruptCompletion, generatorBrand )`
    pub(crate) fn generator_resume_abrupt(
        gen: &JsValue,
        abrupt_completion: JsResult<JsValue>,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let generator_obj = Self::this_generator(gen)?;

        let mut frame = {
            let mut borrowed = generator_obj.borrow_mut();
            let generator = borrowed
                .as_generator_mut()
                .expect("already checked this object type");
            match std::mem::replace(&mut generator.state, GeneratorState::Executing) {
                GeneratorState::Executing => {
                    return Err(JsNativeError::typ()
                        .with_message("generator already executing")
                        .into());
                }
                // A not-started or completed generator transitions straight
                // to completed: `return` yields its value, `throw` rethrows.
                GeneratorState::SuspendedStart { .. } | GeneratorState::Completed => {
                    generator.state = GeneratorState::Completed;
                    drop(borrowed);
                    return match abrupt_completion {
                        Ok(value) => Ok(create_iter_result_object(value, true, context)),
                        Err(err) => Err(err),
                    };
                }
                GeneratorState::SuspendedYield { frame } => frame,
            }
        };

        let (value, resume_kind) = match abrupt_completion {
            Ok(value) => (value, GeneratorResumeKind::Return),
            Err(err) => (err.to_opaque(context), GeneratorResumeKind::Throw),
        };

        let record = frame.resume(resume_kind, value, context);

        let mut borrowed = generator_obj.borrow_mut();
        let generator = borrowed
            .as_generator_mut()
            .expect("already checked this object type");

        match record {
            CompletionRecord::Return(value) => {
                generator.state = GeneratorState::SuspendedYield { frame };
                drop(borrowed);
                Ok(create_iter_result_object(value, false, context))
            }
            CompletionRecord::Normal(value) => {
                generator.state = GeneratorState::Completed;
                drop(borrowed);
                Ok(create_iter_result_object(value, true, context))
            }
            CompletionRecord::Throw(err) => {
                generator.state = GeneratorState::Completed;
                Err(err)
            }
        }
    }
}

/// A frame that yields from a fixed list of values.
///
/// Hosts use this for compiler-generated constant generators; it also keeps
/// the bridge exercisable without a bytecode VM.
#[derive(Debug, Default)]
pub struct ValuesFrame {
    values: std::collections::VecDeque<JsValue>,
}

impl ValuesFrame {
    /// Creates a frame yielding `values` in order.
    #[must_use]
    pub fn new<I: IntoIterator<Item = JsValue>>(values: I) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }
}

impl GeneratorFrame for ValuesFrame {
    fn resume(
        &mut self,
        resume_kind: GeneratorResumeKind,
        value: JsValue,
        _context: &mut Context,
    ) -> CompletionRecord {
        match resume_kind {
            GeneratorResumeKind::Normal => match self.values.pop_front() {
                Some(next) => CompletionRecord::Return(next),
                None => CompletionRecord::Normal(JsValue::undefined()),
            },
            GeneratorResumeKind::Return => {
                self.values.clear();
                CompletionRecord::Normal(value)
            }
            GeneratorResumeKind::Throw => {
                self.values.clear();
                CompletionRecord::Throw(JsError::from_opaque(value))
            }
        }
    }
}
