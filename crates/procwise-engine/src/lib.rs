//! # procwise-engine
//!
//! The conversational workflow engine.  One chat turn enters through
//! [`WorkflowEngine::handle_turn`] and leaves as a [`TurnResult`]; in between
//! the engine classifies the utterance, runs the procedure state machine
//! against the catalog or a synthesized dynamic workflow, routes data
//! queries, and falls back to the optional free-text generator.
//!
//! External collaborators are traits: [`DataModule`] for business-object
//! lookups, [`AnswerGenerator`] for free text, [`StepValidator`] for
//! step-completion checks.  All three have shipped defaults; all three fail
//! soft.

pub mod data;
pub mod dynamic;
pub mod engine;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod validate;

pub use data::{DataDomain, DataModule, MockDataModule, ModuleQuery, QueryKind, QueryOutcome};
pub use engine::{TurnResult, WorkflowEngine};
pub use error::{EngineError, EngineResult};
pub use generator::{AnswerGenerator, GENERATOR_TIMEOUT, GeneratorContext};
pub use i18n::{MessageKey, SuggestionSet, Translator};
pub use validate::{NoChecksValidator, StepValidator};
