//! # procwise-intent
//!
//! Deterministic text understanding for the workflow engine:
//!
//! - **Intent classification**: prioritized phrase/keyword rules mapping one
//!   utterance to one [`Intent`] via [`classifier::IntentClassifier`].
//! - **Alias resolution**: bilingual phrase → procedure-id lookup with
//!   longest-phrase-wins tie-breaking via [`aliases::ProcedureAliases`].
//! - **Workflow synthesis**: turning free text with step-like structure into
//!   an ordered step list via [`synthesis`].
//!
//! Everything here is pure: no I/O, no clocks, no randomness.  The same
//! utterance always produces the same result.

pub mod aliases;
pub mod classifier;
pub mod synthesis;

pub use aliases::ProcedureAliases;
pub use classifier::{Intent, IntentClassifier};
pub use synthesis::{SynthesizedStep, contains_step_markers, synthesize};
