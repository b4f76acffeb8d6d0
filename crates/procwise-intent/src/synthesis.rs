//! Ad-hoc workflow synthesis from free text.
//!
//! When the free-text fallback produces an answer that looks like a list of
//! steps, the engine turns it into a session-local dynamic workflow.  This
//! module provides the two halves of that: a binary gate
//! ([`contains_step_markers`]) and the line tokenizer/assembler
//! ([`synthesize`]).
//!
//! Only the first three ordinals have explicit markers.  Text enumerating
//! four or more steps folds everything after the third marker into step 3's
//! body.  That cap is a deliberate carry-over from the behaviour this
//! assistant replaces; widening it changes what users see mid-procedure and
//! is a product decision, not a parser fix.

use serde::{Deserialize, Serialize};
use tracing::debug;

// ---------------------------------------------------------------------------
// Markers
// ---------------------------------------------------------------------------

/// Markers whose presence anywhere in the text gates synthesis on.
const STEP_MARKERS: &[&str] = &[
    "step 1",
    "1.",
    "first",
    "then",
    "next",
    "finally",
    "step by step",
];

/// Per-ordinal line markers (lowercase, substring match), checked in order:
/// a line claiming ordinal 1 is never reinterpreted as ordinal 2.
const ORDINAL_MARKERS: [&[&str]; 3] = [
    &["step 1", "1.", "first"],
    &["step 2", "2.", "second", "then", "next"],
    &["step 3", "3.", "third", "finally"],
];

/// Tokens stripped from a marker line to produce the step title.
const TITLE_TOKENS: [&[&str]; 3] = [
    &["Step 1:", "1.", "First"],
    &["Step 2:", "2.", "Second", "Then", "Next"],
    &["Step 3:", "3.", "Third", "Finally"],
];

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One synthesized step: marker ordinal, title from the marker line, body
/// split into a leading description and the remaining instructions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesizedStep {
    /// 1-based ordinal claimed by the marker line.
    pub ordinal: usize,
    pub title: String,
    pub description: String,
    pub instructions: String,
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Whether the text contains any step-like structure at all.
///
/// This is a cheap binary gate evaluated once, upstream of synthesis.
pub fn contains_step_markers(text: &str) -> bool {
    let lowered = text.to_lowercase();
    STEP_MARKERS.iter().any(|marker| lowered.contains(marker))
}

// ---------------------------------------------------------------------------
// Synthesis
// ---------------------------------------------------------------------------

/// Parse free text into an ordered step list.
///
/// Returns an empty list when the text carries no step markers.  Lines
/// matching an ordinal marker start a new step (the marker token is stripped
/// from the title); each following non-empty, non-marker line fills the
/// current step's description if empty, else is space-joined onto its
/// instructions.
pub fn synthesize(text: &str) -> Vec<SynthesizedStep> {
    if !contains_step_markers(text) {
        return Vec::new();
    }

    let mut steps: Vec<SynthesizedStep> = Vec::new();
    let mut current: Option<SynthesizedStep> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(ordinal) = marker_ordinal(line) {
            if let Some(step) = current.take() {
                steps.push(step);
            }
            current = Some(SynthesizedStep {
                ordinal,
                title: strip_title_tokens(line, ordinal),
                description: String::new(),
                instructions: String::new(),
            });
        } else if let Some(step) = current.as_mut() {
            if step.description.is_empty() {
                step.description = line.to_string();
            } else {
                if !step.instructions.is_empty() {
                    step.instructions.push(' ');
                }
                step.instructions.push_str(line);
            }
        }
        // Lines before the first marker are preamble and are dropped.
    }

    if let Some(step) = current.take() {
        steps.push(step);
    }

    debug!(steps = steps.len(), "workflow synthesized from free text");
    steps
}

/// The ordinal a line claims, if it carries a marker.  Ordinal lists are
/// checked in order so overlapping markers resolve to the lowest ordinal.
fn marker_ordinal(line: &str) -> Option<usize> {
    let lowered = line.to_lowercase();
    for (index, markers) in ORDINAL_MARKERS.iter().enumerate() {
        if markers.iter().any(|marker| lowered.contains(marker)) {
            return Some(index + 1);
        }
    }
    None
}

/// Strip the marker tokens for `ordinal` from a line to produce the title.
fn strip_title_tokens(line: &str, ordinal: usize) -> String {
    let mut title = line.to_string();
    for token in TITLE_TOKENS[ordinal - 1] {
        title = title.replace(token, "");
    }
    title.trim().to_string()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
