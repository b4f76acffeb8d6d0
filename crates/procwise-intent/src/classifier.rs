//! Prioritized intent classification.
//!
//! The classifier resolves one utterance to one [`Intent`] through a fixed
//! cascade; the first tier that matches wins and later tiers are never
//! consulted:
//!
//! 1. **Explicit commands** — whole-message equality (after trim/lowercase)
//!    against the cancel / reset / language-switch phrase sets.  Equality,
//!    not substring, so a sentence that merely contains "reset" is not
//!    hijacked.
//! 2. **Strong procedure cues** — substring match against multi-word phrases
//!    like "guide me through".
//! 3. **Keyword tiers**, in this order: help, continue, data query,
//!    procedure.  The order is a tie-break policy: "help me create an
//!    invoice" contains both a help and a procedure keyword and must
//!    classify as [`Intent::Help`].
//! 4. Otherwise [`Intent::General`].
//!
//! All phrase sets are bilingual (English/French).  Matching is substring
//! (not word-boundary) in tiers 2-3, mirroring how users actually type.

use aho_corasick::AhoCorasick;
use tracing::debug;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The classified purpose of one utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Begin a named procedure (or list the catalog when none resolves).
    StartProcedure,
    /// Advance the active procedure by one step.
    ContinueProcedure,
    /// Abandon the active procedure, keeping the session.
    Cancel,
    /// Clear all procedure state in the session.
    Reset,
    /// Switch the session language to French.
    LanguageSwitchFr,
    /// Switch the session language to English.
    LanguageSwitchEn,
    /// Show capabilities and session status.
    Help,
    /// Look up back-office data (purchase orders, invoices, ...).
    DataQuery,
    /// Anything else; handled by the free-text fallback path.
    General,
}

// ---------------------------------------------------------------------------
// Phrase sets
// ---------------------------------------------------------------------------

const CANCEL_COMMANDS: &[&str] = &[
    "cancel procedure",
    "cancel",
    "stop procedure",
    "quit procedure",
    "annuler procédure",
    "annuler",
    "arrêter procédure",
    "quitter procédure",
];

const RESET_COMMANDS: &[&str] = &[
    "reset session",
    "reset",
    "start over",
    "clear session",
    "réinitialiser session",
    "réinitialiser",
    "recommencer",
    "effacer session",
];

const FRENCH_SWITCH_COMMANDS: &[&str] = &[
    "passer au français",
    "français",
    "en français",
    "switch to french",
];

const ENGLISH_SWITCH_COMMANDS: &[&str] = &[
    "switch to english",
    "english",
    "en anglais",
    "passer à l'anglais",
];

/// Strong multi-word cues that unambiguously ask for guided execution.
const PROCEDURE_PHRASES: &[&str] = &[
    "guide me through",
    "walk me through",
    "how to create",
    "how to submit",
    "how to view",
    "guidez-moi",
    "accompagnez-moi",
    "comment créer",
    "comment soumettre",
    "comment voir",
    "work confirmation",
    "confirmation de travail",
    "manufacturing",
    "fabrication",
];

const HELP_KEYWORDS: &[&str] = &[
    "help", "what can", "available", "options", "assist", "support", "aide", "que pouvez",
    "disponible", "assister",
];

const CONTINUE_KEYWORDS: &[&str] = &[
    "next",
    "continue",
    "done",
    "completed",
    "yes",
    "proceed",
    "suivant",
    "continuer",
    "terminé",
    "oui",
    "procéder",
];

const QUERY_KEYWORDS: &[&str] = &[
    "search",
    "find",
    "show me",
    "display",
    "list",
    "query",
    "rechercher",
    "trouver",
    "afficher",
    "montrer",
    "lister",
];

const PROCEDURE_KEYWORDS: &[&str] = &[
    "create",
    "start",
    "begin",
    "guide",
    "step",
    "procedure",
    "process",
    "workflow",
    "créer",
    "commencer",
    "démarrer",
    "étape",
    "procédure",
    "processus",
];

// ---------------------------------------------------------------------------
// IntentClassifier
// ---------------------------------------------------------------------------

/// Deterministic, total utterance classifier.
///
/// The keyword automatons are built once at construction; `classify` itself
/// is allocation-light and has no side effects.
pub struct IntentClassifier {
    procedure_phrases: AhoCorasick,
    help_keywords: AhoCorasick,
    continue_keywords: AhoCorasick,
    query_keywords: AhoCorasick,
    procedure_keywords: AhoCorasick,
}

impl IntentClassifier {
    /// Build a classifier with the built-in bilingual phrase sets.
    pub fn new() -> Self {
        Self {
            procedure_phrases: automaton(PROCEDURE_PHRASES),
            help_keywords: automaton(HELP_KEYWORDS),
            continue_keywords: automaton(CONTINUE_KEYWORDS),
            query_keywords: automaton(QUERY_KEYWORDS),
            procedure_keywords: automaton(PROCEDURE_KEYWORDS),
        }
    }

    /// Classify one utterance.  Total: always returns a value.
    pub fn classify(&self, utterance: &str) -> Intent {
        let text = utterance.trim().to_lowercase();

        // Tier 1: explicit commands, whole-message equality.
        let intent = if CANCEL_COMMANDS.contains(&text.as_str()) {
            Intent::Cancel
        } else if RESET_COMMANDS.contains(&text.as_str()) {
            Intent::Reset
        } else if FRENCH_SWITCH_COMMANDS.contains(&text.as_str()) {
            Intent::LanguageSwitchFr
        } else if ENGLISH_SWITCH_COMMANDS.contains(&text.as_str()) {
            Intent::LanguageSwitchEn
        }
        // Tier 2: strong procedure cues.
        else if self.procedure_phrases.is_match(&text) {
            Intent::StartProcedure
        }
        // Tier 3: keyword tiers, first hit wins.  The order is load-bearing.
        else if self.help_keywords.is_match(&text) {
            Intent::Help
        } else if self.continue_keywords.is_match(&text) {
            Intent::ContinueProcedure
        } else if self.query_keywords.is_match(&text) {
            Intent::DataQuery
        } else if self.procedure_keywords.is_match(&text) {
            Intent::StartProcedure
        } else {
            Intent::General
        };

        debug!(utterance = %utterance, ?intent, "utterance classified");
        intent
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn automaton(patterns: &[&str]) -> AhoCorasick {
    // Patterns are compile-time constants; construction cannot fail on them.
    AhoCorasick::new(patterns).unwrap_or_else(|e| panic!("invalid builtin phrase set: {e}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
