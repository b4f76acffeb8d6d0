//! The per-conversation session entity.
//!
//! A session tracks progress through at most one active procedure (static or
//! dynamic) at a time, plus the user's language and a bounded conversation
//! history.  Sessions are mutated only by the workflow engine during a turn
//! and written back through the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Conversation history is capped at this many entries; oldest are dropped.
pub const HISTORY_CAP: usize = 20;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The two content languages the assistant speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
}

impl Language {
    /// Parse a language tag, defaulting to English for anything unknown.
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "fr" => Self::Fr,
            _ => Self::En,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Fr => "fr",
        }
    }
}

/// Where a session is in its active procedure, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    Paused,
    Error,
}

/// One conversation turn as recorded in the session history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// "user" or "assistant".
    pub role: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Mutable per-conversation state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub language: Language,
    /// Active procedure id; `dynamic_*` ids denote a synthesized workflow
    /// whose steps live in `workflow_data`, not in the catalog.
    pub current_procedure: Option<String>,
    pub current_step: Option<String>,
    /// Append-only, duplicate-suppressed record of finished step ids.
    pub completed_steps: Vec<String>,
    /// Scratch data for the active workflow.  For dynamic workflows this
    /// holds the synthesized step list and the provenance question.
    pub workflow_data: serde_json::Map<String, serde_json::Value>,
    pub status: WorkflowStatus,
    /// Bounded conversation history, oldest entries dropped past the cap.
    pub conversation_history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A fresh session claiming `session_id`, in English, with no progress.
    pub fn new(session_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            language: Language::En,
            current_procedure: None,
            current_step: None,
            completed_steps: Vec::new(),
            workflow_data: serde_json::Map::new(),
            status: WorkflowStatus::NotStarted,
            conversation_history: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a conversation turn, dropping the oldest entry past the cap.
    pub fn push_history(&mut self, role: &str, message: &str) {
        self.conversation_history.push(HistoryEntry {
            role: role.to_string(),
            message: message.to_string(),
            timestamp: Utc::now(),
        });
        if self.conversation_history.len() > HISTORY_CAP {
            let excess = self.conversation_history.len() - HISTORY_CAP;
            self.conversation_history.drain(..excess);
        }
    }

    /// Append a step id to the completion record unless already present.
    pub fn mark_step_completed(&mut self, step_id: &str) {
        if !self.completed_steps.iter().any(|s| s == step_id) {
            self.completed_steps.push(step_id.to_string());
        }
    }

    /// Whether a procedure (static or dynamic) is currently active.
    pub fn has_active_procedure(&self) -> bool {
        self.current_procedure.is_some() && self.current_step.is_some()
    }

    /// Drop the active-procedure pointer, keeping language, history and the
    /// completion record.  Used by cancel.
    pub fn clear_active_procedure(&mut self) {
        self.current_procedure = None;
        self.current_step = None;
        self.status = WorkflowStatus::NotStarted;
    }

    /// Clear all procedure progress, preserving identity, language and
    /// history.  Used by reset.
    pub fn reset_progress(&mut self) {
        self.current_procedure = None;
        self.current_step = None;
        self.completed_steps.clear();
        self.workflow_data.clear();
        self.status = WorkflowStatus::NotStarted;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_is_capped_oldest_dropped() {
        let mut session = Session::new("s1");
        for i in 0..(HISTORY_CAP + 5) {
            session.push_history("user", &format!("message {i}"));
        }
        assert_eq!(session.conversation_history.len(), HISTORY_CAP);
        // The five oldest entries are gone.
        assert_eq!(session.conversation_history[0].message, "message 5");
    }

    #[test]
    fn completed_steps_suppress_duplicates() {
        let mut session = Session::new("s1");
        session.mark_step_completed("a");
        session.mark_step_completed("b");
        session.mark_step_completed("a");
        assert_eq!(session.completed_steps, vec!["a", "b"]);
    }

    #[test]
    fn reset_preserves_language_and_history() {
        let mut session = Session::new("s1");
        session.language = Language::Fr;
        session.push_history("user", "bonjour");
        session.current_procedure = Some("p".into());
        session.current_step = Some("s".into());
        session.completed_steps.push("s0".into());
        session.status = WorkflowStatus::InProgress;

        session.reset_progress();

        assert_eq!(session.language, Language::Fr);
        assert_eq!(session.conversation_history.len(), 1);
        assert!(session.current_procedure.is_none());
        assert!(session.completed_steps.is_empty());
        assert_eq!(session.status, WorkflowStatus::NotStarted);
    }

    #[test]
    fn cancel_keeps_completion_record() {
        let mut session = Session::new("s1");
        session.current_procedure = Some("p".into());
        session.current_step = Some("s2".into());
        session.completed_steps.push("s1".into());
        session.status = WorkflowStatus::InProgress;

        session.clear_active_procedure();

        assert!(!session.has_active_procedure());
        assert_eq!(session.completed_steps, vec!["s1"]);
        assert_eq!(session.status, WorkflowStatus::NotStarted);
    }

    #[test]
    fn language_parse_defaults_to_english() {
        assert_eq!(Language::parse("fr"), Language::Fr);
        assert_eq!(Language::parse("FR "), Language::Fr);
        assert_eq!(Language::parse("en"), Language::En);
        assert_eq!(Language::parse("de"), Language::En);
    }
}
