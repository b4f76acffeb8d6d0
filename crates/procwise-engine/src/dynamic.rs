//! Dynamic workflows synthesized from free text.
//!
//! A dynamic workflow lives entirely inside the session: its step list is
//! stored in `workflow_data["steps"]`, its id is `dynamic_<n>`, and its step
//! ids are the 1-based `step_1`, `step_2`, ...  The exhaustion check runs
//! before the completion append, so the final step id never lands in
//! `completed_steps`.

use std::hash::{DefaultHasher, Hash, Hasher};

use serde_json::json;
use tracing::{debug, warn};

use procwise_intent::SynthesizedStep;
use procwise_store::{Session, WorkflowStatus};

const STEPS_KEY: &str = "steps";
const QUESTION_KEY: &str = "original_question";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Outcome of advancing a dynamic workflow by one turn.
#[derive(Debug, Clone)]
pub enum DynamicAdvance {
    /// All steps are exhausted; the workflow is complete.
    Completed { question: String },
    /// Moved to the next step.
    Next {
        /// 1-based number of the step now active.
        step_number: usize,
        step: SynthesizedStep,
        /// Whether another step follows this one.
        has_more: bool,
    },
    /// The session's dynamic state is unreadable.
    Broken,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Derive a session-local procedure id from the originating question.
pub fn dynamic_procedure_id(question: &str) -> String {
    let mut hasher = DefaultHasher::new();
    question.hash(&mut hasher);
    format!("dynamic_{}", hasher.finish() % 10000)
}

/// Whether a procedure id denotes a dynamic workflow.
pub fn is_dynamic(procedure_id: &str) -> bool {
    procedure_id.starts_with("dynamic_")
}

/// Install a synthesized step list as the session's active workflow.
///
/// The caller guarantees `steps` is non-empty.
pub fn start_dynamic(session: &mut Session, question: &str, steps: &[SynthesizedStep]) {
    let procedure_id = dynamic_procedure_id(question);
    debug!(
        procedure_id = %procedure_id,
        steps = steps.len(),
        "starting dynamic workflow"
    );

    session.workflow_data = serde_json::Map::new();
    session
        .workflow_data
        .insert(STEPS_KEY.to_string(), json!(steps));
    session
        .workflow_data
        .insert(QUESTION_KEY.to_string(), json!(question));
    session.current_procedure = Some(procedure_id);
    session.current_step = Some("step_1".to_string());
    session.status = WorkflowStatus::InProgress;
}

/// The question a dynamic workflow was synthesized from.
pub fn original_question(session: &Session) -> String {
    session
        .workflow_data
        .get(QUESTION_KEY)
        .and_then(|v| v.as_str())
        .unwrap_or("Dynamic Workflow")
        .to_string()
}

/// Advance the session's dynamic workflow by one step.
///
/// `current_step` holds `step_N` where `N` is the 1-based number of the step
/// being finished.  When `N` reaches the step count the workflow completes;
/// otherwise `steps[N]` (the next step) becomes active and `step_N` is
/// recorded as completed.
pub fn advance_dynamic(session: &mut Session) -> DynamicAdvance {
    let steps: Vec<SynthesizedStep> = match session
        .workflow_data
        .get(STEPS_KEY)
        .cloned()
        .map(serde_json::from_value)
    {
        Some(Ok(steps)) => steps,
        _ => {
            warn!(session_id = %session.session_id, "dynamic workflow has no readable steps");
            return DynamicAdvance::Broken;
        }
    };

    let current = match session
        .current_step
        .as_deref()
        .and_then(|s| s.strip_prefix("step_"))
        .and_then(|n| n.parse::<usize>().ok())
    {
        Some(n) => n,
        None => {
            warn!(session_id = %session.session_id, "dynamic step id is malformed");
            return DynamicAdvance::Broken;
        }
    };

    if current >= steps.len() {
        let question = original_question(session);
        session.status = WorkflowStatus::Completed;
        session.current_step = None;
        return DynamicAdvance::Completed { question };
    }

    let next = steps[current].clone();
    session.current_step = Some(format!("step_{}", current + 1));
    session.mark_step_completed(&format!("step_{current}"));

    DynamicAdvance::Next {
        step_number: current + 1,
        step: next,
        has_more: current + 1 < steps.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn three_steps() -> Vec<SynthesizedStep> {
        (1..=3)
            .map(|n| SynthesizedStep {
                ordinal: n,
                title: format!("Title {n}"),
                description: format!("Description {n}"),
                instructions: format!("Instructions {n}"),
            })
            .collect()
    }

    #[test]
    fn id_is_stable_and_bounded() {
        let a = dynamic_procedure_id("how do I submit an invoice");
        let b = dynamic_procedure_id("how do I submit an invoice");
        assert_eq!(a, b);
        let n: u64 = a.strip_prefix("dynamic_").unwrap().parse().unwrap();
        assert!(n < 10000);
    }

    #[test]
    fn start_installs_workflow_state() {
        let mut session = Session::new("s1");
        start_dynamic(&mut session, "how do I register", &three_steps());
        assert!(session.has_active_procedure());
        assert_eq!(session.current_step.as_deref(), Some("step_1"));
        assert_eq!(session.status, WorkflowStatus::InProgress);
        assert_eq!(original_question(&session), "how do I register");
    }

    #[test]
    fn advance_walks_steps_then_completes() {
        let mut session = Session::new("s1");
        start_dynamic(&mut session, "q", &three_steps());

        match advance_dynamic(&mut session) {
            DynamicAdvance::Next {
                step_number,
                step,
                has_more,
            } => {
                assert_eq!(step_number, 2);
                assert_eq!(step.title, "Title 2");
                assert!(has_more);
            }
            other => panic!("unexpected advance: {other:?}"),
        }
        assert_eq!(session.completed_steps, vec!["step_1"]);

        match advance_dynamic(&mut session) {
            DynamicAdvance::Next { step_number, has_more, .. } => {
                assert_eq!(step_number, 3);
                assert!(!has_more);
            }
            other => panic!("unexpected advance: {other:?}"),
        }

        match advance_dynamic(&mut session) {
            DynamicAdvance::Completed { question } => assert_eq!(question, "q"),
            other => panic!("unexpected advance: {other:?}"),
        }
        assert_eq!(session.status, WorkflowStatus::Completed);
        assert!(session.current_step.is_none());
        // The final step id is never recorded.
        assert_eq!(session.completed_steps, vec!["step_1", "step_2"]);
    }

    #[test]
    fn advance_with_missing_steps_is_broken() {
        let mut session = Session::new("s1");
        session.current_procedure = Some("dynamic_1".into());
        session.current_step = Some("step_1".into());
        assert!(matches!(advance_dynamic(&mut session), DynamicAdvance::Broken));
    }
}
