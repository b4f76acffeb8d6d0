//! End-to-end turn scenarios against a small catalog.

use std::sync::Arc;

use async_trait::async_trait;

use procwise_catalog::ProcedureCatalog;
use procwise_engine::{
    AnswerGenerator, EngineResult, GeneratorContext, WorkflowEngine,
};
use procwise_store::{Language, SessionStore, WorkflowStatus};

const CATALOG: &str = r#"{
    "procedures": {
        "work_confirmation": {
            "title": "Create Work Confirmation",
            "description": "Create and submit a work confirmation",
            "category": "procurement",
            "prerequisites": ["Valid portal credentials"],
            "steps": [
                {
                    "step_id": "login",
                    "title": "Log in to the portal",
                    "description": "Access the supplier portal",
                    "instructions": "Enter your credentials",
                    "next_steps": ["navigate"]
                },
                {
                    "step_id": "navigate",
                    "title": "Open work confirmations",
                    "description": "Find the work confirmations area",
                    "instructions": "Use the main menu",
                    "next_steps": ["submit"]
                },
                {
                    "step_id": "submit",
                    "title": "Submit the confirmation",
                    "description": "Fill in and submit the form",
                    "instructions": "Complete all required fields and submit",
                    "next_steps": []
                }
            ]
        },
        "branching": {
            "title": "Branching Example",
            "description": "A procedure whose first step declares two successors",
            "steps": [
                {
                    "step_id": "a",
                    "title": "A",
                    "description": "First",
                    "instructions": "Do A",
                    "next_steps": ["b", "c"]
                },
                {
                    "step_id": "b",
                    "title": "B",
                    "description": "Preferred successor",
                    "instructions": "Do B",
                    "next_steps": []
                },
                {
                    "step_id": "c",
                    "title": "C",
                    "description": "Never taken",
                    "instructions": "Do C",
                    "next_steps": []
                }
            ]
        }
    }
}"#;

fn engine() -> WorkflowEngine {
    let catalog = ProcedureCatalog::from_json(CATALOG).expect("valid catalog");
    WorkflowEngine::new(catalog, Arc::new(SessionStore::new()))
}

#[tokio::test]
async fn full_procedure_walkthrough() {
    let engine = engine();

    let start = engine
        .handle_turn("s1", "start work confirmation", None)
        .await;
    assert!(start.message.contains("Starting procedure"));
    assert!(start.message.contains("Valid portal credentials"));
    assert_eq!(start.session.status, WorkflowStatus::InProgress);
    assert_eq!(start.session.current_step.as_deref(), Some("login"));

    let second = engine.handle_turn("s1", "done", None).await;
    assert!(second.message.contains("**Step 2: Open work confirmations**"));
    assert_eq!(second.session.completed_steps, vec!["login"]);

    let third = engine.handle_turn("s1", "done", None).await;
    assert!(third.message.contains("**Step 3: Submit the confirmation**"));

    let finished = engine.handle_turn("s1", "done", None).await;
    assert!(finished.message.contains("Congratulations"));
    assert_eq!(finished.session.status, WorkflowStatus::Completed);
    assert!(finished.session.current_step.is_none());
    assert_eq!(
        finished.session.completed_steps,
        vec!["login", "navigate", "submit"]
    );

    // Continuing past completion is a no-op turn, not an error.
    let after = engine.handle_turn("s1", "done", None).await;
    assert!(after.message.contains("don't have an active procedure"));
    assert_eq!(after.session.status, WorkflowStatus::Completed);
    assert_eq!(
        after.session.completed_steps,
        vec!["login", "navigate", "submit"]
    );
}

#[tokio::test]
async fn cancel_mid_procedure_keeps_session() {
    let engine = engine();

    engine
        .handle_turn("s1", "start work confirmation", None)
        .await;
    engine.handle_turn("s1", "done", None).await;

    let cancelled = engine.handle_turn("s1", "cancel", None).await;
    assert!(cancelled.message.contains("Create Work Confirmation"));
    assert!(cancelled.message.contains("cancelled"));
    assert_eq!(cancelled.session.status, WorkflowStatus::NotStarted);
    assert!(cancelled.session.current_procedure.is_none());
    // Cancel abandons the procedure but keeps what was already done.
    assert_eq!(cancelled.session.completed_steps, vec!["login"]);
}

#[tokio::test]
async fn reset_clears_progress_but_not_language() {
    let engine = engine();

    engine.handle_turn("s1", "passer au français", None).await;
    engine
        .handle_turn("s1", "commencer confirmation de travail", None)
        .await;

    let reset = engine.handle_turn("s1", "réinitialiser", None).await;
    assert_eq!(reset.language, Language::Fr);
    assert!(reset.message.contains("réinitialisée"));
    assert!(reset.session.current_procedure.is_none());
    assert!(reset.session.completed_steps.is_empty());
}

#[tokio::test]
async fn french_help_after_switch() {
    let engine = engine();

    let switched = engine.handle_turn("s1", "passer au français", None).await;
    assert_eq!(switched.language, Language::Fr);
    assert!(switched.message.contains("Langue changée en français"));

    let help = engine.handle_turn("s1", "aide", None).await;
    assert!(help.message.contains("Je peux vous aider avec"));
    assert!(help.message.contains("Create Work Confirmation"));
}

#[tokio::test]
async fn explicit_language_overrides_session() {
    let engine = engine();

    let result = engine
        .handle_turn("s1", "help", Some(Language::Fr))
        .await;
    assert_eq!(result.language, Language::Fr);
    assert!(result.message.contains("Assistant du Portail Fournisseur"));
}

#[tokio::test]
async fn branching_procedure_takes_first_successor() {
    let engine = engine();

    // "branching" has no start alias; put the session mid-procedure directly.
    let mut session = engine.store().get("s1");
    session.current_procedure = Some("branching".into());
    session.current_step = Some("a".into());
    session.status = WorkflowStatus::InProgress;
    engine.store().put("s1", session);

    let advanced = engine.handle_turn("s1", "done", None).await;
    assert_eq!(advanced.session.current_step.as_deref(), Some("b"));
    assert!(advanced.message.contains("Preferred successor"));
}

#[tokio::test]
async fn query_and_procedure_turns_interleave() {
    let engine = engine();

    engine
        .handle_turn("s1", "start work confirmation", None)
        .await;

    // A data query mid-procedure leaves the procedure state untouched.
    let query = engine.handle_turn("s1", "list invoices", None).await;
    assert!(query.message.contains("Invoices (1 found)"));
    assert_eq!(query.session.current_step.as_deref(), Some("login"));
    assert_eq!(query.session.status, WorkflowStatus::InProgress);

    let advanced = engine.handle_turn("s1", "done", None).await;
    assert_eq!(advanced.session.current_step.as_deref(), Some("navigate"));
}

// ---------------------------------------------------------------------------
// Dynamic workflows
// ---------------------------------------------------------------------------

struct SteppedAnswer;

#[async_trait]
impl AnswerGenerator for SteppedAnswer {
    async fn answer(&self, _: &str, _: &GeneratorContext) -> EngineResult<String> {
        Ok("Here is what to do.\n\
            Step 1: Open the portal\n\
            Log in with your supplier account.\n\
            Step 2: Locate the export screen\n\
            It is under the reports menu.\n\
            Step 3: Run the export\n\
            Press the export button and wait."
            .to_string())
    }
}

#[tokio::test]
async fn generator_answer_with_steps_becomes_dynamic_workflow() {
    let engine = engine().with_generator(Arc::new(SteppedAnswer));

    let started = engine
        .handle_turn("s1", "how do I export my order history", None)
        .await;
    assert!(started.message.contains("Dynamic Workflow"));
    assert!(started.message.contains("**Step 1: Open the portal**"));
    let session = &started.session;
    assert!(session
        .current_procedure
        .as_deref()
        .is_some_and(|p| p.starts_with("dynamic_")));
    assert_eq!(session.current_step.as_deref(), Some("step_1"));

    let second = engine.handle_turn("s1", "done", None).await;
    assert!(second.message.contains("**Step 2: Locate the export screen**"));

    let third = engine.handle_turn("s1", "done", None).await;
    assert!(third.message.contains("**Step 3: Run the export**"));

    let finished = engine.handle_turn("s1", "done", None).await;
    assert!(finished.message.contains("completed the workflow"));
    assert_eq!(finished.session.status, WorkflowStatus::Completed);
    // Exhaustion completes the workflow before the final append, so the last
    // step id is absent from the completion record.
    assert_eq!(
        finished.session.completed_steps,
        vec!["step_1", "step_2"]
    );
}

struct PlainAnswer;

#[async_trait]
impl AnswerGenerator for PlainAnswer {
    async fn answer(&self, _: &str, _: &GeneratorContext) -> EngineResult<String> {
        Ok("The portal is open around the clock.".to_string())
    }
}

#[tokio::test]
async fn generator_answer_without_steps_is_returned_verbatim() {
    let engine = engine().with_generator(Arc::new(PlainAnswer));

    let result = engine
        .handle_turn("s1", "when is the portal open", None)
        .await;
    assert_eq!(result.message, "The portal is open around the clock.");
    assert!(result.session.current_procedure.is_none());
}

#[tokio::test]
async fn no_generator_falls_back_to_related_procedures() {
    let engine = engine();

    let result = engine
        .handle_turn("s1", "question about my confirmation paperwork", None)
        .await;
    assert!(result.message.contains("related procedures"));
    assert!(result.message.contains("Create Work Confirmation"));
    assert!(result.suggestions[0].starts_with("Start "));
}
