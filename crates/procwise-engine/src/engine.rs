//! The workflow engine: one chat turn in, one structured response out.
//!
//! `handle_turn` is the single entry point.  It serializes turns per session
//! via the store's turn lock, works on a private copy of the session, and
//! writes the copy back only once the full turn computation has produced a
//! response.  Every branch returns a [`TurnResult`]; nothing escapes as an
//! error across this boundary.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use procwise_catalog::{ProcedureCatalog, Step};
use procwise_intent::{
    Intent, IntentClassifier, ProcedureAliases, contains_step_markers, synthesize,
};
use procwise_store::{Language, Session, SessionStore, WorkflowStatus};

use crate::data::{self, DataModule, MockDataModule, QueryOutcome};
use crate::dynamic::{self, DynamicAdvance};
use crate::generator::{AnswerGenerator, GENERATOR_TIMEOUT, GeneratorContext, answer_bounded};
use crate::i18n::{ActiveSummary, MessageKey, SuggestionSet, Translator};
use crate::validate::{NoChecksValidator, StepValidator};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Everything a caller gets back from one turn.
#[derive(Debug, Clone)]
pub struct TurnResult {
    pub message: String,
    pub session: Session,
    pub suggestions: Vec<String>,
    pub current_step: Option<Step>,
    pub validation_errors: Vec<String>,
    pub query_results: Option<Vec<Value>>,
    pub language: Language,
}

/// Handler-internal response parts, merged into the [`TurnResult`].
struct Outcome {
    message: String,
    suggestions: Vec<String>,
    current_step: Option<Step>,
    validation_errors: Vec<String>,
    query_results: Option<Vec<Value>>,
}

impl Outcome {
    fn text(message: String, suggestions: Vec<String>) -> Self {
        Self {
            message,
            suggestions,
            current_step: None,
            validation_errors: Vec::new(),
            query_results: None,
        }
    }
}

// ---------------------------------------------------------------------------
// WorkflowEngine
// ---------------------------------------------------------------------------

/// Orchestrates intent classification, the procedure state machine, query
/// routing and the free-text fallback over a shared [`SessionStore`].
pub struct WorkflowEngine {
    catalog: ProcedureCatalog,
    store: Arc<SessionStore>,
    classifier: IntentClassifier,
    aliases: ProcedureAliases,
    translator: Translator,
    data: Arc<dyn DataModule>,
    generator: Option<Arc<dyn AnswerGenerator>>,
    validator: Arc<dyn StepValidator>,
    generator_timeout: Duration,
}

impl WorkflowEngine {
    /// An engine over `catalog` and `store` with the default collaborators:
    /// mock data, no generator, accept-everything validation.
    pub fn new(catalog: ProcedureCatalog, store: Arc<SessionStore>) -> Self {
        Self {
            catalog,
            store,
            classifier: IntentClassifier::new(),
            aliases: ProcedureAliases::new(),
            translator: Translator::new(),
            data: Arc::new(MockDataModule::new()),
            generator: None,
            validator: Arc::new(NoChecksValidator),
            generator_timeout: GENERATOR_TIMEOUT,
        }
    }

    pub fn with_data_module(mut self, data: Arc<dyn DataModule>) -> Self {
        self.data = data;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn AnswerGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_validator(mut self, validator: Arc<dyn StepValidator>) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_generator_timeout(mut self, timeout: Duration) -> Self {
        self.generator_timeout = timeout;
        self
    }

    pub fn catalog(&self) -> &ProcedureCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Process one chat turn for `session_id`.
    ///
    /// An explicit language overrides the session's stored preference for
    /// this and subsequent turns.
    pub async fn handle_turn(
        &self,
        session_id: &str,
        utterance: &str,
        explicit_language: Option<Language>,
    ) -> TurnResult {
        let lock = self.store.turn_lock(session_id);
        let _guard = lock.lock().await;

        let mut session = self.store.get(session_id);
        if let Some(lang) = explicit_language {
            session.language = lang;
        }
        session.push_history("user", utterance);

        let intent = self.classifier.classify(utterance);
        debug!(session_id, ?intent, "dispatching turn");

        let outcome = match intent {
            Intent::StartProcedure => self.handle_start(utterance, &mut session),
            Intent::ContinueProcedure => self.handle_continue(&mut session),
            Intent::Cancel => self.handle_cancel(&mut session),
            Intent::Reset => self.handle_reset(&mut session),
            Intent::LanguageSwitchFr => self.handle_language(&mut session, Language::Fr),
            Intent::LanguageSwitchEn => self.handle_language(&mut session, Language::En),
            Intent::Help => self.handle_help(&session),
            Intent::DataQuery => self.handle_query(utterance, &session),
            Intent::General => self.handle_general(utterance, &mut session).await,
        };

        session.push_history("assistant", &outcome.message);
        let language = session.language;
        self.store.put(session_id, session.clone());

        TurnResult {
            message: outcome.message,
            session,
            suggestions: outcome.suggestions,
            current_step: outcome.current_step,
            validation_errors: outcome.validation_errors,
            query_results: outcome.query_results,
            language,
        }
    }

    // -- Start --------------------------------------------------------------

    fn handle_start(&self, utterance: &str, session: &mut Session) -> Outcome {
        let lang = session.language;

        let Some(procedure_id) = self.aliases.resolve(utterance) else {
            let listing = self.catalog.list();
            let suggestions = listing
                .iter()
                .take(5)
                .map(|p| self.translator.start_suggestion(&p.title, lang))
                .collect();
            let items = listing
                .into_iter()
                .map(|p| (p.title, p.description))
                .collect();
            return Outcome::text(
                self.translator
                    .render(&MessageKey::CatalogListing { items }, lang),
                suggestions,
            );
        };

        let Some(procedure) = self.catalog.get(procedure_id) else {
            return Outcome::text(
                self.translator.render(
                    &MessageKey::UnknownProcedure {
                        procedure_id: procedure_id.to_string(),
                    },
                    lang,
                ),
                self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
            );
        };

        let Some(first) = procedure.first_step() else {
            return Outcome::text(
                self.translator.render(
                    &MessageKey::NoSteps {
                        title: procedure.title.clone(),
                    },
                    lang,
                ),
                self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
            );
        };

        session.current_procedure = Some(procedure.id.clone());
        session.current_step = Some(first.step_id.clone());
        session.status = WorkflowStatus::InProgress;
        info!(
            session_id = %session.session_id,
            procedure_id = %procedure.id,
            "procedure started"
        );

        let message = self.translator.render(
            &MessageKey::ProcedureStarted {
                title: procedure.title.clone(),
                prerequisites: procedure.prerequisites.clone(),
                step_title: first.title.clone(),
                step_description: first.description.clone(),
                step_instructions: first.instructions.clone(),
            },
            lang,
        );

        Outcome {
            message,
            suggestions: self.translator.suggestions(SuggestionSet::StepInProgress, lang),
            current_step: Some(first.clone()),
            validation_errors: Vec::new(),
            query_results: None,
        }
    }

    // -- Continue -----------------------------------------------------------

    fn handle_continue(&self, session: &mut Session) -> Outcome {
        let lang = session.language;

        let (Some(procedure_id), Some(step_id)) = (
            session.current_procedure.clone(),
            session.current_step.clone(),
        ) else {
            return Outcome::text(
                self.translator.render(&MessageKey::NoActiveProcedure, lang),
                self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
            );
        };

        if dynamic::is_dynamic(&procedure_id) {
            return self.continue_dynamic(session);
        }

        let Some(procedure) = self.catalog.get(&procedure_id) else {
            warn!(
                session_id = %session.session_id,
                procedure_id = %procedure_id,
                "active procedure missing from catalog"
            );
            return Outcome::text(
                self.translator.render(&MessageKey::StepNotFound, lang),
                self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
            );
        };

        let Some(step) = procedure.step(&step_id) else {
            return Outcome::text(
                self.translator.render(&MessageKey::StepNotFound, lang),
                self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
            );
        };

        let errors = self.validator.validate(
            self.catalog.validation_rules(&procedure_id),
            step,
            &session.workflow_data,
        );
        if !errors.is_empty() {
            return Outcome {
                message: self.translator.render(
                    &MessageKey::ValidationFailed {
                        errors: errors.clone(),
                    },
                    lang,
                ),
                suggestions: self
                    .translator
                    .suggestions(SuggestionSet::ValidationRetry, lang),
                current_step: Some(step.clone()),
                validation_errors: errors,
                query_results: None,
            };
        }

        session.mark_step_completed(&step_id);

        if step.next_steps.is_empty() {
            session.status = WorkflowStatus::Completed;
            session.current_step = None;
            info!(
                session_id = %session.session_id,
                procedure_id = %procedure_id,
                steps = session.completed_steps.len(),
                "procedure completed"
            );
            return Outcome::text(
                self.translator.render(
                    &MessageKey::ProcedureCompleted {
                        title: procedure.title.clone(),
                    },
                    lang,
                ),
                self.translator.suggestions(SuggestionSet::AfterCompletion, lang),
            );
        }

        // Traversal is linear: always the first successor.
        let next_id = &step.next_steps[0];
        let Some(next) = procedure.step(next_id) else {
            warn!(
                procedure_id = %procedure_id,
                step_id = %next_id,
                "successor step missing from procedure"
            );
            return Outcome::text(
                self.translator.render(&MessageKey::NextStepNotFound, lang),
                self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
            );
        };

        session.current_step = Some(next.step_id.clone());
        let step_number = session.completed_steps.len() + 1;

        let message = self.translator.render(
            &MessageKey::StepAdvanced {
                step_number,
                step_title: next.title.clone(),
                step_description: next.description.clone(),
                step_instructions: next.instructions.clone(),
            },
            lang,
        );

        Outcome {
            message,
            suggestions: self.translator.suggestions(SuggestionSet::StepInProgress, lang),
            current_step: Some(next.clone()),
            validation_errors: Vec::new(),
            query_results: None,
        }
    }

    fn continue_dynamic(&self, session: &mut Session) -> Outcome {
        let lang = session.language;

        match dynamic::advance_dynamic(session) {
            DynamicAdvance::Completed { question } => {
                info!(session_id = %session.session_id, "dynamic workflow completed");
                Outcome::text(
                    self.translator
                        .render(&MessageKey::DynamicCompleted { question }, lang),
                    self.translator
                        .suggestions(SuggestionSet::AfterDynamicCompletion, lang),
                )
            }
            DynamicAdvance::Next {
                step_number,
                step,
                has_more,
            } => {
                let message = self.translator.render(
                    &MessageKey::StepAdvanced {
                        step_number,
                        step_title: step.title.clone(),
                        step_description: step.description.clone(),
                        step_instructions: step.instructions.clone(),
                    },
                    lang,
                );
                let next_steps = if has_more {
                    vec![format!("step_{}", step_number + 1)]
                } else {
                    Vec::new()
                };
                Outcome {
                    message,
                    suggestions: self.translator.suggestions(SuggestionSet::DynamicStep, lang),
                    current_step: Some(Step {
                        step_id: format!("step_{step_number}"),
                        title: step.title,
                        description: step.description,
                        instructions: step.instructions,
                        validation_criteria: Vec::new(),
                        next_steps,
                    }),
                    validation_errors: Vec::new(),
                    query_results: None,
                }
            }
            DynamicAdvance::Broken => {
                session.clear_active_procedure();
                Outcome::text(
                    self.translator.render(&MessageKey::StepNotFound, lang),
                    self.translator.suggestions(SuggestionSet::CatalogBrowse, lang),
                )
            }
        }
    }

    // -- Cancel / reset / language -------------------------------------------

    fn handle_cancel(&self, session: &mut Session) -> Outcome {
        let lang = session.language;

        let Some(procedure_id) = session.current_procedure.clone() else {
            return Outcome::text(
                self.translator.render(&MessageKey::NothingToCancel, lang),
                self.translator.suggestions(SuggestionSet::AfterCancel, lang),
            );
        };

        let title = if dynamic::is_dynamic(&procedure_id) {
            dynamic::original_question(session)
        } else {
            self.catalog
                .get(&procedure_id)
                .map(|p| p.title.clone())
                .unwrap_or(procedure_id)
        };

        session.clear_active_procedure();
        info!(session_id = %session.session_id, "procedure cancelled");

        Outcome::text(
            self.translator.render(&MessageKey::Cancelled { title }, lang),
            self.translator.suggestions(SuggestionSet::AfterCancel, lang),
        )
    }

    fn handle_reset(&self, session: &mut Session) -> Outcome {
        let lang = session.language;
        session.reset_progress();
        info!(session_id = %session.session_id, "session reset");

        Outcome::text(
            self.translator.render(&MessageKey::SessionReset, lang),
            self.translator.suggestions(SuggestionSet::AfterReset, lang),
        )
    }

    fn handle_language(&self, session: &mut Session, lang: Language) -> Outcome {
        session.language = lang;
        debug!(session_id = %session.session_id, language = lang.as_str(), "language switched");

        Outcome::text(
            self.translator.render(&MessageKey::LanguageSwitched, lang),
            self.translator
                .suggestions(SuggestionSet::AfterLanguageSwitch, lang),
        )
    }

    // -- Help ----------------------------------------------------------------

    fn handle_help(&self, session: &Session) -> Outcome {
        let lang = session.language;

        let active = session.current_procedure.as_ref().map(|procedure_id| {
            let title = if dynamic::is_dynamic(procedure_id) {
                dynamic::original_question(session)
            } else {
                self.catalog
                    .get(procedure_id)
                    .map(|p| p.title.clone())
                    .unwrap_or_else(|| procedure_id.clone())
            };
            ActiveSummary {
                title,
                current_step: session.current_step.clone().unwrap_or_default(),
                completed: session.completed_steps.len(),
            }
        });

        let procedure_titles = self.catalog.list().into_iter().map(|p| p.title).collect();

        Outcome::text(
            self.translator.render(
                &MessageKey::HelpOverview {
                    procedure_titles,
                    active,
                },
                lang,
            ),
            self.translator.suggestions(SuggestionSet::Help, lang),
        )
    }

    // -- Data queries --------------------------------------------------------

    fn handle_query(&self, utterance: &str, session: &Session) -> Outcome {
        let lang = session.language;

        let Some(query) = data::parse_query(utterance) else {
            return Outcome::text(
                self.translator.render(&MessageKey::QueryHelp, lang),
                self.translator.suggestions(SuggestionSet::QueryHelp, lang),
            );
        };

        match self.data.query(&query) {
            Err(err) => {
                warn!(error = %err, domain = ?query.domain, "data module query failed");
                Outcome::text(
                    self.translator.render(&MessageKey::QueryFailed, lang),
                    self.translator.suggestions(SuggestionSet::General, lang),
                )
            }
            Ok(QueryOutcome::Empty) => {
                let (en, fr) = data::no_rows_messages(query.domain);
                Outcome::text(
                    self.translator.render(&MessageKey::QueryNoRows { en, fr }, lang),
                    self.translator.suggestions(SuggestionSet::QueryHelp, lang),
                )
            }
            Ok(QueryOutcome::Rows(rows)) => {
                let message = data::format_rows(query.domain, &rows, lang);
                Outcome {
                    message,
                    suggestions: self.translator.suggestions(SuggestionSet::QueryResults, lang),
                    current_step: None,
                    validation_errors: Vec::new(),
                    query_results: Some(rows),
                }
            }
        }
    }

    // -- General / free text -------------------------------------------------

    async fn handle_general(&self, utterance: &str, session: &mut Session) -> Outcome {
        let lang = session.language;

        if let Some(generator) = &self.generator {
            let context = GeneratorContext {
                current_procedure: session.current_procedure.clone(),
                current_step: session.current_step.clone(),
                completed_steps: session.completed_steps.clone(),
                recent_history: session
                    .conversation_history
                    .iter()
                    .rev()
                    .take(6)
                    .rev()
                    .cloned()
                    .collect(),
                language: lang,
            };

            if let Some(answer) =
                answer_bounded(generator.as_ref(), utterance, &context, self.generator_timeout)
                    .await
            {
                if contains_step_markers(&answer) {
                    let steps = synthesize(&answer);
                    if !steps.is_empty() {
                        dynamic::start_dynamic(session, utterance, &steps);
                        let first = &steps[0];
                        let message = self.translator.render(
                            &MessageKey::DynamicStarted {
                                question: utterance.to_string(),
                                step_title: first.title.clone(),
                                step_description: first.description.clone(),
                                step_instructions: first.instructions.clone(),
                            },
                            lang,
                        );
                        let next_steps = if steps.len() > 1 {
                            vec!["step_2".to_string()]
                        } else {
                            Vec::new()
                        };
                        return Outcome {
                            message,
                            suggestions: self
                                .translator
                                .suggestions(SuggestionSet::DynamicStep, lang),
                            current_step: Some(Step {
                                step_id: "step_1".to_string(),
                                title: first.title.clone(),
                                description: first.description.clone(),
                                instructions: first.instructions.clone(),
                                validation_criteria: Vec::new(),
                                next_steps,
                            }),
                            validation_errors: Vec::new(),
                            query_results: None,
                        };
                    }
                }
                return Outcome::text(
                    answer,
                    self.translator.suggestions(SuggestionSet::General, lang),
                );
            }
        }

        // No generator (or it failed): offer procedures whose title words
        // appear in the utterance.
        let lowered = utterance.to_lowercase();
        let related: Vec<_> = self
            .catalog
            .list()
            .into_iter()
            .filter(|p| {
                let title = p.title.to_lowercase();
                title.split_whitespace().any(|word| lowered.contains(word))
            })
            .collect();

        if !related.is_empty() {
            let suggestions = related
                .iter()
                .take(3)
                .map(|p| self.translator.start_suggestion(&p.title, lang))
                .collect();
            let items = related
                .into_iter()
                .map(|p| (p.title, p.description))
                .collect();
            return Outcome::text(
                self.translator
                    .render(&MessageKey::RelatedProcedures { items }, lang),
                suggestions,
            );
        }

        Outcome::text(
            self.translator.render(&MessageKey::GeneralFallback, lang),
            self.translator.suggestions(SuggestionSet::General, lang),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
