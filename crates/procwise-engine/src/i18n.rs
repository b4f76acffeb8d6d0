//! Bilingual message rendering.
//!
//! Handlers never emit literal strings: they build a [`MessageKey`] carrying
//! the dynamic parts and let the [`Translator`] select the English or French
//! rendering from `Session.language`.  Suggestion chips follow the same
//! scheme via [`SuggestionSet`].

use procwise_store::Language;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Summary of the active procedure shown inside the help overview.
#[derive(Debug, Clone)]
pub struct ActiveSummary {
    pub title: String,
    pub current_step: String,
    pub completed: usize,
}

/// A user-visible message plus its dynamic payload.
#[derive(Debug, Clone)]
pub enum MessageKey {
    /// Enumerated catalog listing: `(title, description)` pairs.
    CatalogListing { items: Vec<(String, String)> },
    UnknownProcedure { procedure_id: String },
    NoSteps { title: String },
    ProcedureStarted {
        title: String,
        prerequisites: Vec<String>,
        step_title: String,
        step_description: String,
        step_instructions: String,
    },
    StepAdvanced {
        step_number: usize,
        step_title: String,
        step_description: String,
        step_instructions: String,
    },
    ValidationFailed { errors: Vec<String> },
    ProcedureCompleted { title: String },
    NoActiveProcedure,
    StepNotFound,
    NextStepNotFound,
    DynamicStarted {
        question: String,
        step_title: String,
        step_description: String,
        step_instructions: String,
    },
    DynamicCompleted { question: String },
    QueryHelp,
    QueryFailed,
    /// Per-domain "no rows" sentences, supplied by the data formatter.
    QueryNoRows { en: &'static str, fr: &'static str },
    Cancelled { title: String },
    NothingToCancel,
    SessionReset,
    LanguageSwitched,
    HelpOverview {
        procedure_titles: Vec<String>,
        active: Option<ActiveSummary>,
    },
    /// Related procedures found by title-word matching: `(title, description)`.
    RelatedProcedures { items: Vec<(String, String)> },
    GeneralFallback,
}

/// Canned suggestion sets attached to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionSet {
    StepInProgress,
    DynamicStep,
    ValidationRetry,
    CatalogBrowse,
    AfterCompletion,
    AfterDynamicCompletion,
    AfterCancel,
    AfterReset,
    AfterLanguageSwitch,
    Help,
    QueryHelp,
    QueryResults,
    General,
}

/// Stateless bilingual string catalog.
#[derive(Debug, Default, Clone, Copy)]
pub struct Translator;

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl Translator {
    pub fn new() -> Self {
        Self
    }

    /// Render a message in the requested language.
    pub fn render(&self, key: &MessageKey, lang: Language) -> String {
        match lang {
            Language::En => self.render_en(key),
            Language::Fr => self.render_fr(key),
        }
    }

    /// The "Start <title>" chip offered next to catalog listings.
    pub fn start_suggestion(&self, title: &str, lang: Language) -> String {
        match lang {
            Language::En => format!("Start {title}"),
            Language::Fr => format!("Commencer {title}"),
        }
    }

    /// Canned suggestion chips for a response category.
    pub fn suggestions(&self, set: SuggestionSet, lang: Language) -> Vec<String> {
        let chips: &[&str] = match (set, lang) {
            (SuggestionSet::StepInProgress, Language::En) => {
                &["Done with this step", "Cancel procedure", "Help"]
            }
            (SuggestionSet::StepInProgress, Language::Fr) => {
                &["Terminé avec cette étape", "Annuler procédure", "Aide"]
            }
            (SuggestionSet::DynamicStep, Language::En) => {
                &["Done with this step", "Cancel procedure", "Help"]
            }
            (SuggestionSet::DynamicStep, Language::Fr) => {
                &["Terminé avec cette étape", "Annuler procédure", "Aide"]
            }
            (SuggestionSet::ValidationRetry, Language::En) => &["Retry step", "Show help"],
            (SuggestionSet::ValidationRetry, Language::Fr) => {
                &["Réessayer l'étape", "Afficher l'aide"]
            }
            (SuggestionSet::CatalogBrowse, Language::En) => &["Show available procedures"],
            (SuggestionSet::CatalogBrowse, Language::Fr) => {
                &["Afficher les procédures disponibles"]
            }
            (SuggestionSet::AfterCompletion, Language::En) => &[
                "Start another procedure",
                "View purchase orders",
                "Show available procedures",
            ],
            (SuggestionSet::AfterCompletion, Language::Fr) => &[
                "Commencer une autre procédure",
                "Voir les commandes d'achat",
                "Afficher les procédures disponibles",
            ],
            (SuggestionSet::AfterDynamicCompletion, Language::En) => {
                &["Start another procedure", "Ask another question", "Help"]
            }
            (SuggestionSet::AfterDynamicCompletion, Language::Fr) => {
                &["Commencer une autre procédure", "Poser une autre question", "Aide"]
            }
            (SuggestionSet::AfterCancel, Language::En) => &[
                "Show available procedures",
                "Start work confirmation",
                "View purchase orders",
                "Help",
            ],
            (SuggestionSet::AfterCancel, Language::Fr) => &[
                "Afficher les procédures disponibles",
                "Commencer confirmation de travail",
                "Voir les commandes d'achat",
                "Aide",
            ],
            (SuggestionSet::AfterReset, Language::En) => &[
                "Show available procedures",
                "Start work confirmation",
                "View purchase orders",
                "Help",
            ],
            (SuggestionSet::AfterReset, Language::Fr) => &[
                "Afficher les procédures disponibles",
                "Commencer confirmation de travail",
                "Voir les commandes d'achat",
                "Aide",
            ],
            (SuggestionSet::AfterLanguageSwitch, Language::En) => &[
                "Show available procedures",
                "Start work confirmation",
                "View purchase orders",
                "Help",
            ],
            (SuggestionSet::AfterLanguageSwitch, Language::Fr) => &[
                "Afficher les procédures disponibles",
                "Commencer confirmation de travail",
                "Voir les commandes d'achat",
                "Aide",
            ],
            (SuggestionSet::Help, Language::En) => &[
                "Start work confirmation",
                "Show purchase orders",
                "List available procedures",
            ],
            (SuggestionSet::Help, Language::Fr) => &[
                "Commencer confirmation de travail",
                "Afficher les commandes d'achat",
                "Lister les procédures disponibles",
            ],
            (SuggestionSet::QueryHelp, Language::En) => {
                &["Show purchase orders", "List invoices", "Search suppliers"]
            }
            (SuggestionSet::QueryHelp, Language::Fr) => &[
                "Afficher les commandes d'achat",
                "Lister les factures",
                "Rechercher les fournisseurs",
            ],
            (SuggestionSet::QueryResults, Language::En) => {
                &["Show more details", "New search", "Help"]
            }
            (SuggestionSet::QueryResults, Language::Fr) => {
                &["Afficher plus de détails", "Nouvelle recherche", "Aide"]
            }
            (SuggestionSet::General, Language::En) => &[
                "Show procedures",
                "Start work confirmation",
                "View purchase orders",
                "Help",
            ],
            (SuggestionSet::General, Language::Fr) => &[
                "Afficher les procédures",
                "Commencer confirmation de travail",
                "Voir les commandes d'achat",
                "Aide",
            ],
        };
        chips.iter().map(|s| s.to_string()).collect()
    }

    // -- English renderings -------------------------------------------------

    fn render_en(&self, key: &MessageKey) -> String {
        match key {
            MessageKey::CatalogListing { items } => {
                let mut msg =
                    String::from("I can help you with the following guided procedures:\n\n");
                for (title, description) in items {
                    msg.push_str(&format!("• {title}: {description}\n"));
                }
                msg
            }
            MessageKey::UnknownProcedure { procedure_id } => format!(
                "I don't have information about the procedure '{procedure_id}'. \
                 Please choose from the available procedures."
            ),
            MessageKey::NoSteps { title } => {
                format!("The procedure '{title}' has no defined steps.")
            }
            MessageKey::ProcedureStarted {
                title,
                prerequisites,
                step_title,
                step_description,
                step_instructions,
            } => {
                let mut msg = format!("Starting procedure: **{title}**\n\n");
                if !prerequisites.is_empty() {
                    msg.push_str("**Prerequisites:**\n");
                    for prereq in prerequisites {
                        msg.push_str(&format!("• {prereq}\n"));
                    }
                    msg.push('\n');
                }
                msg.push_str(&format!("**Step 1: {step_title}**\n"));
                msg.push_str(&format!("{step_description}\n\n"));
                msg.push_str(&format!("**Instructions:** {step_instructions}\n\n"));
                msg.push_str("Type 'done' or 'next' when you've completed this step.");
                msg
            }
            MessageKey::StepAdvanced {
                step_number,
                step_title,
                step_description,
                step_instructions,
            } => {
                let mut msg = String::from("Step completed!\n\n");
                msg.push_str(&format!("**Step {step_number}: {step_title}**\n"));
                msg.push_str(&format!("{step_description}\n\n"));
                msg.push_str(&format!("**Instructions:** {step_instructions}\n\n"));
                msg.push_str("Type 'done' or 'next' when you've completed this step.");
                msg
            }
            MessageKey::ValidationFailed { errors } => {
                let mut msg = String::from(
                    "Please complete the following requirements before proceeding:\n\n",
                );
                for error in errors {
                    msg.push_str(&format!("• {error}\n"));
                }
                msg
            }
            MessageKey::ProcedureCompleted { title } => format!(
                "Congratulations! You have successfully completed the procedure: \
                 **{title}**\n\nAll steps have been completed. Is there anything else \
                 I can help you with?"
            ),
            MessageKey::NoActiveProcedure => {
                "You don't have an active procedure. Please start a new procedure first."
                    .to_string()
            }
            MessageKey::StepNotFound => {
                "Error: Current step not found in procedure.".to_string()
            }
            MessageKey::NextStepNotFound => {
                "Error: Next step not found in procedure.".to_string()
            }
            MessageKey::DynamicStarted {
                question,
                step_title,
                step_description,
                step_instructions,
            } => {
                let mut msg = format!("**Dynamic Workflow: {question}**\n\n");
                msg.push_str(&format!("**Step 1: {step_title}**\n"));
                msg.push_str(&format!("{step_description}\n\n"));
                msg.push_str(&format!("**Instructions:** {step_instructions}\n\n"));
                msg.push_str("Type 'done' or 'next' when you've completed this step.");
                msg
            }
            MessageKey::DynamicCompleted { question } => format!(
                "Congratulations! You have completed the workflow for: \
                 **{question}**\n\nAll steps have been completed. Is there anything \
                 else I can help you with?"
            ),
            MessageKey::QueryHelp => "I can help you query business data. Available queries:\n\n\
                 • **Purchase Orders**: Search by PO number, supplier, or date range\n\
                 • **Invoices**: View invoice status and payment tracking\n\
                 • **Suppliers**: Search supplier information and performance\n\n\
                 Example: 'Show purchase order PO-2024-001' or 'List all invoices'"
                .to_string(),
            MessageKey::QueryFailed => {
                "Something went wrong while querying the data. Please try again.".to_string()
            }
            MessageKey::QueryNoRows { en, .. } => (*en).to_string(),
            MessageKey::Cancelled { title } => format!(
                "Procedure '{title}' has been cancelled.\n\nYour session is still \
                 active. What would you like to do next?"
            ),
            MessageKey::NothingToCancel => {
                "No active procedure to cancel. What would you like to do?".to_string()
            }
            MessageKey::SessionReset => "Session has been reset successfully!\n\n\
                 Welcome back to the supplier portal assistant.\n\n\
                 I can help you with guided procedures and data queries. \
                 What would you like to do?"
                .to_string(),
            MessageKey::LanguageSwitched => "Language switched to English!\n\n\
                 I'm your supplier portal assistant. I can help you with guided \
                 procedures and data queries.\n\nWhat would you like to do?"
                .to_string(),
            MessageKey::HelpOverview {
                procedure_titles,
                active,
            } => {
                let mut msg = String::from("**Supplier Portal Assistant**\n\n");
                msg.push_str("I can help you with:\n\n**Procedures & Workflows:**\n");
                for title in procedure_titles {
                    msg.push_str(&format!("• {title}\n"));
                }
                msg.push_str("\n**Data Queries:**\n");
                msg.push_str("• Search Purchase Orders\n");
                msg.push_str("• View Invoice Status\n");
                msg.push_str("• Check Supplier Information\n");
                msg.push_str("\n**Available Commands:**\n");
                msg.push_str("• \"Start [procedure name]\" - Begin a guided procedure\n");
                msg.push_str("• \"Show purchase orders\" - Query PO data\n");
                msg.push_str("• \"List invoices\" - View invoice information\n");
                msg.push_str("• \"Help\" - Show this message\n");
                msg.push_str("\n**Current Session:**\n");
                match active {
                    Some(summary) => {
                        msg.push_str(&format!("• Active Procedure: {}\n", summary.title));
                        msg.push_str(&format!("• Current Step: {}\n", summary.current_step));
                        msg.push_str(&format!("• Completed Steps: {}\n", summary.completed));
                    }
                    None => msg.push_str("• No active procedure\n"),
                }
                msg.push_str("\nWhat would you like to do?");
                msg
            }
            MessageKey::RelatedProcedures { items } => {
                let mut msg = String::from("I found these related procedures:\n\n");
                for (title, description) in items {
                    msg.push_str(&format!("• **{title}**: {description}\n"));
                }
                msg.push_str("\nWould you like to start one of these procedures?");
                msg
            }
            MessageKey::GeneralFallback => "I'm your supplier portal assistant. I can guide \
                 you step by step through business procedures and look up purchase \
                 orders, invoices and supplier data.\n\nWhat would you like to do?"
                .to_string(),
        }
    }

    // -- French renderings --------------------------------------------------

    fn render_fr(&self, key: &MessageKey) -> String {
        match key {
            MessageKey::CatalogListing { items } => {
                let mut msg = String::from(
                    "Je peux vous aider avec les procédures guidées suivantes :\n\n",
                );
                for (title, description) in items {
                    msg.push_str(&format!("• {title} : {description}\n"));
                }
                msg
            }
            MessageKey::UnknownProcedure { procedure_id } => format!(
                "Je n'ai pas d'informations sur la procédure '{procedure_id}'. \
                 Veuillez choisir parmi les procédures disponibles."
            ),
            MessageKey::NoSteps { title } => {
                format!("La procédure '{title}' n'a pas d'étapes définies.")
            }
            MessageKey::ProcedureStarted {
                title,
                prerequisites,
                step_title,
                step_description,
                step_instructions,
            } => {
                let mut msg = format!("Démarrage de la procédure : **{title}**\n\n");
                if !prerequisites.is_empty() {
                    msg.push_str("**Prérequis :**\n");
                    for prereq in prerequisites {
                        msg.push_str(&format!("• {prereq}\n"));
                    }
                    msg.push('\n');
                }
                msg.push_str(&format!("**Étape 1 : {step_title}**\n"));
                msg.push_str(&format!("{step_description}\n\n"));
                msg.push_str(&format!("**Instructions :** {step_instructions}\n\n"));
                msg.push_str("Tapez 'terminé' ou 'suivant' quand vous avez complété cette étape.");
                msg
            }
            MessageKey::StepAdvanced {
                step_number,
                step_title,
                step_description,
                step_instructions,
            } => {
                let mut msg = String::from("Étape terminée !\n\n");
                msg.push_str(&format!("**Étape {step_number} : {step_title}**\n"));
                msg.push_str(&format!("{step_description}\n\n"));
                msg.push_str(&format!("**Instructions :** {step_instructions}\n\n"));
                msg.push_str("Tapez 'terminé' ou 'suivant' quand vous avez complété cette étape.");
                msg
            }
            MessageKey::ValidationFailed { errors } => {
                let mut msg = String::from(
                    "Veuillez compléter les exigences suivantes avant de continuer :\n\n",
                );
                for error in errors {
                    msg.push_str(&format!("• {error}\n"));
                }
                msg
            }
            MessageKey::ProcedureCompleted { title } => format!(
                "Félicitations ! Vous avez terminé avec succès la procédure : \
                 **{title}**\n\nToutes les étapes ont été complétées. Y a-t-il autre \
                 chose avec quoi je peux vous aider ?"
            ),
            MessageKey::NoActiveProcedure => {
                "Vous n'avez pas de procédure active. Veuillez d'abord commencer une \
                 nouvelle procédure."
                    .to_string()
            }
            MessageKey::StepNotFound => {
                "Erreur : Étape actuelle non trouvée dans la procédure.".to_string()
            }
            MessageKey::NextStepNotFound => {
                "Erreur : Étape suivante non trouvée dans la procédure.".to_string()
            }
            MessageKey::DynamicStarted {
                question,
                step_title,
                step_description,
                step_instructions,
            } => {
                let mut msg = format!("**Flux de travail dynamique : {question}**\n\n");
                msg.push_str(&format!("**Étape 1 : {step_title}**\n"));
                msg.push_str(&format!("{step_description}\n\n"));
                msg.push_str(&format!("**Instructions :** {step_instructions}\n\n"));
                msg.push_str("Tapez 'terminé' ou 'suivant' quand vous avez complété cette étape.");
                msg
            }
            MessageKey::DynamicCompleted { question } => format!(
                "Félicitations ! Vous avez terminé le flux de travail pour : \
                 **{question}**\n\nToutes les étapes ont été complétées. Y a-t-il \
                 autre chose avec quoi je peux vous aider ?"
            ),
            MessageKey::QueryHelp => "Je peux vous aider à interroger les données métier. \
                 Requêtes disponibles :\n\n\
                 • **Commandes d'Achat** : Recherche par numéro de commande, fournisseur \
                 ou plage de dates\n\
                 • **Factures** : Voir le statut des factures et le suivi des paiements\n\
                 • **Fournisseurs** : Rechercher les informations et performances des \
                 fournisseurs\n\n\
                 Exemple : 'Afficher la commande d'achat PO-2024-001' ou 'Lister toutes \
                 les factures'"
                .to_string(),
            MessageKey::QueryFailed => {
                "Une erreur s'est produite lors de la requête. Veuillez réessayer.".to_string()
            }
            MessageKey::QueryNoRows { fr, .. } => (*fr).to_string(),
            MessageKey::Cancelled { title } => format!(
                "Procédure '{title}' annulée.\n\nVotre session est toujours active. \
                 Que souhaitez-vous faire ensuite ?"
            ),
            MessageKey::NothingToCancel => {
                "Aucune procédure active à annuler. Que souhaitez-vous faire ?".to_string()
            }
            MessageKey::SessionReset => "La session a été réinitialisée avec succès !\n\n\
                 Bienvenue à nouveau dans l'assistant du portail fournisseur.\n\n\
                 Je peux vous aider avec les procédures guidées et les requêtes de \
                 données. Que souhaitez-vous faire ?"
                .to_string(),
            MessageKey::LanguageSwitched => "Langue changée en français !\n\n\
                 Je suis votre assistant du portail fournisseur. Je peux vous aider \
                 avec les procédures guidées et les requêtes de données.\n\n\
                 Que souhaitez-vous faire ?"
                .to_string(),
            MessageKey::HelpOverview {
                procedure_titles,
                active,
            } => {
                let mut msg = String::from("**Assistant du Portail Fournisseur**\n\n");
                msg.push_str("Je peux vous aider avec :\n\n**Procédures et Flux de Travail :**\n");
                for title in procedure_titles {
                    msg.push_str(&format!("• {title}\n"));
                }
                msg.push_str("\n**Requêtes de Données :**\n");
                msg.push_str("• Rechercher les Commandes d'Achat\n");
                msg.push_str("• Voir le Statut des Factures\n");
                msg.push_str("• Vérifier les Informations Fournisseur\n");
                msg.push_str("\n**Commandes Disponibles :**\n");
                msg.push_str("• \"Commencer [nom de procédure]\" - Débuter une procédure guidée\n");
                msg.push_str(
                    "• \"Afficher les commandes d'achat\" - Interroger les données de commandes\n",
                );
                msg.push_str("• \"Lister les factures\" - Voir les informations de factures\n");
                msg.push_str("• \"Aide\" - Afficher ce message\n");
                msg.push_str("\n**Session Actuelle :**\n");
                match active {
                    Some(summary) => {
                        msg.push_str(&format!("• Procédure Active : {}\n", summary.title));
                        msg.push_str(&format!("• Étape Actuelle : {}\n", summary.current_step));
                        msg.push_str(&format!("• Étapes Terminées : {}\n", summary.completed));
                    }
                    None => msg.push_str("• Aucune procédure active\n"),
                }
                msg.push_str("\nQue souhaitez-vous faire ?");
                msg
            }
            MessageKey::RelatedProcedures { items } => {
                let mut msg = String::from("J'ai trouvé ces procédures liées :\n\n");
                for (title, description) in items {
                    msg.push_str(&format!("• **{title}** : {description}\n"));
                }
                msg.push_str("\nSouhaitez-vous commencer une de ces procédures ?");
                msg
            }
            MessageKey::GeneralFallback => "Je suis votre assistant du portail fournisseur. \
                 Je peux vous guider étape par étape à travers les procédures métier et \
                 rechercher les commandes d'achat, les factures et les données \
                 fournisseur.\n\nQue souhaitez-vous faire ?"
                .to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_both_languages_for_cancel() {
        let t = Translator::new();
        let key = MessageKey::Cancelled {
            title: "Submit Invoice".into(),
        };
        let en = t.render(&key, Language::En);
        let fr = t.render(&key, Language::Fr);
        assert!(en.contains("has been cancelled"));
        assert!(fr.contains("annulée"));
        assert!(en.contains("Submit Invoice") && fr.contains("Submit Invoice"));
    }

    #[test]
    fn step_advanced_carries_step_number() {
        let t = Translator::new();
        let key = MessageKey::StepAdvanced {
            step_number: 3,
            step_title: "Review".into(),
            step_description: "Check the data".into(),
            step_instructions: "Open the review screen".into(),
        };
        assert!(t.render(&key, Language::En).contains("**Step 3: Review**"));
        assert!(t.render(&key, Language::Fr).contains("**Étape 3 : Review**"));
    }

    #[test]
    fn suggestions_are_localized() {
        let t = Translator::new();
        let en = t.suggestions(SuggestionSet::StepInProgress, Language::En);
        let fr = t.suggestions(SuggestionSet::StepInProgress, Language::Fr);
        assert_eq!(en[0], "Done with this step");
        assert_eq!(fr[0], "Terminé avec cette étape");
    }

    #[test]
    fn help_overview_shows_active_procedure() {
        let t = Translator::new();
        let key = MessageKey::HelpOverview {
            procedure_titles: vec!["Create Work Confirmation".into()],
            active: Some(ActiveSummary {
                title: "Create Work Confirmation".into(),
                current_step: "login".into(),
                completed: 2,
            }),
        };
        let en = t.render(&key, Language::En);
        assert!(en.contains("Active Procedure: Create Work Confirmation"));
        assert!(en.contains("Completed Steps: 2"));
    }

    #[test]
    fn start_suggestion_prefix() {
        let t = Translator::new();
        assert_eq!(t.start_suggestion("X", Language::En), "Start X");
        assert_eq!(t.start_suggestion("X", Language::Fr), "Commencer X");
    }
}
