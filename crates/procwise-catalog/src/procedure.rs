//! Procedure and step data model.
//!
//! These types are deserialized from the catalog configuration file and are
//! immutable once loaded.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One unit of instruction within a procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    /// Identifier, unique within the owning procedure.
    pub step_id: String,
    /// Short step title.
    pub title: String,
    /// What this step accomplishes.
    pub description: String,
    /// Concrete actions the user should take.
    pub instructions: String,
    /// Declared completion criteria.  Evaluation is delegated to a pluggable
    /// validator; the shipped default treats every step as satisfied.
    #[serde(default)]
    pub validation_criteria: Vec<String>,
    /// Successor step ids.  Traversal is linear-first-only: the engine always
    /// follows `next_steps[0]`.  Later entries are preserved as authored
    /// (authoring tools may emit alternatives) but are never taken.
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// A named, ordered sequence of steps representing one guided business task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    /// Stable identifier, e.g. `work_confirmation`.
    pub id: String,
    /// Human-readable title.
    pub title: String,
    /// One-line summary shown in catalog listings.
    pub description: String,
    /// Grouping category, e.g. `procurement`.
    #[serde(default = "default_category")]
    pub category: String,
    /// Conditions the user should satisfy before starting.
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// The ordered step list.  The first element is the entry step.
    pub steps: Vec<Step>,
}

fn default_category() -> String {
    "general".to_string()
}

impl Procedure {
    /// A procedure is startable only when it has an entry step.
    pub fn first_step(&self) -> Option<&Step> {
        self.steps.first()
    }

    /// Look up a step by id.
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    /// Summary view used in listings.
    pub fn info(&self) -> ProcedureInfo {
        ProcedureInfo {
            procedure_id: self.id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            category: self.category.clone(),
            prerequisites: self.prerequisites.clone(),
        }
    }
}

/// Lightweight listing record for a procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureInfo {
    pub procedure_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub prerequisites: Vec<String>,
}

/// A declared validation rule attached to a procedure.
///
/// Rules are carried through from the catalog file for the benefit of
/// validator implementations; the engine itself never interprets them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationRule {
    pub rule_id: String,
    pub description: String,
    pub rule_type: String,
    #[serde(default)]
    pub parameters: serde_json::Value,
    pub error_message: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step_procedure() -> Procedure {
        serde_json::from_value(serde_json::json!({
            "id": "submit_invoice",
            "title": "Submit Invoice",
            "description": "Create and submit an invoice against a purchase order",
            "category": "finance",
            "prerequisites": ["Valid portal credentials"],
            "steps": [
                {
                    "step_id": "login",
                    "title": "Log in",
                    "description": "Access the supplier portal",
                    "instructions": "Enter your username and password",
                    "next_steps": ["enter_details"]
                },
                {
                    "step_id": "enter_details",
                    "title": "Enter invoice details",
                    "description": "Fill in amounts and dates",
                    "instructions": "Complete the invoice form and submit",
                    "next_steps": []
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn first_step_is_entry_point() {
        let proc = two_step_procedure();
        assert_eq!(proc.first_step().unwrap().step_id, "login");
    }

    #[test]
    fn step_lookup_by_id() {
        let proc = two_step_procedure();
        assert!(proc.step("enter_details").is_some());
        assert!(proc.step("missing").is_none());
    }

    #[test]
    fn defaults_applied_for_omitted_fields() {
        let proc: Procedure = serde_json::from_value(serde_json::json!({
            "id": "p",
            "title": "P",
            "description": "d",
            "steps": []
        }))
        .unwrap();
        assert_eq!(proc.category, "general");
        assert!(proc.prerequisites.is_empty());
        assert!(proc.first_step().is_none());
    }

    #[test]
    fn info_reflects_procedure() {
        let info = two_step_procedure().info();
        assert_eq!(info.procedure_id, "submit_invoice");
        assert_eq!(info.category, "finance");
        assert_eq!(info.prerequisites.len(), 1);
    }
}
