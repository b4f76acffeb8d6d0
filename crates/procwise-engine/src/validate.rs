//! Step-completion validation extension point.
//!
//! The engine consults a [`StepValidator`] before marking a step complete.
//! The shipped implementation accepts every step; deployments with real
//! business rules plug in their own.

use procwise_catalog::{Step, ValidationRule};

/// Decides whether the active step may be marked complete.
///
/// Returns human-readable error strings; an empty list means the step
/// passes.  Implementations must not panic.
pub trait StepValidator: Send + Sync {
    fn validate(
        &self,
        rules: &[ValidationRule],
        step: &Step,
        workflow_data: &serde_json::Map<String, serde_json::Value>,
    ) -> Vec<String>;
}

/// Default validator: every step passes.
pub struct NoChecksValidator;

impl StepValidator for NoChecksValidator {
    fn validate(
        &self,
        _rules: &[ValidationRule],
        _step: &Step,
        _workflow_data: &serde_json::Map<String, serde_json::Value>,
    ) -> Vec<String> {
        Vec::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_validator_accepts_everything() {
        let step = Step {
            step_id: "login".into(),
            title: "Log in".into(),
            description: String::new(),
            instructions: String::new(),
            validation_criteria: vec!["credentials entered".into()],
            next_steps: Vec::new(),
        };
        let validator = NoChecksValidator;
        let errors = validator.validate(&[], &step, &serde_json::Map::new());
        assert!(errors.is_empty());
    }
}
