//! The loaded-once procedure catalog.
//!
//! The catalog file is a nested JSON object with two sections:
//!
//! ```json
//! {
//!   "procedures": { "<id>": { ...Procedure... }, ... },
//!   "validation_rules": { "<procedure_id>": [ ...ValidationRule... ], ... }
//! }
//! ```
//!
//! Loading is deliberately forgiving: a missing or malformed file yields an
//! empty catalog (with a warning) rather than an error, so the assistant can
//! still answer questions and run queries when no procedures are available.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{CatalogError, CatalogResult};
use crate::procedure::{Procedure, ProcedureInfo, ValidationRule};

// ---------------------------------------------------------------------------
// File format
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    procedures: HashMap<String, ProcedureEntry>,
    #[serde(default)]
    validation_rules: HashMap<String, Vec<ValidationRule>>,
}

/// A procedure as written in the file: the map key is the id, so the body
/// does not repeat it.
#[derive(Debug, Deserialize)]
struct ProcedureEntry {
    title: String,
    description: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    prerequisites: Vec<String>,
    #[serde(default)]
    steps: Vec<crate::procedure::Step>,
}

// ---------------------------------------------------------------------------
// ProcedureCatalog
// ---------------------------------------------------------------------------

/// Immutable registry of named procedures.
#[derive(Debug, Default)]
pub struct ProcedureCatalog {
    procedures: HashMap<String, Procedure>,
    validation_rules: HashMap<String, Vec<ValidationRule>>,
}

impl ProcedureCatalog {
    /// An empty catalog.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load the catalog from a JSON file.
    ///
    /// Any failure (missing file, bad JSON, structural problems) degrades to
    /// an empty catalog; the error is logged, not propagated.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(catalog) => {
                info!(
                    path = %path.display(),
                    procedures = catalog.len(),
                    "procedure catalog loaded"
                );
                catalog
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "catalog load failed, using empty catalog");
                Self::empty()
            }
        }
    }

    /// Load the catalog from a JSON file, surfacing errors.
    pub fn load(path: impl AsRef<Path>) -> CatalogResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    /// Parse the catalog from a JSON string.
    pub fn from_json(raw: &str) -> CatalogResult<Self> {
        let file: CatalogFile = serde_json::from_str(raw)?;

        let mut procedures = HashMap::with_capacity(file.procedures.len());
        for (id, entry) in file.procedures {
            let procedure = Procedure {
                id: id.clone(),
                title: entry.title,
                description: entry.description,
                category: entry.category.unwrap_or_else(|| "general".to_string()),
                prerequisites: entry.prerequisites,
                steps: entry.steps,
            };
            check_step_ids(&procedure)?;
            procedures.insert(id, procedure);
        }

        Ok(Self {
            procedures,
            validation_rules: file.validation_rules,
        })
    }

    /// Look up a procedure by id.
    pub fn get(&self, procedure_id: &str) -> Option<&Procedure> {
        self.procedures.get(procedure_id)
    }

    /// Whether the catalog knows the given id.
    pub fn contains(&self, procedure_id: &str) -> bool {
        self.procedures.contains_key(procedure_id)
    }

    /// Listing of all procedures, sorted by title for stable output.
    pub fn list(&self) -> Vec<ProcedureInfo> {
        let mut infos: Vec<ProcedureInfo> = self.procedures.values().map(Procedure::info).collect();
        infos.sort_by(|a, b| a.title.cmp(&b.title));
        infos
    }

    /// Declared validation rules for a procedure (may be empty).
    pub fn validation_rules(&self, procedure_id: &str) -> &[ValidationRule] {
        self.validation_rules
            .get(procedure_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Number of procedures in the catalog.
    pub fn len(&self) -> usize {
        self.procedures.len()
    }

    /// Whether the catalog has no procedures.
    pub fn is_empty(&self) -> bool {
        self.procedures.is_empty()
    }
}

/// Step ids must be unique within a procedure; duplicate ids would make the
/// current-step pointer ambiguous.
fn check_step_ids(procedure: &Procedure) -> CatalogResult<()> {
    let mut seen = std::collections::HashSet::new();
    for step in &procedure.steps {
        if !seen.insert(step.step_id.as_str()) {
            return Err(CatalogError::InvalidProcedure {
                procedure_id: procedure.id.clone(),
                reason: format!("duplicate step id `{}`", step.step_id),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "procedures": {
            "work_confirmation": {
                "title": "Create Work Confirmation",
                "description": "Confirm completed work against a purchase order",
                "category": "procurement",
                "prerequisites": ["Valid login credentials"],
                "steps": [
                    {
                        "step_id": "login",
                        "title": "Log in",
                        "description": "Access the portal",
                        "instructions": "Enter credentials",
                        "next_steps": ["navigate"]
                    },
                    {
                        "step_id": "navigate",
                        "title": "Navigate",
                        "description": "Open work confirmations",
                        "instructions": "Use the main menu",
                        "next_steps": []
                    }
                ]
            }
        },
        "validation_rules": {
            "work_confirmation": [
                {
                    "rule_id": "r1",
                    "description": "PO must be open",
                    "rule_type": "po_status",
                    "error_message": "The purchase order is closed"
                }
            ]
        }
    }"#;

    #[test]
    fn parse_sample_catalog() {
        let catalog = ProcedureCatalog::from_json(SAMPLE).unwrap();
        assert_eq!(catalog.len(), 1);
        let proc = catalog.get("work_confirmation").unwrap();
        assert_eq!(proc.title, "Create Work Confirmation");
        assert_eq!(proc.steps.len(), 2);
        assert_eq!(catalog.validation_rules("work_confirmation").len(), 1);
    }

    #[test]
    fn duplicate_step_ids_rejected() {
        let raw = r#"{
            "procedures": {
                "p": {
                    "title": "P",
                    "description": "d",
                    "steps": [
                        {"step_id": "a", "title": "A", "description": "", "instructions": ""},
                        {"step_id": "a", "title": "A again", "description": "", "instructions": ""}
                    ]
                }
            }
        }"#;
        assert!(ProcedureCatalog::from_json(raw).is_err());
    }

    #[test]
    fn missing_file_degrades_to_empty() {
        let catalog = ProcedureCatalog::load_or_empty("/nonexistent/procedures.json");
        assert!(catalog.is_empty());
    }

    #[test]
    fn malformed_json_degrades_to_empty() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        let catalog = ProcedureCatalog::load_or_empty(file.path());
        assert!(catalog.is_empty());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let catalog = ProcedureCatalog::load(file.path()).unwrap();
        assert!(catalog.contains("work_confirmation"));
    }

    #[test]
    fn listing_is_sorted_by_title() {
        let raw = r#"{
            "procedures": {
                "b": {"title": "Zeta", "description": "", "steps": []},
                "a": {"title": "Alpha", "description": "", "steps": []}
            }
        }"#;
        let catalog = ProcedureCatalog::from_json(raw).unwrap();
        let titles: Vec<_> = catalog.list().into_iter().map(|i| i.title).collect();
        assert_eq!(titles, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn rules_for_unknown_procedure_are_empty() {
        let catalog = ProcedureCatalog::from_json(SAMPLE).unwrap();
        assert!(catalog.validation_rules("unknown").is_empty());
    }
}
