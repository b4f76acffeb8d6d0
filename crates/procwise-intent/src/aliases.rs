//! Bilingual procedure alias resolution.
//!
//! Users refer to procedures by many names ("po", "purchase order",
//! "commandes d'achat", ...).  The resolver scans the utterance for every
//! registered alias and picks the **longest** match, so a short alias like
//! "po" can never pre-empt "purchase order" when both appear.

use aho_corasick::AhoCorasick;
use tracing::debug;

/// Built-in alias table: phrase (lowercase) → procedure id.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    // English
    ("work confirmation", "work_confirmation"),
    ("create work confirmation", "work_confirmation"),
    ("start work confirmation", "work_confirmation"),
    ("confirmation", "work_confirmation"),
    ("invoice", "invoice_submission"),
    ("submit invoice", "invoice_submission"),
    ("purchase order", "view_purchase_orders"),
    ("view purchase orders", "view_purchase_orders"),
    ("show purchase orders", "view_purchase_orders"),
    ("po", "view_purchase_orders"),
    ("supplier registration", "supplier_registration"),
    ("contract management", "contract_management"),
    ("payment tracking", "payment_tracking"),
    ("rfq response", "rfq_response"),
    ("goods receipt", "goods_receipt_confirmation"),
    ("service entry", "service_entry_sheet"),
    ("advance payment", "advance_payment_request"),
    ("quality deviation", "quality_deviation_report"),
    ("vendor performance", "vendor_performance_evaluation"),
    // French
    ("confirmation de travail", "work_confirmation"),
    ("créer confirmation de travail", "work_confirmation"),
    ("commencer confirmation de travail", "work_confirmation"),
    ("confirmation travail", "work_confirmation"),
    ("facture", "invoice_submission"),
    ("soumettre facture", "invoice_submission"),
    ("soumission facture", "invoice_submission"),
    ("commande d'achat", "view_purchase_orders"),
    ("commandes d'achat", "view_purchase_orders"),
    ("voir commandes d'achat", "view_purchase_orders"),
    ("afficher les commandes d'achat", "view_purchase_orders"),
    ("voir commandes", "view_purchase_orders"),
    ("enregistrement fournisseur", "supplier_registration"),
    ("gestion des contrats", "contract_management"),
    ("gérer les contrats", "contract_management"),
    ("suivi des paiements", "payment_tracking"),
    ("suivre les paiements", "payment_tracking"),
    ("réponse aux appels d'offres", "rfq_response"),
    ("répondre aux appels d'offres", "rfq_response"),
    ("appels d'offres", "rfq_response"),
    ("appel d'offres", "rfq_response"),
    ("confirmation de réception", "goods_receipt_confirmation"),
    ("réception des marchandises", "goods_receipt_confirmation"),
    ("fiche de service", "service_entry_sheet"),
    ("créer fiche de service", "service_entry_sheet"),
    ("paiement anticipé", "advance_payment_request"),
    ("demande de paiement anticipé", "advance_payment_request"),
    ("déviation qualité", "quality_deviation_report"),
    ("signaler une déviation qualité", "quality_deviation_report"),
    ("rapport de qualité", "quality_deviation_report"),
    ("évaluation des performances", "vendor_performance_evaluation"),
    ("performance fournisseur", "vendor_performance_evaluation"),
];

/// Longest-phrase-wins alias resolver.
pub struct ProcedureAliases {
    automaton: AhoCorasick,
    targets: Vec<&'static str>,
}

impl ProcedureAliases {
    /// Build the resolver over the built-in bilingual alias table.
    pub fn new() -> Self {
        let phrases: Vec<&str> = BUILTIN_ALIASES.iter().map(|(p, _)| *p).collect();
        let targets: Vec<&'static str> = BUILTIN_ALIASES.iter().map(|(_, t)| *t).collect();
        let automaton = AhoCorasick::new(&phrases)
            .unwrap_or_else(|e| panic!("invalid builtin alias table: {e}"));
        Self { automaton, targets }
    }

    /// Resolve the procedure named in an utterance, if any.
    ///
    /// Scans all overlapping alias occurrences and keeps the longest one,
    /// so "show me the purchase order list" resolves through
    /// "purchase order" rather than the embedded "po".
    pub fn resolve(&self, utterance: &str) -> Option<&'static str> {
        let lowered = utterance.trim().to_lowercase();

        let mut best: Option<(usize, usize)> = None; // (pattern index, match length)
        for mat in self.automaton.find_overlapping_iter(&lowered) {
            let len = mat.end() - mat.start();
            if best.is_none_or(|(_, best_len)| len > best_len) {
                best = Some((mat.pattern().as_usize(), len));
            }
        }

        let (idx, _) = best?;
        let target = self.targets[idx];
        debug!(utterance = %utterance, procedure_id = target, "procedure alias resolved");
        Some(target)
    }
}

impl Default for ProcedureAliases {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(text: &str) -> Option<&'static str> {
        ProcedureAliases::new().resolve(text)
    }

    #[test]
    fn longest_alias_wins() {
        // "po" is a substring of "purchase order"; the longer alias must win.
        assert_eq!(
            resolve("show me the purchase order list"),
            Some("view_purchase_orders")
        );
    }

    #[test]
    fn short_alias_still_matches_alone() {
        assert_eq!(resolve("po"), Some("view_purchase_orders"));
    }

    #[test]
    fn full_phrase_beats_embedded_word() {
        // "confirmation" alone maps to work_confirmation, but the longer
        // French phrase must take precedence.
        assert_eq!(
            resolve("commencer confirmation de travail"),
            Some("work_confirmation")
        );
    }

    #[test]
    fn french_aliases_resolve() {
        assert_eq!(resolve("soumettre facture"), Some("invoice_submission"));
        assert_eq!(resolve("appel d'offres"), Some("rfq_response"));
    }

    #[test]
    fn unknown_text_resolves_to_none() {
        assert_eq!(resolve("tell me a joke"), None);
    }

    #[test]
    fn resolution_is_case_insensitive() {
        assert_eq!(resolve("Start Work Confirmation"), Some("work_confirmation"));
    }
}
