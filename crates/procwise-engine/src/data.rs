//! Back-office data lookups.
//!
//! Query parsing is keyword-set membership per domain, bilingual, with one
//! targeted regex extraction for purchase-order numbers.  Lookups go through
//! the [`DataModule`] trait; the shipped [`MockDataModule`] serves a small
//! fixed dataset.  "No rows" is an explicit [`QueryOutcome`] variant, never
//! an error.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Value, json};
use tracing::debug;

use procwise_store::Language;

use crate::error::EngineResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// The queryable business-object domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataDomain {
    PurchaseOrders,
    Invoices,
    Suppliers,
    Contracts,
    Rfqs,
    Analytics,
}

/// The lookup kinds a domain supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    ListAll,
    SearchByPoNumber,
    Dashboard,
}

/// A parsed data query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleQuery {
    pub domain: DataDomain,
    pub kind: QueryKind,
    /// Uppercased PO number for targeted lookups.
    pub po_number: Option<String>,
}

/// Result of a data lookup.  `Empty` is an expected outcome, not a failure.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Rows(Vec<Value>),
    Empty,
}

/// Business-object lookup collaborator.  Pure and synchronous from the
/// engine's perspective.
pub trait DataModule: Send + Sync {
    fn query(&self, query: &ModuleQuery) -> EngineResult<QueryOutcome>;
}

// ---------------------------------------------------------------------------
// Query parsing
// ---------------------------------------------------------------------------

const PO_KEYWORDS: &[&str] = &[
    "po",
    "purchase order",
    "purchase orders",
    "commande d'achat",
    "commandes d'achat",
    "commande",
    "commandes",
    "afficher les commandes",
    "voir les commandes",
];

const INVOICE_KEYWORDS: &[&str] = &["invoice", "invoices", "facture", "factures"];

const SUPPLIER_KEYWORDS: &[&str] = &["supplier", "suppliers", "fournisseur", "fournisseurs"];

const CONTRACT_KEYWORDS: &[&str] = &["contract", "contracts", "contrat", "contrats"];

const RFQ_KEYWORDS: &[&str] = &[
    "rfq",
    "rfqs",
    "quotation",
    "appel d'offres",
    "appels d'offres",
    "devis",
];

const ANALYTICS_KEYWORDS: &[&str] = &[
    "analytics",
    "report",
    "performance",
    "trend",
    "analytique",
    "rapport",
    "tendance",
];

fn po_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Parsing operates on lowercased text; the match is uppercased afterward.
    PATTERN.get_or_init(|| Regex::new(r"po-[\d-]+").unwrap())
}

/// Parse an utterance into a data query, or `None` when no domain matches.
///
/// Domains are checked in a fixed order; the first whose keyword set hits
/// wins.  Purchase orders additionally extract a `PO-…` number when present.
pub fn parse_query(utterance: &str) -> Option<ModuleQuery> {
    let lowered = utterance.to_lowercase();
    let contains_any = |set: &[&str]| set.iter().any(|kw| lowered.contains(kw));

    let query = if contains_any(PO_KEYWORDS) {
        if let Some(found) = po_number_pattern().find(&lowered) {
            ModuleQuery {
                domain: DataDomain::PurchaseOrders,
                kind: QueryKind::SearchByPoNumber,
                po_number: Some(found.as_str().to_uppercase()),
            }
        } else {
            ModuleQuery {
                domain: DataDomain::PurchaseOrders,
                kind: QueryKind::ListAll,
                po_number: None,
            }
        }
    } else if contains_any(INVOICE_KEYWORDS) {
        ModuleQuery {
            domain: DataDomain::Invoices,
            kind: QueryKind::ListAll,
            po_number: None,
        }
    } else if contains_any(SUPPLIER_KEYWORDS) {
        ModuleQuery {
            domain: DataDomain::Suppliers,
            kind: QueryKind::ListAll,
            po_number: None,
        }
    } else if contains_any(CONTRACT_KEYWORDS) {
        ModuleQuery {
            domain: DataDomain::Contracts,
            kind: QueryKind::ListAll,
            po_number: None,
        }
    } else if contains_any(RFQ_KEYWORDS) {
        ModuleQuery {
            domain: DataDomain::Rfqs,
            kind: QueryKind::ListAll,
            po_number: None,
        }
    } else if contains_any(ANALYTICS_KEYWORDS) {
        ModuleQuery {
            domain: DataDomain::Analytics,
            kind: QueryKind::Dashboard,
            po_number: None,
        }
    } else {
        return None;
    };

    debug!(domain = ?query.domain, kind = ?query.kind, "parsed data query");
    Some(query)
}

// ---------------------------------------------------------------------------
// Mock data module
// ---------------------------------------------------------------------------

/// Fixed in-memory dataset standing in for the real back office.
pub struct MockDataModule {
    purchase_orders: Vec<Value>,
    invoices: Vec<Value>,
    suppliers: Vec<Value>,
    contracts: Vec<Value>,
    rfqs: Vec<Value>,
    analytics: Value,
}

impl MockDataModule {
    pub fn new() -> Self {
        Self {
            purchase_orders: vec![
                json!({
                    "po_number": "PO-2024-001",
                    "supplier": "Tanger Med Services",
                    "status": "Approved",
                    "amount": 50000.00,
                    "currency": "MAD",
                    "created_date": "2024-01-15",
                    "delivery_date": "2024-02-15",
                    "description": "IT Services Contract",
                    "completion_percentage": 75
                }),
                json!({
                    "po_number": "PO-2024-002",
                    "supplier": "Mediterranean Logistics",
                    "status": "Pending",
                    "amount": 25000.00,
                    "currency": "MAD",
                    "created_date": "2024-01-20",
                    "delivery_date": "2024-02-20",
                    "description": "Transportation Services",
                    "completion_percentage": 30
                }),
            ],
            invoices: vec![json!({
                "invoice_number": "INV-2024-001",
                "po_number": "PO-2024-001",
                "supplier": "Tanger Med Services",
                "amount": 12500.00,
                "status": "Submitted",
                "submission_date": "2024-01-25"
            })],
            suppliers: vec![
                json!({
                    "supplier_id": "SUP-001",
                    "name": "Tanger Med Services",
                    "status": "Active",
                    "contact_email": "contact@tangermed-services.com",
                    "registration_date": "2023-06-01"
                }),
                json!({
                    "supplier_id": "SUP-002",
                    "name": "Mediterranean Logistics",
                    "status": "Active",
                    "contact_email": "info@med-logistics.com",
                    "registration_date": "2023-08-15"
                }),
            ],
            contracts: vec![json!({
                "contract_id": "CNT-2024-001",
                "supplier": "Tanger Med Services",
                "status": "Active",
                "start_date": "2024-01-01",
                "end_date": "2024-12-31",
                "value": 500000.00,
                "performance_score": 92
            })],
            rfqs: vec![json!({
                "rfq_number": "RFQ-2024-001",
                "title": "Port Equipment Maintenance",
                "status": "Open",
                "deadline": "2024-02-28",
                "estimated_value": 100000.00,
                "responses_count": 3
            })],
            analytics: json!({
                "supplier_performance": {
                    "average_score": 87.5,
                    "top_performers": ["Tanger Med Services", "Mediterranean Logistics"],
                    "improvement_areas": ["Delivery Time", "Documentation"]
                },
                "payment_trends": {
                    "average_payment_time": 28,
                    "on_time_percentage": 94.2,
                    "disputed_payments": 2
                }
            }),
        }
    }
}

impl Default for MockDataModule {
    fn default() -> Self {
        Self::new()
    }
}

impl DataModule for MockDataModule {
    fn query(&self, query: &ModuleQuery) -> EngineResult<QueryOutcome> {
        let rows: Vec<Value> = match (query.domain, query.kind) {
            (DataDomain::PurchaseOrders, QueryKind::SearchByPoNumber) => {
                let wanted = query.po_number.as_deref().unwrap_or_default();
                self.purchase_orders
                    .iter()
                    .filter(|po| po["po_number"].as_str() == Some(wanted))
                    .cloned()
                    .collect()
            }
            (DataDomain::PurchaseOrders, _) => self.purchase_orders.clone(),
            (DataDomain::Invoices, _) => self.invoices.clone(),
            (DataDomain::Suppliers, _) => self.suppliers.clone(),
            (DataDomain::Contracts, _) => self.contracts.clone(),
            (DataDomain::Rfqs, _) => self.rfqs.clone(),
            (DataDomain::Analytics, _) => vec![self.analytics.clone()],
        };

        if rows.is_empty() {
            Ok(QueryOutcome::Empty)
        } else {
            Ok(QueryOutcome::Rows(rows))
        }
    }
}

// ---------------------------------------------------------------------------
// Response formatting
// ---------------------------------------------------------------------------

/// Per-domain "no rows" sentences, English and French.
pub fn no_rows_messages(domain: DataDomain) -> (&'static str, &'static str) {
    match domain {
        DataDomain::PurchaseOrders => {
            ("No purchase orders found.", "Aucune commande d'achat trouvée.")
        }
        DataDomain::Invoices => ("No invoices found.", "Aucune facture trouvée."),
        DataDomain::Suppliers => ("No suppliers found.", "Aucun fournisseur trouvé."),
        DataDomain::Contracts => ("No contracts found.", "Aucun contrat trouvé."),
        DataDomain::Rfqs => ("No RFQs found.", "Aucun appel d'offres trouvé."),
        DataDomain::Analytics => {
            ("No analytics data available.", "Aucune donnée analytique disponible.")
        }
    }
}

fn str_field<'a>(row: &'a Value, key: &str) -> &'a str {
    row[key].as_str().unwrap_or("-")
}

/// Render query rows as a chat-ready summary in the requested language.
pub fn format_rows(domain: DataDomain, rows: &[Value], lang: Language) -> String {
    let fr = lang == Language::Fr;
    let mut out = String::new();

    match domain {
        DataDomain::PurchaseOrders => {
            if fr {
                out.push_str(&format!("**Commandes d'Achat ({} trouvées) :**\n\n", rows.len()));
            } else {
                out.push_str(&format!("**Purchase Orders ({} found):**\n\n", rows.len()));
            }
            for po in rows {
                out.push_str(&format!("**{}**\n", str_field(po, "po_number")));
                if fr {
                    out.push_str(&format!("   - Fournisseur : {}\n", str_field(po, "supplier")));
                    out.push_str(&format!("   - Statut : {}\n", str_field(po, "status")));
                    out.push_str(&format!(
                        "   - Montant : {} {}\n",
                        po["amount"],
                        str_field(po, "currency")
                    ));
                    out.push_str(&format!(
                        "   - Date de livraison : {}\n\n",
                        str_field(po, "delivery_date")
                    ));
                } else {
                    out.push_str(&format!("   - Supplier: {}\n", str_field(po, "supplier")));
                    out.push_str(&format!("   - Status: {}\n", str_field(po, "status")));
                    out.push_str(&format!(
                        "   - Amount: {} {}\n",
                        po["amount"],
                        str_field(po, "currency")
                    ));
                    out.push_str(&format!(
                        "   - Delivery Date: {}\n\n",
                        str_field(po, "delivery_date")
                    ));
                }
            }
        }
        DataDomain::Invoices => {
            if fr {
                out.push_str(&format!("**Factures ({} trouvées) :**\n\n", rows.len()));
            } else {
                out.push_str(&format!("**Invoices ({} found):**\n\n", rows.len()));
            }
            for inv in rows {
                out.push_str(&format!("**{}**\n", str_field(inv, "invoice_number")));
                if fr {
                    out.push_str(&format!("   - Commande : {}\n", str_field(inv, "po_number")));
                    out.push_str(&format!("   - Fournisseur : {}\n", str_field(inv, "supplier")));
                    out.push_str(&format!("   - Montant : {}\n", inv["amount"]));
                    out.push_str(&format!("   - Statut : {}\n\n", str_field(inv, "status")));
                } else {
                    out.push_str(&format!("   - PO: {}\n", str_field(inv, "po_number")));
                    out.push_str(&format!("   - Supplier: {}\n", str_field(inv, "supplier")));
                    out.push_str(&format!("   - Amount: {}\n", inv["amount"]));
                    out.push_str(&format!("   - Status: {}\n\n", str_field(inv, "status")));
                }
            }
        }
        DataDomain::Suppliers => {
            if fr {
                out.push_str(&format!("**Fournisseurs ({} trouvés) :**\n\n", rows.len()));
            } else {
                out.push_str(&format!("**Suppliers ({} found):**\n\n", rows.len()));
            }
            for sup in rows {
                out.push_str(&format!("**{}**\n", str_field(sup, "name")));
                if fr {
                    out.push_str(&format!("   - ID : {}\n", str_field(sup, "supplier_id")));
                    out.push_str(&format!("   - Statut : {}\n", str_field(sup, "status")));
                    out.push_str(&format!(
                        "   - Contact : {}\n\n",
                        str_field(sup, "contact_email")
                    ));
                } else {
                    out.push_str(&format!("   - ID: {}\n", str_field(sup, "supplier_id")));
                    out.push_str(&format!("   - Status: {}\n", str_field(sup, "status")));
                    out.push_str(&format!(
                        "   - Contact: {}\n\n",
                        str_field(sup, "contact_email")
                    ));
                }
            }
        }
        DataDomain::Contracts => {
            if fr {
                out.push_str(&format!("**Contrats ({} trouvés) :**\n\n", rows.len()));
            } else {
                out.push_str(&format!("**Contracts ({} found):**\n\n", rows.len()));
            }
            for contract in rows {
                out.push_str(&format!("**{}**\n", str_field(contract, "contract_id")));
                if fr {
                    out.push_str(&format!(
                        "   - Fournisseur : {}\n",
                        str_field(contract, "supplier")
                    ));
                    out.push_str(&format!("   - Statut : {}\n", str_field(contract, "status")));
                    out.push_str(&format!("   - Valeur : {} MAD\n", contract["value"]));
                    out.push_str(&format!(
                        "   - Performance : {}%\n\n",
                        contract["performance_score"]
                    ));
                } else {
                    out.push_str(&format!("   - Supplier: {}\n", str_field(contract, "supplier")));
                    out.push_str(&format!("   - Status: {}\n", str_field(contract, "status")));
                    out.push_str(&format!("   - Value: {} MAD\n", contract["value"]));
                    out.push_str(&format!(
                        "   - Performance: {}%\n\n",
                        contract["performance_score"]
                    ));
                }
            }
        }
        DataDomain::Rfqs => {
            if fr {
                out.push_str(&format!("**Appels d'Offres ({} trouvés) :**\n\n", rows.len()));
            } else {
                out.push_str(&format!("**RFQs ({} found):**\n\n", rows.len()));
            }
            for rfq in rows {
                out.push_str(&format!("**{}**\n", str_field(rfq, "rfq_number")));
                if fr {
                    out.push_str(&format!("   - Titre : {}\n", str_field(rfq, "title")));
                    out.push_str(&format!("   - Statut : {}\n", str_field(rfq, "status")));
                    out.push_str(&format!("   - Échéance : {}\n", str_field(rfq, "deadline")));
                    out.push_str(&format!("   - Réponses : {}\n\n", rfq["responses_count"]));
                } else {
                    out.push_str(&format!("   - Title: {}\n", str_field(rfq, "title")));
                    out.push_str(&format!("   - Status: {}\n", str_field(rfq, "status")));
                    out.push_str(&format!("   - Deadline: {}\n", str_field(rfq, "deadline")));
                    out.push_str(&format!("   - Responses: {}\n\n", rfq["responses_count"]));
                }
            }
        }
        DataDomain::Analytics => {
            if fr {
                out.push_str("**Tableau de Bord Analytique :**\n\n");
            } else {
                out.push_str("**Analytics Dashboard:**\n\n");
            }
            for dashboard in rows {
                if let Some(perf) = dashboard.get("supplier_performance") {
                    let top = perf["top_performers"]
                        .as_array()
                        .map(|names| {
                            names
                                .iter()
                                .filter_map(|n| n.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        })
                        .unwrap_or_default();
                    if fr {
                        out.push_str("**Performance Fournisseur :**\n");
                        out.push_str(&format!(
                            "   - Score Moyen : {}%\n",
                            perf["average_score"]
                        ));
                        out.push_str(&format!("   - Meilleurs Fournisseurs : {top}\n\n"));
                    } else {
                        out.push_str("**Supplier Performance:**\n");
                        out.push_str(&format!(
                            "   - Average Score: {}%\n",
                            perf["average_score"]
                        ));
                        out.push_str(&format!("   - Top Performers: {top}\n\n"));
                    }
                }
                if let Some(trends) = dashboard.get("payment_trends") {
                    if fr {
                        out.push_str("**Tendances de Paiement :**\n");
                        out.push_str(&format!(
                            "   - Délai Moyen de Paiement : {} jours\n",
                            trends["average_payment_time"]
                        ));
                        out.push_str(&format!(
                            "   - Pourcentage à Temps : {}%\n\n",
                            trends["on_time_percentage"]
                        ));
                    } else {
                        out.push_str("**Payment Trends:**\n");
                        out.push_str(&format!(
                            "   - Average Payment Time: {} days\n",
                            trends["average_payment_time"]
                        ));
                        out.push_str(&format!(
                            "   - On-time Percentage: {}%\n\n",
                            trends["on_time_percentage"]
                        ));
                    }
                }
            }
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
