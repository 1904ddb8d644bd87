// src/models/reporting.rs

use serde::Serialize;

// Registro de auditoria (somente escrita)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportType {
    ProduitAjoute,
    ProduitModifie,
    ProduitSupprime,
    DemandeAcceptee,
    DemandePrise,
    #[serde(rename = "ACCEPTDEM_EXCEPT")]
    AcceptDemExcept,
    #[serde(rename = "DEMANDEEXCEPT_PRISE")]
    DemandeExceptPrise,
    ValideCommande,
    CommandeLivree,
    AnnualReport,
    WeeklyReport,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingEntry {
    #[serde(rename = "type")]
    pub kind: ReportType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ReportingEntry {
    pub fn new(kind: ReportType, user_id: Option<&str>) -> Self {
        Self { kind, user_id: user_id.map(str::to_string) }
    }
}
