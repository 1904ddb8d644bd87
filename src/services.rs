pub mod aggregation;
pub mod dashboard_service;
pub mod document_service;
pub mod inventory_service;
pub mod report_builder;
pub mod report_service;
pub mod request_service;
pub mod user_service;

use crate::{
    common::error::OperationWarning,
    models::reporting::{ReportType, ReportingEntry},
    remote::ReportingRepository,
};

/// Resultado de uma mutação: o dado principal e os efeitos secundários que falharam.
#[derive(Debug)]
pub struct Outcome<T> {
    pub data: T,
    pub warnings: Vec<OperationWarning>,
}

impl<T> Outcome<T> {
    pub fn new(data: T) -> Self {
        Self { data, warnings: Vec::new() }
    }

    pub fn warn(&mut self, warning: OperationWarning) {
        if !self.warnings.contains(&warning) {
            self.warnings.push(warning);
        }
    }
}

// Registro de auditoria; nunca falha a ação que o originou.
pub(crate) async fn record_entry(
    reporting: &ReportingRepository,
    kind: ReportType,
    token: Option<&str>,
    user_id: Option<&str>,
) -> Option<OperationWarning> {
    let entry = ReportingEntry::new(kind, user_id);
    match reporting.record(&entry, token).await {
        Ok(()) => None,
        Err(e) => {
            tracing::warn!("Registro {:?} não gravado: {}", kind, e);
            Some(OperationWarning::ReportingEntryNotRecorded)
        }
    }
}
