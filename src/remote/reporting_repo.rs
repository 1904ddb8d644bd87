// src/remote/reporting_repo.rs

use reqwest::Method;
use serde_json::Value;

use crate::{
    common::error::AppError,
    models::reporting::ReportingEntry,
    remote::client::{UpstreamClient, UpstreamFile},
};

// Auditoria e exportações geradas pelo backend
#[derive(Clone)]
pub struct ReportingRepository {
    client: UpstreamClient,
}

impl ReportingRepository {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub async fn record(&self, entry: &ReportingEntry, token: Option<&str>) -> Result<(), AppError> {
        let _: Value = self
            .client
            .send_json(Method::POST, "/api/reporting", &[], Some(entry), token)
            .await?;
        Ok(())
    }

    pub async fn orders_excel(&self, token: Option<&str>) -> Result<UpstreamFile, AppError> {
        self.client.get_file("/api/admin/comandefour1/excel", token).await
    }
}
