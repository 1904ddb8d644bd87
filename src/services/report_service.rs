// src/services/report_service.rs

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    common::error::{AppError, OperationWarning},
    models::reporting::ReportingEntry,
    remote::ReportingRepository,
    services::{
        aggregation,
        dashboard_service::DashboardService,
        document_service::DocumentService,
        report_builder::{self, ReportData, ReportWindow},
    },
};

#[derive(Debug)]
pub struct GeneratedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub warnings: Vec<OperationWarning>,
}

#[derive(Clone)]
pub struct ReportService {
    dashboard: DashboardService,
    reporting: ReportingRepository,
    documents: DocumentService,
}

// Coleta os avisos sem repetir o mesmo tipo.
#[derive(Debug, Default)]
struct Warnings(Vec<OperationWarning>);

impl Warnings {
    fn push(&mut self, warning: OperationWarning) {
        if !self.0.contains(&warning) {
            self.0.push(warning);
        }
    }

    // Seção que falhou sai vazia (com placeholder) e vira aviso.
    fn degrade<T: Default>(&mut self, section: &str, result: Result<T, AppError>) -> T {
        result.unwrap_or_else(|e| {
            tracing::warn!("Seção \"{}\" do relatório degradada: {}", section, e);
            self.push(OperationWarning::ReportSectionDegraded);
            T::default()
        })
    }
}

impl ReportService {
    pub fn new(
        dashboard: DashboardService,
        reporting: ReportingRepository,
        documents: DocumentService,
    ) -> Self {
        Self { dashboard, reporting, documents }
    }

    pub async fn generate(
        &self,
        window: ReportWindow,
        today: NaiveDate,
        token: Option<&str>,
        user_id: Option<&str>,
    ) -> Result<GeneratedReport, AppError> {
        let mut warnings = Warnings::default();

        // 1. Registro de auditoria antes de tudo; falha não impede o relatório
        let entry = ReportingEntry::new(window.reporting_type(), user_id);
        if let Err(e) = self.reporting.record(&entry, token).await {
            tracing::warn!("Registro do relatório não gravado: {}", e);
            warnings.push(OperationWarning::ReportingEntryNotRecorded);
        }

        // 2. Dados
        let data = self.collect(window, token, &mut warnings).await?;

        // 3. Documento e PDF
        let document = report_builder::build_report(window, today, &data);
        let bytes = self.documents.render(&document)?;

        tracing::info!(
            "Relatório {:?} gerado: {} produto(s), {} aviso(s)",
            window,
            data.products.len(),
            warnings.0.len()
        );

        Ok(GeneratedReport {
            filename: window.filename(today),
            bytes,
            warnings: warnings.0,
        })
    }

    async fn collect(
        &self,
        window: ReportWindow,
        token: Option<&str>,
        warnings: &mut Warnings,
    ) -> Result<ReportData, AppError> {
        let range = window.time_range();
        let repo = self.dashboard.repo();

        let (stats, products, stock, suppliers, orders, requests, requesters, movement) = tokio::join!(
            repo.stats(range, token),
            repo.products(range, token),
            repo.stock(range, token),
            repo.orders_by_supplier(range, token),
            repo.orders_by_month(range, token),
            repo.requests_by_month(range, token),
            repo.requesters(range, token),
            repo.stock_movement(range, token),
        );

        // Sem contadores ou sem produtos não há relatório
        let stats = stats.map_err(|e| {
            tracing::error!("Estatísticas gerais indisponíveis: {}", e);
            AppError::NoReportData
        })?;
        let products = match products {
            Ok(products) if !products.is_empty() => products,
            Ok(_) => {
                tracing::error!("Lista de produtos vazia");
                return Err(AppError::NoReportData);
            }
            Err(e) => {
                tracing::error!("Lista de produtos indisponível: {}", e);
                return Err(AppError::NoReportData);
            }
        };

        let stock = warnings.degrade("Analyse des Stocks", stock);
        let orders_by_supplier = warnings.degrade("Commandes par Fournisseur", suppliers);
        let orders = warnings.degrade("Commandes et Demandes", orders);
        let requests = warnings.degrade("Commandes et Demandes", requests);
        let stock_movement = warnings.degrade("Mouvement de Stock", movement);

        let requesters = requesters.unwrap_or_else(|e| {
            tracing::warn!("Fonte principal de demandantes falhou: {}", e);
            Vec::new()
        });
        let (requesters, requester_warning) =
            self.dashboard.resolve_requesters(requesters, range, token).await;
        if let Some(w) = requester_warning {
            warnings.push(w);
        }

        // Estatísticas por produto, com uma segunda tentativa para as faltantes
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let range_owned = range.map(str::to_string);
        let token_owned = token.map(str::to_string);
        let mut batch = self
            .dashboard
            .product_stats_for(ids.clone(), range_owned.clone(), token_owned.clone())
            .await;

        let missing: Vec<Uuid> = ids
            .into_iter()
            .filter(|id| batch.stats.get(id).is_none_or(Vec::is_empty))
            .collect();
        if !missing.is_empty() {
            tracing::info!("Buscando novamente estatísticas de {} produto(s)", missing.len());
            let retry = self
                .dashboard
                .refresh_product_stats(missing.clone(), range_owned, token_owned)
                .await;
            for (id, stats) in retry.stats {
                if !stats.is_empty() {
                    batch.stats.insert(id, stats);
                }
            }
            if !retry.failed.is_empty() {
                warnings.push(OperationWarning::ReportSectionDegraded);
            }
        }

        Ok(ReportData {
            stats,
            stock,
            orders_by_supplier,
            products,
            product_stats: batch.stats,
            orders_and_requests: aggregation::merge_month_series(&orders, &requests),
            requesters,
            stock_movement,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{client::tests::client_for, DashboardRepository};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_json(server: &MockServer, route: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_status(server: &MockServer, verb: &str, route: &str, status: u16) {
        Mock::given(method(verb))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status))
            .mount(server)
            .await;
    }

    fn service(server: &MockServer) -> ReportService {
        let client = client_for(server);
        ReportService::new(
            DashboardService::new(DashboardRepository::new(client.clone()), 4),
            ReportingRepository::new(client),
            DocumentService::new("/nonexistent/fonts", "Roboto", None),
        )
    }

    async fn mount_minimal(server: &MockServer, product: Uuid) {
        mount_json(server, "/api/dashboard/stats", json!({ "ordersCount": 10 })).await;
        mount_json(server, "/api/dashboard/liste-product", json!([{ "id": product, "nom": "Ramette" }])).await;
        mount_json(server, "/api/dashboard/stock", json!([{ "category": "A", "stock": 40 }])).await;
        mount_json(server, "/api/dashboard/commandespar-mois", json!([{ "month": "jan", "commandes": 2 }])).await;
        mount_json(server, "/api/dashboard/demandes-par-mois", json!([])).await;
        mount_json(server, "/api/dashboard/demandes-par-demandeur", json!([{ "Demandeur": "Alice", "Nombre": 1 }])).await;
        mount_json(server, "/api/admin/dashboard/stock-mouvement", json!([])).await;
    }

    #[tokio::test]
    async fn missing_stats_abort_the_report() {
        let server = MockServer::start().await;
        mount_status(&server, "GET", "/api/dashboard/stats", 500).await;
        mount_json(&server, "/api/dashboard/liste-product", json!([])).await;

        let mut warnings = Warnings::default();
        let err = service(&server)
            .collect(ReportWindow::Annual, None, &mut warnings)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoReportData));
    }

    #[tokio::test]
    async fn empty_product_list_aborts_the_report() {
        let server = MockServer::start().await;
        mount_json(&server, "/api/dashboard/stats", json!({ "ordersCount": 1 })).await;
        mount_json(&server, "/api/dashboard/liste-product", json!([])).await;

        let mut warnings = Warnings::default();
        let err = service(&server)
            .collect(ReportWindow::Weekly, None, &mut warnings)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NoReportData));
    }

    #[tokio::test]
    async fn failing_section_degrades_with_warning() {
        let server = MockServer::start().await;
        let product = Uuid::new_v4();
        mount_minimal(&server, product).await;
        mount_status(&server, "GET", "/api/dashboard/commandes-par-fournisseur", 503).await;
        mount_json(
            &server,
            "/api/admin/dashboard/commandes-par-produit-mois",
            json!([{ "month": "May", "approved": 1 }]),
        )
        .await;

        let mut warnings = Warnings::default();
        let data = service(&server)
            .collect(ReportWindow::Annual, None, &mut warnings)
            .await
            .unwrap();

        assert!(data.orders_by_supplier.is_empty());
        assert_eq!(data.stats.orders_count, 10);
        assert_eq!(data.orders_and_requests[0].month, "January");
        assert_eq!(data.product_stats[&product].len(), 1);
        assert_eq!(warnings.0, vec![OperationWarning::ReportSectionDegraded]);
    }

    #[tokio::test]
    async fn empty_product_stats_are_fetched_again() {
        let server = MockServer::start().await;
        let product = Uuid::new_v4();
        mount_minimal(&server, product).await;
        mount_json(&server, "/api/dashboard/commandes-par-fournisseur", json!([])).await;
        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/commandes-par-produit-mois"))
            .and(query_param("productId", product.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        mount_json(
            &server,
            "/api/admin/dashboard/commandes-par-produit-mois",
            json!([{ "month": "Mar", "approved": 4, "delivered": 1 }]),
        )
        .await;

        let mut warnings = Warnings::default();
        let data = service(&server)
            .collect(ReportWindow::Weekly, None, &mut warnings)
            .await
            .unwrap();

        assert_eq!(data.product_stats[&product][0].approved, 4);
        assert!(warnings.0.is_empty());
    }

    #[tokio::test]
    async fn reporting_failure_is_only_a_warning() {
        let server = MockServer::start().await;
        let product = Uuid::new_v4();
        mount_minimal(&server, product).await;
        mount_json(&server, "/api/dashboard/commandes-par-fournisseur", json!([])).await;
        mount_json(&server, "/api/admin/dashboard/commandes-par-produit-mois", json!([])).await;
        mount_status(&server, "POST", "/api/reporting", 500).await;

        // Sem fontes a renderização falha depois da coleta
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let err = service(&server)
            .generate(ReportWindow::Annual, today, None, Some("user_1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::FontNotFound(_)));

        let requests = server.received_requests().await.unwrap();
        assert!(requests.iter().any(|r| r.url.path() == "/api/reporting"));
    }

    #[test]
    fn warnings_are_not_repeated() {
        let mut warnings = Warnings::default();
        let _: Vec<u8> = warnings.degrade("a", Err(AppError::NoReportData));
        let _: Vec<u8> = warnings.degrade("b", Err(AppError::NoReportData));
        assert_eq!(warnings.0.len(), 1);
    }
}
