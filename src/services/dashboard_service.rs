// src/services/dashboard_service.rs

use std::collections::HashMap;
use std::sync::Arc;

use tokio::{sync::Semaphore, task::JoinSet};
use uuid::Uuid;

use crate::{
    common::error::{AppError, OperationWarning},
    models::dashboard::{
        CategoryUsageSummary, DashboardOverview, MonthlyOrdersAndRequests, ProductMonthStats,
        ProductMonthlyView, RequesterBreakdown, RequesterRecord, StockShare,
    },
    remote::DashboardRepository,
    services::aggregation,
};

// Resultado da busca por produto: falhas não derrubam o lote.
#[derive(Debug, Default)]
pub struct ProductStatsBatch {
    pub stats: HashMap<Uuid, Vec<ProductMonthStats>>,
    pub failed: Vec<Uuid>,
}

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
    // Limita as chamadas simultâneas por produto
    semaphore: Arc<Semaphore>,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository, concurrency: usize) -> Self {
        Self {
            repo,
            semaphore: Arc::new(Semaphore::new(concurrency.max(1))),
        }
    }

    pub fn repo(&self) -> &DashboardRepository {
        &self.repo
    }

    /// Painel completo. Qualquer falha de busca derruba a tela inteira.
    pub async fn overview(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<DashboardOverview, AppError> {
        let (stats, stock, usage, orders, requests, suppliers, lines, products, requesters) = tokio::try_join!(
            self.repo.stats(range, token),
            self.repo.stock(range, token),
            self.repo.usage(range, token),
            self.repo.orders_by_month(range, token),
            self.repo.requests_by_month(range, token),
            self.repo.orders_by_supplier(range, token),
            self.repo.product_lines(range, token),
            self.repo.products(range, token),
            self.repo.requesters(range, token),
        )?;

        let (requesters, _) = self.resolve_requesters(requesters, range, token).await;
        let orders_and_requests = aggregation::merge_month_series(&orders, &requests);
        let usage_by_category = aggregation::aggregate_category_usage(&lines, &products, &stock);
        let orders_by_month = orders
            .into_iter()
            .map(|mut m| {
                m.month = aggregation::normalize_month_name(&m.month);
                m
            })
            .collect();

        Ok(DashboardOverview {
            stats,
            stock: aggregation::stock_shares(&stock),
            usage,
            orders_by_month,
            orders_and_requests,
            orders_by_supplier: suppliers,
            product_lines: lines,
            products,
            usage_by_category,
            requesters: aggregation::aggregate_requesters(&requesters),
        })
    }

    pub async fn orders_and_requests(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<MonthlyOrdersAndRequests>, AppError> {
        let (orders, requests) = tokio::try_join!(
            self.repo.orders_by_month(range, token),
            self.repo.requests_by_month(range, token),
        )?;
        Ok(aggregation::merge_month_series(&orders, &requests))
    }

    pub async fn usage_by_category(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<CategoryUsageSummary, AppError> {
        let (lines, products, stock) = tokio::try_join!(
            self.repo.product_lines(range, token),
            self.repo.products(range, token),
            self.repo.stock(range, token),
        )?;
        let summary = aggregation::aggregate_category_usage(&lines, &products, &stock);
        if summary.unclassified > 0 {
            tracing::warn!("{} linha(s) com status não classificado", summary.unclassified);
        }
        Ok(summary)
    }

    pub async fn stock_shares(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<StockShare>, AppError> {
        let stock = self.repo.stock(range, token).await?;
        Ok(aggregation::stock_shares(&stock))
    }

    pub async fn requesters(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<RequesterBreakdown, AppError> {
        let primary = self.repo.requesters(range, token).await?;
        let (records, _) = self.resolve_requesters(primary, range, token).await;
        Ok(aggregation::aggregate_requesters(&records))
    }

    /// Dados vazios ou só com registros vazios: tenta a segunda fonte uma vez.
    pub async fn resolve_requesters(
        &self,
        primary: Vec<RequesterRecord>,
        range: Option<&str>,
        token: Option<&str>,
    ) -> (Vec<RequesterRecord>, Option<OperationWarning>) {
        if aggregation::requester_data_is_usable(&primary) {
            return (primary, None);
        }

        tracing::info!("Demandas por demandante vazias, buscando na fonte alternativa");
        match self.repo.requesters_fallback(range, token).await {
            Ok(fallback) if aggregation::requester_data_is_usable(&fallback) => (fallback, None),
            Ok(_) => (primary, None),
            Err(e) => {
                tracing::warn!("Fonte alternativa de demandantes falhou: {}", e);
                (primary, Some(OperationWarning::RequesterDataUnavailable))
            }
        }
    }

    pub async fn product_monthly(
        &self,
        product_id: Uuid,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<ProductMonthlyView, AppError> {
        let (months, stock_flow) = tokio::try_join!(
            self.repo.product_month_stats(product_id, range, token),
            self.repo.product_stock_flow(product_id, range, token),
        )?;

        Ok(ProductMonthlyView {
            product_id,
            months: aggregation::complete_fiscal_months(&months),
            stock_flow,
        })
    }

    /// Estatísticas mensais de vários produtos, no máximo N chamadas ao mesmo tempo.
    pub async fn product_stats_for(
        &self,
        product_ids: Vec<Uuid>,
        range: Option<String>,
        token: Option<String>,
    ) -> ProductStatsBatch {
        self.fetch_product_stats(product_ids, range, token, false).await
    }

    /// Como `product_stats_for`, mas sem aproveitar respostas em cache.
    pub async fn refresh_product_stats(
        &self,
        product_ids: Vec<Uuid>,
        range: Option<String>,
        token: Option<String>,
    ) -> ProductStatsBatch {
        self.fetch_product_stats(product_ids, range, token, true).await
    }

    async fn fetch_product_stats(
        &self,
        product_ids: Vec<Uuid>,
        range: Option<String>,
        token: Option<String>,
        fresh: bool,
    ) -> ProductStatsBatch {
        let mut tasks = JoinSet::new();

        for id in product_ids {
            let repo = self.repo.clone();
            let semaphore = Arc::clone(&self.semaphore);
            let range = range.clone();
            let token = token.clone();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await;
                let result = if fresh {
                    repo.product_month_stats_fresh(id, range.as_deref(), token.as_deref()).await
                } else {
                    repo.product_month_stats(id, range.as_deref(), token.as_deref()).await
                };
                (id, result)
            });
        }

        let mut batch = ProductStatsBatch::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((id, Ok(stats))) => {
                    batch.stats.insert(id, stats);
                }
                Ok((id, Err(e))) => {
                    tracing::warn!("Estatísticas do produto {} indisponíveis: {}", id, e);
                    batch.failed.push(id);
                }
                Err(e) => tracing::error!("Tarefa de estatísticas abortada: {}", e),
            }
        }
        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::client::tests::client_for;
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

    fn service(server: &MockServer) -> DashboardService {
        DashboardService::new(DashboardRepository::new(client_for(server)), 2)
    }

    #[tokio::test]
    async fn orders_and_requests_are_merged() {
        let server = MockServer::start().await;
        mount_json(&server, "/api/dashboard/commandespar-mois", json!([{ "month": "Jan", "commandes": 5 }])).await;
        mount_json(&server, "/api/dashboard/demandes-par-mois", json!([{ "month": "February", "demandes": 2 }])).await;

        let merged = service(&server).orders_and_requests(None, None).await.unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].month, "January");
        assert_eq!(merged[1].demandes, 2);
    }

    #[tokio::test]
    async fn strict_screen_fails_when_one_fetch_fails() {
        let server = MockServer::start().await;
        mount_json(&server, "/api/dashboard/commandespar-mois", json!([])).await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/demandes-par-mois"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = service(&server).orders_and_requests(None, None).await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamStatus { status: 500, .. }));
    }

    #[tokio::test]
    async fn requesters_use_fallback_when_primary_is_empty() {
        let server = MockServer::start().await;
        mount_json(&server, "/api/dashboard/demandes-par-demandeur", json!([])).await;
        mount_json(
            &server,
            "/api/admin/dashboard/demandes-par-demandeur",
            json!([{ "Demandeur": "Alice", "Nombre": 3 }]),
        )
        .await;

        let breakdown = service(&server).requesters(None, None).await.unwrap();
        assert_eq!(breakdown.totals.len(), 1);
        assert_eq!(breakdown.totals[0].total, 3);
    }

    #[tokio::test]
    async fn failed_fallback_is_a_warning() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/demandes-par-demandeur"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let (records, warning) = service(&server).resolve_requesters(vec![], None, None).await;
        assert!(records.is_empty());
        assert_eq!(warning, Some(OperationWarning::RequesterDataUnavailable));
    }

    #[tokio::test]
    async fn product_monthly_is_completed_to_twelve_months() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_json(
            &server,
            "/api/admin/dashboard/commandes-par-produit-mois",
            json!([{ "month": "apr", "approved": 1, "delivered": 2 }]),
        )
        .await;
        mount_json(
            &server,
            "/api/admin/dashboard/qte-prod-entre-sort",
            json!([{ "month": "April", "approved": 1, "delivered": 2 }]),
        )
        .await;

        let view = service(&server).product_monthly(id, None, None).await.unwrap();
        assert_eq!(view.months.len(), 12);
        assert_eq!(view.months[3].month, "April");
        assert_eq!(view.months[3].delivered, 2);
        assert_eq!(view.stock_flow.len(), 1);
    }

    #[tokio::test]
    async fn product_batch_collects_failures_without_aborting() {
        let server = MockServer::start().await;
        let ok_ids: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        let broken = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/commandes-par-produit-mois"))
            .and(query_param("productId", broken.to_string()))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        mount_json(
            &server,
            "/api/admin/dashboard/commandes-par-produit-mois",
            json!([{ "month": "May", "approved": 1 }]),
        )
        .await;

        let mut ids = ok_ids.clone();
        ids.push(broken);
        let batch = service(&server).product_stats_for(ids, None, None).await;

        assert_eq!(batch.failed, vec![broken]);
        assert_eq!(batch.stats.len(), 5);
        assert!(ok_ids.iter().all(|id| batch.stats[id].len() == 1));
    }
}
