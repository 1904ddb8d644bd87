// src/remote/dashboard_repo.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::dashboard::{
        CategoryStock, CategoryUsage, DashboardProduct, DashboardStats, MonthlyOrders,
        MonthlyRequests, ProductMonthStats, ProductOrderLine, RequesterRecord, StockMovementRow,
        SupplierOrders,
    },
    remote::client::UpstreamClient,
};

// `timeRange` opcional (ex: "7d"); sem ele o backend usa o ano corrente.
fn range_query(range: Option<&str>) -> Vec<(&'static str, String)> {
    range.map(|r| vec![("timeRange", r.to_string())]).unwrap_or_default()
}

fn product_query(product_id: Uuid, range: Option<&str>) -> Vec<(&'static str, String)> {
    let mut query = vec![("productId", product_id.to_string())];
    query.extend(range_query(range));
    query
}

#[derive(Clone)]
pub struct DashboardRepository {
    client: UpstreamClient,
}

impl DashboardRepository {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    pub async fn stats(&self, range: Option<&str>, token: Option<&str>) -> Result<DashboardStats, AppError> {
        self.client.get_json("/api/dashboard/stats", &range_query(range), token).await
    }

    pub async fn stock(&self, range: Option<&str>, token: Option<&str>) -> Result<Vec<CategoryStock>, AppError> {
        self.client.get_json("/api/dashboard/stock", &range_query(range), token).await
    }

    pub async fn usage(&self, range: Option<&str>, token: Option<&str>) -> Result<Vec<CategoryUsage>, AppError> {
        self.client.get_json("/api/dashboard/usage", &range_query(range), token).await
    }

    pub async fn orders_by_month(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<MonthlyOrders>, AppError> {
        self.client.get_json("/api/dashboard/commandespar-mois", &range_query(range), token).await
    }

    pub async fn requests_by_month(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<MonthlyRequests>, AppError> {
        self.client.get_json("/api/dashboard/demandes-par-mois", &range_query(range), token).await
    }

    pub async fn orders_by_supplier(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<SupplierOrders>, AppError> {
        self.client
            .get_json("/api/dashboard/commandes-par-fournisseur", &range_query(range), token)
            .await
    }

    pub async fn product_lines(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<ProductOrderLine>, AppError> {
        self.client.get_json("/api/dashboard/commandes-par-produit", &range_query(range), token).await
    }

    pub async fn products(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<DashboardProduct>, AppError> {
        self.client.get_json("/api/dashboard/liste-product", &range_query(range), token).await
    }

    pub async fn requesters(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<RequesterRecord>, AppError> {
        self.client.get_json("/api/dashboard/demandes-par-demandeur", &range_query(range), token).await
    }

    /// Segunda fonte, usada quando a primeira volta vazia ou inutilizável.
    pub async fn requesters_fallback(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<RequesterRecord>, AppError> {
        self.client
            .get_json("/api/admin/dashboard/demandes-par-demandeur", &range_query(range), token)
            .await
    }

    pub async fn product_month_stats(
        &self,
        product_id: Uuid,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<ProductMonthStats>, AppError> {
        self.client
            .get_json(
                "/api/admin/dashboard/commandes-par-produit-mois",
                &product_query(product_id, range),
                token,
            )
            .await
    }

    /// Mesma consulta, sem passar pelo cache (usada para completar relatórios).
    pub async fn product_month_stats_fresh(
        &self,
        product_id: Uuid,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<ProductMonthStats>, AppError> {
        self.client
            .get_json_fresh(
                "/api/admin/dashboard/commandes-par-produit-mois",
                &product_query(product_id, range),
                token,
            )
            .await
    }

    pub async fn product_stock_flow(
        &self,
        product_id: Uuid,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<ProductMonthStats>, AppError> {
        self.client
            .get_json(
                "/api/admin/dashboard/qte-prod-entre-sort",
                &product_query(product_id, range),
                token,
            )
            .await
    }

    pub async fn stock_movement(
        &self,
        range: Option<&str>,
        token: Option<&str>,
    ) -> Result<Vec<StockMovementRow>, AppError> {
        self.client.get_json("/api/admin/dashboard/stock-mouvement", &range_query(range), token).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::client::tests::client_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn product_stats_send_product_and_range() {
        let server = MockServer::start().await;
        let product_id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/api/admin/dashboard/commandes-par-produit-mois"))
            .and(query_param("productId", product_id.to_string()))
            .and(query_param("timeRange", "7d"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "month": "March", "approved": 2, "delivered": 1 }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let repo = DashboardRepository::new(client_for(&server));
        let stats = repo.product_month_stats(product_id, Some("7d"), None).await.unwrap();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].approved, 2);
        assert_eq!(stats[0].quantity_entree, 0);
    }

    #[tokio::test]
    async fn requesters_keep_open_keys() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/dashboard/demandes-par-demandeur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "month": "January", "Alice": 2, "Bob": 1 }
            ])))
            .mount(&server)
            .await;

        let repo = DashboardRepository::new(client_for(&server));
        let records = repo.requesters(None, None).await.unwrap();
        assert_eq!(records[0]["Alice"], 2);
    }
}
