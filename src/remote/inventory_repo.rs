// src/remote/inventory_repo.rs

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{Category, CategoryWrite, Product, ProductWrite, StockAlert, Supplier, SupplierWrite},
    remote::client::UpstreamClient,
};

#[derive(Clone)]
pub struct InventoryRepository {
    client: UpstreamClient,
}

impl InventoryRepository {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }

    // --- Produtos ---

    pub async fn list_products(&self, token: Option<&str>) -> Result<Vec<Product>, AppError> {
        self.client.get_json("/api/admin/produit", &[], token).await
    }

    pub async fn find_product(&self, id: Uuid, token: Option<&str>) -> Result<Product, AppError> {
        self.list_products(token)
            .await?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or(AppError::ProductNotFound)
    }

    pub async fn create_product(
        &self,
        payload: &ProductWrite,
        token: Option<&str>,
    ) -> Result<Product, AppError> {
        self.client
            .send_json(Method::POST, "/api/admin/produit", &[], Some(payload), token)
            .await
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        payload: &ProductWrite,
        token: Option<&str>,
    ) -> Result<Product, AppError> {
        self.client
            .send_json(Method::PUT, "/api/admin/produit", &[("id", id.to_string())], Some(payload), token)
            .await
    }

    pub async fn delete_product(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        let _: Value = self
            .client
            .send_json::<Value, _>(Method::DELETE, "/api/admin/produit", &[("id", id.to_string())], None, token)
            .await?;
        Ok(())
    }

    /// Ids de produtos com pedido entregue ou demanda aprovada.
    pub async fn product_associations(&self, token: Option<&str>) -> Result<Vec<Uuid>, AppError> {
        self.client.get_json("/api/admin/produits/associations", &[], token).await
    }

    pub async fn list_categories(&self, token: Option<&str>) -> Result<Vec<Category>, AppError> {
        self.client.get_json("/api/admin/categorie", &[], token).await
    }

    pub async fn create_category(
        &self,
        payload: &CategoryWrite,
        token: Option<&str>,
    ) -> Result<Category, AppError> {
        self.client
            .send_json(Method::POST, "/api/admin/categorie", &[], Some(payload), token)
            .await
    }

    // --- Fornecedores ---

    /// Com `product_ids`, só os fornecedores que vendem algum desses produtos.
    pub async fn list_suppliers(
        &self,
        product_ids: &[Uuid],
        token: Option<&str>,
    ) -> Result<Vec<Supplier>, AppError> {
        let query = if product_ids.is_empty() {
            vec![]
        } else {
            let ids: Vec<String> = product_ids.iter().map(Uuid::to_string).collect();
            vec![("produitIds", ids.join(","))]
        };
        self.client.get_json("/api/admin/fournisseur", &query, token).await
    }

    pub async fn create_supplier(
        &self,
        payload: &SupplierWrite,
        token: Option<&str>,
    ) -> Result<Supplier, AppError> {
        self.client
            .send_json(Method::POST, "/api/admin/fournisseur", &[], Some(payload), token)
            .await
    }

    pub async fn delete_supplier(&self, id: Uuid, token: Option<&str>) -> Result<(), AppError> {
        let _: Value = self
            .client
            .send_json::<Value, _>(Method::DELETE, "/api/admin/fournisseur", &[("id", id.to_string())], None, token)
            .await?;
        Ok(())
    }

    // --- Alerta de estoque (o backend envia o e-mail) ---

    pub async fn send_stock_alert(&self, alert: &StockAlert, token: Option<&str>) -> Result<(), AppError> {
        let _: Value = self
            .client
            .send_json(Method::POST, "/api/emails/admin/alert", &[], Some(alert), token)
            .await?;
        Ok(())
    }
}
