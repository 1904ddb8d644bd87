// src/services/inventory_service.rs

use uuid::Uuid;

use crate::{
    common::error::{AppError, OperationWarning},
    middleware::auth::Caller,
    models::{
        inventory::{Category, CategoryPayload, Product, ProductPayload, StockAlert, Supplier, SupplierPayload},
        reporting::ReportType,
    },
    remote::{InventoryRepository, ReportingRepository},
    services::{record_entry, Outcome},
};

#[derive(Clone)]
pub struct InventoryService {
    repo: InventoryRepository,
    reporting: ReportingRepository,
}

impl InventoryService {
    pub fn new(repo: InventoryRepository, reporting: ReportingRepository) -> Self {
        Self { repo, reporting }
    }

    // --- PRODUTOS ---

    /// Lista com o status sempre recalculado a partir das quantidades.
    pub async fn list_products(&self, caller: &Caller) -> Result<Vec<Product>, AppError> {
        let products = self.repo.list_products(caller.token()).await?;
        Ok(products.into_iter().map(Product::with_computed_status).collect())
    }

    pub async fn list_categories(&self, caller: &Caller) -> Result<Vec<Category>, AppError> {
        self.repo.list_categories(caller.token()).await
    }

    pub async fn create_category(
        &self,
        caller: &Caller,
        payload: &CategoryPayload,
    ) -> Result<Outcome<Category>, AppError> {
        let category = self.repo.create_category(&payload.to_write(), caller.token()).await?;
        tracing::info!("Categoria criada: {} ({})", category.name, category.id);
        Ok(Outcome::new(category))
    }

    pub async fn create_product(
        &self,
        caller: &Caller,
        payload: &ProductPayload,
    ) -> Result<Outcome<Product>, AppError> {
        let write = payload.to_write();

        // Nome + marca não podem se repetir
        let existing = self.repo.list_products(caller.token()).await?;
        if existing.iter().any(|p| p.same_identity(&write.name, Some(&write.brand))) {
            return Err(AppError::DuplicateProduct);
        }

        let product = self
            .repo
            .create_product(&write, caller.token())
            .await?
            .with_computed_status();
        tracing::info!("Produto criado: {} ({})", product.name, product.id);

        let mut outcome = Outcome::new(product);
        self.after_product_write(caller, ReportType::ProduitAjoute, &mut outcome).await;
        Ok(outcome)
    }

    pub async fn update_product(
        &self,
        caller: &Caller,
        id: Uuid,
        payload: &ProductPayload,
    ) -> Result<Outcome<Product>, AppError> {
        let write = payload.to_write();

        let existing = self.repo.list_products(caller.token()).await?;
        if !existing.iter().any(|p| p.id == id) {
            return Err(AppError::ProductNotFound);
        }
        if existing
            .iter()
            .any(|p| p.id != id && p.same_identity(&write.name, Some(&write.brand)))
        {
            return Err(AppError::DuplicateProduct);
        }

        let product = self
            .repo
            .update_product(id, &write, caller.token())
            .await?
            .with_computed_status();
        tracing::info!("Produto atualizado: {} ({})", product.name, product.id);

        let mut outcome = Outcome::new(product);
        self.after_product_write(caller, ReportType::ProduitModifie, &mut outcome).await;
        Ok(outcome)
    }

    /// Produto ligado a pedido entregue ou demanda aprovada não pode ser apagado.
    pub async fn delete_product(&self, caller: &Caller, id: Uuid) -> Result<Outcome<Uuid>, AppError> {
        let (product, associations) = tokio::try_join!(
            self.repo.find_product(id, caller.token()),
            self.repo.product_associations(caller.token()),
        )?;

        if associations.contains(&product.id) {
            tracing::debug!("Produto {} possui vínculos, exclusão recusada", id);
            return Err(AppError::ProductHasDependencies);
        }

        self.repo.delete_product(id, caller.token()).await?;
        tracing::info!("Produto removido: {} ({})", product.name, id);

        let mut outcome = Outcome::new(id);
        if let Some(w) =
            record_entry(&self.reporting, ReportType::ProduitSupprime, caller.token(), caller.user_id.as_deref())
                .await
        {
            outcome.warn(w);
        }
        Ok(outcome)
    }

    // Auditoria e alerta de estoque: falhas viram avisos.
    async fn after_product_write(&self, caller: &Caller, kind: ReportType, outcome: &mut Outcome<Product>) {
        if let Some(w) =
            record_entry(&self.reporting, kind, caller.token(), caller.user_id.as_deref()).await
        {
            outcome.warn(w);
        }

        if let Some(alert) = StockAlert::for_product(&outcome.data) {
            if let Err(e) = self.repo.send_stock_alert(&alert, caller.token()).await {
                tracing::warn!("Alerta de estoque não enviado para {}: {}", outcome.data.id, e);
                outcome.warn(OperationWarning::StockAlertNotSent);
            }
        }
    }

    // --- FORNECEDORES ---

    pub async fn list_suppliers(
        &self,
        caller: &Caller,
        product_ids: &[Uuid],
    ) -> Result<Vec<Supplier>, AppError> {
        self.repo.list_suppliers(product_ids, caller.token()).await
    }

    pub async fn create_supplier(
        &self,
        caller: &Caller,
        payload: &SupplierPayload,
    ) -> Result<Outcome<Supplier>, AppError> {
        let supplier = self.repo.create_supplier(&payload.to_write(), caller.token()).await?;
        tracing::info!("Fornecedor criado: {} ({})", supplier.name, supplier.id);
        Ok(Outcome::new(supplier))
    }

    pub async fn delete_supplier(&self, caller: &Caller, id: Uuid) -> Result<Outcome<Uuid>, AppError> {
        let supplier = self
            .repo
            .list_suppliers(&[], caller.token())
            .await?
            .into_iter()
            .find(|s| s.id == id)
            .ok_or(AppError::SupplierNotFound)?;

        if !supplier.can_be_deleted() {
            return Err(AppError::SupplierHasDependencies {
                orders: supplier.counts.orders,
                exceptional_requests: supplier.counts.exceptional_requests,
            });
        }

        self.repo.delete_supplier(id, caller.token()).await?;
        tracing::info!("Fornecedor removido: {} ({})", supplier.name, id);
        Ok(Outcome::new(id))
    }
}
