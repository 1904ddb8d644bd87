// src/services/request_service.rs

use std::collections::{hash_map::Entry, HashMap};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    common::error::{AppError, OperationWarning},
    middleware::auth::Caller,
    models::{
        inventory::{Product, StockAlert},
        operations::{
            ExceptionalRejectBody, ExceptionalRequest, ExceptionalStatus, NewExceptionalPayload,
            NewOrderPayload, NewRequestPayload, Order, OrderStatus, OrderStatusBody, Request,
            RequestDecision, RequestStatus, RequestStatusPatch,
        },
        reporting::ReportType,
    },
    remote::{InventoryRepository, OperationsRepository, ReportingRepository},
    services::{record_entry, Outcome},
};

// Motivo só vale depois de aparado; vazio é o mesmo que ausente.
fn required_reason(reason: Option<&str>, missing: AppError) -> Result<String, AppError> {
    reason
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
        .ok_or(missing)
}

/// Aplica as retiradas sobre o catálogo e devolve os produtos tocados, já
/// com a quantidade que sobraria. Linhas repetidas do mesmo produto somam.
fn withdraw(
    catalogue: &[Product],
    lines: impl IntoIterator<Item = (Uuid, u32)>,
) -> Result<Vec<Product>, AppError> {
    let mut touched: HashMap<Uuid, Product> = HashMap::new();
    let mut order = Vec::new();
    for (product_id, quantity) in lines {
        let product = match touched.entry(product_id) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let found = catalogue
                    .iter()
                    .find(|p| p.id == product_id)
                    .ok_or(AppError::ProductNotFound)?;
                order.push(product_id);
                e.insert(found.clone())
            }
        };
        if product.quantity < quantity {
            return Err(AppError::InsufficientStock {
                product: product.name.clone(),
                available: product.quantity,
                requested: quantity,
            });
        }
        product.quantity -= quantity;
    }
    Ok(order.into_iter().filter_map(|id| touched.remove(&id)).collect())
}

#[derive(Clone)]
pub struct RequestService {
    repo: OperationsRepository,
    inventory: InventoryRepository,
    reporting: ReportingRepository,
}

impl RequestService {
    pub fn new(
        repo: OperationsRepository,
        inventory: InventoryRepository,
        reporting: ReportingRepository,
    ) -> Self {
        Self { repo, inventory, reporting }
    }

    async fn record(&self, caller: &Caller, kind: ReportType) -> Option<OperationWarning> {
        record_entry(&self.reporting, kind, caller.token(), caller.user_id.as_deref()).await
    }

    // --- Demandas regulares ---

    pub async fn pending_requests(&self, caller: &Caller) -> Result<Vec<Request>, AppError> {
        self.repo.pending_requests(caller.token()).await
    }

    pub async fn approved_requests(&self, caller: &Caller) -> Result<Vec<Request>, AppError> {
        self.repo.approved_requests(caller.token()).await
    }

    /// Cada produto precisa existir e ter estoque para a quantidade pedida.
    pub async fn create_request(
        &self,
        caller: &Caller,
        payload: &NewRequestPayload,
    ) -> Result<Outcome<Request>, AppError> {
        let body = payload.to_write();
        let catalogue = self.inventory.list_products(caller.token()).await?;
        withdraw(&catalogue, body.produits.iter().map(|l| (l.produit_id, l.quantite)))?;

        let request = self.repo.create_request(&body, caller.token()).await?;
        tracing::info!("Demanda criada: {} ({} produtos)", request.id, body.produits.len());
        Ok(Outcome::new(request))
    }

    /// Retirada de uma demanda aprovada. Baixa o estoque e alerta quando
    /// algum produto fica crítico ou esgotado.
    pub async fn take_request(&self, caller: &Caller, id: Uuid) -> Result<Outcome<Request>, AppError> {
        let (mut request, catalogue) = tokio::try_join!(
            self.repo.find_request(id, caller.token()),
            self.inventory.list_products(caller.token()),
        )?;
        if request.status != RequestStatus::Approved {
            return Err(AppError::UnexpectedStatus {
                expected: RequestStatus::Approved.code(),
                actual: request.status.code(),
            });
        }
        let remaining = withdraw(&catalogue, request.lines.iter().map(|l| (l.product_id, l.quantity)))?;

        self.repo.take_request(id, caller.token()).await?;
        request.status = RequestStatus::Taken;
        tracing::info!("Demanda {} retirada", id);

        let mut outcome = Outcome::new(request);
        if let Some(w) = self.record(caller, ReportType::DemandePrise).await {
            outcome.warn(w);
        }
        if let Some(alert) = StockAlert::for_products(&remaining) {
            if let Err(e) = self.inventory.send_stock_alert(&alert, caller.token()).await {
                tracing::warn!("Alerta de estoque não enviado após a retirada {}: {}", id, e);
                outcome.warn(OperationWarning::StockAlertNotSent);
            }
        }
        Ok(outcome)
    }

    /// Aceita ou rejeita uma demanda pendente. Rejeição exige motivo.
    pub async fn decide(
        &self,
        caller: &Caller,
        id: Uuid,
        decision: RequestDecision,
        reason: Option<&str>,
    ) -> Result<Outcome<Request>, AppError> {
        // Validação antes de qualquer chamada ao backend
        let patch = match decision {
            RequestDecision::Accept => RequestStatusPatch::approve(Utc::now()),
            RequestDecision::Reject => {
                RequestStatusPatch::reject(required_reason(reason, AppError::RejectionReasonRequired)?)
            }
        };

        let current = self.repo.find_request(id, caller.token()).await?;
        if current.status != RequestStatus::Pending {
            return Err(AppError::RequestNotPending);
        }

        let updated = self.repo.patch_request(id, &patch, caller.token()).await?;
        tracing::info!("Demanda {} -> {:?}", id, patch.statut);

        let mut outcome = Outcome::new(updated);
        if decision == RequestDecision::Accept {
            if let Some(w) = self.record(caller, ReportType::DemandeAcceptee).await {
                outcome.warn(w);
            }
        }
        Ok(outcome)
    }

    // --- Demandas excepcionais ---

    pub async fn exceptional_requests(&self, caller: &Caller) -> Result<Vec<ExceptionalRequest>, AppError> {
        self.repo.exceptional_requests(caller.token()).await
    }

    /// Produto que já está no catálogo deve virar demanda regular.
    pub async fn create_exceptional(
        &self,
        caller: &Caller,
        payload: &NewExceptionalPayload,
    ) -> Result<Outcome<ExceptionalRequest>, AppError> {
        let body = payload.to_write();
        let catalogue = self.inventory.list_products(caller.token()).await?;
        let known = body.produits_exceptionnels.iter().any(|line| {
            catalogue
                .iter()
                .any(|p| p.name.trim().to_lowercase() == line.name.to_lowercase())
        });
        if known {
            return Err(AppError::ProductAlreadyInCatalogue);
        }

        let request = self.repo.create_exceptional(&body, caller.token()).await?;
        tracing::info!("Demanda excepcional criada: {}", request.id);
        Ok(Outcome::new(request))
    }

    async fn exceptional_in(
        &self,
        caller: &Caller,
        id: Uuid,
        expected: ExceptionalStatus,
    ) -> Result<ExceptionalRequest, AppError> {
        let current = self.repo.find_exceptional(id, caller.token()).await?;
        if current.status != expected {
            return Err(AppError::UnexpectedStatus {
                expected: expected.code(),
                actual: current.status.code(),
            });
        }
        Ok(current)
    }

    async fn pending_exceptional(&self, caller: &Caller, id: Uuid) -> Result<ExceptionalRequest, AppError> {
        let current = self.repo.find_exceptional(id, caller.token()).await?;
        if current.status != ExceptionalStatus::Pending {
            return Err(AppError::RequestNotPending);
        }
        Ok(current)
    }

    pub async fn accept_exceptional(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<Outcome<ExceptionalRequest>, AppError> {
        self.pending_exceptional(caller, id).await?;
        let updated = self.repo.accept_exceptional(id, caller.token()).await?;
        tracing::info!("Demanda excepcional {} aceita", id);

        let mut outcome = Outcome::new(updated);
        if let Some(w) = self.record(caller, ReportType::AcceptDemExcept).await {
            outcome.warn(w);
        }
        Ok(outcome)
    }

    pub async fn reject_exceptional(
        &self,
        caller: &Caller,
        id: Uuid,
        reason: &str,
    ) -> Result<Outcome<ExceptionalRequest>, AppError> {
        let body = ExceptionalRejectBody {
            raison_refus: required_reason(Some(reason), AppError::RejectionReasonRequired)?,
        };
        self.pending_exceptional(caller, id).await?;
        let updated = self.repo.reject_exceptional(id, &body, caller.token()).await?;
        tracing::info!("Demanda excepcional {} rejeitada", id);
        Ok(Outcome::new(updated))
    }

    /// ACCEPTEE -> COMMANDEE, feito pelo gestor.
    pub async fn order_exceptional(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<Outcome<ExceptionalRequest>, AppError> {
        self.exceptional_in(caller, id, ExceptionalStatus::Accepted).await?;
        let updated = self.repo.order_exceptional(id, caller.token()).await?;
        tracing::info!("Demanda excepcional {} encomendada", id);
        Ok(Outcome::new(updated))
    }

    /// COMMANDEE -> LIVREE, recebida pelo almoxarife.
    pub async fn deliver_exceptional(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<Outcome<ExceptionalRequest>, AppError> {
        let mut request = self.exceptional_in(caller, id, ExceptionalStatus::Ordered).await?;
        self.repo.deliver_exceptional(id, caller.token()).await?;
        request.status = ExceptionalStatus::Delivered;
        tracing::info!("Demanda excepcional {} entregue", id);
        Ok(Outcome::new(request))
    }

    /// LIVREE -> PRISE
    pub async fn take_exceptional(
        &self,
        caller: &Caller,
        id: Uuid,
    ) -> Result<Outcome<ExceptionalRequest>, AppError> {
        let mut request = self.exceptional_in(caller, id, ExceptionalStatus::Delivered).await?;
        self.repo.take_exceptional(id, caller.token()).await?;
        request.status = ExceptionalStatus::Taken;
        tracing::info!("Demanda excepcional {} retirada", id);

        let mut outcome = Outcome::new(request);
        if let Some(w) = self.record(caller, ReportType::DemandeExceptPrise).await {
            outcome.warn(w);
        }
        Ok(outcome)
    }

    // --- Pedidos ---

    /// Fornecedor e produtos precisam existir antes do envio.
    pub async fn create_order(
        &self,
        caller: &Caller,
        payload: &NewOrderPayload,
    ) -> Result<Outcome<Order>, AppError> {
        let body = payload.to_write();
        let (suppliers, catalogue) = tokio::try_join!(
            self.inventory.list_suppliers(&[], caller.token()),
            self.inventory.list_products(caller.token()),
        )?;
        if !suppliers.iter().any(|s| s.id == body.fournisseur_id) {
            return Err(AppError::SupplierNotFound);
        }
        if body.produits.iter().any(|l| !catalogue.iter().any(|p| p.id == l.produit_id)) {
            return Err(AppError::ProductNotFound);
        }

        let order = self.repo.create_order(&body, caller.token()).await?;
        tracing::info!("Pedido criado: {} (fornecedor {})", order.id, body.fournisseur_id);

        let mut outcome = Outcome::new(order);
        if let Some(w) = self.record(caller, ReportType::ValideCommande).await {
            outcome.warn(w);
        }
        Ok(outcome)
    }

    pub async fn list_orders(&self, caller: &Caller) -> Result<Vec<Order>, AppError> {
        self.repo.list_orders(caller.token()).await
    }

    /// EN_RETOUR exige motivo de devolução.
    pub async fn update_order_status(
        &self,
        caller: &Caller,
        id: Uuid,
        status: OrderStatus,
        return_reason: Option<&str>,
    ) -> Result<Outcome<Order>, AppError> {
        let raison_retour = match status {
            OrderStatus::Returned => Some(required_reason(return_reason, AppError::ReturnReasonRequired)?),
            _ => None,
        };

        let body = OrderStatusBody { id, statut: status, raison_retour };
        let order = self.repo.update_order_status(&body, caller.token()).await?;
        tracing::info!("Pedido {} -> {:?}", id, status);

        let mut outcome = Outcome::new(order);
        if status == OrderStatus::Delivered {
            if let Some(w) = self.record(caller, ReportType::CommandeLivree).await {
                outcome.warn(w);
            }
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::error::OperationWarning;
    use crate::remote::client::tests::client_for;
    use serde_json::{json, Value};
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const REQUEST_ID: &str = "6f1c2a9e-4b7d-4f5e-9a1b-2c3d4e5f6a7b";

    fn service(server: &MockServer) -> RequestService {
        let client = client_for(server);
        RequestService::new(
            OperationsRepository::new(client.clone()),
            InventoryRepository::new(client.clone()),
            ReportingRepository::new(client),
        )
    }

    fn caller() -> Caller {
        Caller { token: None, user_id: Some("admin_1".into()) }
    }

    fn request_json(status: &str) -> Value {
        json!({ "id": REQUEST_ID, "statut": status, "produits": [] })
    }

    async fn mount_request(server: &MockServer, status: &str) {
        Mock::given(method("GET"))
            .and(path("/api/admin/demande/en-attente"))
            .and(query_param("id", REQUEST_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(request_json(status)))
            .mount(server)
            .await;
    }

    #[test]
    fn blank_reason_is_missing() {
        assert!(required_reason(Some("   "), AppError::RejectionReasonRequired).is_err());
        assert!(required_reason(None, AppError::RejectionReasonRequired).is_err());
        assert_eq!(required_reason(Some(" Budget "), AppError::RejectionReasonRequired).unwrap(), "Budget");
    }

    #[tokio::test]
    async fn rejection_without_reason_never_reaches_backend() {
        let server = MockServer::start().await;
        let id: Uuid = REQUEST_ID.parse().unwrap();

        let err = service(&server)
            .decide(&caller(), id, RequestDecision::Reject, Some("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RejectionReasonRequired));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn rejection_sends_trimmed_reason() {
        let server = MockServer::start().await;
        mount_request(&server, "EN_ATTENTE").await;
        Mock::given(method("PATCH"))
            .and(path("/api/admin/demande/en-attente"))
            .and(query_param("id", REQUEST_ID))
            .and(body_json(json!({ "statut": "REJETEE", "raisonRefus": "Hors budget" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(request_json("REJETEE")))
            .expect(1)
            .mount(&server)
            .await;

        let id: Uuid = REQUEST_ID.parse().unwrap();
        let outcome = service(&server)
            .decide(&caller(), id, RequestDecision::Reject, Some(" Hors budget "))
            .await
            .unwrap();
        assert_eq!(outcome.data.status, RequestStatus::Rejected);
    }

    #[tokio::test]
    async fn only_pending_requests_can_be_decided() {
        let server = MockServer::start().await;
        mount_request(&server, "APPROUVEE").await;

        let id: Uuid = REQUEST_ID.parse().unwrap();
        let err = service(&server)
            .decide(&caller(), id, RequestDecision::Accept, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RequestNotPending));
    }

    #[tokio::test]
    async fn approval_records_entry_or_warns() {
        let server = MockServer::start().await;
        mount_request(&server, "EN_ATTENTE").await;
        Mock::given(method("PATCH"))
            .and(path("/api/admin/demande/en-attente"))
            .respond_with(ResponseTemplate::new(200).set_body_json(request_json("APPROUVEE")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/reporting"))
            .and(body_json(json!({ "type": "DEMANDE_ACCEPTEE", "userId": "admin_1" })))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let id: Uuid = REQUEST_ID.parse().unwrap();
        let outcome = service(&server)
            .decide(&caller(), id, RequestDecision::Accept, None)
            .await
            .unwrap();
        assert_eq!(outcome.data.status, RequestStatus::Approved);
        assert_eq!(outcome.warnings, vec![OperationWarning::ReportingEntryNotRecorded]);
    }

    #[tokio::test]
    async fn exceptional_accept_requires_pending() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path(format!("/api/admin/demandes/exceptionelle/{}", id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": id, "statut": "COMMANDEE" })),
            )
            .mount(&server)
            .await;

        let err = service(&server).accept_exceptional(&caller(), id).await.unwrap_err();
        assert!(matches!(err, AppError::RequestNotPending));
    }

    #[tokio::test]
    async fn exceptional_reject_sends_reason() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path(format!("/api/admin/demandes/exceptionelle/{}", id)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": id, "statut": "EN_ATTENTE" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path(format!("/api/admin/demandes/exceptionelle/{}/reject", id)))
            .and(body_json(json!({ "raisonRefus": "Produit disponible au catalogue" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": id, "statut": "REJETEE" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = service(&server)
            .reject_exceptional(&caller(), id, "Produit disponible au catalogue")
            .await
            .unwrap();
        assert_eq!(outcome.data.status, ExceptionalStatus::Rejected);
    }

    const PRODUCT_ID: &str = "1c8f5a9e-4b7d-4f5e-9a1b-2c3d4e5f6a7b";
    const SUPPLIER_ID: &str = "0b8f5a9e-4b7d-4f5e-9a1b-2c3d4e5f6a7b";

    async fn mount_catalogue(server: &MockServer, quantity: u32) {
        Mock::given(method("GET"))
            .and(path("/api/admin/produit"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": PRODUCT_ID, "nom": "Toner", "marque": "HP",
                "quantite": quantity, "quantiteMinimale": 2
            }])))
            .mount(server)
            .await;
    }

    fn lines(quantity: u32) -> Value {
        json!([{ "produitId": PRODUCT_ID, "quantite": quantity }])
    }

    async fn mount_exceptional(server: &MockServer, id: Uuid, status: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/api/admin/demandes/exceptionelle/{}", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": id, "statut": status })))
            .mount(server)
            .await;
    }

    #[test]
    fn withdrawal_sums_repeated_lines() {
        let catalogue: Vec<Product> = serde_json::from_value(json!([
            { "id": PRODUCT_ID, "nom": "Toner", "quantite": 5, "quantiteMinimale": 2 }
        ]))
        .unwrap();
        let id: Uuid = PRODUCT_ID.parse().unwrap();

        let remaining = withdraw(&catalogue, [(id, 2), (id, 2)]).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].quantity, 1);

        let err = withdraw(&catalogue, [(id, 3), (id, 3)]).unwrap_err();
        assert!(matches!(err, AppError::InsufficientStock { available: 2, requested: 3, .. }));

        let err = withdraw(&catalogue, [(Uuid::new_v4(), 1)]).unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound));
    }

    #[tokio::test]
    async fn request_beyond_stock_never_reaches_backend() {
        let server = MockServer::start().await;
        mount_catalogue(&server, 3).await;
        Mock::given(method("POST"))
            .and(path("/api/demandeurUser/demandes/enattente"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let payload: NewRequestPayload = serde_json::from_value(json!({ "produits": lines(4) })).unwrap();
        let err = service(&server).create_request(&caller(), &payload).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::InsufficientStock { available: 3, requested: 4, .. }
        ));
    }

    #[tokio::test]
    async fn request_is_created_pending() {
        let server = MockServer::start().await;
        mount_catalogue(&server, 10).await;
        Mock::given(method("POST"))
            .and(path("/api/demandeurUser/demandes/enattente"))
            .and(body_json(json!({ "produits": lines(4) })))
            .respond_with(ResponseTemplate::new(201).set_body_json(request_json("EN_ATTENTE")))
            .expect(1)
            .mount(&server)
            .await;

        let payload: NewRequestPayload = serde_json::from_value(json!({ "produits": lines(4) })).unwrap();
        let outcome = service(&server).create_request(&caller(), &payload).await.unwrap();
        assert_eq!(outcome.data.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn pickup_requires_approved_request() {
        let server = MockServer::start().await;
        mount_request(&server, "EN_ATTENTE").await;
        mount_catalogue(&server, 10).await;

        let id: Uuid = REQUEST_ID.parse().unwrap();
        let err = service(&server).take_request(&caller(), id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::UnexpectedStatus { expected: "APPROUVEE", actual: "EN_ATTENTE" }
        ));
    }

    #[tokio::test]
    async fn pickup_records_entry_and_alerts_on_low_stock() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/admin/demande/en-attente"))
            .and(query_param("id", REQUEST_ID))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": REQUEST_ID, "statut": "APPROUVEE", "produits": lines(4)
            })))
            .mount(&server)
            .await;
        mount_catalogue(&server, 5).await;
        Mock::given(method("POST"))
            .and(path(format!("/api/magasinier/demandes/{}/prise", REQUEST_ID)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/reporting"))
            .and(body_json(json!({ "type": "DEMANDE_PRISE", "userId": "admin_1" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/emails/admin/alert"))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let id: Uuid = REQUEST_ID.parse().unwrap();
        let outcome = service(&server).take_request(&caller(), id).await.unwrap();
        assert_eq!(outcome.data.status, RequestStatus::Taken);
        assert_eq!(outcome.warnings, vec![OperationWarning::StockAlertNotSent]);
    }

    #[tokio::test]
    async fn exceptional_product_already_in_catalogue_is_refused() {
        let server = MockServer::start().await;
        mount_catalogue(&server, 10).await;

        let payload: NewExceptionalPayload = serde_json::from_value(json!({
            "produitsExceptionnels": [{ "name": "toner ", "quantite": 1 }]
        }))
        .unwrap();
        let err = service(&server).create_exceptional(&caller(), &payload).await.unwrap_err();
        assert!(matches!(err, AppError::ProductAlreadyInCatalogue));
    }

    #[tokio::test]
    async fn exceptional_delivery_requires_ordered() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_exceptional(&server, id, "ACCEPTEE").await;

        let err = service(&server).deliver_exceptional(&caller(), id).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::UnexpectedStatus { expected: "COMMANDEE", actual: "ACCEPTEE" }
        ));
    }

    #[tokio::test]
    async fn exceptional_pickup_follows_delivery() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();
        mount_exceptional(&server, id, "LIVREE").await;
        Mock::given(method("POST"))
            .and(path(format!("/api/magasinier/demandes/demandes-exceptionnelles/{}/prise", id)))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/reporting"))
            .and(body_json(json!({ "type": "DEMANDEEXCEPT_PRISE", "userId": "admin_1" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = service(&server).take_exceptional(&caller(), id).await.unwrap();
        assert_eq!(outcome.data.status, ExceptionalStatus::Taken);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn order_for_unknown_supplier_is_refused() {
        let server = MockServer::start().await;
        mount_catalogue(&server, 10).await;
        Mock::given(method("GET"))
            .and(path("/api/admin/fournisseur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let payload: NewOrderPayload = serde_json::from_value(json!({
            "fournisseurId": SUPPLIER_ID, "produits": lines(12), "datePrevu": "2025-03-10"
        }))
        .unwrap();
        let err = service(&server).create_order(&caller(), &payload).await.unwrap_err();
        assert!(matches!(err, AppError::SupplierNotFound));
    }

    #[tokio::test]
    async fn order_is_created_and_recorded() {
        let server = MockServer::start().await;
        mount_catalogue(&server, 10).await;
        Mock::given(method("GET"))
            .and(path("/api/admin/fournisseur"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": SUPPLIER_ID, "nom": "Bureau Vallée", "contact": "contact@bv.fr" }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/gestionnaire/commandes/validee/create"))
            .and(body_json(json!({
                "fournisseurId": SUPPLIER_ID, "produits": lines(12), "datePrevu": "2025-03-10"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "9a8f5a9e-4b7d-4f5e-9a1b-2c3d4e5f6a7b", "statut": "EN_COURS", "datePrevu": "2025-03-10T00:00:00Z"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/reporting"))
            .and(body_json(json!({ "type": "VALIDE_COMMANDE", "userId": "admin_1" })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let payload: NewOrderPayload = serde_json::from_value(json!({
            "fournisseurId": SUPPLIER_ID, "produits": lines(12), "datePrevu": "2025-03-10"
        }))
        .unwrap();
        let outcome = service(&server).create_order(&caller(), &payload).await.unwrap();
        assert_eq!(outcome.data.status, OrderStatus::InProgress);
        assert!(outcome.warnings.is_empty());
    }

    #[tokio::test]
    async fn returned_order_needs_reason() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        let err = service(&server)
            .update_order_status(&caller(), id, OrderStatus::Returned, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ReturnReasonRequired));

        Mock::given(method("PATCH"))
            .and(path("/api/admin/commande/status"))
            .and(body_json(json!({ "id": id, "statut": "LIVREE" })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "id": id, "statut": "LIVREE" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let outcome = service(&server)
            .update_order_status(&caller(), id, OrderStatus::Delivered, Some("ignoré"))
            .await
            .unwrap();
        assert_eq!(outcome.data.status, OrderStatus::Delivered);
    }
}
